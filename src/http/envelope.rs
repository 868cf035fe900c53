//! Wire envelope for dispatch calls.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

/// The envelope a caller POSTs to the dispatch endpoint.
///
/// `payload` stays raw here: only the resolved function knows what type it
/// decodes into, and an undecoded payload must survive the trip untouched.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Name of the function to call.
    pub fnname: String,
    /// Who (and why) is calling, forwarded to the function untouched.
    #[serde(default)]
    pub accountability: Option<Value>,
    /// The event that caused the call, forwarded to the function untouched.
    #[serde(default)]
    pub trigger: Option<Value>,
    /// Argument for the function, decoded against its declared parameter type.
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

/// Body shape for every error reported to the caller as data.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_envelope_parses() {
        let invoke: InvokeRequest = serde_json::from_str(
            r#"{
                "fnname": "Echo",
                "accountability": {"user": "u1"},
                "trigger": {"event": "items.create"},
                "payload": {"Bar":1}
            }"#,
        )
        .unwrap();

        assert_eq!(invoke.fnname, "Echo");
        assert!(invoke.accountability.is_some());
        assert!(invoke.trigger.is_some());
        assert_eq!(invoke.payload.unwrap().get(), r#"{"Bar":1}"#);
    }

    #[test]
    fn test_envelope_with_only_fnname() {
        let invoke: InvokeRequest = serde_json::from_str(r#"{"fnname": "Ping"}"#).unwrap();

        assert_eq!(invoke.fnname, "Ping");
        assert!(invoke.accountability.is_none());
        assert!(invoke.trigger.is_none());
        assert!(invoke.payload.is_none());
    }

    #[test]
    fn test_envelope_without_fnname_is_rejected() {
        assert!(serde_json::from_str::<InvokeRequest>(r#"{"payload": 1}"#).is_err());
    }

    #[test]
    fn test_unknown_envelope_fields_are_ignored() {
        let invoke: InvokeRequest =
            serde_json::from_str(r#"{"fnname": "Ping", "comment": "ignored"}"#).unwrap();
        assert_eq!(invoke.fnname, "Ping");
    }

    #[test]
    fn test_error_body_round_trip() {
        let body = ErrorBody {
            error: "boom".to_string(),
        };
        let text = serde_json::to_string(&body).unwrap();
        assert_eq!(text, r#"{"error":"boom"}"#);

        let parsed: ErrorBody = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.error, "boom");
    }
}
