//! Per-call context passed to every dispatched function.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Call context carrying the envelope's pass-through documents.
///
/// The gateway forwards the `accountability` and `trigger` documents of the
/// invoke envelope to the function without inspecting them. Functions that
/// care about either read it from here, raw or decoded into a type of their
/// own choosing.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    accountability: Option<Value>,
    trigger: Option<Value>,
}

impl CallContext {
    /// Create a context from the raw envelope documents.
    pub fn new(accountability: Option<Value>, trigger: Option<Value>) -> Self {
        Self {
            accountability,
            trigger,
        }
    }

    /// Attach an accountability document (useful when testing functions).
    pub fn with_accountability(mut self, accountability: Value) -> Self {
        self.accountability = Some(accountability);
        self
    }

    /// Attach a trigger document (useful when testing functions).
    pub fn with_trigger(mut self, trigger: Value) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// The accountability document, exactly as the caller sent it.
    pub fn accountability(&self) -> Option<&Value> {
        self.accountability.as_ref()
    }

    /// The trigger document, exactly as the caller sent it.
    pub fn trigger(&self) -> Option<&Value> {
        self.trigger.as_ref()
    }

    /// Decode the accountability document into a caller-chosen type.
    ///
    /// Returns `None` when the envelope carried no accountability document.
    pub fn accountability_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.accountability.as_ref().map(|v| T::deserialize(v))
    }

    /// Decode the trigger document into a caller-chosen type.
    ///
    /// Returns `None` when the envelope carried no trigger document.
    pub fn trigger_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.trigger.as_ref().map(|v| T::deserialize(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Who {
        user: String,
        role: String,
    }

    #[test]
    fn test_empty_context() {
        let ctx = CallContext::default();
        assert_eq!(ctx.accountability(), None);
        assert_eq!(ctx.trigger(), None);
        assert!(ctx.accountability_as::<Who>().is_none());
    }

    #[test]
    fn test_documents_pass_through_untouched() {
        let acc = json!({"user": "u1", "role": "admin", "extra": [1, 2]});
        let trig = json!({"event": "items.create"});
        let ctx = CallContext::new(Some(acc.clone()), Some(trig.clone()));

        assert_eq!(ctx.accountability(), Some(&acc));
        assert_eq!(ctx.trigger(), Some(&trig));
    }

    #[test]
    fn test_typed_accountability_decode() {
        let ctx = CallContext::default()
            .with_accountability(json!({"user": "u1", "role": "admin"}));

        let who: Who = ctx.accountability_as().unwrap().unwrap();
        assert_eq!(
            who,
            Who {
                user: "u1".to_string(),
                role: "admin".to_string(),
            }
        );
    }

    #[test]
    fn test_typed_decode_mismatch_is_an_error() {
        let ctx = CallContext::default().with_trigger(json!("just a string"));
        assert!(ctx.trigger_as::<Who>().unwrap().is_err());
    }
}
