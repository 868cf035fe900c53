//! Function descriptors bridging the wire envelope and each function's
//! own signature.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::function::context::CallContext;

/// Error returned by a function body.
///
/// Application errors travel back to the caller verbatim in the error body;
/// the gateway never turns them into transport-level failures.
#[derive(Debug, Clone)]
pub struct CallError {
    message: String,
}

impl CallError {
    /// Create a new CallError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message reported to the caller.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CallError {}

impl From<std::io::Error> for CallError {
    fn from(err: std::io::Error) -> Self {
        CallError::new(err.to_string())
    }
}

impl From<serde_json::Error> for CallError {
    fn from(err: serde_json::Error) -> Self {
        CallError::new(err.to_string())
    }
}

/// Future of an invocation that produces no value.
type UnitFuture = Pin<Box<dyn Future<Output = Result<(), CallError>> + Send>>;

/// Future of an invocation whose value is already serialized.
type ValueFuture = Pin<Box<dyn Future<Output = Result<Value, InvokeError>> + Send>>;

type ActionFn = Box<dyn Fn(CallContext) -> UnitFuture + Send + Sync>;
type QueryFn = Box<dyn Fn(CallContext) -> ValueFuture + Send + Sync>;
type AcceptFn =
    Box<dyn Fn(CallContext, Option<&RawValue>) -> Result<UnitFuture, PayloadError> + Send + Sync>;
type ApplyFn =
    Box<dyn Fn(CallContext, Option<&RawValue>) -> Result<ValueFuture, PayloadError> + Send + Sync>;

/// Failure of a value-producing invocation, before wire mapping.
#[derive(Debug)]
pub(crate) enum InvokeError {
    /// The function body failed.
    Function(CallError),
    /// The returned value could not be serialized.
    Encode(serde_json::Error),
}

/// Payload decode failure for a payload-taking function.
///
/// Produced before the invocation future exists, so the function body never
/// runs when the payload does not decode.
#[derive(Debug)]
pub(crate) struct PayloadError {
    pub(crate) error: serde_json::Error,
    /// Name of the type the payload was supposed to decode into.
    pub(crate) target: &'static str,
}

/// The four supported signature shapes, classified at registration.
///
/// The dispatch handler matches on this to adapt the envelope to the
/// function's parameters and its outcome back to the wire. No signature
/// inspection happens at call time.
pub(crate) enum Callable {
    /// `async fn(CallContext) -> Result<(), CallError>`
    Action(ActionFn),
    /// `async fn(CallContext) -> Result<T, CallError>`
    Query(QueryFn),
    /// `async fn(CallContext, P) -> Result<(), CallError>`
    Accept(AcceptFn),
    /// `async fn(CallContext, P) -> Result<T, CallError>`
    Apply(ApplyFn),
}

impl Callable {
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            Callable::Action(_) => "action",
            Callable::Query(_) => "query",
            Callable::Accept(_) => "accept",
            Callable::Apply(_) => "apply",
        }
    }
}

/// A named function ready for registration with the gateway.
///
/// Construct one with the shape constructor matching the function's
/// signature: [`Function::action`], [`Function::query`], [`Function::accept`]
/// or [`Function::apply`].
pub struct Function {
    name: String,
    pub(crate) callable: Callable,
}

impl Function {
    /// Wrap `async fn(CallContext) -> Result<(), CallError>`: no payload,
    /// no returned value.
    pub fn action<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            callable: Callable::Action(Box::new(move |ctx| {
                let fut: UnitFuture = Box::pin(f(ctx));
                fut
            })),
        }
    }

    /// Wrap `async fn(CallContext) -> Result<T, CallError>`: no payload, the
    /// returned value becomes the response body.
    pub fn query<F, Fut, T>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CallError>> + Send + 'static,
        T: Serialize,
    {
        Self {
            name: name.into(),
            callable: Callable::Query(Box::new(move |ctx| {
                let fut = f(ctx);
                let wrapped: ValueFuture = Box::pin(async move {
                    match fut.await {
                        Ok(value) => serde_json::to_value(value).map_err(InvokeError::Encode),
                        Err(err) => Err(InvokeError::Function(err)),
                    }
                });
                wrapped
            })),
        }
    }

    /// Wrap `async fn(CallContext, P) -> Result<(), CallError>`: the payload
    /// is decoded into `P` before the function runs.
    pub fn accept<F, Fut, P>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallError>> + Send + 'static,
        P: DeserializeOwned,
    {
        Self {
            name: name.into(),
            callable: Callable::Accept(Box::new(move |ctx, raw| {
                let payload = decode_payload::<P>(raw)?;
                let fut: UnitFuture = Box::pin(f(ctx, payload));
                Ok(fut)
            })),
        }
    }

    /// Wrap `async fn(CallContext, P) -> Result<T, CallError>`: payload in,
    /// serialized value out.
    pub fn apply<F, Fut, P, T>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CallError>> + Send + 'static,
        P: DeserializeOwned,
        T: Serialize,
    {
        Self {
            name: name.into(),
            callable: Callable::Apply(Box::new(move |ctx, raw| {
                let payload = decode_payload::<P>(raw)?;
                let fut = f(ctx, payload);
                let wrapped: ValueFuture = Box::pin(async move {
                    match fut.await {
                        Ok(value) => serde_json::to_value(value).map_err(InvokeError::Encode),
                        Err(err) => Err(InvokeError::Function(err)),
                    }
                });
                Ok(wrapped)
            })),
        }
    }

    /// The name the function dispatches under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shape(&self) -> &'static str {
        self.callable.shape()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("shape", &self.shape())
            .finish()
    }
}

/// Decode the raw payload into the declared parameter type. An absent
/// payload decodes as JSON `null`.
fn decode_payload<P: DeserializeOwned>(raw: Option<&RawValue>) -> Result<P, PayloadError> {
    serde_json::from_str(raw.map_or("null", RawValue::get)).map_err(|error| PayloadError {
        error,
        target: std::any::type_name::<P>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio_test::assert_ok;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn raw(json: &str) -> Box<RawValue> {
        RawValue::from_string(json.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_action_shape_runs() {
        let hit = Arc::new(AtomicBool::new(false));
        let seen = hit.clone();
        let func = Function::action("Hit", move |_ctx| {
            let seen = seen.clone();
            async move {
                seen.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        assert_eq!(func.name(), "Hit");
        assert_eq!(func.shape(), "action");

        let Callable::Action(call) = &func.callable else {
            panic!("expected action shape");
        };
        assert_ok!(call(CallContext::default()).await);
        assert!(hit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_query_shape_serializes_value() {
        let func = Function::query("Origin", |_ctx| async { Ok(Point { x: 0, y: 0 }) });
        assert_eq!(func.shape(), "query");

        let Callable::Query(call) = &func.callable else {
            panic!("expected query shape");
        };
        let value = call(CallContext::default()).await.unwrap();
        assert_eq!(value, serde_json::json!({"x": 0, "y": 0}));
    }

    #[tokio::test]
    async fn test_apply_shape_decodes_and_returns() {
        let func = Function::apply("Mirror", |_ctx, p: Point| async move {
            Ok(Point { x: p.y, y: p.x })
        });
        assert_eq!(func.shape(), "apply");

        let Callable::Apply(call) = &func.callable else {
            panic!("expected apply shape");
        };
        let payload = raw(r#"{"x":1,"y":2}"#);
        let value = call(CallContext::default(), Some(&payload))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({"x": 2, "y": 1}));
    }

    #[tokio::test]
    async fn test_bad_payload_fails_before_the_function_runs() {
        let hit = Arc::new(AtomicBool::new(false));
        let seen = hit.clone();
        let func = Function::accept("Store", move |_ctx, _p: Point| {
            let seen = seen.clone();
            async move {
                seen.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        let Callable::Accept(call) = &func.callable else {
            panic!("expected accept shape");
        };
        let payload = raw(r#"{"x":"not a number"}"#);
        let err = match call(CallContext::default(), Some(&payload)) {
            Err(err) => err,
            Ok(_) => panic!("expected a decode failure"),
        };
        assert!(err.target.contains("Point"));
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_absent_payload_decodes_as_null() {
        let func = Function::accept("Maybe", |_ctx, p: Option<Point>| async move {
            match p {
                None => Ok(()),
                Some(_) => Err(CallError::new("expected no payload")),
            }
        });

        let Callable::Accept(call) = &func.callable else {
            panic!("expected accept shape");
        };
        assert_ok!(call(CallContext::default(), None).unwrap().await);
    }

    #[test]
    fn test_call_error_display_is_the_message() {
        let err = CallError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_call_error_from_serde() {
        let source = serde_json::from_str::<Point>("not json").unwrap_err();
        let err: CallError = source.into();
        assert!(!err.message().is_empty());
    }
}
