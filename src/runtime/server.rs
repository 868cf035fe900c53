//! The dispatch gateway server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::header::{HeaderValue, AUTHORIZATION};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::value::RawValue;
use serde_json::Value;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::function::context::CallContext;
use crate::function::handler::{Callable, CallError, Function, InvokeError, PayloadError};
use crate::function::registry::{FunctionHandle, FunctionRegistry, RegisterError};
use crate::http::reply;
use crate::http::InvokeRequest;
use crate::runtime::config::GatewayConfig;

/// Fixed path the dispatch handler is mounted on.
pub const DISPATCH_PATH: &str = "/__callgate";

/// Liveness probe path, served when `GatewayConfig::enable_health` is set.
pub const HEALTH_PATH: &str = "/_health";

/// The dispatch gateway.
///
/// Owns the function registry and the configuration. Register every function
/// first, then let [`GatewayServer::run`] consume the server: once it is
/// serving there is no way back into registration.
pub struct GatewayServer {
    /// Server configuration.
    config: GatewayConfig,
    /// Function registry.
    registry: FunctionRegistry,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            registry: FunctionRegistry::new(),
        }
    }

    /// Create a new gateway server with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GatewayConfig::default())
    }

    /// Mount an already-populated registry.
    pub fn with_registry(config: GatewayConfig, registry: FunctionRegistry) -> Self {
        Self { config, registry }
    }

    /// Register a function with the gateway.
    pub fn register(&mut self, function: Function) -> Result<FunctionHandle, RegisterError> {
        self.registry.register(function)
    }

    /// The function registry.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Run the dispatch pipeline on a single request, without a listener.
    ///
    /// This is the exact path [`GatewayServer::run`] serves. Tests and hosts
    /// that embed the gateway into their own transport call it directly.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        handle_request(req, &self.registry, &self.config).await
    }

    /// Bind the listener and serve until the process exits.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!(
            "Gateway listening on {} ({} functions)",
            addr,
            self.registry.len()
        );

        let registry = Arc::new(self.registry);
        let config = Arc::new(self.config);

        loop {
            let (stream, _remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let registry = registry.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let registry = registry.clone();
                    let config = config.clone();
                    async move {
                        Ok::<_, Infallible>(handle_request(req, &registry, &config).await)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Per-request dispatch pipeline.
///
/// Every branch is terminal: each failure maps to exactly one wire response,
/// and nothing retries.
async fn handle_request<B>(
    req: Request<B>,
    registry: &FunctionRegistry,
    config: &GatewayConfig,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();

    debug!("Handling request: {} {}", parts.method, parts.uri.path());

    // System endpoints
    if config.enable_health && parts.method == Method::GET && parts.uri.path() == HEALTH_PATH {
        return reply::text(StatusCode::OK, "OK");
    }

    if parts.uri.path() != DISPATCH_PATH {
        return reply::text(StatusCode::NOT_FOUND, "not found");
    }

    // Credentials are checked before the body is touched: a bad token wins
    // over a bad body.
    if let Some(secret) = &config.shared_secret {
        if !bearer_matches(parts.headers.get(AUTHORIZATION), secret) {
            return reply::text(StatusCode::UNAUTHORIZED, "wrong authorization token");
        }
    }

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!("Failed to read request body: {}", err);
            return reply::text(StatusCode::BAD_REQUEST, "invalid request");
        }
    };

    if body.len() > config.max_body_size {
        return reply::text(StatusCode::BAD_REQUEST, "Request body too large");
    }

    let invoke: InvokeRequest = match serde_json::from_slice(&body) {
        Ok(invoke) => invoke,
        Err(_) => return reply::text(StatusCode::BAD_REQUEST, "invalid request"),
    };

    info!("Function called: {}", invoke.fnname);

    let Some(function) = registry.resolve(&invoke.fnname) else {
        return reply::text(
            StatusCode::NOT_FOUND,
            format!("function {:?} not found", invoke.fnname),
        );
    };

    let ctx = CallContext::new(invoke.accountability, invoke.trigger);
    let payload = invoke.payload.as_deref();

    // Adapt the envelope to the function's shape and run it
    match &function.callable {
        Callable::Action(call) => match call(ctx).await {
            Ok(()) => reply::empty_success(),
            Err(err) => application_error(&invoke.fnname, &err),
        },
        Callable::Query(call) => value_outcome(&invoke.fnname, call(ctx).await),
        Callable::Accept(call) => match call(ctx, payload) {
            Ok(fut) => match fut.await {
                Ok(()) => reply::empty_success(),
                Err(err) => application_error(&invoke.fnname, &err),
            },
            Err(decode) => payload_rejected(&invoke.fnname, payload, decode),
        },
        Callable::Apply(call) => match call(ctx, payload) {
            Ok(fut) => value_outcome(&invoke.fnname, fut.await),
            Err(decode) => payload_rejected(&invoke.fnname, payload, decode),
        },
    }
}

/// Map a function's own error onto the error body, logging it.
fn application_error(fnname: &str, err: &CallError) -> Response<Full<Bytes>> {
    error!("Function '{}' error: {}", fnname, err);
    reply::call_error(err.message())
}

/// Map a value-producing invocation's outcome onto the wire.
fn value_outcome(fnname: &str, outcome: Result<Value, InvokeError>) -> Response<Full<Bytes>> {
    match outcome {
        Ok(value) => reply::json_value(&value),
        Err(InvokeError::Function(err)) => application_error(fnname, &err),
        Err(InvokeError::Encode(err)) => {
            error!("Function '{}' response not encodable: {}", fnname, err);
            reply::encode_failure(&err)
        }
    }
}

/// Reject a payload that does not decode into the declared parameter type.
/// The function body has not run.
fn payload_rejected(
    fnname: &str,
    payload: Option<&RawValue>,
    decode: PayloadError,
) -> Response<Full<Bytes>> {
    error!(
        "Cannot decode payload for function '{}': {} (payload: {}, target: {})",
        fnname,
        decode.error,
        payload.map_or("null", RawValue::get),
        decode.target
    );
    reply::text(
        StatusCode::BAD_REQUEST,
        format!("cannot decode request payload: {}", decode.error),
    )
}

/// Exact bearer comparison, constant-time over the credential bytes.
fn bearer_matches(header: Option<&HeaderValue>, secret: &str) -> bool {
    let Some(value) = header.and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let expected = format!("Bearer {}", secret);
    value.as_bytes().ct_eq(expected.as_bytes()).into()
}
