//! # Callgate - HTTP Function Dispatch Gateway
//!
//! Callgate exposes process-local functions to a remote workflow engine
//! through a single HTTP endpoint. A caller POSTs an envelope naming a
//! registered function; the gateway authenticates the request, resolves the
//! function, decodes the payload into the function's own parameter type,
//! invokes it, and encodes the outcome back onto the wire.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Workflow Engine                           │
//! │              POST /__callgate  {"fnname": "...", ...}           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Gateway Server                            │
//! │   auth → parse envelope → resolve → decode payload → invoke     │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                   Function Registry                      │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌───────┐   │   │
//! │  │   │  action  │  │  query   │  │  accept  │  │ apply │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └───────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Function shapes
//!
//! Four signatures are supported, each with its own constructor:
//!
//! | Constructor          | Signature                                         |
//! |----------------------|---------------------------------------------------|
//! | [`Function::action`] | `async fn(CallContext) -> Result<(), CallError>`  |
//! | [`Function::query`]  | `async fn(CallContext) -> Result<T, CallError>`   |
//! | [`Function::accept`] | `async fn(CallContext, P) -> Result<(), CallError>` |
//! | [`Function::apply`]  | `async fn(CallContext, P) -> Result<T, CallError>` |
//!
//! A returned value is serialized as the JSON response body. A function with
//! no value answers with the `{}` marker. A function error becomes
//! `{"error": "<message>"}` with OK status: reaching the function and having
//! it fail is not a transport failure.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use callgate::prelude::*;
//!
//! #[derive(serde::Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = GatewayConfig::new().port(8080).shared_secret("s3cr3t");
//!     let mut server = GatewayServer::new(config);
//!
//!     server.register(Function::apply("Greet", |_ctx: CallContext, g: Greet| async move {
//!         Ok(format!("Hello, {}!", g.name))
//!     }))?;
//!
//!     server.run().await
//! }
//! ```
//!
//! ## Security
//!
//! When a shared secret is configured, every dispatch call must carry
//! `Authorization: Bearer <secret>`. The comparison is constant-time over
//! the credential bytes. The gateway itself terminates plain HTTP; put it
//! behind a TLS-terminating proxy when it crosses trust boundaries.

pub mod function;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::function::{
        CallContext, CallError, Function, FunctionHandle, FunctionRegistry, RegisterError,
    };
    pub use crate::runtime::{GatewayConfig, GatewayServer, DISPATCH_PATH};
}

// Re-export for convenience
pub use function::{CallContext, CallError, Function, FunctionHandle, FunctionRegistry, RegisterError};
pub use http::{ErrorBody, InvokeRequest};
pub use runtime::{GatewayConfig, GatewayServer, DISPATCH_PATH, HEALTH_PATH};
