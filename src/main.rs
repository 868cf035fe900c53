//! Callgate - Example Dispatch Gateway
//!
//! This example runs the gateway with one sample function of each shape.

use callgate::prelude::*;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Sample payload for the `ParamWithReturn` function.
#[derive(Debug, Deserialize, Serialize)]
struct FooExample {
    foo: String,
    bar: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Callgate gateway...");

    let config = GatewayConfig::new().host("0.0.0.0").port(8080);

    let mut server = GatewayServer::new(config);

    server.register(Function::action("NoParamsNoReturn", |_ctx| async {
        tracing::info!("NoParamsNoReturn called");
        Ok(())
    }))?;

    server.register(Function::query("NoParamsWithReturn", |_ctx| async {
        Ok("foo-value".to_string())
    }))?;

    server.register(Function::apply(
        "ParamWithReturn",
        |_ctx, mut foo: FooExample| async move {
            foo.foo.push_str("new-foo-value");
            foo.bar = 42;
            Ok(foo)
        },
    ))?;

    server.register(Function::action("Accountability", |ctx: CallContext| async move {
        tracing::info!("Accountability: {:?}", ctx.accountability());
        Ok(())
    }))?;

    server.register(Function::action("Error", |_ctx| async {
        Err(CallError::new("error message"))
    }))?;

    tracing::info!(
        "Try: curl -X POST -d '{{\"fnname\":\"NoParamsWithReturn\"}}' http://localhost:8080{}",
        DISPATCH_PATH
    );

    server.run().await
}
