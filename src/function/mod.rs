//! Functions, their registry, and the per-call context.

pub mod context;
pub mod handler;
pub mod registry;

pub use context::CallContext;
pub use handler::{CallError, Function};
pub use registry::{FunctionHandle, FunctionRegistry, RegisterError};
