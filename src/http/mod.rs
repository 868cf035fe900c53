//! Wire-level shapes for the dispatch endpoint.

mod envelope;
pub(crate) mod reply;

pub use envelope::{ErrorBody, InvokeRequest};
