//! Registry of dispatchable functions.

use std::collections::HashMap;
use std::fmt;

use tracing::info;

use crate::function::handler::Function;

/// Name to descriptor mapping, filled at startup and read-only while the
/// gateway serves traffic.
///
/// Registration takes `&mut self`: populate the registry, hand it to the
/// server, and the type system keeps request handling from ever mutating it.
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// Create a new, empty function registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Add a function under its unique name.
    ///
    /// Duplicate names are a configuration defect and fail here, at startup,
    /// never at request time.
    pub fn register(&mut self, function: Function) -> Result<FunctionHandle, RegisterError> {
        let name = function.name().to_string();

        if self.functions.contains_key(&name) {
            return Err(RegisterError::duplicate(&name));
        }

        info!("Registered function: {} [{}]", name, function.shape());
        self.functions.insert(name.clone(), function);
        Ok(FunctionHandle { name })
    }

    /// Look up a function by name.
    pub fn resolve(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry holds no functions.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys())
            .finish()
    }
}

/// Proof that a function was registered, naming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    name: String,
}

impl FunctionHandle {
    /// The name the function was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Startup-time registration failure.
#[derive(Debug, Clone)]
pub struct RegisterError {
    message: String,
}

impl RegisterError {
    fn duplicate(name: &str) -> Self {
        Self {
            message: format!("function {name:?} already registered"),
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RegisterError {}
