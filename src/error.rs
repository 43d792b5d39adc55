use std::sync::Arc;

use thiserror::Error;

/// Failure to register a service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("rpc: no service name for type {type_name}")]
    UnnamedService { type_name: &'static str },
    #[error("rpc: type {name} is not exported")]
    NotExported { name: String },
    #[error("rpc: invalid service name {name:?}")]
    InvalidName { name: String },
    #[error("rpc: service already defined: {name}")]
    DuplicateService { name: String },
    #[error("rpc: method {method} defined twice on service {service}")]
    DuplicateMethod { service: String, method: String },
    #[error("rpc: type {name} has no exported methods of suitable type")]
    NoEligibleMethods { name: String },
}

/// Failure to decode the `params` array of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Incorrect number of parameters.")]
    Arity { expected: usize, actual: usize },
    /// The 1-based position of the offending parameter.
    #[error("Type mismatch parameter {0}.")]
    TypeMismatch(usize),
}

/// Failure of a single dispatch.
///
/// The `Display` text of each variant is exactly the `error` string sent to the caller.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Invalid JSON-RPC.")]
    InvalidRequest,
    #[error("Service not found.")]
    ServiceNotFound,
    #[error("Method not found.")]
    MethodNotFound,
    #[error(transparent)]
    Params(#[from] ParameterError),
    #[error("{0}")]
    Application(String),
    #[error("Result serialization failed.")]
    ResultSerialize(#[source] Arc<serde_json::Error>),
}

pub type Result<T, E = DispatchError> = std::result::Result<T, E>;
