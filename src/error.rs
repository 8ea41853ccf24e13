//! Unified error type for codesmith: maps operation failures to JSON-RPC codes.

use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i32 = -32700;
const INVALID_PARAMS: i32 = -32602;
const METHOD_NOT_FOUND: i32 = -32601;
/// Application-level server errors (implementation-defined range).
const SERVER_ERROR: i32 = -32000;
const CONFIG_ERROR: i32 = -32001;
const SERVICE_ERROR: i32 = -32002;
const NOT_FOUND_ERROR: i32 = -32003;
const EMPTY_TREE_ERROR: i32 = -32004;
const CONFLICT_ERROR: i32 = -32005;

/// Why a remote call failed. Kept apart so diagnostics can tell an expired
/// token from a missing repository, even though both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFailure {
    /// 401 / 403
    Auth,
    /// 404
    NotFound,
    /// Any other non-2xx status
    Rejected,
    /// Connection, timeout or body decoding failure
    Unreachable,
}

impl ServiceFailure {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            _ => Self::Rejected,
        }
    }

    /// Operator hint appended to failure payloads.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Auth => Some("check your access token permissions"),
            Self::NotFound => Some("repository or branch not found"),
            Self::Rejected | Self::Unreachable => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service error ({service}): {message}")]
    Service {
        service: &'static str,
        failure: ServiceFailure,
        status: Option<u16>,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path does not exist: {0}")]
    NotFound(String),

    #[error("No files found to commit in {0}")]
    EmptyTree(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

impl ForgeError {
    pub fn service(
        service: &'static str,
        failure: ServiceFailure,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            service,
            failure,
            status,
            message: message.into(),
        }
    }

    /// Remote failure kind, if this is a service error.
    pub fn service_failure(&self) -> Option<ServiceFailure> {
        match self {
            Self::Service { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    /// JSON-RPC error code for this error variant.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::Parse(_) => SERVER_ERROR,
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::Config(_) => CONFIG_ERROR,
            Self::Service { .. } => SERVICE_ERROR,
            Self::NotFound(_) => NOT_FOUND_ERROR,
            Self::EmptyTree(_) => EMPTY_TREE_ERROR,
            Self::Conflict(_) => CONFLICT_ERROR,
            Self::Io(_) => SERVER_ERROR,
        }
    }

    /// Convert to (code, message) pair for Response::error.
    pub fn into_rpc(self) -> (i32, String) {
        let code = self.rpc_code();
        (code, self.to_string())
    }
}

pub type ForgeResult<T> = std::result::Result<T, ForgeError>;
