//! Failure kinds reported back to the ledger host
use crate::types::{LifecycleState, Role};

/// Client-attributable rejections. Deterministic, never retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid payload serialization")]
    InvalidPayload,
    #[error("Payload for {0} not set")]
    PayloadNotSet(&'static str),
    #[error("Unknown transaction family {name} version {version}")]
    UnknownFamily { name: String, version: String },
    #[error("Role {role} is not allowed to perform {action}")]
    UnauthorizedRole { role: Role, action: String },
    #[error("User {actual} does not match required owner {expected:?}")]
    UnauthorizedIdentity {
        expected: Option<String>,
        actual: String,
    },
    #[error("User group {actual:?} does not match required group {expected:?}")]
    UnauthorizedGroup {
        expected: Option<String>,
        actual: Option<String>,
    },
    #[error("Action not allowed while in state {actual}, requires one of {expected:?}")]
    WrongPhase {
        expected: &'static [LifecycleState],
        actual: LifecycleState,
    },
    #[error("No data at address: {0}")]
    NotFound(String),
    #[error("Offer does not exist: {0}")]
    OfferDoesNotExist(String),
}

/// The two failure kinds a transition can end in. Neither leaves any write behind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] ValidationError),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplyError {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ApplyError::InvalidTransaction(_))
    }
    pub fn is_internal(&self) -> bool {
        matches!(self, ApplyError::InternalError(_))
    }
    /// The rejection reason, when the failure is client-attributable
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ApplyError::InvalidTransaction(err) => Some(err),
            ApplyError::InternalError(_) => None,
        }
    }
}

/// Failures raised by a [`crate::store::Store`] backend
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sled failure: {0}")]
    Sled(#[from] sled::Error),
    #[error("address is not a valid state address: {0}")]
    InvalidAddress(String),
}

impl From<StoreError> for ApplyError {
    fn from(value: StoreError) -> Self {
        ApplyError::InternalError(value.to_string())
    }
}
