//! Errors raised by the core colouring and jitter algorithms

use thiserror::Error;

/// Failure kinds signalled by the core
///
/// Every failure is an input-validation failure; the caller decides whether to
/// abort the whole run or skip the offending sighting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid argument{}: {reason}", index_suffix(.index))]
    InvalidArgument { index: Option<usize>, reason: String },
}

fn index_suffix(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at sighting {}", i),
        None => String::new(),
    }
}

impl CoreError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument { index: None, reason: reason.into() }
    }

    /// Attach the index of the sighting that triggered the error
    pub fn at(self, index: usize) -> Self {
        match self {
            CoreError::InvalidArgument { reason, .. } => {
                CoreError::InvalidArgument { index: Some(index), reason }
            }
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            CoreError::InvalidArgument { index, .. } => *index,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
