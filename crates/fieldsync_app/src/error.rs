//! Application error types.

use fieldsync_core::CoreError;
use fieldsync_sync_engine::SyncError;
use thiserror::Error;

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by application operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A goal for the same month, branch and product already exists.
    #[error("a goal for month {month}, branch '{branch}' and product '{product}' already exists")]
    DuplicateGoal {
        /// Goal month.
        month: u32,
        /// Goal branch.
        branch: String,
        /// Goal product.
        product: String,
    },

    /// A referenced record does not exist.
    #[error("{collection} record {id} not found")]
    NotFound {
        /// Collection searched.
        collection: &'static str,
        /// Requested id.
        id: String,
    },

    /// Module name not recognized.
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] CoreError),

    /// Sync failure.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl AppError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(collection: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    /// Renders the short notification shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::DuplicateGoal { .. } => {
                "A goal for this month, branch and product already exists.".to_string()
            }
            AppError::Sync(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_goal_message_is_specific() {
        let err = AppError::DuplicateGoal {
            month: 3,
            branch: "Centro".into(),
            product: "Plan A".into(),
        };
        assert!(err.to_string().contains("month 3"));
        assert_eq!(
            err.user_message(),
            "A goal for this month, branch and product already exists."
        );
    }

    #[test]
    fn sync_errors_keep_their_message() {
        let err = AppError::from(SyncError::ConfigMissing { module: "sales".into() });
        assert!(err.user_message().contains("sales"));
    }
}
