//! Data models for Lendbook

pub mod item;
pub mod loan;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

// Re-export commonly used types
pub use item::Item;
pub use loan::{CreateLoan, Loan, LoanDetails, LoanStatus, NewLoan};
pub use user::User;

/// Display name of a record referenced by a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize, ToSchema)]
pub struct NameRef {
    pub name: String,
}

/// Plain confirmation message (e.g. after a delete)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Rejects names that are empty once surrounding whitespace is removed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Name is required".into());
        return Err(err);
    }
    Ok(())
}
