use thiserror::Error;

use crate::Category;

/// Errors surfaced by request validation and parsing.
///
/// Once a request validates, the search itself only fails on cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    /// Non-positive or missing budget, or no modules requested at all.
    #[error("Please enter valid budget and number of modules.")]
    InvalidRequest,

    #[error("module {index} is listed under '{listed}' but is a '{actual}' module")]
    CategoryMismatch {
        listed: Category,
        actual: Category,
        index: u32,
    },

    #[error("duplicate module index {index} in category '{category}'")]
    DuplicateIndex { category: Category, index: u32 },

    #[error("unknown module category '{0}'")]
    UnknownCategory(String),

    #[error("unknown sort key '{0}'")]
    UnknownSortField(String),

    #[error("unknown sort direction '{0}' (expected asc or desc)")]
    UnknownSortDirection(String),

    #[error("computation cancelled")]
    Cancelled,
}
