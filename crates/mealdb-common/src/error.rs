/// Error types shared by crates that talk to the MealDB API.
///
/// Application crates wrap `CommonError` via `#[from]` in their own error enums.
use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("response carried no {0} collection")]
    MissingCollection(&'static str),
}

impl CommonError {
    /// Unwrap an optional collection, treating `None` as a failure.
    pub fn require<T>(items: Option<Vec<T>>, what: &'static str) -> Result<Vec<T>, Self> {
        items.ok_or(CommonError::MissingCollection(what))
    }
}
