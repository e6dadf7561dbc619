use mealdb_common::error::CommonError;

use crate::browse::BrowserKind;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("catalog aggregation failed at letter '{letter}': {source}")]
    Aggregation {
        letter: char,
        #[source]
        source: CommonError,
    },

    #[error("unknown {kind}: {name}")]
    UnknownOption { kind: BrowserKind, name: String },
}
