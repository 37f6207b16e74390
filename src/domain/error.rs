//! Conversion and codec errors (the node core itself never fails)

use thiserror::Error;

/// Errors raised at the map, JSON and binary boundaries.
///
/// Validation stops at the first offending field or child. Nested child
/// failures are wrapped in [`AtomError::InvalidChild`] so the message names
/// the full index path, e.g. `child[1]: child[0]: missing or empty 'id'`.
#[derive(Error, Debug)]
pub enum AtomError {
    #[error("atom must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing or empty '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}, got {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("property '{key}' must be a string, number or boolean, got {found}")]
    InvalidPropertyValue { key: String, found: &'static str },

    #[error("unexpected key: {0}")]
    UnexpectedKey(String),

    #[error("child[{index}]: {source}")]
    InvalidChild {
        index: usize,
        #[source]
        source: Box<AtomError>,
    },

    #[error("atom[{index}]: {source}")]
    InvalidElement {
        index: usize,
        #[source]
        source: Box<AtomError>,
    },

    #[error("empty input")]
    EmptyInput,

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary {context}: {source}")]
    Binary {
        context: &'static str,
        #[source]
        source: bincode::Error,
    },
}

impl AtomError {
    pub(crate) fn child(index: usize, source: AtomError) -> Self {
        Self::InvalidChild {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn element(index: usize, source: AtomError) -> Self {
        Self::InvalidElement {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn binary(context: &'static str, source: bincode::Error) -> Self {
        Self::Binary { context, source }
    }
}

/// Result type for conversion and codec operations.
pub type AtomResult<T> = Result<T, AtomError>;
