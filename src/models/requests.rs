//! Request DTOs for the table cache API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

use crate::error_store::{ErrorEntryFilter, ErrorOccurrence, ErrorType};

/// Largest page of error entries returned in one response.
pub const MAX_ERROR_PAGE: usize = 1000;

/// Query string for GET /apps/:app/errors
///
/// # Fields
/// - `stream`: only entries of this stream
/// - `occurrence`: only entries recorded at this point of the pipeline
/// - `error_type`: only mapping or transport failures
/// - `offset`, `limit`: paging over the matching entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorQuery {
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub occurrence: Option<ErrorOccurrence>,
    #[serde(default)]
    pub error_type: Option<ErrorType>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ErrorQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.limit {
            Some(0) => Some("Limit must be greater than zero".to_string()),
            Some(limit) if limit > MAX_ERROR_PAGE => Some(format!(
                "Limit exceeds maximum page size of {}",
                MAX_ERROR_PAGE
            )),
            _ => None,
        }
    }

    pub fn into_filter(self) -> ErrorEntryFilter {
        ErrorEntryFilter {
            stream: self.stream,
            occurrence: self.occurrence,
            error_type: self.error_type,
            offset: self.offset,
            limit: Some(self.limit.unwrap_or(MAX_ERROR_PAGE)),
        }
    }
}
