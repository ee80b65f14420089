/*!
 * Error types for the metaforge application.
 *
 * This module contains custom error types for the different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::document::regions::Region;
use crate::document::rewrite::RewriteStep;

/// Errors raised while locating a marker-delimited region
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Either the begin or the end marker is absent
    #[error("Region not found: {region}")]
    RegionNotFound {
        /// Region that was queried
        region: Region,
    },

    /// The begin marker occurs more than once
    #[error("Region marker appears {count} times: {region}")]
    AmbiguousRegion {
        /// Region that was queried
        region: Region,
        /// Number of begin markers found
        count: usize,
    },

    /// Affiliation labels are out of order or have gaps
    #[error("Malformed affiliation list, labels found: {found:?}")]
    MalformedAffiliationList {
        /// Labels in document order
        found: Vec<u32>,
    },

    /// A field inside an existing region is missing
    #[error("Field '{field}' not found in region {region}")]
    FieldNotFound {
        /// Region that was searched
        region: Region,
        /// Field label
        field: &'static str,
    },

    /// No `thebibliography` environment
    #[error("Bibliography environment not found")]
    BibliographyNotFound,

    /// A date inside a region could not be read
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}

/// Errors raised by the date parsers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Digit groups are insufficient or misordered
    #[error("Ambiguous date '{input}': {reason}")]
    DateParseAmbiguous {
        /// Raw input
        input: String,
        /// What was missing
        reason: String,
    },
}

/// Recoverable problems reported by the document rewriter
///
/// None of these stop the rewrite; the document is returned with the failed
/// step left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteIssue {
    /// The anchor text of a step is absent
    #[error("Step '{step}' did not apply: anchor text not found")]
    ReplacementNoOp {
        step: RewriteStep,
    },

    /// The identifier names a journal family without rules
    #[error("Unknown journal family '{family}', banner left unmodified")]
    UnknownJournalFamily {
        family: String,
    },

    /// The identifier is too short for the family's banner
    #[error("Identifier '{identifier}' has no segment {index}, banner left unmodified")]
    MissingIdentifierSegment {
        identifier: String,
        index: usize,
    },

    /// A step needed a region that could not be located
    #[error("Step '{step}' skipped: {source}")]
    Region {
        step: RewriteStep,
        #[source]
        source: ExtractionError,
    },
}

/// Errors from the abstract markup conversion
#[derive(Error, Debug)]
pub enum AbstractError {
    /// The abstract region could not be located
    #[error("Abstract not found: {0}")]
    Extraction(#[from] ExtractionError),

    /// The converter is missing, failed, or produced nothing
    #[error("Abstract conversion unavailable: {0}")]
    AbstractConversionUnavailable(String),
}

/// Errors that can occur when querying the DOI resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("DOI check network error: {0}")]
    DoiCheckNetworkError(String),

    /// No response within the configured deadline
    #[error("DOI check timed out after {0} ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for ResolverError {
    fn from(error: reqwest::Error) -> Self {
        Self::DoiCheckNetworkError(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from region extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from date handling
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Error from abstract conversion
    #[error("Abstract error: {0}")]
    Abstract(#[from] AbstractError),

    /// Error from the DOI resolver
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
