/*!
 * Validation of finalized documents.
 *
 * - `doi`: liveness of every bibliography DOI against a resolver
 */

pub mod doi;

// Re-export main types
pub use doi::{bibliography_dois, Classification, DoiValidator, ValidationResult, SENTINEL_STATUS};
