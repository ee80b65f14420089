/*!
 * # MetaForge - manuscript finalization for a small journal family
 *
 * A Rust library that turns a LaTeX manuscript template into its
 * publication form and checks that the DOIs it cites still resolve.
 *
 * ## Features
 *
 * - Read the title, abstract, dates, affiliations and emails out of the
 *   marker-delimited regions of a template
 * - Finalize a template for a DOI: banner, header link, Crossmark side panel,
 *   narrow layout and publication date
 * - Restamp the publication date of an existing document
 * - Convert the abstract to JATS through an external converter
 * - Check every bibliography DOI against a resolver with bounded concurrency
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Template reading and rewriting:
 *   - `document::regions`: Marker-delimited regions and their accessors
 *   - `document::dates`: Calendar dates in the two textual formats
 *   - `document::journal`: Identifiers and per-family journal rules
 *   - `document::rewrite`: The finalization chain and date stamping
 *   - `document::jats`: Abstract text and JATS markup
 * - `validation`: DOI liveness checks
 * - `providers`: Resolver and converter implementations:
 *   - `providers::doi_org`: HTTP resolver
 *   - `providers::pandoc`: Child-process converter
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document::{finalize, stamp_dates, Abstract, CalendarDate, Finalized, Identifier, JournalRules, Region};
pub use errors::{AbstractError, AppError, DateError, ExtractionError, ResolverError, RewriteIssue};
pub use validation::{Classification, DoiValidator, ValidationResult};
