/*!
 * External collaborators behind traits.
 *
 * - `doi_org`: DOI resolver over HTTP
 * - `pandoc`: LaTeX to JATS converter run as a child process
 * - `mock`: deterministic stand-ins for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::{AbstractError, ResolverError};

/// A service answering whether a DOI resolves
///
/// Only the HTTP status code of the resolver's answer is consumed.
#[async_trait]
pub trait Resolver: Send + Sync + Debug {
    /// Status code returned for `doi`, without following redirects
    ///
    /// # Returns
    /// * `Result<u16, ResolverError>` - The status or a transport failure
    async fn status(&self, doi: &str) -> Result<u16, ResolverError>;

    /// URL a human can open to check `doi`
    fn url_for(&self, doi: &str) -> String;
}

/// Converts plain LaTeX abstract text into JATS markup
pub trait MarkupConverter: Send + Sync + Debug {
    fn convert(&self, latex: &str) -> Result<String, AbstractError>;
}

pub mod doi_org;
pub mod mock;
pub mod pandoc;
