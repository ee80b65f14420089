/*!
 * Bibliography DOI liveness checks.
 *
 * Every `\doi{...}` in the bibliography is sent to a resolver, with a bounded
 * number of requests in flight. Each identifier always gets a result, in
 * input order, whatever happens on the network: transport failures and
 * timeouts are folded into a sentinel status instead of being raised.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::document::journal::Identifier;
use crate::errors::{ExtractionError, ResolverError};
use crate::providers::Resolver;

/// Status recorded when the resolver could not be reached
pub const SENTINEL_STATUS: u16 = 500;

const BIBLIOGRAPHY_BEGIN: &str = "\\begin{thebibliography}";
const BIBLIOGRAPHY_END: &str = "\\end{thebibliography}";

/// `%` comment to end of line. A `%` after an odd run of backslashes is
/// escaped; after an even run (`\\%`) it still opens a comment.
static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(^|[^\\])((?:\\\\)*)%.*$").expect("Invalid comment regex")
});

static DOI_COMMAND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\doi\{([^}]+)\}").expect("Invalid DOI command regex")
});

/// Outcome of one DOI check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Resolves (200) or redirects as expected (302)
    Ok,
    /// Resolver does not know the DOI (404)
    Broken,
    /// Any other status, often bot protection rather than breakage
    Suspect,
    /// The check itself could not complete
    Error,
}

/// Result of checking one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub identifier: Identifier,
    pub status_code: u16,
    pub classification: Classification,
}

impl ValidationResult {
    fn from_status(identifier: Identifier, status_code: u16) -> Self {
        let classification = match status_code {
            200 | 302 => Classification::Ok,
            404 => Classification::Broken,
            _ => Classification::Suspect,
        };
        Self { identifier, status_code, classification }
    }

    fn from_failure(identifier: Identifier) -> Self {
        Self { identifier, status_code: SENTINEL_STATUS, classification: Classification::Error }
    }
}

/// DOIs cited in the bibliography, in order, ignoring commented-out text
pub fn bibliography_dois(document: &str) -> Result<Vec<Identifier>, ExtractionError> {
    let start = document
        .find(BIBLIOGRAPHY_BEGIN)
        .map(|pos| pos + BIBLIOGRAPHY_BEGIN.len())
        .ok_or(ExtractionError::BibliographyNotFound)?;
    let end = document[start..]
        .find(BIBLIOGRAPHY_END)
        .map(|pos| pos + start)
        .ok_or(ExtractionError::BibliographyNotFound)?;

    let uncommented = COMMENT_REGEX.replace_all(&document[start..end], "${1}${2}");

    Ok(DOI_COMMAND_REGEX
        .captures_iter(&uncommented)
        .filter_map(|cap| cap.get(1))
        .map(|m| Identifier::new(m.as_str()))
        .collect())
}

/// Checks DOIs against a resolver with bounded concurrency
#[derive(Debug)]
pub struct DoiValidator<R: Resolver> {
    resolver: R,
    pool_size: usize,
    timeout: Duration,
}

impl<R: Resolver> DoiValidator<R> {
    pub fn new(resolver: R, pool_size: usize, timeout: Duration) -> Self {
        Self {
            resolver,
            pool_size: pool_size.max(1),
            timeout,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Check every identifier; the output has the input's length and order
    pub async fn check(&self, identifiers: &[Identifier]) -> Vec<ValidationResult> {
        self.check_with_progress(identifiers, |_, _| {}).await
    }

    /// Like `check`, calling `progress(done, total)` as checks complete
    pub async fn check_with_progress(
        &self,
        identifiers: &[Identifier],
        progress: impl Fn(usize, usize),
    ) -> Vec<ValidationResult> {
        let total = identifiers.len();
        let mut slots: Vec<Option<ValidationResult>> = vec![None; total];

        let mut completed = stream::iter(identifiers.iter().enumerate())
            .map(|(index, identifier)| async move { (index, self.check_one(identifier).await) })
            .buffer_unordered(self.pool_size);

        let mut done = 0;
        while let Some((index, result)) = completed.next().await {
            slots[index] = Some(result);
            done += 1;
            progress(done, total);
        }

        let results: Vec<ValidationResult> = slots
            .into_iter()
            .zip(identifiers)
            .map(|(slot, identifier)| slot.unwrap_or_else(|| ValidationResult::from_failure(identifier.clone())))
            .collect();

        self.report(&results);
        results
    }

    /// Check the bibliography of `document`
    pub async fn check_document(&self, document: &str) -> Result<Vec<ValidationResult>, ExtractionError> {
        let identifiers = bibliography_dois(document)?;
        debug!("Found {} DOI(s) in the bibliography", identifiers.len());
        Ok(self.check(&identifiers).await)
    }

    /// Identifiers of `document` whose resolver status is not 200
    pub async fn find_suspect_dois(&self, document: &str) -> Result<Vec<Identifier>, ExtractionError> {
        Ok(self
            .check_document(document)
            .await?
            .into_iter()
            .filter(|result| result.status_code != 200)
            .map(|result| result.identifier)
            .collect())
    }

    async fn check_one(&self, identifier: &Identifier) -> ValidationResult {
        let outcome = match tokio::time::timeout(self.timeout, self.resolver.status(identifier.as_str())).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ResolverError::Timeout(self.timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(status) => ValidationResult::from_status(identifier.clone(), status),
            Err(e) => {
                debug!("Check of {} failed: {}", identifier, e);
                ValidationResult::from_failure(identifier.clone())
            }
        }
    }

    /// Log every result that needs a human; reference numbers are 1-based
    fn report(&self, results: &[ValidationResult]) {
        for (index, result) in results.iter().enumerate() {
            let url = self.resolver.url_for(result.identifier.as_str());
            match result.classification {
                Classification::Ok => {}
                Classification::Broken => {
                    error!("Reference [{}] does not resolve (404): {}", index + 1, url);
                }
                Classification::Suspect => {
                    warn!("Reference [{}] returned {}, check by hand: {}", index + 1, result.status_code, url);
                }
                Classification::Error => {
                    warn!("Reference [{}] could not be checked: {}", index + 1, url);
                }
            }
        }
    }
}
