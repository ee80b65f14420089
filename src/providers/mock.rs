/*!
 * Mock collaborators for testing.
 *
 * - `MockResolver` answers per-DOI with a fixed status, a transport failure
 *   or a delayed status, and records how many calls were in flight at once
 * - `MockConverter` returns canned markup or fails
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AbstractError, ResolverError};
use crate::providers::{MarkupConverter, Resolver};

/// Behavior of the mock resolver for one DOI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockAnswer {
    /// Respond immediately with a status
    Status(u16),
    /// Fail at the transport level
    NetworkError,
    /// Respond with a status after a delay
    Slow { delay_ms: u64, status: u16 },
}

/// Mock DOI resolver
#[derive(Debug, Clone)]
pub struct MockResolver {
    default_answer: MockAnswer,
    answers: HashMap<String, MockAnswer>,
    request_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockResolver {
    /// Resolver answering `default_answer` for every DOI
    pub fn new(default_answer: MockAnswer) -> Self {
        Self {
            default_answer,
            answers: HashMap::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver where every DOI resolves
    pub fn working() -> Self {
        Self::new(MockAnswer::Status(200))
    }

    /// Override the answer for one DOI
    pub fn with_answer(mut self, doi: impl Into<String>, answer: MockAnswer) -> Self {
        self.answers.insert(doi.into(), answer);
        self
    }

    /// Total number of status requests served
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent requests observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn status(&self, doi: &str) -> Result<u16, ResolverError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let answer = self.answers.get(doi).copied().unwrap_or(self.default_answer);
        let result = match answer {
            MockAnswer::Status(status) => {
                // Yield so concurrent calls overlap
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(status)
            }
            MockAnswer::NetworkError => Err(ResolverError::DoiCheckNetworkError(format!(
                "simulated connection reset for {}",
                doi
            ))),
            MockAnswer::Slow { delay_ms, status } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(status)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn url_for(&self, doi: &str) -> String {
        format!("https://doi.org/{}", doi)
    }
}

/// Mock markup converter
#[derive(Debug, Clone)]
pub struct MockConverter {
    output: Option<String>,
}

impl MockConverter {
    /// Converter returning `output` verbatim
    pub fn returning(output: impl Into<String>) -> Self {
        Self { output: Some(output.into()) }
    }

    /// Converter wrapping its input in a paragraph element
    pub fn paragraph() -> Self {
        Self { output: None }
    }
}

impl MarkupConverter for MockConverter {
    fn convert(&self, latex: &str) -> Result<String, AbstractError> {
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Ok(format!("<p>{}</p>", latex)),
        }
    }
}

/// Converter that is never available
#[derive(Debug, Clone, Default)]
pub struct UnavailableConverter;

impl MarkupConverter for UnavailableConverter {
    fn convert(&self, _latex: &str) -> Result<String, AbstractError> {
        Err(AbstractError::AbstractConversionUnavailable("converter not installed".to_string()))
    }
}
