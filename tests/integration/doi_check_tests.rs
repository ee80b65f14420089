/*!
 * Tests for checking bibliography DOIs through the controller
 */

use anyhow::Result;
use std::time::Duration;
use metaforge::app_config::Config;
use metaforge::app_controller::Controller;
use metaforge::providers::mock::{MockAnswer, MockConverter, MockResolver};
use metaforge::validation::{Classification, DoiValidator, SENTINEL_STATUS};
use crate::common;

fn controller(concurrent_requests: usize, timeout_secs: u64) -> Controller {
    let mut config = Config::default();
    config.resolver.concurrent_requests = concurrent_requests;
    config.resolver.timeout_secs = timeout_secs;
    Controller::with_converter(config, Box::new(MockConverter::paragraph()))
}

#[tokio::test]
async fn test_check_dois_withTemplate_shouldReportEachReference() -> Result<()> {
    common::init_test_logger();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_manuscript(temp_dir.path(), "main.tex")?;

    let resolver = MockResolver::working()
        .with_answer("10.1000/second.2", MockAnswer::Status(404))
        .with_answer("10.1000/third.3", MockAnswer::Status(403));
    let report = controller(4, 5).check_dois_with(&path, resolver).await?;

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.checked(), 3);
    assert_eq!(report.count(Classification::Ok), 1);
    assert_eq!(report.count(Classification::Broken), 1);
    assert_eq!(report.count(Classification::Suspect), 1);
    Ok(())
}

#[tokio::test]
async fn test_check_dois_withFolder_shouldSkipFilesWithoutBibliography() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a/paper.tex", &common::bibliography_document(&["10.1/a", "10.1/b"]))?;
    common::create_test_file(temp_dir.path(), "b/preamble.tex", "\\usepackage{hyperref}")?;
    common::create_test_file(temp_dir.path(), "c/paper.tex", &common::bibliography_document(&["10.1/c"]))?;
    common::create_test_file(temp_dir.path(), "c/notes.txt", &common::bibliography_document(&["10.1/ignored"]))?;

    let resolver = MockResolver::working();
    let report = controller(2, 5).check_dois_with(temp_dir.path(), resolver).await?;

    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].0.ends_with("a/paper.tex"));
    assert!(report.files[1].0.ends_with("c/paper.tex"));
    assert_eq!(report.checked(), 3);
    Ok(())
}

#[tokio::test]
async fn test_check_dois_withSingleFileWithoutBibliography_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "main.tex", "\\begin{document}\\end{document}")?;

    let result = controller(2, 5).check_dois_with(&path, MockResolver::working()).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_check_dois_withMissingPath_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = controller(2, 5)
        .check_dois_with(temp_dir.path().join("missing.tex"), MockResolver::working())
        .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_validator_withOneHangingResolver_shouldReturnEveryResultInOrder() {
    let dois: Vec<String> = (1..=10).map(|i| format!("10.1000/item.{}", i)).collect();
    let refs: Vec<&str> = dois.iter().map(String::as_str).collect();
    let document = common::bibliography_document(&refs);

    let resolver = MockResolver::working()
        .with_answer(dois[7].clone(), MockAnswer::Slow { delay_ms: 10_000, status: 200 })
        .with_answer(dois[2].clone(), MockAnswer::NetworkError);
    let validator = DoiValidator::new(resolver, 10, Duration::from_millis(200));

    let results = validator.check_document(&document).await.unwrap();

    assert_eq!(results.len(), 10);
    for (result, doi) in results.iter().zip(&dois) {
        assert_eq!(result.identifier.as_str(), doi);
    }
    assert_eq!(results[7].status_code, SENTINEL_STATUS);
    assert_eq!(results[7].classification, Classification::Error);
    assert_eq!(results[2].classification, Classification::Error);
    assert_eq!(
        results.iter().filter(|r| r.classification == Classification::Ok).count(),
        8
    );
}
