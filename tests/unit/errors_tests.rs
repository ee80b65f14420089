/*!
 * Tests for error types and conversions
 */

use metaforge::document::{Region, RewriteStep};
use metaforge::errors::{AbstractError, AppError, DateError, ExtractionError, ResolverError, RewriteIssue};

#[test]
fn test_extractionError_regionNotFound_shouldNameRegion() {
    let error = ExtractionError::RegionNotFound { region: Region::DoiBlock };
    let display = format!("{}", error);
    assert!(display.contains("Region not found"));
    assert!(display.contains(Region::DoiBlock.name()));
}

#[test]
fn test_extractionError_malformedAffiliations_shouldListLabels() {
    let error = ExtractionError::MalformedAffiliationList { found: vec![1, 3] };
    assert!(format!("{}", error).contains("[1, 3]"));
}

#[test]
fn test_rewriteIssue_noOp_shouldNameStep() {
    let issue = RewriteIssue::ReplacementNoOp { step: RewriteStep::Banner };
    assert!(format!("{}", issue).contains("banner"));
}

#[test]
fn test_rewriteIssue_region_shouldIncludeSource() {
    let issue = RewriteIssue::Region {
        step: RewriteStep::DoiBlock,
        source: ExtractionError::RegionNotFound { region: Region::DoiBlock },
    };
    let display = format!("{}", issue);
    assert!(display.contains("doi-block"));
    assert!(display.contains("Region not found"));
}

#[test]
fn test_appError_fromDateError_shouldWrap() {
    let error: AppError = DateError::DateParseAmbiguous {
        input: "2024".to_string(),
        reason: "no day or month".to_string(),
    }
    .into();
    assert!(matches!(error, AppError::Date(_)));
    assert!(format!("{}", error).contains("2024"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tex");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknown() {
    let error: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(error, AppError::Unknown(ref message) if message == "boom"));
}

#[test]
fn test_abstractError_fromExtraction_shouldWrap() {
    let error: AbstractError = ExtractionError::RegionNotFound { region: Region::Abstract }.into();
    assert!(matches!(error, AbstractError::Extraction(_)));
}

#[test]
fn test_resolverError_timeout_shouldDisplayDuration() {
    let error = ResolverError::Timeout(1500);
    assert!(format!("{}", error).contains("1500 ms"));
}
