/*!
 * Tests for the application controller
 */

use anyhow::Result;
use metaforge::app_config::Config;
use metaforge::app_controller::{Controller, Inspection};
use metaforge::document::CalendarDate;
use metaforge::errors::ExtractionError;
use metaforge::providers::mock::{MockConverter, UnavailableConverter};
use crate::common;

fn controller() -> Controller {
    Controller::with_converter(Config::default(), Box::new(MockConverter::paragraph()))
}

/// Test that the default configuration builds a controller
#[test]
fn test_new_for_test_shouldSucceed() {
    let controller = Controller::new_for_test();
    assert!(controller.is_ok());
}

/// Test that an invalid configuration is refused
#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.resolver.concurrent_requests = 0;
    assert!(Controller::with_config(config).is_err());
}

/// Test that change_date rewrites the file in place
#[test]
fn test_change_date_shouldStampFileInPlace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_manuscript(temp_dir.path(), "paper/main.tex")?;

    let date = CalendarDate::parse_dmy("12-03-2024")?;
    let stamped = controller().change_date(&path, &date)?;

    let written = std::fs::read_to_string(&path)?;
    assert_eq!(written, stamped.document);
    assert!(written.contains("Published 12-03-2024"));
    assert!(written.contains("Journal A ?, ??? (2024)"));
    Ok(())
}

/// Test that a missing manuscript is an error
#[test]
fn test_change_date_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let date = CalendarDate::parse_dmy("12-03-2024")?;
    assert!(controller().change_date(temp_dir.path().join("missing.tex"), &date).is_err());
    Ok(())
}

/// Test that write_jats_abstract flattens the text and appends the stub
#[test]
fn test_write_jats_abstract_shouldRewriteFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "abstract.txt", "  First line\nsecond 50% line\n")?;

    let abstract_ = controller().write_jats_abstract(&path)?;

    assert_eq!(abstract_.plain_text, "First line second 50% line");
    assert_eq!(abstract_.markup, "<jats:p>First line second 50% line</jats:p>");

    let written = std::fs::read_to_string(&path)?;
    assert!(written.starts_with("First line second 50% line\n\n"));
    assert!(written.contains("The abstract contains the special character: % (1)"));
    assert!(written.ends_with("<jats:p>First line second 50% line</jats:p>\n\n--------\\bibitem{Test_Item}\\doi{INSERT_DOI}"));
    Ok(())
}

/// Test that a failing converter leaves the abstract file untouched
#[test]
fn test_write_jats_abstract_withUnavailableConverter_shouldKeepFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "abstract.txt", "Original\ntext")?;

    let controller = Controller::with_converter(Config::default(), Box::new(UnavailableConverter));
    assert!(controller.write_jats_abstract(&path).is_err());
    assert_eq!(std::fs::read_to_string(&path)?, "Original\ntext");
    Ok(())
}

/// Test that inspect reports each accessor on its own
#[test]
fn test_inspect_withBrokenAffiliations_shouldStillReadTitle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let broken = common::template().replace("{\\bf 2}", "{\\bf 3}");
    let path = common::create_test_file(temp_dir.path(), "main.tex", &broken)?;

    let inspection = controller().inspect(&path)?;

    assert_eq!(inspection.title.as_deref().ok(), Some("Quantum spin chains at finite temperature"));
    assert_eq!(
        inspection.affiliations,
        Err(ExtractionError::MalformedAffiliationList { found: vec![1, 3] })
    );
    assert!(inspection.emails.is_ok());

    let printed = inspection.to_string();
    assert!(printed.contains("Title: Quantum spin chains"));
    assert!(printed.contains("Affiliations: <Malformed affiliation list"));
    assert!(printed.contains("Received: 12-01-2024"));
    Ok(())
}

/// Test the plain Display of a complete inspection
#[test]
fn test_inspection_display_shouldListAffiliationsAndEmails() {
    let printed = Inspection::of(&common::template()).to_string();
    assert!(printed.contains("  1. Department of Physics, University A, City, Country"));
    assert!(printed.contains("  \\dagger bob@inst-b.org"));
    assert!(printed.contains("Accepted: 5-03-2024"));
}

/// Test that DOI checks run from synchronous code through block_on
#[test]
fn test_check_dois_withBlockOn_shouldCountBrokenReferences() -> Result<()> {
    use metaforge::providers::mock::{MockAnswer, MockResolver};
    use metaforge::validation::Classification;

    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_manuscript(temp_dir.path(), "main.tex")?;
    let resolver = MockResolver::working().with_answer("10.1000/first.1", MockAnswer::Status(404));

    let report = tokio_test::block_on(async { controller().check_dois_with(&path, resolver).await })?;

    assert_eq!(report.checked(), 3);
    assert_eq!(report.count(Classification::Broken), 1);
    Ok(())
}
