/*!
 * Tests for reading the manuscript template through the public API
 */

use chrono::NaiveDate;
use metaforge::document::journal::{JournalRules, NarrowLayout};
use metaforge::document::regions;
use metaforge::document::{CalendarDate, Identifier, Region};
use metaforge::errors::{DateError, ExtractionError};
use crate::common;

#[test]
fn test_title_withMultilineTitle_shouldJoinLines() {
    let title = regions::title(&common::template()).unwrap();
    assert_eq!(title, "Quantum spin chains at finite temperature");
}

#[test]
fn test_abstract_text_shouldFlattenWhitespace() {
    let text = regions::abstract_text(&common::template()).unwrap();
    assert!(text.starts_with("We study spin chains at finite temperature using $\\alpha$-expansions."));
    assert!(!text.contains('\n'));
}

#[test]
fn test_dates_shouldReadReceivedAndAccepted() {
    let (received, accepted) = regions::dates(&common::template()).unwrap();
    assert_eq!(received.ymd(), "2024-01-12");
    assert_eq!(accepted.ymd(), "2024-03-05");
}

#[test]
fn test_affiliations_shouldBeKeyedByLabel() {
    let affiliations = regions::affiliations(&common::template()).unwrap();
    assert_eq!(affiliations.len(), 2);
    assert_eq!(affiliations[&1], "Department of Physics, University A, City, Country");
    assert_eq!(affiliations[&2], "Institute B, City, Country");
}

#[test]
fn test_emails_shouldPairSymbolsWithAddresses() {
    let emails = regions::emails(&common::template()).unwrap();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].symbol, "\\star");
    assert_eq!(emails[0].address, "alice@uni-a.org");
    assert_eq!(emails[1].symbol, "\\dagger");
    assert_eq!(emails[1].address, "bob@inst-b.org");
}

#[test]
fn test_extract_region_withDuplicatedMarker_shouldBeAmbiguous() {
    let doc = format!("{}\n{}", common::template(), "%%%%%%%%%% TODO: DOI\nagain\n%%%%%%%%%% END TODO: DOI");
    assert_eq!(
        regions::extract_region(&doc, Region::DoiBlock),
        Err(ExtractionError::AmbiguousRegion { region: Region::DoiBlock, count: 2 })
    );
}

#[test]
fn test_accessors_shouldFailIndependently() {
    let doc = common::template().replace("% TODO: EMAIL\n", "");
    assert!(regions::emails(&doc).is_err());
    assert!(regions::title(&doc).is_ok());
    assert!(regions::affiliations(&doc).is_ok());
}

#[test]
fn test_parse_dmy_and_ymd_shouldRenderBothFormats() {
    assert_eq!(CalendarDate::parse_dmy("05-03-2024").unwrap().ymd(), "2024-03-05");
    assert_eq!(CalendarDate::parse_ymd("2024-03-05").unwrap().dmy(), "5-03-2024");
}

#[test]
fn test_parse_ymd_withShortGroups_shouldNotReuseYearDigits() {
    let date = CalendarDate::parse_ymd("2024-3-5").unwrap();
    assert_eq!((date.year, date.month, date.day), (2024, 3, 5));
}

#[test]
fn test_parse_dmy_withYearOnly_shouldBeAmbiguous() {
    assert!(matches!(
        CalendarDate::parse_dmy("2024"),
        Err(DateError::DateParseAmbiguous { .. })
    ));
}

#[test]
fn test_from_cli_argument_shouldHandleEveryForm() {
    let today = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();

    assert_eq!(CalendarDate::from_cli_argument("", today).unwrap().ymd(), "2024-02-27");
    assert_eq!(CalendarDate::from_cli_argument("3", today).unwrap().ymd(), "2024-03-01");
    assert_eq!(CalendarDate::from_cli_argument("2024-03-12", today).unwrap().dmy(), "12-03-2024");
    assert_eq!(CalendarDate::from_cli_argument("12-03-2024", today).unwrap().ymd(), "2024-03-12");
}

#[test]
fn test_journal_rules_shouldCoverEveryFamily() {
    for family in ["A", "B", "C", "D"] {
        assert!(JournalRules::for_family(family).is_some(), "missing family {}", family);
    }
    assert!(JournalRules::for_family("Z").is_none());
    assert_eq!(JournalRules::for_family("C").unwrap().narrow_layout, NarrowLayout::Skip);
}

#[test]
fn test_render_banner_withShortIdentifier_shouldReportMissingSegment() {
    let rules = JournalRules::for_family("A").unwrap();
    assert_eq!(rules.render_banner(&Identifier::new("A.5")), Err(3));
    assert_eq!(rules.render_banner(&Identifier::new("A.5.2.100")), Ok(" 5, 100 (20??)".to_string()));
}
