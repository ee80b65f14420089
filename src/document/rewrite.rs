/*!
 * Draft-to-publication rewriting.
 *
 * `finalize` turns a draft template into its published form through a fixed
 * chain of literal replacements. Templates drift over time, so a step whose
 * anchor text is missing is reported and skipped; the remaining steps still
 * run and the document is always returned. Every replacement consumes its
 * anchor, which makes a second run report each step as a no-op instead of
 * inserting anything twice. Dates are the exception: they are found by shape
 * and overwritten, and only count as a no-op when already equal.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

use crate::document::dates::CalendarDate;
use crate::document::journal::{DoiBlockShape, Identifier, JournalRules, NarrowLayout, CROSSMARK_IMAGE};
use crate::document::regions::{self, Region};
use crate::errors::RewriteIssue;

const LINE_NUMBERS: &str = "\n\\linenumbers";
const LINE_NUMBERS_DISABLED: &str = "\n% \\linenumbers";

const FOOTNOTE_PACKAGE: &str = "\n\\usepackage[bottom]{footmisc}";
const FOOTNOTE_PACKAGE_DISABLED: &str = "\n% \\usepackage[bottom]{footmisc}";

const URL_BIBLIOGRAPHY_STYLE: &str = "\\bibliographystyle{unsrturl}";
const CROSSREF_BIBLIOGRAPHY_STYLE: &str = "\\bibliographystyle{unsrt-crossref}";

const HEADER_LINK_PLACEHOLDER: &str = "https://doi.org/PLACEHOLDER_DOI";

/// Tags both lines of the injected layout so it can be detected later
const NARROW_LAYOUT_TAG: &str = "% side panel layout";

/// Text width reserved for the DOI side panel
const SIDE_PANEL_WIDTH: f64 = 0.25;

/// Host that only appears in the DOI block once the badge is in place
const CROSSMARK_HOST: &str = "crossmark.crossref.org";

const DATE_STAMP_PLACEHOLDER: &str = "date_stamp=YYYY-MM-DD";
const HEADER_YEAR_PLACEHOLDER: &str = "(20??)";

/// Publication line, still a placeholder or already dated
static PUBLISHED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Published (DD-MM-YYYY|\d{1,2}-\d{1,2}-\d{4})").expect("Invalid published line regex")
});

/// Crossmark date stamp, still a placeholder or already dated
static DATE_STAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"date_stamp=(YYYY-MM-DD|\d{4}-\d{1,2}-\d{1,2})").expect("Invalid date stamp regex")
});

/// Year closing the banner of the running header link
static HEADER_YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\fancyhead\[[^\]]*\]\{\\href\{[^}]*\}\{[^}]*\((\d{4})\)\}\}")
        .expect("Invalid header year regex")
});

/// Width of the header box that encloses the dates region
static HEADER_BOX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\begin\{minipage\}\[t\]\{([0-9]*\.?[0-9]+)\\textwidth\}\s*\n%+ TODO: DATES\n")
        .expect("Invalid header box regex")
});

/// One step of the rewrite chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteStep {
    LineNumbers,
    FootnotePackage,
    BibliographyStyle,
    HeaderLink,
    NarrowLayout,
    Banner,
    DoiBlock,
    PublishedLine,
    DateStamp,
    HeaderYear,
}

impl fmt::Display for RewriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LineNumbers => "line-numbers",
            Self::FootnotePackage => "footnote-package",
            Self::BibliographyStyle => "bibliography-style",
            Self::HeaderLink => "header-link",
            Self::NarrowLayout => "narrow-layout",
            Self::Banner => "banner",
            Self::DoiBlock => "doi-block",
            Self::PublishedLine => "published-line",
            Self::DateStamp => "date-stamp",
            Self::HeaderYear => "header-year",
        };
        write!(f, "{}", name)
    }
}

/// A rewritten document with the issues met on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub document: String,
    pub issues: Vec<RewriteIssue>,
}

impl Finalized {
    /// True when every step applied
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Replace every occurrence of `from`; the flag says whether anything changed
pub fn replace_literal(text: &str, from: &str, to: &str) -> (String, bool) {
    if from.is_empty() || !text.contains(from) {
        return (text.to_string(), false);
    }
    (text.replace(from, to), true)
}

/// Text threaded through the chain plus the collected diagnostics
struct Chain {
    text: String,
    issues: Vec<RewriteIssue>,
}

impl Chain {
    fn new(text: &str) -> Self {
        Self { text: text.to_string(), issues: Vec::new() }
    }

    fn replace(&mut self, step: RewriteStep, from: &str, to: &str) {
        let (text, applied) = replace_literal(&self.text, from, to);
        if applied {
            debug!("Applied rewrite step '{}'", step);
            self.text = text;
        } else {
            self.report(RewriteIssue::ReplacementNoOp { step });
        }
    }

    /// Rewrite the first capture group of every match to `value`
    fn restamp(&mut self, step: RewriteStep, pattern: &Regex, value: &str) {
        let text = pattern
            .replace_all(&self.text, |caps: &Captures| match (caps.get(0), caps.get(1)) {
                (Some(whole), Some(current)) => {
                    let start = current.start() - whole.start();
                    let end = current.end() - whole.start();
                    format!("{}{}{}", &whole.as_str()[..start], value, &whole.as_str()[end..])
                }
                _ => caps[0].to_string(),
            })
            .into_owned();

        if text != self.text {
            debug!("Applied rewrite step '{}'", step);
            self.text = text;
        } else {
            self.report(RewriteIssue::ReplacementNoOp { step });
        }
    }

    fn apply(&mut self, result: Result<String, RewriteIssue>) {
        match result {
            Ok(text) => self.text = text,
            Err(issue) => self.report(issue),
        }
    }

    fn report(&mut self, issue: RewriteIssue) {
        warn!("{}", issue);
        self.issues.push(issue);
    }

    fn finish(self) -> Finalized {
        Finalized { document: self.text, issues: self.issues }
    }
}

/// Convert a draft into its publication form
pub fn finalize(template: &str, identifier: &Identifier, date: &CalendarDate) -> Finalized {
    let rules = JournalRules::for_identifier(identifier);
    let mut chain = Chain::new(template);

    chain.replace(RewriteStep::LineNumbers, LINE_NUMBERS, LINE_NUMBERS_DISABLED);
    chain.replace(RewriteStep::FootnotePackage, FOOTNOTE_PACKAGE, FOOTNOTE_PACKAGE_DISABLED);
    chain.replace(RewriteStep::BibliographyStyle, URL_BIBLIOGRAPHY_STYLE, CROSSREF_BIBLIOGRAPHY_STYLE);
    chain.replace(RewriteStep::HeaderLink, HEADER_LINK_PLACEHOLDER, &identifier.resolver_url());

    // Unknown families still get the standard layout
    let layout = rules.map_or(NarrowLayout::Standard, |r| r.narrow_layout);
    if layout == NarrowLayout::Standard {
        let result = inject_narrow_layout(&chain.text);
        chain.apply(result);
    }

    match rules {
        Some(rules) => {
            let result = render_banner(&chain.text, rules, identifier);
            chain.apply(result);
        }
        None => chain.report(RewriteIssue::UnknownJournalFamily {
            family: identifier.family().to_string(),
        }),
    }

    let result = rebuild_doi_block(&chain.text, rules, identifier, date);
    chain.apply(result);

    if layout == NarrowLayout::Reactive && !chain.text.contains(NARROW_LAYOUT_TAG) {
        debug!("Narrow layout missing after DOI block, injecting it now");
        let result = inject_narrow_layout(&chain.text);
        chain.apply(result);
    }

    let stamped = stamp_dates(&chain.text, date);
    chain.text = stamped.document;
    chain.issues.extend(stamped.issues);

    chain.finish()
}

/// Write the publication date into the three date-bearing places.
///
/// Each place is matched whether it still holds its placeholder or an earlier
/// date, so a published document can be restamped. Stamping the date a place
/// already carries leaves it unchanged and is reported as a no-op.
pub fn stamp_dates(document: &str, date: &CalendarDate) -> Finalized {
    let mut chain = Chain::new(document);

    chain.restamp(RewriteStep::PublishedLine, &PUBLISHED_REGEX, &date.dmy());
    chain.restamp(RewriteStep::DateStamp, &DATE_STAMP_REGEX, &date.ymd());

    let year = date.year.to_string();
    if chain.text.contains(HEADER_YEAR_PLACEHOLDER) {
        chain.replace(RewriteStep::HeaderYear, HEADER_YEAR_PLACEHOLDER, &format!("({})", year));
    } else {
        chain.restamp(RewriteStep::HeaderYear, &HEADER_YEAR_REGEX, &year);
    }

    chain.finish()
}

/// True once the side-panel layout has been injected
pub fn has_narrow_layout(document: &str) -> bool {
    document.contains(NARROW_LAYOUT_TAG)
}

/// Nest a narrower box inside the dates region to leave room for the panel
fn inject_narrow_layout(document: &str) -> Result<String, RewriteIssue> {
    let no_op = RewriteIssue::ReplacementNoOp { step: RewriteStep::NarrowLayout };

    if has_narrow_layout(document) {
        return Err(no_op);
    }

    let width: f64 = HEADER_BOX_REGEX
        .captures(document)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(no_op)?;
    let narrow = (width - SIDE_PANEL_WIDTH).max(0.1);

    let bounds = regions::region_bounds(document, Region::Dates).map_err(|source| {
        RewriteIssue::Region { step: RewriteStep::NarrowLayout, source }
    })?;

    let mut result = String::with_capacity(document.len() + 128);
    result.push_str(&document[..bounds.start]);
    result.push_str(&format!(
        "\\begin{{minipage}}[t]{{{:.2}\\textwidth}} {}\n",
        narrow, NARROW_LAYOUT_TAG
    ));
    result.push_str(&document[bounds.clone()]);
    result.push_str(&format!("\n\\end{{minipage}}\\hfill {}", NARROW_LAYOUT_TAG));
    result.push_str(&document[bounds.end..]);

    debug!("Injected narrow layout at {:.2} of {:.2} text width", narrow, width);
    Ok(result)
}

fn render_banner(
    document: &str,
    rules: &JournalRules,
    identifier: &Identifier,
) -> Result<String, RewriteIssue> {
    let banner = rules.render_banner(identifier).map_err(|index| {
        RewriteIssue::MissingIdentifierSegment { identifier: identifier.to_string(), index }
    })?;

    match replace_literal(document, rules.banner_placeholder, &banner) {
        (text, true) => {
            debug!("Rendered {} banner:{}", rules.display_name, banner);
            Ok(text)
        }
        (_, false) => Err(RewriteIssue::ReplacementNoOp { step: RewriteStep::Banner }),
    }
}

/// Replace the DOI block contents with the badge and DOI side panel
fn rebuild_doi_block(
    document: &str,
    rules: Option<&JournalRules>,
    identifier: &Identifier,
    date: &CalendarDate,
) -> Result<String, RewriteIssue> {
    let bounds = regions::region_bounds(document, Region::DoiBlock)
        .map_err(|source| RewriteIssue::Region { step: RewriteStep::DoiBlock, source })?;

    if document[bounds.clone()].contains(CROSSMARK_HOST) {
        return Err(RewriteIssue::ReplacementNoOp { step: RewriteStep::DoiBlock });
    }

    let panel = side_panel(rules, identifier, date);

    let mut result = String::with_capacity(document.len() + panel.len());
    result.push_str(&document[..bounds.start]);
    result.push_str(&panel);
    result.push_str(&document[bounds.end..]);
    Ok(result)
}

fn side_panel(rules: Option<&JournalRules>, identifier: &Identifier, date: &CalendarDate) -> String {
    let crossmark_path = rules.map_or(CROSSMARK_IMAGE, |r| r.crossmark_path);
    let doi = identifier.as_str();

    let mut lines = Vec::with_capacity(4);

    if let Some(rules) = rules.filter(|r| r.doi_block == DoiBlockShape::Proceedings) {
        let first_page = rules
            .page_segment
            .and_then(|index| identifier.segment(index))
            .and_then(|page| page.parse::<u32>().ok())
            .unwrap_or(1);
        lines.push(format!("\\setcounter{{page}}{{{}}}", first_page));
    }

    lines.push(format!(
        "\\href{{https://{}/dialog/?doi={}&domain=pdf&{}}}{{\\includegraphics[width=7mm]{{{}}}}}\\\\",
        CROSSMARK_HOST, doi, DATE_STAMP_PLACEHOLDER, crossmark_path
    ));
    lines.push(format!("\\textbf{{DOI:}} \\href{{{}}}{{{}}}\\\\", identifier.resolver_url(), doi));
    lines.push(format!("\\copyright~{} The Author(s)", date.year));

    lines.join("\n")
}
