/*!
 * Marker-delimited regions of a manuscript template.
 *
 * The template carries fixed literal marker pairs around every editable
 * region. All queries here are literal searches over the raw text; nothing is
 * parsed into a tree, so unrelated parts of the document are never touched.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use crate::document::dates::CalendarDate;
use crate::errors::ExtractionError;

/// Affiliation label, e.g. `{\bf 2}`
static AFFILIATION_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\bf\s*(\d+)\s*\}").expect("Invalid affiliation label regex")
});

/// Dollar-delimited author symbol, e.g. `$\star$`
static EMAIL_SYMBOL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([^$]+)\$").expect("Invalid email symbol regex")
});

/// `mailto:` target inside an href
static MAILTO_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"mailto:([^}\s]+)").expect("Invalid mailto regex")
});

static RECEIVED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Received (.*?) \\newline").expect("Invalid received date regex")
});

static ACCEPTED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Accepted (.*?) \\newline").expect("Invalid accepted date regex")
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

/// Editable region of the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Title,
    Abstract,
    Dates,
    Affiliations,
    Emails,
    DoiBlock,
}

impl Region {
    /// Literal text that opens the region
    pub fn begin_marker(&self) -> &'static str {
        match self {
            Self::Title => "TODO: TITLE Paste title here\n",
            Self::Abstract => "TODO: ABSTRACT Paste abstract here\n",
            Self::Dates => "%%%%%%%%%% TODO: DATES\n",
            Self::Affiliations => "%%%%%%%%%% TODO: AFFILIATIONS\n",
            Self::Emails => "% TODO: EMAIL\n",
            Self::DoiBlock => "%%%%%%%%%% TODO: DOI\n",
        }
    }

    /// Literal text that closes the region
    pub fn end_marker(&self) -> &'static str {
        match self {
            Self::Title => "\n% multiline titles: end",
            Self::Abstract => "\n%%%%%%%%%% END TODO: ABSTRACT",
            Self::Dates => "\n%%%%%%%%%% END TODO: DATES",
            Self::Affiliations => "\n%%%%%%%%%% END TODO: AFFILIATIONS",
            Self::Emails => "\n% END TODO: EMAIL",
            Self::DoiBlock => "\n%%%%%%%%%% END TODO: DOI",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Abstract => "abstract",
            Self::Dates => "dates",
            Self::Affiliations => "affiliations",
            Self::Emails => "emails",
            Self::DoiBlock => "doi-block",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An author symbol paired with its email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContact {
    /// Symbol without the surrounding dollars, e.g. `\star`
    pub symbol: String,
    /// Address without the `mailto:` scheme
    pub address: String,
}

/// Byte range of the text strictly between the markers of `region`
pub fn region_bounds(document: &str, region: Region) -> Result<Range<usize>, ExtractionError> {
    let begin = region.begin_marker();
    let end = region.end_marker();

    let count = document.matches(begin).count();
    if count > 1 {
        return Err(ExtractionError::AmbiguousRegion { region, count });
    }

    let start = document
        .find(begin)
        .map(|pos| pos + begin.len())
        .ok_or(ExtractionError::RegionNotFound { region })?;

    let stop = document[start..]
        .find(end)
        .map(|pos| pos + start)
        .ok_or(ExtractionError::RegionNotFound { region })?;

    Ok(start..stop)
}

/// Raw text strictly between the markers of `region`
pub fn extract_region(document: &str, region: Region) -> Result<&str, ExtractionError> {
    let bounds = region_bounds(document, region)?;
    Ok(&document[bounds])
}

/// Flattens LaTeX line breaks and collapses whitespace
pub fn format_line_spacing(text: &str) -> String {
    let text = text.replace('\n', " ").replace(r"\\", " ");
    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_string()
}

/// Normalized title
pub fn title(document: &str) -> Result<String, ExtractionError> {
    extract_region(document, Region::Title).map(format_line_spacing)
}

/// Normalized abstract text
pub fn abstract_text(document: &str) -> Result<String, ExtractionError> {
    extract_region(document, Region::Abstract).map(format_line_spacing)
}

/// Received and accepted dates, written `DD-MM-YYYY` in the template
pub fn dates(document: &str) -> Result<(CalendarDate, CalendarDate), ExtractionError> {
    let section = extract_region(document, Region::Dates)?;

    let received = RECEIVED_REGEX
        .captures(section)
        .and_then(|cap| cap.get(1))
        .ok_or(ExtractionError::FieldNotFound { region: Region::Dates, field: "Received" })?;
    let accepted = ACCEPTED_REGEX
        .captures(section)
        .and_then(|cap| cap.get(1))
        .ok_or(ExtractionError::FieldNotFound { region: Region::Dates, field: "Accepted" })?;

    Ok((
        CalendarDate::parse_dmy(received.as_str())?,
        CalendarDate::parse_dmy(accepted.as_str())?,
    ))
}

/// Numbered affiliations keyed by label
///
/// Labels must run `1..=K` without gaps. A section without any label is a
/// single-affiliation paper and comes back as entry 1.
pub fn affiliations(document: &str) -> Result<BTreeMap<u32, String>, ExtractionError> {
    let section = extract_region(document, Region::Affiliations)?;

    // A label too large for u32 is kept as None and breaks the sequence
    let parsed: Vec<(Option<u32>, Range<usize>)> = AFFILIATION_LABEL_REGEX
        .captures_iter(section)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let id = cap.get(1)?.as_str().parse().ok();
            Some((id, whole.range()))
        })
        .collect();

    let mut result = BTreeMap::new();

    if parsed.is_empty() {
        result.insert(1, format_line_spacing(section));
        return Ok(result);
    }

    let found: Vec<u32> = parsed.iter().filter_map(|(id, _)| *id).collect();
    let contiguous = found.len() == parsed.len()
        && found.iter().enumerate().all(|(i, id)| *id as usize == i + 1);
    if !contiguous {
        return Err(ExtractionError::MalformedAffiliationList { found });
    }

    let labels: Vec<(u32, Range<usize>)> = found
        .into_iter()
        .zip(parsed.into_iter().map(|(_, range)| range))
        .collect();

    for (i, (id, range)) in labels.iter().enumerate() {
        let text_end = labels.get(i + 1).map_or(section.len(), |(_, next)| next.start);
        result.insert(*id, format_line_spacing(&section[range.end..text_end]));
    }

    debug!("Found {} affiliation(s)", result.len());
    Ok(result)
}

/// Author symbols paired positionally with `mailto:` targets
///
/// Pairing is by position only: when the counts differ the surplus on the
/// longer side is dropped.
pub fn emails(document: &str) -> Result<Vec<EmailContact>, ExtractionError> {
    let section = extract_region(document, Region::Emails)?;

    let symbols = EMAIL_SYMBOL_REGEX
        .captures_iter(section)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()));
    let addresses = MAILTO_REGEX
        .captures_iter(section)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()));

    Ok(symbols
        .zip(addresses)
        .map(|(symbol, address)| EmailContact { symbol, address })
        .collect())
}
