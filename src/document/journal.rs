/*!
 * Publication identifiers and per-journal formatting rules.
 *
 * An identifier looks like `Family.Issue.Number.Page`. The family selects a
 * row of the rules table below; adding a journal means adding a row.
 */

use std::fmt;

/// Dot-separated publication identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment `index` of the dot-split identifier
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.0.split('.').nth(index).filter(|s| !s.is_empty())
    }

    /// Journal family, the first segment
    pub fn family(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// File name stem for the finalized document, e.g. `A_5_2_100`
    pub fn file_stem(&self) -> String {
        self.0.replace('.', "_")
    }

    /// Resolver URL for this identifier
    pub fn resolver_url(&self) -> String {
        format!("https://doi.org/{}", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// When the narrower side-panel layout is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowLayout {
    /// Injected by the layout step
    Standard,
    /// Journal uses its own header layout; never injected
    Skip,
    /// Injected while the DOI block is rebuilt, only if still missing
    Reactive,
}

/// Shape of the DOI side panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoiBlockShape {
    /// Badge, DOI link and copyright
    Standard,
    /// Proceedings: additionally restarts page numbering at the first page
    Proceedings,
}

/// Formatting rules for one journal family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRules {
    pub family: &'static str,
    pub display_name: &'static str,
    /// Literal banner placeholder in the template
    pub banner_placeholder: &'static str,
    /// Identifier segments rendered into the banner, in order
    pub banner_segments: &'static [usize],
    /// Separator between rendered segments
    pub banner_separator: &'static str,
    /// Identifier segment holding the first page, if the journal paginates
    pub page_segment: Option<usize>,
    /// Crossmark image path relative to the finalized document
    pub crossmark_path: &'static str,
    pub narrow_layout: NarrowLayout,
    pub doi_block: DoiBlockShape,
}

pub const CROSSMARK_IMAGE: &str = "CROSSMARK_BW_square_no_text.png";

static JOURNAL_RULES: &[JournalRules] = &[
    JournalRules {
        family: "A",
        display_name: "standard",
        banner_placeholder: " ?, ??? (20??)",
        banner_segments: &[1, 3],
        banner_separator: ", ",
        page_segment: Some(3),
        crossmark_path: CROSSMARK_IMAGE,
        narrow_layout: NarrowLayout::Standard,
        doi_block: DoiBlockShape::Standard,
    },
    JournalRules {
        family: "B",
        display_name: "issue only",
        banner_placeholder: " ?? (20??)",
        banner_segments: &[1],
        banner_separator: ", ",
        page_segment: None,
        crossmark_path: CROSSMARK_IMAGE,
        narrow_layout: NarrowLayout::Standard,
        doi_block: DoiBlockShape::Standard,
    },
    JournalRules {
        family: "C",
        display_name: "codebase",
        banner_placeholder: " ? (20??)",
        banner_segments: &[1],
        banner_separator: ", ",
        page_segment: None,
        crossmark_path: CROSSMARK_IMAGE,
        narrow_layout: NarrowLayout::Skip,
        doi_block: DoiBlockShape::Standard,
    },
    JournalRules {
        family: "D",
        display_name: "proceedings",
        banner_placeholder: " ?, ??? (20??)",
        banner_segments: &[1, 2],
        banner_separator: ", ",
        page_segment: Some(2),
        crossmark_path: "../CROSSMARK_BW_square_no_text.png",
        narrow_layout: NarrowLayout::Reactive,
        doi_block: DoiBlockShape::Proceedings,
    },
];

impl JournalRules {
    /// Rules for `family`, if known
    pub fn for_family(family: &str) -> Option<&'static JournalRules> {
        JOURNAL_RULES.iter().find(|rules| rules.family == family)
    }

    /// Rules for the family of `identifier`
    pub fn for_identifier(identifier: &Identifier) -> Option<&'static JournalRules> {
        Self::for_family(identifier.family())
    }

    /// Rendered banner for `identifier`, or the index of the first missing
    /// segment
    pub fn render_banner(&self, identifier: &Identifier) -> Result<String, usize> {
        let values = self
            .banner_segments
            .iter()
            .map(|&index| identifier.segment(index).ok_or(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(" {} (20??)", values.join(self.banner_separator)))
    }
}
