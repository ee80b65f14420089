/*!
 * Abstract text and its JATS markup variant.
 *
 * The markup comes from an external converter. Crossref expects the JATS
 * elements in the `jats:` namespace, so the handful of elements the converter
 * emits for abstracts are re-namespaced before the result is handed out.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::regions;
use crate::errors::AbstractError;
use crate::providers::MarkupConverter;

/// Elements the converter produces for an abstract
static JATS_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)(p|inline-formula|alternatives|tex-math)([\s/>])")
        .expect("Invalid JATS element regex")
});

/// Characters worth a second look before pasting an abstract into a form
const SPECIAL_CHARACTERS: &[&str] = &["<", ">", "&", "%", "\\", "'", "`", "~", "--", "\"", "“", "”"];

/// Abstract in plain and marked-up form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abstract {
    pub plain_text: String,
    pub markup: String,
}

impl Abstract {
    /// Convert already-flattened abstract text
    pub fn from_text(text: &str, converter: &dyn MarkupConverter) -> Result<Self, AbstractError> {
        let raw = converter.convert(text)?;
        if raw.trim().is_empty() {
            return Err(AbstractError::AbstractConversionUnavailable(
                "converter returned no markup".to_string(),
            ));
        }

        Ok(Self {
            plain_text: text.to_string(),
            markup: renamespace(raw.trim()),
        })
    }

    /// Extract the abstract region of `document` and convert it
    pub fn from_document(document: &str, converter: &dyn MarkupConverter) -> Result<Self, AbstractError> {
        let text = regions::abstract_text(document)?;
        Self::from_text(&text, converter)
    }

    /// Special characters present in the plain text, with counts
    pub fn special_characters(&self) -> Vec<(&'static str, usize)> {
        SPECIAL_CHARACTERS
            .iter()
            .map(|c| (*c, self.plain_text.matches(c).count()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Sidecar text: plain abstract, character notes, then the markup
    pub fn sidecar(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.plain_text);
        out.push_str("\n\n");

        for (character, count) in self.special_characters() {
            out.push_str(&format!(
                "The abstract contains the special character: {} ({})\n",
                character, count
            ));
        }

        out.push_str("\n\n");
        out.push_str(&self.markup);
        out
    }
}

/// Move the abstract elements into the `jats:` namespace
pub fn renamespace(markup: &str) -> String {
    JATS_ELEMENT_REGEX.replace_all(markup, "<${1}jats:${2}${3}").into_owned()
}
