/*!
 * Manuscript document handling.
 *
 * All operations work on the raw template text:
 * - `regions`: marker-delimited regions and their accessors
 * - `dates`: the two textual date encodings
 * - `journal`: identifiers and per-journal rules
 * - `rewrite`: the draft-to-publication replacement chain
 * - `jats`: abstract text and its JATS markup
 */

pub mod dates;
pub mod jats;
pub mod journal;
pub mod regions;
pub mod rewrite;

// Re-export main types
pub use dates::CalendarDate;
pub use jats::Abstract;
pub use journal::{Identifier, JournalRules};
pub use regions::Region;
pub use rewrite::{finalize, stamp_dates, Finalized, RewriteStep};
