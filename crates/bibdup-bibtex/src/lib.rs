//! BibTeX parsing and formatting for bibdup
//!
//! Turns raw `.bib` text into ordered [`BibTeXEntry`] records. Entries keep
//! their citation key, type and fields in document order; nothing is
//! deduplicated or validated beyond syntax at this layer.

mod entry;
mod formatter;
pub mod parser;

pub use entry::{BibTeXEntry, BibTeXEntryType, BibTeXField};
pub use formatter::{format_entries, format_entry};
pub use parser::{parse, parse_entry, BibTeXParseError, BibTeXParseResult, ParseError};
