//! bibdup-core: duplicate citation detection
//!
//! Reports BibTeX entries that repeat an earlier entry's citation key. DOIs
//! refine the match: two entries with the same key but different DOIs are
//! distinct works, while an entry without a DOI matches any entry of its key.
//!
//! ```
//! use bibdup_core::detect_duplicates;
//!
//! let bib = "@article{X, title={test}}\n\n@article{X, title={test}}\n";
//! let duplicates = detect_duplicates(bib).unwrap();
//! assert_eq!(duplicates.len(), 1);
//! assert_eq!(duplicates[0].cite_key, "X");
//! ```

pub mod config;
mod detector;
pub mod doi;
pub mod error;

pub use bibdup_bibtex::{BibTeXEntry, BibTeXEntryType};
pub use config::{DetectorConfig, MIN_ENTRIES};
pub use detector::{
    detect_duplicates, find_duplicate_groups, DuplicateDetector, DuplicateGroup, DuplicateReport,
    ParseIssue,
};
pub use doi::{normalize_doi, Doi};
pub use error::{DetectError, Result};
