//! Citation-key duplicate detection
//!
//! Entries are grouped by citation key, then merged into subgroups by DOI.
//! A missing DOI is a wildcard within its key while two different DOIs never
//! match, so the grouping is an ordered merge rather than plain equality:
//!
//! 1. An entry without a DOI joins the earliest subgroup of its key, or opens
//!    an unanchored subgroup if the key has none yet.
//! 2. An entry with DOI `d` joins the subgroup anchored on `d`. Failing that it
//!    anchors the key's earliest subgroup if that one has no DOI yet, and
//!    otherwise opens a new subgroup anchored on `d`.
//!
//! The first member of each subgroup is the original; every later member is
//! reported as a duplicate.

use std::collections::HashMap;

use bibdup_bibtex::{parse, BibTeXEntry, BibTeXParseError};
use serde::Serialize;

use crate::config::DetectorConfig;
use crate::doi::Doi;
use crate::error::{DetectError, Result};

/// An original entry together with the later entries that duplicate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub cite_key: String,
    /// DOI the group matched on; `Absent` when no member carries one
    pub doi: Doi,
    pub original: BibTeXEntry,
    /// Later occurrences, in document order
    pub duplicates: Vec<BibTeXEntry>,
}

/// Summary of a detection run over one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub total_entries: usize,
    pub duplicate_count: usize,
    pub groups: Vec<DuplicateGroup>,
    /// Position and message of each entry the parser had to skip
    pub parse_errors: Vec<ParseIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl From<BibTeXParseError> for ParseIssue {
    fn from(err: BibTeXParseError) -> Self {
        Self {
            line: err.line,
            column: err.column,
            message: err.message,
        }
    }
}

impl DuplicateReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Subgroup under construction; `members` are indices into the entry slice
struct Subgroup {
    anchor: Doi,
    members: Vec<usize>,
}

/// Finds entries that repeat an earlier entry's citation key and DOI
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DetectorConfig,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Parse `document` and return every duplicate occurrence in document order.
    ///
    /// Fails with [`DetectError::InvalidInput`] when the document holds fewer
    /// than two entries.
    pub fn detect(&self, document: &str) -> Result<Vec<BibTeXEntry>> {
        let parsed = parse(document.to_string())?;
        self.detect_entries(&parsed.entries)
    }

    /// Same as [`detect`](Self::detect) for entries that are already parsed
    pub fn detect_entries(&self, entries: &[BibTeXEntry]) -> Result<Vec<BibTeXEntry>> {
        self.ensure_enough(entries.len())?;

        let mut positions: Vec<usize> = self
            .subgroups(entries)
            .into_iter()
            .flat_map(|group| group.members.into_iter().skip(1))
            .collect();
        positions.sort_unstable();

        for &pos in &positions {
            tracing::trace!(
                cite_key = %entries[pos].cite_key,
                line = ?entries[pos].line,
                "duplicate entry"
            );
        }
        tracing::debug!(
            entries = entries.len(),
            duplicates = positions.len(),
            "duplicate detection finished"
        );

        Ok(positions.into_iter().map(|pos| entries[pos].clone()).collect())
    }

    /// Parse `document` and return each original with its duplicates.
    ///
    /// Groups are ordered by the position of their original entry; entries
    /// with no duplicate are left out.
    pub fn find_groups(&self, document: &str) -> Result<Vec<DuplicateGroup>> {
        let parsed = parse(document.to_string())?;
        self.find_groups_in_entries(&parsed.entries)
    }

    pub fn find_groups_in_entries(&self, entries: &[BibTeXEntry]) -> Result<Vec<DuplicateGroup>> {
        self.ensure_enough(entries.len())?;

        Ok(self
            .subgroups(entries)
            .into_iter()
            .filter(|group| group.members.len() > 1)
            .map(|group| {
                let original = entries[group.members[0]].clone();
                DuplicateGroup {
                    cite_key: original.cite_key.clone(),
                    doi: group.anchor,
                    duplicates: group.members[1..]
                        .iter()
                        .map(|&pos| entries[pos].clone())
                        .collect(),
                    original,
                }
            })
            .collect())
    }

    pub fn report(&self, document: &str) -> Result<DuplicateReport> {
        let parsed = parse(document.to_string())?;
        let groups = self.find_groups_in_entries(&parsed.entries)?;

        Ok(DuplicateReport {
            total_entries: parsed.entries.len(),
            duplicate_count: groups.iter().map(|g| g.duplicates.len()).sum(),
            groups,
            parse_errors: parsed.errors.into_iter().map(ParseIssue::from).collect(),
        })
    }

    fn ensure_enough(&self, found: usize) -> Result<()> {
        let required = self.config.required_entries();
        if found < required {
            tracing::debug!(found, required, "not enough entries to compare");
            return Err(DetectError::InvalidInput { found, required });
        }
        Ok(())
    }

    fn key_of(&self, entry: &BibTeXEntry) -> String {
        if self.config.case_insensitive_keys {
            entry.cite_key.to_lowercase()
        } else {
            entry.cite_key.clone()
        }
    }

    /// Build every subgroup, ordered by the position of its first member
    fn subgroups(&self, entries: &[BibTeXEntry]) -> Vec<Subgroup> {
        let mut groups: Vec<Subgroup> = Vec::new();
        // citation key -> indices into `groups`, oldest first
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, entry) in entries.iter().enumerate() {
            let doi = Doi::of(entry, self.config.normalize_dois);
            let slots = by_key.entry(self.key_of(entry)).or_default();

            let target = match &doi {
                Doi::Absent => slots.first().copied(),
                Doi::Present(_) => slots
                    .iter()
                    .copied()
                    .find(|&slot| groups[slot].anchor == doi)
                    .or_else(|| {
                        slots
                            .first()
                            .copied()
                            .filter(|&slot| groups[slot].anchor == Doi::Absent)
                    }),
            };

            match target {
                Some(slot) => {
                    let group = &mut groups[slot];
                    if !group.anchor.is_present() {
                        group.anchor = doi;
                    }
                    group.members.push(pos);
                }
                None => {
                    slots.push(groups.len());
                    groups.push(Subgroup {
                        anchor: doi,
                        members: vec![pos],
                    });
                }
            }
        }

        groups
    }
}

/// Parse `document` and return its duplicate entries using the default rules
pub fn detect_duplicates(document: &str) -> Result<Vec<BibTeXEntry>> {
    DuplicateDetector::new().detect(document)
}

/// Parse `document` and group each original entry with its duplicates
pub fn find_duplicate_groups(document: &str) -> Result<Vec<DuplicateGroup>> {
    DuplicateDetector::new().find_groups(document)
}
