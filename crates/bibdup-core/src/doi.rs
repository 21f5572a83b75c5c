//! DOI handling for duplicate matching

use bibdup_bibtex::BibTeXEntry;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Resolver URLs and `doi:` labels that commonly prefix a bare 10.xxxx/... DOI
    static ref DOI_PREFIX: Regex =
        Regex::new(r"(?i)^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").unwrap();
}

/// The DOI of an entry as used for matching.
///
/// `Absent` acts as a wildcard among entries sharing a citation key;
/// two `Present` values match only when equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "value")]
pub enum Doi {
    Present(String),
    Absent,
}

impl Doi {
    pub fn of(entry: &BibTeXEntry, normalize: bool) -> Self {
        match entry.doi() {
            Some(doi) if normalize => Self::Present(normalize_doi(doi)),
            Some(doi) => Self::Present(doi.to_string()),
            None => Self::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Present(doi) => Some(doi),
            Self::Absent => None,
        }
    }
}

impl From<Option<&str>> for Doi {
    fn from(doi: Option<&str>) -> Self {
        doi.map_or(Self::Absent, |doi| Self::Present(doi.to_string()))
    }
}

/// Reduce a DOI to its bare, lowercase `10.xxxx/...` form.
///
/// DOIs are case-insensitive, so `10.1000/ABC` and
/// `https://doi.org/10.1000/abc` normalize to the same string.
pub fn normalize_doi(doi: &str) -> String {
    DOI_PREFIX
        .replace(doi.trim(), "")
        .trim()
        .trim_end_matches(['.', ',', ';'])
        .to_lowercase()
}
