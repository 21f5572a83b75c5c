//! Builders for small `.bib` documents

#![allow(dead_code)]

/// One single-line `@article` entry, with a `doi` field when given
pub fn build_entry(key: &str, doi: Option<&str>) -> String {
    let doi_part = doi
        .map(|doi| format!(", doi={{{}}}", doi))
        .unwrap_or_default();
    format!("@article{{{}, title={{test}}, year={{2024}}{}}}", key, doi_part)
}

/// Join entries with blank lines, the way a `.bib` file lays them out
pub fn make_bibliography(entries: &[String]) -> String {
    let mut bib = entries.join("\n\n");
    bib.push('\n');
    bib
}

pub fn keys_of(entries: &[bibdup_core::BibTeXEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.cite_key.as_str()).collect()
}
