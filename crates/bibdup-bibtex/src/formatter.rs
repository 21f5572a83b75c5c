//! BibTeX formatting
//!
//! Renders entries back to BibTeX text, e.g. to show the duplicates found in
//! a bibliography.

use crate::entry::BibTeXEntry;

/// Format a single entry
pub fn format_entry(entry: &BibTeXEntry) -> String {
    let mut out = format!("@{}{{{},\n", entry.entry_type, entry.cite_key);
    for field in &entry.fields {
        out.push_str("    ");
        out.push_str(&field.key);
        out.push_str(" = ");
        out.push_str(&format_value(&field.value));
        out.push_str(",\n");
    }
    out.push('}');
    out
}

/// Format entries separated by a blank line
pub fn format_entries(entries: &[BibTeXEntry]) -> String {
    entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.to_string()
    } else {
        format!("{{{}}}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::BibTeXEntryType;
    use crate::parser::parse;

    #[test]
    fn test_format_entry() {
        let entry = BibTeXEntry::new("Smith2024", BibTeXEntryType::Article)
            .with_field("title", "A {Great} Paper")
            .with_field("year", "2024")
            .with_field("doi", "10.1000/xyz");

        let formatted = format_entry(&entry);
        assert_eq!(
            formatted,
            "@article{Smith2024,\n    title = {A {Great} Paper},\n    year = 2024,\n    doi = {10.1000/xyz},\n}"
        );
    }

    #[test]
    fn test_format_empty_value_is_braced() {
        let entry = BibTeXEntry::new("E", BibTeXEntryType::Misc).with_field("note", "");
        assert!(format_entry(&entry).contains("note = {},"));
    }

    #[test]
    fn test_formatted_entries_parse_back() {
        let entries = vec![
            BibTeXEntry::new("A", BibTeXEntryType::Book).with_field("title", "First"),
            BibTeXEntry::new("B", BibTeXEntryType::Other("patent".to_string()))
                .with_field("year", "1999"),
        ];

        let reparsed = parse(format_entries(&entries)).unwrap();
        assert_eq!(reparsed.entries.len(), 2);
        assert_eq!(reparsed.entries[0].cite_key, "A");
        assert_eq!(reparsed.entries[0].title(), Some("First"));
        assert_eq!(
            reparsed.entries[1].entry_type,
            BibTeXEntryType::Other("patent".to_string())
        );
        assert_eq!(reparsed.entries[1].year(), Some("1999"));
    }
}
