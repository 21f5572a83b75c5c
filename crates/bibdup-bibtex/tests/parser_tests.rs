//! BibTeX parser integration tests

use bibdup_bibtex::{format_entry, parse, parse_entry, BibTeXEntryType};
use rstest::rstest;

#[test]
fn test_entries_keep_document_order_and_duplicate_keys() {
    let input = r#"
@article{X, title = {first}}
@book{Y, title = {second}}
@article{X, title = {third}}
"#;
    let result = parse(input.to_string()).unwrap();
    let keys: Vec<&str> = result.entries.iter().map(|e| e.cite_key.as_str()).collect();
    assert_eq!(keys, vec!["X", "Y", "X"]);
    assert_eq!(result.entries[2].title(), Some("third"));
}

#[rstest]
#[case("@article{K, doi = {10.1000/xyz}}", Some("10.1000/xyz"))]
#[case("@article{K, DOI = \"10.1000/xyz\"}", Some("10.1000/xyz"))]
#[case("@article{K, doi = {}}", None)]
#[case("@article{K, title = {No DOI}}", None)]
#[case("@article{K}", None)]
fn test_doi_field_variants(#[case] input: &str, #[case] expected: Option<&str>) {
    let entry = parse_entry(input.to_string()).unwrap();
    assert_eq!(entry.doi(), expected);
}

#[rstest]
#[case("@article{Smith2024,}", "Smith2024")]
#[case("@misc{arXiv:2301.12345, note = {x}}", "arXiv:2301.12345")]
#[case("@misc{ key-with_punct.1 , note = {x}}", "key-with_punct.1")]
fn test_cite_key_variants(#[case] input: &str, #[case] expected: &str) {
    let entry = parse_entry(input.to_string()).unwrap();
    assert_eq!(entry.cite_key, expected);
}

#[test]
fn test_empty_and_whitespace_documents_have_no_entries() {
    for input in ["", "\n", "   \n\t\n", "% only a comment\n"] {
        let result = parse(input.to_string()).unwrap();
        assert!(result.entries.is_empty(), "input {:?}", input);
        assert!(result.errors.is_empty(), "input {:?}", input);
    }
}

#[test]
fn test_unicode_values_survive() {
    let input = "@article{U, author = {Erdős, Pál}, title = \"Über Graphen\"}";
    let entry = parse_entry(input.to_string()).unwrap();
    assert_eq!(entry.get_field("author"), Some("Erdős, Pál"));
    assert_eq!(entry.title(), Some("Über Graphen"));
}

#[test]
fn test_raw_bibtex_and_reformat() {
    let input = "@InProceedings{Conf1, title = {Talk}, year = 2021}";
    let entry = parse_entry(input.to_string()).unwrap();
    assert_eq!(entry.entry_type, BibTeXEntryType::InProceedings);
    assert_eq!(entry.raw_bibtex.as_deref(), Some(input));
    assert_eq!(
        format_entry(&entry),
        "@inproceedings{Conf1,\n    title = {Talk},\n    year = 2021,\n}"
    );
}

#[test]
fn test_entries_serialize_to_json() {
    let entry = parse_entry("@article{J, doi = {10.1/j}}".to_string()).unwrap();
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["cite_key"], "J");
    assert_eq!(json["entry_type"], "article");
    assert_eq!(json["fields"][0]["key"], "doi");
    assert_eq!(json["line"], 1);
}
