//! BibTeX parser built on nom
//!
//! Handles:
//! - `@string` macro definitions (case-insensitive lookup)
//! - `@preamble` declarations
//! - `@comment` blocks and `%` line comments
//! - entries delimited with either braces or parentheses
//! - braced, quoted, numeric and macro field values joined with `#`
//!
//! A malformed entry does not abort the parse: it is recorded in
//! [`BibTeXParseResult::errors`] and parsing resumes at the next `@`.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    IResult,
};
use std::collections::HashMap;

use crate::entry::{BibTeXEntry, BibTeXEntryType};

/// Position and description of an entry that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Everything recovered from a BibTeX document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibTeXParseResult {
    /// Entries in document order
    pub entries: Vec<BibTeXEntry>,
    pub preambles: Vec<String>,
    /// `@string` macros, keyed by lowercase name
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Failures that prevent any result from being produced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid syntax")]
    InvalidSyntax,
    #[error("Encoding error: input contains a NUL byte")]
    EncodingError,
}

/// Parse a BibTeX document
pub fn parse(input: String) -> Result<BibTeXParseResult, ParseError> {
    parse_bibtex(&input)
}

/// Parse a document expected to hold exactly one entry; extra entries are ignored
pub fn parse_entry(input: String) -> Result<BibTeXEntry, ParseError> {
    let result = parse_bibtex(&input)?;
    result
        .entries
        .into_iter()
        .next()
        .ok_or(ParseError::InvalidSyntax)
}

fn parse_bibtex(input: &str) -> Result<BibTeXParseResult, ParseError> {
    if input.contains('\0') {
        return Err(ParseError::EncodingError);
    }

    let mut result = BibTeXParseResult::default();
    let mut remaining = skip_trivia(input);

    while !remaining.is_empty() {
        let offset = input.len() - remaining.len();
        let line = line_at(input, offset);

        if !remaining.starts_with('@') {
            // Free text between entries is a comment in BibTeX.
            match remaining.find('@') {
                Some(pos) => remaining = &remaining[pos..],
                None => break,
            }
            continue;
        }

        if !opens_block(remaining) {
            // A stray `@`, e.g. in an email address, is part of the comment text.
            match remaining[1..].find('@') {
                Some(pos) => remaining = &remaining[pos + 1..],
                None => break,
            }
            continue;
        }

        match at_block(remaining, &result.strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Entry(mut entry) => {
                        let consumed = &remaining[..remaining.len() - rest.len()];
                        entry.line = Some(line);
                        entry.raw_bibtex = Some(consumed.trim().to_string());
                        result.entries.push(entry);
                    }
                    AtBlock::String(name, value) => {
                        result.strings.insert(name.to_ascii_lowercase(), value);
                    }
                    AtBlock::Preamble(text) => result.preambles.push(text),
                    AtBlock::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                tracing::warn!(line, "skipping malformed BibTeX entry");
                result.errors.push(BibTeXParseError {
                    line,
                    column: column_at(input, offset),
                    message: format!("Failed to parse entry starting with '{}'", preview(remaining)),
                });
                match remaining[1..].find('@') {
                    Some(pos) => remaining = &remaining[pos + 1..],
                    None => break,
                }
            }
        }

        remaining = skip_trivia(remaining);
    }

    Ok(result)
}

enum AtBlock {
    Entry(BibTeXEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Skip whitespace and `%` comment lines
fn skip_trivia(mut input: &str) -> &str {
    loop {
        input = input.trim_start();
        match input.strip_prefix('%') {
            Some(comment) => {
                input = comment.find('\n').map_or("", |pos| &comment[pos + 1..]);
            }
            None => return input,
        }
    }
}

fn line_at(input: &str, offset: usize) -> u32 {
    input[..offset].matches('\n').count() as u32 + 1
}

fn column_at(input: &str, offset: usize) -> u32 {
    let line_start = input[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    input[line_start..offset].chars().count() as u32 + 1
}

fn preview(input: &str) -> String {
    input
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(40)
        .collect()
}

/// `@` followed by a block kind, e.g. `@article `
fn block_start(input: &str) -> IResult<&str, &str> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, kind) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;
    Ok((rest, kind))
}

/// Whether `input` starts a block worth reporting when it fails to parse
fn opens_block(input: &str) -> bool {
    match block_start(input) {
        Ok((rest, kind)) => rest.starts_with(['{', '(']) || kind.eq_ignore_ascii_case("comment"),
        Err(_) => false,
    }
}

fn at_block<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, AtBlock> {
    let (rest, kind) = block_start(input)?;

    match kind.to_ascii_lowercase().as_str() {
        "comment" => {
            let rest = match braced(rest) {
                Ok((rest, _)) => rest,
                Err(_) => rest.find('\n').map_or("", |pos| &rest[pos..]),
            };
            Ok((rest, AtBlock::Comment))
        }
        "string" => {
            let (rest, close) = open_delimiter(rest)?;
            let (rest, (name, value)) = field(rest, strings)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char(close)(rest)?;
            Ok((rest, AtBlock::String(name, value)))
        }
        "preamble" => {
            let (rest, close) = open_delimiter(rest)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, text) = value(rest, strings)?;
            let (rest, _) = multispace0(rest)?;
            let (rest, _) = char(close)(rest)?;
            Ok((rest, AtBlock::Preamble(text)))
        }
        _ => {
            let (rest, entry) = entry_body(rest, kind, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

/// Consume `{` or `(` and return the matching closing character
fn open_delimiter(input: &str) -> IResult<&str, char> {
    if let Some(rest) = input.strip_prefix('{') {
        Ok((rest, '}'))
    } else if let Some(rest) = input.strip_prefix('(') {
        Ok((rest, ')'))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )))
    }
}

fn entry_body<'a>(
    input: &'a str,
    kind: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibTeXEntry> {
    let (rest, close) = open_delimiter(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) = cite_key(rest)?;
    let (rest, _) = multispace0(rest)?;

    let entry_type = kind
        .parse::<BibTeXEntryType>()
        .unwrap_or(BibTeXEntryType::Misc);
    let mut entry = BibTeXEntry::new(cite_key, entry_type);

    let mut rest = match rest.strip_prefix(',') {
        Some(fields) => fields,
        None => rest,
    };

    loop {
        let (after_ws, _) = multispace0(rest)?;
        if after_ws.starts_with(close) {
            rest = after_ws;
            break;
        }

        let (after_field, (name, value)) = field(after_ws, strings)?;
        entry.add_field(name, value);

        let (after_field, _) = multispace0(after_field)?;
        rest = after_field.strip_prefix(',').unwrap_or(after_field);
    }

    let (rest, _) = char(close)(rest)?;
    Ok((rest, entry))
}

fn cite_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !",{}()=\"#%".contains(c))(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:.+".contains(c))(input)
}

/// `name = value`
fn field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, name) = field_name(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = value(rest, strings)?;
    Ok((rest, (name.to_string(), value)))
}

/// One or more value parts joined with `#`
fn value<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    let mut out = String::new();
    let mut rest = input;

    loop {
        let (after_part, part) = value_part(rest, strings)?;
        out.push_str(&part);

        let (after_ws, _) = multispace0(after_part)?;
        match after_ws.strip_prefix('#') {
            Some(next) => {
                let (next, _) = multispace0(next)?;
                rest = next;
            }
            None => return Ok((after_ws, out)),
        }
    }
}

fn value_part<'a>(input: &'a str, strings: &HashMap<String, String>) -> IResult<&'a str, String> {
    if input.starts_with('{') {
        let (rest, content) = braced(input)?;
        return Ok((rest, content[1..content.len() - 1].to_string()));
    }
    if input.starts_with('"') {
        let (rest, content) = quoted(input)?;
        return Ok((rest, content.to_string()));
    }

    let (rest, token) = field_name(input)?;
    if token.chars().all(|c| c.is_ascii_digit()) {
        return Ok((rest, token.to_string()));
    }
    let expanded = strings
        .get(&token.to_ascii_lowercase())
        .cloned()
        .unwrap_or_else(|| token.to_string());
    Ok((rest, expanded))
}

/// A balanced `{...}` group, returned with its outer braces.
///
/// Backslashes do not escape braces: BibTeX counts every `{` and `}`, so
/// `{C:\papers\}` is a complete value.
fn braced(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;

    for (pos, c) in input.char_indices() {
        if pos == 0 && c != '{' {
            break;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            _ => {}
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// A `"..."` string; quotes inside nested braces do not terminate it
fn quoted(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;

    for (pos, c) in input.char_indices() {
        if pos == 0 {
            if c != '"' {
                break;
            }
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => return Ok((&input[pos + 1..], &input[1..pos])),
            _ => {}
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
