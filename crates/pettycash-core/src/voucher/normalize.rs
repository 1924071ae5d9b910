//! OCR text cleanup.

use std::borrow::Cow;
use std::str::Lines;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Lazily cleaned lines of OCR text.
///
/// The iterator is `Clone`; keep a copy to scan the same lines again.
#[derive(Debug, Clone)]
pub struct NormalizedLines<'a> {
    inner: Lines<'a>,
}

impl<'a> Iterator for NormalizedLines<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.inner.by_ref() {
            let cleaned = clean_line(line);
            if !cleaned.is_empty() {
                return Some(cleaned);
            }
        }
        None
    }
}

/// Clean every line of `text`, skipping lines that end up empty.
pub fn normalized_lines(text: &str) -> NormalizedLines<'_> {
    NormalizedLines {
        inner: text.lines(),
    }
}

/// Clean `text` and join the surviving lines with `\n`.
pub fn normalize(text: &str) -> String {
    normalized_lines(text).collect::<Vec<_>>().join("\n")
}

fn clean_line(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim();
    match WHITESPACE_RUN.replace_all(trimmed, " ") {
        Cow::Borrowed(_) => Cow::Borrowed(trimmed),
        Cow::Owned(collapsed) => Cow::Owned(collapsed),
    }
}
