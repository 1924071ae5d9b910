//! Rule-based field extractors for petty-cash vouchers.
//!
//! Every header field is described by a fallback chain: an ordered list of
//! [`PatternSpec`]s tried until one matches. New voucher layouts are handled
//! by appending entries to a chain in [`patterns`], never by editing the
//! entries already there.

pub mod amounts;
pub mod fields;
pub mod patterns;

pub use amounts::{combine_split_amount, correct_ocr_digits, format_amount, parse_amount, parse_integer};
pub use fields::{AmountExtractor, HeaderField, HeaderFields};

use regex::{Regex, RegexBuilder};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// One candidate pattern in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternSpec {
    /// Regular expression source.
    pub pattern: &'static str,
    /// Capture group holding the value.
    pub group: usize,
    /// Match case exactly. Chains default to case-insensitive.
    pub case_sensitive: bool,
}

impl PatternSpec {
    pub const fn new(pattern: &'static str, group: usize) -> Self {
        Self {
            pattern,
            group,
            case_sensitive: false,
        }
    }

    pub const fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Compile the pattern. `^` and `$` always match at line boundaries.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(self.pattern)
            .case_insensitive(!self.case_sensitive)
            .multi_line(true)
            .build()
    }
}

/// Extraction result with the chain entry that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the matching entry in its chain.
    pub rule: usize,
    /// Position of the captured text in the source.
    pub position: (usize, usize),
    /// Captured text before any typed parse.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            rule: self.rule,
            position: self.position,
            source: self.source,
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    regex: Regex,
    group: usize,
}

/// Ordered list of compiled patterns; the first one that captures a
/// non-blank value wins.
#[derive(Debug)]
pub struct FallbackChain {
    rules: Vec<CompiledRule>,
}

impl FallbackChain {
    /// Compile a chain from its specs.
    ///
    /// # Panics
    ///
    /// Panics if a spec does not compile. Chains are static tables, so this
    /// is a programming error caught by the pattern tests.
    pub fn compile(specs: &[PatternSpec]) -> Self {
        let rules = specs
            .iter()
            .map(|spec| CompiledRule {
                regex: spec
                    .compile()
                    .unwrap_or_else(|e| panic!("invalid pattern {:?}: {}", spec.pattern, e)),
                group: spec.group,
            })
            .collect();
        Self { rules }
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FieldExtractor for FallbackChain {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            let captured = rule.regex.captures(text)?.get(rule.group)?;
            let value = captured.as_str().trim();
            if value.is_empty() {
                return None;
            }
            Some(ExtractionMatch {
                value: value.to_string(),
                rule: index,
                position: (captured.start(), captured.end()),
                source: captured.as_str().to_string(),
            })
        })
    }
}
