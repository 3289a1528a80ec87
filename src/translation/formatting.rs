/*!
 * Control code preservation for translated text.
 *
 * Quest text carries inline style markers such as `&4` or `&l` that a
 * translation model would mangle. Before translation every marker is swapped
 * for a numbered placeholder (`<<<1>>>`, `<<<2>>>`, ...); afterwards the
 * placeholders are swapped back, strictly by ordinal.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

/// Default control code shape: a `&` followed by one alphanumeric character
pub const DEFAULT_CODE_PATTERN: &str = "&[0-9a-zA-Z]";

/// Opening delimiter of a placeholder
pub const PLACEHOLDER_OPEN: &str = "<<<";

/// Closing delimiter of a placeholder
pub const PLACEHOLDER_CLOSE: &str = ">>>";

static DEFAULT_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_CODE_PATTERN).unwrap());

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<<<(\d+)>>>").unwrap());

/// Build the placeholder for the n-th (1-indexed) control code
pub fn placeholder(index: usize) -> String {
    format!("{}{}{}", PLACEHOLDER_OPEN, index, PLACEHOLDER_CLOSE)
}

/// Result of stripping control codes out of a text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText {
    /// Text with every control code replaced by its placeholder
    pub cleaned: String,

    /// Control codes in order of appearance
    pub codes: Vec<String>,
}

impl ExtractedText {
    /// Whether any control code was found
    pub fn has_codes(&self) -> bool {
        !self.codes.is_empty()
    }

    /// Whether the cleaned text holds anything besides placeholders,
    /// whitespace and punctuation
    pub fn has_translatable_text(&self) -> bool {
        PLACEHOLDER_REGEX
            .replace_all(&self.cleaned, "")
            .chars()
            .any(|c| c.is_alphanumeric())
    }
}

/// Extracts and restores inline control codes
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    pattern: Regex,
}

impl CodeExtractor {
    /// Create an extractor for a custom control code pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// The pattern this extractor matches
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replace every control code with a numbered placeholder.
    ///
    /// Numbering restarts at 1 on every call. Matches are found left to right
    /// and never overlap.
    pub fn extract(&self, text: &str) -> ExtractedText {
        let mut codes = Vec::new();
        let cleaned = self
            .pattern
            .replace_all(text, |caps: &Captures| {
                codes.push(caps[0].to_string());
                placeholder(codes.len())
            })
            .into_owned();

        ExtractedText { cleaned, codes }
    }

    /// Put the original codes back into a translated text.
    ///
    /// For each code, in order, the first remaining occurrence of its
    /// placeholder is replaced. Placeholders the model dropped are skipped and
    /// their code is lost; unmatched placeholder text stays as it is.
    pub fn restore(translated: &str, codes: &[String]) -> String {
        let mut result = translated.to_string();
        for (i, code) in codes.iter().enumerate() {
            result = result.replacen(&placeholder(i + 1), code, 1);
        }
        result
    }

    /// Compare the placeholders present in a translated text against the
    /// number that were sent
    pub fn check_placeholders(translated: &str, expected: usize) -> PlaceholderReport {
        let mut counts = vec![0usize; expected];
        let mut unexpected = Vec::new();

        for caps in PLACEHOLDER_REGEX.captures_iter(translated) {
            match caps[1].parse::<usize>() {
                Ok(n) if n >= 1 && n <= expected => counts[n - 1] += 1,
                Ok(n) => unexpected.push(n),
                // Too many digits for usize
                Err(_) => unexpected.push(0),
            }
        }

        let mut report = PlaceholderReport {
            expected,
            unexpected,
            ..Default::default()
        };
        for (i, count) in counts.into_iter().enumerate() {
            match count {
                0 => report.missing.push(i + 1),
                1 => {}
                _ => report.duplicated.push(i + 1),
            }
        }
        report
    }
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_CODE_REGEX.clone(),
        }
    }
}

/// Placeholder bookkeeping for one translated text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderReport {
    /// Number of placeholders sent to the model
    pub expected: usize,

    /// Placeholders absent from the translation
    pub missing: Vec<usize>,

    /// Placeholders present more than once
    pub duplicated: Vec<usize>,

    /// Placeholders with a number that was never sent
    pub unexpected: Vec<usize>,
}

impl PlaceholderReport {
    /// True when every placeholder came back exactly once
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for PlaceholderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "all {} placeholders intact", self.expected);
        }

        let join = |v: &[usize]| v.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing [{}]", join(&self.missing)));
        }
        if !self.duplicated.is_empty() {
            parts.push(format!("duplicated [{}]", join(&self.duplicated)));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("unexpected [{}]", join(&self.unexpected)));
        }
        write!(f, "{} of {} placeholders", parts.join("; "), self.expected)
    }
}
