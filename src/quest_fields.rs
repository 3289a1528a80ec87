/*!
 * Quest field translation.
 *
 * Quest files are SNBT text. Rather than parsing them, the three translatable
 * fields are located by pattern and only their bodies are rewritten, so every
 * other byte of the file survives untouched:
 *
 * ```text
 * title: "&6The Nether"
 * subtitle: "Hot stuff"
 * description: [
 *     "Build a portal."
 *     "&cBring fire resistance!"
 * ]
 * ```
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::TranslationError;
use crate::translation::TranslationClient;
use crate::translation::formatting::CodeExtractor;

// A key starts a line or follows `{` or `,`; `subtitle:` never matches the
// title pattern. Matches that begin inside a quoted string are dropped later.
static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)((?:^|[{,])[ \t]*title:\s*")((?:[^"\\\n]|\\.)*)(")"#).unwrap());

static SUBTITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)((?:^|[{,])[ \t]*subtitle:\s*")((?:[^"\\\n]|\\.)*)(")"#).unwrap());

static DESCRIPTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)((?:^|[{,])[ \t]*description:\s*\[)((?:\s|,|"(?:[^"\\]|\\.)*")*)(\])"#).unwrap()
});

/// A translatable field of a quest file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestField {
    /// `title: "..."`
    Title,
    /// `subtitle: "..."`
    Subtitle,
    /// `description: [ "...", ... ]`, possibly spanning lines
    Description,
}

impl QuestField {
    /// Every field, in processing order
    pub const ALL: [QuestField; 3] = [QuestField::Title, QuestField::Subtitle, QuestField::Description];

    /// Key as written in the file
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Description => "description",
        }
    }

    /// Pattern with three groups: opening delimiter, body, closing delimiter
    fn regex(&self) -> &'static Regex {
        match self {
            Self::Title => &TITLE_REGEX,
            Self::Subtitle => &SUBTITLE_REGEX,
            Self::Description => &DESCRIPTION_REGEX,
        }
    }

    /// Byte ranges of every body of this field, in file order
    fn body_spans(&self, content: &str) -> Vec<(usize, usize)> {
        self.regex()
            .captures_iter(content)
            .filter_map(|caps| {
                let key_start = caps.get(0)?.start();
                if inside_quoted_string(content, key_start) {
                    return None;
                }
                caps.get(2).map(|body| (body.start(), body.end()))
            })
            .collect()
    }

    /// Bodies of every occurrence of this field, in file order
    pub fn find_bodies<'t>(&self, content: &'t str) -> Vec<&'t str> {
        self.body_spans(content)
            .into_iter()
            .map(|(start, end)| &content[start..end])
            .collect()
    }
}

impl fmt::Display for QuestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether `position` lies inside a double-quoted string on its line
fn inside_quoted_string(content: &str, position: usize) -> bool {
    let line_start = content[..position].rfind('\n').map_or(0, |i| i + 1);
    let mut in_string = false;
    let mut escaped = false;

    for c in content[line_start..position].chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }

    in_string
}

/// Split a body into leading whitespace, inner text and trailing whitespace
fn split_padding(body: &str) -> (&str, &str, &str) {
    let inner_start = body.len() - body.trim_start().len();
    let inner_end = body.trim_end().len().max(inner_start);
    (&body[..inner_start], &body[inner_start..inner_end], &body[inner_end..])
}

/// Rewrites quest field bodies with their translations
pub struct FieldTransformer {
    client: Arc<TranslationClient>,
    extractor: CodeExtractor,
    fields: Vec<QuestField>,
    strict_placeholders: bool,
}

impl FieldTransformer {
    /// Create a transformer for every field with the default control code pattern
    pub fn new(client: Arc<TranslationClient>) -> Self {
        Self {
            client,
            extractor: CodeExtractor::default(),
            fields: QuestField::ALL.to_vec(),
            strict_placeholders: false,
        }
    }

    /// Use a different control code extractor
    pub fn with_extractor(mut self, extractor: CodeExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Restrict the transformer to a subset of fields
    ///
    /// Processing order stays title, subtitle, description whatever order is given.
    pub fn with_fields(mut self, fields: &[QuestField]) -> Self {
        let mut fields = fields.to_vec();
        fields.sort();
        fields.dedup();
        self.fields = fields;
        self
    }

    /// Treat placeholder mismatches as errors instead of warnings
    pub fn with_strict_placeholders(mut self, strict: bool) -> Self {
        self.strict_placeholders = strict;
        self
    }

    /// Fields this transformer rewrites, in processing order
    pub fn fields(&self) -> &[QuestField] {
        &self.fields
    }

    /// Translate every configured field of one file's text.
    ///
    /// Each field type is a separate pass over the current text; matches within
    /// a pass are translated left to right.
    pub async fn transform(&self, content: &str, target_language: &str) -> Result<String, TranslationError> {
        let mut current = content.to_string();

        for field in &self.fields {
            current = self.transform_field(&current, *field, target_language).await?;
        }

        Ok(current)
    }

    /// Translate every occurrence of one field
    async fn transform_field(
        &self,
        content: &str,
        field: QuestField,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        // Collect spans first; regex iterators must not be held across an await
        let spans = field.body_spans(content);

        let mut output = String::with_capacity(content.len());
        let mut last_end = 0;

        for (start, end) in spans {
            output.push_str(&content[last_end..start]);
            let translated = self.translate_body(&content[start..end], target_language).await?;
            output.push_str(&translated);
            last_end = end;
        }

        output.push_str(&content[last_end..]);
        Ok(output)
    }

    /// Translate one field body, keeping its control codes and outer whitespace.
    ///
    /// Bodies without translatable text are returned as they are.
    pub async fn translate_body(&self, body: &str, target_language: &str) -> Result<String, TranslationError> {
        let (leading, inner, trailing) = split_padding(body);
        let extracted = self.extractor.extract(inner);

        if !extracted.has_translatable_text() {
            return Ok(body.to_string());
        }

        let translated = self.client.translate(&extracted.cleaned, target_language).await?;

        if extracted.has_codes() {
            let report = CodeExtractor::check_placeholders(&translated, extracted.codes.len());
            if !report.is_clean() {
                if self.strict_placeholders {
                    return Err(TranslationError::PlaceholderMismatch {
                        text: extracted.cleaned,
                        report,
                    });
                }
                warn!("Formatting may be off in '{}': {}", extracted.cleaned, report);
            }
        }

        let restored = CodeExtractor::restore(&translated, &extracted.codes);
        debug!("Original:   {}", inner);
        debug!("Translated: {}", restored);

        Ok(format!("{}{}{}", leading, restored, trailing))
    }
}
