//! Parse LLM output into candidate records
//!
//! The oracle is told to answer with `Label: value` lines, but nothing about
//! its output is trusted: labels may appear anywhere, several to a line.
//! JSON objects (bare, fenced or wrapped in prose) are accepted too. Either
//! way, labels go through the [`LabelMatcher`].

use crate::labels::LabelMatcher;
use serde_json::Value;
use tracing::{debug, warn};
use waybill_domain::{CandidateRecord, ParseError, SchemaField};

// Longest synonym, in words
const MAX_LABEL_WORDS: usize = 6;

const MAX_KEY_WORDS: usize = 4;

const MISSING_MARKERS: &[&str] = &[
    "not found",
    "not available",
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "-",
    "",
];

/// Parses raw oracle text into a [`CandidateRecord`]
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    matcher: LabelMatcher,
}

impl ResponseParser {
    /// Create a parser with the given label matcher
    pub fn new(matcher: LabelMatcher) -> Self {
        Self { matcher }
    }

    /// Parse a response
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Malformed` when no schema label is recognized
    /// anywhere in the response.
    pub fn parse(&self, raw: &str) -> Result<CandidateRecord, ParseError> {
        let entries = match self.parse_json(raw) {
            Some(entries) => {
                debug!("Parsed JSON answer with {} recognized field(s)", entries.len());
                entries
            }
            None => self.scan_labels(raw),
        };

        if entries.is_empty() {
            return Err(ParseError::Malformed(
                "no field labels recognized in response".to_string(),
            ));
        }

        Ok(collect_record(entries))
    }

    /// Try each JSON candidate; the first object with a recognized key wins
    fn parse_json(&self, raw: &str) -> Option<Vec<(SchemaField, String)>> {
        json_candidates(raw).into_iter().find_map(|candidate| {
            let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) else {
                return None;
            };
            let entries: Vec<(SchemaField, String)> = map
                .iter()
                .filter_map(|(key, value)| {
                    let field = self.matcher.match_label(key)?;
                    Some((field, json_value_text(value)))
                })
                .collect();
            (!entries.is_empty()).then_some(entries)
        })
    }

    /// Scan for `label: value` pairs anywhere in the text
    ///
    /// A label counts when a `:` or `=` follows it directly, so one-line
    /// answers delimited by `|`, `;` or `,` work as well as one pair per
    /// line. A value ends at the next key (recognized or not), a blank line
    /// or a code fence; lines in between continue it.
    fn scan_labels(&self, raw: &str) -> Vec<(SchemaField, String)> {
        let mut keys = Vec::new();
        let mut offset = 0;
        for line in raw.split_inclusive('\n') {
            self.scan_line(line, offset, &mut keys);
            offset += line.len();
        }

        keys.iter()
            .enumerate()
            .filter_map(|(i, key)| {
                let field = key.field?;
                let end = keys.get(i + 1).map_or(raw.len(), |next| next.start);
                Some((field, value_text(&raw[key.value_start..end])))
            })
            .collect()
    }

    fn scan_line(&self, line: &str, offset: usize, keys: &mut Vec<Key>) {
        // Start of the text that may hold the next key
        let mut from = 0;
        for (pos, c) in line.char_indices() {
            if !matches!(c, ':' | '=') || line[pos + 1..].starts_with("//") {
                continue;
            }
            let Some((start, field)) = self.key_before(&line[from..pos], from == 0) else {
                continue;
            };
            let mut start = from + start;
            // Bullets and numbering belong to the key, not the previous value
            if strip_list_marker(line[..start].trim()).is_empty() {
                start = 0;
            }
            keys.push(Key {
                start: offset + start,
                value_start: offset + pos + 1,
                field,
            });
            from = pos + 1;
        }
    }

    /// Locate a key ending right before a separator
    ///
    /// Recognized labels may follow any delimiter or earlier value text.
    /// Unrecognized keys only count at the start of a line or after a
    /// `|`, `;` or tab delimiter, so colons inside values stay intact.
    fn key_before(&self, head: &str, line_start: bool) -> Option<(usize, Option<SchemaField>)> {
        let delimiter = head.rfind(['|', ';', ',', '\t']);
        let segment_start = delimiter.map_or(0, |i| i + 1);
        let segment = &head[segment_start..];

        let starts = word_starts(segment);
        let skip = starts.len().saturating_sub(MAX_LABEL_WORDS);
        for &word in &starts[skip..] {
            if let Some(field) = self.matcher.match_label(&segment[word..]) {
                return Some((segment_start + word, Some(field)));
            }
        }

        let key_position = match delimiter {
            Some(i) => head[i..].starts_with(['|', ';', '\t']),
            None => line_start,
        };
        (key_position && looks_like_key(segment)).then_some((segment_start, None))
    }
}

/// A key found in the response; `field` is `None` for unknown keys
struct Key {
    start: usize,
    value_start: usize,
    field: Option<SchemaField>,
}

fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut after_space = true;
    for (i, c) in text.char_indices() {
        if after_space && !c.is_whitespace() {
            starts.push(i);
        }
        after_space = c.is_whitespace();
    }
    starts
}

/// Short label-like text such as `Weight` or `"Package type"`
fn looks_like_key(text: &str) -> bool {
    let text = strip_list_marker(text.trim())
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '`' | '_'));
    let words = text.split_whitespace().count();
    (1..=MAX_KEY_WORDS).contains(&words)
        && text.len() <= 40
        && text.chars().next().is_some_and(char::is_alphabetic)
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace() || "#./()_-'&".contains(c))
}

/// Join a value's lines, stopping at a blank line or code fence
fn value_text(text: &str) -> String {
    let mut lines = text.split('\n');
    let mut value = lines.next().unwrap_or_default().trim().to_string();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            break;
        }
        append_continuation(&mut value, line);
    }
    value
}

/// Texts that might hold a JSON object, most specific first
fn json_candidates(raw: &str) -> Vec<&str> {
    let mut candidates = vec![raw.trim()];

    if let Some(start) = raw.find("```") {
        let body = &raw[start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        if let Some(end) = body.find("```") {
            candidates.push(body[..end].trim());
        }
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            candidates.push(&raw[start..=end]);
        }
    }
    candidates
}

fn json_value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => join_scalars(items.iter()),
        Value::Object(map) => join_scalars(map.values()),
    }
}

fn join_scalars<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .filter(|v| !v.is_array() && !v.is_object())
        .map(json_value_text)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drop bullets, quote markers, headings and list numbering
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•', '>', '#', ' ', '\t']);
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

fn append_continuation(value: &mut String, line: &str) {
    let current = value.trim_end();
    if current.is_empty() {
        *value = line.to_string();
        return;
    }
    let separator = if current.ends_with([',', ';']) { " " } else { ", " };
    *value = format!("{}{}{}", current, separator, line);
}

/// Strip markup and quoting around a captured value
fn clean_value(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '`' | '\'' | ',' | ';' | '|'))
        .to_string()
}

fn is_missing_marker(value: &str) -> bool {
    let value = value.trim_end_matches('.').to_lowercase();
    MISSING_MARKERS.contains(&value.as_str())
}

/// Fold entries into a record; the first occurrence of a field wins
fn collect_record(entries: Vec<(SchemaField, String)>) -> CandidateRecord {
    let mut record = CandidateRecord::new();
    let mut seen: Vec<(SchemaField, Option<String>)> = Vec::new();

    for (field, raw) in entries {
        let value = clean_value(&raw);
        let value = (!is_missing_marker(&value)).then_some(value);

        if let Some((_, first)) = seen.iter().find(|(f, _)| *f == field) {
            if *first != value {
                warn!(
                    "Field '{}' given more than once with different values; keeping the first",
                    field.label()
                );
                record.mark_ambiguous(field);
            }
            continue;
        }

        if let Some(v) = &value {
            record.set(field, v.clone());
        }
        seen.push((field, value));
    }
    record
}
