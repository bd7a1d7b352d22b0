//! Field label recognition
//!
//! Oracle answers name fields inconsistently ("Order #", "**AWB**",
//! `tracking_number`). Labels are compared by a compact key: lowercase
//! letters, digits and `#`, with all other characters dropped.

use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use waybill_domain::SchemaField;

const DEFAULT_SYNONYMS: &[(SchemaField, &[&str])] = &[
    (
        SchemaField::OrderId,
        &["order id", "order number", "order no", "order #", "order ref"],
    ),
    (
        SchemaField::RecipientName,
        &[
            "recipient name",
            "recipient",
            "receiver name",
            "receiver",
            "consignee",
            "consignee name",
        ],
    ),
    (
        SchemaField::RecipientAddress,
        &[
            "recipient address",
            "delivery address",
            "shipping address",
            "consignee address",
            "destination",
            "address",
        ],
    ),
    (
        SchemaField::CourierName,
        &[
            "courier name",
            "courier",
            "carrier",
            "shipping company",
            "delivery service",
        ],
    ),
    (
        SchemaField::TrackingNumber,
        &[
            "tracking number",
            "tracking no",
            "tracking #",
            "tracking id",
            "awb",
            "awb number",
            "awb no",
            "airway bill",
            "airway bill number",
            "waybill number",
        ],
    ),
];

/// Maps label text to schema fields through per-field synonym lists
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    labels: HashMap<String, SchemaField>,
}

impl LabelMatcher {
    /// Matcher with the canonical labels and the built-in synonyms
    pub fn new() -> Self {
        let mut matcher = Self {
            labels: HashMap::new(),
        };
        for field in SchemaField::ALL {
            matcher.insert(field, field.label());
        }
        for (field, synonyms) in DEFAULT_SYNONYMS {
            for synonym in *synonyms {
                matcher.insert(*field, synonym);
            }
        }
        matcher
    }

    /// Add synonyms for a field
    ///
    /// A synonym that already maps to a different field keeps its first
    /// mapping.
    pub fn with_synonyms<I, S>(mut self, field: SchemaField, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for synonym in synonyms {
            self.insert(field, synonym.as_ref());
        }
        self
    }

    /// Add synonyms keyed by canonical field label (from configuration)
    ///
    /// Keys that name no field are skipped; configuration validation
    /// reports them before a matcher is built.
    pub fn with_extra_labels(mut self, extra: &BTreeMap<String, Vec<String>>) -> Self {
        for (label, synonyms) in extra {
            match SchemaField::parse(label) {
                Some(field) => self = self.with_synonyms(field, synonyms),
                None => warn!("Ignoring synonyms for unknown field '{}'", label),
            }
        }
        self
    }

    /// Field named by a label, if any
    pub fn match_label(&self, label: &str) -> Option<SchemaField> {
        let key = label_key(label);
        if key.is_empty() {
            return None;
        }
        self.labels.get(&key).copied()
    }

    fn insert(&mut self, field: SchemaField, synonym: &str) {
        let key = label_key(synonym);
        if !key.is_empty() {
            self.labels.entry(key).or_insert(field);
        }
    }
}

impl Default for LabelMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact comparison key for a label
///
/// Leading markup is dropped entirely; a trailing `#` is kept because
/// "Order #" is a label in its own right.
pub fn label_key(label: &str) -> String {
    label
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '#')
        .flat_map(char::to_lowercase)
        .collect()
}
