//! Candidate and validated shipping records

use crate::schema::SchemaField;

/// Field values parsed from oracle output, not yet validated
///
/// Each schema field maps to an optional raw value. `None` means the field
/// was missing or explicitly marked "not found" by the oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    values: [Option<String>; SchemaField::COUNT],
    ambiguous: Vec<SchemaField>,
}

impl CandidateRecord {
    /// Create a record with every field missing
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    ///
    /// # Examples
    ///
    /// ```
    /// use waybill_domain::{CandidateRecord, SchemaField};
    ///
    /// let record = CandidateRecord::new().with(SchemaField::OrderId, "ORD-1");
    /// assert_eq!(record.get(SchemaField::OrderId), Some("ORD-1"));
    /// assert_eq!(record.present_count(), 1);
    /// ```
    pub fn with(mut self, field: SchemaField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a raw value
    pub fn set(&mut self, field: SchemaField, value: impl Into<String>) {
        self.values[field.index()] = Some(value.into());
    }

    /// Clear a value back to missing
    pub fn clear(&mut self, field: SchemaField) {
        self.values[field.index()] = None;
    }

    /// Raw value of a field, if present
    pub fn get(&self, field: SchemaField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Whether a field has a value
    pub fn is_present(&self, field: SchemaField) -> bool {
        self.values[field.index()].is_some()
    }

    /// Number of fields with a value
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Record that a field label matched more than once with differing values
    pub fn mark_ambiguous(&mut self, field: SchemaField) {
        if !self.ambiguous.contains(&field) {
            self.ambiguous.push(field);
        }
    }

    /// Fields whose label matched ambiguously
    pub fn ambiguous(&self) -> &[SchemaField] {
        &self.ambiguous
    }

    /// Iterate fields in canonical order with their raw values
    pub fn iter(&self) -> impl Iterator<Item = (SchemaField, Option<&str>)> + '_ {
        SchemaField::ALL
            .into_iter()
            .map(move |f| (f, self.get(f)))
    }
}

/// Verdict for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// Present and passes its rule
    Valid,

    /// Absent or explicitly "not found"
    Missing,

    /// Present but fails its rule
    Invalid(String),
}

impl FieldStatus {
    /// Whether the field passed validation
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldStatus::Valid)
    }
}

/// Non-fatal observation about a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFlag {
    /// Courier name not on the configured allow-list
    UnknownCourier(String),

    /// The oracle gave this field more than once with differing values
    AmbiguousLabel,
}

impl std::fmt::Display for FieldFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFlag::UnknownCourier(name) => write!(f, "unknown courier '{}'", name),
            FieldFlag::AmbiguousLabel => f.write_str("ambiguous label"),
        }
    }
}

/// Validation outcome for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    /// Field checked
    pub field: SchemaField,

    /// Verdict
    pub status: FieldStatus,

    /// Observations that do not affect the verdict
    pub flags: Vec<FieldFlag>,
}

impl FieldCheck {
    /// A check with no flags
    pub fn new(field: SchemaField, status: FieldStatus) -> Self {
        Self {
            field,
            status,
            flags: Vec::new(),
        }
    }
}

/// Overall classification of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    /// All five fields present and valid
    Valid,

    /// Some but not all fields valid
    Partial,

    /// No field valid
    Rejected,
}

impl RecordStatus {
    /// Derive the status from the number of valid fields
    pub fn from_valid_count(valid: usize) -> Self {
        if valid >= SchemaField::COUNT {
            RecordStatus::Valid
        } else if valid == 0 {
            RecordStatus::Rejected
        } else {
            RecordStatus::Partial
        }
    }

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Valid => "Valid",
            RecordStatus::Partial => "Partial",
            RecordStatus::Rejected => "Rejected",
        }
    }

    /// Whether records with this status are written as table rows
    pub fn is_exportable(&self) -> bool {
        !matches!(self, RecordStatus::Rejected)
    }
}

/// A candidate plus its per-field verdicts and derived status
///
/// The status is computed on construction and cannot disagree with the
/// field checks. The candidate's raw values are kept untouched so invalid
/// values can still be shown for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    candidate: CandidateRecord,
    checks: [FieldCheck; SchemaField::COUNT],
    status: RecordStatus,
}

impl ValidatedRecord {
    /// Build from a candidate and one check per field
    ///
    /// Checks are re-ordered into canonical field order.
    pub fn new(candidate: CandidateRecord, checks: [FieldCheck; SchemaField::COUNT]) -> Self {
        let mut checks = checks;
        checks.sort_by_key(|c| c.field.index());
        let valid = checks.iter().filter(|c| c.status.is_valid()).count();
        Self {
            candidate,
            checks,
            status: RecordStatus::from_valid_count(valid),
        }
    }

    /// Overall status
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// The untouched candidate
    pub fn candidate(&self) -> &CandidateRecord {
        &self.candidate
    }

    /// Raw value of a field
    pub fn value(&self, field: SchemaField) -> Option<&str> {
        self.candidate.get(field)
    }

    /// Check for a field
    pub fn check(&self, field: SchemaField) -> &FieldCheck {
        &self.checks[field.index()]
    }

    /// All checks in canonical order
    pub fn checks(&self) -> &[FieldCheck] {
        &self.checks
    }

    /// Number of valid fields
    pub fn valid_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_valid()).count()
    }

    /// Fields that were missing
    pub fn missing_fields(&self) -> Vec<SchemaField> {
        self.checks
            .iter()
            .filter(|c| c.status == FieldStatus::Missing)
            .map(|c| c.field)
            .collect()
    }

    /// Fields present but invalid, with the reason
    pub fn invalid_fields(&self) -> Vec<(SchemaField, &str)> {
        self.checks
            .iter()
            .filter_map(|c| match &c.status {
                FieldStatus::Invalid(reason) => Some((c.field, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// All flags raised, paired with their field
    pub fn flags(&self) -> Vec<(SchemaField, &FieldFlag)> {
        self.checks
            .iter()
            .flat_map(|c| c.flags.iter().map(move |f| (c.field, f)))
            .collect()
    }

    /// One-line description of what is wrong with the record
    pub fn problem_summary(&self) -> String {
        let mut parts = Vec::new();
        let missing = self.missing_fields();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            parts.push(format!("missing: {}", names.join(", ")));
        }
        for (field, reason) in self.invalid_fields() {
            parts.push(format!("invalid {}: {}", field.label(), reason));
        }
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checks_with(valid: usize) -> [FieldCheck; SchemaField::COUNT] {
        SchemaField::ALL.map(|f| {
            if f.index() < valid {
                FieldCheck::new(f, FieldStatus::Valid)
            } else {
                FieldCheck::new(f, FieldStatus::Missing)
            }
        })
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(RecordStatus::from_valid_count(5), RecordStatus::Valid);
        assert_eq!(RecordStatus::from_valid_count(4), RecordStatus::Partial);
        assert_eq!(RecordStatus::from_valid_count(1), RecordStatus::Partial);
        assert_eq!(RecordStatus::from_valid_count(0), RecordStatus::Rejected);
    }

    #[test]
    fn test_validated_record_status_matches_checks() {
        let record = ValidatedRecord::new(CandidateRecord::new(), checks_with(3));
        assert_eq!(record.status(), RecordStatus::Partial);
        assert_eq!(record.valid_count(), 3);
        assert_eq!(
            record.missing_fields(),
            vec![SchemaField::CourierName, SchemaField::TrackingNumber]
        );
    }

    #[test]
    fn test_checks_reordered() {
        let mut checks = checks_with(5);
        checks.reverse();
        let record = ValidatedRecord::new(CandidateRecord::new(), checks);
        assert_eq!(record.check(SchemaField::OrderId).field, SchemaField::OrderId);
        assert_eq!(record.status(), RecordStatus::Valid);
    }

    #[test]
    fn test_problem_summary() {
        let mut checks = checks_with(5);
        checks[0].status = FieldStatus::Invalid("contains spaces".to_string());
        checks[4].status = FieldStatus::Missing;
        let record = ValidatedRecord::new(CandidateRecord::new(), checks);

        let summary = record.problem_summary();
        assert!(summary.contains("missing: Tracking Number"));
        assert!(summary.contains("invalid Order ID: contains spaces"));
    }

    #[test]
    fn test_ambiguous_marked_once() {
        let mut record = CandidateRecord::new();
        record.mark_ambiguous(SchemaField::CourierName);
        record.mark_ambiguous(SchemaField::CourierName);
        assert_eq!(record.ambiguous(), &[SchemaField::CourierName]);
    }
}
