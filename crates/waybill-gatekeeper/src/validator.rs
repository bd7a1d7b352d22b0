//! Record validation logic

use crate::ValidationConfig;
use tracing::debug;
use waybill_domain::{
    CandidateRecord, FieldCheck, FieldFlag, FieldStatus, SchemaField, ValidatedRecord, ValueShape,
    NOT_FOUND,
};

const CODE_SEPARATORS: &[char] = &['-', '_', '/', '.'];

/// The RecordValidator classifies candidate records before export
pub struct RecordValidator {
    config: ValidationConfig,
    couriers: Vec<String>,
}

impl RecordValidator {
    /// Create a new RecordValidator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        let couriers = config
            .courier_allow_list
            .iter()
            .map(|c| normalize_name(c))
            .collect();
        Self { config, couriers }
    }

    /// Create a RecordValidator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a candidate against the configured rules
    ///
    /// Each field is checked on its own; the record status follows from the
    /// number of valid fields. The candidate is cloned into the result
    /// unchanged.
    pub fn validate(&self, candidate: &CandidateRecord) -> ValidatedRecord {
        let checks = SchemaField::ALL.map(|field| {
            let mut check = self.check_field(field, candidate.get(field));
            if candidate.ambiguous().contains(&field) {
                check.flags.push(FieldFlag::AmbiguousLabel);
            }
            check
        });

        let record = ValidatedRecord::new(candidate.clone(), checks);
        debug!(
            "Validated record: {} ({}/{} fields valid)",
            record.status().as_str(),
            record.valid_count(),
            SchemaField::COUNT
        );
        record
    }

    /// Check one field value
    pub fn check_field(&self, field: SchemaField, value: Option<&str>) -> FieldCheck {
        let value = match value.map(str::trim) {
            Some(v) if !is_missing(v) => v,
            _ => return FieldCheck::new(field, FieldStatus::Missing),
        };

        let status = match (field, field.shape()) {
            (_, ValueShape::Code) => self.check_code(value),
            (SchemaField::RecipientName, _) => check_name(value),
            // Address and courier only need a value
            _ => FieldStatus::Valid,
        };

        let mut check = FieldCheck::new(field, status);
        if field == SchemaField::CourierName && !self.is_known_courier(value) {
            check.flags.push(FieldFlag::UnknownCourier(value.to_string()));
        }
        check
    }

    /// Whether a courier name is on the allow-list
    ///
    /// Always true when the allow-list check is disabled or the list is
    /// empty. A name also matches when it starts with a listed courier
    /// followed by a space, so "FedEx Ground" matches "FedEx".
    pub fn is_known_courier(&self, name: &str) -> bool {
        if !self.config.check_courier_allow_list || self.couriers.is_empty() {
            return true;
        }
        let name = normalize_name(name);
        self.couriers.iter().any(|known| {
            name == *known
                || name
                    .strip_prefix(known.as_str())
                    .is_some_and(|rest| rest.starts_with(' '))
        })
    }

    fn check_code(&self, value: &str) -> FieldStatus {
        if value.chars().any(char::is_whitespace) {
            return FieldStatus::Invalid("contains whitespace".to_string());
        }

        let length = value.chars().count();
        if length > self.config.max_code_length {
            return FieldStatus::Invalid(format!(
                "longer than {} characters",
                self.config.max_code_length
            ));
        }

        let allowed = |c: char| {
            c.is_ascii_alphanumeric()
                || (self.config.allow_code_separators && CODE_SEPARATORS.contains(&c))
        };
        if let Some(bad) = value.chars().find(|c| !allowed(*c)) {
            return FieldStatus::Invalid(format!("contains invalid character '{}'", bad));
        }

        if !value.chars().any(|c| c.is_ascii_alphanumeric()) {
            return FieldStatus::Invalid("has no letters or digits".to_string());
        }

        FieldStatus::Valid
    }
}

fn check_name(value: &str) -> FieldStatus {
    if value.chars().any(char::is_alphabetic) {
        FieldStatus::Valid
    } else {
        FieldStatus::Invalid("contains no letters".to_string())
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(NOT_FOUND)
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_domain::RecordStatus;

    fn create_test_candidate() -> CandidateRecord {
        CandidateRecord::new()
            .with(SchemaField::OrderId, "ORD202400017")
            .with(SchemaField::RecipientName, "Priya Sharma")
            .with(SchemaField::RecipientAddress, "14 MG Road, Bengaluru 560001")
            .with(SchemaField::CourierName, "Blue Dart")
            .with(SchemaField::TrackingNumber, "BD123456789IN")
    }

    #[test]
    fn test_valid_record() {
        let validator = RecordValidator::default_config();
        let record = validator.validate(&create_test_candidate());

        assert_eq!(record.status(), RecordStatus::Valid);
        assert_eq!(record.valid_count(), 5);
        assert!(record.flags().is_empty());
    }

    #[test]
    fn test_empty_record_rejected() {
        let validator = RecordValidator::default_config();
        let record = validator.validate(&CandidateRecord::new());

        assert_eq!(record.status(), RecordStatus::Rejected);
        assert_eq!(record.missing_fields().len(), 5);
    }

    #[test]
    fn test_one_missing_field_is_partial() {
        let validator = RecordValidator::default_config();
        let mut candidate = create_test_candidate();
        candidate.clear(SchemaField::TrackingNumber);

        let record = validator.validate(&candidate);
        assert_eq!(record.status(), RecordStatus::Partial);
        assert_eq!(record.missing_fields(), vec![SchemaField::TrackingNumber]);
    }

    #[test]
    fn test_one_invalid_field_is_partial() {
        let validator = RecordValidator::default_config();
        let candidate = create_test_candidate().with(SchemaField::OrderId, "ORD 17");

        let record = validator.validate(&candidate);
        assert_eq!(record.status(), RecordStatus::Partial);
        match &record.check(SchemaField::OrderId).status {
            FieldStatus::Invalid(reason) => assert!(reason.contains("whitespace")),
            other => panic!("Expected Invalid, got {:?}", other),
        }
        // Raw value kept for review
        assert_eq!(record.value(SchemaField::OrderId), Some("ORD 17"));
    }

    #[test]
    fn test_blank_and_not_found_values_are_missing() {
        let validator = RecordValidator::default_config();
        assert_eq!(
            validator.check_field(SchemaField::RecipientAddress, Some("   ")).status,
            FieldStatus::Missing
        );
        assert_eq!(
            validator.check_field(SchemaField::OrderId, Some("not found")).status,
            FieldStatus::Missing
        );
    }

    #[test]
    fn test_code_rules() {
        let validator = RecordValidator::default_config();
        let check = |v: &str| validator.check_field(SchemaField::TrackingNumber, Some(v)).status;

        assert!(check("1Z999AA10123456784").is_valid());
        assert!(!check("AWB/2024/001").is_valid());
        assert!(check("  12345  ").is_valid());
        assert!(!check("12#45").is_valid());
        assert!(!check("---").is_valid());
        assert!(!check(&"9".repeat(65)).is_valid());
        assert!(check(&"9".repeat(64)).is_valid());
    }

    #[test]
    fn test_separated_codes_invalid_by_default() {
        let validator = RecordValidator::default_config();
        for code in ["ORD-1", "A/B.C_D", "1Z-999"] {
            for field in [SchemaField::OrderId, SchemaField::TrackingNumber] {
                match validator.check_field(field, Some(code)).status {
                    FieldStatus::Invalid(reason) => {
                        assert!(reason.contains("invalid character"), "{}: {}", code, reason)
                    }
                    other => panic!("Expected {} to be Invalid, got {:?}", code, other),
                }
            }
        }

        let strict = RecordValidator::new(ValidationConfig::strict());
        assert!(!strict
            .check_field(SchemaField::OrderId, Some("ORD-1"))
            .status
            .is_valid());
    }

    #[test]
    fn test_separated_codes_valid_when_enabled() {
        let validator = RecordValidator::new(ValidationConfig::with_code_separators());
        for code in ["ORD-1", "A/B.C_D", "1Z-999", "AWB/2024/001"] {
            assert!(validator
                .check_field(SchemaField::TrackingNumber, Some(code))
                .status
                .is_valid());
        }
        assert!(!validator
            .check_field(SchemaField::OrderId, Some("---"))
            .status
            .is_valid());
        assert!(!validator
            .check_field(SchemaField::OrderId, Some("A B"))
            .status
            .is_valid());
    }

    #[test]
    fn test_name_needs_a_letter() {
        let validator = RecordValidator::default_config();
        assert!(!validator
            .check_field(SchemaField::RecipientName, Some("12345"))
            .status
            .is_valid());
        assert!(validator
            .check_field(SchemaField::RecipientName, Some("José Ñúñez"))
            .status
            .is_valid());
    }

    #[test]
    fn test_unknown_courier_flagged_but_valid() {
        let validator = RecordValidator::default_config();
        let check = validator.check_field(SchemaField::CourierName, Some("Pigeon Post"));

        assert!(check.status.is_valid());
        assert_eq!(
            check.flags,
            vec![FieldFlag::UnknownCourier("Pigeon Post".to_string())]
        );
    }

    #[test]
    fn test_courier_matching() {
        let validator = RecordValidator::default_config();
        assert!(validator.is_known_courier("dhl"));
        assert!(validator.is_known_courier("FedEx  Ground"));
        assert!(validator.is_known_courier("BLUE DART"));
        assert!(!validator.is_known_courier("DHLX"));

        let permissive = RecordValidator::new(ValidationConfig::permissive());
        assert!(permissive.is_known_courier("Pigeon Post"));
    }

    #[test]
    fn test_ambiguous_label_flag() {
        let validator = RecordValidator::default_config();
        let mut candidate = create_test_candidate();
        candidate.mark_ambiguous(SchemaField::RecipientName);

        let record = validator.validate(&candidate);
        assert_eq!(record.status(), RecordStatus::Valid);
        assert_eq!(
            record.flags(),
            vec![(SchemaField::RecipientName, &FieldFlag::AmbiguousLabel)]
        );
    }
}
