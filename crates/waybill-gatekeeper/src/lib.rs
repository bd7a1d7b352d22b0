//! Waybill Gatekeeper
//!
//! Classifies candidate shipping records before export.
//!
//! The Gatekeeper provides:
//! - Per-field rules (codes, names, addresses, couriers)
//! - Known-courier allow-list flagging
//! - Status derivation: Valid, Partial or Rejected
//!
//! Validation is a pure function of the field values: it never rewrites the
//! candidate, so invalid values stay available for review.
//!
//! # Examples
//!
//! ```
//! use waybill_gatekeeper::{RecordValidator, ValidationConfig};
//! use waybill_domain::{CandidateRecord, RecordStatus, SchemaField};
//!
//! let validator = RecordValidator::new(ValidationConfig::default());
//! let candidate = CandidateRecord::new()
//!     .with(SchemaField::OrderId, "ORD12345")
//!     .with(SchemaField::TrackingNumber, "1Z999AA10123456784");
//!
//! let record = validator.validate(&candidate);
//! assert_eq!(record.status(), RecordStatus::Partial);
//! ```

#![warn(missing_docs)]

mod validator;
mod error;
mod config;

pub use validator::RecordValidator;
pub use error::GatekeeperError;
pub use config::ValidationConfig;
