//! Schema module - the five fields extracted from every airway bill

/// Placeholder written for a field the oracle could not find
pub const NOT_FOUND: &str = "Not Found";

/// One field of the shipping record schema
///
/// The declaration order is the canonical column order used by the prompt,
/// the parser, the validator and the exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaField {
    /// Merchant or marketplace order identifier
    OrderId,

    /// Person or company receiving the parcel
    RecipientName,

    /// Delivery address of the recipient
    RecipientAddress,

    /// Carrier that issued the airway bill
    CourierName,

    /// Carrier tracking / AWB number
    TrackingNumber,
}

/// Expected shape of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Human-readable text (names, addresses)
    FreeText,

    /// Alphanumeric identifier (order ids, tracking numbers)
    Code,
}

impl ValueShape {
    /// Short description used in the oracle prompt
    pub fn describe(&self) -> &'static str {
        match self {
            ValueShape::FreeText => "free text",
            ValueShape::Code => "alphanumeric code, no spaces",
        }
    }
}

impl SchemaField {
    /// Number of schema fields
    pub const COUNT: usize = 5;

    /// All fields in canonical order
    pub const ALL: [SchemaField; Self::COUNT] = [
        SchemaField::OrderId,
        SchemaField::RecipientName,
        SchemaField::RecipientAddress,
        SchemaField::CourierName,
        SchemaField::TrackingNumber,
    ];

    /// Canonical label, as shown in prompts and column headers
    pub fn label(&self) -> &'static str {
        match self {
            SchemaField::OrderId => "Order ID",
            SchemaField::RecipientName => "Recipient Name",
            SchemaField::RecipientAddress => "Recipient Address",
            SchemaField::CourierName => "Courier Name",
            SchemaField::TrackingNumber => "Tracking Number",
        }
    }

    /// Expected value shape
    pub fn shape(&self) -> ValueShape {
        match self {
            SchemaField::OrderId | SchemaField::TrackingNumber => ValueShape::Code,
            SchemaField::RecipientName
            | SchemaField::RecipientAddress
            | SchemaField::CourierName => ValueShape::FreeText,
        }
    }

    /// Position in canonical order
    pub fn index(&self) -> usize {
        match self {
            SchemaField::OrderId => 0,
            SchemaField::RecipientName => 1,
            SchemaField::RecipientAddress => 2,
            SchemaField::CourierName => 3,
            SchemaField::TrackingNumber => 4,
        }
    }

    /// Parse a canonical label, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for SchemaField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SchemaField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid schema field: {}", s))
    }
}
