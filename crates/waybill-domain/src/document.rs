//! Documents, extracted text and oracle prompts

/// One input document: an identity plus its raw bytes
///
/// Immutable once read. The orchestrator owns it for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    identity: String,
    bytes: Vec<u8>,
}

impl SourceDocument {
    /// Create a document from an identity (usually the file name) and its payload
    pub fn new(identity: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            identity: identity.into(),
            bytes,
        }
    }

    /// Identity shown in results and diagnostics
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Raw payload
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Plain text decoded from a document
///
/// Empty text is a legitimate value: the oracle is still asked, and is
/// expected to answer "Not Found" for every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap decoded text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no text (or only whitespace) was extracted
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A request for the extraction oracle
///
/// `system` carries the fixed role instruction, `user` the schema description
/// and the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System instruction
    pub system: String,

    /// User message
    pub user: String,
}

impl Prompt {
    /// Create a prompt from its two parts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Total length of both parts in bytes
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    /// Whether both parts are empty
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}
