//! LLM prompt engineering for waybill field extraction

use waybill_domain::{ExtractedText, Prompt, SchemaField, NOT_FOUND};

/// Builds prompts for the LLM to extract shipping fields
///
/// The prompt is a pure function of the document text: no timestamps, no
/// randomness, and fields always appear in canonical order.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    fields: Vec<SchemaField>,
}

impl PromptBuilder {
    /// Create a prompt builder for the full shipping schema
    pub fn new() -> Self {
        Self {
            fields: SchemaField::ALL.to_vec(),
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self, text: &ExtractedText) -> Prompt {
        let mut user = String::new();

        // 1. What to extract
        user.push_str("Extract the following fields from this courier airway bill text:\n");
        for field in &self.fields {
            user.push_str(&format!("- {} ({})\n", field.label(), field.shape().describe()));
        }
        user.push('\n');

        // 2. Rules, including the missing-value marker
        user.push_str(&extraction_rules());
        user.push_str("\n\n");

        // 3. Answer format
        user.push_str("Answer format (one line per field, in this order):\n");
        for field in &self.fields {
            user.push_str(&format!("{}: <value>\n", field.label()));
        }
        user.push('\n');

        // 4. The text to analyze
        user.push_str("Document text:\n");
        user.push_str("---\n");
        user.push_str(text.as_str());
        user.push_str("\n---\n");

        Prompt::new(SYSTEM_INSTRUCTIONS, user)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn extraction_rules() -> String {
    format!(
        "Rules:\n\
         - Copy each value exactly as it appears in the document.\n\
         - If a field cannot be found, write \"{NOT_FOUND}\" as its value. Never guess or invent a value.\n\
         - Codes (order ids, tracking numbers) contain no spaces.\n\
         - Give each field exactly once."
    )
}

const SYSTEM_INSTRUCTIONS: &str = "You are an assistant specialized in extracting shipping \
information from courier airway bills. Answer only with the requested field lines, with no \
text before or after them.";
