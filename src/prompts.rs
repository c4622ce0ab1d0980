//! Prompts for the field-extraction completion call.
//!
//! Centralising the prompt text here keeps `pipeline::llm` free of wording
//! concerns and lets unit tests inspect prompts without a live endpoint.

/// System message sent with every extraction request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts structured client information.";

/// The six field names the model is asked to return, in column order.
pub const EXPECTED_FIELDS: [&str; 6] =
    ["Full Name", "Client ID", "Date", "Phone", "Email", "DOB"];

/// Build the user prompt embedding the document text.
///
/// The model is instructed to answer with a JSON object keyed exactly by
/// [`EXPECTED_FIELDS`], using `null` for anything absent. Replies routinely
/// wrap that object in prose anyway; `pipeline::parse` deals with it.
pub fn extraction_prompt(text: &str) -> String {
    format!(
        r#"You are an AI assistant. Extract the following fields from the text below if present:
{fields}.
Return the output as a JSON object with keys exactly as these fields.
If a field is missing, use null as the value.

Text:
"""{text}""""#,
        fields = EXPECTED_FIELDS.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_document_text() {
        let p = extraction_prompt("John Doe, phone 555-1234");
        assert!(p.contains("John Doe, phone 555-1234"));
    }

    #[test]
    fn prompt_names_every_expected_field() {
        let p = extraction_prompt("x");
        for field in EXPECTED_FIELDS {
            assert!(p.contains(field), "prompt is missing '{field}'");
        }
    }

    #[test]
    fn prompt_asks_for_null_on_missing_fields() {
        assert!(extraction_prompt("x").contains("use null"));
    }
}
