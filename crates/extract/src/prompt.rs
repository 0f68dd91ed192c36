//! Fixed two-part prompt for the extraction call.

/// System instruction: keep the model in strict JSON-extraction mode.
pub const SYSTEM_PROMPT: &str =
    "You are a precise data extraction assistant. Always provide responses in valid JSON format.";

/// Build the user message embedding the query, the formatted search results,
/// and the required response schema.
pub fn build_user_prompt(query: &str, results_text: &str) -> String {
    format!(
        r#"### Context
Query: {query}
Search Results: {results_text}

### Task
Analyze the search results and extract relevant information that answers the query.
Provide a response in JSON format with the following structure:
{{
    "extracted_info": "main findings or relevant information",
    "key_points": ["list", "of", "important", "points"],
    "source_quality": "assessment of source reliability (high/medium/low)",
    "confidence": "confidence in findings (high/medium/low)",
    "additional_notes": "any caveats or important context"
}}

The JSON must be valid and properly formatted.
"#
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────
