//! Prompt construction and completion cleanup.

/// Prepended to every provider call.
pub const SYSTEM_PROMPT: &str = "You are a Mermaid diagram generator. \
Respond with valid Mermaid diagram syntax only. \
Do not include explanations, prose, or markdown code fences. \
The first line must be the diagram type declaration (for example `graph TD`, \
`sequenceDiagram`, `classDiagram`).";

/// Build the "fix with AI" prompt from the current source and the last render error.
#[must_use]
pub fn build_fix_prompt(source: &str, error: &str) -> String {
    format!(
        "The following Mermaid diagram fails to render.\n\n\
         Diagram:\n{source}\n\n\
         Error:\n{error}\n\n\
         Return a corrected version of the complete diagram that keeps the original intent."
    )
}

/// Trim a completion and strip a surrounding markdown fence if the model added one.
#[must_use]
pub fn clean_completion(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string (`mermaid`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
