use super::*;

#[test]
fn system_prompt_forbids_fences_and_prose() {
    assert!(SYSTEM_PROMPT.contains("Mermaid"));
    assert!(SYSTEM_PROMPT.contains("code fences"));
    assert!(SYSTEM_PROMPT.contains("explanations"));
}

#[test]
fn fix_prompt_embeds_source_and_error() {
    let prompt = build_fix_prompt("graph TD\nA--", "Parse error on line 2");
    assert!(prompt.contains("graph TD\nA--"));
    assert!(prompt.contains("Parse error on line 2"));
    assert!(prompt.contains("corrected"));
}

#[test]
fn clean_completion_trims() {
    assert_eq!(clean_completion("  graph TD\nA-->B \n"), "graph TD\nA-->B");
}

#[test]
fn clean_completion_strips_mermaid_fence() {
    let raw = "```mermaid\ngraph TD\nA-->B\n```";
    assert_eq!(clean_completion(raw), "graph TD\nA-->B");
}

#[test]
fn clean_completion_strips_bare_fence() {
    let raw = "\n```\nsequenceDiagram\nA->>B: hi\n```\n";
    assert_eq!(clean_completion(raw), "sequenceDiagram\nA->>B: hi");
}

#[test]
fn clean_completion_unterminated_fence() {
    assert_eq!(clean_completion("```mermaid\ngraph LR\nX-->Y"), "graph LR\nX-->Y");
}

#[test]
fn clean_completion_empty_stays_empty() {
    assert_eq!(clean_completion("   \n "), "");
    assert_eq!(clean_completion("```\n```"), "");
}
