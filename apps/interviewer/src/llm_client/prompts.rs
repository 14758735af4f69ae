// Shared prompt fragments.
// Each module that prompts the Oracle defines its own prompts.rs alongside it.

/// Appended to every prompt that expects a single JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Return STRICT JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// Feedback rules shared by the mid-interview and closing turns.
pub const FEEDBACK_RULES: &str = "\
- Exactly 2 professional sentences
- Use \"you/your\" to address the candidate directly
- Only assess the answer: no suggestions, tips, ratings, or praise
- The tone must be objective and professional; avoid encouraging or consoling language
- If the answer is incorrect, missing, or incomplete, state that directly and factually
- Do not ask the candidate to answer the question again
- If no answer was given, say so clearly and professionally
- Example (no answer): \"You did not provide a response to the question. This may reflect a gap in your understanding of the topic.\"
- Example (normal): \"Your explanation covered X well. You did not address Y.\"";

/// Fills `{key}` placeholders in a template in a single pass, so substituted
/// values (which may contain candidate text) are never re-expanded.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
