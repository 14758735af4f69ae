// Provisioning prompt templates. Placeholders are filled with `llm_client::prompts::render`.

/// One (role, topic) sanity check. Placeholders: {role}, {topic}
pub const VALIDATE_TOPIC_PROMPT: &str = r#"You are an expert AI assistant.

Your task is to determine whether the given role and topic are appropriate and logically related.

Return strictly one of the following JSON responses:

If the combination is valid:
{ "valid": true }

If the combination is inappropriate or unrelated:
{ "valid": false }

Do not provide any explanation or extra text.

Role: {role}
Topic: {topic}"#;

/// Résumé-grounded question generation.
/// Placeholders: {count}, {role}, {topics}, {resume}
pub const RESUME_QUESTIONS_PROMPT: &str = r#"You are an expert technical interviewer preparing an interview for a {role} position.

The candidate's parsed résumé is given below as JSON. Generate exactly {count} unique interview questions that:
1. Focus on these topics: {topics}
2. Refer to concrete projects, roles, or technologies from the résumé where possible
3. Are clear, concise, and answerable orally in 30 to 60 seconds
4. Differ from each other in wording and focus

For each question, estimate the expected spoken answer time in seconds:
- Simple factual questions: 30 to 35
- Conceptual or reasoning questions: 40 to 50
- Scenario-based or multi-step questions: 50 to 60

Return JSON in exactly this format:
{
  "questions": [
    { "question": "First question?", "time": 30 },
    { "question": "Second question?", "time": 50 }
  ]
}

Candidate résumé:
{resume}"#;

/// Combined validation and question generation for an explicit (role, topic) pair.
/// Placeholders: {count}, {role}, {topic}
pub const TOPIC_INTERVIEW_PROMPT: &str = r#"You are an expert AI interview assistant.

Your task:
- Validate whether the given role and topic are appropriate and related.
- If valid, generate an array of unique, concise, and orally answerable interview questions relevant to the role and topic.

Constraints:
1. Generate exactly {count} unique and non-repetitive interview questions.
2. Each question must be clear, focused, and answerable within a 30 to 60 second spoken response.
3. All questions must be different in wording and focus.
4. Avoid essay-style questions unless essential to the role.
5. For each question, estimate the expected answer time in seconds:
    - Simple factual questions: 30 to 35
    - Conceptual or reasoning questions: 40 to 50
    - Scenario-based or multi-step questions: 50 to 60

If valid, return:
{
  "valid": true,
  "questions": [
    { "question": "First unique question?", "time": 30 },
    { "question": "Second unique question?", "time": 50 }
  ]
}

If the role and topic do not match or are inappropriate, return:
{
  "valid": false,
  "questions": []
}

Role: {role}
Topic: {topic}"#;
