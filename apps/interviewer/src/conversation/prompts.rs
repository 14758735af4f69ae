// Conversation prompt templates.
// Placeholders are filled with `llm_client::prompts::render`; {rules} takes FEEDBACK_RULES.

/// First turn. Placeholders: {role}, {topic}, {name}
pub const OPENING_PROMPT: &str = r#"You are conducting a professional interview for a {role} position, focusing on {topic}.

Your task is to generate:

1. A warm, professional welcome message for the candidate {name}, written as three short parts in a single line.
   - Keep the whole message under 200 words.
   - Structure it as greeting, purpose, and encouragement, without line breaks.
   - Mention the job title naturally (e.g. "as a backend engineer" rather than "for this role").
   - Do not mention AI, mock interviews, or simulations.
   - Do not use bullet points or numbered lists.

2. A standalone transition phrase that leads into the first question.
   - It must be a phrase or sentence fragment, not a complete sentence or a question.
   - It must not mention the résumé, background, or job details.
   - Keep it professional and slightly varied, like "Let's begin with" or "To get things started,".
   - It must not contain a question mark.

Return JSON in exactly this format:
{
  "addressing": "single-line welcome message",
  "transition": "transition phrase"
}"#;

/// Middle turns. Placeholders: {role}, {topic}, {question}, {answer}, {rules}
pub const MID_TURN_PROMPT: &str = r#"You are conducting a professional interview for {role} focusing on {topic}.

Previous question: "{question}"
Candidate answer: "{answer}"

Generate:

1. FEEDBACK (strict rules):
{rules}

2. TRANSITION (strict rules):
- Start with one of these openings: "Next, let's discuss,", "Moving on to,", "Now, consider,"
- Do NOT include a question; it is only a lead-in to the next topic
- End with a colon or an ellipsis

Return JSON in exactly this format:
{
  "feedback": "your 2-sentence feedback",
  "transition": "transition phrase only (no question)"
}"#;

/// Last turn. Placeholders: {role}, {topic}, {question}, {answer}, {rules}
pub const FINAL_TURN_PROMPT: &str = r#"You are conducting a professional interview for {role} focusing on {topic}.

Previous question: "{question}"
Candidate answer: "{answer}"

Generate:

1. FEEDBACK (strict rules):
{rules}

2. CLOSING MESSAGE (strict rules):
- A professional, warm thank-you message of 2 to 3 sentences that ends the interview
- Express appreciation for the candidate's time, effort, and responses
- Vary the wording every time; never reuse a previous closing message
- Match the tone of this example without copying it:
  "Thank you for participating in this interview. Your insights were valuable and demonstrated thoughtful engagement. We appreciate the time and effort you invested."

Return JSON in exactly this format:
{
  "feedback": "your 2-sentence feedback",
  "transition": "a 2 to 3 sentence thank-you message that ends the interview"
}"#;
