// Evaluation prompt template. Placeholders: {role}, {topics}, {count}, {transcript}

pub const EVALUATION_PROMPT: &str = r#"You are a senior interviewer reviewing a completed interview for a {role} position covering {topics}.

Below are {count} questions, each followed by the candidate's answer. An answer of "Answer Not Provided." means the candidate gave no answer.

{transcript}

For EACH question, in the same order, write:
- "review": 2 objective sentences addressed to the candidate ("you/your") assessing only that answer
- "score": an integer from 0 to 10 (0 for a missing answer)

Then write:
- "totalScore": an integer from 0 to 100 reflecting the whole interview
- "overallReview": 3 to 4 sentences summarizing strengths and gaps

Return JSON in exactly this format, with exactly {count} entries in "reviews":
{
  "reviews": [
    { "review": "Your answer ...", "score": 7 }
  ],
  "totalScore": 70,
  "overallReview": "..."
}"#;
