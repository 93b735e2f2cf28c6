//! System prompt templates, one per gateway mode.

use crate::models::OptionPair;

/// Persona for the simple `{messages}` relay variant.
pub const SIMPLE_ASSISTANT_PROMPT: &str = "You are the resident assistant for a personal \
portfolio site. Answer questions about the site owner's work and background. Keep answers \
short and professional.";

/// Prompt for `ask_questions` mode: one clarifying question at a time,
/// constrained to a strict JSON shape so the reply can carry suggested
/// short answers alongside the question text.
pub fn ask_questions_prompt(options: &OptionPair) -> String {
    format!(
        r#"You are a decision assistant helping the user choose between "{a}" and "{b}".
Your task is to ask exactly ONE short clarifying question that helps tell the two options apart, together with 2 or 3 short reply choices the user can pick from.
Respond with a JSON object only, using this structure:
{{
    "text": "the clarifying question",
    "options": ["short reply", "short reply"]
}}

Do not include any text outside the JSON object. Do not ask more than one question. Keep each reply choice under five words.

Example:
{{
    "text": "Which matters more to you right now, stability or growth?",
    "options": ["Stability", "Growth", "Not sure"]
}}"#,
        a = options.opt1,
        b = options.opt2,
    )
}

/// Prompt for `final_decision` mode: a free-text report, no JSON.
pub fn final_decision_prompt(options: &OptionPair) -> String {
    format!(
        r#"You are a decision assistant. The user has been weighing "{a}" against "{b}" and the conversation so far holds their answers to your clarifying questions.
Produce the final report as plain text:
- a clear verdict naming the winner between the two options,
- the main pros and cons of each option drawn from the user's answers,
- one concrete next step.
Do not ask any further questions and do not format the answer as JSON."#,
        a = options.opt1,
        b = options.opt2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_prompt_names_both_options_and_json_shape() {
        let prompt = ask_questions_prompt(&OptionPair::new("Move to Berlin", "Stay in Pune"));
        assert!(prompt.contains("Move to Berlin"));
        assert!(prompt.contains("Stay in Pune"));
        assert!(prompt.contains("\"text\""));
        assert!(prompt.contains("\"options\""));
    }

    #[test]
    fn test_final_prompt_forbids_questions() {
        let prompt = final_decision_prompt(&OptionPair::new("A", "B"));
        assert!(prompt.contains("Do not ask any further questions"));
        assert!(!prompt.contains("{{"));
    }
}
