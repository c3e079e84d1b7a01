use crate::llm::ChatMessage;

/// System instruction; `{context}` is replaced by the retrieved text.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful medical assistant AI. You provide general medical information based on medical knowledge and always advise users to consult with healthcare professionals for specific medical advice.

Context from medical documents:
{context}

Key guidelines:
- Use the provided medical context to give accurate information
- Remember the conversation context and refer to previous messages when relevant
- If a user asks follow-up questions, connect them to what was discussed earlier
- Be empathetic and understanding
- Always recommend consulting healthcare professionals for diagnosis and treatment
- Provide clear, accurate, and helpful information with proper formatting";

/// `[system, ...history, human]`.
pub fn build_messages(context: &str, history: &[ChatMessage], input: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT.replace("{context}", context)));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::human(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn order_is_system_history_human() {
        let history = vec![ChatMessage::human("I have a cough"), ChatMessage::ai("How long?")];
        let m = build_messages("ctx", &history, "Two weeks");
        let roles: Vec<Role> = m.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::Human, Role::Ai, Role::Human]);
        assert_eq!(m[1].content, "I have a cough");
        assert_eq!(m[3].content, "Two weeks");
    }

    #[test]
    fn context_is_substituted() {
        let m = build_messages("Insulin lowers blood glucose.", &[], "q");
        assert!(m[0].content.contains("Context from medical documents:\nInsulin lowers blood glucose.\n"));
        assert!(!m[0].content.contains("{context}"));
    }

    #[test]
    fn input_is_not_templated() {
        let m = build_messages("ctx", &[], "what does {context} mean?");
        assert_eq!(m[1].content, "what does {context} mean?");
    }
}
