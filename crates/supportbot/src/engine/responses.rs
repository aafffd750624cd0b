//! Canned replies that do not come from the knowledge base

/// Messages that short-circuit to the help text (compared after trim + lowercase).
pub const HELP_ALIASES: [&str; 4] = ["help", "?", "menu", "commands"];

pub const HELP_TEXT: &str = "
🆘 **Here's what I can help you with:**

| Topic | Example Question |
|-------|-----------------|
| 🕐 Hours | \"What are your working hours?\" |
| 💰 Pricing | \"How much does it cost?\" |
| 💸 Refunds | \"How do I get a refund?\" |
| 📦 Shipping | \"When will my order arrive?\" |
| 🔐 Password | \"I forgot my password\" |
| 📞 Contact | \"How do I reach support?\" |
| 🚀 Features | \"What features do you offer?\" |
| 🐛 Bug | \"Something is not working\" |
| 🤖 About | \"Who are you?\" |
";

pub const EMPTY_INPUT_RESPONSE: &str = "Please type a message so I can help you! 😊";

pub const FALLBACK_RESPONSES: [&str; 4] = [
    "Hmm, I'm not sure I understood that. Could you rephrase? 🤔",
    "I don't have an answer for that yet. Try asking about **pricing, shipping, refunds, hours, or bugs**!",
    "That's outside my expertise! You can reach a human agent at **support@company.com** for complex queries.",
    "I'm still learning! 🧠 Could you ask that differently, or type **'help'** to see what I can assist with.",
];

pub fn is_help_alias(message: &str) -> bool {
    let canonical = message.trim().to_lowercase();
    HELP_ALIASES.contains(&canonical.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_alias_ignores_case_and_padding() {
        assert!(is_help_alias("help"));
        assert!(is_help_alias("  HELP \n"));
        assert!(is_help_alias("?"));
        assert!(is_help_alias(" Menu"));
        assert!(is_help_alias("COMMANDS"));
    }

    #[test]
    fn test_help_alias_is_exact() {
        assert!(!is_help_alias("help me"));
        assert!(!is_help_alias("??"));
        assert!(!is_help_alias(""));
    }
}
