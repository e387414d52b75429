//! Keyword-matched tutor replies for `/ai/chat`.

const REPLIES: &[(&str, &str)] = &[
  ("hello", "Hello! I'm your coding tutor. How can I help you learn programming patterns today?"),
  ("help", "I can help you understand programming patterns, analyze code, and provide step-by-step guidance. What would you like to learn?"),
  ("pattern", "Programming patterns are visual representations of code logic. They help you understand loops, conditions, and algorithms. Which pattern interests you?"),
  ("loop", "Loops are fundamental in programming patterns. They help you repeat actions and create structured output. Would you like to see some examples?"),
  ("difficult", "Don't worry! Every programmer starts somewhere. Let's break down the problem into smaller, manageable steps. What specific part is challenging?"),
];

const DEFAULT_REPLY: &str = "That's a great question! Let me help you understand that concept. Can you tell me more about what specific part you'd like to explore?";

/// First keyword (in table order) found in the lowercased message wins.
pub fn reply(message: &str) -> &'static str {
  let lower = message.to_lowercase();
  REPLIES
    .iter()
    .find(|(key, _)| lower.contains(key))
    .map(|(_, text)| *text)
    .unwrap_or(DEFAULT_REPLY)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn earlier_keywords_take_precedence() {
    // Contains both "help" and "loop".
    assert!(reply("Please HELP me with this loop").starts_with("I can help you"));
    assert!(reply("nested loops are hard").starts_with("Loops are fundamental"));
  }

  #[test]
  fn unknown_message_gets_default() {
    assert_eq!(reply("what is recursion?"), DEFAULT_REPLY);
  }
}
