use std::time::Duration;

use strum::{AsRefStr, Display, EnumString, VariantArray};

pub const EMAIL_FORMAT_PROMPT: &str =
    "That frequency looks off. An email address needs an '@', try again:";

/// Lifecycle of one submission attempt.
#[derive(Display, EnumString, AsRefStr, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    #[default]
    Collecting,
    Sending,
    Sent,
    Error,
}

impl Status {
    /// Status lines shown under the prompt. Failure lines carry no endpoint
    /// diagnostics.
    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            Status::Collecting => &[],
            Status::Sending => &[
                "[INFO] Encrypting message...",
                "[INFO] Establishing quantum channel...",
            ],
            Status::Sent => &[
                "[OK] Connection established",
                "[OK] Message queued",
                "[SUCCESS] Transmission complete",
            ],
            Status::Error => &["[ERROR] Connection failed", "[CRITICAL] Transmission aborted."],
        }
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self, Status::Collecting)
    }
}

#[derive(Display, EnumString, AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    Message,
    Email,
    Name,
}

#[derive(Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum EntryKind {
    Question,
    Answer,
}

/// One line of the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub text: String,
}

impl Entry {
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Question,
            text: text.into(),
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Answer,
            text: text.into(),
        }
    }
}

/// Controller preset: which sub-steps are collected and how long terminal
/// states are shown before the form resets.
#[derive(
    Display, EnumString, AsRefStr, VariantArray, Default, Clone, Copy, Debug, PartialEq, Eq,
)]
#[strum(serialize_all = "snake_case")]
pub enum Variant {
    /// Single message prompt, recovers from errors on its own.
    #[default]
    Terminal,
    /// Message, email, then name. Errors stick until the form is recreated.
    Conversation,
}

impl Variant {
    pub fn steps(&self) -> &'static [Step] {
        match self {
            Variant::Terminal => &[Step::Message],
            Variant::Conversation => &[Step::Message, Step::Email, Step::Name],
        }
    }

    pub fn prompt(&self, step: Step) -> &'static str {
        match (self, step) {
            (Variant::Terminal, _) => "Enter your inquiry below:",
            (Variant::Conversation, Step::Message) => "What signal would you like to transmit?",
            (Variant::Conversation, Step::Email) => "On which frequency can I reach you? (email)",
            (Variant::Conversation, Step::Name) => "And who is transmitting? (name)",
        }
    }

    pub fn sent_reset(&self) -> Duration {
        match self {
            Variant::Terminal => Duration::from_secs(3),
            Variant::Conversation => Duration::from_secs(6),
        }
    }

    pub fn error_reset(&self) -> Option<Duration> {
        match self {
            Variant::Terminal => Some(Duration::from_secs(3)),
            Variant::Conversation => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("conversation").unwrap(), Variant::Conversation);
        assert_eq!(Variant::Terminal.to_string(), "terminal");
    }

    #[test]
    fn test_every_variant_starts_with_message() {
        for variant in Variant::VARIANTS {
            assert_eq!(variant.steps().first(), Some(&Step::Message));
        }
    }

    #[test]
    fn test_only_collecting_accepts_input() {
        assert!(Status::Collecting.accepts_input());
        assert!(!Status::Sending.accepts_input());
        assert!(!Status::Sent.accepts_input());
        assert!(!Status::Error.accepts_input());
    }
}
