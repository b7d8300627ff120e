use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const ANONYMOUS: &str = "Anonymous";

/// Fields a visitor provides through the contact flow.
///
/// Wire shape is `{message, email?, name?}`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Submission {
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub name: Option<String>,
}

impl Submission {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Decode a request body and check it against the schema.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let submission: Self = serde_json::from_slice(body)?;
        submission.validate()?;

        Ok(submission)
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
    }

    pub fn reply_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}
