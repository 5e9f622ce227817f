use serde::{Deserialize, Serialize};

/// Attribution for a single conversation turn.
///
/// These are the role names the Gemini API expects in request contents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message written by the human user.
    User,

    /// A reply produced by the model.
    Model,
}

/// One message in a conversation, attributed to either the user or the model.
///
/// Turns are immutable once created; a transcript only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,

    /// The text of the turn.
    pub content: String,
}

impl Turn {
    /// Create a new turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new model turn.
    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    /// The label used when rendering this turn for export.
    pub fn role_label(&self) -> &'static str {
        match self.role {
            Role::User => "You",
            Role::Model => "Bot",
        }
    }
}

impl From<&str> for Turn {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Turn {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(to_value(Role::User).unwrap(), json!("user"));
        assert_eq!(to_value(Role::Model).unwrap(), json!("model"));
    }

    #[test]
    fn turn_constructors() {
        let turn = Turn::user("Hi");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "Hi");
        assert_eq!(turn.role_label(), "You");

        let turn = Turn::model("Hello!");
        assert_eq!(turn.role, Role::Model);
        assert_eq!(turn.role_label(), "Bot");
    }

    #[test]
    fn turn_from_str_is_user() {
        let turn: Turn = "Hello".into();
        assert_eq!(turn.role, Role::User);
    }
}
