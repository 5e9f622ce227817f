use serde::{Deserialize, Serialize};

use crate::types::{Role, Turn};

/// One piece of a content block.
///
/// The Gemini API models content as a list of parts; this front-end only
/// produces and consumes text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Part {
    /// The text of this part, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a new text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// A role-attributed block of parts, as sent in request `contents` and
/// returned inside candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// The role this content is attributed to. Responses omit it sometimes,
    /// so it is optional on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// The parts making up this content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a content block with a single text part and no role.
    ///
    /// This is the shape used for system instructions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a role-attributed content block with a single text part.
    pub fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate the text of every part.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content::with_role(turn.role, turn.content.clone())
    }
}
