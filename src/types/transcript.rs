use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::types::{Content, Turn};

/// The ordered history of a conversation.
///
/// Insertion order is conversation order. Roles are expected to alternate
/// starting with `user` in well-formed use, but this is not enforced:
/// whatever sequence the caller builds is sent to the endpoint verbatim.
/// A transcript only ever grows by appending a turn, or is cleared whole;
/// individual turns are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the conversation.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Remove every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if there are no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the turns in conversation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the last turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Converts the transcript into the `contents` shape the API expects.
    pub fn to_contents(&self) -> Vec<Content> {
        self.turns.iter().map(Content::from).collect()
    }

    /// Renders the transcript as plain text for export.
    ///
    /// Each turn becomes a role label (`You`/`Bot`) on its own line followed
    /// by the content, with a blank line between turns and trailing
    /// whitespace trimmed. This is a pure function of the transcript: two
    /// calls on the same transcript produce byte-identical output.
    pub fn export(&self) -> String {
        let mut rendered = String::new();
        for turn in &self.turns {
            rendered.push_str(turn.role_label());
            rendered.push_str(":\n");
            rendered.push_str(&turn.content);
            rendered.push_str("\n\n");
        }
        rendered.trim_end().to_string()
    }
}

impl FromIterator<Turn> for Transcript {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// Default filename for an exported conversation at the given instant:
/// `conversation_<YYYYMMDD_HHMMSS>.txt`.
pub fn export_file_name(at: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    match at.format(&format) {
        Ok(stamp) => format!("conversation_{stamp}.txt"),
        Err(_) => "conversation.txt".to_string(),
    }
}
