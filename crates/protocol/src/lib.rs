//! Wire types exchanged between the page and the background worker.
//!
//! Every message is one JSON object per line. The `type` strings and field
//! names are what the existing front end listens for, so they stay verbatim.

use serde::{Deserialize, Serialize};

/// Commands sent by the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Replace the working set with `files` and stream them back in order.
    LoadFiles { files: Vec<String> },
    /// Search every cached index.
    #[serde(rename_all = "camelCase")]
    SearchFiles {
        #[serde(default)]
        search_term: String,
        #[serde(default)]
        search_filter: SearchFilter,
    },
    /// Any `type` we do not understand. Dropped without a response.
    #[serde(other)]
    Unknown,
}

/// Which message fields a search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    Author,
    Content,
    #[default]
    Both,
    /// A filter string outside the three above. Matches nothing.
    #[serde(other)]
    Unrecognized,
}

impl SearchFilter {
    pub fn includes_author(self) -> bool {
        matches!(self, SearchFilter::Author | SearchFilter::Both)
    }

    pub fn includes_content(self) -> bool {
        matches!(self, SearchFilter::Content | SearchFilter::Both)
    }
}

/// Notifications sent back to the page.
///
/// A load batch produces zero or more `FileLoaded`/`LoadError` events followed
/// by exactly one `AllFilesLoaded`. A search produces exactly one
/// `SearchComplete`. Events arrive in the order the commands were sent, and a
/// connection only receives events for its own commands.
///
/// `generation` is the load generation that was current when the originating
/// command was accepted. It grows by one with every `LOAD_FILES`, so within a
/// connection a consumer that has seen generation `n` can drop anything below
/// it as left over from a superseded batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    FileLoaded {
        generation: u64,
        file: String,
        content: String,
        is_first: bool,
    },
    LoadError {
        generation: u64,
        file: String,
        error: String,
    },
    AllFilesLoaded { generation: u64 },
    #[serde(rename_all = "camelCase")]
    SearchComplete {
        generation: u64,
        matching_message_ids: Vec<String>,
    },
}

impl Event {
    pub fn generation(&self) -> u64 {
        match self {
            Event::FileLoaded { generation, .. }
            | Event::LoadError { generation, .. }
            | Event::AllFilesLoaded { generation }
            | Event::SearchComplete { generation, .. } => *generation,
        }
    }

    /// Whether this event closes the stream of its command.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::AllFilesLoaded { .. } | Event::SearchComplete { .. }
        )
    }
}

pub fn decode_command(line: &str) -> serde_json::Result<Command> {
    serde_json::from_str(line)
}

pub fn encode_event(event: &Event) -> serde_json::Result<String> {
    serde_json::to_string(event)
}
