//! Conversation-related types.

use azure_agents_model::ModelMessage;

/// The party that produced a conversation item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranscriptSource {
    /// Input typed by the user.
    User,
    /// Text produced by the model.
    Assistant,
    /// Output of a tool or a handoff.
    Tool,
}

/// Represents a conversation.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    pub(crate) items: Vec<Item>,
}

impl Conversation {
    /// Returns the items in this conversation, oldest first.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[inline]
    pub(crate) fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn messages(&self) -> impl Iterator<Item = ModelMessage> + '_ {
        self.items.iter().map(|item| item.msg.clone())
    }
}

/// An item in the conversation.
#[derive(Clone, Debug)]
pub struct Item {
    pub(crate) msg: ModelMessage,
    pub(crate) transcript: String,
    pub(crate) source: TranscriptSource,
    pub(crate) agent: String,
}

impl Item {
    #[inline]
    pub(crate) fn user(input: &str, agent: &str) -> Self {
        Self {
            msg: ModelMessage::User(input.to_owned()),
            transcript: input.to_owned(),
            source: TranscriptSource::User,
            agent: agent.to_owned(),
        }
    }

    /// Returns the transcript of this item.
    ///
    /// The transcript is a string representation of the message item,
    /// which can be exported later. But transcript alone is not enough
    /// to reconstruct the message item.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Returns who produced this item.
    #[inline]
    pub fn source(&self) -> TranscriptSource {
        self.source
    }

    /// Returns the name of the agent that was active when this item was
    /// added.
    #[inline]
    pub fn agent(&self) -> &str {
        &self.agent
    }
}
