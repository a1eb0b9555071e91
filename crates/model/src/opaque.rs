use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A provider-specific message kept verbatim in the conversation history.
///
/// The types in this crate cannot describe everything a provider needs to
/// see again on the next turn. An assistant message that requested tool
/// calls is the usual example: the chat completions API rejects tool
/// results whose call ids are not present in the preceding assistant
/// message. Providers wrap their own message type in an `OpaqueMessage`
/// and unwrap it when building the next request.
///
/// Each message is tagged with the provider that produced it, so that a
/// provider can tell its own messages apart from foreign ones after a
/// handoff between agents backed by different providers. Two opaque
/// messages are equal when both the tag and the `id` match.
pub struct OpaqueMessage {
    provider: &'static str,
    inner: Arc<dyn Payload>,
}

impl OpaqueMessage {
    /// Wraps `value`, identified by `id` within the conversation.
    #[inline]
    pub fn new<ID, T>(provider: &'static str, id: ID, value: T) -> Self
    where
        ID: Into<String>,
        T: Send + Sync + 'static,
    {
        Self {
            provider,
            inner: Arc::new(Tagged {
                id: id.into(),
                value,
            }),
        }
    }

    /// Returns the tag of the provider that created this message.
    #[inline]
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the identifier of this message.
    #[inline]
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Borrows the wrapped value if it has type `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.value().downcast_ref()
    }
}

impl Clone for OpaqueMessage {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            provider: self.provider,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Debug for OpaqueMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueMessage")
            .field("provider", &self.provider)
            .field("id", &self.id())
            .finish()
    }
}

impl PartialEq for OpaqueMessage {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider && self.id() == other.id()
    }
}

impl Eq for OpaqueMessage {}

impl Hash for OpaqueMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        self.id().hash(state);
    }
}

trait Payload: Send + Sync {
    fn id(&self) -> &str;
    fn value(&self) -> &dyn Any;
}

struct Tagged<T> {
    id: String,
    value: T,
}

impl<T: Send + Sync + 'static> Payload for Tagged<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self) -> &dyn Any {
        &self.value
    }
}
