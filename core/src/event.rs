//! Host events and the `on<Event>` attribute convention.

use alloc::string::String;

use crate::NodeId;

/// Attribute prefix marking an event listener (`onClick`, `onInput`, ...).
pub const LISTENER_PREFIX: &str = "on";

/// An event raised by the host and delivered to [`Handler`](crate::Handler)s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: String,
    target: NodeId,
    detail: Option<String>,
}

impl Event {
    /// Creates an event of the given kind targeting `target`.
    #[must_use]
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            detail: None,
        }
    }

    /// Attaches a free-form payload, such as the current value of an input.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns the event kind (`click`, `input`, ...).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the node the event was dispatched on.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Returns the payload, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Maps an attribute key to the event it listens for.
///
/// Keys starting with `on` followed by at least one character are listeners; the event
/// name is the remainder, lowercased. Every other key is a plain attribute.
///
/// ```
/// use eddy_core::event::listener_event;
///
/// assert_eq!(listener_event("onClick").as_deref(), Some("click"));
/// assert_eq!(listener_event("id"), None);
/// ```
#[must_use]
pub fn listener_event(key: &str) -> Option<String> {
    key.strip_prefix(LISTENER_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_keys_are_recognized_by_prefix() {
        assert_eq!(listener_event("onClick").as_deref(), Some("click"));
        assert_eq!(listener_event("onmouseover").as_deref(), Some("mouseover"));
        assert_eq!(listener_event("on"), None, "bare prefix is a plain attribute");
        assert_eq!(listener_event("class"), None);
    }

    #[test]
    fn detail_is_optional() {
        let event = Event::new("input", NodeId::new(1));
        assert_eq!(event.detail(), None);
        let event = event.with_detail("abc");
        assert_eq!(event.detail(), Some("abc"));
        assert_eq!(event.target(), NodeId::new(1));
    }
}
