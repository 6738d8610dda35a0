//! Engine configuration.

use tracing::warn;

/// Environment variable overriding [`EngineConfig::placeholder_tag`].
pub const PLACEHOLDER_TAG_VAR: &str = "EDDY_PLACEHOLDER_TAG";
/// Environment variable overriding [`EngineConfig::anchor_tag`].
pub const ANCHOR_TAG_VAR: &str = "EDDY_ANCHOR_TAG";
/// Environment variable overriding [`EngineConfig::mailbox_capacity`].
pub const MAILBOX_CAPACITY_VAR: &str = "EDDY_MAILBOX_CAPACITY";
/// Environment variable overriding [`EngineConfig::warn_missing_keys`].
pub const WARN_MISSING_KEYS_VAR: &str = "EDDY_WARN_MISSING_KEYS";

/// Tunables of a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    placeholder_tag: String,
    anchor_tag: String,
    mailbox_capacity: usize,
    warn_missing_keys: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfigBuilder::new().build()
    }
}

impl EngineConfig {
    /// Starts a builder with the default values.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Reads overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides through `lookup`. Values that fail to parse are ignored with a warning.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = EngineConfigBuilder::new();
        if let Some(tag) = lookup(PLACEHOLDER_TAG_VAR) {
            builder = builder.placeholder_tag(tag);
        }
        if let Some(tag) = lookup(ANCHOR_TAG_VAR) {
            builder = builder.anchor_tag(tag);
        }
        if let Some(raw) = lookup(MAILBOX_CAPACITY_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => builder = builder.mailbox_capacity(capacity),
                Err(error) => warn!(%raw, %error, "ignoring {MAILBOX_CAPACITY_VAR}"),
            }
        }
        if let Some(raw) = lookup(WARN_MISSING_KEYS_VAR) {
            match parse_flag(&raw) {
                Some(flag) => builder = builder.warn_missing_keys(flag),
                None => warn!(%raw, "ignoring {WARN_MISSING_KEYS_VAR}"),
            }
        }
        builder.build()
    }

    /// Tag of the host element standing in for an async component before its first render.
    #[must_use]
    pub fn placeholder_tag(&self) -> &str {
        &self.placeholder_tag
    }

    /// Tag of the zero-width element marking the position of an empty list or failed subtree.
    #[must_use]
    pub fn anchor_tag(&self) -> &str {
        &self.anchor_tag
    }

    /// Number of requests an async component's mailbox holds before displacing the oldest.
    #[must_use]
    pub const fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }

    /// Whether unkeyed sequence items produce a warning.
    #[must_use]
    pub const fn warn_missing_keys(&self) -> bool {
        self.warn_missing_keys
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    placeholder_tag: String,
    anchor_tag: String,
    mailbox_capacity: usize,
    warn_missing_keys: bool,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfigBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placeholder_tag: String::from("div"),
            anchor_tag: String::from("empty"),
            mailbox_capacity: 16,
            warn_missing_keys: true,
        }
    }

    /// Sets the async placeholder tag.
    #[must_use]
    pub fn placeholder_tag(mut self, tag: impl Into<String>) -> Self {
        self.placeholder_tag = tag.into();
        self
    }

    /// Sets the anchor tag.
    #[must_use]
    pub fn anchor_tag(mut self, tag: impl Into<String>) -> Self {
        self.anchor_tag = tag.into();
        self
    }

    /// Sets the mailbox capacity. Values below one are raised to one.
    #[must_use]
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    /// Enables or disables the missing-key warning.
    #[must_use]
    pub const fn warn_missing_keys(mut self, warn: bool) -> Self {
        self.warn_missing_keys = warn;
        self
    }

    /// Finalises the configuration.
    #[must_use]
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            placeholder_tag: self.placeholder_tag,
            anchor_tag: self.anchor_tag,
            mailbox_capacity: self.mailbox_capacity,
            warn_missing_keys: self.warn_missing_keys,
        }
    }
}
