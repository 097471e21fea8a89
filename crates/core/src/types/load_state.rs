//! Loading lifecycle shared by every asynchronously populated resource.

use serde::Serialize;

/// State of a resource that is loaded in the background.
///
/// Transitions: `Loading -> Ready | Failed`, `Failed -> Ready` on a later
/// successful load. A `Ready` resource stays `Ready` when a reload fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> LoadState<T> {
    /// The loaded value, if any.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The failure message, if the load failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }

    /// Record a failure without discarding a previously loaded value.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_ready() {
            *self = Self::Failed(message.into());
        }
    }

    /// Lowercase status label (`loading`, `ready` or `failed`).
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}
