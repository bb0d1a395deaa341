//! The host application's side of a session.

use async_trait::async_trait;
use url::Url;

/// Opaque handle to the surface a web session is presented from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresentationAnchor {
    /// A host window, identified by its raw platform handle.
    Window(u64),
    /// No particular window; the platform picks a neutral one.
    #[default]
    Detached,
}

impl PresentationAnchor {
    /// The neutral anchor, used when the host has no key window.
    pub const fn detached() -> Self {
        Self::Detached
    }
}

/// The host application, as seen by the client.
///
/// Implementations are expected to hop to the UI-owning thread where the platform requires it.
#[async_trait]
pub trait Host: Send + Sync {
    /// Returns the key window to present sessions from, if there is one.
    async fn presentation_anchor(&self) -> Option<PresentationAnchor>;

    /// Returns `true` if the host platform knows how to open `url`.
    async fn can_open_url(&self, url: &Url) -> bool;

    /// Hands `url` to the host platform. Fire and forget.
    fn open_url(&self, url: &Url);
}
