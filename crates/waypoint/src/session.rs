//! Interactive web sessions.
//!
//! The platform facility is callback driven: it is started once and later invokes a completion
//! with a callback URL or an error. [`InteractiveSession::open`] turns that into a single
//! awaitable result over a oneshot channel.

use crate::{
    error::SessionError,
    host::{Host, PresentationAnchor},
};
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{runtime::Handle, sync::oneshot};
use url::Url;

/// How long the presentation anchor lookup may take before the neutral anchor is used.
pub const ANCHOR_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// A request to present a web-authentication session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationRequest {
    pub url: Url,
    /// Scheme of the redirect URI; navigating to it ends the session.
    pub callback_scheme: String,
    pub anchor: PresentationAnchor,
    /// Whether to isolate the session from the shared browser cookie store.
    pub prefers_ephemeral: bool,
}

/// The platform's web-authentication facility.
pub trait WebAuthenticator: Send + Sync {
    /// Presents a session for `request`.
    ///
    /// Returns `false` if the session could not be started. Otherwise `completion` is to be
    /// invoked once the session ends.
    fn start(&self, request: AuthenticationRequest, completion: SessionCompletion) -> bool;
}

impl<T: WebAuthenticator + ?Sized> WebAuthenticator for Arc<T> {
    fn start(&self, request: AuthenticationRequest, completion: SessionCompletion) -> bool {
        (**self).start(request, completion)
    }
}

type SessionResult = Result<Url, SessionError>;

/// Completion handle passed to a [`WebAuthenticator`].
///
/// Only the first completion is delivered. Dropping every clone without completing is the same
/// as completing with neither a URL nor an error.
#[derive(Clone, Debug)]
pub struct SessionCompletion {
    tx: Arc<Mutex<Option<oneshot::Sender<SessionResult>>>>,
}

impl SessionCompletion {
    fn new(tx: oneshot::Sender<SessionResult>) -> Self {
        Self { tx: Arc::new(Mutex::new(Some(tx))) }
    }

    /// Completes the session the way the platform reports it. An error takes precedence over a
    /// URL.
    pub fn complete(&self, callback: Option<Url>, error: Option<SessionError>) {
        let result = match (callback, error) {
            (_, Some(error)) => Err(error),
            (Some(url), None) => Ok(url),
            (None, None) => Err(SessionError::no_result()),
        };

        let Some(tx) = self.tx.lock().take() else {
            warn!(?result, "session already completed, ignoring");
            return;
        };
        if tx.send(result).is_err() {
            debug!("session result dropped, caller is gone");
        }
    }

    pub fn succeed(&self, callback: Url) {
        self.complete(Some(callback), None);
    }

    pub fn fail(&self, error: SessionError) {
        self.complete(None, Some(error));
    }

    /// Returns `true` once a result has been delivered.
    pub fn is_completed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

/// Presents web-authentication sessions, at most one at a time.
#[derive(Debug)]
pub struct InteractiveSession<A> {
    authenticator: A,
    active: AtomicBool,
    anchor_timeout: Option<Duration>,
}

impl<A: WebAuthenticator> InteractiveSession<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            active: AtomicBool::new(false),
            anchor_timeout: Some(ANCHOR_LOOKUP_TIMEOUT),
        }
    }

    /// Sets how long the presentation anchor lookup may take.
    pub fn with_anchor_timeout(mut self, timeout: Duration) -> Self {
        self.anchor_timeout = Some(timeout);
        self
    }

    /// Waits for the presentation anchor lookup without a bound.
    ///
    /// Needed when running on a Tokio runtime without timers.
    pub fn without_anchor_timeout(mut self) -> Self {
        self.anchor_timeout = None;
        self
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Returns `true` while a session is pending.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Presents `url` and waits for the session to end.
    ///
    /// Fails immediately with [`SessionError::not_started`] if another session is pending or the
    /// authenticator refuses to start.
    ///
    /// The anchor lookup is bounded by a Tokio timer when called from within a Tokio runtime.
    /// Outside of one, the lookup is awaited without a bound.
    ///
    /// # Panics
    ///
    /// Panics if called within a Tokio runtime built without timers while an anchor timeout is
    /// set. Use [`without_anchor_timeout`](Self::without_anchor_timeout) on such runtimes.
    pub async fn open<H: Host + ?Sized>(
        &self,
        url: Url,
        callback_scheme: &str,
        host: &H,
    ) -> Result<Url, SessionError> {
        let Some(_guard) = ActiveGuard::acquire(&self.active) else {
            debug!("another session is pending");
            return Err(SessionError::not_started());
        };

        let anchor = self.presentation_anchor(host).await;
        let (tx, rx) = oneshot::channel();
        let request = AuthenticationRequest {
            url,
            callback_scheme: callback_scheme.to_string(),
            anchor,
            // keep the provider's browser session alive between operations
            prefers_ephemeral: false,
        };

        if !self.authenticator.start(request, SessionCompletion::new(tx)) {
            return Err(SessionError::not_started());
        }
        debug!(%callback_scheme, "session started");

        rx.await.unwrap_or_else(|_| Err(SessionError::no_result()))
    }

    async fn presentation_anchor<H: Host + ?Sized>(&self, host: &H) -> PresentationAnchor {
        let lookup = host.presentation_anchor();
        let anchor = match self.anchor_timeout {
            Some(timeout) if Handle::try_current().is_ok() => {
                match tokio::time::timeout(timeout, lookup).await {
                    Ok(anchor) => anchor,
                    Err(_) => {
                        debug!(?timeout, "presentation anchor lookup timed out");
                        return PresentationAnchor::Detached;
                    }
                }
            }
            _ => lookup.await,
        };
        anchor.unwrap_or_else(|| {
            debug!("no presentation anchor, using a detached one");
            PresentationAnchor::Detached
        })
    }
}

/// Marks a session as pending until dropped.
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok()?;
        Some(Self(flag))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
