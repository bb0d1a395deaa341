//! Fakes of the host platform for testing the Waypoint client.

#![warn(unused_crate_dependencies, unreachable_pub)]

#[macro_use]
extern crate tracing;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use url::Url;
use waypoint::{
    AuthenticationRequest, ClientConfig, Host, PresentationAnchor, Response, SessionCompletion,
    SessionError, WebAuthenticator, deep_link, query,
};

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Config used across the test suites.
pub fn test_config() -> ClientConfig {
    ClientConfig::new(
        "https://id.skymavis.one",
        "47a4e1a9-2483-4233-9197-364ee5bd2935",
        "https://saigon-testnet.roninchain.com/rpc",
        2021,
    )
}

/// What a [`ScriptedAuthenticator`] does with each session it is asked to start.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Completes with this callback URL.
    Callback(Url),
    /// Completes with this error.
    Error(SessionError),
    /// Completes with neither a URL nor an error.
    Nothing,
    /// Refuses to start.
    Refuse,
    /// Starts and holds on to the completion, see [`ScriptedAuthenticator::take_pending`].
    Pending,
    /// Redirects to the request's `redirect` with this response, echoing the request's `state`.
    Approve(Response),
}

/// A [`WebAuthenticator`] following a fixed script.
#[derive(Debug)]
pub struct ScriptedAuthenticator {
    outcome: Mutex<Outcome>,
    requests: Mutex<Vec<AuthenticationRequest>>,
    pending: Mutex<Vec<SessionCompletion>>,
}

impl ScriptedAuthenticator {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock() = outcome;
    }

    /// Every request this authenticator was asked to start, in order.
    pub fn requests(&self) -> Vec<AuthenticationRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<AuthenticationRequest> {
        self.requests.lock().last().cloned()
    }

    /// Completions held back by [`Outcome::Pending`].
    pub fn take_pending(&self) -> Vec<SessionCompletion> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }
}

impl WebAuthenticator for ScriptedAuthenticator {
    fn start(&self, request: AuthenticationRequest, completion: SessionCompletion) -> bool {
        trace!(url = %request.url, "scripted session");
        let outcome = self.outcome.lock().clone();
        let approval = match &outcome {
            Outcome::Approve(response) => Some(approve(&request, response.clone())),
            _ => None,
        };
        self.requests.lock().push(request);

        match outcome {
            Outcome::Callback(url) => completion.succeed(url),
            Outcome::Error(err) => completion.fail(err),
            Outcome::Nothing => completion.complete(None, None),
            Outcome::Refuse => return false,
            Outcome::Pending => self.pending.lock().push(completion),
            Outcome::Approve(_) => completion.complete(approval.flatten(), None),
        }
        true
    }
}

fn approve(request: &AuthenticationRequest, mut response: Response) -> Option<Url> {
    let params = query::decode(request.url.query()?);
    response.state = params.get("state").cloned();
    let link = deep_link::callback_url(params.get("redirect")?, &response);
    Url::parse(&link).ok()
}

/// How a [`RecordingHost`] answers presentation anchor lookups.
#[derive(Clone, Copy, Debug)]
pub enum AnchorLookup {
    Some(PresentationAnchor),
    None,
    /// Never answers.
    Hang,
}

/// A [`Host`] recording the URLs it is asked to open.
#[derive(Debug)]
pub struct RecordingHost {
    anchor: AnchorLookup,
    can_open: AtomicBool,
    can_open_queries: AtomicUsize,
    opened: Mutex<Vec<Url>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    /// A host with a key window that can open any URL.
    pub fn new() -> Self {
        Self::with_anchor(AnchorLookup::Some(PresentationAnchor::Window(1)))
    }

    pub fn with_anchor(anchor: AnchorLookup) -> Self {
        Self {
            anchor,
            can_open: AtomicBool::new(true),
            can_open_queries: AtomicUsize::new(0),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn set_can_open(&self, can_open: bool) {
        self.can_open.store(can_open, Ordering::Relaxed);
    }

    /// URLs handed to [`Host::open_url`], in order.
    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().clone()
    }

    /// Number of [`Host::can_open_url`] calls.
    pub fn can_open_queries(&self) -> usize {
        self.can_open_queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn presentation_anchor(&self) -> Option<PresentationAnchor> {
        match self.anchor {
            AnchorLookup::Some(anchor) => Some(anchor),
            AnchorLookup::None => None,
            AnchorLookup::Hang => std::future::pending().await,
        }
    }

    async fn can_open_url(&self, _url: &Url) -> bool {
        self.can_open_queries.fetch_add(1, Ordering::Relaxed);
        self.can_open.load(Ordering::Relaxed)
    }

    fn open_url(&self, url: &Url) {
        self.opened.lock().push(url.clone());
    }
}
