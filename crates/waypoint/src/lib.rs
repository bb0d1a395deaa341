//! # waypoint
//!
//! Redirect-based client for the Waypoint wallet and identity provider.
//!
//! Each operation is encoded as a provider URL, presented in an interactive web session, and
//! answered by the provider redirecting to the app's callback deep link:
//!
//! 1. a [`Request`] is flattened into query parameters and appended to the method's endpoint;
//! 2. the URL is presented through a [`WebAuthenticator`], at most one session at a time;
//! 3. the callback URL is returned and can be decoded with [`deep_link::parse`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod deep_link;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod query;
pub mod request;
pub mod session;

pub use client::WaypointClient;
pub use deep_link::Response;
pub use error::{SessionError, UnknownMethodError, WaypointError};
pub use host::{Host, PresentationAnchor};
pub use request::{Action, Method, Request, WireRequest};
pub use session::{
    ANCHOR_LOOKUP_TIMEOUT, AuthenticationRequest, InteractiveSession, SessionCompletion,
    WebAuthenticator,
};

pub use waypoint_config::{ClientConfig, ConfigOnce};
