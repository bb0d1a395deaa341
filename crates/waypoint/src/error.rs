use url::ParseError;

/// Failure reported at the interactive session boundary.
///
/// Codes other than the two sentinels pass through verbatim from the platform's
/// web-authentication facility.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct SessionError {
    pub message: String,
    pub code: i64,
}

impl SessionError {
    /// The facility completed without a callback URL and without an error.
    pub const NO_RESULT: i64 = -1;
    /// The facility refused to start, e.g. because another session is already presented.
    pub const NOT_STARTED: i64 = -2;

    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self { message: message.into(), code }
    }

    pub fn no_result() -> Self {
        Self::new("No URL or error returned", Self::NO_RESULT)
    }

    pub fn not_started() -> Self {
        Self::new("Failed to start session", Self::NOT_STARTED)
    }

    /// Returns `true` if the session never got as far as presenting anything.
    pub fn is_not_started(&self) -> bool {
        self.code == Self::NOT_STARTED
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WaypointError {
    #[error("invalid endpoint URL `{url}`: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("callback state mismatch: expected `{expected}`, got {actual:?}")]
    StateMismatch { expected: String, actual: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown method `{0}`")]
pub struct UnknownMethodError(pub String);
