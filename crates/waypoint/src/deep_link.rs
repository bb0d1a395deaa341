//! Callback deep links.

use crate::{error::WaypointError, query};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Value of the `type` parameter on a successful callback.
pub const SUCCESS: &str = "success";

/// Value of the `type` parameter written by [`callback_url`] for unsuccessful responses.
pub const FAIL: &str = "fail";

/// Result of an operation, as carried by the callback deep link.
///
/// Every field but `success` may be missing from an error or malformed callback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub method: Option<String>,
    pub data: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
}

impl Response {
    /// Returns `true` if this response carries `state`.
    pub fn is_correlated(&self, state: &str) -> bool {
        self.state.as_deref() == Some(state)
    }
}

/// Decodes a callback deep link.
///
/// Never fails: input that is not a URL, or has no query, yields `Response::default()`.
pub fn parse(link: &str) -> Response {
    let Ok(url) = Url::parse(link) else {
        return Response::default();
    };
    let Some(query) = url.query() else {
        return Response::default();
    };

    let mut params = query::decode(query);
    Response {
        success: params.get("type").is_some_and(|ty| ty == SUCCESS),
        method: params.remove("method"),
        data: params.remove("data"),
        address: params.remove("address"),
        state: params.remove("state"),
    }
}

/// Decodes a callback deep link and checks it answers the request made with `expected_state`.
pub fn parse_correlated(link: &str, expected_state: &str) -> Result<Response, WaypointError> {
    let response = parse(link);
    if !response.is_correlated(expected_state) {
        return Err(WaypointError::StateMismatch {
            expected: expected_state.to_string(),
            actual: response.state,
        });
    }
    Ok(response)
}

/// Encodes `response` as a callback link on `base`, the inverse of [`parse`].
pub fn callback_url(base: &str, response: &Response) -> String {
    let fields = [
        ("type", Some(if response.success { SUCCESS } else { FAIL })),
        ("method", response.method.as_deref()),
        ("data", response.data.as_deref()),
        ("address", response.address.as_deref()),
        ("state", response.state.as_deref()),
    ];
    let query = query::encode(fields.into_iter().filter_map(|(k, v)| Some((k, v?))));
    format!("{base}?{query}")
}

/// Returns the URI scheme of `link`, or an empty string if it is not a URL.
pub fn scheme(link: &str) -> String {
    Url::parse(link).map(|url| url.scheme().to_string()).unwrap_or_default()
}

/// Generates a fresh correlation state: a lowercase UUID v4.
pub fn generate_state() -> String {
    Uuid::new_v4().to_string()
}
