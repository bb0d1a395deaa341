//! Typed requests and their flat wire form.

use crate::error::UnknownMethodError;
use std::{collections::BTreeMap, fmt, str::FromStr};
use waypoint_config::ClientConfig;

/// Query parameter names understood by the provider.
pub mod params {
    pub const STATE: &str = "state";
    pub const SCOPE: &str = "scope";
    pub const REDIRECT: &str = "redirect";
    pub const CLIENT_ID: &str = "clientId";
    pub const CHAIN_ID: &str = "chainId";
    pub const TO: &str = "to";
    pub const DATA: &str = "data";
    pub const VALUE: &str = "value";
    pub const TYPED_DATA: &str = "typedData";
    pub const MESSAGE: &str = "message";
    pub const EXPECT_ADDRESS: &str = "expectAddress";
    pub const CREDENTIAL: &str = "credential";
    pub const AUTH_DATE: &str = "authDate";
    pub const HASH: &str = "hash";
}

/// Provider endpoint family a request is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Authorize,
    Register,
    Send,
    Sign,
    Call,
    Guests,
}

impl Method {
    pub const ALL: [Self; 6] =
        [Self::Authorize, Self::Register, Self::Send, Self::Sign, Self::Call, Self::Guests];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Register => "register",
            Self::Send => "send",
            Self::Sign => "sign",
            Self::Call => "call",
            Self::Guests => "guests",
        }
    }

    /// Path of this method's endpoint, relative to the provider origin.
    pub fn path(&self, client_id: &str) -> String {
        match self {
            Self::Authorize => format!("/client/{client_id}/authorize"),
            Self::Send => "/wallet/send".to_string(),
            Self::Sign => "/wallet/sign".to_string(),
            Self::Call => "/wallet/call".to_string(),
            Self::Guests => "/seamless/guests/start".to_string(),
            Self::Register => "/guests/register".to_string(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownMethodError(s.to_string()))
    }
}

/// Operation-specific part of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Authorize the app, optionally for an OAuth2 `scope`.
    Authorize { scope: Option<String> },
    /// `personal_sign` a plain message.
    PersonalSign { message: String, from: Option<String> },
    /// Sign EIP-712 typed data, given as JSON.
    SignTypedData { typed_data: String, from: Option<String> },
    /// Send a transaction, `value` in wei.
    SendTransaction {
        to: String,
        data: Option<String>,
        value: Option<String>,
        from: Option<String>,
    },
    /// Send `value` wei of the native token.
    SendNativeToken { to: String, value: String, from: Option<String> },
    /// Authenticate as a guest.
    AuthAsGuest { credential: String, auth_date: String, hash: String, scope: String },
    /// Register a guest account.
    RegisterGuestAccount,
}

impl Action {
    pub const fn method(&self) -> Method {
        match self {
            Self::Authorize { .. } => Method::Authorize,
            Self::PersonalSign { .. } | Self::SignTypedData { .. } => Method::Sign,
            Self::SendTransaction { .. } | Self::SendNativeToken { .. } => Method::Send,
            Self::AuthAsGuest { .. } => Method::Guests,
            Self::RegisterGuestAccount => Method::Register,
        }
    }

    /// The action's query parameters. Absent optional fields are `None`.
    pub fn params(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            Self::Authorize { scope } => vec![(params::SCOPE, scope.as_deref())],
            Self::PersonalSign { message, from } => vec![
                (params::MESSAGE, Some(message.as_str())),
                (params::EXPECT_ADDRESS, from.as_deref()),
            ],
            Self::SignTypedData { typed_data, from } => vec![
                (params::TYPED_DATA, Some(typed_data.as_str())),
                (params::EXPECT_ADDRESS, from.as_deref()),
            ],
            Self::SendTransaction { to, data, value, from } => vec![
                (params::TO, Some(to.as_str())),
                (params::DATA, data.as_deref()),
                (params::VALUE, value.as_deref()),
                (params::EXPECT_ADDRESS, from.as_deref()),
            ],
            Self::SendNativeToken { to, value, from } => vec![
                (params::TO, Some(to.as_str())),
                (params::VALUE, Some(value.as_str())),
                (params::EXPECT_ADDRESS, from.as_deref()),
            ],
            Self::AuthAsGuest { credential, auth_date, hash, scope } => vec![
                (params::CREDENTIAL, Some(credential.as_str())),
                (params::AUTH_DATE, Some(auth_date.as_str())),
                (params::HASH, Some(hash.as_str())),
                (params::SCOPE, Some(scope.as_str())),
            ],
            Self::RegisterGuestAccount => Vec::new(),
        }
    }
}

/// One protocol operation: the correlation envelope plus its action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Caller-generated correlation state, echoed back in the callback.
    pub state: String,
    /// Redirect URI registered with the provider.
    pub redirect: String,
    pub action: Action,
}

impl Request {
    pub fn new(state: impl Into<String>, redirect: impl Into<String>, action: Action) -> Self {
        Self { state: state.into(), redirect: redirect.into(), action }
    }

    pub const fn method(&self) -> Method {
        self.action.method()
    }

    /// Flattens this request into its wire form for `config`.
    pub fn to_wire(&self, config: &ClientConfig) -> WireRequest {
        WireRequest {
            method: self.method(),
            params: build_params(config, &self.state, &self.redirect, self.action.params()),
        }
    }
}

/// A request as sent to the provider: a method and a flat set of string parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    pub params: BTreeMap<String, String>,
}

/// Assembles the parameter set of a request.
///
/// The envelope (`state`, `redirect`, `clientId`, `chainId`) is always present. `extra` is merged
/// on top of it: entries whose value is `None` are dropped, everything else overwrites.
pub fn build_params<'a>(
    config: &ClientConfig,
    state: &str,
    redirect: &str,
    extra: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::from([
        (params::STATE.to_string(), state.to_string()),
        (params::REDIRECT.to_string(), redirect.to_string()),
        (params::CLIENT_ID.to_string(), config.client_id.clone()),
        (params::CHAIN_ID.to_string(), config.chain_id.to_string()),
    ]);
    for (key, value) in extra {
        if let Some(value) = value {
            params.insert(key.to_string(), value.to_string());
        }
    }
    params
}
