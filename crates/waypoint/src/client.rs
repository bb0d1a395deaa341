//! The Waypoint client.

use crate::{
    deep_link, endpoint,
    error::WaypointError,
    host::Host,
    request::{Action, Request},
    session::{InteractiveSession, WebAuthenticator},
};
use tracing::Instrument;
use url::Url;
use waypoint_config::ClientConfig;

/// Client for the Waypoint provider.
///
/// Every operation presents the provider's page in an interactive web session and resolves with
/// the callback deep link the provider redirects to. Operations are independent; at most one can
/// be pending at a time.
#[derive(Debug)]
pub struct WaypointClient<A> {
    config: ClientConfig,
    session: InteractiveSession<A>,
}

impl<A: WebAuthenticator> WaypointClient<A> {
    pub fn new(config: ClientConfig, authenticator: A) -> Self {
        Self::with_session(config, InteractiveSession::new(authenticator))
    }

    /// Creates a client presenting its sessions through `session`.
    pub fn with_session(config: ClientConfig, session: InteractiveSession<A>) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &InteractiveSession<A> {
        &self.session
    }

    /// Returns the provider URL `request` is presented at.
    pub fn endpoint_url(&self, request: &Request) -> Result<Url, WaypointError> {
        endpoint::endpoint_url(&request.to_wire(&self.config), &self.config)
    }

    /// Runs `request` to completion and returns the callback URL.
    ///
    /// The callback is handed to the host if it can open it. The state it carries is not checked;
    /// see [`deep_link::parse_correlated`].
    ///
    /// # Panics
    ///
    /// See [`InteractiveSession::open`].
    pub async fn execute<H: Host + ?Sized>(
        &self,
        host: &H,
        request: &Request,
    ) -> Result<Url, WaypointError> {
        let span = debug_span!("waypoint", method = %request.method(), state = %request.state);
        self.run(host, request).instrument(span).await
    }

    async fn run<H: Host + ?Sized>(
        &self,
        host: &H,
        request: &Request,
    ) -> Result<Url, WaypointError> {
        let url = self.endpoint_url(request)?;
        debug!("url built");

        let scheme = deep_link::scheme(&request.redirect);
        let callback = match self.session.open(url, &scheme, host).await {
            Ok(callback) => callback,
            Err(err) if err.is_not_started() => {
                debug!("session not started");
                return Err(err.into());
            }
            Err(err) => {
                debug!(code = err.code, "session failed");
                return Err(err.into());
            }
        };
        debug!(%callback, "callback received");

        if host.can_open_url(&callback).await {
            host.open_url(&callback);
        } else {
            debug!(%callback, "host cannot open callback");
        }
        Ok(callback)
    }

    /// Asks the user to authorize this app, optionally for an OAuth2 `scope`.
    pub async fn authorize(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        scope: Option<&str>,
    ) -> String {
        let action = Action::Authorize { scope: scope.map(Into::into) };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Asks the wallet to `personal_sign` `message`, optionally expecting the `from` address.
    pub async fn personal_sign(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        message: &str,
        from: Option<&str>,
    ) -> String {
        let action = Action::PersonalSign { message: message.into(), from: from.map(Into::into) };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Asks the wallet to sign EIP-712 `typed_data`, given as JSON.
    pub async fn sign_typed_data(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        typed_data: &str,
        from: Option<&str>,
    ) -> String {
        let action =
            Action::SignTypedData { typed_data: typed_data.into(), from: from.map(Into::into) };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Asks the wallet to send a transaction to `to`.
    #[allow(clippy::too_many_arguments)]
    pub async fn send_transaction(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        to: &str,
        data: Option<&str>,
        value: Option<&str>,
        from: Option<&str>,
    ) -> String {
        let action = Action::SendTransaction {
            to: to.into(),
            data: data.map(Into::into),
            value: value.map(Into::into),
            from: from.map(Into::into),
        };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Asks the wallet to send `value` wei of the native token to `to`.
    pub async fn send_native_token(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        to: &str,
        value: &str,
        from: Option<&str>,
    ) -> String {
        let action = Action::SendNativeToken {
            to: to.into(),
            value: value.into(),
            from: from.map(Into::into),
        };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Authenticates as a guest with a credential issued by the provider.
    #[allow(clippy::too_many_arguments)]
    pub async fn auth_as_guest(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
        credential: &str,
        auth_date: &str,
        hash: &str,
        scope: &str,
    ) -> String {
        let action = Action::AuthAsGuest {
            credential: credential.into(),
            auth_date: auth_date.into(),
            hash: hash.into(),
            scope: scope.into(),
        };
        self.execute_lossy(host, Request::new(state, redirect, action)).await
    }

    /// Asks the provider to register a guest account.
    pub async fn register_guest_account(
        &self,
        host: &dyn Host,
        state: &str,
        redirect: &str,
    ) -> String {
        self.execute_lossy(host, Request::new(state, redirect, Action::RegisterGuestAccount)).await
    }

    /// Runs `request`, mapping any failure to an empty string.
    async fn execute_lossy(&self, host: &dyn Host, request: Request) -> String {
        match self.execute(host, &request).await {
            Ok(callback) => callback.to_string(),
            Err(WaypointError::Session(err)) => {
                error!(
                    method = %request.method(),
                    message = %err.message,
                    code = err.code,
                    "operation failed"
                );
                String::new()
            }
            Err(err) => {
                error!(method = %request.method(), %err, "operation failed");
                String::new()
            }
        }
    }
}
