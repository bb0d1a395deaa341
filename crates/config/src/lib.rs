//! # waypoint-config
//!
//! Client configuration for the Waypoint redirect client.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use eyre::WrapErr;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

pub mod error;
pub use error::ExtractConfigError;

// reexport so hosts can merge their own providers
pub use figment;

/// Configuration of a single Waypoint client.
///
/// A config is immutable once a client has been built from it.
///
/// # Defaults
///
/// The default config targets the Ronin Saigon testnet through the public Waypoint origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the provider, e.g. `https://waypoint.roninchain.com`.
    ///
    /// Endpoint paths are appended verbatim, so this should not end with a `/`.
    pub origin: String,
    /// Client identifier registered with the provider.
    pub client_id: String,
    /// Target chain id, sent as a decimal string with every request.
    pub chain_id: u64,
    /// JSON-RPC endpoint of the target chain.
    pub chain_rpc: String,
}

impl ClientConfig {
    /// The default config file name, resolved relative to the working directory or root.
    pub const FILE_NAME: &'static str = "waypoint.toml";

    /// Environment variable that overrides the path of the config file.
    pub const FILE_ENV: &'static str = "WAYPOINT_CONFIG";

    /// Prefix of the environment variables merged into the config.
    pub const ENV_PREFIX: &'static str = "WAYPOINT_";

    /// Default provider origin.
    pub const DEFAULT_ORIGIN: &'static str = "https://waypoint.roninchain.com";

    /// Saigon testnet.
    pub const DEFAULT_CHAIN_ID: u64 = 2021;

    /// Saigon testnet RPC.
    pub const DEFAULT_CHAIN_RPC: &'static str = "https://saigon-testnet.roninchain.com/rpc";

    /// Creates a new config from its parts.
    pub fn new(
        origin: impl Into<String>,
        client_id: impl Into<String>,
        chain_rpc: impl Into<String>,
        chain_id: u64,
    ) -> Self {
        Self {
            origin: origin.into(),
            client_id: client_id.into(),
            chain_id,
            chain_rpc: chain_rpc.into(),
        }
    }

    /// Returns the current `ClientConfig`.
    ///
    /// See [`figment`](Self::figment) for the sources that are merged.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Returns the `ClientConfig` for the project at `root`.
    ///
    /// The config file is looked up as `root/waypoint.toml` unless `WAYPOINT_CONFIG` is set.
    pub fn load_with_root(root: impl AsRef<Path>) -> eyre::Result<Self> {
        let root = root.as_ref();
        Self::try_from(Self::figment_with_root(root))
            .wrap_err_with(|| format!("failed to load waypoint config from {}", root.display()))
    }

    /// Attempts to extract a `ClientConfig` from `provider`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use waypoint_config::{
    ///     ClientConfig,
    ///     figment::providers::{Format, Toml},
    /// };
    ///
    /// let figment = ClientConfig::figment().merge(Toml::file("other.toml"));
    /// let config = ClientConfig::try_from(figment);
    /// ```
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        trace!("load config with provider: {:?}", provider.metadata());
        Figment::from(provider).extract::<Self>().map_err(ExtractConfigError::new)
    }

    /// Returns the default figment.
    ///
    /// Sources, lowest to highest precedence:
    ///
    /// 1. [`ClientConfig::default`]
    /// 2. `waypoint.toml` in the working directory, or the file named by `WAYPOINT_CONFIG`
    /// 3. `WAYPOINT_*` environment variables, e.g. `WAYPOINT_CLIENT_ID`
    pub fn figment() -> Figment {
        Self::figment_with_root(".")
    }

    /// Returns the default figment with the config file resolved against `root`.
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        let file = Env::var(Self::FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| root.as_ref().join(Self::FILE_NAME));

        Figment::from(Self::default())
            .merge(Toml::file(file))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG"]))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: Self::DEFAULT_ORIGIN.to_string(),
            client_id: String::new(),
            chain_id: Self::DEFAULT_CHAIN_ID,
            chain_rpc: Self::DEFAULT_CHAIN_RPC.to_string(),
        }
    }
}

impl Provider for ClientConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Waypoint Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (client {}, chain {})", self.origin, self.client_id, self.chain_id)
    }
}

/// A configure-once slot for a [`ClientConfig`].
///
/// The first call to [`configure`](Self::configure) wins, later calls leave the stored config
/// untouched and are not an error.
#[derive(Debug, Default)]
pub struct ConfigOnce {
    inner: OnceLock<ClientConfig>,
}

impl ConfigOnce {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self { inner: OnceLock::new() }
    }

    /// Stores `config` unless a config is already present.
    ///
    /// Returns the effective config, which is the previously stored one on reconfiguration.
    pub fn configure(&self, config: ClientConfig) -> &ClientConfig {
        let mut stored = false;
        let current = self.inner.get_or_init(|| {
            stored = true;
            config
        });
        if stored {
            debug!(%current, "configured waypoint client");
        } else {
            debug!(%current, "waypoint client already configured, ignoring");
        }
        current
    }

    /// Returns the stored config, if any.
    pub fn get(&self) -> Option<&ClientConfig> {
        self.inner.get()
    }

    /// Returns `true` once a config has been stored.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}
