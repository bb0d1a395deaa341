//! Provider endpoint resolution.

use crate::{
    error::WaypointError,
    query,
    request::{Method, WireRequest},
};
use url::Url;
use waypoint_config::ClientConfig;

/// Returns the endpoint of `method`: the configured origin followed by the method's path.
pub fn resolve(method: Method, config: &ClientConfig) -> String {
    format!("{}{}", config.origin, method.path(&config.client_id))
}

/// Like [`resolve`], for a method given by name.
///
/// Unrecognized names resolve to the bare origin.
pub fn resolve_name(name: &str, config: &ClientConfig) -> String {
    match name.parse::<Method>() {
        Ok(method) => resolve(method, config),
        Err(_) => config.origin.clone(),
    }
}

/// Builds the full provider URL for `request`, with its parameters as the query.
pub fn endpoint_url(request: &WireRequest, config: &ClientConfig) -> Result<Url, WaypointError> {
    let endpoint = resolve(request.method, config);
    let mut url = Url::parse(&endpoint)
        .map_err(|source| WaypointError::InvalidEndpoint { url: endpoint, source })?;

    let query = query::encode(request.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    url.set_query(Some(&query));
    trace!(%url, "built endpoint URL");
    Ok(url)
}
