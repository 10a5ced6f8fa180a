//! NewTypes for values used by users when first interacting and authenticating with actinia.

use crate::errors::InvalidActiniaUrl;
use aliri_braid::braid;

/// An [ActiniaUrl] is the base URL of an actinia deployment, e.g.
/// `https://actinia.mundialis.de`
#[braid(validator, serde)]
pub struct ActiniaUrl(String);

impl aliri_braid::Validator for ActiniaUrl {
    type Error = InvalidActiniaUrl;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if !(s.starts_with("http://") || s.starts_with("https://")) {
            Err(InvalidActiniaUrl::Protocol(s.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Versioned API root, e.g. `https://actinia.mundialis.de/api/v3`.
/// Every endpoint of the client is relative to it.
#[braid(serde)]
pub struct ApiUrl;

impl ApiUrl {
    /// Join the base URL with the API version selector.
    ///
    /// `"latest"` and selectors starting with `"api/"` are used verbatim,
    /// anything else (e.g. `"v3"`) is put under `api/`.
    pub fn resolve(base: &ActiniaUrl, api_version: &str) -> Self {
        let base = base.as_str().trim_end_matches('/');
        if api_version == "latest" || api_version.starts_with("api/") {
            ApiUrl::new(format!("{}/{}", base, api_version))
        } else {
            ApiUrl::new(format!("{}/api/{}", base, api_version))
        }
    }
}
