//! Tenant base-URL resolution.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{Error, Result};

/// Host template for tenant endpoints; `{}` is replaced by the subdomain.
pub const BASE_URL_FORMAT: &str = "https://{}.example-service.com/api/v2";

static SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-z0-9][a-z0-9-]+[a-z0-9]$").expect("subdomain pattern is valid")
});

/// Checks a subdomain against the tenant naming rule: lowercase
/// alphanumerics with optional inner hyphens, at least three characters.
pub fn validate_subdomain(subdomain: &str) -> Result<()> {
    if SUBDOMAIN_RE.is_match(subdomain) {
        Ok(())
    } else {
        Err(Error::InvalidSubdomain(subdomain.to_string()))
    }
}

/// Builds the tenant base URL for a validated subdomain.
pub fn subdomain_url(subdomain: &str) -> Result<Url> {
    validate_subdomain(subdomain)?;
    let raw = BASE_URL_FORMAT.replace("{}", subdomain);
    Ok(Url::parse(&raw)?)
}

/// Parses an arbitrary endpoint URL, skipping subdomain validation.
pub fn parse_endpoint_url(raw: &str) -> Result<Url> {
    Ok(Url::parse(raw)?)
}

/// Joins a base URL and a request path without doubling the slash.
pub(crate) fn join(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}
