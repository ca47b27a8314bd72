use std::time::Duration;
use tracing::debug;

/// Well-known local metadata address for the instance identifier.
const METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/instance-id";

pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Best-effort host identity lookup, used only to namespace the output tree.
/// Any failure leaves the bundle un-namespaced.
pub fn resolve(timeout: Duration) -> Option<String> {
    resolve_from(METADATA_URL, timeout)
}

pub fn resolve_from(url: &str, timeout: Duration) -> Option<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .ok()?;

    let response = match client.get(url).send() {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "instance metadata lookup failed");
            return None;
        }
    };

    if !response.status().is_success() {
        debug!(status = %response.status(), "instance metadata lookup refused");
        return None;
    }

    let body = response.text().ok()?;
    let id = body.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
