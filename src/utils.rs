use sha2::{Digest, Sha256};

const FINGERPRINT_LEN: usize = 12;

/// Short, stable identifier for a bearer token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let hash = hex::encode(hasher.finalize());
    hash[..FINGERPRINT_LEN].to_string()
}

pub fn is_absolute_url(endpoint: &str) -> bool {
    let lower = endpoint.get(..8).unwrap_or(endpoint).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Absolute endpoints pass through; relative ones are prefixed with `base`.
pub fn resolve_url(base: &str, endpoint: &str) -> String {
    if is_absolute_url(endpoint) {
        return endpoint.to_string();
    }

    let base = base.trim_end_matches('/');
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}
