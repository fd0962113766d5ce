//! Turns configured website strings into probe targets

use std::fmt;

const HTTPS_PORT: u16 = 443;
const FALLBACK_PORT: u16 = 80;

/// A resolved probe target. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub hostname: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// The input did not yield a usable hostname or port
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot resolve endpoint {url:?}: {reason}")]
pub struct MalformedEndpoint {
    pub url: String,
    pub reason: String,
}

/// Resolve a website entry into hostname and port.
///
/// Entries with a scheme are parsed as URLs; the port is the explicit one,
/// else 443 for `https`, else 80. Entries without a scheme are taken as a
/// bare `host[:port]` token with port 80 by default, so a value such as
/// `invalid-url` still resolves and fails later at the network layer.
pub fn resolve(raw: &str) -> Result<Endpoint, MalformedEndpoint> {
    let trimmed = raw.trim();
    let malformed = |reason: String| MalformedEndpoint {
        url: raw.to_string(),
        reason,
    };

    let (hostname, port) = if trimmed.contains("://") {
        let parsed = url::Url::parse(trimmed).map_err(|e| malformed(e.to_string()))?;
        let host = parsed
            .host_str()
            .map(strip_brackets)
            .unwrap_or_default()
            .to_string();
        let port = match parsed.port() {
            Some(port) => port,
            None if parsed.scheme() == "https" => HTTPS_PORT,
            None => FALLBACK_PORT,
        };
        (host, port)
    } else {
        let token = trimmed
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        match token.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') || host.ends_with(']') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| malformed(format!("invalid port {:?}", port)))?;
                (strip_brackets(host).to_string(), port)
            }
            _ => (strip_brackets(token).to_string(), FALLBACK_PORT),
        }
    };

    if hostname.is_empty() {
        return Err(malformed("no hostname".to_string()));
    }
    if port == 0 {
        return Err(malformed("port 0 is not connectable".to_string()));
    }

    Ok(Endpoint {
        url: raw.to_string(),
        hostname,
        port,
    })
}

fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}
