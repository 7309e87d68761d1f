//! Repository URL helpers.
//!
//! Hosts are the join key between manifest descriptors and applied
//! authentication entries, so everything here reduces a repository URL to
//! its hostname.

use crate::error::{Error, Result};
use url::Url;

/// Extract the hostname from a repository URL, keeping its original case.
///
/// `url` validates the input, but it lowercases hosts, so the host text is
/// taken from the original string when it names the same host. Scheme-less
/// URLs such as `git@github.com:org/repo.git` are not parseable as URLs and
/// yield an error.
///
/// # Examples
///
/// ```
/// use composer_env_auth::registry::host_of;
///
/// assert_eq!(host_of("https://github.com/acme/lib.git").unwrap(), "github.com");
/// assert_eq!(host_of("https://repo.example.com:8443/composer").unwrap(), "repo.example.com");
/// assert_eq!(host_of("https://GitHub.Example.com/x").unwrap(), "GitHub.Example.com");
/// assert!(host_of("not a url").is_err());
/// ```
pub fn host_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                message: "URL has no host".to_string(),
            })
        }
    };

    // Punycode or percent-decoded hosts differ from the raw text; keep the
    // normalized form for those.
    match raw_host(url) {
        Some(raw) if raw.eq_ignore_ascii_case(host) => Ok(raw.to_string()),
        _ => Ok(host.to_string()),
    }
}

/// The host as written in `url`: the authority after `://`, without
/// userinfo or port.
fn raw_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#' | '\\'))
        .next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    if host_port.starts_with('[') {
        // IPv6 literal, brackets included as `host_str` reports them
        let end = host_port.find(']')?;
        return Some(&host_port[..=end]);
    }
    host_port.split(':').next()
}

/// Check whether two URLs point at the same hostname.
///
/// Hostnames compare case-insensitively; ports and paths are ignored and
/// unparseable URLs never match.
pub fn same_host(a: &str, b: &str) -> bool {
    match (host_of(a), host_of(b)) {
        (Ok(a), Ok(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    }
}
