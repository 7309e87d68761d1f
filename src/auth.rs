//! Authentication schemes and the entries written to Composer's auth config.
//!
//! The scheme for a token is chosen purely from the repository hostname;
//! no request is made to the server.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fmt;

/// Username used when a generic token is encoded as HTTP basic auth.
pub const TOKEN_USERNAME: &str = "token";

/// Authentication encoding style, named after its `auth.json` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    /// `http-basic.<host> = {username, password}`
    HttpBasic,
    /// `github-oauth.<host> = token`
    GithubOauth,
    /// `gitlab-token.<host> = token`
    GitlabToken,
}

impl Scheme {
    /// The `auth.json` section key for this scheme.
    pub fn config_key(self) -> &'static str {
        match self {
            Scheme::HttpBasic => "http-basic",
            Scheme::GithubOauth => "github-oauth",
            Scheme::GitlabToken => "gitlab-token",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Choose the token scheme for a host.
///
/// Matching is a case-sensitive substring test, so
/// `github.enterprise.internal` counts as GitHub. GitHub is checked first.
///
/// # Examples
///
/// ```
/// use composer_env_auth::{classify_host, Scheme};
///
/// assert_eq!(classify_host("github.com"), Scheme::GithubOauth);
/// assert_eq!(classify_host("gitlab.acme.io"), Scheme::GitlabToken);
/// assert_eq!(classify_host("repo.example.com"), Scheme::HttpBasic);
/// ```
pub fn classify_host(host: &str) -> Scheme {
    if host == "github.com" || host.contains("github") {
        Scheme::GithubOauth
    } else if host == "gitlab.com" || host.contains("gitlab") {
        Scheme::GitlabToken
    } else {
        Scheme::HttpBasic
    }
}

/// Secret material for one host.
///
/// `Debug` redacts secrets. `PartialEq` is intentionally not implemented.
#[derive(Clone)]
pub enum Credential {
    /// Username and password.
    Basic { username: String, password: String },
    /// A single token.
    Token(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Credential::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
        }
    }
}

impl Credential {
    /// Get the token if this is token-based auth.
    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::Token(token) => Some(token),
            Credential::Basic { .. } => None,
        }
    }

    /// Get username and password if this is basic auth.
    pub fn username_password(&self) -> Option<(&str, &str)> {
        match self {
            Credential::Basic { username, password } => Some((username, password)),
            Credential::Token(_) => None,
        }
    }
}

/// How token entries for GitHub and GitLab hosts are written to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// Every token is written as `http-basic` with username `token`.
    #[default]
    Basic,
    /// GitHub and GitLab tokens go to `github-oauth` and `gitlab-token`.
    SchemeSpecific,
}

/// A resolved credential bound to a host.
#[derive(Debug, Clone)]
pub struct AuthenticationEntry {
    pub host: String,
    pub scheme: Scheme,
    pub credential: Credential,
}

impl AuthenticationEntry {
    /// Build the entry for a token, choosing the scheme from the host.
    ///
    /// Generic hosts get basic auth with username `token`.
    pub fn from_token(host: &str, token: String) -> Self {
        let scheme = classify_host(host);
        let credential = match scheme {
            Scheme::HttpBasic => Credential::Basic {
                username: TOKEN_USERNAME.to_string(),
                password: token,
            },
            Scheme::GithubOauth | Scheme::GitlabToken => Credential::Token(token),
        };
        AuthenticationEntry {
            host: host.to_string(),
            scheme,
            credential,
        }
    }

    /// Build a basic-auth entry.
    pub fn basic(host: &str, username: String, password: String) -> Self {
        AuthenticationEntry {
            host: host.to_string(),
            scheme: Scheme::HttpBasic,
            credential: Credential::Basic { username, password },
        }
    }

    /// The scheme and credential actually written for the given mode.
    pub fn normalized(&self, mode: TokenMode) -> (Scheme, Credential) {
        match (&self.credential, mode) {
            (Credential::Token(token), TokenMode::Basic) => (
                Scheme::HttpBasic,
                Credential::Basic {
                    username: TOKEN_USERNAME.to_string(),
                    password: token.clone(),
                },
            ),
            _ => (self.scheme, self.credential.clone()),
        }
    }
}

/// A single HTTP header carrying credentials.
///
/// `Debug` redacts the value.
#[derive(Clone)]
pub struct AuthHeader {
    pub name: &'static str,
    pub value: String,
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl AuthHeader {
    /// Header for a token, chosen from the host.
    ///
    /// - GitHub: `Authorization: token <value>`
    /// - GitLab: `PRIVATE-TOKEN: <value>`
    /// - otherwise: `Authorization: Bearer <value>`
    pub fn for_token(host: &str, token: &str) -> Self {
        match classify_host(host) {
            Scheme::GithubOauth => AuthHeader {
                name: "Authorization",
                value: format!("token {}", token),
            },
            Scheme::GitlabToken => AuthHeader {
                name: "PRIVATE-TOKEN",
                value: token.to_string(),
            },
            Scheme::HttpBasic => AuthHeader {
                name: "Authorization",
                value: format!("Bearer {}", token),
            },
        }
    }

    /// `Authorization: Basic base64(username:password)`.
    pub fn basic(username: &str, password: &str) -> Self {
        let auth = format!("{}:{}", username, password);
        AuthHeader {
            name: "Authorization",
            value: format!("Basic {}", BASE64.encode(auth.as_bytes())),
        }
    }

    /// Render as a `Name: value` header line.
    pub fn to_header_line(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}
