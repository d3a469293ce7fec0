//! Configuration for hosting platform connections.
use secrecy::SecretString;

use crate::error::{ReleaseError, Result};

/// Default GitHub REST API base url.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Page size used when listing pull requests.
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Username paired with the token for authenticated git pushes.
pub const TOKEN_AUTH_USER: &str = "x-access-token";

/// Remote repository connection configuration for authenticating and
/// interacting with the hosting platform.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// REST API base url (e.g. "https://api.github.com").
    pub api_url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Log mutating calls instead of performing them.
    pub dry_run: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
            dry_run: false,
        }
    }
}

impl RemoteConfig {
    /// Build a remote config from an "owner/repo" identifier.
    ///
    /// A missing token is reported here, the first time the client is
    /// needed.
    pub fn from_repository(
        repository: &str,
        token: Option<&str>,
        api_url: &str,
        dry_run: bool,
    ) -> Result<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| {
                ReleaseError::InvalidArgs(format!(
                    "repository must be in the form owner/repo: {repository}"
                ))
            })?;

        let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ReleaseError::missing_credential(
                "must set github token (GITHUB_TOKEN)",
            )
        })?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: SecretString::from(token.to_string()),
            dry_run,
        })
    }

    /// "owner/repo" form of the repository.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.api_url, DEFAULT_API_URL);
        assert!(!remote.dry_run);
    }

    #[test]
    fn parses_owner_and_repo() {
        let remote = RemoteConfig::from_repository(
            "acme/widgets",
            Some("secret"),
            "https://api.github.com/",
            false,
        )
        .unwrap();

        assert_eq!(remote.owner, "acme");
        assert_eq!(remote.repo, "widgets");
        assert_eq!(remote.api_url, "https://api.github.com");
        assert_eq!(remote.full_name(), "acme/widgets");
        assert_eq!(remote.token.expose_secret(), "secret");
    }

    #[test]
    fn rejects_malformed_repository() {
        for bad in ["widgets", "/widgets", "acme/", "acme/widgets/extra"] {
            let result =
                RemoteConfig::from_repository(bad, Some("t"), DEFAULT_API_URL, false);
            assert!(
                matches!(result, Err(ReleaseError::InvalidArgs(_))),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn missing_token_is_a_credential_error() {
        let result = RemoteConfig::from_repository(
            "acme/widgets",
            None,
            DEFAULT_API_URL,
            false,
        );
        assert!(matches!(result, Err(ReleaseError::MissingCredential(_))));

        let result = RemoteConfig::from_repository(
            "acme/widgets",
            Some(""),
            DEFAULT_API_URL,
            false,
        );
        assert!(matches!(result, Err(ReleaseError::MissingCredential(_))));
    }
}
