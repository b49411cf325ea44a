//! GitHub access-token verifier.
//!
//! Resolves a bearer token to the account handle and its organization
//! memberships, then grants the matching `io.github.*` namespaces. Name
//! validation is fail-closed: one invalid name anywhere empties the whole
//! permission set rather than granting a partial one.

use std::sync::Arc;

use registry_permissions::Permission;

use crate::claims::{AuthMethod, VerifiedCredentials};
use crate::clients::GitHubLookup;
use crate::error::AuthResult;

/// Namespace prefix for GitHub-derived grants.
pub const GITHUB_NAMESPACE_PREFIX: &str = "io.github";

/// Check a GitHub login against `^[a-zA-Z0-9-]+$`.
pub(crate) fn valid_github_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Verifier for GitHub access tokens.
pub struct GitHubAtVerifier {
    lookup: Arc<dyn GitHubLookup>,
}

impl GitHubAtVerifier {
    /// Create a verifier over the given identity lookup.
    pub fn new(lookup: Arc<dyn GitHubLookup>) -> Self {
        Self { lookup }
    }

    /// Verify a GitHub access token.
    ///
    /// Emits one publish permission for the account's own namespace and
    /// one per organization membership, in that order. If any name fails
    /// validation the entire set is empty.
    pub async fn verify(&self, access_token: &str) -> AuthResult<VerifiedCredentials> {
        let login = self.lookup.authenticated_user(access_token).await?;
        let orgs = self.lookup.organizations(access_token).await?;

        let mut names = Vec::with_capacity(1 + orgs.len());
        names.push(login.clone());
        names.extend(orgs);

        let permissions = if names.iter().all(|name| valid_github_name(name)) {
            names
                .iter()
                .map(|name| {
                    Permission::publish(format!("{}.{}/*", GITHUB_NAMESPACE_PREFIX, name))
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(VerifiedCredentials::new(
            AuthMethod::GithubAt,
            login,
            permissions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::AuthError;

    struct StaticLookup {
        login: AuthResult<String>,
        orgs: AuthResult<Vec<String>>,
    }

    impl StaticLookup {
        fn ok(login: &str, orgs: &[&str]) -> Self {
            Self {
                login: Ok(login.to_string()),
                orgs: Ok(orgs.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl GitHubLookup for StaticLookup {
        async fn authenticated_user(&self, _token: &str) -> AuthResult<String> {
            match &self.login {
                Ok(login) => Ok(login.clone()),
                Err(_) => Err(AuthError::Upstream("GitHub user lookup failed".to_string())),
            }
        }

        async fn organizations(&self, _token: &str) -> AuthResult<Vec<String>> {
            match &self.orgs {
                Ok(orgs) => Ok(orgs.clone()),
                Err(_) => Err(AuthError::Upstream(
                    "GitHub organization lookup failed".to_string(),
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_user_and_org_namespaces() {
        let verifier = GitHubAtVerifier::new(Arc::new(StaticLookup::ok("alice", &["acme"])));
        let credentials = verifier.verify("token").await.unwrap();

        assert_eq!(credentials.auth_method, AuthMethod::GithubAt);
        assert_eq!(credentials.subject, "alice");
        assert_eq!(
            credentials.permissions,
            vec![
                Permission::publish("io.github.alice/*"),
                Permission::publish("io.github.acme/*"),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_orgs_grants_own_namespace_only() {
        let verifier = GitHubAtVerifier::new(Arc::new(StaticLookup::ok("alice", &[])));
        let credentials = verifier.verify("token").await.unwrap();
        assert_eq!(
            credentials.permissions,
            vec![Permission::publish("io.github.alice/*")]
        );
    }

    #[tokio::test]
    async fn test_invalid_org_name_empties_whole_set() {
        let verifier = GitHubAtVerifier::new(Arc::new(StaticLookup::ok("alice", &["bad org"])));
        let credentials = verifier.verify("token").await.unwrap();

        assert_eq!(credentials.subject, "alice");
        assert!(credentials.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_login_empties_whole_set() {
        let verifier = GitHubAtVerifier::new(Arc::new(StaticLookup::ok("al ice", &["acme"])));
        let credentials = verifier.verify("token").await.unwrap();
        assert!(credentials.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failures_propagate() {
        let user_failure = StaticLookup {
            login: Err(AuthError::Upstream(String::new())),
            orgs: Ok(vec![]),
        };
        let verifier = GitHubAtVerifier::new(Arc::new(user_failure));
        assert!(matches!(
            verifier.verify("token").await,
            Err(AuthError::Upstream(_))
        ));

        let org_failure = StaticLookup {
            login: Ok("alice".to_string()),
            orgs: Err(AuthError::Upstream(String::new())),
        };
        let verifier = GitHubAtVerifier::new(Arc::new(org_failure));
        assert!(matches!(
            verifier.verify("token").await,
            Err(AuthError::Upstream(_))
        ));
    }

    #[test]
    fn test_name_validation() {
        assert!(valid_github_name("alice"));
        assert!(valid_github_name("acme-corp"));
        assert!(valid_github_name("a1"));
        assert!(!valid_github_name(""));
        assert!(!valid_github_name("bad org"));
        assert!(!valid_github_name("dot.name"));
        assert!(!valid_github_name("slash/name"));
    }
}
