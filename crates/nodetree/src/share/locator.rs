// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use url::Url;

/// Credentials embedded in share locators
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ShareCredentials {
    pub domain: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for ShareCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareCredentials")
            .field("domain", &self.domain)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ShareCredentials {
    /// Credentials for a guest session
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user(user_name: &str, password: &str) -> Self {
        Self {
            domain: None,
            user_name: Some(user_name.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }
}

/// Composes `smb://[domain;][user[:password]@]server/share/path` locators.
///
/// Tree keys on a share are `/`-joined paths below the server
/// (`share/dir/file`). Credentials stay inside the locator and never appear
/// in a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareLocator {
    server: String,
    credentials: ShareCredentials,
}

impl ShareLocator {
    pub fn new(server: &str, credentials: ShareCredentials) -> Result<Self> {
        let server = server.trim_matches('/').to_string();
        if server.is_empty() || server.contains('/') {
            return Err(Error::invalid_path(server));
        }
        Ok(Self {
            server,
            credentials,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Locator of the server itself, used to enumerate its shares
    pub fn server_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("smb://{}/", self.server))?;
        let user = match (&self.credentials.domain, &self.credentials.user_name) {
            (Some(domain), Some(user)) => Some(format!("{domain};{user}")),
            (None, Some(user)) => Some(user.clone()),
            (_, None) => None,
        };
        if let Some(user) = user {
            url.set_username(&user)
                .map_err(|()| Error::invalid_path(self.server.as_str()))?;
            if let Some(password) = &self.credentials.password {
                url.set_password(Some(password))
                    .map_err(|()| Error::invalid_path(self.server.as_str()))?;
            }
        }
        Ok(url)
    }

    /// Locator of the entry at `key`
    pub fn url(&self, key: &str) -> Result<Url> {
        self.compose(key, false)
    }

    /// Locator of the entry at `key` in directory form, with a trailing `/`
    pub fn dir_url(&self, key: &str) -> Result<Url> {
        self.compose(key, true)
    }

    fn compose(&self, key: &str, directory: bool) -> Result<Url> {
        let mut url = self.server_url()?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::invalid_path(key))?;
            let _ = segments
                .pop_if_empty()
                .extend(key.split('/').filter(|s| !s.is_empty()));
            if directory {
                let _ = segments.push("");
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_locator() {
        let locator = ShareLocator::new("nas.local", ShareCredentials::anonymous()).unwrap();
        assert_eq!(locator.url("public/a.txt").unwrap().as_str(), "smb://nas.local/public/a.txt");
        assert_eq!(locator.dir_url("public/docs").unwrap().as_str(), "smb://nas.local/public/docs/");
        assert_eq!(locator.server_url().unwrap().as_str(), "smb://nas.local/");
    }

    #[test]
    fn test_credentials_are_embedded() {
        let creds = ShareCredentials::user("alice", "p@ss").with_domain("WORKGROUP");
        let locator = ShareLocator::new("10.0.0.5", creds).unwrap();
        let url = locator.url("media").unwrap();
        assert_eq!(url.username(), "WORKGROUP%3Balice");
        assert_eq!(url.password(), Some("p%40ss"));
        assert_eq!(url.host_str(), Some("10.0.0.5"));
    }

    #[test]
    fn test_segments_are_encoded() {
        let locator = ShareLocator::new("srv", ShareCredentials::anonymous()).unwrap();
        let url = locator.url("share/track #1.mp3").unwrap();
        assert_eq!(url.path(), "/share/track%20%231.mp3");
    }

    #[test]
    fn test_password_is_redacted() {
        let creds = ShareCredentials::user("bob", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_invalid_server() {
        assert!(ShareLocator::new("", ShareCredentials::anonymous()).is_err());
        assert!(ShareLocator::new("a/b", ShareCredentials::anonymous()).is_err());
    }
}
