//! Remote target value object - where transfers and release commands go.

use std::fmt;
use std::path::PathBuf;

/// How the transport authenticates against the remote host.
///
/// Authentication material itself lives in the host's ssh credential store;
/// this only selects how the ssh client is allowed to use it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Keys offered by the running ssh-agent / default identities.
    /// Never prompts (ssh `BatchMode=yes`).
    #[default]
    Agent,
    /// A specific identity file. Never prompts.
    Key { identity_file: PathBuf },
    /// Allow ssh to prompt on the terminal (passwords, passphrases).
    Interactive,
}

impl AuthMethod {
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Agent => "agent",
            AuthMethod::Key { .. } => "key",
            AuthMethod::Interactive => "interactive",
        }
    }

    /// Whether the ssh client may block waiting for terminal input.
    pub fn allows_prompt(&self) -> bool {
        matches!(self, AuthMethod::Interactive)
    }
}

/// Identifies the remote destination.
///
/// Owned by configuration; components only ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub auth: AuthMethod,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: None,
            auth: AuthMethod::default(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// ssh destination string (`user@host` or `host`)
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) if !user.is_empty() => format!("{}@{}", user, self.host),
            _ => self.host.clone(),
        }
    }

    /// Destination spec for a remote path as understood by scp/rsync.
    pub fn remote_spec(&self, remote_path: &str) -> String {
        format!("{}:{}", self.destination(), remote_path)
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination())?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_without_user_is_host() {
        let target = RemoteTarget::new("example.org");
        assert_eq!(target.destination(), "example.org");
    }

    #[test]
    fn destination_with_user() {
        let target = RemoteTarget::new("example.org").with_user("deploy");
        assert_eq!(target.destination(), "deploy@example.org");
        assert_eq!(
            target.remote_spec("/opt/app/a.json"),
            "deploy@example.org:/opt/app/a.json"
        );
    }

    #[test]
    fn empty_user_is_ignored() {
        let target = RemoteTarget::new("h").with_user("");
        assert_eq!(target.destination(), "h");
    }

    #[test]
    fn display_includes_port() {
        let target = RemoteTarget::new("h").with_user("u").with_port(2222);
        assert_eq!(target.to_string(), "u@h:2222");
    }

    #[test]
    fn only_interactive_auth_prompts() {
        assert!(!AuthMethod::Agent.allows_prompt());
        assert!(!AuthMethod::Key {
            identity_file: PathBuf::from("/k")
        }
        .allows_prompt());
        assert!(AuthMethod::Interactive.allows_prompt());
    }
}
