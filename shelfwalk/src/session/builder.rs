//! Builder for creating sessions.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::generic::Session;
use crate::channel::ExpectConfig;
use crate::error::{Result, SessionError};
use crate::platform::SessionKind;
use crate::platform::vendors::pss_cli::CLI_ACCOUNT;
use crate::topology::RootNavigator;
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::transport::{Connector, SshConnector};

/// Builder for constructing sessions.
///
/// # Example
///
/// ```rust,no_run
/// use shelfwalk::{SessionBuilder, Shell};
///
/// # async fn example() -> Result<(), shelfwalk::Error> {
/// let mut cli = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("admin")
///     .build_cli()?;
///
/// cli.open().await?;
/// let output = cli.send_command("show version").await?;
/// println!("{}", output.result());
/// cli.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder<C: Connector = SshConnector> {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<SecretString>,
    private_key: Option<(PathBuf, Option<SecretString>)>,
    connect_timeout: Duration,
    expect: ExpectConfig,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    connector: C,
}

impl SessionBuilder<SshConnector> {
    /// Create a new session builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            password: None,
            private_key: None,
            connect_timeout: Duration::from_secs(30),
            expect: ExpectConfig::default(),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            connector: SshConnector,
        }
    }
}

impl<C: Connector> SessionBuilder<C> {
    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    ///
    /// For direct and root sessions this is the SSH user; for the CLI it
    /// answers the `Username:` challenge.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password. Also used for nested hops on root sessions.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication for the SSH login.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.private_key = Some((key_path.into(), None));
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.private_key = Some((
            key_path.into(),
            Some(SecretString::from(passphrase.into())),
        ));
        self
    }

    /// Set the connection and wait timeout (default: 30 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.expect.timeout = timeout;
        self
    }

    /// Set the sleep between polls (default: 250 ms).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.expect.poll_interval = interval;
        self
    }

    /// Set how many trailing bytes are searched for prompts (default: 1000).
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.expect.search_depth = depth;
        self
    }

    /// Keep or drop terminal escape sequences (default: drop).
    pub fn strip_ansi(mut self, strip: bool) -> Self {
        self.expect.strip_ansi = strip;
        self
    }

    /// Replace the whole expect configuration.
    pub fn expect_config(mut self, config: ExpectConfig) -> Self {
        self.expect = config;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the host key verification mode (default: accept new).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a custom known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Use another connector (e.g. a pre-configured transport).
    pub fn connector<C2: Connector>(self, connector: C2) -> SessionBuilder<C2> {
        SessionBuilder {
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
            private_key: self.private_key,
            connect_timeout: self.connect_timeout,
            expect: self.expect,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
            connector,
        }
    }

    /// Build a CLI session.
    ///
    /// The SSH login uses the element's fixed `cli` account; the username
    /// and password set here answer the CLI's own challenges.
    pub fn build_cli(mut self) -> Result<Session<C>> {
        let username = self.username.take().ok_or_else(|| invalid("Username is required"))?;
        let password = self
            .password
            .take()
            .ok_or_else(|| invalid("Password is required for the CLI"))?;

        let kind = SessionKind::ChallengeResponse { username, password };
        let auth = AuthMethod::Password(SecretString::from(CLI_ACCOUNT.to_string()));
        self.into_session(CLI_ACCOUNT.to_string(), auth, kind)
    }

    /// Build a direct root-shell session.
    ///
    /// A private key takes precedence for the SSH login; the password is
    /// still kept for nested hops.
    pub fn build_direct(mut self) -> Result<Session<C>> {
        let username = self.username.take().ok_or_else(|| invalid("Username is required"))?;
        let password = self.password.take();
        let auth = match (self.private_key.take(), &password) {
            (Some((path, passphrase)), _) => AuthMethod::PrivateKey { path, passphrase },
            (None, Some(password)) => AuthMethod::Password(password.clone()),
            (None, None) => AuthMethod::None,
        };
        let session = self.into_session(username, auth, SessionKind::Direct)?;
        Ok(match password {
            Some(password) => session.with_hop_password(password),
            None => session,
        })
    }

    /// Build a root session wrapped in a topology navigator.
    pub fn build_root(self) -> Result<RootNavigator<C>> {
        Ok(RootNavigator::new(self.build_direct()?))
    }

    fn into_session(
        self,
        username: String,
        auth: AuthMethod,
        kind: SessionKind,
    ) -> Result<Session<C>> {
        if self.expect.search_depth == 0 {
            return Err(invalid("search depth must be positive"));
        }

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth,
            timeout: self.connect_timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Session::new(ssh_config, kind, self.expect, self.connector)
    }
}

fn invalid(message: &str) -> crate::Error {
    SessionError::InvalidConfig {
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::session::Shell;
    use crate::transport::mock::{MockConnector, Script};

    #[test]
    fn test_cli_uses_fixed_ssh_account() {
        let session = SessionBuilder::new("10.0.0.1")
            .username("admin")
            .password("secret")
            .build_cli()
            .unwrap();

        let config = session.ssh_config();
        assert_eq!(config.username, "cli");
        assert_eq!(config.password().unwrap().expose_secret(), "cli");
        match session.kind() {
            SessionKind::ChallengeResponse { username, password } => {
                assert_eq!(username, "admin");
                assert_eq!(password.expose_secret(), "secret");
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(session.catalog().name, "pss_cli");
    }

    #[test]
    fn test_cli_requires_credentials() {
        assert!(SessionBuilder::new("10.0.0.1").password("x").build_cli().is_err());
        assert!(SessionBuilder::new("10.0.0.1").username("admin").build_cli().is_err());
    }

    #[test]
    fn test_direct_settings() {
        let session = SessionBuilder::new("10.0.0.1")
            .port(2222)
            .username("root")
            .password("pw")
            .timeout(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(50))
            .search_depth(2000)
            .strip_ansi(false)
            .terminal_size(200, 50)
            .host_key_verification(HostKeyVerification::Disabled)
            .build_direct()
            .unwrap();

        let ssh = session.ssh_config();
        assert_eq!(ssh.socket_addr(), "10.0.0.1:2222");
        assert_eq!(ssh.username, "root");
        assert_eq!(ssh.timeout, Duration::from_secs(5));
        assert_eq!((ssh.terminal_width, ssh.terminal_height), (200, 50));
        assert!(matches!(ssh.host_key_verification, HostKeyVerification::Disabled));

        let expect = session.expect_config();
        assert_eq!(expect.timeout, Duration::from_secs(5));
        assert_eq!(expect.max_retries(), 100);
        assert_eq!(expect.search_depth, 2000);
        assert!(!expect.strip_ansi);
        assert!(!session.is_open());
    }

    #[test]
    fn test_private_key_wins_over_password() {
        let session = SessionBuilder::new("10.0.0.1")
            .username("root")
            .password("pw")
            .private_key_with_passphrase("/tmp/id_ed25519", "phrase")
            .build_direct()
            .unwrap();
        assert!(matches!(
            session.ssh_config().auth,
            AuthMethod::PrivateKey { passphrase: Some(_), .. }
        ));
        assert!(session.ssh_config().password().is_none());
    }

    #[tokio::test]
    async fn test_key_login_keeps_password_for_hops() {
        let script = Script::new()
            .banner("Welcome")
            .reply(&["\r\nroot@EC1830-81-18-ACT:/root# "])
            .reply(&["EC1830-2-3 login:"])
            .reply(&["Password:"])
            .reply(&["\r\nroot@card:~# "])
            .reply(&["\r\nroot@card:~# "]);
        let connector = MockConnector::new(vec![script]);
        let log = connector.log();
        let mut navigator = SessionBuilder::new("10.0.0.1")
            .username("root")
            .password("pw")
            .private_key("/tmp/id_ed25519")
            .timeout(Duration::from_millis(20))
            .poll_interval(Duration::from_millis(1))
            .connector(connector)
            .build_root()
            .unwrap();

        navigator.open().await.unwrap();
        navigator.login_to_slot(2, 3).await.unwrap();
        assert_eq!(navigator.prompt(), Some("root@card:~#"));
        assert_eq!(log.writes(), vec!["", "telnet 100.0.2.3", "root", "pw", ""]);
    }

    #[test]
    fn test_zero_search_depth_rejected() {
        let result = SessionBuilder::new("10.0.0.1")
            .username("root")
            .search_depth(0)
            .build_direct();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_root_with_connector() {
        let navigator = SessionBuilder::new("10.0.0.1")
            .username("root")
            .password("pw")
            .connector(MockConnector::new(vec![]))
            .build_root()
            .unwrap();
        assert!(!navigator.is_open());
        assert!(navigator.is_on_master());
    }
}
