//! The session: one transport, one expect engine, one current prompt.

use log::{debug, info, warn};
use secrecy::SecretString;

use super::Shell;
use crate::channel::{
    ExpectConfig, ExpectEngine, Output, OutputStream, literal_prompt_pattern,
};
use crate::error::{ChannelError, Result, SessionError};
use crate::platform::{Answer, PromptCatalog, PromptKind, SessionKind};
use crate::transport::{ByteStream, Connector, SshConfig, SshConnector};

/// An interactive shell session on a network element.
///
/// The flavor is picked by [`SessionKind`]: a direct root shell, or the CLI
/// that answers username/password/acknowledge challenges after the SSH login.
/// Both share the same lifecycle:
///
/// 1. `open()` connects, answers the flavor's challenges, drains the banner,
///    captures the prompt and runs the flavor's on-open commands.
/// 2. `execute()` / `send_command()` run commands until the prompt returns.
/// 3. `close()` sends the flavor's logout command and tears the stream down.
///
/// Build one with [`SessionBuilder`](super::SessionBuilder).
pub struct Session<C: Connector = SshConnector> {
    connector: C,
    ssh_config: SshConfig,
    kind: SessionKind,
    catalog: PromptCatalog,
    engine: ExpectEngine<C::Stream>,
    prompt: Option<String>,
    hop_password: Option<SecretString>,
}

impl<C: Connector> Session<C> {
    /// Create a session. Nothing is connected until `open()`.
    pub fn new(
        ssh_config: SshConfig,
        kind: SessionKind,
        expect_config: ExpectConfig,
        connector: C,
    ) -> Result<Self> {
        let catalog = kind.catalog().map_err(ChannelError::from)?;
        let hop_password = ssh_config.password().cloned();
        Ok(Self {
            connector,
            ssh_config,
            kind,
            catalog,
            engine: ExpectEngine::new(expect_config),
            prompt: None,
            hop_password,
        })
    }

    /// Set the password answered to nested `telnet` logins.
    ///
    /// Defaults to the SSH password; needed when the SSH login uses a key.
    pub fn with_hop_password(mut self, password: SecretString) -> Self {
        self.hop_password = Some(password);
        self
    }

    /// The session flavor.
    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    /// The flavor's pattern set.
    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// The SSH connection settings.
    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    /// The expect engine settings.
    pub fn expect_config(&self) -> &ExpectConfig {
        self.engine.config()
    }

    /// Set the default wait timeout for subsequent operations.
    pub fn set_timeout(&mut self, timeout: std::time::Duration) {
        self.engine.set_timeout(timeout);
    }

    /// The underlying stream while connected, e.g. to open a file-transfer
    /// channel on an [`SshStream`](crate::transport::SshStream).
    pub fn stream(&self) -> Option<&C::Stream> {
        self.engine.stream()
    }

    /// Run `command` and return a lazy stream of its output.
    ///
    /// The stream ends when the current prompt reappears or when no data
    /// arrives for the whole timeout.
    pub async fn execute(&mut self, command: &str) -> Result<OutputStream<'_, C::Stream>> {
        if !self.engine.is_connected() {
            return Err(SessionError::NotConnected.into());
        }
        let matcher = match &self.prompt {
            Some(prompt) => literal_prompt_pattern(prompt).map_err(ChannelError::from)?,
            None => self.catalog.prompt_pattern()?.regex().clone(),
        };
        self.engine.execute(command, matcher).await
    }

    /// Send an empty line and capture the prompt matching `kind`.
    ///
    /// Output already pending (a prompt echoed by the shell that was just
    /// left, say) is discarded first. Returns `None`, and leaves the current
    /// prompt untouched, when no such prompt shows up in time.
    pub async fn try_acquire_prompt(&mut self, kind: PromptKind) -> Result<Option<String>> {
        let pattern = self.catalog.pattern(kind)?;
        let stale = self.engine.receive_available()?;
        if !stale.is_empty() {
            debug!("discarding {} stale bytes before acquiring the prompt", stale.len());
        }
        self.engine.send("").await?;
        let Some(text) = self.engine.expect(pattern).await? else {
            debug!("no {} after an empty line", kind);
            return Ok(None);
        };

        let prompt = text.trim().to_string();
        debug!("prompt: {:?}", prompt);
        self.prompt = Some(prompt.clone());
        Ok(Some(prompt))
    }

    /// Like [`try_acquire_prompt`](Self::try_acquire_prompt), but a missing
    /// prompt is an error.
    pub async fn acquire_prompt(&mut self, kind: PromptKind) -> Result<String> {
        self.try_acquire_prompt(kind).await?.ok_or_else(|| {
            SessionError::PromptNotAcquired {
                context: "an empty line".to_string(),
            }
            .into()
        })
    }

    /// Wait for the pattern of `kind`; `None` if it never appears.
    pub async fn expect(&mut self, kind: PromptKind) -> Result<Option<String>> {
        let pattern = self.catalog.pattern(kind)?;
        self.engine.expect(pattern).await
    }

    /// Wait until any of `kinds` appears, reporting which one did.
    pub async fn expect_any(
        &mut self,
        kinds: &[PromptKind],
    ) -> Result<Option<(PromptKind, String)>> {
        let patterns = kinds
            .iter()
            .map(|kind| self.catalog.pattern(*kind))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .engine
            .expect_any(&patterns)
            .await?
            .map(|(index, text)| (kinds[index], text)))
    }

    /// Write a line without waiting for anything.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.engine.send(line).await
    }

    /// Write a credential line; it is never logged.
    pub async fn send_secret(&mut self, secret: &SecretString) -> Result<()> {
        self.engine.send_secret(secret).await
    }

    /// Send Ctrl+C to abort whatever the remote is doing.
    ///
    /// Best-effort: the caller still has to resynchronize on a prompt.
    pub async fn cancel(&mut self) -> Result<()> {
        self.engine.cancel().await
    }

    /// Drain whatever output is ready right now.
    pub fn receive_available(&mut self) -> Result<String> {
        self.engine.receive_available()
    }

    /// Answer a nested login's password challenge.
    ///
    /// Returns `false`, sending nothing, when the session has no hop password.
    pub(crate) async fn send_login_password(&mut self) -> Result<bool> {
        match &self.hop_password {
            Some(password) => {
                self.engine.send_secret(password).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace the memoized prompt, e.g. to return to a parent shell's
    /// prompt after a failed hop.
    pub(crate) fn restore_prompt(&mut self, prompt: Option<String>) {
        self.prompt = prompt;
    }

    /// Everything after the transport is up: challenges, banner, prompt,
    /// on-open commands.
    async fn establish(&mut self) -> Result<()> {
        for challenge in self.kind.challenges() {
            let pattern = self.catalog.pattern(challenge.kind)?;
            if self.engine.expect(pattern).await?.is_none() {
                return Err(SessionError::AuthenticationFailed {
                    challenge: challenge.kind.label().to_string(),
                }
                .into());
            }
            match challenge.answer {
                Answer::Text(text) => self.engine.send(text).await?,
                Answer::Secret(secret) => self.engine.send_secret(secret).await?,
            }
        }

        let banner = self.engine.receive_available()?;
        if !banner.is_empty() {
            debug!("discarded {} bytes of banner", banner.len());
        }

        if self.try_acquire_prompt(self.catalog.prompt).await?.is_none() {
            return Err(SessionError::PromptNotAcquired {
                context: "opening the session".to_string(),
            }
            .into());
        }

        for command in self.catalog.on_open_commands.clone() {
            let output = self.execute(&command).await?.collect().await?;
            debug!("{:?}: {:?}", command, output.completion);
        }
        Ok(())
    }

    /// Tear down the stream without the logout handshake.
    async fn abort(&mut self) {
        if let Some(mut stream) = self.engine.detach() {
            if let Err(e) = stream.close().await {
                warn!("closing the stream failed: {}", e);
            }
        }
        self.prompt = None;
    }
}

impl<C: Connector> Shell for Session<C> {
    async fn open(&mut self) -> Result<()> {
        if self.engine.is_connected() {
            debug!("{} session already open", self.catalog.name);
            return Ok(());
        }

        info!(
            "opening {} session to {}",
            self.catalog.name,
            self.ssh_config.socket_addr()
        );
        let stream = self.connector.connect(&self.ssh_config).await?;
        self.engine.attach(stream);

        if let Err(e) = self.establish().await {
            warn!("open failed, closing the transport: {}", e);
            self.abort().await;
            return Err(e);
        }

        info!(
            "{} session open, prompt {:?}",
            self.catalog.name,
            self.prompt.as_deref().unwrap_or_default()
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.engine.is_connected() {
            return Ok(());
        }

        info!("closing {} session", self.catalog.name);
        let logout = self.catalog.logout_command.clone();
        if let Err(e) = self.engine.send(&logout).await {
            warn!("sending {:?} failed: {}", logout, e);
        }

        self.prompt = None;
        if let Some(mut stream) = self.engine.detach() {
            stream.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Output> {
        self.execute(command).await?.collect().await
    }

    fn is_open(&self) -> bool {
        self.engine.is_connected()
    }

    fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }
}
