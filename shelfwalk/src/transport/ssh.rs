//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use futures_util::FutureExt;
use log::{debug, info, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use super::stream::{ByteStream, Connector};
use crate::error::{ChannelError, Result, TransportError};

/// SSH transport wrapping russh client.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    terminal_width: u32,
    terminal_height: u32,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: &SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: None,
            ..Default::default()
        });

        let refusal = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            verify: !matches!(config.host_key_verification, HostKeyVerification::Disabled),
            known_hosts_path: config.known_hosts_path.clone(),
            refusal: refusal.clone(),
        };

        info!("Connecting to {}", config.socket_addr());
        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            refusal
                .lock()
                .ok()
                .and_then(|mut refused| refused.take())
                .unwrap_or(TransportError::Ssh(e))
        })?;

        Self::authenticate(&mut session, config).await?;

        Ok(Self {
            session,
            terminal_width: config.terminal_width,
            terminal_height: config.terminal_height,
        })
    }

    /// Open a new PTY channel with an interactive shell.
    pub async fn open_channel(&self) -> Result<Channel<Msg>> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                self.terminal_width,
                self.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(|_| ChannelError::PtyOpenFailed)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(channel)
    }

    /// Open a channel bound to an SSH subsystem (e.g. `sftp`) on the same
    /// authenticated connection.
    pub async fn open_subsystem(&self, name: &str) -> Result<Channel<Msg>> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_subsystem(true, name)
            .await
            .map_err(TransportError::Ssh)?;

        debug!("Opened '{}' subsystem channel", name);
        Ok(channel)
    }

    /// Authenticate with the server.
    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::None => session
                .authenticate_none(&config.username)
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(e.to_string()))?;

                // Get the best RSA hash algorithm supported by the server
                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(TransportError::Ssh)?
                    .flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(TransportError::Ssh)?
                    .success()
            }
        };

        if !success {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// A shell channel exposed as a non-blocking [`ByteStream`].
///
/// Incoming channel messages are pulled without waiting and queued locally;
/// stdout and stderr are merged, as a terminal would show them.
pub struct SshStream {
    transport: Option<SshTransport>,
    channel: Channel<Msg>,
    pending: BytesMut,
    eof: bool,
    closed: bool,
}

impl SshStream {
    /// Wrap an open shell channel and the transport that owns it.
    pub fn new(transport: SshTransport, channel: Channel<Msg>) -> Self {
        Self {
            transport: Some(transport),
            channel,
            pending: BytesMut::with_capacity(4096),
            eof: false,
            closed: false,
        }
    }

    /// Open a file-transfer (`sftp` subsystem) channel that shares this
    /// stream's authenticated connection.
    pub async fn open_file_transfer_channel(&self) -> Result<Channel<Msg>> {
        let transport = self.transport.as_ref().ok_or(ChannelError::Closed)?;
        transport.open_subsystem("sftp").await
    }

    /// Move every already-delivered channel message into `pending`.
    fn pump(&mut self) {
        while !self.eof {
            match self.channel.wait().now_or_never() {
                None => break,
                Some(None) => self.eof = true,
                Some(Some(ChannelMsg::Data { data })) => self.pending.extend_from_slice(&data),
                Some(Some(ChannelMsg::ExtendedData { data, .. })) => {
                    self.pending.extend_from_slice(&data)
                }
                Some(Some(ChannelMsg::Eof | ChannelMsg::Close)) => {
                    debug!("Remote closed the shell channel");
                    self.eof = true;
                }
                Some(Some(msg)) => trace!("Ignoring channel message: {:?}", msg),
            }
        }
    }
}

impl ByteStream for SshStream {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.closed || self.eof {
            return Err(ChannelError::Closed.into());
        }
        self.channel.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    fn has_data_ready(&mut self) -> bool {
        if !self.closed {
            self.pump();
        }
        !self.pending.is_empty()
    }

    fn read_chunk(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        let n = max_bytes.min(self.pending.len());
        Ok(self.pending.split_to(n).to_vec())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending.clear();

        if let Err(e) = self.channel.close().await {
            debug!("Channel close failed: {}", e);
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }
}

/// Connector that opens [`SshStream`]s with russh.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector;

impl Connector for SshConnector {
    type Stream = SshStream;

    async fn connect(&self, config: &SshConfig) -> Result<SshStream> {
        let transport = SshTransport::connect(config).await?;
        let channel = transport.open_channel().await?;
        info!("Shell channel open on {}", config.socket_addr());
        Ok(SshStream::new(transport, channel))
    }
}

/// russh client handler; only decides whether to trust the host key.
struct SshHandler {
    host: String,
    port: u16,
    verify: bool,
    known_hosts_path: Option<PathBuf>,
    /// Why the key was refused, reported by `connect()` instead of russh's
    /// generic `UnknownKey`.
    refusal: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// `Ok(false)` when the host is not recorded yet.
    fn is_known(&self, key: &PublicKey) -> Result<bool, TransportError> {
        let checked = match &self.known_hosts_path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        checked.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) {
        let learned = match &self.known_hosts_path {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        match learned {
            Ok(()) => debug!("recorded the host key of {}:{}", self.host, self.port),
            Err(e) => warn!("could not record the host key of {}:{}: {}", self.host, self.port, e),
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        if !self.verify {
            return Ok(true);
        }
        match self.is_known(server_public_key) {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.remember(server_public_key);
                Ok(true)
            }
            Err(e) => {
                if let Ok(mut refusal) = self.refusal.lock() {
                    *refusal = Some(e);
                }
                Ok(false)
            }
        }
    }
}
