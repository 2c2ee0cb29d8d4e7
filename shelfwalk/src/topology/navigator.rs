//! Nested logins between controllers and cards of a multi-shelf element.

use std::net::Ipv4Addr;

use log::{debug, info, warn};

use super::address::{
    CONTROLLER_PAIR, MASTER_SHELF, controller_address, partner_controller, slot_address,
};
use super::location::Location;
use crate::channel::{Output, OutputStream};
use crate::error::{NavigationError, Result};
use crate::platform::{ControllerIdentity, PromptKind};
use crate::session::{Session, Shell};
use crate::transport::{Connector, SshConnector};

/// Where the navigator was before a hop, restored on the way back.
#[derive(Debug, Clone)]
struct Frame {
    location: Location,
    prompt: Option<String>,
    on_master: bool,
}

/// A root session that can hop to other shelves, cards and the standby
/// controller with `telnet`, tracking where it currently is.
///
/// Every hop is finalized only by a recognized prompt. A failed hop leaves
/// [`location`](Self::location) and the prompt as they were.
///
/// # Example
///
/// ```rust,no_run
/// use shelfwalk::{SessionBuilder, Shell};
///
/// # async fn example() -> Result<(), shelfwalk::Error> {
/// let mut root = SessionBuilder::new("10.0.0.1")
///     .username("root")
///     .password("secret")
///     .build_root()?;
///
/// root.open().await?;
/// root.login_to_shelf(2, None, true).await?;
/// let output = root.send_command("uptime").await?;
/// println!("{}", output.result());
/// root.logout_from_shelf().await?;
/// root.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct RootNavigator<C: Connector = SshConnector> {
    session: Session<C>,
    location: Location,
    on_master: bool,
    frames: Vec<Frame>,
}

impl<C: Connector> RootNavigator<C> {
    /// Wrap a direct root session. The SSH login is assumed to land on the
    /// master shelf.
    pub fn new(session: Session<C>) -> Self {
        Self {
            session,
            location: Location::Local,
            on_master: true,
            frames: Vec::new(),
        }
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// The wrapped session, mutably. Commands that change the remote shell
    /// behind the navigator's back make its location stale.
    pub fn session_mut(&mut self) -> &mut Session<C> {
        &mut self.session
    }

    /// Current location.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Number of nested logins currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether the current shell belongs to the master shelf.
    pub fn is_on_master(&self) -> bool {
        self.on_master
    }

    /// Whether the current prompt is an active controller's.
    pub fn is_on_active(&self) -> bool {
        self.identity().is_some_and(|id| id.is_active())
    }

    /// Identity parsed from the current prompt, if it is a controller's.
    pub fn identity(&self) -> Option<ControllerIdentity> {
        self.session.prompt().and_then(ControllerIdentity::parse)
    }

    /// Run a command in the current shell; see [`Session::execute`].
    pub async fn execute(&mut self, command: &str) -> Result<OutputStream<'_, C::Stream>> {
        self.session.execute(command).await
    }

    /// Log in to a card.
    ///
    /// Cards accept the session credentials; some ask no password at all.
    pub async fn login_to_slot(&mut self, shelf: u8, slot: u8) -> Result<()> {
        let target = format!("login to slot {}/{}", shelf, slot);
        if self.location.is_slot() {
            return Err(NavigationError::hop(format!("{} from {}", target, self.location)).into());
        }

        info!("logging in slot {}/{}", shelf, slot);
        if !self.hop(slot_address(shelf, slot)).await? {
            return Err(NavigationError::hop(target).into());
        }

        let parent = self.frame();
        if self
            .session
            .try_acquire_prompt(PromptKind::GenericShell)
            .await?
            .is_none()
        {
            self.session.cancel().await?;
            return Err(NavigationError::hop(target).into());
        }

        self.frames.push(parent);
        self.location = Location::AtSlot { shelf, slot };
        info!("logged in slot {}/{}", shelf, slot);
        Ok(())
    }

    /// Leave a card, back to the shell it was reached from.
    ///
    /// Does nothing unless the current location is a slot.
    pub async fn logout_from_slot(&mut self) -> Result<()> {
        let Location::AtSlot { shelf, slot } = self.location else {
            debug!("not in a slot, nothing to log out from");
            return Ok(());
        };

        info!("logging out slot {}/{}", shelf, slot);
        self.exit_to_parent(format!("logout from slot {}/{}", shelf, slot))
            .await
    }

    /// Log in to a shelf controller.
    ///
    /// With `controller` unset both controllers are tried in turn; the first
    /// one whose role matches `want_active` is kept and a mismatching one is
    /// logged out of again.
    pub async fn login_to_shelf(
        &mut self,
        shelf: u8,
        controller: Option<u8>,
        want_active: bool,
    ) -> Result<()> {
        let candidates = match controller {
            Some(id) => vec![id],
            None => CONTROLLER_PAIR.to_vec(),
        };
        if self.location.is_slot() {
            return Err(NavigationError::hop(format!(
                "login to shelf {} from {}",
                shelf, self.location
            ))
            .into());
        }

        info!(
            "logging in shelf {} (controller {:?}, active {})",
            shelf, controller, want_active
        );
        let parent = self.frame();
        let mut last = candidates[0];
        for candidate in candidates {
            last = candidate;
            if !self.hop(controller_address(shelf, candidate)).await? {
                continue;
            }

            let Some(prompt) = self.session.try_acquire_prompt(PromptKind::Root).await? else {
                self.session.cancel().await?;
                continue;
            };

            match ControllerIdentity::parse(&prompt) {
                Some(identity) if identity.is_active() == want_active => {
                    self.frames.push(parent);
                    self.on_master = shelf == MASTER_SHELF;
                    self.location = Location::AtShelf {
                        shelf,
                        controller: identity.controller,
                        role: identity.role,
                        is_master: self.on_master,
                    };
                    info!("logged in {}", self.location);
                    return Ok(());
                }
                _ => {
                    debug!("controller {} has the wrong role, logging out", candidate);
                    if !self.exit_shell(parent.prompt.as_deref()).await? {
                        self.session.restore_prompt(parent.prompt);
                        return Err(NavigationError::hop(format!(
                            "login to shelf {} (controller {}): no prompt after leaving it",
                            shelf, candidate
                        ))
                        .into());
                    }
                }
            }
        }

        Err(NavigationError::hop(format!("login to shelf {} (controller {})", shelf, last)).into())
    }

    /// Leave a slave shelf, back to the master.
    ///
    /// Does nothing while on the master shelf.
    pub async fn logout_from_shelf(&mut self) -> Result<()> {
        if self.location.is_slot() {
            return Err(
                NavigationError::hop(format!("logout from shelf while at {}", self.location))
                    .into(),
            );
        }
        if self.on_master {
            debug!("on the master shelf, nothing to log out from");
            return Ok(());
        }

        info!("logging out {}", self.location);
        self.exit_to_parent(format!("logout from {}", self.location))
            .await
    }

    /// Log in to the standby controller of the master shelf.
    ///
    /// Only legal from the active controller of the master shelf.
    pub async fn login_to_standby_controller(&mut self) -> Result<()> {
        let identity = match self.identity() {
            Some(identity) if identity.is_active() && self.on_master => identity,
            _ => {
                return Err(NavigationError::hop(format!(
                    "login to the standby controller from {}",
                    self.location
                ))
                .into());
            }
        };

        let partner = partner_controller(identity.controller);
        info!(
            "logging in standby controller {} (active is {})",
            partner, identity.controller
        );
        self.login_to_shelf(MASTER_SHELF, Some(partner), false)
            .await
    }

    /// Leave the standby controller, back to the active one.
    ///
    /// Does nothing while on an active controller.
    pub async fn logout_from_standby_controller(&mut self) -> Result<()> {
        if self.location.is_slot() {
            return Err(NavigationError::hop(format!(
                "logout from the standby controller while at {}",
                self.location
            ))
            .into());
        }
        if self.is_on_active() {
            debug!("on an active controller, nothing to log out from");
            return Ok(());
        }

        info!("logging out standby controller");
        self.exit_to_parent("logout from the standby controller".to_string())
            .await
    }

    /// `telnet` to `address` and log in with the session credentials.
    ///
    /// Returns `false` after cancelling the attempt when the login does not
    /// get through.
    async fn hop(&mut self, address: Ipv4Addr) -> Result<bool> {
        debug!("telnet {}", address);
        self.session.send(&format!("telnet {}", address)).await?;

        if self
            .session
            .expect(PromptKind::LoginChallenge)
            .await?
            .is_some()
        {
            let username = self.session.ssh_config().username.clone();
            self.session.send(&username).await?;

            match self
                .session
                .expect_any(&[PromptKind::PasswordChallenge, PromptKind::GenericShell])
                .await?
            {
                Some((PromptKind::PasswordChallenge, _)) => {
                    if self.session.send_login_password().await? {
                        debug!("telnet {} succeeded", address);
                        return Ok(true);
                    }
                    warn!("{} asks for a password but the session has none", address);
                }
                Some(_) => {
                    debug!("telnet {} succeeded without a password", address);
                    return Ok(true);
                }
                None => {}
            }
        }

        self.session.cancel().await?;
        debug!("telnet {} failed", address);
        Ok(false)
    }

    /// Send `exit` and wait for the parent controller's prompt.
    ///
    /// Returns `false` when no controller prompt shows up, or when the one
    /// that does is not `parent_prompt`; the current prompt is kept then.
    async fn exit_shell(&mut self, parent_prompt: Option<&str>) -> Result<bool> {
        let current = self.session.prompt().map(str::to_string);
        self.session.send("exit").await?;
        match self.session.try_acquire_prompt(PromptKind::Root).await? {
            Some(prompt) if parent_prompt.is_none_or(|parent| parent == prompt) => Ok(true),
            Some(prompt) => {
                warn!("expected {:?} after exit, got {:?}", parent_prompt, prompt);
                self.session.restore_prompt(current);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Exit the current nested shell and pop back to its parent frame.
    async fn exit_to_parent(&mut self, description: String) -> Result<()> {
        let Some(parent) = self.frames.last().cloned() else {
            return Err(NavigationError::hop(format!("{}: no parent shell", description)).into());
        };

        if !self.exit_shell(parent.prompt.as_deref()).await? {
            return Err(NavigationError::hop(format!(
                "{}: failed to get the parent prompt",
                description
            ))
            .into());
        }

        self.frames.pop();
        self.location = parent.location;
        self.on_master = parent.on_master;
        info!("back at {}", self.location);
        Ok(())
    }

    fn frame(&self) -> Frame {
        Frame {
            location: self.location,
            prompt: self.session.prompt().map(str::to_string),
            on_master: self.on_master,
        }
    }

    fn reset(&mut self) {
        self.location = Location::Local;
        self.on_master = true;
        self.frames.clear();
    }
}

impl<C: Connector> Shell for RootNavigator<C> {
    async fn open(&mut self) -> Result<()> {
        if !self.session.is_open() {
            self.reset();
        }
        self.session.open().await
    }

    async fn close(&mut self) -> Result<()> {
        self.reset();
        self.session.close().await
    }

    async fn send_command(&mut self, command: &str) -> Result<Output> {
        self.session.send_command(command).await
    }

    fn is_open(&self) -> bool {
        self.session.is_open()
    }

    fn prompt(&self) -> Option<&str> {
        self.session.prompt()
    }
}
