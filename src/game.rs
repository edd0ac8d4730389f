//! Game facade
//!
//! What the outer collaborators talk to: a pacer calls `tick` once per frame,
//! an input poller forwards key events, a renderer asks for shapes.

use std::time::Duration;

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS};
use crate::error::NetError;
use crate::net::{ChannelStats, Link, RemoteAdapter, Role, SequencedChannel, UdpLink};
use crate::settings::{GameMode, Settings};
use crate::shapes::Shape;
use crate::sim::{KeyId, Roster, World, tick};

pub struct Game<L: Link = UdpLink> {
    world: World,
    roster: Roster,
    remote: Option<RemoteAdapter<L>>,
    accumulator: Duration,
    step: Duration,
}

impl Game {
    /// Single player, no network
    pub fn local(settings: &Settings) -> Self {
        let (world, roster) = World::standard(settings);
        Self {
            world,
            roster,
            remote: None,
            accumulator: Duration::ZERO,
            step: settings.step(),
        }
    }

    /// Build the game for `settings.mode`, binding and handshaking as needed.
    ///
    /// Blocks until the handshake completes on the host side.
    pub fn start(settings: &Settings) -> Result<Self, NetError> {
        let Some(role) = settings.mode.role() else {
            return Ok(Self::local(settings));
        };
        let net = &settings.net;
        let channel = match &settings.mode {
            GameMode::Guest { hostname } => {
                let mut link = UdpLink::bind(net.client_port)?;
                let server = link.connect(hostname, net.server_port)?;
                log::info!("Joining {hostname} at {server} from {}", link.local_addr()?);
                let mut channel = SequencedChannel::with_window(link, net.recv_timeout());
                channel.connect()?;
                channel
            }
            GameMode::Host | GameMode::Local => {
                let link = UdpLink::bind(net.server_port)?;
                log::info!("Hosting on {}", link.local_addr()?);
                let mut channel = SequencedChannel::with_window(link, net.recv_timeout());
                channel.accept(net.handshake_attempts)?;
                channel
            }
        };
        Ok(Game::with_remote(settings, RemoteAdapter::new(channel, role)))
    }
}

impl<L: Link> Game<L> {
    /// Two-player game over an already handshaken channel
    pub fn with_remote(settings: &Settings, remote: RemoteAdapter<L>) -> Self {
        let (world, roster) = World::standard(settings);
        if roster.remote_paddle.is_none() {
            log::warn!("Remote adapter supplied in {} mode; no paddle mirrors it", settings.mode.as_str());
        }
        Self {
            world,
            roster,
            remote: Some(remote),
            accumulator: Duration::ZERO,
            step: settings.step(),
        }
    }

    /// Advance by `dt` of wall time, in fixed steps.
    ///
    /// Each step first exchanges paddle positions with the peer (if any).
    /// A step whose receive timed out still simulates, with the remote
    /// paddle left where it was.
    pub fn tick(&mut self, dt: Duration) -> Result<(), NetError> {
        self.accumulator += dt.min(Duration::from_millis(MAX_FRAME_MS));

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            self.sync_remote()?;
            tick(&mut self.world);
            self.accumulator -= self.step;
            substeps += 1;
        }
        Ok(())
    }

    fn sync_remote(&mut self) -> Result<(), NetError> {
        let Some(remote) = self.remote.as_mut() else {
            return Ok(());
        };
        let Some(local) = self.world.paddle_mut(self.roster.local_paddle).map(|p| p.position()) else {
            return Ok(());
        };
        if let Some(position) = remote.sync(local)?
            && let Some(id) = self.roster.remote_paddle
            && let Some(paddle) = self.world.paddle_mut(id)
        {
            paddle.place(position);
        }
        Ok(())
    }

    /// True if a local paddle is bound to `key`
    pub fn on_key_down(&mut self, key: KeyId) -> bool {
        self.world.key_down(key)
    }

    pub fn on_key_up(&mut self, key: KeyId) -> bool {
        self.world.key_up(key)
    }

    pub fn drawable_shapes(&self) -> Vec<Shape> {
        self.world.drawable_shapes()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Network role, `None` for local play
    pub fn role(&self) -> Option<Role> {
        self.remote.as_ref().map(RemoteAdapter::role)
    }

    pub fn stats(&self) -> Option<ChannelStats> {
        self.remote.as_ref().map(RemoteAdapter::stats)
    }

    /// All blocks destroyed
    pub fn is_cleared(&self) -> bool {
        self.world.blocks_remaining() == 0
    }
}
