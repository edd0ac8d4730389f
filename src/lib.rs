//! B-Out - A paddle/ball/brick arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, collisions, entities, world)
//! - `net`: Sequenced datagram channel and remote paddle mirroring
//! - `game`: Collaborator-facing facade (tick, key events, drawable shapes)
//! - `settings`: Startup configuration, including the play mode

pub mod error;
pub mod game;
pub mod net;
pub mod settings;
pub mod shapes;
pub mod sim;

pub use error::{NetError, SettingsError};
pub use game::Game;
pub use settings::{GameMode, Settings};
pub use shapes::{Color, Shape};

/// Game configuration constants
pub mod consts {
    use crate::shapes::Color;

    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: u16 = 800;
    pub const ARENA_HEIGHT: u16 = 600;

    /// Ball defaults - spawns at arena centre
    pub const BALL_RADIUS: u16 = 10;
    pub const BALL_START: (u16, u16) = (400, 300);
    pub const BALL_VELOCITY: (i32, i32) = (4, -3);
    pub const BALL_COLOR: Color = Color::rgb(0xff, 0xff, 0x00);

    /// Paddle defaults
    pub const PADDLE_WIDTH: u16 = 100;
    pub const PADDLE_HEIGHT: u16 = 15;
    /// Pixels moved per tick while a movement key is held
    pub const PADDLE_STEP: i32 = 6;
    /// Gap between the paddle and the arena edge it defends
    pub const PADDLE_MARGIN: u16 = 30;
    pub const PADDLE_COLOR: Color = Color::rgb(0x33, 0xcc, 0x66);
    pub const REMOTE_PADDLE_COLOR: Color = Color::rgb(0xcc, 0x33, 0x66);

    /// Block defaults
    pub const BLOCK_WIDTH: u16 = 60;
    pub const BLOCK_HEIGHT: u16 = 20;
    pub const BLOCK_GAP: u16 = 8;
    pub const BLOCK_ROWS: u16 = 4;
    pub const BLOCK_COLUMNS: u16 = 10;
    pub const BLOCK_TOP: u16 = 80;
    pub const BLOCK_COLOR: Color = Color::rgb(0x40, 0x80, 0xff);
    /// Hits after which a block is destroyed
    pub const BLOCK_DESTROY_THRESHOLD: u32 = 2;

    /// Clear colour
    pub const BACKGROUND: Color = Color::rgb(0, 0, 0);

    /// Network
    pub const SERVER_PORT: u16 = 4242;
    pub const CLIENT_PORT: u16 = 4241;
    /// Receive window per `receive()` call (seconds)
    pub const RECV_TIMEOUT_SECS: u64 = 5;
    /// Passive handshake attempts before giving up
    pub const HANDSHAKE_ATTEMPTS: u32 = 10;

    /// Headless loop frame rate
    pub const FRAME_RATE: u32 = 60;
    /// Max simulation steps per frame (prevents spiral of death)
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame fed to the accumulator (milliseconds)
    pub const MAX_FRAME_MS: u64 = 100;
}
