//! Startup configuration
//!
//! Built once before the first tick and passed by reference to whatever needs
//! it. The play mode lives here too; nothing reads it from global state.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::net::Role;
use crate::sim::{Displacement, KeyBindings, Point};

/// Local play, or one side of a two-player pairing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Local,
    /// Passive side: listens on the server port and waits for a guest
    Host,
    /// Active side: announces itself to `hostname`
    Guest { hostname: String },
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Local => "local",
            GameMode::Host => "host",
            GameMode::Guest { .. } => "guest",
        }
    }

    /// Send/receive ordering for network modes
    pub fn role(&self) -> Option<Role> {
        match self {
            GameMode::Local => None,
            GameMode::Host => Some(Role::Host),
            GameMode::Guest { .. } => Some(Role::Guest),
        }
    }
}

/// Brick wall layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockLayout {
    pub rows: u16,
    pub columns: u16,
    pub width: u16,
    pub height: u16,
    pub gap: u16,
    /// y of the first row
    pub top: u16,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            rows: BLOCK_ROWS,
            columns: BLOCK_COLUMNS,
            width: BLOCK_WIDTH,
            height: BLOCK_HEIGHT,
            gap: BLOCK_GAP,
            top: BLOCK_TOP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleSettings {
    pub width: u16,
    pub height: u16,
    /// Pixels per tick while a key is held
    pub step: i32,
    /// Distance from the defended edge
    pub margin: u16,
    pub bindings: KeyBindings,
}

impl Default for PaddleSettings {
    fn default() -> Self {
        Self {
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            step: PADDLE_STEP,
            margin: PADDLE_MARGIN,
            // SDL keycodes for the arrow keys
            bindings: KeyBindings {
                left: 0x4000_0050,
                right: 0x4000_004f,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSettings {
    pub start: Point,
    pub velocity: Displacement,
    pub radius: u16,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            start: Point::new(BALL_START.0, BALL_START.1),
            velocity: Displacement::new(BALL_VELOCITY.0, BALL_VELOCITY.1),
            radius: BALL_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSettings {
    pub server_port: u16,
    pub client_port: u16,
    pub recv_timeout_secs: u64,
    pub handshake_attempts: u32,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            client_port: CLIENT_PORT,
            recv_timeout_secs: RECV_TIMEOUT_SECS,
            handshake_attempts: HANDSHAKE_ATTEMPTS,
        }
    }
}

impl NetSettings {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_secs(self.recv_timeout_secs)
    }
}

/// Everything decided at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,
    pub arena_width: u16,
    pub arena_height: u16,
    /// RNG seed (block recolouring)
    pub seed: u64,
    /// Ticks per second for the frame pacer
    pub frame_rate: u32,
    pub ball: BallSettings,
    pub paddle: PaddleSettings,
    pub blocks: BlockLayout,
    pub net: NetSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Local,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            seed: 0x0b07,
            frame_rate: FRAME_RATE,
            ball: BallSettings::default(),
            paddle: PaddleSettings::default(),
            blocks: BlockLayout::default(),
            net: NetSettings::default(),
        }
    }
}

impl Settings {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Duration of one simulation step
    pub fn step(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub settings: Settings,
    /// Run the standalone network check instead of the game
    pub net_test: bool,
}

impl Launch {
    /// Parse arguments (without the program name).
    ///
    /// `--host` hosts, a bare hostname joins that host, `--config <file>` loads
    /// JSON settings, `--net-test` runs the network check. Command-line mode
    /// wins over the mode in a config file.
    pub fn from_args<I, S>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut settings: Option<Settings> = None;
        let mut host = false;
        let mut hostname: Option<String> = None;
        let mut net_test = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" => host = true,
                "--net-test" => net_test = true,
                "--config" => {
                    let path = args.next().ok_or_else(|| SettingsError::MissingValue {
                        flag: arg.clone(),
                    })?;
                    settings = Some(Settings::load(path)?);
                }
                flag if flag.starts_with("--") => log::warn!("Ignoring unknown flag {flag}"),
                _ => hostname = Some(arg),
            }
        }

        let mut settings = settings.unwrap_or_default();
        if let Some(hostname) = hostname {
            settings.mode = GameMode::Guest { hostname };
        } else if host {
            settings.mode = GameMode::Host;
        }

        Ok(Self { settings, net_test })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_playground() {
        let settings = Settings::default();
        assert_eq!((settings.arena_width, settings.arena_height), (800, 600));
        assert_eq!(settings.net.server_port, 4242);
        assert_eq!(settings.net.client_port, 4241);
        assert_eq!(settings.net.recv_timeout(), Duration::from_secs(5));
        assert_eq!(settings.net.handshake_attempts, 10);
    }

    #[test]
    fn test_no_args_is_local() {
        let launch = Launch::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(launch.settings.mode, GameMode::Local);
        assert!(!launch.net_test);
    }

    #[test]
    fn test_host_and_guest_args() {
        let launch = Launch::from_args(["--host"]).unwrap();
        assert_eq!(launch.settings.mode, GameMode::Host);

        let launch = Launch::from_args(["example.org"]).unwrap();
        assert_eq!(
            launch.settings.mode,
            GameMode::Guest {
                hostname: "example.org".into()
            }
        );
        assert_eq!(launch.settings.mode.role(), Some(Role::Guest));

        let launch = Launch::from_args(["--net-test", "--bogus"]).unwrap();
        assert!(launch.net_test);
        assert_eq!(launch.settings.mode, GameMode::Local);
    }

    #[test]
    fn test_config_needs_value() {
        let err = Launch::from_args(["--config"]).unwrap_err();
        assert!(matches!(err, SettingsError::MissingValue { .. }));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"arena_width": 640, "mode": {"kind": "host"}}"#).unwrap();
        assert_eq!(settings.arena_width, 640);
        assert_eq!(settings.arena_height, 600);
        assert_eq!(settings.mode, GameMode::Host);
        assert_eq!(settings.blocks, BlockLayout::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("b-out-settings-{}.json", std::process::id()));
        let settings = Settings {
            seed: 42,
            mode: GameMode::Guest {
                hostname: "localhost".into(),
            },
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_step() {
        let settings = Settings {
            frame_rate: 50,
            ..Settings::default()
        };
        assert_eq!(settings.step(), Duration::from_millis(20));
    }
}
