use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub remote: RemoteSettings,
    pub ui: UiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player: PlayerSettings::default(),
            remote: RemoteSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Initial volume, 0-100.
    pub volume: u8,
    /// Progress poll interval for the remote backend (milliseconds).
    /// Only ticks while the remote player reports a playing state.
    pub poll_interval_ms: u64,
    /// Volume change per `+`/`-` keypress, in percentage points.
    pub volume_step: u8,
    /// Seek-bar movement per arrow keypress while scrubbing, in percent.
    pub scrub_step_percent: u8,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            volume: 100,
            poll_interval_ms: 500,
            volume_step: 5,
            scrub_step_percent: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// MPD host, used only when the playlist consists of remote URIs.
    pub host: String,
    pub port: u16,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ encore: one more tune ~ ".to_string(),
        }
    }
}
