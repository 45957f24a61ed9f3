//! Application-level configuration loading: feature switch, command vocabulary and game settings.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::validation::validate_command_token,
    error::ConfigError,
    state::{game::GuessRange, store::LobbyDefaults},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/digital_bomb.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DIGITAL_BOMB_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    enabled: bool,
    commands: CommandSet,
    settings: GameSettings,
}

impl AppConfig {
    /// Load the configuration from disk.
    ///
    /// Any failure disables the game instead of aborting: the bridge stays up and
    /// every inbound event is reported as unhandled.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match Self::load_from(&path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    enabled = config.enabled,
                    main = %config.commands.main,
                    min_players = config.settings.min_players,
                    range = %config.settings.range,
                    "loaded digital bomb config"
                );
                config
            }
            Err(err @ ConfigError::NotFound { .. }) => {
                warn!(error = %err, "digital bomb disabled");
                Self::disabled()
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "digital bomb disabled");
                Self::disabled()
            }
        }
    }

    /// Read, parse and validate the configuration file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        raw.validate()?;
        Ok(raw.into())
    }

    /// Configuration with the game switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether inbound events should be processed at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Command vocabulary.
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Game rules.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}

impl Default for AppConfig {
    /// Enabled configuration using the built-in vocabulary and settings.
    fn default() -> Self {
        Self {
            enabled: true,
            commands: CommandSet::default(),
            settings: GameSettings::default(),
        }
    }
}

/// Literal tokens recognised in chat messages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandSet {
    /// Trigger word that must open every command.
    pub main: String,
    /// Subcommand joining the lobby.
    pub signup: String,
    /// Subcommand starting the game.
    pub start: String,
    /// Subcommand ending the game.
    pub end: String,
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            main: "bomb".into(),
            signup: "join".into(),
            start: "start".into(),
            end: "end".into(),
        }
    }
}

impl CommandSet {
    /// Full "main start" hint shown to players after they sign up.
    pub fn start_hint(&self) -> String {
        format!("{} {}", self.main, self.start)
    }
}

impl Validate for CommandSet {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, token) in [
            ("main", &self.main),
            ("signup", &self.signup),
            ("start", &self.start),
            ("end", &self.end),
        ] {
            if let Err(e) = validate_command_token(token) {
                errors.add(field, e);
            }
        }

        let subcommands = [&self.signup, &self.start, &self.end];
        let distinct = subcommands
            .iter()
            .enumerate()
            .all(|(i, token)| !subcommands[..i].contains(token));
        if !distinct {
            let mut err = ValidationError::new("subcommands_not_distinct");
            err.message = Some("signup, start and end subcommands must differ".into());
            errors.add("__all__", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Rules applied to every new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    /// Players required before a game can start.
    pub min_players: usize,
    /// Range the bomb is drawn from.
    pub range: GuessRange,
    /// Fixed RNG seed for reproducible games; `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl GameSettings {
    /// Defaults handed to the store when it creates a lobby.
    pub fn lobby_defaults(&self) -> LobbyDefaults {
        LobbyDefaults {
            range: self.range,
            min_players: self.min_players,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_players: 2,
            range: GuessRange::new(1, 100),
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    basic: RawBasic,
    #[validate(nested)]
    commands: CommandSet,
    #[validate(nested)]
    game_settings: RawGameSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBasic {
    enable: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_bounds"))]
struct RawGameSettings {
    #[validate(range(min = 1))]
    min_players: usize,
    min_range: i64,
    max_range: i64,
    seed: Option<u64>,
}

impl Default for RawGameSettings {
    fn default() -> Self {
        let defaults = GameSettings::default();
        Self {
            min_players: defaults.min_players,
            min_range: defaults.range.min,
            max_range: defaults.range.max,
            seed: defaults.seed,
        }
    }
}

fn validate_bounds(settings: &RawGameSettings) -> Result<(), ValidationError> {
    if settings.min_range > settings.max_range {
        let mut err = ValidationError::new("range_inverted");
        err.message = Some(
            format!(
                "min_range ({}) must not exceed max_range ({})",
                settings.min_range, settings.max_range
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            enabled: value.basic.enable,
            commands: value.commands,
            settings: GameSettings {
                min_players: value.game_settings.min_players,
                range: GuessRange::new(
                    value.game_settings.min_range,
                    value.game_settings.max_range,
                ),
                seed: value.game_settings.seed,
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
