//! Runtime settings for the terminal binary.
//!
//! Layers, later wins:
//! 1. [`GameConfig`] defaults
//! 2. a JSON file (`--config <path>` or `MERGE_FALL_CONFIG`), partial allowed
//! 3. `MERGE_FALL_*` environment variables
//! 4. `--width`, `--height`, `--seed` flags
//!
//! Values that are present but do not parse are errors.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use crate::core::GameConfig;

pub const ENV_CONFIG: &str = "MERGE_FALL_CONFIG";
pub const ENV_WIDTH: &str = "MERGE_FALL_WIDTH";
pub const ENV_HEIGHT: &str = "MERGE_FALL_HEIGHT";
pub const ENV_SEED: &str = "MERGE_FALL_SEED";
pub const ENV_FAST_DELAY_MS: &str = "MERGE_FALL_FAST_DELAY_MS";
pub const ENV_SWIPE_CELLS: &str = "MERGE_FALL_SWIPE_CELLS";

/// Mouse drag distance, in terminal cells, that counts as a swipe
pub const DEFAULT_SWIPE_CELLS: i32 = 2;

pub const USAGE: &str = "\
usage: merge-fall [--config <path>] [--width <n>] [--height <n>] [--seed <n>] [--print-config]

keys: left/right slide, down or space drop, p pause, r restart, enter start, q quit
env:  MERGE_FALL_CONFIG, MERGE_FALL_WIDTH, MERGE_FALL_HEIGHT, MERGE_FALL_SEED,
      MERGE_FALL_FAST_DELAY_MS, MERGE_FALL_SWIPE_CELLS, RUST_LOG";

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub width: Option<u8>,
    pub height: Option<u8>,
    pub seed: Option<u32>,
    pub help: bool,
    /// Print the resolved settings as JSON and exit
    pub print_config: bool,
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => cli.help = true,
            "--print-config" => cli.print_config = true,
            "--config" => {
                cli.config_path = Some(PathBuf::from(flag_value(args, i, flag)?));
                i += 1;
            }
            "--width" => {
                cli.width = Some(parse_flag(args, i, flag)?);
                i += 1;
            }
            "--height" => {
                cli.height = Some(parse_flag(args, i, flag)?);
                i += 1;
            }
            "--seed" => {
                cli.seed = Some(parse_flag(args, i, flag)?);
                i += 1;
            }
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(cli)
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn parse_flag<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    let v = flag_value(args, i, flag)?;
    v.parse()
        .map_err(|_| anyhow!("invalid {} value: {}", flag, v))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub game: GameConfig,
    pub swipe_cells: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            swipe_cells: DEFAULT_SWIPE_CELLS,
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment and `cli`.
    pub fn from_env(cli: &CliArgs) -> Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Resolve settings with `env` standing in for the environment.
    pub fn resolve(cli: &CliArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Settings::default();

        let file = cli
            .config_path
            .clone()
            .or_else(|| non_empty(env(ENV_CONFIG)).map(PathBuf::from));
        if let Some(path) = file {
            settings.game = load_config_file(&path)?;
        }

        if let Some(width) = env_value(&env, ENV_WIDTH)? {
            settings.game.width = width;
        }
        if let Some(height) = env_value(&env, ENV_HEIGHT)? {
            settings.game.height = height;
        }
        if let Some(seed) = env_value(&env, ENV_SEED)? {
            settings.game.seed = seed;
        }
        if let Some(delay) = env_value(&env, ENV_FAST_DELAY_MS)? {
            settings.game.fast_delay_ms = delay;
        }
        if let Some(cells) = env_value(&env, ENV_SWIPE_CELLS)? {
            settings.swipe_cells = cells;
        }

        if let Some(width) = cli.width {
            settings.game.width = width;
        }
        if let Some(height) = cli.height {
            settings.game.height = height;
        }
        if let Some(seed) = cli.seed {
            settings.game.seed = seed;
        }

        settings
            .game
            .validate()
            .context("invalid game configuration")?;
        if settings.swipe_cells < 1 {
            return Err(anyhow!("{} must be at least 1", ENV_SWIPE_CELLS));
        }
        Ok(settings)
    }
}

/// Read a (possibly partial) JSON [`GameConfig`].
pub fn load_config_file(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_value<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match non_empty(env(key)) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{}: invalid value: {}", key, raw)),
    }
}
