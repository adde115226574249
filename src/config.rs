/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// A file that exists but cannot be read or parsed is reported through
/// `ConfigError` alongside the defaults, so the caller can log it once
/// logging is up.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub effects: EffectsConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_cadence: u32,  // ticks between player steps
    pub ghost_cadence: u32,   // ticks between ghost steps
}

#[derive(Clone, Debug)]
pub struct EffectsConfig {
    pub pool_capacity: usize,
    pub max_particles: usize,
    pub min_particles: usize,
    pub slow_frame_ms: f32,
    pub fast_frame_ms: f32,
    pub audit_interval: u64,  // ticks between density audits
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub avatar: String,
    pub score_file: String,
    pub log_file: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    effects: TomlEffects,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_cadence")]
    player_cadence: u32,
    #[serde(default = "default_ghost_cadence")]
    ghost_cadence: u32,
}

#[derive(Deserialize, Debug)]
struct TomlEffects {
    #[serde(default = "default_pool_capacity")]
    pool_capacity: usize,
    #[serde(default = "default_max_particles")]
    max_particles: usize,
    #[serde(default = "default_min_particles")]
    min_particles: usize,
    #[serde(default = "default_slow_frame")]
    slow_frame_ms: f32,
    #[serde(default = "default_fast_frame")]
    fast_frame_ms: f32,
    #[serde(default = "default_audit_interval")]
    audit_interval: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_avatar")]
    avatar: String,
    #[serde(default = "default_score_file")]
    score_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }      // ~60 ticks/s
fn default_player_cadence() -> u32 { 8 }
fn default_ghost_cadence() -> u32 { 12 }

fn default_pool_capacity() -> usize { 50 }
fn default_max_particles() -> usize { 150 }
fn default_min_particles() -> usize { 50 }
fn default_slow_frame() -> f32 { 20.0 }
fn default_fast_frame() -> f32 { 12.0 }
fn default_audit_interval() -> u64 { 300 }

fn default_pad_restart() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_avatar() -> String { "avatar.txt".into() }
fn default_score_file() -> String { "highscore.dat".into() }
fn default_log_file() -> String { "mazechase.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_cadence: default_player_cadence(),
            ghost_cadence: default_ghost_cadence(),
        }
    }
}

impl Default for TomlEffects {
    fn default() -> Self {
        TomlEffects {
            pool_capacity: default_pool_capacity(),
            max_particles: default_max_particles(),
            min_particles: default_min_particles(),
            slow_frame_ms: default_slow_frame(),
            fast_frame_ms: default_fast_frame(),
            audit_interval: default_audit_interval(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            avatar: default_avatar(),
            score_file: default_score_file(),
            log_file: default_log_file(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        TomlSpeed::default().into()
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        TomlEffects::default().into()
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        TomlGamepad::default().into()
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        TomlGeneral::default().into()
    }
}

// ── Schema → public ──

impl From<TomlSpeed> for SpeedConfig {
    fn from(t: TomlSpeed) -> Self {
        SpeedConfig {
            tick_rate_ms: t.tick_rate_ms.max(1),
            player_cadence: t.player_cadence.max(1),
            ghost_cadence: t.ghost_cadence.max(1),
        }
    }
}

impl From<TomlEffects> for EffectsConfig {
    fn from(t: TomlEffects) -> Self {
        EffectsConfig {
            pool_capacity: t.pool_capacity,
            max_particles: t.max_particles.max(t.min_particles),
            min_particles: t.min_particles,
            slow_frame_ms: t.slow_frame_ms,
            fast_frame_ms: t.fast_frame_ms,
            audit_interval: t.audit_interval.max(1),
        }
    }
}

impl From<TomlGamepad> for GamepadConfig {
    fn from(t: TomlGamepad) -> Self {
        GamepadConfig { restart: t.restart, quit: t.quit }
    }
}

impl From<TomlGeneral> for GeneralConfig {
    fn from(t: TomlGeneral) -> Self {
        GeneralConfig { avatar: t.avatar, score_file: t.score_file, log_file: t.log_file }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            speed: t.speed.into(),
            effects: t.effects.into(),
            gamepad: t.gamepad.into(),
            general: t.general.into(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, XDG data home, system data dir.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> (Self, Option<ConfigError>) {
        match load_toml(&candidate_dirs()) {
            Ok(cfg) => (cfg, None),
            Err(e) => (GameConfig::default(), Some(e)),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(cfg.into())
    }

    /// Resolve a data file (avatar, etc.) against the search directories.
    pub fn find_data_file(name: &str) -> Option<PathBuf> {
        let p = PathBuf::from(name);
        if p.is_absolute() {
            return p.is_file().then_some(p);
        }
        candidate_dirs().into_iter().map(|d| d.join(name)).find(|p| p.is_file())
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed link still finds data next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/mazechase)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/mazechase");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found wins; none found means defaults.
fn load_toml(search_dirs: &[PathBuf]) -> Result<GameConfig, ConfigError> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            return GameConfig::from_toml_str(&text);
        }
    }
    Ok(GameConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.speed.player_cadence, 8);
        assert_eq!(cfg.speed.ghost_cadence, 12);
        assert_eq!(cfg.effects.pool_capacity, 50);
        assert_eq!(cfg.effects.max_particles, 150);
        assert_eq!(cfg.effects.audit_interval, 300);
        assert_eq!(cfg.general.score_file, "highscore.dat");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str("[speed]\nghost_cadence = 6\n").unwrap();
        assert_eq!(cfg.speed.ghost_cadence, 6);
        assert_eq!(cfg.speed.player_cadence, 8);
        assert_eq!(cfg.effects.min_particles, 50);
    }

    #[test]
    fn zero_cadence_is_clamped() {
        let cfg = GameConfig::from_toml_str("[speed]\nplayer_cadence = 0\n").unwrap();
        assert_eq!(cfg.speed.player_cadence, 1);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[speed\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_dirs_give_defaults() {
        let cfg = load_toml(&[PathBuf::from("/nonexistent/mazechase")]).unwrap();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
    }
}
