//! Game settings and tunables
//!
//! Everything a level designer can tweak lives here. Persisted as JSON; any
//! field missing from the file keeps its default.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors from loading, saving or validating settings
#[derive(Debug)]
pub enum SettingsError {
    /// Standard I/O error
    Io(std::io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {e}"),
            SettingsError::Json(e) => write!(f, "JSON error: {e}"),
            SettingsError::Invalid(msg) => write!(f, "Invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// Session timing and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Length of one play-through (seconds)
    pub game_duration_secs: f32,
    /// Time between target spawns (seconds)
    pub spawn_interval_secs: f32,
    /// Unhit targets disappear after this long (seconds)
    pub target_lifetime_secs: f32,
    /// Points awarded per target hit
    pub score_per_hit: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            game_duration_secs: DEFAULT_GAME_DURATION_SECS,
            spawn_interval_secs: DEFAULT_SPAWN_INTERVAL_SECS,
            target_lifetime_secs: DEFAULT_TARGET_LIFETIME_SECS,
            score_per_hit: DEFAULT_SCORE_PER_HIT,
        }
    }
}

/// Axis-aligned box that targets spawn inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnVolume {
    pub center: Vec3,
    /// Full extents; a zero axis pins targets to the center on that axis
    pub size: Vec3,
}

impl Default for SpawnVolume {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 1.2, 2.0),
            size: Vec3::new(2.0, 0.0, 2.0),
        }
    }
}

/// Shape and color handed to the presentation layer for each target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub diameter: f32,
    pub thickness: f32,
    /// RGBA
    pub color: [f32; 4],
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            diameter: TARGET_DIAMETER,
            thickness: TARGET_THICKNESS,
            color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A fixed pose where a prop spawns and returns to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
}

impl Anchor {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// One nested part of a prop template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartTemplate {
    pub name: String,
    /// Authored activation state (may be off; populate forces it on)
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether this part carries a grab handle
    #[serde(default = "default_true")]
    pub grabbable: bool,
}

fn default_true() -> bool {
    true
}

/// A throwable prop blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropTemplate {
    pub name: String,
    /// Flat list of nested parts; the first entry is the root
    pub parts: Vec<PartTemplate>,
}

impl PropTemplate {
    /// Single-part template with a grabbable root
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            parts: vec![PartTemplate {
                name: format!("{name}_root"),
                active: true,
                grabbable: true,
            }],
            name,
        }
    }
}

/// What happens when a prop that hit a target comes back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RespawnMode {
    /// Re-enable parts and grab handles, teleport to the anchor
    #[default]
    RestoreInPlace,
    /// Destroy the prop and have the spawner build a fresh one at the anchor
    Recreate,
}

/// Per-prop respawn tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnSettings {
    /// Falling below this height schedules a reset
    pub fall_y: f32,
    /// Stabilization delay before teleporting (seconds)
    pub respawn_delay_secs: f32,
    /// Watch height every tick
    pub auto_respawn: bool,
    pub mode: RespawnMode,
}

impl Default for RespawnSettings {
    fn default() -> Self {
        Self {
            fall_y: DEFAULT_FALL_Y,
            respawn_delay_secs: DEFAULT_RESPAWN_DELAY_SECS,
            auto_respawn: true,
            mode: RespawnMode::RestoreInPlace,
        }
    }
}

/// Prop spawner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropSettings {
    /// Props spawned per populate (capped by anchor count)
    pub count: usize,
    /// Populate once shortly after the world is created
    pub spawn_on_start: bool,
    pub spawn_delay_secs: f32,
    pub anchors: Vec<Anchor>,
    pub templates: Vec<PropTemplate>,
    pub respawn: RespawnSettings,
}

impl Default for PropSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_PROP_COUNT,
            spawn_on_start: true,
            spawn_delay_secs: DEFAULT_SPAWN_DELAY_SECS,
            anchors: vec![
                Anchor::new("table_left", Vec3::new(-0.3, 0.9, 0.4)),
                Anchor::new("table_center", Vec3::new(0.0, 0.9, 0.4)),
                Anchor::new("table_right", Vec3::new(0.3, 0.9, 0.4)),
            ],
            templates: vec![
                PropTemplate::simple("ball"),
                PropTemplate::simple("cube"),
                PropTemplate {
                    name: "dart".to_string(),
                    parts: vec![
                        PartTemplate {
                            name: "dart_body".to_string(),
                            active: true,
                            grabbable: true,
                        },
                        PartTemplate {
                            name: "dart_tip".to_string(),
                            active: false,
                            grabbable: false,
                        },
                    ],
                },
            ],
            respawn: RespawnSettings::default(),
        }
    }
}

/// Target break effect tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakEffectSettings {
    pub piece_count: u32,
    pub explosion_force: f32,
    pub explosion_radius: f32,
    pub piece_lifetime_secs: f32,
    /// Extra time after the pieces expire before the target record is removed
    pub removal_margin_secs: f32,
}

impl Default for BreakEffectSettings {
    fn default() -> Self {
        Self {
            piece_count: BREAK_PIECE_COUNT,
            explosion_force: BREAK_EXPLOSION_FORCE,
            explosion_radius: BREAK_EXPLOSION_RADIUS,
            piece_lifetime_secs: BREAK_PIECE_LIFETIME_SECS,
            removal_margin_secs: BREAK_REMOVAL_MARGIN_SECS,
        }
    }
}

impl BreakEffectSettings {
    /// Delay between a hit and final removal of the target
    pub fn removal_grace_secs(&self) -> f32 {
        self.piece_lifetime_secs + self.removal_margin_secs
    }
}

/// Audio levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// All game tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for reproducibility
    pub seed: u64,
    pub session: SessionSettings,
    /// Target spawn area; targets are not spawned without one
    pub spawn_area: Option<SpawnVolume>,
    pub target: TargetSettings,
    pub props: PropSettings,
    pub break_effect: BreakEffectSettings,
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x7a26_e7a6,
            session: SessionSettings::default(),
            spawn_area: Some(SpawnVolume::default()),
            target: TargetSettings::default(),
            props: PropSettings::default(),
            break_effect: BreakEffectSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let s = &self.session;
        positive("session.game_duration_secs", s.game_duration_secs)?;
        positive("session.spawn_interval_secs", s.spawn_interval_secs)?;
        if crate::secs_to_ticks(s.spawn_interval_secs) == 0 {
            return Err(invalid(&format!(
                "session.spawn_interval_secs must span at least one tick (got {})",
                s.spawn_interval_secs
            )));
        }
        positive("session.target_lifetime_secs", s.target_lifetime_secs)?;

        if let Some(area) = &self.spawn_area {
            if !area.center.is_finite() || !area.size.is_finite() {
                return Err(invalid("spawn_area must be finite"));
            }
            if area.size.min_element() < 0.0 {
                return Err(invalid("spawn_area.size must not be negative"));
            }
        }

        non_negative("props.spawn_delay_secs", self.props.spawn_delay_secs)?;
        non_negative(
            "props.respawn.respawn_delay_secs",
            self.props.respawn.respawn_delay_secs,
        )?;
        if !self.props.respawn.fall_y.is_finite() {
            return Err(invalid("props.respawn.fall_y must be finite"));
        }
        for template in &self.props.templates {
            if template.parts.is_empty() {
                return Err(invalid(&format!(
                    "prop template '{}' has no parts",
                    template.name
                )));
            }
        }
        for anchor in &self.props.anchors {
            if !anchor.position.is_finite() {
                return Err(invalid(&format!("anchor '{}' is not finite", anchor.name)));
            }
        }

        let b = &self.break_effect;
        non_negative("break_effect.piece_lifetime_secs", b.piece_lifetime_secs)?;
        non_negative("break_effect.removal_margin_secs", b.removal_margin_secs)?;
        non_negative("break_effect.explosion_radius", b.explosion_radius)?;

        for (name, vol) in [
            ("audio.master_volume", self.audio.master_volume),
            ("audio.sfx_volume", self.audio.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&vol) {
                return Err(invalid(&format!("{name} must be within 0.0..=1.0")));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> SettingsError {
    SettingsError::Invalid(msg.to_string())
}

fn positive(name: &str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{name} must be > 0 (got {value})")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{name} must be >= 0 (got {value})")))
    }
}
