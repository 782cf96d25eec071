//! Target Range - A VR target-smashing minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session, targets, props, scheduler)
//! - `settings`: Data-driven tunables loaded from JSON
//! - `hud`: Timer/score/game-over text bindings
//! - `effects`: Sound and particle playback facade
//! - `launcher`: Start/stop button and panel swapping
//! - `app`: Fixed-timestep host tying it all together

pub mod app;
pub mod effects;
pub mod hud;
pub mod launcher;
pub mod settings;
pub mod sim;

pub use app::MiniGame;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the host will accumulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Countdown resolution (seconds per countdown step)
    pub const COUNTDOWN_STEP_SECS: f32 = 1.0;

    /// Session defaults
    pub const DEFAULT_GAME_DURATION_SECS: f32 = 30.0;
    pub const DEFAULT_SPAWN_INTERVAL_SECS: f32 = 2.0;
    pub const DEFAULT_TARGET_LIFETIME_SECS: f32 = 5.0;
    pub const DEFAULT_SCORE_PER_HIT: u32 = 10;

    /// Target shape defaults
    pub const TARGET_DIAMETER: f32 = 0.3;
    pub const TARGET_THICKNESS: f32 = 0.1;

    /// Prop defaults
    pub const DEFAULT_PROP_COUNT: usize = 3;
    pub const DEFAULT_SPAWN_DELAY_SECS: f32 = 1.0;
    pub const DEFAULT_FALL_Y: f32 = -1.0;
    pub const DEFAULT_RESPAWN_DELAY_SECS: f32 = 0.15;

    /// Break effect defaults
    pub const BREAK_PIECE_COUNT: u32 = 5;
    pub const BREAK_EXPLOSION_FORCE: f32 = 5.0;
    pub const BREAK_EXPLOSION_RADIUS: f32 = 2.0;
    pub const BREAK_PIECE_LIFETIME_SECS: f32 = 3.0;
    pub const BREAK_REMOVAL_MARGIN_SECS: f32 = 1.0;
    /// Debris pieces appear within this distance of the target center
    pub const BREAK_SCATTER_RADIUS: f32 = 0.5;
    pub const BREAK_PIECE_MIN_SCALE: f32 = 0.1;
    pub const BREAK_PIECE_MAX_SCALE: f32 = 0.3;
    /// Gravity applied to debris (m/s²)
    pub const DEBRIS_GRAVITY: f32 = 9.81;
}

/// Convert a duration in seconds to whole simulation ticks (rounded, never negative)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs / consts::SIM_DT).round() as u64
}

/// Format remaining seconds as `MM:SS` (negative time shows as 00:00)
pub fn format_timer(remaining_secs: f32) -> String {
    let secs = remaining_secs.max(0.0);
    let minutes = (secs / 60.0).floor() as u32;
    let seconds = (secs % 60.0).floor() as u32;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format a score for the HUD
pub fn format_score(score: u32) -> String {
    format!("Score: {}", score)
}

/// Format the game-over banner
pub fn format_game_over(final_score: u32) -> String {
    format!(
        "Game Over!\nFinal Score: {}\n\nPress the button to restart",
        final_score
    )
}
