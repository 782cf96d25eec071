//! Sound and particle playback
//!
//! The engine supplies the actual backend. Without one, effects are skipped;
//! playback failures are logged and never reach gameplay.

use glam::Vec3;

use crate::settings::AudioSettings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Target shatters
    TargetBreak,
    /// Session started
    GameStart,
    /// Session over
    GameOver,
}

/// Particle effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleEffect {
    /// Burst where a target was hit
    TargetHit,
}

/// Why an effect did not play
#[derive(Debug, Clone, PartialEq)]
pub enum EffectError {
    /// The clip or emitter is not available
    Unavailable(String),
    /// The backend failed while playing
    Playback(String),
}

impl std::fmt::Display for EffectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectError::Unavailable(what) => write!(f, "effect unavailable: {what}"),
            EffectError::Playback(msg) => write!(f, "playback failed: {msg}"),
        }
    }
}

impl std::error::Error for EffectError {}

/// Engine side of effect playback
pub trait EffectBackend {
    fn play_sound(
        &mut self,
        effect: SoundEffect,
        position: Option<Vec3>,
        volume: f32,
    ) -> Result<(), EffectError>;

    fn play_particles(
        &mut self,
        effect: ParticleEffect,
        position: Vec3,
    ) -> Result<(), EffectError>;
}

/// Effect manager for the game
pub struct EffectPlayer {
    backend: Option<Box<dyn EffectBackend>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for EffectPlayer {
    fn default() -> Self {
        Self::new(None, &AudioSettings::default())
    }
}

impl EffectPlayer {
    pub fn new(backend: Option<Box<dyn EffectBackend>>, audio: &AudioSettings) -> Self {
        if backend.is_none() {
            log::warn!("No effect backend - sound and particles disabled");
        }
        Self {
            backend,
            master_volume: audio.master_volume.clamp(0.0, 1.0),
            sfx_volume: audio.sfx_volume.clamp(0.0, 1.0),
            muted: audio.muted,
        }
    }

    /// Install or replace the backend
    pub fn set_backend(&mut self, backend: Box<dyn EffectBackend>) {
        self.backend = Some(backend);
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect, optionally positioned in the world
    pub fn play(&mut self, effect: SoundEffect, position: Option<Vec3>) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            log::debug!("Sound {:?} skipped - no backend", effect);
            return;
        };
        if let Err(e) = backend.play_sound(effect, position, vol) {
            log::error!("Sound {:?} failed: {}", effect, e);
        }
    }

    /// Play a particle burst (independent of volume)
    pub fn play_particles(&mut self, effect: ParticleEffect, position: Vec3) {
        let Some(backend) = self.backend.as_mut() else {
            log::warn!("Particles {:?} skipped - no backend", effect);
            return;
        };
        if let Err(e) = backend.play_particles(effect, position) {
            log::error!("Particles {:?} failed: {}", effect, e);
        }
    }
}
