//! Host-side game instance
//!
//! Owns the simulation and its engine-facing collaborators, steps the
//! simulation at a fixed rate and turns the event stream into HUD writes,
//! sounds and particles.

use glam::Vec3;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::effects::{EffectPlayer, ParticleEffect, SoundEffect};
use crate::hud::Hud;
use crate::launcher::{InteractableState, Launcher, LauncherAction};
use crate::settings::Settings;
use crate::sim::{Contact, GameEvent, GameState, PropMotion, TickInput, tick};

/// Game instance holding all state
pub struct MiniGame {
    pub state: GameState,
    pub launcher: Launcher,
    pub hud: Hud,
    pub effects: EffectPlayer,
    /// Input gathered since the last substep
    pub input: TickInput,
    accumulator: f32,
}

impl MiniGame {
    pub fn new(settings: Settings) -> Self {
        let effects = EffectPlayer::new(None, &settings.audio);
        Self::with_parts(settings, Launcher::new(), Hud::new(), effects)
    }

    /// Build with engine bindings already wired
    pub fn with_parts(
        settings: Settings,
        mut launcher: Launcher,
        hud: Hud,
        effects: EffectPlayer,
    ) -> Self {
        let state = GameState::new(settings);
        log::info!("Minigame initialized with seed: {}", state.seed);
        launcher.init();
        Self {
            state,
            launcher,
            hud,
            effects,
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Launcher pressed (toggle start/stop)
    pub fn press_launcher(&mut self) -> LauncherAction {
        let action = self.launcher.press(&mut self.state);
        self.dispatch_events();
        action
    }

    /// Launcher interaction state changed
    pub fn on_interaction(&mut self, new_state: InteractableState) -> Option<LauncherAction> {
        let action = self.launcher.on_state_changed(new_state, &mut self.state);
        if action.is_some() {
            self.dispatch_events();
        }
        action
    }

    /// Queue a contact for the next substep
    pub fn push_contact(&mut self, contact: Contact) {
        self.input.contacts.push(contact);
    }

    /// Queue a prop pose for the next substep
    pub fn push_motion(&mut self, motion: PropMotion) {
        self.input.prop_motion.push(motion);
    }

    /// Advance by one rendered frame; returns the number of substeps run
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Contacts and poses are one-shot
            self.input.clear();
        }

        self.dispatch_events();
        substeps
    }

    pub fn score(&self) -> u32 {
        self.state.session.score
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::SessionStarted { .. } => {
                    self.hud.hide_game_over();
                    self.hud.refresh(&self.state.session);
                    self.effects.play(SoundEffect::GameStart, None);
                }
                GameEvent::CountdownTicked { .. } | GameEvent::ScoreChanged { .. } => {
                    self.hud.refresh(&self.state.session);
                }
                GameEvent::SessionEnded { final_score, .. } => {
                    self.hud.refresh(&self.state.session);
                    self.hud.show_game_over(final_score);
                    self.effects.play(SoundEffect::GameOver, None);
                }
                GameEvent::TargetBroken { position, .. } => {
                    self.effects.play(SoundEffect::TargetBreak, Some(position));
                    self.effects
                        .play_particles(ParticleEffect::TargetHit, position);
                }
                GameEvent::PropSpawned { id, .. } => {
                    let pos = self.state.prop(id).map_or(Vec3::ZERO, |p| p.position);
                    log::debug!("Prop {} at {:?}", id, pos);
                }
                _ => {}
            }
        }
    }
}
