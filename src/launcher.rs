//! Launcher: the pressable control that starts and stops the minigame
//!
//! Swaps between a start panel and an in-game panel. The toggle decision is
//! read from the session itself, so a session that timed out is restarted by
//! the next press.

use crate::sim::{EndReason, GameState, end_session, start_session};

/// Interaction state reported by the engine for the control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractableState {
    #[default]
    Normal,
    Hover,
    /// Pressed / selected
    Select,
    Disabled,
}

/// A UI panel owned by the engine
pub trait Panel {
    fn set_visible(&mut self, visible: bool);
}

/// What a press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherAction {
    Started,
    Stopped,
    /// Press arrived but the session refused the transition
    Ignored,
}

#[derive(Default)]
pub struct Launcher {
    start_panel: Option<Box<dyn Panel>>,
    game_panel: Option<Box<dyn Panel>>,
    last_state: InteractableState,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_panel(mut self, panel: impl Panel + 'static) -> Self {
        self.start_panel = Some(Box::new(panel));
        self
    }

    pub fn with_game_panel(mut self, panel: impl Panel + 'static) -> Self {
        self.game_panel = Some(Box::new(panel));
        self
    }

    /// Initial layout: start panel up, game panel down
    pub fn init(&mut self) {
        self.show_panels(false);
    }

    /// Engine callback; entering `Select` counts as one press
    pub fn on_state_changed(
        &mut self,
        new_state: InteractableState,
        game: &mut GameState,
    ) -> Option<LauncherAction> {
        let previous = std::mem::replace(&mut self.last_state, new_state);
        if new_state == InteractableState::Select && previous != InteractableState::Select {
            Some(self.press(game))
        } else {
            None
        }
    }

    /// Toggle: stop an active session, otherwise start one
    pub fn press(&mut self, game: &mut GameState) -> LauncherAction {
        if game.session.is_active() {
            self.stop(game)
        } else {
            self.start(game)
        }
    }

    pub fn start(&mut self, game: &mut GameState) -> LauncherAction {
        if !start_session(game) {
            return LauncherAction::Ignored;
        }
        log::info!("Minigame started from launcher");
        self.show_panels(true);
        LauncherAction::Started
    }

    pub fn stop(&mut self, game: &mut GameState) -> LauncherAction {
        if !end_session(game, EndReason::Manual) {
            return LauncherAction::Ignored;
        }
        log::info!("Minigame stopped from launcher");
        self.show_panels(false);
        LauncherAction::Stopped
    }

    fn show_panels(&mut self, in_game: bool) {
        match self.start_panel.as_mut() {
            Some(panel) => panel.set_visible(!in_game),
            None => log::warn!("Start panel not bound"),
        }
        match self.game_panel.as_mut() {
            Some(panel) => panel.set_visible(in_game),
            None => log::warn!("Game panel not bound"),
        }
    }
}
