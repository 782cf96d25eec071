//! Target Range entry point
//!
//! Runs a headless session on the console: presses the launcher, throws
//! props at whatever target is armed and drops one prop off the range to
//! show the respawn path.

#[cfg(not(target_arch = "wasm32"))]
mod console {
    use glam::Vec3;
    use target_range::effects::{EffectBackend, EffectError, ParticleEffect, SoundEffect};
    use target_range::hud::TextTarget;
    use target_range::launcher::Panel;

    /// Text widget that logs what it is told
    pub struct ConsoleText(pub &'static str);

    impl TextTarget for ConsoleText {
        fn set_text(&mut self, text: &str) {
            log::info!("[{}] {}", self.0, text.replace('\n', " | "));
        }

        fn set_visible(&mut self, visible: bool) {
            log::debug!("[{}] visible={}", self.0, visible);
        }
    }

    pub struct ConsolePanel(pub &'static str);

    impl Panel for ConsolePanel {
        fn set_visible(&mut self, visible: bool) {
            log::info!("Panel '{}' {}", self.0, if visible { "shown" } else { "hidden" });
        }
    }

    pub struct ConsoleEffects;

    impl EffectBackend for ConsoleEffects {
        fn play_sound(
            &mut self,
            effect: SoundEffect,
            position: Option<Vec3>,
            volume: f32,
        ) -> Result<(), EffectError> {
            log::info!("Sound {:?} at {:?} (vol {:.2})", effect, position, volume);
            Ok(())
        }

        fn play_particles(
            &mut self,
            effect: ParticleEffect,
            position: Vec3,
        ) -> Result<(), EffectError> {
            log::info!("Particles {:?} at {:?}", effect, position);
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec3;
    use target_range::effects::EffectPlayer;
    use target_range::hud::Hud;
    use target_range::launcher::Launcher;
    use target_range::sim::{Contact, PropMotion, PropState};
    use target_range::{MiniGame, Settings};

    use console::{ConsoleEffects, ConsolePanel, ConsoleText};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Target Range (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    const FRAME_DT: f32 = 1.0 / 90.0;
    const IDLE_FRAMES: u32 = 135;
    const THROW_EVERY: u32 = 63;
    const DROP_AT: u32 = IDLE_FRAMES + 450;

    let effects = EffectPlayer::new(Some(Box::new(ConsoleEffects)), &settings.audio);
    let hud = Hud::new()
        .with_timer(ConsoleText("timer"))
        .with_score(ConsoleText("score"))
        .with_game_over(ConsoleText("game over"));
    let launcher = Launcher::new()
        .with_start_panel(ConsolePanel("start"))
        .with_game_panel(ConsolePanel("game"));
    let max_frames =
        IDLE_FRAMES + ((settings.session.game_duration_secs + 2.0) / FRAME_DT).ceil() as u32;
    let mut game = MiniGame::with_parts(settings, launcher, hud, effects);

    // Let the range populate before the player walks up
    for _ in 0..IDLE_FRAMES {
        game.update(FRAME_DT);
    }
    game.press_launcher();

    let mut throws = 0u32;
    for frame in IDLE_FRAMES..max_frames {
        if game.state.session.is_over() {
            break;
        }

        let in_hand = game
            .state
            .props
            .iter()
            .find(|p| p.state == PropState::Idle && p.is_grabbable())
            .map(|p| p.id);

        if frame % THROW_EVERY == 0 {
            let target = game.state.armed_targets().map(|t| t.id).next();
            if let (Some(target), Some(prop)) = (target, in_hand) {
                throws += 1;
                game.push_contact(Contact::prop(target, prop));
            }
        }

        if frame == DROP_AT {
            if let Some(prop) = in_hand {
                log::info!("Dropping prop {} off the range", prop);
                game.push_motion(PropMotion::at(prop, Vec3::new(0.0, -2.0, 0.0), Vec3::NEG_Y));
            }
        }

        game.update(FRAME_DT);
    }

    log::info!(
        "Session finished after {:.1}s with {} throws",
        game.state.elapsed_secs(),
        throws
    );
    println!("Final score: {}", game.score());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Engine hosts drive `MiniGame` directly on this target
}
