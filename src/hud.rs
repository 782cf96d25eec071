//! HUD text bindings
//!
//! The engine owns the text widgets; the HUD only pushes strings into
//! whichever of them were wired up.

use crate::sim::Session;
use crate::{format_game_over, format_score, format_timer};

/// A text widget owned by the engine
pub trait TextTarget {
    fn set_text(&mut self, text: &str);
    fn set_visible(&mut self, visible: bool);
}

/// Timer, score and game-over text
#[derive(Default)]
pub struct Hud {
    timer: Option<Box<dyn TextTarget>>,
    score: Option<Box<dyn TextTarget>>,
    game_over: Option<Box<dyn TextTarget>>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timer(mut self, target: impl TextTarget + 'static) -> Self {
        self.timer = Some(Box::new(target));
        self
    }

    pub fn with_score(mut self, target: impl TextTarget + 'static) -> Self {
        self.score = Some(Box::new(target));
        self
    }

    pub fn with_game_over(mut self, target: impl TextTarget + 'static) -> Self {
        self.game_over = Some(Box::new(target));
        self
    }

    /// Push timer and score text
    pub fn refresh(&mut self, session: &Session) {
        match self.timer.as_mut() {
            Some(timer) => {
                let text = format_timer(session.remaining_secs);
                log::debug!("Timer: {}", text);
                timer.set_text(&text);
            }
            None => log::warn!("Timer text not bound"),
        }
        match self.score.as_mut() {
            Some(score) => score.set_text(&format_score(session.score)),
            None => log::warn!("Score text not bound"),
        }
    }

    pub fn show_game_over(&mut self, final_score: u32) {
        if let Some(text) = self.game_over.as_mut() {
            text.set_visible(true);
            text.set_text(&format_game_over(final_score));
        }
    }

    pub fn hide_game_over(&mut self) {
        if let Some(text) = self.game_over.as_mut() {
            text.set_visible(false);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Shared view of what was pushed into a text widget
    #[derive(Debug, Default)]
    pub(crate) struct TextLog {
        pub text: String,
        pub visible: bool,
        pub writes: usize,
    }

    #[derive(Clone, Default)]
    pub(crate) struct RecordingText(pub Rc<RefCell<TextLog>>);

    impl TextTarget for RecordingText {
        fn set_text(&mut self, text: &str) {
            let mut log = self.0.borrow_mut();
            log.text = text.to_string();
            log.writes += 1;
        }

        fn set_visible(&mut self, visible: bool) {
            self.0.borrow_mut().visible = visible;
        }
    }

    #[test]
    fn test_refresh_formats_timer_and_score() {
        let timer = RecordingText::default();
        let score = RecordingText::default();
        let mut hud = Hud::new().with_timer(timer.clone()).with_score(score.clone());

        let session = Session {
            remaining_secs: 65.0,
            score: 30,
            ..Default::default()
        };
        hud.refresh(&session);
        assert_eq!(timer.0.borrow().text, "01:05");
        assert_eq!(score.0.borrow().text, "Score: 30");
    }

    #[test]
    fn test_missing_bindings_are_skipped() {
        let score = RecordingText::default();
        let mut hud = Hud::new().with_score(score.clone());
        hud.refresh(&Session::default());
        hud.show_game_over(10);
        assert_eq!(score.0.borrow().writes, 1);
    }

    #[test]
    fn test_game_over_toggle() {
        let over = RecordingText::default();
        let mut hud = Hud::new().with_game_over(over.clone());
        hud.show_game_over(70);
        assert!(over.0.borrow().visible);
        assert!(over.0.borrow().text.contains("Final Score: 70"));
        hud.hide_game_over();
        assert!(!over.0.borrow().visible);
    }
}
