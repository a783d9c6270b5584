//! Add-word dialog window
//!
//! A third floating window hosting the quick-add form, shown on bubble tap.
//! The window is full-screen, centered and dismissible by touching outside
//! it. Entrance and exit run a fade+scale transition; on exit the window is
//! detached only once the transition completes.

use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::animation::{Easing, FadeScale};
use crate::constants::appearance::{DIALOG_HIDDEN, DIALOG_SHOWN};
use crate::constants::timing::DIALOG_TRANSITION;
use crate::host::{WindowId, WindowSurface};
use crate::types::{
    Dimensions, Gravity, PixelFormat, Position, WindowDescriptor, WindowFlags, WindowKind,
};

/// Bound state of the add-word form
#[derive(Debug, Default)]
pub struct WordForm {
    text: String,
}

impl WordForm {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    fn reset(&mut self) {
        self.text.clear();
    }
}

#[derive(Debug)]
enum DialogState {
    Hidden,
    Entering { id: WindowId, transition: FadeScale },
    Shown { id: WindowId },
    Exiting { id: WindowId, transition: FadeScale },
    Destroyed,
}

pub struct DialogController {
    surface: Rc<dyn WindowSurface>,
    screen: Dimensions,
    state: DialogState,
    form: WordForm,
}

impl DialogController {
    pub fn new(surface: Rc<dyn WindowSurface>, screen: Dimensions) -> Self {
        Self {
            surface,
            screen,
            state: DialogState::Hidden,
            form: WordForm::default(),
        }
    }

    fn descriptor(&self) -> WindowDescriptor {
        WindowDescriptor {
            kind: WindowKind::Dialog,
            dimensions: self.screen,
            position: Position::new(0, 0),
            gravity: Gravity::Center,
            flags: WindowFlags {
                not_focusable: false,
                watch_outside_touch: true,
            },
            pixel_format: PixelFormat::Translucent,
        }
    }

    pub fn is_showing(&self) -> bool {
        matches!(
            self.state,
            DialogState::Entering { .. } | DialogState::Shown { .. }
        )
    }

    pub fn form(&self) -> &WordForm {
        &self.form
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.is_showing() {
            self.form.set_text(text);
        } else {
            warn!("ignoring form edit while dialog is not showing");
        }
    }

    /// Present the dialog, seeding the form with `initial_text`. No-op while
    /// already showing or still playing its exit transition.
    pub fn show(&mut self, initial_text: Option<&str>, now: Instant) {
        match self.state {
            DialogState::Destroyed => {
                warn!("ignoring show on destroyed dialog controller");
                return;
            }
            DialogState::Entering { .. } | DialogState::Shown { .. } => {
                warn!("dialog already showing, ignoring show request");
                return;
            }
            DialogState::Exiting { .. } => {
                debug!("dialog still closing, ignoring show request");
                return;
            }
            DialogState::Hidden => {}
        }

        match self.surface.create_window(&self.descriptor()) {
            Ok(id) => {
                info!(id = id, "created add-word dialog window");
                if let Err(e) =
                    self.surface
                        .set_appearance(id, DIALOG_HIDDEN.0, DIALOG_HIDDEN.1)
                {
                    error!(id = id, error = %e, "initial dialog appearance update failed");
                }
                self.form.reset();
                if let Some(text) = initial_text {
                    self.form.set_text(text);
                }
                self.state = DialogState::Entering {
                    id,
                    transition: FadeScale::toward(
                        DIALOG_HIDDEN,
                        DIALOG_SHOWN,
                        DIALOG_TRANSITION,
                        Easing::EaseInOut,
                        now,
                    ),
                };
            }
            Err(e) => {
                error!(error = %e, "failed to create dialog window");
            }
        }
    }

    /// Play the exit transition; the window detaches when it completes
    pub fn hide(&mut self, now: Instant) {
        let (id, current) = match &self.state {
            DialogState::Shown { id } => (*id, DIALOG_SHOWN),
            DialogState::Entering { id, transition } => (*id, transition.value_at(now)),
            DialogState::Exiting { .. } | DialogState::Hidden => {
                warn!("dialog not showing, ignoring hide request");
                return;
            }
            DialogState::Destroyed => {
                warn!("ignoring hide on destroyed dialog controller");
                return;
            }
        };
        self.state = DialogState::Exiting {
            id,
            transition: FadeScale::toward(
                current,
                DIALOG_HIDDEN,
                DIALOG_TRANSITION,
                Easing::EaseInOut,
                now,
            ),
        };
    }

    /// Touch outside the dialog content requests dismissal
    pub fn dismiss(&mut self, now: Instant) {
        if self.is_showing() {
            debug!("dialog dismissed by outside touch");
            self.hide(now);
        }
    }

    /// Take the entered word and close the dialog. Returns `None` for an
    /// empty or whitespace-only draft.
    pub fn submit(&mut self, now: Instant) -> Option<String> {
        if !self.is_showing() {
            warn!("ignoring submit while dialog is not showing");
            return None;
        }
        let word = self.form.text.trim().to_string();
        self.hide(now);
        if word.is_empty() {
            debug!("discarding empty add-word submission");
            None
        } else {
            Some(word)
        }
    }

    /// Drive the entrance/exit transitions; performs the deferred detach
    pub fn tick(&mut self, now: Instant) {
        match &self.state {
            DialogState::Entering { id, transition } => {
                let id = *id;
                let (alpha, scale) = transition.value_at(now);
                let finished = transition.is_finished(now);
                if let Err(e) = self.surface.set_appearance(id, alpha, scale) {
                    debug!(id = id, error = %e, "dialog appearance update skipped");
                }
                if finished {
                    self.state = DialogState::Shown { id };
                }
            }
            DialogState::Exiting { id, transition } => {
                let id = *id;
                let (alpha, scale) = transition.value_at(now);
                let finished = transition.is_finished(now);
                if let Err(e) = self.surface.set_appearance(id, alpha, scale) {
                    debug!(id = id, error = %e, "dialog appearance update skipped");
                }
                if finished {
                    if let Err(e) = self.surface.remove_window(id) {
                        error!(id = id, error = %e, "dialog window removal failed");
                    }
                    self.form.reset();
                    self.state = DialogState::Hidden;
                }
            }
            _ => {}
        }
    }

    pub fn destroy(&mut self) {
        match std::mem::replace(&mut self.state, DialogState::Destroyed) {
            DialogState::Entering { id, .. }
            | DialogState::Shown { id }
            | DialogState::Exiting { id, .. } => {
                if let Err(e) = self.surface.remove_window(id) {
                    error!(id = id, error = %e, "dialog window removal failed");
                }
            }
            DialogState::Hidden | DialogState::Destroyed => {}
        }
        self.form.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingSurface;
    use std::time::Duration;

    fn controller(surface: &Rc<RecordingSurface>) -> DialogController {
        DialogController::new(surface.clone(), Dimensions::new(1000, 2000))
    }

    #[test]
    fn test_show_is_idempotent() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(Some("lexicon"), start);
        dialog.show(None, start + Duration::from_millis(10));
        assert_eq!(surface.create_count(WindowKind::Dialog), 1);
        assert_eq!(dialog.form().text(), "lexicon");
    }

    #[test]
    fn test_exit_detaches_only_after_transition() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(None, start);
        dialog.tick(start + Duration::from_millis(300));
        assert!(matches!(dialog.state, DialogState::Shown { .. }));

        dialog.hide(start + Duration::from_millis(400));
        dialog.tick(start + Duration::from_millis(500));
        assert!(!surface.removed(1));

        dialog.tick(start + Duration::from_millis(700));
        assert!(surface.removed(1));
        assert!(matches!(dialog.state, DialogState::Hidden));
    }

    #[test]
    fn test_hide_resets_form_state_on_detach() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(Some("ephemeral"), start);
        dialog.tick(start + Duration::from_millis(300));
        dialog.hide(start + Duration::from_millis(400));
        dialog.tick(start + Duration::from_millis(700));

        assert_eq!(dialog.form().text(), "");
    }

    #[test]
    fn test_submit_returns_trimmed_word_and_closes() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(None, start);
        dialog.tick(start + Duration::from_millis(300));
        dialog.set_text("  serendipity ");

        let word = dialog.submit(start + Duration::from_millis(400));
        assert_eq!(word.as_deref(), Some("serendipity"));
        assert!(!dialog.is_showing());
    }

    #[test]
    fn test_submit_empty_draft_yields_none() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(None, start);
        dialog.tick(start + Duration::from_millis(300));
        dialog.set_text("   ");
        assert_eq!(dialog.submit(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn test_dismiss_while_hidden_is_noop() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        dialog.dismiss(Instant::now());
        assert_eq!(surface.total_calls(), 0);
    }

    #[test]
    fn test_show_during_exit_is_deferred_noop() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(None, start);
        dialog.tick(start + Duration::from_millis(300));
        dialog.hide(start + Duration::from_millis(400));
        dialog.show(None, start + Duration::from_millis(450));
        assert_eq!(surface.create_count(WindowKind::Dialog), 1);

        // After the exit completes the dialog can be shown again
        dialog.tick(start + Duration::from_millis(700));
        dialog.show(None, start + Duration::from_millis(800));
        assert_eq!(surface.create_count(WindowKind::Dialog), 2);
    }

    #[test]
    fn test_destroy_removes_live_window() {
        let surface = Rc::new(RecordingSurface::new());
        let mut dialog = controller(&surface);
        let start = Instant::now();

        dialog.show(None, start);
        dialog.destroy();
        assert!(surface.removed(1));

        let calls = surface.total_calls();
        dialog.show(None, start + Duration::from_secs(1));
        dialog.tick(start + Duration::from_secs(2));
        assert_eq!(surface.total_calls(), calls);
    }
}
