//! Delete zone drop target
//!
//! A second floating window shown while the bubble is being dragged.
//! Dropping the bubble on it removes the bubble feature. The window is
//! created lazily on the first drag and reused for the rest of the bubble's
//! lifetime; show/hide only animate and toggle visibility.

use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::animation::{Easing, FadeScale};
use crate::constants::appearance::{GONE, ZONE_HIGHLIGHT, ZONE_RESTING};
use crate::constants::geometry::{DELETE_ZONE_BOTTOM_OFFSET, DELETE_ZONE_SIZE};
use crate::constants::timing::{ZONE_FADE_DURATION, ZONE_HIDE_LINGER, ZONE_HIGHLIGHT_DURATION};
use crate::host::{WindowId, WindowSurface};
use crate::snapping::{SnapGeometry, ZoneGeometry};
use crate::types::{
    Dimensions, Gravity, PixelFormat, Position, WindowDescriptor, WindowFlags, WindowKind,
};

#[derive(Debug, Clone, Copy)]
enum ZoneState {
    /// No window yet; created on first `show`
    Uncreated,
    Created { id: WindowId },
    Destroyed,
}

/// Deferred visibility-off after the fade-out, cancelled by a re-show
#[derive(Debug, Clone, Copy)]
struct PendingHide {
    at: Instant,
    epoch: u64,
}

pub struct DeleteZoneController {
    surface: Rc<dyn WindowSurface>,
    geometry: SnapGeometry,
    state: ZoneState,
    /// Logical shown state, between `show()` and `hide()`
    showing: bool,
    /// Window hidden because the device screen is off
    suspended: bool,
    highlighted: bool,
    /// Last alpha/scale applied, the starting point for retargeted transitions
    visual: (f32, f32),
    transition: Option<FadeScale>,
    pending_hide: Option<PendingHide>,
    show_epoch: u64,
}

impl DeleteZoneController {
    pub fn new(surface: Rc<dyn WindowSurface>, geometry: SnapGeometry) -> Self {
        Self {
            surface,
            geometry,
            state: ZoneState::Uncreated,
            showing: false,
            suspended: false,
            highlighted: false,
            visual: GONE,
            transition: None,
            pending_hide: None,
            show_epoch: 0,
        }
    }

    fn descriptor(&self) -> WindowDescriptor {
        let screen = self.geometry.screen();
        let size = DELETE_ZONE_SIZE;
        WindowDescriptor {
            kind: WindowKind::DeleteZone,
            dimensions: Dimensions::square(size),
            position: Position::new(
                (screen.width as i32 - size as i32) / 2,
                screen.height as i32 - DELETE_ZONE_BOTTOM_OFFSET - size as i32,
            ),
            gravity: Gravity::BottomCenter,
            flags: WindowFlags {
                not_focusable: true,
                watch_outside_touch: false,
            },
            pixel_format: PixelFormat::Translucent,
        }
    }

    /// Zone geometry as laid out by the host, or a zero-sized placeholder
    /// while the window has never been created
    fn measured_geometry(&self) -> ZoneGeometry {
        match self.state {
            ZoneState::Created { .. } => ZoneGeometry::new(
                Dimensions::square(DELETE_ZONE_SIZE),
                DELETE_ZONE_BOTTOM_OFFSET,
            ),
            _ => ZoneGeometry::unmeasured(),
        }
    }

    /// Overlap test for the dragged bubble against this zone
    pub fn is_bubble_over(&self, bubble_position: Position, bubble: Dimensions) -> bool {
        self.geometry
            .is_over_delete_zone(bubble_position, bubble, self.measured_geometry())
    }

    pub fn window_id(&self) -> Option<WindowId> {
        match self.state {
            ZoneState::Created { id } => Some(id),
            _ => None,
        }
    }

    /// Present the zone and start the fade/scale-in. Idempotent while
    /// already showing.
    pub fn show(&mut self, now: Instant) {
        if matches!(self.state, ZoneState::Destroyed) {
            warn!("ignoring show on destroyed delete zone");
            return;
        }
        if self.showing {
            warn!("delete zone already showing, ignoring show request");
            return;
        }

        if matches!(self.state, ZoneState::Uncreated) {
            match self.surface.create_window(&self.descriptor()) {
                Ok(id) => {
                    info!(id = id, "created delete zone window");
                    self.state = ZoneState::Created { id };
                    self.visual = GONE;
                }
                Err(e) => {
                    error!(error = %e, "failed to create delete zone window");
                    return;
                }
            }
        }

        let ZoneState::Created { id } = self.state else {
            return;
        };

        self.show_epoch += 1;
        self.pending_hide = None;
        self.showing = true;
        self.highlighted = false;

        if !self.suspended
            && let Err(e) = self.surface.set_visible(id, true)
        {
            error!(id = id, error = %e, "delete zone visibility update failed");
        }
        self.transition = Some(FadeScale::toward(
            self.visual,
            ZONE_RESTING,
            ZONE_FADE_DURATION,
            Easing::EaseInOut,
            now,
        ));
    }

    /// Fade the zone out, then hide its window after a short linger unless
    /// a new drag re-shows it first. Idempotent while already hidden.
    pub fn hide(&mut self, now: Instant) {
        if matches!(self.state, ZoneState::Destroyed) {
            warn!("ignoring hide on destroyed delete zone");
            return;
        }
        if matches!(self.state, ZoneState::Uncreated) || !self.showing {
            warn!("delete zone already hidden, ignoring hide request");
            return;
        }

        self.showing = false;
        self.highlighted = false;
        self.transition = Some(FadeScale::toward(
            self.visual,
            GONE,
            ZONE_FADE_DURATION,
            Easing::EaseInOut,
            now,
        ));
        self.pending_hide = Some(PendingHide {
            at: now + ZONE_HIDE_LINGER,
            epoch: self.show_epoch,
        });
    }

    /// Retarget the animation toward the highlight preset while the dragged
    /// bubble overlaps the zone. Applied by the animation layer, not
    /// instantaneously.
    pub fn set_highlight(&mut self, over: bool, now: Instant) {
        if !self.showing || over == self.highlighted {
            return;
        }
        self.highlighted = over;
        let preset = if over { ZONE_HIGHLIGHT } else { ZONE_RESTING };
        self.transition = Some(FadeScale::toward(
            self.visual,
            preset,
            ZONE_HIGHLIGHT_DURATION,
            Easing::EaseInOut,
            now,
        ));
    }

    /// Hide the window while the screen is off, without touching the
    /// logical shown state
    pub fn screen_off(&mut self) {
        if self.suspended {
            return;
        }
        self.suspended = true;
        if let ZoneState::Created { id } = self.state
            && let Err(e) = self.surface.set_visible(id, false)
        {
            error!(id = id, error = %e, "failed to hide delete zone on screen off");
        }
    }

    pub fn screen_on(&mut self) {
        if !self.suspended {
            return;
        }
        self.suspended = false;
        if self.showing
            && let ZoneState::Created { id } = self.state
            && let Err(e) = self.surface.set_visible(id, true)
        {
            error!(id = id, error = %e, "failed to restore delete zone on screen on");
        }
    }

    /// Drive the fade/scale transition and the deferred hide
    pub fn tick(&mut self, now: Instant) {
        let ZoneState::Created { id } = self.state else {
            return;
        };

        if let Some(transition) = &self.transition {
            let (alpha, scale) = transition.value_at(now);
            self.visual = (alpha, scale);
            if !self.suspended
                && let Err(e) = self.surface.set_appearance(id, alpha, scale)
            {
                debug!(id = id, error = %e, "delete zone appearance update skipped");
            }
            if transition.is_finished(now) {
                self.transition = None;
            }
        }

        if let Some(pending) = self.pending_hide
            && now >= pending.at
        {
            self.pending_hide = None;
            // Only hide if no show() happened since the hide was scheduled
            if pending.epoch == self.show_epoch && !self.showing {
                if let Err(e) = self.surface.set_visible(id, false) {
                    error!(id = id, error = %e, "delete zone visibility update failed");
                }
            }
        }
    }

    pub fn destroy(&mut self) {
        self.transition = None;
        self.pending_hide = None;
        self.showing = false;
        if let ZoneState::Created { id } =
            std::mem::replace(&mut self.state, ZoneState::Destroyed)
            && let Err(e) = self.surface.remove_window(id)
        {
            error!(id = id, error = %e, "failed to remove delete zone window");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingSurface;
    use std::time::Duration;

    fn controller(surface: &Rc<RecordingSurface>) -> DeleteZoneController {
        DeleteZoneController::new(
            surface.clone(),
            SnapGeometry::new(Dimensions::new(1000, 2000)),
        )
    }

    #[test]
    fn test_window_created_lazily_and_reused() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        assert_eq!(surface.create_count(WindowKind::DeleteZone), 0);
        zone.show(start);
        assert_eq!(surface.create_count(WindowKind::DeleteZone), 1);

        zone.hide(start + Duration::from_secs(1));
        zone.show(start + Duration::from_secs(2));
        assert_eq!(surface.create_count(WindowKind::DeleteZone), 1);
    }

    #[test]
    fn test_double_hide_starts_one_animation() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        zone.hide(start + Duration::from_millis(600));
        let first = zone.transition.clone().expect("hide starts a transition");
        zone.hide(start + Duration::from_millis(700));
        let second = zone.transition.clone().expect("transition unchanged");
        assert_eq!(first.target(), second.target());
        assert!(first.is_finished(start + Duration::from_millis(1100)));
        assert!(second.is_finished(start + Duration::from_millis(1100)));
        // the second hide neither restarted the animation nor rescheduled
        assert_eq!(zone.pending_hide.unwrap().at, start + Duration::from_millis(900));
    }

    #[test]
    fn test_hide_sets_window_invisible_after_linger() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        let id = zone.window_id().unwrap();
        zone.hide(start + Duration::from_millis(100));

        zone.tick(start + Duration::from_millis(200));
        assert_ne!(surface.last_visibility(id), Some(false));

        zone.tick(start + Duration::from_millis(450));
        assert_eq!(surface.last_visibility(id), Some(false));
    }

    #[test]
    fn test_reshow_during_linger_keeps_window_visible() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        let id = zone.window_id().unwrap();
        zone.hide(start + Duration::from_millis(100));
        zone.show(start + Duration::from_millis(200));

        // Past the original linger deadline, the stale hide must not fire
        zone.tick(start + Duration::from_millis(500));
        assert_eq!(surface.last_visibility(id), Some(true));
    }

    #[test]
    fn test_highlight_retargets_toward_full_presence() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        zone.tick(start + Duration::from_millis(500));
        zone.set_highlight(true, start + Duration::from_millis(600));
        zone.tick(start + Duration::from_millis(800));

        let id = zone.window_id().unwrap();
        let (alpha, scale) = surface.last_appearance(id).unwrap();
        assert!((alpha - 1.0).abs() < 0.01, "alpha was {alpha}");
        assert!((scale - 1.0).abs() < 0.01, "scale was {scale}");

        // Leaving the zone animates back to the resting preset
        zone.set_highlight(false, start + Duration::from_millis(900));
        zone.tick(start + Duration::from_millis(1100));
        let (alpha, scale) = surface.last_appearance(id).unwrap();
        assert!((alpha - 0.7).abs() < 0.01, "alpha was {alpha}");
        assert!((scale - 0.7).abs() < 0.01, "scale was {scale}");
    }

    #[test]
    fn test_highlight_ignored_while_hidden() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.set_highlight(true, start);
        assert!(zone.transition.is_none());
    }

    #[test]
    fn test_overlap_uses_unmeasured_zone_before_creation() {
        let surface = Rc::new(RecordingSurface::new());
        let zone = controller(&surface);
        // Directly over the would-be zone center, but no window exists yet
        assert!(!zone.is_bubble_over(Position::new(468, 1872), Dimensions::square(64)));
    }

    #[test]
    fn test_failed_creation_leaves_zone_unmeasured() {
        let surface = Rc::new(RecordingSurface::new());
        surface.fail_create.set(true);
        let mut zone = controller(&surface);
        zone.show(Instant::now());
        assert!(zone.window_id().is_none());
        assert!(!zone.is_bubble_over(Position::new(468, 1872), Dimensions::square(64)));
    }

    #[test]
    fn test_destroy_removes_window_and_blocks_updates() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        let id = zone.window_id().unwrap();
        zone.destroy();
        assert!(surface.removed(id));

        let calls_after_destroy = surface.total_calls();
        zone.tick(start + Duration::from_secs(1));
        zone.show(start + Duration::from_secs(1));
        assert_eq!(surface.total_calls(), calls_after_destroy);
    }

    #[test]
    fn test_screen_off_hides_without_forgetting_state() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        let id = zone.window_id().unwrap();
        zone.screen_off();
        assert_eq!(surface.last_visibility(id), Some(false));

        zone.screen_on();
        assert_eq!(surface.last_visibility(id), Some(true));
    }

    #[test]
    fn test_show_is_idempotent_while_showing() {
        let surface = Rc::new(RecordingSurface::new());
        let mut zone = controller(&surface);
        let start = Instant::now();

        zone.show(start);
        let visible_calls = surface.total_calls();
        zone.show(start + Duration::from_millis(10));
        assert_eq!(surface.total_calls(), visible_calls);
    }
}
