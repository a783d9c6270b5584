//! Floating bubble window controller
//!
//! Owns the draggable bubble: window creation against the host surface,
//! settings-driven visual updates, the drag/tap gesture protocol, the
//! edge-snap animation, and removal by dropping on the delete zone. The
//! delete zone controller is owned here because every interaction with it
//! happens inside the drag protocol.
//!
//! All host-window operations are best-effort: a failed layout update during
//! a drag or snap is logged and skipped for that frame, never aborting the
//! gesture. Only a failed initial `show` rolls state back.

use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::animation::{Animation, Easing};
use crate::constants::timing::SNAP_DURATION;
use crate::delete_zone::DeleteZoneController;
use crate::host::{BubbleEvents, Haptics, WindowId, WindowSurface};
use crate::lifecycle::OverlayLifecycle;
use crate::snapping::SnapGeometry;
use crate::types::{
    BubbleSettings, Dimensions, Gravity, PixelFormat, Position, WindowDescriptor, WindowFlags,
    WindowKind,
};

/// Construction parameters that stay fixed for the controller's lifetime
#[derive(Debug, Clone, Copy)]
pub struct BubbleConfig {
    pub screen: Dimensions,
    /// Minimum interval between drag layout updates forwarded to the host
    pub drag_throttle: Duration,
}

/// Live window handle plus the state that only exists while shown
#[derive(Debug)]
struct ShownWindow {
    id: WindowId,
    position: Position,
    visible: bool,
    lifecycle: OverlayLifecycle,
}

#[derive(Debug)]
enum BubbleState {
    Hidden,
    Shown(ShownWindow),
    Destroyed,
}

/// Per-gesture state, created on pointer down and consumed on release
#[derive(Debug, Default)]
struct DragSession {
    /// Any movement happened; decides drag vs tap on release
    moved: bool,
    over_delete_zone: bool,
}

/// In-flight edge-snap interpolation of the window's x coordinate
#[derive(Debug)]
struct SnapAnimation {
    x: Animation,
    target_x: i32,
    y: i32,
}

pub struct BubbleController {
    surface: Rc<dyn WindowSurface>,
    haptics: Rc<dyn Haptics>,
    events: Rc<dyn BubbleEvents>,
    save_queue: mpsc::Sender<Position>,
    geometry: SnapGeometry,
    drag_throttle: Duration,
    settings: BubbleSettings,
    state: BubbleState,
    drag: Option<DragSession>,
    snap: Option<SnapAnimation>,
    last_layout_update: Option<Instant>,
    delete_zone: DeleteZoneController,
}

impl BubbleController {
    pub fn new(
        surface: Rc<dyn WindowSurface>,
        haptics: Rc<dyn Haptics>,
        events: Rc<dyn BubbleEvents>,
        save_queue: mpsc::Sender<Position>,
        config: BubbleConfig,
        settings: BubbleSettings,
    ) -> Self {
        let geometry = SnapGeometry::new(config.screen);
        let delete_zone = DeleteZoneController::new(surface.clone(), geometry);
        Self {
            surface,
            haptics,
            events,
            save_queue,
            geometry,
            drag_throttle: config.drag_throttle,
            settings,
            state: BubbleState::Hidden,
            drag: None,
            snap: None,
            last_layout_update: None,
            delete_zone,
        }
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions::square(self.settings.size_px)
    }

    fn descriptor(&self, position: Position) -> WindowDescriptor {
        WindowDescriptor {
            kind: WindowKind::Bubble,
            dimensions: self.dimensions(),
            position,
            gravity: Gravity::TopStart,
            flags: WindowFlags {
                not_focusable: true,
                watch_outside_touch: false,
            },
            pixel_format: PixelFormat::Translucent,
        }
    }

    /// Current bubble position, if a window is live
    pub fn position(&self) -> Option<Position> {
        match &self.state {
            BubbleState::Shown(window) => Some(window.position),
            _ => None,
        }
    }

    pub fn window_id(&self) -> Option<WindowId> {
        match &self.state {
            BubbleState::Shown(window) => Some(window.id),
            _ => None,
        }
    }

    pub fn delete_zone(&self) -> &DeleteZoneController {
        &self.delete_zone
    }

    /// Lifecycle scope of the live window, for hosted UI trees to query.
    /// `None` unless a window is shown.
    pub fn lifecycle(&self) -> Option<&OverlayLifecycle> {
        match &self.state {
            BubbleState::Shown(window) => Some(&window.lifecycle),
            _ => None,
        }
    }

    /// Create the bubble window at `initial`. A second call while shown is
    /// a warning no-op; a failed host creation rolls the overlay lifecycle
    /// back and leaves the controller hidden.
    pub fn show(&mut self, initial: Position) {
        match self.state {
            BubbleState::Shown(_) => {
                warn!("bubble already shown, ignoring show request");
                return;
            }
            BubbleState::Destroyed => {
                warn!("ignoring show on destroyed bubble controller");
                return;
            }
            BubbleState::Hidden => {}
        }

        let mut lifecycle = OverlayLifecycle::new();
        lifecycle.start();
        lifecycle.resume();

        match self.surface.create_window(&self.descriptor(initial)) {
            Ok(id) => {
                info!(
                    id = id,
                    x = initial.x,
                    y = initial.y,
                    size = self.settings.size_px,
                    "created bubble window"
                );
                if let Err(e) = self.surface.set_appearance(id, self.settings.alpha(), 1.0) {
                    error!(id = id, error = %e, "initial bubble appearance update failed");
                }
                self.state = BubbleState::Shown(ShownWindow {
                    id,
                    position: initial,
                    visible: true,
                    lifecycle,
                });
            }
            Err(e) => {
                error!(error = %e, "failed to create bubble window");
                lifecycle.destroy();
            }
        }
    }

    /// Buffer new visual settings and apply them to the live window, if any.
    /// Safe to call repeatedly, including before `show`.
    pub fn apply_settings(&mut self, settings: BubbleSettings) {
        let previous = self.settings;
        self.settings = settings;

        let BubbleState::Shown(window) = &self.state else {
            return;
        };
        if settings.size_px != previous.size_px
            && let Err(e) = self
                .surface
                .resize_window(window.id, Dimensions::square(settings.size_px))
        {
            error!(id = window.id, error = %e, "bubble resize failed");
        }
        if settings.alpha_percent != previous.alpha_percent
            && let Err(e) = self
                .surface
                .set_appearance(window.id, settings.alpha(), 1.0)
        {
            error!(id = window.id, error = %e, "bubble appearance update failed");
        }
    }

    /// Hide the window without destroying it (device screen off)
    pub fn hide(&mut self) {
        if let BubbleState::Shown(window) = &mut self.state {
            if window.visible {
                window.visible = false;
                if let Err(e) = self.surface.set_visible(window.id, false) {
                    error!(id = window.id, error = %e, "failed to hide bubble window");
                }
            } else {
                warn!("bubble already hidden, ignoring hide request");
            }
        }
        self.delete_zone.screen_off();
    }

    pub fn unhide(&mut self) {
        if let BubbleState::Shown(window) = &mut self.state {
            if window.visible {
                warn!("bubble already visible, ignoring unhide request");
            } else {
                window.visible = true;
                if let Err(e) = self.surface.set_visible(window.id, true) {
                    error!(id = window.id, error = %e, "failed to unhide bubble window");
                }
            }
        }
        self.delete_zone.screen_on();
    }

    /// Pointer down on the bubble: opens a gesture whose outcome is either a
    /// tap or a drag, never both
    pub fn on_press(&mut self, _now: Instant) {
        if !matches!(self.state, BubbleState::Shown(_)) {
            warn!("ignoring press, bubble window not shown");
            return;
        }
        if self.drag.is_some() {
            warn!("gesture already in progress, ignoring press");
            return;
        }
        if self.snap.take().is_some() {
            debug!("cancelled in-flight snap, bubble grabbed again");
        }
        self.drag = Some(DragSession::default());
    }

    /// Pointer movement delta. The first movement turns the gesture into a
    /// drag and brings up the delete zone; layout updates toward the host
    /// are throttled to `drag_throttle`.
    pub fn on_drag(&mut self, dx: i32, dy: i32, now: Instant) {
        let BubbleState::Shown(window) = &mut self.state else {
            return;
        };
        let Some(session) = self.drag.as_mut() else {
            warn!("drag delta without an active gesture, ignoring");
            return;
        };

        if !session.moved {
            session.moved = true;
            self.delete_zone.show(now);
        }

        window.position = window.position.offset_by(dx, dy);

        let over = self
            .delete_zone
            .is_bubble_over(window.position, Dimensions::square(self.settings.size_px));
        session.over_delete_zone = over;
        self.delete_zone.set_highlight(over, now);

        // Backpressure against the host window manager: it cannot apply
        // layout faster than the display refresh anyway
        let due = self
            .last_layout_update
            .is_none_or(|last| now.saturating_duration_since(last) >= self.drag_throttle);
        if due {
            self.last_layout_update = Some(now);
            if let Err(e) = self.surface.move_window(window.id, window.position) {
                debug!(id = window.id, error = %e, "drag layout update skipped");
            }
        }
    }

    /// Pointer up: resolves the gesture. No movement means a tap; a drag
    /// ends in removal (over the delete zone) or an edge snap.
    pub fn on_release(&mut self, now: Instant) {
        let Some(session) = self.drag.take() else {
            warn!("release without an active gesture, ignoring");
            return;
        };
        let BubbleState::Shown(window) = &mut self.state else {
            return;
        };
        self.last_layout_update = None;

        if !session.moved {
            if self.settings.vibration {
                self.haptics.pulse();
            }
            self.events.tapped();
            return;
        }

        self.delete_zone.hide(now);

        if session.over_delete_zone {
            info!(
                x = window.position.x,
                y = window.position.y,
                "bubble dropped on delete zone"
            );
            self.events.removed_by_user();
            return;
        }

        let target_x = self
            .geometry
            .snap_target_x(window.position.x, self.settings.size_px);
        debug!(
            from_x = window.position.x,
            target_x = target_x,
            "starting edge snap"
        );
        self.snap = Some(SnapAnimation {
            x: Animation::new(
                window.position.x as f32,
                target_x as f32,
                SNAP_DURATION,
                Easing::Overshoot,
                now,
            ),
            target_x,
            y: window.position.y,
        });
    }

    /// Drive the snap animation and the delete zone transitions
    pub fn tick(&mut self, now: Instant) {
        self.delete_zone.tick(now);

        if self.snap.is_none() {
            return;
        }
        let BubbleState::Shown(window) = &mut self.state else {
            self.snap = None;
            return;
        };
        let Some(snap) = &self.snap else {
            return;
        };

        if snap.x.is_finished(now) {
            window.position = Position::new(snap.target_x, snap.y);
            if let Err(e) = self.surface.move_window(window.id, window.position) {
                error!(id = window.id, error = %e, "final snap layout update failed");
            }
            // Fire-and-forget: the saver worker logs failures on its own
            if self.save_queue.send(window.position).is_err() {
                warn!("position saver is gone, snap position not persisted");
            }
            self.snap = None;
        } else {
            window.position.x = snap.x.value_at(now).round() as i32;
            if let Err(e) = self
                .surface
                .move_window(window.id, Position::new(window.position.x, snap.y))
            {
                debug!(id = window.id, error = %e, "snap layout update skipped");
            }
        }
    }

    /// Tear down the window and the delete zone. Cancels any in-flight snap
    /// before anything else so no layout call can follow destroy.
    pub fn destroy(&mut self) {
        self.snap = None;
        self.drag = None;
        self.delete_zone.destroy();

        match std::mem::replace(&mut self.state, BubbleState::Destroyed) {
            BubbleState::Shown(mut window) => {
                window.lifecycle.destroy();
                if let Err(e) = self.surface.remove_window(window.id) {
                    // The host may have dropped the window already; not an error path
                    error!(id = window.id, error = %e, "bubble window removal failed");
                }
            }
            BubbleState::Hidden | BubbleState::Destroyed => {}
        }
    }
}
