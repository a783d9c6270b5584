//! Host platform capability contracts
//!
//! The overlay core never talks to a concrete window system. Everything it
//! needs from the host is expressed as a small trait here, injected at
//! construction: floating surface management, haptics, screen power
//! notifications, the foreground-service indicator, and the best-effort
//! position sink. Every surface call may fail; callers treat failures as
//! best-effort and log them rather than aborting a gesture.

use std::sync::mpsc;

use anyhow::Result;

use crate::types::{Dimensions, Position, WindowDescriptor};

/// Handle to a live floating window, minted by the host on creation
pub type WindowId = u32;

/// Capability to create, mutate and remove floating windows.
///
/// Methods take `&self`: hosts are expected to serialize mutation internally
/// the way a display-server connection does. All calls happen on the single
/// UI-affine thread that owns the controllers.
pub trait WindowSurface {
    fn create_window(&self, descriptor: &WindowDescriptor) -> Result<WindowId>;

    fn move_window(&self, id: WindowId, position: Position) -> Result<()>;

    fn resize_window(&self, id: WindowId, dimensions: Dimensions) -> Result<()>;

    fn set_visible(&self, id: WindowId, visible: bool) -> Result<()>;

    /// Opacity (0.0-1.0) and uniform scale applied to the window content
    fn set_appearance(&self, id: WindowId, alpha: f32, scale: f32) -> Result<()>;

    /// Removing an already-removed window must be tolerated by callers;
    /// hosts may return an error, which is logged and swallowed.
    fn remove_window(&self, id: WindowId) -> Result<()>;
}

/// Capability to issue one short predefined vibration pulse
pub trait Haptics {
    fn pulse(&self);
}

/// Best-effort persistence for the bubble position, called off the UI path
/// from the saver worker. Failures are logged there and never retried.
pub trait PositionSink: Send + Sync {
    fn save(&self, position: Position) -> Result<()>;
}

/// Named-method observer for bubble gestures, injected into the bubble
/// controller at construction
pub trait BubbleEvents {
    /// Bubble was tapped without any drag in the same gesture
    fn tapped(&self);

    /// Bubble was dropped on the delete zone; the host decides whether to
    /// tear the service down
    fn removed_by_user(&self);
}

/// Screen power transitions delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Off,
    On,
}

/// Service-level host capabilities: the foreground-visible indicator the OS
/// requires for a long-lived background window, and screen on/off
/// notification registration
pub trait ServiceHost {
    fn start_foreground(&self) -> Result<()>;

    fn stop_foreground(&self) -> Result<()>;

    /// Register for screen on/off notifications. Events arrive on the
    /// returned channel and are drained by the service pump.
    fn register_screen_events(&self) -> Result<mpsc::Receiver<ScreenEvent>>;

    /// May fail with a "was not registered" error, which the service
    /// tolerates at teardown.
    fn unregister_screen_events(&self) -> Result<()>;
}
