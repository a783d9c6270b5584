//! Application-wide constants
//!
//! Single source of truth for the geometry, timing and appearance values
//! used by the overlay controllers.

/// Screen-space geometry constants
pub mod geometry {
    /// Horizontal gap between a snapped bubble and the screen edge, in pixels
    pub const EDGE_MARGIN: i32 = 20;

    /// Delete zone window side length, in pixels
    pub const DELETE_ZONE_SIZE: u32 = 96;

    /// Gap between the delete zone and the bottom screen edge, in pixels
    pub const DELETE_ZONE_BOTTOM_OFFSET: i32 = 48;

    /// Vertical position a fresh bubble spawns at before any drag
    pub const DEFAULT_BUBBLE_Y: i32 = 240;
}

/// Animation timing constants
pub mod timing {
    use std::time::Duration;

    /// Edge-snap animation after a drag ends away from the delete zone
    pub const SNAP_DURATION: Duration = Duration::from_millis(300);

    /// Delete zone fade/scale in and out
    pub const ZONE_FADE_DURATION: Duration = Duration::from_millis(500);

    /// Delay between the delete zone fade-out starting and its window being
    /// hidden, guarding against overlapping show/hide from fast re-drags
    pub const ZONE_HIDE_LINGER: Duration = Duration::from_millis(300);

    /// Delete zone highlight preset switch while a drag hovers it
    pub const ZONE_HIGHLIGHT_DURATION: Duration = Duration::from_millis(150);

    /// Dialog entrance and exit transition
    pub const DIALOG_TRANSITION: Duration = Duration::from_millis(300);

    /// Default minimum interval between drag layout updates sent to the
    /// host window manager. Tunable per controller; this default tracks a
    /// 120 Hz display.
    pub const DEFAULT_DRAG_THROTTLE: Duration = Duration::from_millis(8);
}

/// Alpha/scale presets for animated windows
pub mod appearance {
    /// Delete zone resting preset while a drag is in progress
    pub const ZONE_RESTING: (f32, f32) = (0.7, 0.7);

    /// Delete zone preset while the bubble overlaps it
    pub const ZONE_HIGHLIGHT: (f32, f32) = (1.0, 1.0);

    /// Fully faded out
    pub const GONE: (f32, f32) = (0.0, 0.0);

    /// Dialog entrance start point (slightly shrunk, invisible)
    pub const DIALOG_HIDDEN: (f32, f32) = (0.0, 0.8);

    /// Dialog fully presented
    pub const DIALOG_SHOWN: (f32, f32) = (1.0, 1.0);
}

/// Settings validation bounds
pub mod validation {
    /// Smallest usable bubble side length, in pixels
    pub const MIN_BUBBLE_SIZE: u32 = 24;

    /// Largest bubble side length, in pixels
    pub const MAX_BUBBLE_SIZE: u32 = 256;
}

/// Settings file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "vocab-bubble";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}
