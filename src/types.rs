//! Shared value types for the overlay windows

use serde::{Deserialize, Serialize};

/// Top-left screen coordinate in device pixels, gravity-relative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Window size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square dimensions, used for the bubble window
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// User-configurable bubble appearance and behavior
///
/// Owned by the settings store and observed continuously for the lifetime of
/// the bubble window. Updates mutate the live window, never re-create it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleSettings {
    /// Bubble side length in pixels
    pub size_px: u32,
    /// Window opacity, 0-100
    pub alpha_percent: u8,
    /// Haptic pulse on bubble tap
    pub vibration: bool,
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            size_px: 64,
            alpha_percent: 90,
            vibration: true,
        }
    }
}

impl BubbleSettings {
    /// Opacity as a 0.0-1.0 factor for the host window surface
    pub fn alpha(&self) -> f32 {
        f32::from(self.alpha_percent.min(100)) / 100.0
    }
}

/// The three floating window roles managed by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Bubble,
    DeleteZone,
    Dialog,
}

/// Anchor corner/edge the descriptor coordinates are relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    TopStart,
    BottomCenter,
    Center,
}

/// Host-interpreted behavior flags for a floating window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFlags {
    /// Window never takes keyboard focus
    pub not_focusable: bool,
    /// Host reports touches outside the window (dialog dismissal)
    pub watch_outside_touch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Translucent,
    Opaque,
}

/// Opaque configuration the host platform uses to create a floating surface
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub kind: WindowKind,
    pub dimensions: Dimensions,
    pub position: Position,
    pub gravity: Gravity,
    pub flags: WindowFlags,
    pub pixel_format: PixelFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_factor_from_percent() {
        let settings = BubbleSettings {
            alpha_percent: 50,
            ..Default::default()
        };
        assert!((settings.alpha() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_alpha_factor_clamps_above_100() {
        let settings = BubbleSettings {
            alpha_percent: 255,
            ..Default::default()
        };
        assert!((settings.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offset_by_accumulates_deltas() {
        let pos = Position::new(10, 20).offset_by(-15, 5);
        assert_eq!(pos, Position::new(-5, 25));
    }
}
