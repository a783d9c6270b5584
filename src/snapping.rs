//! Pure screen-space geometry for bubble edge-snapping and the delete zone
//! overlap test. Stateless beyond the screen dimensions captured at
//! construction.

use crate::constants::geometry::EDGE_MARGIN;
use crate::types::{Dimensions, Position};

/// Placement of the delete zone relative to the bottom screen edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneGeometry {
    pub dimensions: Dimensions,
    /// Gap between the zone's bottom edge and the screen's bottom edge
    pub bottom_offset: i32,
}

impl ZoneGeometry {
    pub fn new(dimensions: Dimensions, bottom_offset: i32) -> Self {
        Self {
            dimensions,
            bottom_offset,
        }
    }

    /// Zero-sized placeholder for a zone whose window has not been laid out
    pub fn unmeasured() -> Self {
        Self {
            dimensions: Dimensions::new(0, 0),
            bottom_offset: 0,
        }
    }
}

/// Snap-target and overlap math for one screen
#[derive(Debug, Clone, Copy)]
pub struct SnapGeometry {
    screen: Dimensions,
}

impl SnapGeometry {
    pub fn new(screen: Dimensions) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> Dimensions {
        self.screen
    }

    /// X coordinate the bubble should settle at after a drag ends.
    ///
    /// Left margin when the bubble sits strictly left of the horizontal
    /// center (adjusted for bubble width), otherwise the right margin. A
    /// bubble exactly at center snaps right; the comparison is strict.
    pub fn snap_target_x(&self, current_x: i32, bubble_width: u32) -> i32 {
        let usable = self.screen.width as i32 - bubble_width as i32;
        if current_x < usable / 2 {
            EDGE_MARGIN
        } else {
            usable - EDGE_MARGIN
        }
    }

    /// Circle-overlap test between the bubble and the delete zone.
    ///
    /// The zone is centered horizontally, `bottom_offset` above the bottom
    /// screen edge. True iff the distance between centers is less than the
    /// sum of the two radii (half of each width). An unmeasured zone
    /// (width 0) never overlaps.
    pub fn is_over_delete_zone(
        &self,
        bubble_position: Position,
        bubble: Dimensions,
        zone: ZoneGeometry,
    ) -> bool {
        if zone.dimensions.width == 0 {
            return false;
        }

        let bubble_cx = f64::from(bubble_position.x) + f64::from(bubble.width) / 2.0;
        let bubble_cy = f64::from(bubble_position.y) + f64::from(bubble.height) / 2.0;

        let zone_cx = f64::from(self.screen.width) / 2.0;
        let zone_cy = f64::from(self.screen.height)
            - f64::from(zone.bottom_offset)
            - f64::from(zone.dimensions.height) / 2.0;

        let dx = bubble_cx - zone_cx;
        let dy = bubble_cy - zone_cy;
        let distance = (dx * dx + dy * dy).sqrt();

        let radii = f64::from(bubble.width) / 2.0 + f64::from(zone.dimensions.width) / 2.0;
        distance < radii
    }
}
