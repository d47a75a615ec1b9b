//! Grid snapping for pointer-derived coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Grid used to anchor groups and to lay out link labels.
pub const GROUP_GRID_SIZE: f64 = 20.0;

/// Snap mode for pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to grid intersections.
    #[default]
    Grid,
}

/// Snap a point to the nearest grid intersection.
///
/// A non-positive grid step leaves the point unchanged.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap a point according to the given mode.
pub fn snap_point(point: Point, mode: SnapMode, grid_size: f64) -> Point {
    match mode {
        SnapMode::Grid => snap_to_grid(point, grid_size),
        SnapMode::None => point,
    }
}
