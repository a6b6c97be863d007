use std::fmt;

use nalgebra::Point2;

use crate::math::{Box3D, Rectangle};

/// Grid cell of a tile within the tiling of an oversized cluster. Columns run along x, rows along y,
/// both counted from the minimum corner of the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCell {
    pub column: usize,
    pub row: usize,
}

impl fmt::Display for TileCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Where an obstacle record came from: the cluster, the tile within that cluster (if the cluster was
/// tiled) and the number of points the record was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleOrigin {
    pub cluster: usize,
    pub tile: Option<TileCell>,
    pub point_count: usize,
}

/// A single detected obstacle: a box with a rectangular footprint spanning the vertical extent of the
/// points it was computed from, together with the maximum height above ground of those points
///
/// Records are created once by the collector and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleRecord {
    volume: Box3D,
    max_height_above_ground: f64,
    origin: ObstacleOrigin,
}

impl ObstacleRecord {
    pub fn new(volume: Box3D, max_height_above_ground: f64, origin: ObstacleOrigin) -> Self {
        Self {
            volume,
            max_height_above_ground,
            origin,
        }
    }

    /// The footprint of this obstacle, i.e. the bottom face of its volume projected onto the xy-plane
    pub fn footprint(&self) -> Rectangle {
        let bottom = self.volume.bottom();
        Rectangle::from_corners([
            Point2::new(bottom[0].x, bottom[0].y),
            Point2::new(bottom[1].x, bottom[1].y),
            Point2::new(bottom[2].x, bottom[2].y),
            Point2::new(bottom[3].x, bottom[3].y),
        ])
    }

    /// Lowest z-coordinate of the points of this obstacle
    pub fn z_min(&self) -> f64 {
        self.volume.bottom()[0].z
    }

    /// Highest z-coordinate of the points of this obstacle
    pub fn z_max(&self) -> f64 {
        self.volume.top()[0].z
    }

    pub fn max_height_above_ground(&self) -> f64 {
        self.max_height_above_ground
    }

    /// The eight vertices of the obstacle volume, bottom face first
    pub fn volume(&self) -> &Box3D {
        &self.volume
    }

    pub fn origin(&self) -> &ObstacleOrigin {
        &self.origin
    }
}
