use std::fmt;

use nalgebra::{Point2, Vector3};

use crate::error::{ObstacleError, Result};

/// Non-ground LIDAR returns: one position per point and, index-aligned with the positions, the
/// height of that point above the ground surface.
///
/// The two sequences always have the same length; this is checked when the point cloud is created.
/// ```
/// # use obstacle_core::pointcloud::PointCloud;
/// # use obstacle_core::nalgebra::Vector3;
/// let cloud = PointCloud::new(
///     vec![Vector3::new(0.0, 0.0, 12.0), Vector3::new(1.0, 0.0, 14.0)],
///     vec![2.0, 4.0],
/// )
/// .unwrap();
/// assert_eq!(cloud.len(), 2);
/// assert!(PointCloud::new(vec![Vector3::new(0.0, 0.0, 0.0)], vec![]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vector3<f64>>,
    height_above_ground: Vec<f64>,
}

impl PointCloud {
    /// Creates a new `PointCloud` from the given positions and height-above-ground values. Returns
    /// `ObstacleError::ShapeMismatch` if the two sequences differ in length
    pub fn new(positions: Vec<Vector3<f64>>, height_above_ground: Vec<f64>) -> Result<Self> {
        if positions.len() != height_above_ground.len() {
            return Err(ObstacleError::ShapeMismatch {
                positions: positions.len(),
                heights: height_above_ground.len(),
            });
        }
        Ok(Self {
            positions,
            height_above_ground,
        })
    }

    /// Creates an empty `PointCloud` with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            height_above_ground: Vec::with_capacity(capacity),
        }
    }

    /// Appends a single point
    pub fn push(&mut self, position: Vector3<f64>, height_above_ground: f64) {
        self.positions.push(position);
        self.height_above_ground.push(height_above_ground);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn heights_above_ground(&self) -> &[f64] {
        &self.height_above_ground
    }

    /// Returns the position of the point at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn position(&self, index: usize) -> &Vector3<f64> {
        &self.positions[index]
    }

    /// Returns the height above ground of the point at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn height_above_ground(&self, index: usize) -> f64 {
        self.height_above_ground[index]
    }

    /// Returns the planar (x, y) projection of the point at `index`
    pub fn planar_position(&self, index: usize) -> Point2<f64> {
        let position = &self.positions[index];
        Point2::new(position.x, position.y)
    }
}

impl std::iter::FromIterator<(Vector3<f64>, f64)> for PointCloud {
    fn from_iter<I: IntoIterator<Item = (Vector3<f64>, f64)>>(iter: I) -> Self {
        let (positions, height_above_ground) = iter.into_iter().unzip();
        Self {
            positions,
            height_above_ground,
        }
    }
}

/// The label that a clusterer assigns to a single point
///
/// `Noise` is the reserved "unassigned" label. Noise points never take part in any downstream geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    Noise,
    Cluster(usize),
}

impl ClusterLabel {
    /// Returns the cluster id, or `None` for noise
    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            ClusterLabel::Noise => None,
            ClusterLabel::Cluster(id) => Some(*id),
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterLabel::Noise => write!(f, "noise"),
            ClusterLabel::Cluster(id) => write!(f, "cluster {}", id),
        }
    }
}
