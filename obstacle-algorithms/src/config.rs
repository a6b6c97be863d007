use obstacle_core::error::{ensure_non_negative, ensure_non_zero, ensure_positive, Result};

/// Default clustering neighbourhood radius
pub const DEFAULT_EPS: f64 = 10.0;
/// Default extent above which a cluster is split into tiles
pub const DEFAULT_CLUSTER_SIZE_THRESHOLD: f64 = 1000.0;
/// Default side length of a tile
pub const DEFAULT_TILE_SIZE: f64 = 100.0;

/// Parameters of an obstacle extraction run
///
/// Only `min_points` has no sensible default and must be given by the caller. All other values can be
/// overridden through the builder-style setters:
/// ```
/// # use obstacle_algorithms::config::ObstacleConfig;
/// let config = ObstacleConfig::new(150).with_eps(5.0).with_tile_size(50.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.cluster_size_threshold(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleConfig {
    eps: f64,
    min_points: usize,
    cluster_size_threshold: f64,
    tile_size: f64,
}

impl ObstacleConfig {
    pub fn new(min_points: usize) -> Self {
        Self {
            eps: DEFAULT_EPS,
            min_points,
            cluster_size_threshold: DEFAULT_CLUSTER_SIZE_THRESHOLD,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_cluster_size_threshold(mut self, threshold: f64) -> Self {
        self.cluster_size_threshold = threshold;
        self
    }

    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Clustering neighbourhood radius
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Minimum number of points (including the point itself) within `eps` for a core point
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Clusters whose larger planar extent exceeds this value are split into tiles
    pub fn cluster_size_threshold(&self) -> f64 {
        self.cluster_size_threshold
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Checks that all parameters are in their valid range
    pub fn validate(&self) -> Result<()> {
        ensure_positive("eps", self.eps)?;
        ensure_non_zero("min_points", self.min_points)?;
        ensure_non_negative("cluster_size_threshold", self.cluster_size_threshold)?;
        ensure_positive("tile_size", self.tile_size)?;
        Ok(())
    }
}
