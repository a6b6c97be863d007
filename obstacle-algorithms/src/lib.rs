#![warn(clippy::all)]
//! Algorithms that turn a point cloud into obstacle records.
//!
//! The pipeline clusters the points with DBSCAN, splits clusters that are too large for a single
//! footprint into tiles and computes a minimum-area bounding rectangle for every cluster or tile, which
//! is then extruded over the vertical extent of its points. [collector::ObstacleDetector] runs all steps.

// Convex hull of planar point sets (Andrew's monotone chain).
pub mod convexhull;
// Minimum-area enclosing rectangle of a convex polygon using rotating calipers.
pub mod bounding_rectangle;
// Density-based clustering of 3D positions.
pub mod clustering;
// Obstacle detection pipeline and the collector for its results.
pub mod collector;
// Parameters of an extraction run.
pub mod config;
// Extrusion of footprints into boxes.
pub mod extrusion;
// Grouping of labelled points into clusters and tiling of oversized clusters.
pub mod partition;
