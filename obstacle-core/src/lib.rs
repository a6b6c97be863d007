#![warn(clippy::all)]

//! Core data structures for extracting obstacle volumes from LIDAR point clouds
//!
//! The input of the obstacle extraction is a [PointCloud](crate::pointcloud::PointCloud): non-ground
//! positions together with their height above ground. The output is a list of
//! [ObstacleRecord](crate::obstacle::ObstacleRecord) values, each one a rectangular footprint with a
//! vertical extent. The algorithms that connect the two live in the `obstacle-algorithms` crate.

pub extern crate nalgebra;

/// Error type shared by the obstacle crates
pub mod error;
/// Planar and volumetric geometry primitives
pub mod math;
/// Obstacle records, the output of an extraction run
pub mod obstacle;
/// Point cloud input and cluster labels
pub mod pointcloud;
/// Utilities
pub mod util;

pub use error::{ObstacleError, Result};
