use obstacle_core::{
    math::{Box3D, Rectangle},
    nalgebra::Point3,
};

/// Extrudes the planar `footprint` into a box spanning `z_min..=z_max`. The first four vertices are the
/// corners of the footprint at `z_min`, the last four the same corners at `z_max`, so that vertex `i` lies
/// directly below vertex `i + 4`
pub fn extrude(footprint: &Rectangle, z_min: f64, z_max: f64) -> Box3D {
    let corners = footprint.corners();
    let at = |i: usize, z: f64| Point3::new(corners[i].x, corners[i].y, z);
    Box3D::from_vertices([
        at(0, z_min),
        at(1, z_min),
        at(2, z_min),
        at(3, z_min),
        at(0, z_max),
        at(1, z_max),
        at(2, z_max),
        at(3, z_max),
    ])
}
