use nalgebra::Point3;

/// Box with a rectangular footprint and a vertical extent, given by its eight vertices
///
/// The first four vertices form the bottom face, the last four the top face. Both faces share the
/// vertex order of the footprint, so `bottom()[i]` lies directly below `top()[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3D {
    vertices: [Point3<f64>; 8],
}

impl Box3D {
    pub fn from_vertices(vertices: [Point3<f64>; 8]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point3<f64>; 8] {
        &self.vertices
    }

    pub fn bottom(&self) -> &[Point3<f64>] {
        &self.vertices[..4]
    }

    pub fn top(&self) -> &[Point3<f64>] {
        &self.vertices[4..]
    }

    /// Vertical distance between the bottom and the top face
    pub fn height(&self) -> f64 {
        self.vertices[4].z - self.vertices[0].z
    }
}
