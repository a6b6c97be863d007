use nalgebra::{Point2, Vector2};

/// 2D cross product of `(b - a)` and `(c - a)`. Positive if `a`, `b`, `c` turn counter-clockwise,
/// negative for a clockwise turn and zero if the three points are collinear
pub fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab: Vector2<f64> = b - a;
    let ac: Vector2<f64> = c - a;
    ab.x * ac.y - ab.y * ac.x
}

fn signed_area(vertices: &[Point2<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice_area / 2.0
}

/// Ordered sequence of planar vertices, wound counter-clockwise
///
/// A polygon with fewer than three vertices is degenerate: it is either a single point or a line
/// segment and has an area of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon2D {
    vertices: Vec<Point2<f64>>,
}

impl Polygon2D {
    /// Creates a polygon from vertices that are already in counter-clockwise order
    pub fn from_ccw_vertices(vertices: Vec<Point2<f64>>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True if the polygon has fewer than three vertices
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Area using the shoelace formula
    /// ```
    /// # use obstacle_core::math::Polygon2D;
    /// # use nalgebra::Point2;
    /// let triangle = Polygon2D::from_ccw_vertices(vec![
    ///     Point2::new(0.0, 0.0),
    ///     Point2::new(2.0, 0.0),
    ///     Point2::new(0.0, 2.0),
    /// ]);
    /// assert_eq!(triangle.area(), 2.0);
    /// ```
    pub fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    /// True if the vertices wind counter-clockwise. Degenerate polygons count as counter-clockwise
    pub fn is_ccw(&self) -> bool {
        signed_area(&self.vertices) >= 0.0
    }

    /// Iterates over all edges `(start, end)`, including the closing edge from the last to the first vertex
    pub fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> + '_ {
        let edge_count = match self.vertices.len() {
            0 | 1 => 0,
            2 => 1,
            n => n,
        };
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .take(edge_count)
    }
}

/// Four-cornered footprint of an obstacle, corners in counter-clockwise order
///
/// The rectangle is allowed to be degenerate (zero width and/or height) when it was computed from
/// collinear or coincident points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    corners: [Point2<f64>; 4],
}

impl Rectangle {
    /// Creates a rectangle from four corners in counter-clockwise order
    pub fn from_corners(corners: [Point2<f64>; 4]) -> Self {
        Self { corners }
    }

    pub fn corners(&self) -> &[Point2<f64>; 4] {
        &self.corners
    }

    /// Length of the first edge (corner 0 to corner 1)
    pub fn width(&self) -> f64 {
        (self.corners[1] - self.corners[0]).norm()
    }

    /// Length of the second edge (corner 1 to corner 2)
    pub fn height(&self) -> f64 {
        (self.corners[2] - self.corners[1]).norm()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True if the rectangle has zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::from((self.corners[0].coords + self.corners[2].coords) / 2.0)
    }

    /// Returns true if `point` lies inside the rectangle or within `tolerance` of its boundary
    pub fn contains(&self, point: &Point2<f64>, tolerance: f64) -> bool {
        let origin = self.corners[0];
        let u: Vector2<f64> = self.corners[1] - origin;
        let v: Vector2<f64> = self.corners[3] - origin;
        let p: Vector2<f64> = point - origin;
        let inside_axis = |axis: &Vector2<f64>| {
            let length = axis.norm();
            if length == 0.0 {
                // Degenerate axis, the other axis covers the point
                return true;
            }
            let projected = p.dot(axis) / length;
            projected >= -tolerance && projected <= length + tolerance
        };
        let inside_normal = |axis: &Vector2<f64>, other: &Vector2<f64>| {
            // For a degenerate rectangle, check the distance to the supporting line
            if other.norm() != 0.0 || axis.norm() == 0.0 {
                return true;
            }
            let normal = Vector2::new(-axis.y, axis.x) / axis.norm();
            p.dot(&normal).abs() <= tolerance
        };
        if u.norm() == 0.0 && v.norm() == 0.0 {
            return p.norm() <= tolerance;
        }
        inside_axis(&u) && inside_axis(&v) && inside_normal(&u, &v) && inside_normal(&v, &u)
    }

    /// Returns the footprint as a general polygon
    pub fn to_polygon(&self) -> Polygon2D {
        Polygon2D::from_ccw_vertices(self.corners.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn unit_square() -> Rectangle {
        Rectangle::from_corners([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_orientation() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orientation(&a, &b, &Point2::new(1.0, 1.0)) > 0.0);
        assert!(orientation(&a, &b, &Point2::new(1.0, -1.0)) < 0.0);
        assert_eq!(orientation(&a, &b, &Point2::new(3.0, 0.0)), 0.0);
    }

    #[test]
    fn test_polygon_winding() {
        let ccw = unit_square().to_polygon();
        assert!(ccw.is_ccw());
        assert_approx_eq!(ccw.area(), 1.0);

        let mut reversed = ccw.vertices().to_vec();
        reversed.reverse();
        let cw = Polygon2D::from_ccw_vertices(reversed);
        assert!(!cw.is_ccw());
        assert_approx_eq!(cw.area(), 1.0);
    }

    #[test]
    fn test_polygon_edges() {
        assert_eq!(unit_square().to_polygon().edges().count(), 4);
        let segment =
            Polygon2D::from_ccw_vertices(vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)]);
        assert_eq!(segment.edges().count(), 1);
        assert!(segment.is_degenerate());
        assert_eq!(segment.area(), 0.0);
    }

    #[test]
    fn test_rectangle_measures() {
        let rect = Rectangle::from_corners([
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        assert_approx_eq!(rect.width(), 4.0);
        assert_approx_eq!(rect.height(), 2.0);
        assert_approx_eq!(rect.area(), 8.0);
        assert_eq!(rect.center(), Point2::new(2.0, 1.0));
        assert!(!rect.is_degenerate());
    }

    #[test]
    fn test_rectangle_contains() {
        let rect = unit_square();
        assert!(rect.contains(&Point2::new(0.5, 0.5), 1e-9));
        assert!(rect.contains(&Point2::new(1.0, 1.0), 1e-9));
        assert!(!rect.contains(&Point2::new(1.1, 0.5), 1e-9));
        assert!(rect.contains(&Point2::new(1.0 + 1e-12, 0.5), 1e-9));
    }

    #[test]
    fn test_degenerate_rectangle_contains() {
        let segment = Rectangle::from_corners([
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 0.0),
        ]);
        assert!(segment.is_degenerate());
        assert_eq!(segment.area(), 0.0);
        assert!(segment.contains(&Point2::new(1.0, 0.0), 1e-9));
        assert!(!segment.contains(&Point2::new(1.0, 0.5), 1e-9));

        let point = Rectangle::from_corners([Point2::new(3.0, 3.0); 4]);
        assert!(point.contains(&Point2::new(3.0, 3.0), 1e-9));
        assert!(!point.contains(&Point2::new(3.0, 3.1), 1e-9));
    }
}
