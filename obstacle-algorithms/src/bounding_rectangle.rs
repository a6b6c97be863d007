use std::f64::consts::FRAC_PI_2;

use float_ord::FloatOrd;
use obstacle_core::{
    error::{ObstacleError, Result},
    math::{Polygon2D, Rectangle},
    nalgebra::{Point2, Rotation2},
};

/// Edge angles of `hull` reduced to `[0, π/2)`, unique and ascending. The closing edge from the last to the
/// first vertex is included. A hull without edges yields the single angle 0
fn caliper_angles(hull: &Polygon2D) -> Vec<f64> {
    let mut angles = hull
        .edges()
        .map(|(start, end)| {
            let angle = (end.y - start.y).atan2(end.x - start.x).rem_euclid(FRAC_PI_2);
            // rem_euclid can round up to the modulus itself for tiny negative angles, and yields -0.0
            if angle >= FRAC_PI_2 || angle == 0.0 {
                0.0
            } else {
                angle
            }
        })
        .collect::<Vec<_>>();
    if angles.is_empty() {
        angles.push(0.0);
    }
    angles.sort_by_key(|angle| FloatOrd(*angle));
    angles.dedup();
    angles
}

/// Axis-aligned bounds of `points` after rotating them by `rotation`, as `(min, max)`
fn rotated_bounds(points: &[Point2<f64>], rotation: &Rotation2<f64>) -> (Point2<f64>, Point2<f64>) {
    let first = rotation * points[0];
    points[1..]
        .iter()
        .map(|point| rotation * point)
        .fold((first, first), |(min, max), point| {
            (
                Point2::new(min.x.min(point.x), min.y.min(point.y)),
                Point2::new(max.x.max(point.x), max.y.max(point.y)),
            )
        })
}

/// Computes the minimum-area rectangle enclosing the convex polygon `hull` using rotating calipers
///
/// The minimum-area enclosing rectangle of a convex polygon has one side collinear with an edge of the
/// polygon. For every unique edge angle (modulo 90°, ascending), the hull is rotated by the negative angle
/// and its axis-aligned bounding box is measured. The box with the smallest area wins, on ties the one
/// found first. Its corners are rotated back into the frame of the hull and returned in counter-clockwise
/// order, starting with the corner that was the minimum of the axis-aligned box.
///
/// Hulls with one or two vertices produce a degenerate rectangle with zero width and/or height. An empty
/// hull is rejected with `InvalidParameter`.
///
/// ```
/// # use obstacle_core::{math::Polygon2D, nalgebra::Point2};
/// # use obstacle_algorithms::bounding_rectangle::minimum_bounding_rectangle;
/// let diamond = Polygon2D::from_ccw_vertices(vec![
///     Point2::new(1.0, 0.0),
///     Point2::new(2.0, 1.0),
///     Point2::new(1.0, 2.0),
///     Point2::new(0.0, 1.0),
/// ]);
/// let rectangle = minimum_bounding_rectangle(&diamond).unwrap();
/// assert!((rectangle.area() - 2.0).abs() < 1e-9);
/// ```
pub fn minimum_bounding_rectangle(hull: &Polygon2D) -> Result<Rectangle> {
    if hull.is_empty() {
        return Err(ObstacleError::invalid_parameter(
            "hull",
            "must contain at least one vertex",
        ));
    }

    let points = hull.vertices();
    let mut best: Option<(f64, f64, Point2<f64>, Point2<f64>)> = None;
    for angle in caliper_angles(hull) {
        let (min, max) = rotated_bounds(points, &Rotation2::new(-angle));
        let area = (max.x - min.x) * (max.y - min.y);
        let is_better = match &best {
            Some((best_area, ..)) => area < *best_area,
            None => true,
        };
        if is_better {
            best = Some((area, angle, min, max));
        }
    }

    let (_, angle, min, max) = best.ok_or_else(|| {
        ObstacleError::invalid_parameter("hull", "must contain at least one vertex")
    })?;
    let back = Rotation2::new(angle);
    Ok(Rectangle::from_corners([
        back * min,
        back * Point2::new(max.x, min.y),
        back * max,
        back * Point2::new(min.x, max.y),
    ]))
}
