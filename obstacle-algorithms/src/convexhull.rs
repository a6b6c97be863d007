use float_ord::FloatOrd;
use obstacle_core::{
    math::{orientation, Polygon2D},
    nalgebra::Point2,
};

/// Capability to compute the planar convex hull of a set of points
pub trait ConvexHullBuilder {
    /// Returns the indices into `points` of the vertices of the convex hull, in counter-clockwise order.
    /// Points that lie in the interior of the hull or on one of its edges are not part of the result
    fn hull_indices(&self, points: &[Point2<f64>]) -> Vec<usize>;

    /// Returns the convex hull of `points` as a counter-clockwise polygon. For collinear or coincident
    /// input, the polygon has fewer than three vertices
    fn hull(&self, points: &[Point2<f64>]) -> Polygon2D {
        let vertices = self
            .hull_indices(points)
            .into_iter()
            .map(|index| points[index])
            .collect();
        Polygon2D::from_ccw_vertices(vertices)
    }
}

/// Andrew's monotone chain algorithm, O(n log n)
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotoneChain;

impl ConvexHullBuilder for MonotoneChain {
    fn hull_indices(&self, points: &[Point2<f64>]) -> Vec<usize> {
        let mut order = (0..points.len()).collect::<Vec<_>>();
        // Stable sort, so that the first of several coincident points is the one that survives
        order.sort_by_key(|index| (FloatOrd(points[*index].x), FloatOrd(points[*index].y)));
        order.dedup_by(|a, b| points[*a] == points[*b]);

        if order.len() < 3 {
            return order;
        }

        let lower = half_hull(points, order.iter().copied());
        let upper = half_hull(points, order.iter().rev().copied());

        // The last vertex of each half is the first vertex of the other half
        let mut hull = Vec::with_capacity(lower.len() + upper.len() - 2);
        hull.extend_from_slice(&lower[..lower.len() - 1]);
        hull.extend_from_slice(&upper[..upper.len() - 1]);
        hull
    }
}

fn half_hull<I: Iterator<Item = usize>>(points: &[Point2<f64>], sorted: I) -> Vec<usize> {
    let mut chain: Vec<usize> = vec![];
    for index in sorted {
        while chain.len() >= 2
            && orientation(
                &points[chain[chain.len() - 2]],
                &points[chain[chain.len() - 1]],
                &points[index],
            ) <= 0.0
        {
            chain.pop();
        }
        chain.push(index);
    }
    chain
}

/// Indices of the convex hull vertices of `points`, counter-clockwise, starting at the point with the
/// smallest x-coordinate (smallest y-coordinate on ties)
pub fn convex_hull_indices(points: &[Point2<f64>]) -> Vec<usize> {
    MonotoneChain.hull_indices(points)
}

/// Convex hull of `points` as a counter-clockwise polygon
///
/// ```
/// # use obstacle_core::nalgebra::Point2;
/// # use obstacle_algorithms::convexhull::convex_hull;
/// let points = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.5, 0.5),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let hull = convex_hull(&points);
/// assert_eq!(hull.len(), 4);
/// assert!(hull.is_ccw());
/// ```
pub fn convex_hull(points: &[Point2<f64>]) -> Polygon2D {
    MonotoneChain.hull(points)
}
