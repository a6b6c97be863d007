use nalgebra::{Point2, Vector2};

/// Planar axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Bounds2D {
    /// Creates new bounds from the given minimum and maximum coordinates. Panics if the minimum position is
    /// not less than or equal to the maximum position
    /// ```
    /// # use obstacle_core::math::Bounds2D;
    /// let bounds = Bounds2D::from_min_max(nalgebra::Point2::new(0.0, 0.0), nalgebra::Point2::new(1.0, 2.0));
    /// ```
    pub fn from_min_max(min: Point2<f64>, max: Point2<f64>) -> Self {
        if min.x > max.x || min.y > max.y {
            panic!("Bounds2D::from_min_max: Minimum position must be <= maximum position!");
        }
        Self { min, max }
    }

    /// Creates new bounds from the given minimum and maximum coordinates without checking that min <= max
    pub fn from_min_max_unchecked(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Computes the tightest bounds around all given points. Returns `None` if `points` is empty
    /// ```
    /// # use obstacle_core::math::Bounds2D;
    /// # use nalgebra::Point2;
    /// let bounds = Bounds2D::from_points(vec![Point2::new(1.0, 5.0), Point2::new(-2.0, 3.0)]).unwrap();
    /// assert_eq!(*bounds.min(), Point2::new(-2.0, 3.0));
    /// assert_eq!(*bounds.max(), Point2::new(1.0, 5.0));
    /// ```
    pub fn from_points<I: IntoIterator<Item = Point2<f64>>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let initial = Self::from_min_max_unchecked(first, first);
        Some(iter.fold(initial, |bounds, point| bounds.extend_with_point(&point)))
    }

    pub fn min(&self) -> &Point2<f64> {
        &self.min
    }

    pub fn max(&self) -> &Point2<f64> {
        &self.max
    }

    /// Returns the size between the minimum and maximum position along each axis
    pub fn extent(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Returns the larger of the x- and y-extent
    /// ```
    /// # use obstacle_core::math::Bounds2D;
    /// let bounds = Bounds2D::from_min_max(nalgebra::Point2::new(0.0, 0.0), nalgebra::Point2::new(3.0, 7.0));
    /// assert_eq!(bounds.max_extent(), 7.0);
    /// ```
    pub fn max_extent(&self) -> f64 {
        let extent = self.extent();
        f64::max(extent.x, extent.y)
    }

    pub fn area(&self) -> f64 {
        let extent = self.extent();
        extent.x * extent.y
    }

    /// Returns true if `point` lies inside these bounds or on their boundary
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns true if `point` lies in the half-open region `[min.x, max.x) × [min.y, max.y)`
    pub fn contains_half_open(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Returns these bounds extended so that they contain `point`
    pub fn extend_with_point(&self, point: &Point2<f64>) -> Self {
        Self {
            min: Point2::new(f64::min(self.min.x, point.x), f64::min(self.min.y, point.y)),
            max: Point2::new(f64::max(self.max.x, point.x), f64::max(self.max.y, point.y)),
        }
    }

    /// Returns the four corners in counter-clockwise order, starting at the minimum corner
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_empty() {
        let points: Vec<Point2<f64>> = vec![];
        assert!(Bounds2D::from_points(points).is_none());
    }

    #[test]
    fn test_extent_and_area() {
        let bounds = Bounds2D::from_points(vec![
            Point2::new(2.0, 1.0),
            Point2::new(-1.0, 4.0),
            Point2::new(0.5, 0.5),
        ])
        .unwrap();
        assert_eq!(bounds.extent(), Vector2::new(3.0, 3.5));
        assert_eq!(bounds.max_extent(), 3.5);
        assert_eq!(bounds.area(), 10.5);
    }

    #[test]
    fn test_half_open_membership() {
        let bounds = Bounds2D::from_min_max(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(bounds.contains_half_open(&Point2::new(0.0, 0.0)));
        assert!(!bounds.contains_half_open(&Point2::new(1.0, 0.5)));
        assert!(!bounds.contains_half_open(&Point2::new(0.5, 1.0)));
        assert!(bounds.contains(&Point2::new(1.0, 1.0)));
    }

    #[test]
    #[should_panic]
    fn test_from_min_max_rejects_inverted_bounds() {
        Bounds2D::from_min_max(Point2::new(1.0, 0.0), Point2::new(0.0, 1.0));
    }
}
