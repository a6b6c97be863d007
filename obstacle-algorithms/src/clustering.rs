use std::collections::VecDeque;

use kd_tree::{KdPoint, KdTree};
use log::debug;
use obstacle_core::{
    error::{ensure_non_zero, ensure_positive, Result},
    nalgebra::Vector3,
    pointcloud::ClusterLabel,
    util::CancellationToken,
};
use rayon::prelude::*;

/// Capability to partition a set of positions into clusters
///
/// Implementations return one `ClusterLabel` per input position, in input order. The labels must be a
/// pure function of the positions and the parameters of the clusterer.
pub trait Clusterer {
    fn cluster(
        &self,
        positions: &[Vector3<f64>],
        cancellation: &CancellationToken,
    ) -> Result<Vec<ClusterLabel>>;
}

/// Density-based clustering (DBSCAN)
///
/// A point is a core point if at least `min_points` points, the point itself included, lie within a
/// euclidean distance of `eps`. Clusters are the maximal sets of points connected through chains of core
/// points, together with the non-core points in reach of one of their core points. All remaining points
/// are noise.
///
/// Seeds are visited in ascending point index and each cluster is grown breadth-first with neighbours in
/// ascending index order. A border point that is in reach of several clusters belongs to the cluster that
/// reached it first. Cluster ids start at 0 and follow the order of discovery.
///
/// # Examples
///
/// ```
/// # use obstacle_core::{nalgebra::Vector3, pointcloud::ClusterLabel, util::CancellationToken};
/// # use obstacle_algorithms::clustering::{Clusterer, Dbscan};
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(0.5, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(50.0, 0.0, 0.0),
/// ];
/// let dbscan = Dbscan::new(0.6, 2).unwrap();
/// let labels = dbscan.cluster(&positions, &CancellationToken::new()).unwrap();
/// assert_eq!(
///     labels,
///     vec![
///         ClusterLabel::Cluster(0),
///         ClusterLabel::Cluster(0),
///         ClusterLabel::Cluster(0),
///         ClusterLabel::Noise
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    eps: f64,
    min_points: usize,
}

impl Dbscan {
    /// Creates a new DBSCAN clusterer. Fails with `InvalidParameter` if `eps` is not a finite number > 0 or
    /// `min_points` is zero
    pub fn new(eps: f64, min_points: usize) -> Result<Self> {
        ensure_positive("eps", eps)?;
        ensure_non_zero("min_points", min_points)?;
        Ok(Self { eps, min_points })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }
}

impl Clusterer for Dbscan {
    fn cluster(
        &self,
        positions: &[Vector3<f64>],
        cancellation: &CancellationToken,
    ) -> Result<Vec<ClusterLabel>> {
        if positions.is_empty() {
            return Ok(vec![]);
        }

        let neighbourhood = Neighbourhood::build(positions, self.eps);
        let is_core = positions
            .par_iter()
            .map(|position| neighbourhood.count(position) >= self.min_points)
            .collect::<Vec<_>>();
        cancellation.check()?;

        let mut labels: Vec<Option<usize>> = vec![None; positions.len()];
        let mut next_cluster = 0;
        let mut queue = VecDeque::new();

        for seed in 0..positions.len() {
            if labels[seed].is_some() || !is_core[seed] {
                continue;
            }
            cancellation.check()?;

            let cluster = next_cluster;
            next_cluster += 1;
            labels[seed] = Some(cluster);
            queue.push_back(seed);

            while let Some(current) = queue.pop_front() {
                // Only core points extend the cluster, border points end a chain
                if !is_core[current] {
                    continue;
                }
                for neighbour in neighbourhood.neighbours(&positions[current]) {
                    if labels[neighbour].is_none() {
                        labels[neighbour] = Some(cluster);
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        let noise = labels.iter().filter(|label| label.is_none()).count();
        debug!(
            "DBSCAN (eps {}, min points {}) found {} clusters and {} noise points among {} points",
            self.eps,
            self.min_points,
            next_cluster,
            noise,
            positions.len()
        );

        Ok(labels
            .into_iter()
            .map(|label| match label {
                Some(cluster) => ClusterLabel::Cluster(cluster),
                None => ClusterLabel::Noise,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexedPosition {
    position: [f64; 3],
    index: usize,
}

impl KdPoint for IndexedPosition {
    type Scalar = f64;
    type Dim = typenum::U3;
    fn at(&self, k: usize) -> f64 {
        self.position[k]
    }
}

/// Fixed-radius neighbour queries over all positions of one clustering run
struct Neighbourhood {
    tree: KdTree<IndexedPosition>,
    eps: f64,
}

impl Neighbourhood {
    fn build(positions: &[Vector3<f64>], eps: f64) -> Self {
        let items = positions
            .iter()
            .enumerate()
            .map(|(index, position)| IndexedPosition {
                position: [position.x, position.y, position.z],
                index,
            })
            .collect::<Vec<_>>();
        Self {
            tree: KdTree::build_by_ordered_float(items),
            eps,
        }
    }

    /// All points within `eps` of `position` (inclusive). The tree query is widened slightly and the result
    /// filtered again, so that points at exactly `eps` are found regardless of rounding inside the tree
    fn query(&self, position: &Vector3<f64>) -> impl Iterator<Item = &IndexedPosition> + '_ {
        let query = [position.x, position.y, position.z];
        let eps_squared = self.eps * self.eps;
        self.tree
            .within_radius(&query, self.eps * (1.0 + 1e-9))
            .into_iter()
            .filter(move |item| {
                let dx = item.position[0] - query[0];
                let dy = item.position[1] - query[1];
                let dz = item.position[2] - query[2];
                dx * dx + dy * dy + dz * dz <= eps_squared
            })
    }

    fn count(&self, position: &Vector3<f64>) -> usize {
        self.query(position).count()
    }

    /// Indices of all points within `eps` of `position`, in ascending order
    fn neighbours(&self, position: &Vector3<f64>) -> Vec<usize> {
        let mut indices = self.query(position).map(|item| item.index).collect::<Vec<_>>();
        indices.sort_unstable();
        indices
    }
}
