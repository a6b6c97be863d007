use log::{debug, info};
use obstacle_core::{
    error::{ensure_non_negative, ensure_positive, Result},
    nalgebra::Vector3,
    obstacle::{ObstacleOrigin, ObstacleRecord, TileCell},
    pointcloud::{ClusterLabel, PointCloud},
    util::CancellationToken,
};
use rayon::prelude::*;

use crate::{
    bounding_rectangle::minimum_bounding_rectangle,
    clustering::{Clusterer, Dbscan},
    config::ObstacleConfig,
    convexhull::{ConvexHullBuilder, MonotoneChain},
    extrusion::extrude,
    partition::{clusters_from_labels, partition, Cluster, Tile},
};

/// Append-only list of obstacle records. Records keep the order in which they were pushed, `finish`
/// hands out the list once
#[derive(Debug, Default)]
pub struct ObstacleCollector {
    records: Vec<ObstacleRecord>,
}

impl ObstacleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ObstacleRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<ObstacleRecord> {
        self.records
    }
}

impl Extend<ObstacleRecord> for ObstacleCollector {
    fn extend<T: IntoIterator<Item = ObstacleRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Computes the obstacle for the points `indices` of `cloud`: minimum bounding rectangle of their convex
/// hull, extruded over their vertical extent
///
/// # Panics
///
/// If `indices` is empty or contains an index that is out of bounds for `cloud`
pub fn obstacle_from_points<H: ConvexHullBuilder>(
    cloud: &PointCloud,
    indices: &[usize],
    hull_builder: &H,
    cluster: usize,
    tile: Option<TileCell>,
) -> Result<ObstacleRecord> {
    let planar = indices
        .iter()
        .map(|index| cloud.planar_position(*index))
        .collect::<Vec<_>>();
    let hull = hull_builder.hull(&planar);
    let footprint = minimum_bounding_rectangle(&hull)?;
    if hull.is_degenerate() {
        debug!(
            "Points of cluster {} are collinear or coincident, footprint is degenerate",
            cluster
        );
    }

    let first = indices[0];
    let (z_min, z_max, max_height_above_ground) = indices[1..].iter().fold(
        (
            cloud.position(first).z,
            cloud.position(first).z,
            cloud.height_above_ground(first),
        ),
        |(z_min, z_max, hag), index| {
            let z = cloud.position(*index).z;
            (
                z_min.min(z),
                z_max.max(z),
                hag.max(cloud.height_above_ground(*index)),
            )
        },
    );

    Ok(ObstacleRecord::new(
        extrude(&footprint, z_min, z_max),
        max_height_above_ground,
        ObstacleOrigin {
            cluster,
            tile,
            point_count: indices.len(),
        },
    ))
}

/// Extracts obstacles from a point cloud: clusters the points, splits oversized clusters into tiles and
/// computes one obstacle record per cluster or tile with at least three points
///
/// Records are ordered by cluster id, records of a tiled cluster by tile (column first, then row). The
/// output is a pure function of the point cloud and the parameters; clusters are processed in parallel
/// but their records are merged in cluster order.
pub struct ObstacleDetector<C = Dbscan, H = MonotoneChain> {
    clusterer: C,
    hull_builder: H,
    cluster_size_threshold: f64,
    tile_size: f64,
}

impl ObstacleDetector<Dbscan, MonotoneChain> {
    /// Creates a detector with DBSCAN clustering and monotone chain hulls from the given configuration
    pub fn from_config(config: &ObstacleConfig) -> Result<Self> {
        config.validate()?;
        let clusterer = Dbscan::new(config.eps(), config.min_points())?;
        Self::new(
            clusterer,
            MonotoneChain,
            config.cluster_size_threshold(),
            config.tile_size(),
        )
    }
}

impl<C: Clusterer + Sync, H: ConvexHullBuilder + Sync> ObstacleDetector<C, H> {
    pub fn new(
        clusterer: C,
        hull_builder: H,
        cluster_size_threshold: f64,
        tile_size: f64,
    ) -> Result<Self> {
        ensure_non_negative("cluster_size_threshold", cluster_size_threshold)?;
        ensure_positive("tile_size", tile_size)?;
        Ok(Self {
            clusterer,
            hull_builder,
            cluster_size_threshold,
            tile_size,
        })
    }

    pub fn detect(&self, cloud: &PointCloud) -> Result<Vec<ObstacleRecord>> {
        self.detect_with_cancellation(cloud, &CancellationToken::new())
    }

    /// Like `detect`, but stops with `ObstacleError::Cancelled` once `cancellation` is triggered
    pub fn detect_with_cancellation(
        &self,
        cloud: &PointCloud,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ObstacleRecord>> {
        if cloud.is_empty() {
            info!("Point cloud is empty, no obstacles to detect");
            return Ok(vec![]);
        }

        let labels = self.clusterer.cluster(cloud.positions(), cancellation)?;
        let noise = noise_count(&labels);
        let clusters = clusters_from_labels(&labels, cloud)?;

        let per_cluster = clusters
            .par_iter()
            .map(|cluster| self.obstacles_for_cluster(cluster, cloud, cancellation))
            .collect::<Result<Vec<_>>>()?;

        let mut collector = ObstacleCollector::new();
        for records in per_cluster {
            collector.extend(records);
        }

        info!(
            "Detected {} obstacles in {} clusters of {} points ({} noise points)",
            collector.len(),
            clusters.len(),
            cloud.len(),
            noise
        );
        Ok(collector.finish())
    }

    fn obstacles_for_cluster(
        &self,
        cluster: &Cluster,
        cloud: &PointCloud,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ObstacleRecord>> {
        cancellation.check()?;
        let partition = partition(
            cluster,
            cloud,
            self.cluster_size_threshold,
            self.tile_size,
        )?;
        if !partition.sparse.is_empty() {
            debug!(
                "Cluster {}: {} points in {} tiles with fewer than three points are skipped",
                cluster.id(),
                partition.sparse.iter().map(Tile::len).sum::<usize>(),
                partition.sparse.len()
            );
        }

        let mut records = Vec::with_capacity(partition.tiles.len());
        for tile in partition.tiles.iter() {
            cancellation.check()?;
            records.push(obstacle_from_points(
                cloud,
                tile.indices(),
                &self.hull_builder,
                cluster.id(),
                tile.cell(),
            )?);
        }
        Ok(records)
    }
}

/// Runs a full obstacle extraction with the default algorithms on index-aligned `positions` and
/// `heights_above_ground`
///
/// Fails with `ShapeMismatch` if the two slices differ in length and with `InvalidParameter` if `config`
/// is invalid. Both checks happen before any clustering work.
pub fn detect_obstacles(
    positions: &[Vector3<f64>],
    heights_above_ground: &[f64],
    config: &ObstacleConfig,
) -> Result<Vec<ObstacleRecord>> {
    let cloud = PointCloud::new(positions.to_vec(), heights_above_ground.to_vec())?;
    ObstacleDetector::from_config(config)?.detect(&cloud)
}

/// Number of points that the clusterer labelled as noise
pub fn noise_count(labels: &[ClusterLabel]) -> usize {
    labels.iter().filter(|label| label.is_noise()).count()
}
