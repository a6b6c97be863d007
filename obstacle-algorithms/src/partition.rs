use std::collections::BTreeMap;

use log::debug;
use obstacle_core::{
    error::{ensure_non_negative, ensure_positive, ObstacleError, Result},
    math::Bounds2D,
    nalgebra::Point2,
    obstacle::TileCell,
    pointcloud::{ClusterLabel, PointCloud},
};

/// Minimum number of points needed to define a planar footprint
pub const MIN_FOOTPRINT_POINTS: usize = 3;

/// Maximum number of grid cells along one axis of a tiled cluster
pub const MAX_CELLS_PER_AXIS: usize = u32::MAX as usize;

/// The points of a point cloud that share one cluster label
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: usize,
    indices: Vec<usize>,
    bounds: Bounds2D,
}

impl Cluster {
    /// Creates a cluster from the given point `indices` into `cloud`. Returns `None` if `indices` is empty
    ///
    /// # Panics
    ///
    /// If any index is out of bounds for `cloud`
    pub fn new(id: usize, indices: Vec<usize>, cloud: &PointCloud) -> Option<Self> {
        let bounds =
            Bounds2D::from_points(indices.iter().map(|index| cloud.planar_position(*index)))?;
        Some(Self {
            id,
            indices,
            bounds,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Indices of the points of this cluster, ascending
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Planar bounding extent of the cluster
    pub fn bounds(&self) -> &Bounds2D {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Groups the point indices of `cloud` by their cluster label. Noise points are skipped. Clusters are
/// returned in ascending order of their id, the indices of every cluster in ascending order
///
/// Fails with `InvalidParameter` if `labels` does not hold exactly one label per point of `cloud`
pub fn clusters_from_labels(labels: &[ClusterLabel], cloud: &PointCloud) -> Result<Vec<Cluster>> {
    if labels.len() != cloud.len() {
        return Err(ObstacleError::invalid_parameter(
            "labels",
            format!(
                "expected one label per point ({} points) but got {} labels",
                cloud.len(),
                labels.len()
            ),
        ));
    }
    let mut grouped: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        if let Some(id) = label.cluster_id() {
            grouped.entry(id).or_default().push(index);
        }
    }
    Ok(grouped
        .into_iter()
        .filter_map(|(id, indices)| Cluster::new(id, indices, cloud))
        .collect())
}

/// A part of a cluster that is turned into one obstacle record
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    cluster: usize,
    cell: Option<TileCell>,
    bounds: Bounds2D,
    indices: Vec<usize>,
}

impl Tile {
    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// The grid cell of this tile, or `None` if the tile covers its whole cluster
    pub fn cell(&self) -> Option<TileCell> {
        self.cell
    }

    /// Region covered by this tile: the grid cell, or the bounds of the whole cluster
    pub fn bounds(&self) -> &Bounds2D {
        &self.bounds
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of partitioning a cluster. `tiles` have enough points to define a footprint, `sparse` tiles
/// have fewer than [MIN_FOOTPRINT_POINTS] and produce no obstacle. Together they contain every point of
/// the cluster exactly once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TilePartition {
    pub tiles: Vec<Tile>,
    pub sparse: Vec<Tile>,
}

impl TilePartition {
    fn push(&mut self, tile: Tile) {
        if tile.len() >= MIN_FOOTPRINT_POINTS {
            self.tiles.push(tile);
        } else {
            self.sparse.push(tile);
        }
    }
}

/// Splits `cluster` into tiles so that each tile stays within a size budget
///
/// If the larger of the x- and y-extent of the cluster is at most `size_threshold`, the whole cluster
/// becomes a single tile. Otherwise the bounds of the cluster are covered with a grid of square cells of
/// side `tile_size`, anchored at the minimum corner of the cluster. A point belongs to the cell with
/// `min.x <= x < min.x + tile_size` and `min.y <= y < min.y + tile_size`. Only non-empty cells become
/// tiles; they are ordered by column (x) first, then by row (y).
///
/// Fails with `InvalidParameter` if `tile_size` is not a finite number > 0 or `size_threshold` is
/// negative or not finite. A `tile_size` that would need more than [MAX_CELLS_PER_AXIS] cells along
/// one axis of the cluster is rejected as well.
pub fn partition(
    cluster: &Cluster,
    cloud: &PointCloud,
    size_threshold: f64,
    tile_size: f64,
) -> Result<TilePartition> {
    ensure_non_negative("size_threshold", size_threshold)?;
    ensure_positive("tile_size", tile_size)?;

    let mut partition = TilePartition::default();
    let extent = cluster.bounds().max_extent();
    if extent <= size_threshold {
        partition.push(Tile {
            cluster: cluster.id(),
            cell: None,
            bounds: *cluster.bounds(),
            indices: cluster.indices().to_vec(),
        });
        return Ok(partition);
    }

    let cells_per_axis = (extent / tile_size).floor() + 1.0;
    if cells_per_axis > MAX_CELLS_PER_AXIS as f64 {
        return Err(ObstacleError::invalid_parameter(
            "tile_size",
            format!(
                "{} is too small for a cluster extent of {}, at most {} cells per axis are supported",
                tile_size, extent, MAX_CELLS_PER_AXIS
            ),
        ));
    }

    let origin = *cluster.bounds().min();
    let too_many_cells = || {
        ObstacleError::invalid_parameter(
            "tile_size",
            format!("grid index out of range for a tile size of {}", tile_size),
        )
    };
    let mut cells: BTreeMap<TileCell, Vec<usize>> = BTreeMap::new();
    for index in cluster.indices() {
        let position = cloud.planar_position(*index);
        let cell = TileCell {
            column: grid_index(position.x, origin.x, tile_size).ok_or_else(too_many_cells)?,
            row: grid_index(position.y, origin.y, tile_size).ok_or_else(too_many_cells)?,
        };
        cells.entry(cell).or_default().push(*index);
    }

    for (cell, indices) in cells {
        let min = Point2::new(
            cell_start(origin.x, cell.column, tile_size),
            cell_start(origin.y, cell.row, tile_size),
        );
        let max = Point2::new(
            cell_start(origin.x, cell.column + 1, tile_size),
            cell_start(origin.y, cell.row + 1, tile_size),
        );
        partition.push(Tile {
            cluster: cluster.id(),
            cell: Some(cell),
            bounds: Bounds2D::from_min_max_unchecked(min, max),
            indices,
        });
    }

    debug!(
        "Cluster {} spans {:.3} (threshold {}), split into {} tiles and {} sparse tiles",
        cluster.id(),
        extent,
        size_threshold,
        partition.tiles.len(),
        partition.sparse.len()
    );

    Ok(partition)
}

fn cell_start(origin: f64, index: usize, tile_size: f64) -> f64 {
    origin + index as f64 * tile_size
}

/// Index of the half-open grid interval `[start, start + tile_size)` that contains `coordinate`. The estimate
/// from the division is corrected against the cell boundaries, so that membership always agrees with the
/// boundaries reported for the tile. Returns `None` if the index does not fit into the cell range
fn grid_index(coordinate: f64, origin: f64, tile_size: f64) -> Option<usize> {
    let estimate = ((coordinate - origin) / tile_size).floor().max(0.0);
    if estimate >= MAX_CELLS_PER_AXIS as f64 {
        return None;
    }
    let mut index = estimate as usize;
    loop {
        let next = index.checked_add(1)?;
        if next > MAX_CELLS_PER_AXIS || coordinate < cell_start(origin, next, tile_size) {
            break;
        }
        index = next;
    }
    while index > 0 && coordinate < cell_start(origin, index, tile_size) {
        index -= 1;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use obstacle_core::nalgebra::Vector3;
    use std::collections::HashSet;

    fn cloud_from_planar(points: &[(f64, f64)]) -> PointCloud {
        points
            .iter()
            .map(|(x, y)| (Vector3::new(*x, *y, 0.0), 0.0))
            .collect()
    }

    fn whole_cluster(cloud: &PointCloud) -> Cluster {
        Cluster::new(0, (0..cloud.len()).collect(), cloud).unwrap()
    }

    fn assert_is_partition(cluster: &Cluster, partition: &TilePartition) {
        let mut seen = HashSet::new();
        for tile in partition.tiles.iter().chain(partition.sparse.iter()) {
            for index in tile.indices() {
                assert!(seen.insert(*index), "index {} appears in two tiles", index);
            }
        }
        let expected = cluster.indices().iter().copied().collect::<HashSet<_>>();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_clusters_from_labels_skips_noise() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (1.0, 1.0), (5.0, 5.0), (2.0, 0.0)]);
        let labels = vec![
            ClusterLabel::Cluster(1),
            ClusterLabel::Cluster(0),
            ClusterLabel::Noise,
            ClusterLabel::Cluster(1),
        ];
        let clusters = clusters_from_labels(&labels, &cloud).unwrap();

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id(), 0);
        assert_eq!(clusters[0].indices(), &[1]);
        assert_eq!(clusters[1].id(), 1);
        assert_eq!(clusters[1].indices(), &[0, 3]);
        assert_eq!(*clusters[1].bounds().max(), Point2::new(2.0, 0.0));
    }

    #[test]
    fn test_small_cluster_is_single_tile() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (500.0, 0.0), (500.0, 500.0), (0.0, 500.0)]);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 1000.0, 100.0).unwrap();

        assert_eq!(partition.tiles.len(), 1);
        assert!(partition.sparse.is_empty());
        assert_eq!(partition.tiles[0].cell(), None);
        assert_eq!(partition.tiles[0].indices(), cluster.indices());
    }

    #[test]
    fn test_extent_equal_to_threshold_is_not_tiled() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (10.0, 0.0), (5.0, 3.0)]);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 10.0, 1.0).unwrap();
        assert_eq!(partition.tiles.len(), 1);
        assert_eq!(partition.tiles[0].cell(), None);
    }

    #[test]
    fn test_small_cluster_with_too_few_points_is_sparse() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (1.0, 1.0)]);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 1000.0, 100.0).unwrap();
        assert!(partition.tiles.is_empty());
        assert_eq!(partition.sparse.len(), 1);
    }

    #[test]
    fn test_half_open_cells() {
        // Points on the shared boundary x = 10 belong to the second column
        let cloud = cloud_from_planar(&[
            (0.0, 0.0),
            (5.0, 1.0),
            (9.999, 2.0),
            (10.0, 0.0),
            (15.0, 1.0),
            (20.0, 2.0),
        ]);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 5.0, 10.0).unwrap();

        assert_is_partition(&cluster, &partition);
        assert_eq!(partition.tiles.len(), 1);
        assert_eq!(partition.tiles[0].cell(), Some(TileCell { column: 0, row: 0 }));
        assert_eq!(partition.tiles[0].indices(), &[0, 1, 2]);

        // Column 1 holds x = 10 and x = 15, the maximum x = 20 opens column 2
        assert_eq!(partition.sparse.len(), 2);
        assert_eq!(partition.sparse[0].cell(), Some(TileCell { column: 1, row: 0 }));
        assert_eq!(partition.sparse[0].indices(), &[3, 4]);
        assert_eq!(partition.sparse[1].cell(), Some(TileCell { column: 2, row: 0 }));
    }

    #[test]
    fn test_tiles_are_column_major_and_bounded() {
        let mut points = vec![];
        for x in 0..30 {
            for y in 0..30 {
                points.push((x as f64 * 2.5, y as f64 * 2.5));
            }
        }
        let cloud = cloud_from_planar(&points);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 20.0, 10.0).unwrap();

        assert_is_partition(&cluster, &partition);
        let cells = partition
            .tiles
            .iter()
            .map(|tile| tile.cell().unwrap())
            .collect::<Vec<_>>();
        let mut sorted = cells.clone();
        sorted.sort();
        assert_eq!(cells, sorted);
        assert_eq!(cells[0], TileCell { column: 0, row: 0 });
        assert_eq!(cells[1], TileCell { column: 0, row: 1 });

        for tile in partition.tiles.iter() {
            for index in tile.indices() {
                assert!(tile.bounds().contains_half_open(&cloud.planar_position(*index)));
            }
        }
    }

    #[test]
    fn test_partition_property_on_irregular_cloud() {
        let points = (0..2000)
            .map(|i| {
                let t = i as f64;
                ((t * 37.17).sin() * 1250.0 + 1250.0, (t * 11.03).cos() * 1250.0 + 1250.0)
            })
            .collect::<Vec<_>>();
        let cloud = cloud_from_planar(&points);
        let cluster = whole_cluster(&cloud);
        let partition = partition(&cluster, &cloud, 1000.0, 100.0).unwrap();

        assert_is_partition(&cluster, &partition);
        assert!(partition.tiles.len() > 1);
        assert!(partition.tiles.iter().all(|tile| tile.len() >= 3));
        assert!(partition.sparse.iter().all(|tile| tile.len() < 3 && !tile.is_empty()));
    }

    #[test]
    fn test_grid_index_matches_boundaries() {
        // 0.1 * 3 is not exactly representable, the index has to follow the reported cell start
        let tile_size = 0.1;
        for coordinate in [0.0, 0.1, 0.2, 0.30000000000000004, 0.3, 0.7, 1.0].iter() {
            let index = grid_index(*coordinate, 0.0, tile_size).unwrap();
            assert!(*coordinate >= cell_start(0.0, index, tile_size));
            assert!(*coordinate < cell_start(0.0, index + 1, tile_size));
        }
    }

    #[test]
    fn test_clusters_from_labels_rejects_wrong_label_count() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let labels = vec![ClusterLabel::Cluster(0)];
        assert!(matches!(
            clusters_from_labels(&labels, &cloud),
            Err(ObstacleError::InvalidParameter { name: "labels", .. })
        ));
    }

    #[test]
    fn test_tiny_tile_size_is_rejected() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]);
        let cluster = whole_cluster(&cloud);
        assert!(matches!(
            partition(&cluster, &cloud, 0.5, 1e-300),
            Err(ObstacleError::InvalidParameter {
                name: "tile_size",
                ..
            })
        ));
        // Fine grids below the limit still work
        let partition = partition(&cluster, &cloud, 0.5, 1e-6).unwrap();
        assert_is_partition(&cluster, &partition);
        assert_eq!(partition.sparse.len(), 3);
    }

    #[test]
    fn test_grid_index_out_of_range() {
        assert_eq!(grid_index(1.0, 0.0, 1e-300), None);
        assert_eq!(grid_index(f64::MAX, 0.0, 1.0), None);
        assert_eq!(grid_index(-5.0, 0.0, 1.0), Some(0));
    }

    #[test]
    fn test_invalid_tile_size() {
        let cloud = cloud_from_planar(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let cluster = whole_cluster(&cloud);
        assert!(partition(&cluster, &cloud, 1000.0, 0.0).is_err());
        assert!(partition(&cluster, &cloud, -1.0, 10.0).is_err());
    }
}
