use anyhow::{anyhow, Context, Result};
use las::Reader;
use log::debug;
use obstacle_core::{nalgebra::Vector3, pointcloud::PointCloud};
use std::convert::TryFrom;
use std::path::Path;

use super::{parse_extra_bytes, ExtraBytesAttribute, EXTRA_BYTES_RECORD_ID, KNOWN_VLR_USER_ID};

/// Name of the extra bytes attribute that holds the height of a point above the ground surface
pub const HEIGHT_ABOVE_GROUND: &str = "HeightAboveGround";

/// Reads points with their height above ground from a LAS or LAZ file
///
/// Positions are taken from the point records, the height above ground from the `HeightAboveGround`
/// attribute that an extra bytes VLR declares for the point records. Files without this attribute are
/// rejected when the reader is created.
pub struct LasPointReader {
    reader: Reader,
    height_above_ground: ExtraBytesAttribute,
    points_read: u64,
}

impl LasPointReader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::from_path(path.as_ref())
            .with_context(|| format!("Could not open LAS file {}", path.as_ref().display()))?;
        Self::new(reader)
            .with_context(|| format!("Unsupported LAS file {}", path.as_ref().display()))
    }

    /// Wraps an open `las::Reader`
    pub fn new(reader: Reader) -> Result<Self> {
        let height_above_ground = find_extra_bytes_attribute(&reader, HEIGHT_ABOVE_GROUND)?;
        debug!(
            "LAS file with {} points, {} is stored as {} at extra byte {}",
            reader.header().number_of_points(),
            HEIGHT_ABOVE_GROUND,
            height_above_ground.data_type(),
            height_above_ground.byte_offset()
        );
        Ok(Self {
            reader,
            height_above_ground,
            points_read: 0,
        })
    }

    /// Total number of points in the file
    pub fn point_count(&self) -> u64 {
        self.reader.header().number_of_points()
    }

    /// Reads up to `count` points. Returns fewer points only if the end of the file is reached
    pub fn read(&mut self, count: usize) -> Result<PointCloud> {
        let remaining = self.point_count().saturating_sub(self.points_read);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        let mut cloud = PointCloud::with_capacity(count.min(remaining).min(1 << 16));
        for point in self.reader.points().take(count) {
            let index = self.points_read;
            let point = point.with_context(|| format!("Could not read LAS point {}", index))?;
            let height_above_ground = self
                .height_above_ground
                .read(&point.extra_bytes)
                .with_context(|| format!("Invalid {} of LAS point {}", HEIGHT_ABOVE_GROUND, index))?;
            cloud.push(Vector3::new(point.x, point.y, point.z), height_above_ground);
            self.points_read += 1;
        }
        Ok(cloud)
    }

    /// Reads all remaining points
    pub fn read_all(&mut self) -> Result<PointCloud> {
        let cloud = self.read(usize::MAX)?;
        debug!("Read {} points from LAS file", cloud.len());
        Ok(cloud)
    }
}

fn find_extra_bytes_attribute(reader: &Reader, name: &str) -> Result<ExtraBytesAttribute> {
    let header = reader.header();
    let mut attributes = vec![];
    for vlr in header.vlrs().iter().chain(header.evlrs().iter()) {
        if vlr.user_id == KNOWN_VLR_USER_ID && vlr.record_id == EXTRA_BYTES_RECORD_ID {
            attributes.extend(parse_extra_bytes(&vlr.data)?);
        }
    }
    attributes
        .into_iter()
        .find(|attribute| attribute.name() == name)
        .ok_or_else(|| anyhow!("No extra bytes attribute named '{}' in LAS file", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::las::extra_bytes::test_util::raw_entry;
    use las::{Builder, Point, Vlr, Writer};
    use std::path::PathBuf;

    fn extra_bytes_vlr(entries: &[Vec<u8>]) -> Vlr {
        Vlr {
            user_id: KNOWN_VLR_USER_ID.to_string(),
            record_id: EXTRA_BYTES_RECORD_ID,
            description: "Extra bytes".to_string(),
            data: entries.concat(),
        }
    }

    /// Writes a LAS file whose point records carry a u16 amplitude followed by a f32 height above ground
    fn write_las_file(directory: &Path, points: &[(f64, f64, f64, f32)], with_height: bool) -> PathBuf {
        let path = directory.join("points.las");
        let mut builder = Builder::from((1, 4));
        builder.point_format.extra_bytes = 6;
        let height_name = if with_height {
            HEIGHT_ABOVE_GROUND
        } else {
            "Reflectance"
        };
        builder.vlrs.push(extra_bytes_vlr(&[
            raw_entry("Amplitude", 3, 0, 0.0, 0.0),
            raw_entry(height_name, 9, 0, 0.0, 0.0),
        ]));
        let header = builder.into_header().unwrap();

        let mut writer = Writer::from_path(&path, header).unwrap();
        for (x, y, z, height) in points.iter() {
            let mut extra_bytes = 7_u16.to_le_bytes().to_vec();
            extra_bytes.extend_from_slice(&height.to_le_bytes());
            writer
                .write_point(Point {
                    x: *x,
                    y: *y,
                    z: *z,
                    extra_bytes,
                    ..Default::default()
                })
                .unwrap();
        }
        writer.close().unwrap();
        path
    }

    #[test]
    fn test_read_positions_and_height_above_ground() {
        let directory = tempfile::tempdir().unwrap();
        let points = [(1.5, 2.25, 10.0, 0.5), (-3.0, 4.0, 12.5, 2.75), (7.0, 8.0, 9.0, 0.0)];
        let path = write_las_file(directory.path(), &points, true);

        let mut reader = LasPointReader::from_path(&path).unwrap();
        assert_eq!(reader.point_count(), 3);
        let cloud = reader.read_all().unwrap();

        assert_eq!(cloud.len(), 3);
        for (index, (x, y, z, height)) in points.iter().enumerate() {
            let position = cloud.position(index);
            assert!((position - Vector3::new(*x, *y, *z)).norm() < 1e-6);
            assert_eq!(cloud.height_above_ground(index), *height as f64);
        }
    }

    #[test]
    fn test_read_in_chunks() {
        let directory = tempfile::tempdir().unwrap();
        let points = (0..5)
            .map(|i| (i as f64, 0.0, 0.0, i as f32))
            .collect::<Vec<_>>();
        let path = write_las_file(directory.path(), &points, true);

        let mut reader = LasPointReader::from_path(&path).unwrap();
        assert_eq!(reader.read(3).unwrap().len(), 3);
        let rest = reader.read(3).unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.height_above_ground(1), 4.0);
        assert!(reader.read(3).unwrap().is_empty());
    }

    #[test]
    fn test_missing_height_above_ground() {
        let directory = tempfile::tempdir().unwrap();
        let path = write_las_file(directory.path(), &[(0.0, 0.0, 0.0, 1.0)], false);
        let message = format!("{:#}", LasPointReader::from_path(&path).err().unwrap());
        assert!(message.contains(HEIGHT_ABOVE_GROUND), "{}", message);
    }

    #[test]
    fn test_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        assert!(LasPointReader::from_path(directory.path().join("missing.las")).is_err());
    }
}
