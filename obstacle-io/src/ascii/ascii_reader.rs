use anyhow::{bail, Context, Result};
use itertools::{EitherOrBoth::*, Itertools};
use log::debug;
use obstacle_core::{nalgebra::Vector3, pointcloud::PointCloud};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::ColumnType;

/// Reads points with their height above ground from delimited text
///
/// Every non-empty line that does not start with `#` holds one point. The columns of a line are described
/// by a format string with one literal per column (see [FORMAT_LITERALS_HELP](super::FORMAT_LITERALS_HELP)),
/// e.g. `xyzh` or `sxyzsh`. Columns beyond the end of the format string are ignored.
///
/// ```
/// # use obstacle_io::ascii::AsciiPointReader;
/// let data = "# x, y, z, hag\n1.0, 2.0, 3.0, 0.5\n4.0, 5.0, 6.0, 1.5\n";
/// let mut reader = AsciiPointReader::from_read(data.as_bytes(), "xyzh", ",").unwrap();
/// let cloud = reader.read_all().unwrap();
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud.height_above_ground(1), 1.5);
/// ```
pub struct AsciiPointReader<R: BufRead> {
    reader: R,
    delimiter: String,
    parse_layout: Vec<ColumnType>,
    header_lines: usize,
    line_number: usize,
}

impl<R: BufRead> AsciiPointReader<R> {
    pub fn from_read(read: R, format: &str, delimiter: &str) -> Result<Self> {
        if delimiter.is_empty() {
            bail!("Delimiter must not be empty.");
        }
        Ok(Self {
            reader: read,
            delimiter: delimiter.to_string(),
            parse_layout: ColumnType::get_parse_layout(format)?,
            header_lines: 0,
            line_number: 0,
        })
    }

    /// Skips the first `header_lines` lines of the input, regardless of their content
    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    /// Reads up to `count` points. Returns fewer points only if the end of the input is reached
    pub fn read(&mut self, count: usize) -> Result<PointCloud> {
        let mut cloud = PointCloud::with_capacity(count.min(1 << 16));
        let mut line = String::new();
        while cloud.len() < count {
            line.clear();
            let bytes = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("Could not read line {}", self.line_number + 1))?;
            if bytes == 0 {
                break;
            }
            self.line_number += 1;
            if self.line_number <= self.header_lines {
                continue;
            }
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let (position, height_above_ground) =
                Self::parse_point(content, &self.delimiter, &self.parse_layout)
                    .with_context(|| format!("Invalid point in line {}", self.line_number))?;
            cloud.push(position, height_above_ground);
        }
        Ok(cloud)
    }

    /// Reads all remaining points
    pub fn read_all(&mut self) -> Result<PointCloud> {
        let cloud = self.read(usize::MAX)?;
        debug!("Read {} points from {} lines", cloud.len(), self.line_number);
        Ok(cloud)
    }

    fn parse_point(
        line: &str,
        delimiter: &str,
        parse_layout: &[ColumnType],
    ) -> Result<(Vector3<f64>, f64)> {
        let mut position = Vector3::new(0.0, 0.0, 0.0);
        let mut height_above_ground = 0.0;
        for pair in line.split(delimiter).zip_longest(parse_layout) {
            match pair {
                Both(value_str, column) => {
                    let target = match column {
                        ColumnType::Skip => continue,
                        ColumnType::CoordinateX => &mut position.x,
                        ColumnType::CoordinateY => &mut position.y,
                        ColumnType::CoordinateZ => &mut position.z,
                        ColumnType::HeightAboveGround => &mut height_above_ground,
                    };
                    *target = parse_f64(value_str)
                        .with_context(|| generate_parse_error(column))?;
                }
                Left(_) => continue,
                Right(_) => {
                    bail!("Input format string expected more items in the line. Found End-of-Line.")
                }
            }
        }
        Ok((position, height_above_ground))
    }
}

impl AsciiPointReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P, format: &str, delimiter: &str) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Could not open point file {}", path.as_ref().display()))?;
        Self::from_read(BufReader::new(file), format, delimiter)
    }
}

fn parse_f64(value_str: &str) -> Result<f64> {
    let value_str = value_str.trim();
    value_str
        .parse::<f64>()
        .map_err(|_| anyhow::anyhow!("ParseError expected f64 found '{}'.", value_str))
}

fn generate_parse_error(column: &ColumnType) -> String {
    format!(
        "ParseError at parsing {} for format literal '{}'.",
        column,
        column.literal()
    )
}
