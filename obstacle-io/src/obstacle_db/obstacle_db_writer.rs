use anyhow::{Context, Result};
use log::info;
use obstacle_core::obstacle::ObstacleRecord;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const ROOT_ELEMENT: &str = "FEATURES_FORMAT_201707";

/// Writes obstacle records as an obstacle database in the `FEATURES_FORMAT_201707` XML layout
///
/// Every record becomes a `FEATUREITEM` region with a 1-based string id, the maximum z-coordinate of the
/// obstacle as elevation and the four corners of its footprint:
/// ```text
/// <?xml version="1.0" ?>
/// <FEATURES_FORMAT_201707>
///     <HEADERINFO NumFeatures="1" DefaultValue="0" ReplaceMethod="ALWAYS"/>
///     <FEATUREITEM FeatureType="Region">
///         <STRING_ID StringID="1"/>
///         <ELEVATION Elev_m="12.5"/>
///         <NUMPOINTS NumPoints="4"/>
///         <Point2D LonDeg="0.0" LatDeg="0.0"/>
///         ...
///     </FEATUREITEM>
/// </FEATURES_FORMAT_201707>
/// ```
/// Nested elements are indented with one tab per level.
pub struct ObstacleDatabaseWriter<W: Write> {
    writer: W,
}

impl<W: Write> ObstacleDatabaseWriter<W> {
    pub fn from_write(write: W) -> Self {
        Self { writer: write }
    }

    /// Writes a complete database containing `records`, in order
    pub fn write(&mut self, records: &[ObstacleRecord]) -> Result<()> {
        self.write_database(records)
            .context("Could not write obstacle database")?;
        info!("Wrote {} obstacles to the obstacle database", records.len());
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_database(&mut self, records: &[ObstacleRecord]) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\" ?>")?;
        writeln!(self.writer, "<{}>", ROOT_ELEMENT)?;
        self.write_empty_element(
            1,
            "HEADERINFO",
            &[
                ("NumFeatures", records.len().to_string()),
                ("DefaultValue", "0".to_string()),
                ("ReplaceMethod", "ALWAYS".to_string()),
            ],
        )?;
        for (index, record) in records.iter().enumerate() {
            self.write_feature(index + 1, record)?;
        }
        writeln!(self.writer, "</{}>", ROOT_ELEMENT)?;
        self.writer.flush()
    }

    fn write_feature(&mut self, string_id: usize, record: &ObstacleRecord) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "\t<FEATUREITEM FeatureType=\"{}\">",
            escape_attribute("Region")
        )?;
        self.write_empty_element(2, "STRING_ID", &[("StringID", string_id.to_string())])?;
        self.write_empty_element(2, "ELEVATION", &[("Elev_m", format_number(record.z_max()))])?;
        self.write_empty_element(2, "NUMPOINTS", &[("NumPoints", "4".to_string())])?;
        for corner in record.footprint().corners().iter() {
            self.write_empty_element(
                2,
                "Point2D",
                &[
                    ("LonDeg", format_number(corner.x)),
                    ("LatDeg", format_number(corner.y)),
                ],
            )?;
        }
        writeln!(self.writer, "\t</FEATUREITEM>")
    }

    fn write_empty_element(
        &mut self,
        depth: usize,
        name: &str,
        attributes: &[(&str, String)],
    ) -> std::io::Result<()> {
        write!(self.writer, "{}<{}", "\t".repeat(depth), name)?;
        for (key, value) in attributes {
            write!(self.writer, " {}=\"{}\"", key, escape_attribute(value))?;
        }
        writeln!(self.writer, "/>")
    }
}

impl ObstacleDatabaseWriter<BufWriter<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).with_context(|| {
            format!(
                "Could not create obstacle database {}",
                path.as_ref().display()
            )
        })?;
        Ok(Self::from_write(BufWriter::new(file)))
    }
}

/// Shortest representation that reads back to the same value, always with a fractional part
fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// Escapes the characters that may not appear verbatim inside a double-quoted XML attribute value
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\n' | '\r' | '\t')) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
