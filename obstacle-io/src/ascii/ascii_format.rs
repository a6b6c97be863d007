use anyhow::{bail, Result};

/// Help text describing the format literals understood by [AsciiPointReader](crate::ascii::AsciiPointReader)
pub const FORMAT_LITERALS_HELP: &str = "s - skip this column
x - x coordinate
y - y coordinate
z - z coordinate
h - height above ground";

// Maps the columns of a line in an ascii file to the values of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnType {
    Skip,
    CoordinateX,
    CoordinateY,
    CoordinateZ,
    HeightAboveGround,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ColumnType {
    const REQUIRED: [ColumnType; 4] = [
        ColumnType::CoordinateX,
        ColumnType::CoordinateY,
        ColumnType::CoordinateZ,
        ColumnType::HeightAboveGround,
    ];

    pub(crate) fn literal(&self) -> char {
        match self {
            ColumnType::Skip => 's',
            ColumnType::CoordinateX => 'x',
            ColumnType::CoordinateY => 'y',
            ColumnType::CoordinateZ => 'z',
            ColumnType::HeightAboveGround => 'h',
        }
    }

    /// Parses a format string like `xyzsh` into one `ColumnType` per column. Every one of `x`, `y`, `z` and
    /// `h` has to appear exactly once
    pub(crate) fn get_parse_layout(format: &str) -> Result<Vec<ColumnType>> {
        let mut parse_layout = Vec::<ColumnType>::new();
        for character in format.chars() {
            match character {
                's' => parse_layout.push(ColumnType::Skip),
                'x' => parse_layout.push(ColumnType::CoordinateX),
                'y' => parse_layout.push(ColumnType::CoordinateY),
                'z' => parse_layout.push(ColumnType::CoordinateZ),
                'h' => parse_layout.push(ColumnType::HeightAboveGround),
                _ => {
                    bail!(
                        "FormatError can't interpret format literal '{}' in format string '{}'.",
                        character,
                        format
                    );
                }
            }
        }
        for required in ColumnType::REQUIRED.iter() {
            let occurrences = parse_layout.iter().filter(|c| *c == required).count();
            if occurrences != 1 {
                bail!(
                    "FormatError format literal '{}' must appear exactly once in format string '{}', found it {} times.",
                    required.literal(),
                    format,
                    occurrences
                );
            }
        }
        Ok(parse_layout)
    }
}
