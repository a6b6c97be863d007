use anyhow::{anyhow, bail, Result};
use std::convert::TryInto;
use std::fmt::Display;

/// User id of the VLRs defined by the LAS specification
pub const KNOWN_VLR_USER_ID: &str = "LASF_Spec";
/// Record id of the VLR that describes the extra bytes of each point record
pub const EXTRA_BYTES_RECORD_ID: u16 = 4;

const RAW_ENTRY_SIZE: usize = 192;
const DATA_TYPE_OFFSET: usize = 2;
const OPTIONS_OFFSET: usize = 3;
const NAME_RANGE: std::ops::Range<usize> = 4..36;
const SCALE_OFFSET: usize = 112;
const OFFSET_OFFSET: usize = 136;

const USE_SCALE_BIT: u8 = 1 << 3;
const USE_OFFSET_BIT: u8 = 1 << 4;

/// Data type of a single extra bytes attribute
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExtraBytesDataType {
    /// Opaque bytes without a documented meaning, the value is the number of bytes
    Undocumented(usize),
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ExtraBytesDataType {
    fn from_raw(data_type: u8, options: u8) -> Result<Self> {
        match data_type {
            0 => Ok(Self::Undocumented(options as usize)),
            1 => Ok(Self::U8),
            2 => Ok(Self::I8),
            3 => Ok(Self::U16),
            4 => Ok(Self::I16),
            5 => Ok(Self::U32),
            6 => Ok(Self::I32),
            7 => Ok(Self::U64),
            8 => Ok(Self::I64),
            9 => Ok(Self::F32),
            10 => Ok(Self::F64),
            11..=30 => bail!("Extra bytes of deprecated data type {} are unsupported", data_type),
            _ => bail!("Extra bytes of reserved data type {} are unsupported", data_type),
        }
    }

    /// Size of one value of this type in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::Undocumented(size) => *size,
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<f64> {
        macro_rules! le {
            ($t:ty) => {
                <$t>::from_le_bytes(bytes.try_into()?) as f64
            };
        }
        let value = match self {
            Self::Undocumented(_) => bail!("Undocumented extra bytes have no numeric value"),
            Self::U8 => bytes[0] as f64,
            Self::I8 => bytes[0] as i8 as f64,
            Self::U16 => le!(u16),
            Self::I16 => le!(i16),
            Self::U32 => le!(u32),
            Self::I32 => le!(i32),
            Self::U64 => le!(u64),
            Self::I64 => le!(i64),
            Self::F32 => le!(f32),
            Self::F64 => le!(f64),
        };
        Ok(value)
    }
}

impl Display for ExtraBytesDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An attribute stored in the extra bytes of every point record, together with its position inside
/// the extra bytes
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraBytesAttribute {
    name: String,
    data_type: ExtraBytesDataType,
    byte_offset: usize,
    scale: Option<f64>,
    offset: Option<f64>,
}

impl ExtraBytesAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> ExtraBytesDataType {
        self.data_type
    }

    /// Offset of the attribute from the start of the extra bytes of a point record
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Decodes the value of this attribute from the `extra_bytes` of one point record, applying scale and
    /// offset if the attribute defines them
    pub fn read(&self, extra_bytes: &[u8]) -> Result<f64> {
        let end = self.byte_offset + self.data_type.size();
        let bytes = extra_bytes.get(self.byte_offset..end).ok_or_else(|| {
            anyhow!(
                "Point record has {} extra bytes, attribute '{}' needs bytes {}..{}",
                extra_bytes.len(),
                self.name,
                self.byte_offset,
                end
            )
        })?;
        let raw = self.data_type.decode(bytes)?;
        Ok(raw * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0))
    }
}

/// Parses the data of an extra bytes VLR into the list of attributes it describes, in record order
pub fn parse_extra_bytes(data: &[u8]) -> Result<Vec<ExtraBytesAttribute>> {
    if data.len() % RAW_ENTRY_SIZE != 0 {
        bail!(
            "VLR data size ({} bytes) is not a multiple of the size of an EXTRA_BYTES entry ({} bytes)",
            data.len(),
            RAW_ENTRY_SIZE
        );
    }

    let mut byte_offset = 0;
    let mut attributes = Vec::with_capacity(data.len() / RAW_ENTRY_SIZE);
    for entry in data.chunks_exact(RAW_ENTRY_SIZE) {
        let options = entry[OPTIONS_OFFSET];
        let data_type = ExtraBytesDataType::from_raw(entry[DATA_TYPE_OFFSET], options)?;
        let name = String::from_utf8_lossy(&entry[NAME_RANGE])
            .trim_end_matches('\0')
            .to_string();
        let read_f64 = |at: usize| -> Result<f64> {
            Ok(f64::from_le_bytes(entry[at..at + 8].try_into()?))
        };
        let scale = if options & USE_SCALE_BIT != 0 {
            Some(read_f64(SCALE_OFFSET)?)
        } else {
            None
        };
        let offset = if options & USE_OFFSET_BIT != 0 {
            Some(read_f64(OFFSET_OFFSET)?)
        } else {
            None
        };
        let size = data_type.size();
        attributes.push(ExtraBytesAttribute {
            name,
            data_type,
            byte_offset,
            scale,
            offset,
        });
        byte_offset += size;
    }
    Ok(attributes)
}


#[cfg(test)]
mod tests {
    use super::test_util::raw_entry;
    use super::*;

    #[test]
    fn test_parse_offsets_follow_record_order() {
        let mut data = raw_entry("Amplitude", 3, 0, 0.0, 0.0);
        data.extend(raw_entry("", 0, 5, 0.0, 0.0));
        data.extend(raw_entry("HeightAboveGround", 10, 0, 0.0, 0.0));
        let attributes = parse_extra_bytes(&data).unwrap();

        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes[0].name(), "Amplitude");
        assert_eq!(attributes[0].byte_offset(), 0);
        assert_eq!(attributes[1].data_type(), ExtraBytesDataType::Undocumented(5));
        assert_eq!(attributes[2].name(), "HeightAboveGround");
        assert_eq!(attributes[2].data_type(), ExtraBytesDataType::F64);
        assert_eq!(attributes[2].byte_offset(), 7);
    }

    #[test]
    fn test_read_applies_scale_and_offset() {
        let data = raw_entry("HeightAboveGround", 6, USE_SCALE_BIT | USE_OFFSET_BIT, 0.01, -2.0);
        let attribute = parse_extra_bytes(&data).unwrap().remove(0);
        let value = attribute.read(&1250_i32.to_le_bytes()).unwrap();
        assert!((value - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_read_without_scale() {
        let data = raw_entry("HeightAboveGround", 9, 0, 123.0, 456.0);
        let attribute = parse_extra_bytes(&data).unwrap().remove(0);
        assert_eq!(attribute.read(&2.5_f32.to_le_bytes()).unwrap(), 2.5);
    }

    #[test]
    fn test_read_short_record_fails() {
        let data = raw_entry("HeightAboveGround", 10, 0, 0.0, 0.0);
        let attribute = parse_extra_bytes(&data).unwrap().remove(0);
        assert!(attribute.read(&[0; 4]).is_err());
    }

    #[test]
    fn test_invalid_vlr_data() {
        assert!(parse_extra_bytes(&[0; 100]).is_err());
        assert!(parse_extra_bytes(&raw_entry("Deprecated", 12, 0, 0.0, 0.0)).is_err());
        assert!(parse_extra_bytes(&[]).unwrap().is_empty());
    }
}
