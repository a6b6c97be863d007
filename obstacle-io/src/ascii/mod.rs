mod ascii_format;
pub(crate) use self::ascii_format::ColumnType;
pub use self::ascii_format::FORMAT_LITERALS_HELP;

mod ascii_reader;
pub use self::ascii_reader::*;
