mod extra_bytes;
pub use self::extra_bytes::*;

mod las_reader;
pub use self::las_reader::*;

use std::path::Path;

/// Returns `true` if `path` has a `las` or `laz` extension, ignoring case
pub fn path_is_las_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            extension.eq_ignore_ascii_case("las") || extension.eq_ignore_ascii_case("laz")
        })
        .unwrap_or(false)
}
