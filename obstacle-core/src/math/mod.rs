mod bounds;
pub use self::bounds::*;

mod polygon;
pub use self::polygon::*;

mod box3d;
pub use self::box3d::*;
