mod cancellation;
pub use self::cancellation::*;
