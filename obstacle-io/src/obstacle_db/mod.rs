mod obstacle_db_writer;
pub use self::obstacle_db_writer::*;
