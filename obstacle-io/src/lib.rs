#![warn(clippy::all)]
//! Input and output of the obstacle extraction.
//!
//! Point clouds are read from LAS/LAZ files or delimited text files, the detected obstacles are written in
//! the XML layout of the obstacle database.

pub mod ascii;
pub mod las;
pub mod obstacle_db;
