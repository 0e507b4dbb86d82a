//! Input data types: the program matrix and its cells.

mod matrix;

pub use matrix::*;
