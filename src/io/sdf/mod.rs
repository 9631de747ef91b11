//! MDL V2000 molfile / SD file reader.

mod reader;

pub use reader::read;
