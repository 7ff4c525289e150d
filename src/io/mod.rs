mod file_reader;
mod range_reader;

pub use file_reader::FileRangeReader;
pub use range_reader::{read_u24_le, read_u40_le, write_u24_le, write_u40_le, RangeReader};
