pub mod file;
pub mod fixed_width;
