pub mod geometry;
pub mod space;
