pub mod geometry;
pub mod units;

pub use geometry::Geometry;
pub use units::UnitConverter;
