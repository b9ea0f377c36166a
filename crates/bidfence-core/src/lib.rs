pub mod geo;
pub mod types;

pub use geo::*;
pub use types::*;
