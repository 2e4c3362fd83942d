//! Spot records and their aggregation into an intensity table.
mod table;

pub use table::{ImageSpots, IntensityTable, SpotRecord};
