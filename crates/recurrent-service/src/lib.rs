pub mod error;
pub mod series;
