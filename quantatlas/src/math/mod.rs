pub mod confidence;
pub mod finance;
pub mod statistics;
pub mod technical;
pub mod timeseries;
