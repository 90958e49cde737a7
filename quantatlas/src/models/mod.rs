pub mod ensemble;
pub mod generator;
pub mod montecarlo;
