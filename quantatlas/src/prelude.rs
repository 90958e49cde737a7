pub use crate::{
    math::{confidence::*, finance::*, statistics::*, technical::*, timeseries::*},
    models::{ensemble::*, generator::*, montecarlo::*},
    utils::errors::*,
};
