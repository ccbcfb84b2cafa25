#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod geo_math;
pub mod location_source;
pub mod logs;
pub mod position_filter;
pub mod session;
pub mod track_record;
pub mod track_writer;
