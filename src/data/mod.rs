//! Data module - collision CSV loading and view functions

mod loader;
mod views;

pub use loader::{
    CollisionStore, LoadError, CYCLISTS_INJURED, DATE_TIME, LATITUDE, LONGITUDE,
    MOTORISTS_INJURED, ON_STREET_NAME, PEDESTRIANS_INJURED, PERSONS_INJURED, PERSONS_KILLED,
};
pub use views::{
    coordinates, fatality_total, hour_slice, killed_in_year, mean_center, minute_histogram,
    points_above_threshold, top_streets, year_range, AffectedType, StreetRanking, ViewError,
    TOP_STREET_COUNT,
};
