pub mod air_quality;
pub mod measurement;
pub mod sensor;
pub mod station;
