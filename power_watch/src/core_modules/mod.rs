pub mod blob;
pub mod change_mask;
pub mod power_estimator;
pub mod region_extractor;
pub mod revolution;
pub mod trigger_zone;
