pub mod changes;
pub mod disaster;
pub mod map_feed;
pub mod need;
pub mod report;
pub mod resource;
pub mod status;
pub mod target;
pub mod trust;
