pub mod policy;
pub mod sessions;
pub mod token;
