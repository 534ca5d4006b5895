pub mod changelog;
pub mod comments;
pub mod connection;
pub mod details;
pub mod disasters;
pub mod fields;
pub mod needs;
pub mod organizations;
pub mod reports;
pub mod resources;
pub mod trust;
pub mod users;
