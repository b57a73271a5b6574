pub mod auth;
pub mod crops;
pub mod issues;
pub mod jobs;
pub mod plots;
pub mod subdivisions;
pub mod users;
