pub mod conflicts;
pub mod crops;
pub mod domains;
pub mod issues;
pub mod jobs;
pub mod ownership;
pub mod plots;
pub mod subdivisions;
pub mod users;
