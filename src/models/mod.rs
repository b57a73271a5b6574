pub mod crop;
pub mod issue;
pub mod job;
pub mod plot;
pub mod subdivision;
pub mod user;

pub use crop::{Crop, CropListRow};
pub use issue::{Issue, IssueListRow};
pub use job::{Job, JobListRow};
pub use plot::{Plot, PlotListRow};
pub use subdivision::{Subdivision, SubdivisionListRow};
pub use user::User;
