pub mod list;
pub mod select;

pub use list::{ListParams, Pagination, SortSpec};
pub use select::SelectQuery;
