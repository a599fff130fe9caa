pub mod lifecycle;
pub mod notice;
pub mod user;
pub mod visibility;

pub use notice::*;
pub use user::*;
pub use visibility::{NoticeFilters, NoticeQuery, Pagination, VisibilityScope};
