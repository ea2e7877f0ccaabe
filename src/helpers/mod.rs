pub mod json;
pub mod pagination;
pub mod signature;

pub use json::*;
pub use pagination::{Page, PageQuery, Pagination};
