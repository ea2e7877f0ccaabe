mod add;
mod get;
mod pdf;

pub use add::*;
pub use get::*;
pub use pdf::*;
