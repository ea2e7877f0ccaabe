mod add;
mod delete;
mod get;
mod update;
mod upload;

pub use add::*;
pub use delete::*;
pub use get::*;
pub use update::*;
pub use upload::*;
