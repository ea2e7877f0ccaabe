mod account;
mod conversation;
mod faq;
mod language;
mod message;
mod product;
mod quote;
mod setting;
mod tenant;

pub use account::*;
pub use conversation::*;
pub use faq::*;
pub use language::*;
pub use message::*;
pub use product::*;
pub use quote::*;
pub use setting::*;
pub use tenant::*;
