pub mod auth;
pub mod conversation;
pub mod faq;
pub mod health_checks;
pub mod message;
pub mod product;
pub mod prospect;
pub mod quote;
pub mod settings;
pub mod webhook;

pub use health_checks::*;
