pub mod classifier;
pub mod context;
pub mod delivery;
pub mod pipeline;
pub mod quote;
pub mod resolver;
pub mod responder;
pub mod tenant;

pub use classifier::{Intent, IntentClassifier, KeywordClassifier};
pub use context::{build_context, ConversationContext};
pub use delivery::{fallback_text, ReplyDelivery};
pub use pipeline::InboundPipeline;
pub use quote::{document_caption, render_document, QuoteGenerator};
pub use resolver::{ConversationResolver, Resolved};
pub use responder::{IntentResponder, Reply};
pub use tenant::provision_tenant;
