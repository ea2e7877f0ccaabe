//! Work queue between the webhook acknowledgement and the inbound pipeline.

mod queue;

pub use queue::{start, IngressQueue, IngressWorker};
