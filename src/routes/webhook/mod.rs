mod receive;
mod verify;

pub use receive::*;
pub use verify::*;
