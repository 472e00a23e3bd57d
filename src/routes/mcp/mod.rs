mod channel;
mod invoke;

pub use channel::*;
pub use invoke::*;
