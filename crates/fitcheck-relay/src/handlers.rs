//! Request handlers.

pub mod health;
pub mod rate;

pub use health::*;
pub use rate::*;
