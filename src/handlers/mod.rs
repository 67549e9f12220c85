pub mod admin;
pub mod extract;
pub mod health;
pub mod public;

pub use admin::*;
pub use health::*;
pub use public::*;
