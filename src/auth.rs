//! Bearer credential primitives: the redacting token wrapper and validated storage keys.

pub mod key;
pub mod secret;

pub use key::*;
pub use secret::*;
