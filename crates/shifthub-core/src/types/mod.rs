//! Domain primitive types shared by all ShiftHub crates.

pub mod actor;
pub mod session_key;
pub mod shift;

pub use actor::{Actor, ActorId};
pub use session_key::SessionKey;
pub use shift::ShiftName;
