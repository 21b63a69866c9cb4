//! Checklist task entities.

pub mod model;

pub use model::{AuxiliaryItem, Task};
