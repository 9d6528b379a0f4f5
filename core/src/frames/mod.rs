//! Frames and the variable store.
//!
//! A frame is a flat name to slot table. Frames are created and destroyed
//! only by explicit instructions (`CREATEFRAME`, `PUSHFRAME`, `POPFRAME`);
//! nothing is reclaimed behind the program's back.

mod frame;
mod store;

pub use frame::{Frame, Scope, Slot};
pub use store::FrameStore;
