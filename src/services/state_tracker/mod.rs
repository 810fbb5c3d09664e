//! StateTracker service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for answering
//! point-in-time questions about one application: is it frontmost, is it
//! visible, how many windows does it have. Every click decision queries
//! again; there is NO caching of answers between clicks. Backends MUST NOT
//! interpret the answers - mapping state to an action is done exclusively
//! by PolicyResolver.

mod simulated;
mod sway;
mod tracker;
mod r#trait;
mod wmctrl;
mod xdotool;

pub use self::r#trait::{create_state_tracker, StateTracker};
pub use self::simulated::SimulatedStateTracker;
