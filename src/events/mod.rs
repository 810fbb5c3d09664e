pub mod app;
pub mod decision;
pub mod pointer;

pub use app::{DockItem, DockTarget, WindowCount};
pub use decision::{Decision, DecisionAction, DecisionBranch};
pub use pointer::{CompletedClick, IconRef, PointerEvent, PointerPhase};
