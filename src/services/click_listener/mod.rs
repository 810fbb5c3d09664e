//! ClickListener service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for observing raw
//! left-button transitions and emitting PointerEvent(s) into the pipeline
//! channel, one event per physical transition. It MUST NOT resolve icons,
//! consult policy, or keep per-click state beyond the button phase; pairing
//! and decisions are made downstream by ClickClassifier and PolicyResolver.

mod button_state;
mod click_listener;
mod cursor_probe;
mod dry_run;
mod r#trait;

pub use self::r#trait::{create_click_listener, ClickListenerTrait};
