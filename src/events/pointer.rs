use crate::events::app::DockTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Фаза кнопки указателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Up,
}

impl fmt::Display for PointerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerPhase::Down => write!(f, "down"),
            PointerPhase::Up => write!(f, "up"),
        }
    }
}

/// Ссылка на иконку дока: либо номер слота, либо экранная координата.
/// Координатная форма разрешается в слот заново при каждом событии.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconRef {
    Slot(u32),
    Point { x: i32, y: i32 },
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconRef::Slot(slot) => write!(f, "slot={}", slot),
            IconRef::Point { x, y } => write!(f, "point=({}, {})", x, y),
        }
    }
}

/// Сырое событие указателя на иконке дока.
/// Живёт только между слушателем и классификатором кликов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub icon: IconRef,
    pub phase: PointerPhase,
    pub timestamp: std::time::Instant,
}

impl PointerEvent {
    pub fn new(icon: IconRef, phase: PointerPhase) -> Self {
        Self {
            icon,
            phase,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn down(icon: IconRef) -> Self {
        Self::new(icon, PointerPhase::Down)
    }

    pub fn up(icon: IconRef) -> Self {
        Self::new(icon, PointerPhase::Up)
    }
}

impl fmt::Display for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] ({}ms)",
            self.phase,
            self.icon,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Завершённый клик: ровно один на каждую физическую пару down→up.
/// Цель клика берётся из разрешения иконки в момент события `up`;
/// `target = None` означает, что слот в этот момент никем не занят.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedClick {
    pub slot: Option<u32>,
    pub target: Option<DockTarget>,
    pub timestamp: std::time::Instant,
}

impl CompletedClick {
    #[allow(dead_code)]
    pub fn new(slot: Option<u32>, target: Option<DockTarget>) -> Self {
        Self {
            slot,
            target,
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for CompletedClick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.target, self.slot) {
            (Some(target), _) => write!(f, "click on {}", target),
            (None, Some(slot)) => write!(f, "click on empty slot {}", slot),
            (None, None) => write!(f, "click outside dock items"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::app::DockTarget;

    #[test]
    fn test_phase_display_matches_trace_vocabulary() {
        assert_eq!(PointerPhase::Down.to_string(), "down");
        assert_eq!(PointerPhase::Up.to_string(), "up");
    }

    #[test]
    fn test_icon_ref_display() {
        assert_eq!(IconRef::Slot(3).to_string(), "slot=3");
        assert_eq!(IconRef::Point { x: 10, y: -4 }.to_string(), "point=(10, -4)");
    }

    #[test]
    fn test_pointer_event_constructors() {
        let down = PointerEvent::down(IconRef::Slot(1));
        let up = PointerEvent::up(IconRef::Slot(1));

        assert_eq!(down.phase, PointerPhase::Down);
        assert_eq!(up.phase, PointerPhase::Up);
        assert_eq!(down.icon, up.icon);
    }

    #[test]
    fn test_completed_click_display() {
        let target = DockTarget::new("org.mozilla.firefox", "firefox");
        let resolved = CompletedClick::new(Some(2), Some(target));
        let empty = CompletedClick::new(Some(7), None);
        let outside = CompletedClick::new(None, None);

        assert!(resolved.to_string().contains("org.mozilla.firefox"));
        assert!(empty.to_string().contains("empty slot 7"));
        assert!(outside.to_string().contains("outside"));
    }
}
