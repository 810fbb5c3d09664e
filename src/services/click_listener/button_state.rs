use crate::events::PointerPhase;

/// Состояние левой кнопки указателя: превращает сырые значения evdev
/// в переходы down/up. Повторные значения той же фазы и автоповтор
/// (значение 2) переходов не дают.
#[derive(Debug, Default)]
pub struct ButtonState {
    pressed: bool,
}

impl ButtonState {
    pub fn new() -> Self {
        Self { pressed: false }
    }

    /// Переход по значению события BTN_LEFT; None, если перехода нет
    pub fn transition(&mut self, value: i32) -> Option<PointerPhase> {
        match value {
            1 if !self.pressed => {
                self.pressed = true;
                Some(PointerPhase::Down)
            }
            0 if self.pressed => {
                self.pressed = false;
                Some(PointerPhase::Up)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_cycle() {
        let mut state = ButtonState::new();
        assert_eq!(state.transition(1), Some(PointerPhase::Down));
        assert_eq!(state.transition(0), Some(PointerPhase::Up));
        assert_eq!(state.transition(1), Some(PointerPhase::Down));
        assert_eq!(state.transition(0), Some(PointerPhase::Up));
    }

    #[test]
    fn test_duplicate_values_ignored() {
        let mut state = ButtonState::new();
        assert_eq!(state.transition(1), Some(PointerPhase::Down));
        assert_eq!(state.transition(1), None);
        assert_eq!(state.transition(0), Some(PointerPhase::Up));
        assert_eq!(state.transition(0), None);
    }

    #[test]
    fn test_autorepeat_ignored() {
        let mut state = ButtonState::new();
        assert_eq!(state.transition(1), Some(PointerPhase::Down));
        assert_eq!(state.transition(2), None);
        assert_eq!(state.transition(2), None);
        assert_eq!(state.transition(0), Some(PointerPhase::Up));
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut state = ButtonState::new();
        assert_eq!(state.transition(0), None);
    }
}
