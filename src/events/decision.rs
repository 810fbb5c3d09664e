use super::DockTarget;

/// Действие, выбранное для одного завершённого клика
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Activate,
    Hide,
    Expose,
    None,
}

/// Ветка правил, по которой прошло решение: firstClick для
/// нефронтального приложения, click для фронтального
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionBranch {
    FirstClick,
    Click,
}

/// Решение по одному клику. Каждый клик порождает ровно одно решение;
/// решения не переиспользуются и не кэшируются между кликами.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: DecisionAction,
    pub branch: DecisionBranch,
    pub target: Option<DockTarget>,
    pub slot: Option<u32>,
    /// Действие подавлено гейтом "несколько окон"
    pub gate_skipped: bool,
}

impl Decision {
    /// Решение для клика, не попавшего ни в одну иконку с приложением
    pub fn unresolved(slot: Option<u32>) -> Self {
        Self {
            action: DecisionAction::None,
            branch: DecisionBranch::Click,
            target: None,
            slot,
            gate_skipped: false,
        }
    }
}
