use crate::events::{DockTarget, WindowCount};
use crate::services::SimulatedDesktop;
use std::sync::Arc;
use tracing::info;

use super::r#trait::StateTracker;

/// Трекер состояния поверх симулируемого рабочего стола
pub struct SimulatedStateTracker {
    desktop: Arc<SimulatedDesktop>,
}

impl SimulatedStateTracker {
    pub fn new(desktop: Arc<SimulatedDesktop>) -> Self {
        info!("Инициализация SimulatedStateTracker");
        Self { desktop }
    }
}

#[async_trait::async_trait]
impl StateTracker for SimulatedStateTracker {
    async fn is_frontmost(&self, target: &DockTarget) -> bool {
        self.desktop.is_frontmost(&target.wm_class)
    }

    async fn is_visible(&self, target: &DockTarget) -> bool {
        self.desktop.is_visible(&target.wm_class)
    }

    async fn window_count(&self, target: &DockTarget) -> WindowCount {
        match self.desktop.window_count(&target.wm_class) {
            Some(n) => WindowCount::Known(n),
            None => WindowCount::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(wm_class: &str) -> DockTarget {
        DockTarget::new(format!("app.{}", wm_class), wm_class.to_string())
    }

    #[tokio::test]
    async fn test_reads_desktop_state() {
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.register("firefox", true, Some(2));
        desktop.set_frontmost(Some("firefox"));

        let tracker = SimulatedStateTracker::new(desktop);

        assert!(tracker.is_frontmost(&target("firefox")).await);
        assert!(tracker.is_visible(&target("firefox")).await);
        assert_eq!(
            tracker.window_count(&target("firefox")).await,
            WindowCount::Known(2)
        );
        assert!(!tracker.is_frontmost(&target("kitty")).await);
    }

    #[tokio::test]
    async fn test_unknown_window_count() {
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.register("firefox", true, None);

        let tracker = SimulatedStateTracker::new(desktop);

        assert_eq!(
            tracker.window_count(&target("firefox")).await,
            WindowCount::Unknown
        );
        assert_eq!(
            tracker.window_count(&target("ghost")).await,
            WindowCount::Known(0)
        );
    }
}
