use crate::config::Config;
use crate::error::Result;
use crate::events::{DockTarget, WindowCount};
use crate::services::SimulatedDesktop;
use std::sync::Arc;

/// Trait for application state trackers that can run in different modes
#[async_trait::async_trait]
pub trait StateTracker: Send + Sync {
    /// Является ли приложение фронтальным прямо сейчас
    async fn is_frontmost(&self, target: &DockTarget) -> bool;

    /// Видимо ли приложение (не скрыто) прямо сейчас
    async fn is_visible(&self, target: &DockTarget) -> bool;

    /// Число окон приложения; Unknown, если бэкенд не смог ответить
    async fn window_count(&self, target: &DockTarget) -> WindowCount;
}

/// Factory function to create an appropriate state tracker based on the dry_run flag
pub fn create_state_tracker(
    config: Arc<Config>,
    desktop: Option<Arc<SimulatedDesktop>>,
    dry_run: bool,
) -> Result<Arc<dyn StateTracker>> {
    if dry_run || config.state.backend == "simulated" {
        let desktop = desktop.unwrap_or_else(|| {
            let desktop = Arc::new(SimulatedDesktop::new());
            desktop.seed(&config.dock.static_items);
            desktop
        });
        Ok(Arc::new(super::simulated::SimulatedStateTracker::new(
            desktop,
        )))
    } else {
        Ok(Arc::new(super::tracker::RealStateTracker::new(config)?))
    }
}
