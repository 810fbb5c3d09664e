use crate::config::Config;
use crate::error::Result;
use crate::events::PointerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Trait for click listeners that can run in different modes
#[async_trait::async_trait]
pub trait ClickListenerTrait {
    /// Run the click listener
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate click listener based on the dry_run flag
pub fn create_click_listener(
    config: Arc<Config>,
    tx: mpsc::Sender<PointerEvent>,
    dry_run: bool,
) -> Result<Box<dyn ClickListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_run::DryRunClickListener::new(
            config, tx,
        )?))
    } else {
        Ok(Box::new(super::click_listener::RealClickListener::new(
            config, tx,
        )?))
    }
}
