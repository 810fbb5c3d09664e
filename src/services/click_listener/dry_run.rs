use crate::config::Config;
use crate::error::Result;
use crate::events::{IconRef, PointerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::r#trait::ClickListenerTrait;

/// Эмуляция кликов для dry-run запуска: по одному клику на каждую
/// иконку статической таблицы, затем ожидание
pub struct DryRunClickListener {
    config: Arc<Config>,
    tx: mpsc::Sender<PointerEvent>,
}

impl DryRunClickListener {
    pub fn new(config: Arc<Config>, tx: mpsc::Sender<PointerEvent>) -> Result<Self> {
        info!("Инициализация DryRunClickListener");
        Ok(Self { config, tx })
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - ClickListener работает в режиме эмуляции");

        let slots: Vec<u32> = self
            .config
            .dock
            .static_items
            .iter()
            .map(|item| item.slot)
            .collect();
        info!("Сценарий dry-run: по одному клику на {} иконок", slots.len());

        for slot in slots {
            tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;

            let icon = IconRef::Slot(slot);
            if self.tx.send(PointerEvent::down(icon)).await.is_err() {
                return Ok(());
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(40)).await;
            if self.tx.send(PointerEvent::up(icon)).await.is_err() {
                return Ok(());
            }
            debug!("Эмулирован клик по слоту {}", slot);
        }

        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            debug!("ClickListener работает в dry-run режиме");
        }
    }
}

#[async_trait::async_trait]
impl ClickListenerTrait for DryRunClickListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
