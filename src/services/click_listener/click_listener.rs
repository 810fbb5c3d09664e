use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{DockError, Result};
use crate::events::{IconRef, PointerEvent};
use crate::utils::DeviceFinder;
use evdev::{Device, EventType, KeyCode};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::button_state::ButtonState;
use super::cursor_probe::CursorProbe;
use super::r#trait::ClickListenerTrait;

/// Слушатель кликов поверх evdev. Устройство НЕ захватывается
/// эксклюзивно: слушатель только наблюдает, системная обработка
/// кликов идёт своим чередом.
pub struct RealClickListener {
    device: Device,
    button: ButtonState,
    probe: CursorProbe,
    tx: mpsc::Sender<PointerEvent>,
}

impl RealClickListener {
    pub fn new(config: Arc<Config>, tx: mpsc::Sender<PointerEvent>) -> Result<Self> {
        info!("Инициализация RealClickListener");

        let device_path = DeviceFinder::find_pointer_device(&config.input.device_path)?;

        let device = Device::open(&device_path).map_err(|e| {
            DockError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;

        Self::log_device(&device);

        Ok(Self {
            device,
            button: ButtonState::new(),
            probe: CursorProbe::new(),
            tx,
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealClickListener запущен, начинаем чтение событий");

        loop {
            // Обработка событий указателя (неблокирующая)
            let events_vec = match self.device.fetch_events() {
                Ok(events) => events.collect::<Vec<_>>(),
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            for event in events_vec {
                if let Err(e) = self.handle_event(event).await {
                    error!("Ошибка обработки события: {}", e);
                }
            }

            // Небольшая задержка для предотвращения 100% загрузки CPU
            tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        }
    }

    async fn handle_event(&mut self, event: evdev::InputEvent) -> Result<()> {
        if event.event_type() != EventType::KEY || event.code() != KeyCode::BTN_LEFT.code() {
            return Ok(());
        }

        // Переход состояния кнопки; дубликаты и автоповторы отбрасываются
        let phase = match self.button.transition(event.value()) {
            Some(phase) => phase,
            None => return Ok(()),
        };

        // Позиция курсора берётся в момент самого события
        let (x, y) = match self.probe.position() {
            Ok(position) => position,
            Err(e) => {
                warn!(
                    "Не удалось определить позицию курсора: {}. Событие {} пропущено",
                    e, phase
                );
                return Ok(());
            }
        };

        let pointer_event = PointerEvent::new(IconRef::Point { x, y }, phase);
        debug_if_enabled!("Событие указателя: {}", pointer_event);

        if self.tx.send(pointer_event).await.is_err() {
            return Err(DockError::Internal("Конвейер кликов закрыт".to_string()));
        }

        Ok(())
    }

    fn log_device(device: &Device) {
        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());
        info!("Уникальный ID: {:?}", device.unique_name());
        info!("Устройство открыто в режиме наблюдения, без захвата");
    }
}

#[async_trait::async_trait]
impl ClickListenerTrait for RealClickListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
