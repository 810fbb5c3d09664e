use crate::events::PointerEvent;
use crate::services::click_classifier::ClickClassifier;
use tokio::sync::mpsc;
use tracing::info;

/// Конвейер кликов: единственный потребитель канала событий указателя.
/// События обрабатываются строго в порядке поступления, по одному;
/// конвейер завершается, когда закрыты все отправители канала.
pub struct ClickPipeline {
    rx: mpsc::Receiver<PointerEvent>,
    classifier: ClickClassifier,
}

impl ClickPipeline {
    pub fn new(rx: mpsc::Receiver<PointerEvent>, classifier: ClickClassifier) -> Self {
        Self { rx, classifier }
    }

    pub async fn run(mut self) {
        info!("Конвейер кликов запущен");

        while let Some(event) = self.rx.recv().await {
            self.classifier.handle_pointer_event(event).await;
        }

        info!("Канал событий закрыт, конвейер кликов остановлен");
    }
}
