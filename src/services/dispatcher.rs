use crate::events::{Decision, DecisionAction, DecisionBranch, DockTarget};
use crate::services::desktop_actions::DesktopActions;
use crate::services::trace_log::TraceLog;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct ExecRequest {
    action: DecisionAction,
    target: DockTarget,
}

/// Диспетчер действий. Запись в журнал решений делается синхронно в
/// порядке поступления решений; сами действия уходят в очередь и
/// выполняются одним воркером, что сохраняет их порядок для каждой цели.
/// Сбой действия логируется и никогда не останавливает обработку кликов.
pub struct ActionDispatcher {
    trace: Arc<TraceLog>,
    tx: Mutex<Option<mpsc::UnboundedSender<ExecRequest>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ActionDispatcher {
    pub fn new(actions: Box<dyn DesktopActions>, trace: Arc<TraceLog>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExecRequest>();

        let worker = tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                let result = match req.action {
                    DecisionAction::Activate => actions.activate(&req.target).await,
                    DecisionAction::Hide => actions.hide(&req.target).await,
                    DecisionAction::Expose => actions.expose(&req.target).await,
                    DecisionAction::None => Ok(()),
                };
                if let Err(e) = result {
                    error!(
                        "Не удалось выполнить {:?} для {}: {}",
                        req.action, req.target, e
                    );
                }
            }
            debug!("Очередь действий закрыта");
        });

        Self {
            trace,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Принимает решение: ровно одна запись в журнале на решение,
    /// затем постановка действия в очередь, если оно есть
    pub fn dispatch(&self, decision: &Decision) {
        self.trace.append(trace_record(decision));

        if decision.action == DecisionAction::None {
            return;
        }
        let target = match decision.target.clone() {
            Some(target) => target,
            None => return,
        };

        let tx = self.tx.lock();
        if let Some(tx) = tx.as_ref() {
            if tx
                .send(ExecRequest {
                    action: decision.action,
                    target,
                })
                .is_err()
            {
                warn!("Очередь действий уже остановлена");
            }
        }
    }

    /// Закрывает очередь и ждёт, пока воркер дообработает принятые действия
    pub async fn shutdown(&self, timeout: Duration) {
        let tx = self.tx.lock().take();
        drop(tx);

        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            match tokio::time::timeout(timeout, handle).await {
                Ok(_) => info!("Все поставленные действия выполнены"),
                Err(_) => warn!("Действия не успели завершиться за {:?}", timeout),
            }
        }
    }
}

/// Текст записи журнала для решения. Словарь строк фиксирован и
/// проверяется тестами дословно.
pub(crate) fn trace_record(decision: &Decision) -> String {
    let target = match &decision.target {
        Some(target) => target,
        None => {
            let slot = decision
                .slot
                .map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string());
            return format!("click unresolved at slot={}", slot);
        }
    };
    let bundle = &target.bundle_id;

    match decision.branch {
        DecisionBranch::FirstClick => match decision.action {
            DecisionAction::Activate => format!("firstClick activate executing for {}", bundle),
            DecisionAction::Expose => format!("firstClick appExpose executing for {}", bundle),
            _ if decision.gate_skipped => format!(
                "firstClick appExpose skipped by shouldRunFirstClickAppExpose for {}",
                bundle
            ),
            _ => format!("click ignored for {}", bundle),
        },
        DecisionBranch::Click => match decision.action {
            DecisionAction::Hide => format!("click hideApp executing for {}", bundle),
            DecisionAction::Expose => format!("Triggering App Exposé for {}", bundle),
            _ if decision.gate_skipped => format!("click appExpose skipped for {}", bundle),
            _ => format!("click ignored for {}", bundle),
        },
    }
}
