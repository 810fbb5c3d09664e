use crate::config::Config;
use crate::error::{DockError, Result};
use crate::events::{DockTarget, WindowCount};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::r#trait::StateTracker;
use super::sway::SwayBackend;
use super::wmctrl::WmctrlBackend;
use super::xdotool::XdotoolBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DesktopEnvironment {
    KDE,
    GNOME,
    X11Generic,
    WaylandGeneric,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateMethod {
    Xdotool,
    Wmctrl,
    Sway,
}

/// Порядок проб бэкендов для каждой среды рабочего стола
static PROBE_ORDER: Lazy<HashMap<DesktopEnvironment, &'static [StateMethod]>> = Lazy::new(|| {
    use StateMethod::*;
    let mut order: HashMap<DesktopEnvironment, &'static [StateMethod]> = HashMap::new();
    order.insert(DesktopEnvironment::KDE, &[Xdotool, Wmctrl, Sway]);
    order.insert(DesktopEnvironment::GNOME, &[Xdotool, Wmctrl, Sway]);
    order.insert(DesktopEnvironment::X11Generic, &[Xdotool, Wmctrl, Sway]);
    order.insert(DesktopEnvironment::WaylandGeneric, &[Sway, Xdotool, Wmctrl]);
    order.insert(DesktopEnvironment::Unknown, &[Xdotool, Wmctrl, Sway]);
    order
});

/// Трекер состояния приложений поверх внешних утилит.
/// Каждый запрос выполняется заново и ограничен таймаутом; никакого
/// кэширования ответов между кликами нет.
pub struct RealStateTracker {
    timeout: Duration,
    desktop_env: DesktopEnvironment,
    working_method: RwLock<Option<StateMethod>>,
    /// Бэкенд зафиксирован конфигом и не переопределяется при сбоях
    pinned: bool,

    wmctrl: WmctrlBackend,
    xdotool: XdotoolBackend,
    sway: SwayBackend,
}

impl RealStateTracker {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        info!("Инициализация RealStateTracker");

        let desktop_env = Self::detect_desktop_environment();
        info!("Обнаружена среда рабочего стола: {:?}", desktop_env);

        let (method, pinned) = match config.state.backend.as_str() {
            "wmctrl" => (Some(StateMethod::Wmctrl), true),
            "xdotool" => (Some(StateMethod::Xdotool), true),
            "sway" => (Some(StateMethod::Sway), true),
            _ => (None, false),
        };

        Ok(Self {
            timeout: Duration::from_millis(config.state.query_timeout_ms),
            desktop_env,
            working_method: RwLock::new(method),
            pinned,
            wmctrl: WmctrlBackend::new(),
            xdotool: XdotoolBackend::new(),
            sway: SwayBackend::new(),
        })
    }

    fn detect_desktop_environment() -> DesktopEnvironment {
        if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
            match desktop.to_lowercase().as_str() {
                d if d.contains("kde") => return DesktopEnvironment::KDE,
                d if d.contains("gnome") => return DesktopEnvironment::GNOME,
                _ => {}
            }
        }

        if std::env::var("SWAYSOCK").is_ok() {
            return DesktopEnvironment::WaylandGeneric;
        }

        if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
            match session.as_str() {
                "wayland" => return DesktopEnvironment::WaylandGeneric,
                "x11" => return DesktopEnvironment::X11Generic,
                _ => {}
            }
        }

        if let Ok(output) = Command::new("pgrep").arg("-f").arg("kwin").output() {
            if !output.stdout.is_empty() {
                return DesktopEnvironment::KDE;
            }
        }

        if let Ok(output) = Command::new("pgrep").arg("-f").arg("gnome-shell").output() {
            if !output.stdout.is_empty() {
                return DesktopEnvironment::GNOME;
            }
        }

        DesktopEnvironment::Unknown
    }

    async fn detect_working_method(&self) -> Result<StateMethod> {
        info!("Определяем рабочий бэкенд состояния приложений...");

        let order = PROBE_ORDER
            .get(&self.desktop_env)
            .copied()
            .unwrap_or(&[StateMethod::Xdotool, StateMethod::Wmctrl, StateMethod::Sway]);

        for method in order {
            let probe = match method {
                StateMethod::Xdotool => {
                    let b = self.xdotool;
                    run_bounded(self.timeout, move || b.test()).await
                }
                StateMethod::Wmctrl => {
                    let b = self.wmctrl;
                    run_bounded(self.timeout, move || b.test()).await
                }
                StateMethod::Sway => {
                    let b = self.sway;
                    run_bounded(self.timeout, move || b.test()).await
                }
            };
            if probe.is_ok() {
                info!("Используем {:?}", method);
                return Ok(*method);
            }
        }

        Err(DockError::Internal(
            "Ни один бэкенд состояния приложений не работает".to_string(),
        ))
    }

    async fn current_method(&self) -> Result<StateMethod> {
        let current = *self.working_method.read();
        if let Some(method) = current {
            return Ok(method);
        }

        let method = self.detect_working_method().await?;
        *self.working_method.write() = Some(method);
        Ok(method)
    }

    fn invalidate_method(&self, failed: StateMethod, err: &DockError) {
        if self.pinned {
            warn!("Бэкенд {:?} вернул ошибку: {}", failed, err);
            return;
        }
        warn!(
            "Бэкенд {:?} перестал работать: {}. Переопределим на следующем запросе",
            failed, err
        );
        *self.working_method.write() = None;
    }

    async fn query_frontmost(&self, method: StateMethod, target: &DockTarget) -> Result<bool> {
        let class = target.wm_class.clone();
        match method {
            StateMethod::Xdotool => {
                let b = self.xdotool;
                run_bounded(self.timeout, move || b.is_frontmost(&class)).await
            }
            StateMethod::Wmctrl => {
                let b = self.wmctrl;
                run_bounded(self.timeout, move || b.is_frontmost(&class)).await
            }
            StateMethod::Sway => {
                let b = self.sway;
                run_bounded(self.timeout, move || b.is_frontmost(&class)).await
            }
        }
    }

    async fn query_visible(&self, method: StateMethod, target: &DockTarget) -> Result<bool> {
        let class = target.wm_class.clone();
        match method {
            StateMethod::Xdotool => {
                let b = self.xdotool;
                run_bounded(self.timeout, move || b.is_visible(&class)).await
            }
            StateMethod::Wmctrl => {
                let b = self.wmctrl;
                run_bounded(self.timeout, move || b.is_visible(&class)).await
            }
            StateMethod::Sway => {
                let b = self.sway;
                run_bounded(self.timeout, move || b.is_visible(&class)).await
            }
        }
    }

    async fn query_window_count(&self, method: StateMethod, target: &DockTarget) -> Result<u32> {
        let class = target.wm_class.clone();
        match method {
            StateMethod::Xdotool => {
                let b = self.xdotool;
                run_bounded(self.timeout, move || b.window_count(&class)).await
            }
            StateMethod::Wmctrl => {
                let b = self.wmctrl;
                run_bounded(self.timeout, move || b.window_count(&class)).await
            }
            StateMethod::Sway => {
                let b = self.sway;
                run_bounded(self.timeout, move || b.window_count(&class)).await
            }
        }
    }
}

#[async_trait::async_trait]
impl StateTracker for RealStateTracker {
    async fn is_frontmost(&self, target: &DockTarget) -> bool {
        let method = match self.current_method().await {
            Ok(method) => method,
            Err(e) => {
                warn!("Нет рабочего бэкенда состояния: {}", e);
                return false;
            }
        };
        match self.query_frontmost(method, target).await {
            Ok(answer) => {
                debug!("frontmost({}) = {}", target.wm_class, answer);
                answer
            }
            Err(e) => {
                self.invalidate_method(method, &e);
                false
            }
        }
    }

    async fn is_visible(&self, target: &DockTarget) -> bool {
        let method = match self.current_method().await {
            Ok(method) => method,
            Err(e) => {
                warn!("Нет рабочего бэкенда состояния: {}", e);
                return false;
            }
        };
        match self.query_visible(method, target).await {
            Ok(answer) => {
                debug!("visible({}) = {}", target.wm_class, answer);
                answer
            }
            Err(e) => {
                self.invalidate_method(method, &e);
                false
            }
        }
    }

    async fn window_count(&self, target: &DockTarget) -> WindowCount {
        let method = match self.current_method().await {
            Ok(method) => method,
            Err(e) => {
                warn!("Нет рабочего бэкенда состояния: {}", e);
                return WindowCount::Unknown;
            }
        };
        match self.query_window_count(method, target).await {
            Ok(n) => {
                debug!("window_count({}) = {}", target.wm_class, n);
                WindowCount::Known(n)
            }
            Err(e) => {
                self.invalidate_method(method, &e);
                WindowCount::Unknown
            }
        }
    }
}

/// Запускает блокирующий вызов внешней утилиты в пуле blocking-задач
/// и ограничивает ожидание таймаутом. Сама утилита при таймауте
/// продолжает работать в фоне, но решение её не ждёт.
pub(crate) async fn run_bounded<T, F>(timeout: Duration, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(task);
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(DockError::Internal(format!(
            "Задача запроса состояния прервана: {}",
            e
        ))),
        Err(_) => Err(DockError::ServiceUnavailable(format!(
            "Запрос состояния не уложился в {:?}",
            timeout
        ))),
    }
}
