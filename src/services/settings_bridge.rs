use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// URL-схема, по которой внешние компоненты просят открыть настройки
pub const SETTINGS_URL: &str = "dockclick://settings";

/// Источник запроса на открытие окна настроек
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTrigger {
    /// Аргумент командной строки `--settings`
    LaunchArgument,
    /// URL-обращение `dockclick://settings`
    UrlRequest,
}

pub fn is_settings_url(url: &str) -> bool {
    url == SETTINGS_URL
}

/// Мост настроек: принимает запросы на открытие окна настроек.
/// Повторные запросы безопасны, каждый просто открывает окно заново,
/// состояние движка кликов при этом не трогается.
pub struct SettingsBridge {
    command: String,
    opened: AtomicU64,
}

impl SettingsBridge {
    pub fn new(command: String) -> Self {
        Self {
            command,
            opened: AtomicU64::new(0),
        }
    }

    pub fn request_open(&self, trigger: SettingsTrigger) {
        match trigger {
            SettingsTrigger::LaunchArgument => {
                info!("Launch argument requested settings window");
            }
            SettingsTrigger::UrlRequest => {
                info!("Received URL request to open settings");
            }
        }

        info!("Opening settings window");
        self.opened.fetch_add(1, Ordering::Relaxed);

        if self.command.is_empty() {
            return;
        }

        let mut parts = self.command.split_whitespace();
        let program = match parts.next() {
            Some(program) => program,
            None => return,
        };

        match Command::new(program).args(parts).spawn() {
            Ok(child) => {
                debug!("Команда окна настроек запущена, pid={}", child.id());
            }
            Err(e) => {
                warn!("Не удалось запустить команду окна настроек: {}", e);
            }
        }
    }

    #[allow(dead_code)]
    pub fn opened_count(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }
}
