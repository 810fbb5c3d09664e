use crate::events::{DockItem, WindowCount};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub dock: DockConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            filter: "dockclick_rust=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: "auto".to_string(),
        }
    }
}

/// Откуда брать таблицу иконок: D-Bus сервис дока и/или статический список
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DockConfig {
    pub source: String,
    pub bus_name: String,
    pub object_path: String,
    pub interface: String,
    #[serde(default)]
    pub static_items: Vec<DockItem>,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            source: "auto".to_string(),
            bus_name: "net.dockclick.Dock1".to_string(),
            object_path: "/net/dockclick/Dock1".to_string(),
            interface: "net.dockclick.Dock1".to_string(),
            static_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    pub backend: String,
    pub query_timeout_ms: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
            query_timeout_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionsConfig {
    pub backend: String,
    pub expose_command: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
            expose_command: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettingsConfig {
    #[serde(default)]
    pub command: String,
}

/// Секция [policy]: внешние имена ключей фиксированы хранилищем настроек
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default, rename = "firstClickBehavior")]
    pub first_click_behavior: FirstClickBehavior,
    #[serde(default, rename = "clickAction")]
    pub click_action: ClickAction,
    #[serde(
        default = "default_gate",
        rename = "firstClickAppExposeRequiresMultipleWindows"
    )]
    pub first_click_app_expose_requires_multiple_windows: bool,
    #[serde(
        default = "default_gate",
        rename = "clickAppExposeRequiresMultipleWindows"
    )]
    pub click_app_expose_requires_multiple_windows: bool,
}

fn default_gate() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            first_click_behavior: FirstClickBehavior::default(),
            click_action: ClickAction::default(),
            first_click_app_expose_requires_multiple_windows: true,
            click_app_expose_requires_multiple_windows: true,
        }
    }
}

/// Поведение клика по неактивному приложению
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirstClickBehavior {
    #[default]
    ActivateApp,
    AppExpose,
}

/// Поведение клика по уже активному приложению
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickAction {
    #[default]
    HideApp,
    AppExpose,
    None,
}

/// Неизменяемый снимок политики на одно решение.
/// Резолвер перечитывает его для каждого клика, ничего не запоминая между ними.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub first_click_behavior: FirstClickBehavior,
    pub click_action: ClickAction,
    pub first_click_app_expose_requires_multiple_windows: bool,
    pub click_app_expose_requires_multiple_windows: bool,
}

impl Policy {
    /// Гейт App Exposé для первого клика: действие выполняется, если гейт
    /// выключен, окон два и больше, либо число окон неизвестно.
    pub fn should_run_first_click_app_expose(&self, windows: WindowCount) -> bool {
        if !self.first_click_app_expose_requires_multiple_windows {
            return true;
        }
        match windows {
            WindowCount::Known(n) => n >= 2,
            WindowCount::Unknown => true,
        }
    }

    /// Тот же гейт для клика по активному приложению
    pub fn should_run_click_app_expose(&self, windows: WindowCount) -> bool {
        if !self.click_app_expose_requires_multiple_windows {
            return true;
        }
        match windows {
            WindowCount::Known(n) => n >= 2,
            WindowCount::Unknown => true,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DOCKCLICK_"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Снимок политики для резолвера решений
    pub fn policy(&self) -> Policy {
        Policy {
            first_click_behavior: self.policy.first_click_behavior,
            click_action: self.policy.click_action,
            first_click_app_expose_requires_multiple_windows: self
                .policy
                .first_click_app_expose_requires_multiple_windows,
            click_app_expose_requires_multiple_windows: self
                .policy
                .click_app_expose_requires_multiple_windows,
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация источника таблицы иконок
        match self.dock.source.as_str() {
            "auto" | "dbus" | "static" => {}
            _ => anyhow::bail!("Неверный источник таблицы иконок: {}", self.dock.source),
        }

        // Валидация трекера состояния приложений
        match self.state.backend.as_str() {
            "auto" | "wmctrl" | "xdotool" | "sway" | "simulated" => {}
            _ => anyhow::bail!("Неверный бэкенд состояния: {}", self.state.backend),
        }

        if self.state.query_timeout_ms < 10 {
            anyhow::bail!("query_timeout_ms должно быть минимум 10");
        }

        match self.actions.backend.as_str() {
            "auto" | "wmctrl" | "simulated" => {}
            _ => anyhow::bail!("Неверный бэкенд действий: {}", self.actions.backend),
        }

        // Валидация статической таблицы иконок
        let mut seen_slots = HashSet::new();
        for (i, item) in self.dock.static_items.iter().enumerate() {
            if item.bundle_id.is_empty() {
                anyhow::bail!("Пустой bundle_id в static_items #{}", i + 1);
            }
            if item.width == 0 || item.height == 0 {
                anyhow::bail!("Нулевая геометрия иконки в static_items #{}", i + 1);
            }
            if !seen_slots.insert(item.slot) {
                anyhow::bail!("Слот {} задан в static_items повторно", item.slot);
            }
        }

        Ok(())
    }
}
