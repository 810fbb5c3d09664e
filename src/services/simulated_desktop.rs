use crate::events::DockItem;
use dashmap::DashMap;
use parking_lot::RwLock;

/// Состояние одного приложения в симулируемом рабочем столе
#[derive(Debug, Clone)]
pub struct SimApp {
    pub visible: bool,
    /// None означает, что число окон неизвестно даже симуляции
    pub windows: Option<u32>,
}

/// Общая модель рабочего стола для dry-run запуска: трекер состояния
/// читает её, а симулятор действий изменяет. Ключ - wm_class приложения.
pub struct SimulatedDesktop {
    apps: DashMap<String, SimApp>,
    frontmost: RwLock<Option<String>>,
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self {
            apps: DashMap::new(),
            frontmost: RwLock::new(None),
        }
    }

    /// Регистрирует приложения из статической таблицы иконок.
    /// Все начинают скрытыми с одним окном.
    pub fn seed(&self, items: &[DockItem]) {
        for item in items {
            self.apps.insert(
                item.wm_class.clone(),
                SimApp {
                    visible: false,
                    windows: Some(1),
                },
            );
        }
    }

    #[allow(dead_code)]
    pub fn register(&self, wm_class: &str, visible: bool, windows: Option<u32>) {
        self.apps
            .insert(wm_class.to_string(), SimApp { visible, windows });
    }

    pub fn set_frontmost(&self, wm_class: Option<&str>) {
        *self.frontmost.write() = wm_class.map(|s| s.to_string());
    }

    #[allow(dead_code)]
    pub fn set_windows(&self, wm_class: &str, windows: Option<u32>) {
        if let Some(mut app) = self.apps.get_mut(wm_class) {
            app.windows = windows;
        }
    }

    /// Активация: приложение становится видимым и фронтальным
    pub fn activate(&self, wm_class: &str) {
        let mut app = self
            .apps
            .entry(wm_class.to_string())
            .or_insert_with(|| SimApp {
                visible: false,
                windows: Some(1),
            });
        app.visible = true;
        if app.windows == Some(0) {
            app.windows = Some(1);
        }
        drop(app);
        self.set_frontmost(Some(wm_class));
    }

    /// Скрытие: приложение теряет видимость и фронтальность
    pub fn hide(&self, wm_class: &str) {
        if let Some(mut app) = self.apps.get_mut(wm_class) {
            app.visible = false;
        }
        let mut frontmost = self.frontmost.write();
        if frontmost.as_deref() == Some(wm_class) {
            *frontmost = None;
        }
    }

    pub fn is_frontmost(&self, wm_class: &str) -> bool {
        self.frontmost.read().as_deref() == Some(wm_class)
    }

    pub fn is_visible(&self, wm_class: &str) -> bool {
        self.apps
            .get(wm_class)
            .map(|app| app.visible)
            .unwrap_or(false)
    }

    /// None - приложение зарегистрировано, но число окон неизвестно.
    /// Незарегистрированное приложение считается имеющим ноль окон.
    pub fn window_count(&self, wm_class: &str) -> Option<u32> {
        match self.apps.get(wm_class) {
            Some(app) => app.windows,
            None => Some(0),
        }
    }
}

impl Default for SimulatedDesktop {
    fn default() -> Self {
        Self::new()
    }
}
