use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентичность приложения, закреплённого за слотом дока
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DockTarget {
    pub bundle_id: String,
    pub wm_class: String,
}

impl DockTarget {
    pub fn new(bundle_id: impl Into<String>, wm_class: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            wm_class: wm_class.into(),
        }
    }
}

impl fmt::Display for DockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wm_class.is_empty() {
            write!(f, "{}", self.bundle_id)
        } else {
            write!(f, "{} ({})", self.bundle_id, self.wm_class)
        }
    }
}

/// Число окон приложения на момент запроса.
/// `Unknown` не равен нулю: таймаут или отказ запроса не должны
/// блокировать действие пользователя.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowCount {
    Known(u32),
    Unknown,
}

impl fmt::Display for WindowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowCount::Known(n) => write!(f, "{}", n),
            WindowCount::Unknown => write!(f, "unknown"),
        }
    }
}

/// Строка таблицы иконок дока: слот, геометрия и закреплённое приложение.
/// Таблица запрашивается у дока заново при каждом событии указателя.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockItem {
    pub slot: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub bundle_id: String,
    pub wm_class: String,
}

impl DockItem {
    /// Попадает ли экранная точка в прямоугольник иконки
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x + self.width as i32
            && py < self.y + self.height as i32
    }

    pub fn target(&self) -> DockTarget {
        DockTarget::new(self.bundle_id.clone(), self.wm_class.clone())
    }
}

impl fmt::Display for DockItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot {} [{}x{} @ ({}, {})] -> {}",
            self.slot, self.width, self.height, self.x, self.y, self.bundle_id
        )
    }
}
