use crate::error::{DockError, Result};
use std::process::Command;

/// Бэкенд на wmctrl + xprop. Список окон берётся из `wmctrl -lx`,
/// активное окно из `xprop -root _NET_ACTIVE_WINDOW`.
#[derive(Clone, Copy)]
pub struct WmctrlBackend;

impl WmctrlBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn test(&self) -> Result<()> {
        let output = Command::new("wmctrl").args(["-l"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(DockError::Internal("wmctrl failed".to_string()))
        }
    }

    pub fn is_frontmost(&self, wm_class: &str) -> Result<bool> {
        let active_id = self.active_window_id()?;
        let windows = self.list_windows()?;
        Ok(windows
            .iter()
            .any(|(id, class)| *id == active_id && class_matches(class, wm_class)))
    }

    /// wmctrl перечисляет и свёрнутые окна, поэтому видимость здесь
    /// означает наличие хотя бы одного окна в списке
    pub fn is_visible(&self, wm_class: &str) -> Result<bool> {
        let windows = self.list_windows()?;
        Ok(windows
            .iter()
            .any(|(_, class)| class_matches(class, wm_class)))
    }

    pub fn window_count(&self, wm_class: &str) -> Result<u32> {
        let windows = self.list_windows()?;
        Ok(windows
            .iter()
            .filter(|(_, class)| class_matches(class, wm_class))
            .count() as u32)
    }

    fn list_windows(&self) -> Result<Vec<(u64, String)>> {
        let output = Command::new("wmctrl")
            .args(["-lx"])
            .output()
            .map_err(|e| DockError::Internal(format!("wmctrl не найден: {}", e)))?;

        if !output.status.success() {
            return Err(DockError::Internal("wmctrl вернул ошибку".to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_window_list(&stdout))
    }

    fn active_window_id(&self) -> Result<u64> {
        let output = Command::new("xprop")
            .args(["-root", "_NET_ACTIVE_WINDOW"])
            .output()
            .map_err(|e| DockError::Internal(format!("xprop не найден: {}", e)))?;

        if !output.status.success() {
            return Err(DockError::Internal("xprop вернул ошибку".to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_active_window_id(&stdout)
            .ok_or_else(|| DockError::Internal("Активное окно не найдено".to_string()))
    }
}

/// Строка `wmctrl -lx`: id, desktop, WM_CLASS, host, title.
/// Возвращаем пары (id, колонка класса).
pub(crate) fn parse_window_list(stdout: &str) -> Vec<(u64, String)> {
    let mut windows = Vec::new();
    for line in stdout.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        if let Some(id) = parse_hex_id(parts[0]) {
            windows.push((id, parts[2].to_string()));
        }
    }
    windows
}

/// Вывод xprop: `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3800003`
pub(crate) fn parse_active_window_id(stdout: &str) -> Option<u64> {
    stdout
        .split_whitespace()
        .find_map(|token| parse_hex_id(token.trim_end_matches(',')))
        .filter(|id| *id != 0)
}

fn parse_hex_id(token: &str) -> Option<u64> {
    let hex = token.strip_prefix("0x")?;
    u64::from_str_radix(hex, 16).ok()
}

/// Колонка WM_CLASS имеет вид "instance.Class"; совпадением считаем
/// любую из частей без учёта регистра
pub(crate) fn class_matches(column: &str, wm_class: &str) -> bool {
    if column.eq_ignore_ascii_case(wm_class) {
        return true;
    }
    column
        .split('.')
        .any(|part| part.eq_ignore_ascii_case(wm_class))
}
