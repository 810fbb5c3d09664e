use crate::error::{DockError, Result};
use std::process::Command;

/// Бэкенд на swaymsg. Дерево `swaymsg -t get_tree` сканируется как текст
/// без полного JSON-парсинга: ищутся маркеры "focused", "visible",
/// "app_id" и "class" с допуском на пробелы после двоеточия.
#[derive(Clone, Copy)]
pub struct SwayBackend;

impl SwayBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn test(&self) -> Result<()> {
        let output = Command::new("swaymsg").args(["-t", "get_tree"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(DockError::Internal("sway failed".to_string()))
        }
    }

    pub fn is_frontmost(&self, wm_class: &str) -> Result<bool> {
        let tree = self.get_tree()?;
        Ok(focused_app_id(&tree)
            .map(|id| id.eq_ignore_ascii_case(wm_class))
            .unwrap_or(false))
    }

    pub fn is_visible(&self, wm_class: &str) -> Result<bool> {
        let tree = self.get_tree()?;
        Ok(any_window_visible(&tree, wm_class))
    }

    pub fn window_count(&self, wm_class: &str) -> Result<u32> {
        let tree = self.get_tree()?;
        Ok(count_windows(&tree, wm_class))
    }

    fn get_tree(&self) -> Result<String> {
        let output = Command::new("swaymsg")
            .args(["-t", "get_tree"])
            .output()
            .map_err(|e| DockError::Internal(format!("swaymsg не найден: {}", e)))?;

        if !output.status.success() {
            return Err(DockError::Internal("swaymsg вернул ошибку".to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Позиция первого вхождения `"key": value` с необязательными
/// пробелами вокруг двоеточия
pub(crate) fn find_key_value(hay: &str, key: &str, value: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = hay[start..].find(key) {
        let key_pos = start + rel;
        let rest = hay[key_pos + key.len()..].trim_start();
        if let Some(rest) = rest.strip_prefix(':') {
            if rest.trim_start().starts_with(value) {
                return Some(key_pos);
            }
        }
        start = key_pos + key.len();
    }
    None
}

/// Строковое значение первого вхождения ключа; None для null
pub(crate) fn first_string_value(hay: &str, key: &str) -> Option<String> {
    let key_pos = hay.find(key)?;
    let rest = hay[key_pos + key.len()..].trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// app_id (или class для XWayland) узла с "focused": true.
/// Поиск ограничен маркером "focused" следующего узла: app_id и
/// window_properties в выводе swaymsg идут после списка "nodes",
/// но всегда до следующего узла.
pub(crate) fn focused_app_id(tree: &str) -> Option<String> {
    let pos = find_key_value(tree, "\"focused\"", "true")?;
    let after = &tree[pos..];
    let limit = after[1..]
        .find("\"focused\"")
        .map(|p| p + 1)
        .unwrap_or(after.len());
    let scope = &after[..limit];
    first_string_value(scope, "\"app_id\"").or_else(|| first_string_value(scope, "\"class\""))
}

/// Обходит все вхождения ключа и вызывает колбэк для совпавших значений
fn for_each_window(tree: &str, key: &str, wm_class: &str, mut f: impl FnMut(usize)) {
    let mut start = 0;
    while let Some(rel) = tree[start..].find(key) {
        let pos = start + rel;
        if let Some(value) = first_string_value(&tree[pos..], key) {
            if value.eq_ignore_ascii_case(wm_class) {
                f(pos);
            }
        }
        start = pos + key.len();
    }
}

pub(crate) fn count_windows(tree: &str, wm_class: &str) -> u32 {
    let mut count = 0u32;
    for_each_window(tree, "\"app_id\"", wm_class, |_| count += 1);
    for_each_window(tree, "\"class\"", wm_class, |_| count += 1);
    count
}

/// Есть ли у приложения окно с "visible": true. Узел окна ограничивается
/// отрезком от его "app_id" до "app_id" следующего узла: внутри отрезка
/// лежат и маркер видимости, и class XWayland-окна.
pub(crate) fn any_window_visible(tree: &str, wm_class: &str) -> bool {
    let key = "\"app_id\"";
    let mut start = 0;
    while let Some(rel) = tree[start..].find(key) {
        let pos = start + rel;
        let after = &tree[pos..];
        let limit = after[1..]
            .find(key)
            .map(|p| p + 1)
            .unwrap_or(after.len());
        let scope = &after[..limit];

        let matches = first_string_value(scope, key)
            .map(|v| v.eq_ignore_ascii_case(wm_class))
            .unwrap_or(false)
            || first_string_value(scope, "\"class\"")
                .map(|v| v.eq_ignore_ascii_case(wm_class))
                .unwrap_or(false);

        if matches && find_key_value(scope, "\"visible\"", "true").is_some() {
            return true;
        }
        start = pos + key.len();
    }
    false
}
