use crate::error::{DockError, Result};
use std::process::Command;
use tracing::debug;

/// Бэкенд на xdotool: активное окно через getactivewindow,
/// список окон приложения через search --class
#[derive(Clone, Copy)]
pub struct XdotoolBackend;

impl XdotoolBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn test(&self) -> Result<()> {
        let output = Command::new("xdotool").args(["getactivewindow"]).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(DockError::Internal("xdotool failed".to_string()))
        }
    }

    pub fn is_frontmost(&self, wm_class: &str) -> Result<bool> {
        debug!("Запрос класса активного окна через xdotool");
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowclassname"])
            .output()
            .map_err(|e| DockError::Internal(format!("xdotool не найден: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockError::Internal(format!(
                "xdotool вернул ошибку: {}",
                stderr
            )));
        }

        let class = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Класс активного окна: '{}'", class);
        Ok(class.eq_ignore_ascii_case(wm_class))
    }

    pub fn is_visible(&self, wm_class: &str) -> Result<bool> {
        let ids = self.search(wm_class, true)?;
        Ok(!ids.is_empty())
    }

    pub fn window_count(&self, wm_class: &str) -> Result<u32> {
        let ids = self.search(wm_class, false)?;
        Ok(ids.len() as u32)
    }

    fn search(&self, wm_class: &str, only_visible: bool) -> Result<Vec<String>> {
        let mut args = vec!["search"];
        if only_visible {
            args.push("--onlyvisible");
        }
        args.push("--class");
        args.push(wm_class);

        let output = Command::new("xdotool")
            .args(&args)
            .output()
            .map_err(|e| DockError::Internal(format!("xdotool не найден: {}", e)))?;

        // xdotool search завершается с кодом 1, когда ничего не нашёл
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}
