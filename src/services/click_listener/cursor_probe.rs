use crate::error::{DockError, Result};
use std::process::Command;

/// Позиция курсора на момент клика через `xdotool getmouselocation`
pub struct CursorProbe;

impl CursorProbe {
    pub fn new() -> Self {
        Self
    }

    pub fn position(&self) -> Result<(i32, i32)> {
        let output = Command::new("xdotool")
            .args(["getmouselocation", "--shell"])
            .output()
            .map_err(|e| DockError::Internal(format!("xdotool не найден: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockError::Internal(format!(
                "xdotool вернул ошибку: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_mouse_location(&stdout)
            .ok_or_else(|| DockError::Internal("Не удалось разобрать позицию курсора".to_string()))
    }
}

/// Вывод формата --shell: строки X=512, Y=1043, SCREEN=0, WINDOW=...
pub(crate) fn parse_mouse_location(stdout: &str) -> Option<(i32, i32)> {
    let mut x = None;
    let mut y = None;
    for line in stdout.lines() {
        if let Some(value) = line.trim().strip_prefix("X=") {
            x = value.trim().parse().ok();
        } else if let Some(value) = line.trim().strip_prefix("Y=") {
            y = value.trim().parse().ok();
        }
    }
    Some((x?, y?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mouse_location() {
        let output = "X=512\nY=1043\nSCREEN=0\nWINDOW=58720263\n";
        assert_eq!(parse_mouse_location(output), Some((512, 1043)));
    }

    #[test]
    fn test_parse_negative_coordinates() {
        // Координаты могут быть отрицательными на многомониторных столах
        let output = "X=-120\nY=4\nSCREEN=1\nWINDOW=1\n";
        assert_eq!(parse_mouse_location(output), Some((-120, 4)));
    }

    #[test]
    fn test_parse_incomplete_output() {
        assert_eq!(parse_mouse_location("X=512\nSCREEN=0\n"), None);
        assert_eq!(parse_mouse_location(""), None);
        assert_eq!(parse_mouse_location("X=abc\nY=10\n"), None);
    }
}
