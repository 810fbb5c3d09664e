use crate::config::Config;
use crate::error::{DockError, Result};
use crate::events::DockTarget;
use crate::services::SimulatedDesktop;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for desktop action backends that can run in different modes
#[async_trait::async_trait]
pub trait DesktopActions: Send + Sync {
    /// Поднять приложение и сделать его фронтальным
    async fn activate(&self, target: &DockTarget) -> Result<()>;

    /// Скрыть все окна приложения
    async fn hide(&self, target: &DockTarget) -> Result<()>;

    /// Показать все окна приложения (App Exposé)
    async fn expose(&self, target: &DockTarget) -> Result<()>;
}

/// Действия поверх wmctrl и xdotool
pub struct WmctrlActions {
    expose_command: String,
}

impl WmctrlActions {
    pub fn new(expose_command: String) -> Self {
        info!("Инициализация WmctrlActions");
        Self { expose_command }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| DockError::Internal(format!("{} не найден: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DockError::Internal(format!(
                "{} вернул ошибку: {}",
                program,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DesktopActions for WmctrlActions {
    async fn activate(&self, target: &DockTarget) -> Result<()> {
        debug!("Активация {} через wmctrl", target.wm_class);
        self.run("wmctrl", &["-x", "-a", &target.wm_class])
    }

    async fn hide(&self, target: &DockTarget) -> Result<()> {
        debug!("Скрытие {} через xdotool", target.wm_class);
        self.run(
            "xdotool",
            &["search", "--class", &target.wm_class, "windowminimize", "%@"],
        )
    }

    async fn expose(&self, target: &DockTarget) -> Result<()> {
        if let Some((program, args)) = build_expose_invocation(&self.expose_command, &target.wm_class)
        {
            debug!("App Exposé через внешнюю команду {}", program);
            let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
            return self.run(&program, &args);
        }

        // Без внешней команды Exposé приближаем поднятием окон приложения
        debug!("Команда App Exposé не задана; поднимаем окна {}", target.wm_class);
        self.run("wmctrl", &["-x", "-a", &target.wm_class])
    }
}

/// Разбирает команду Exposé из конфига; "{class}" заменяется на wm_class
pub(crate) fn build_expose_invocation(
    command: &str,
    wm_class: &str,
) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?.to_string();
    let args = parts
        .map(|arg| {
            if arg == "{class}" {
                wm_class.to_string()
            } else {
                arg.to_string()
            }
        })
        .collect();
    Some((program, args))
}

/// Действия над симулируемым рабочим столом
pub struct SimulatedActions {
    desktop: Arc<SimulatedDesktop>,
}

impl SimulatedActions {
    pub fn new(desktop: Arc<SimulatedDesktop>) -> Self {
        info!("Инициализация SimulatedActions");
        Self { desktop }
    }
}

#[async_trait::async_trait]
impl DesktopActions for SimulatedActions {
    async fn activate(&self, target: &DockTarget) -> Result<()> {
        debug!("Симуляция активации {}", target.wm_class);
        self.desktop.activate(&target.wm_class);
        Ok(())
    }

    async fn hide(&self, target: &DockTarget) -> Result<()> {
        debug!("Симуляция скрытия {}", target.wm_class);
        self.desktop.hide(&target.wm_class);
        Ok(())
    }

    async fn expose(&self, target: &DockTarget) -> Result<()> {
        // Exposé показывает окна, не меняя фронтальное приложение
        debug!("Симуляция App Exposé для {}", target.wm_class);
        Ok(())
    }
}

/// Factory function to create an appropriate action backend based on the dry_run flag
pub fn create_desktop_actions(
    config: Arc<Config>,
    desktop: Option<Arc<SimulatedDesktop>>,
    dry_run: bool,
) -> Result<Box<dyn DesktopActions>> {
    if dry_run || config.actions.backend == "simulated" {
        let desktop = desktop.unwrap_or_else(|| {
            let desktop = Arc::new(SimulatedDesktop::new());
            desktop.seed(&config.dock.static_items);
            desktop
        });
        Ok(Box::new(SimulatedActions::new(desktop)))
    } else {
        Ok(Box::new(WmctrlActions::new(
            config.actions.expose_command.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(wm_class: &str) -> DockTarget {
        DockTarget::new(format!("app.{}", wm_class), wm_class.to_string())
    }

    #[tokio::test]
    async fn test_simulated_activate_and_hide() {
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.register("firefox", false, Some(1));
        let actions = SimulatedActions::new(desktop.clone());

        actions.activate(&target("firefox")).await.unwrap();
        assert!(desktop.is_frontmost("firefox"));
        assert!(desktop.is_visible("firefox"));

        actions.hide(&target("firefox")).await.unwrap();
        assert!(!desktop.is_frontmost("firefox"));
        assert!(!desktop.is_visible("firefox"));
    }

    #[tokio::test]
    async fn test_simulated_expose_keeps_state() {
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.register("kitty", true, Some(3));
        desktop.set_frontmost(Some("kitty"));
        let actions = SimulatedActions::new(desktop.clone());

        actions.expose(&target("kitty")).await.unwrap();
        assert!(desktop.is_frontmost("kitty"));
        assert_eq!(desktop.window_count("kitty"), Some(3));
    }

    #[test]
    fn test_build_expose_invocation() {
        let (program, args) = build_expose_invocation("skippy-xd --toggle", "firefox").unwrap();
        assert_eq!(program, "skippy-xd");
        assert_eq!(args, vec!["--toggle"]);

        let (program, args) =
            build_expose_invocation("my-expose --class {class} --all", "kitty").unwrap();
        assert_eq!(program, "my-expose");
        assert_eq!(args, vec!["--class", "kitty", "--all"]);

        assert!(build_expose_invocation("", "kitty").is_none());
        assert!(build_expose_invocation("   ", "kitty").is_none());
    }
}
