use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl DockError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(DockError::DeviceNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, DockError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! dock_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::DockError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::DockError::Permission(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::DockError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::DockError::Internal(format!($($arg)*))
    };
}
