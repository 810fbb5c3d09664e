use crate::config::Config;
use crate::error::{DockError, Result};
use crate::events::{DockItem, DockTarget};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zbus::Connection;

/// Строка таблицы иконок в D-Bus ответе:
/// (slot, x, y, width, height, bundle_id, wm_class)
type DockItemRow = (u32, i32, i32, u32, u32, String, String);

const DOCK_ITEMS_METHOD: &str = "GetItems";

/// Результат привязки точки клика к иконке дока.
/// Слот может быть известен и при неразрешённой цели, если у иконки
/// нет связанного приложения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResolution {
    pub slot: Option<u32>,
    pub target: Option<DockTarget>,
}

impl IconResolution {
    pub fn unresolved() -> Self {
        Self {
            slot: None,
            target: None,
        }
    }
}

/// Trait for icon resolvers that map a screen point or a slot to a dock icon
#[async_trait::async_trait]
pub trait IconResolver: Send + Sync {
    /// Привязка точки к иконке на момент вызова. Никогда не кэширует:
    /// каждое событие запрашивает раскладку дока заново.
    async fn resolve(&self, x: i32, y: i32) -> IconResolution;

    /// Привязка номера слота к иконке на момент вызова.
    /// Слот известен из самого события, поэтому сохраняется и тогда,
    /// когда за ним сейчас нет приложения.
    async fn resolve_slot(&self, slot: u32) -> IconResolution;
}

/// Резолвер поверх D-Bus сервиса дока. Раскладка запрашивается на каждое
/// событие; при недоступности сервиса используется статическая таблица
/// из конфига, если она задана.
pub struct DbusIconResolver {
    connection: Connection,
    bus_name: String,
    object_path: String,
    interface: String,
    timeout: Duration,
    fallback_items: Vec<DockItem>,
}

impl DbusIconResolver {
    pub async fn new(config: &Config) -> Result<Self> {
        info!(
            "Подключение к сервису дока {} через D-Bus",
            config.dock.bus_name
        );

        let connection = Connection::session().await.map_err(DockError::DBus)?;

        Ok(Self {
            connection,
            bus_name: config.dock.bus_name.clone(),
            object_path: config.dock.object_path.clone(),
            interface: config.dock.interface.clone(),
            timeout: Duration::from_millis(config.state.query_timeout_ms),
            fallback_items: config.dock.static_items.clone(),
        })
    }

    async fn fetch_items(&self) -> Result<Vec<DockItem>> {
        let call = self.connection.call_method(
            Some(self.bus_name.as_str()),
            self.object_path.as_str(),
            Some(self.interface.as_str()),
            DOCK_ITEMS_METHOD,
            &(),
        );

        let reply = match tokio::time::timeout(self.timeout, call).await {
            Ok(reply) => reply.map_err(DockError::DBus)?,
            Err(_) => {
                return Err(DockError::ServiceUnavailable(format!(
                    "Сервис дока не ответил за {:?}",
                    self.timeout
                )))
            }
        };

        let rows: Vec<DockItemRow> = reply.body().deserialize().map_err(|e| {
            DockError::Internal(format!("Неверный формат таблицы иконок: {}", e))
        })?;

        Ok(rows.into_iter().map(row_to_item).collect())
    }

    async fn current_items(&self) -> Option<Vec<DockItem>> {
        match self.fetch_items().await {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Не удалось получить таблицу иконок из D-Bus: {}", e);
                if self.fallback_items.is_empty() {
                    return None;
                }
                debug!(
                    "Используем статическую таблицу иконок ({} элементов)",
                    self.fallback_items.len()
                );
                Some(self.fallback_items.clone())
            }
        }
    }
}

#[async_trait::async_trait]
impl IconResolver for DbusIconResolver {
    async fn resolve(&self, x: i32, y: i32) -> IconResolution {
        match self.current_items().await {
            Some(items) => resolve_point(&items, x, y),
            None => IconResolution::unresolved(),
        }
    }

    async fn resolve_slot(&self, slot: u32) -> IconResolution {
        match self.current_items().await {
            Some(items) => resolve_slot_in(&items, slot),
            None => IconResolution {
                slot: Some(slot),
                target: None,
            },
        }
    }
}

/// Резолвер по статической таблице иконок из конфига
pub struct StaticIconResolver {
    items: Vec<DockItem>,
}

impl StaticIconResolver {
    pub fn new(items: Vec<DockItem>) -> Self {
        info!(
            "Инициализация StaticIconResolver с {} иконками",
            items.len()
        );
        Self { items }
    }
}

#[async_trait::async_trait]
impl IconResolver for StaticIconResolver {
    async fn resolve(&self, x: i32, y: i32) -> IconResolution {
        resolve_point(&self.items, x, y)
    }

    async fn resolve_slot(&self, slot: u32) -> IconResolution {
        resolve_slot_in(&self.items, slot)
    }
}

/// Factory function to create an appropriate icon resolver based on the dry_run flag
pub async fn create_icon_resolver(
    config: Arc<Config>,
    dry_run: bool,
) -> Result<Box<dyn IconResolver>> {
    if dry_run {
        return Ok(Box::new(StaticIconResolver::new(
            config.dock.static_items.clone(),
        )));
    }

    match config.dock.source.as_str() {
        "static" => Ok(Box::new(StaticIconResolver::new(
            config.dock.static_items.clone(),
        ))),
        "dbus" => Ok(Box::new(DbusIconResolver::new(&config).await?)),
        _ => match DbusIconResolver::new(&config).await {
            Ok(resolver) => Ok(Box::new(resolver)),
            Err(e) => {
                warn!(
                    "D-Bus сервис дока недоступен: {}. Используем статическую таблицу",
                    e
                );
                Ok(Box::new(StaticIconResolver::new(
                    config.dock.static_items.clone(),
                )))
            }
        },
    }
}

fn row_to_item(row: DockItemRow) -> DockItem {
    let (slot, x, y, width, height, bundle_id, wm_class) = row;
    DockItem {
        slot,
        x,
        y,
        width,
        height,
        bundle_id,
        wm_class,
    }
}

/// Первая иконка, содержащая точку. Цель разрешается только при
/// непустом bundle_id.
fn resolve_point(items: &[DockItem], x: i32, y: i32) -> IconResolution {
    for item in items {
        if item.contains(x, y) {
            let target = if item.bundle_id.is_empty() {
                None
            } else {
                Some(item.target())
            };
            return IconResolution {
                slot: Some(item.slot),
                target,
            };
        }
    }
    IconResolution::unresolved()
}

/// Иконка по номеру слота; слот из события сохраняется и без иконки
fn resolve_slot_in(items: &[DockItem], slot: u32) -> IconResolution {
    let target = items
        .iter()
        .find(|item| item.slot == slot)
        .filter(|item| !item.bundle_id.is_empty())
        .map(|item| item.target());
    IconResolution {
        slot: Some(slot),
        target,
    }
}
