use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::settings_bridge::{is_settings_url, SettingsTrigger};
use services::{
    create_click_listener, create_desktop_actions, create_icon_resolver, create_state_tracker,
    ActionDispatcher, ClickClassifier, ClickPipeline, PolicyResolver, SettingsBridge,
    SimulatedDesktop, TraceLog,
};

#[derive(Parser, Debug)]
#[command(name = "dockclick-rust")]
#[command(about = "Движок решений по кликам на иконках дока")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "dockclick.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает секцию [logging])
    #[arg(long)]
    log_level: Option<String>,

    /// Открыть окно настроек при запуске
    #[arg(long)]
    settings: bool,

    /// URL-запрос, например dockclick://settings
    #[arg(value_name = "URL")]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Конфигурация загружается до инициализации логирования:
    // формат и фильтр берутся из секции [logging]
    let config = Arc::new(Config::load(&args.config)?);
    init_tracing(args.log_level.as_deref(), &config)?;

    info!("Запуск Dockclick Rust v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Запросы окна настроек обрабатываются до запуска движка кликов
    let settings = SettingsBridge::new(config.settings.command.clone());
    if args.settings {
        settings.request_open(SettingsTrigger::LaunchArgument);
    }
    if let Some(url) = args.url.as_deref() {
        if is_settings_url(url) {
            settings.request_open(SettingsTrigger::UrlRequest);
        } else {
            warn!("Неизвестный URL-запрос: {}", url);
        }
    }

    // Проверка прав доступа (для чтения /dev/input)
    if !args.dry_run {
        utils::permissions::check_permissions()?;
    }

    // Единый симулируемый рабочий стол: трекер состояния читает то,
    // что симулятор действий изменяет
    let simulated = if args.dry_run
        || config.state.backend == "simulated"
        || config.actions.backend == "simulated"
    {
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.seed(&config.dock.static_items);
        Some(desktop)
    } else {
        None
    };

    // Инициализация компонентов
    let trace = Arc::new(TraceLog::new());
    let tracker = create_state_tracker(config.clone(), simulated.clone(), args.dry_run)?;
    let actions = create_desktop_actions(config.clone(), simulated.clone(), args.dry_run)?;
    let dispatcher = Arc::new(ActionDispatcher::new(actions, trace.clone()));
    let policy_resolver = Arc::new(PolicyResolver::new(
        config.policy(),
        tracker,
        dispatcher.clone(),
    ));
    let resolver = create_icon_resolver(config.clone(), args.dry_run).await?;
    let classifier = ClickClassifier::new(resolver, policy_resolver, trace.clone());

    let (tx, rx) = mpsc::channel(1024);
    let pipeline = ClickPipeline::new(rx, classifier);
    let click_listener = create_click_listener(config.clone(), tx, args.dry_run)?;

    info!("Все компоненты инициализированы");

    // Запуск конвейера и слушателя параллельно
    let pipeline_handle = tokio::spawn(pipeline.run());
    let listener_handle = tokio::spawn(async move {
        if let Err(e) = click_listener.run().await {
            error!("Ошибка в ClickListener: {}", e);
        }
    });

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Останавливаем слушатель; вместе с его задачей закрывается
    // отправитель канала, и конвейер дорабатывает очередь до конца
    listener_handle.abort();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = listener_handle.await;
        let _ = pipeline_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Конвейер кликов завершил работу корректно"),
        Err(_) => warn!("Таймаут при завершении конвейера кликов"),
    }

    // Дорабатываем очередь действий
    dispatcher
        .shutdown(tokio::time::Duration::from_secs(5))
        .await;

    info!("Журнал решений: {} записей", trace.len());
    info!("Dockclick Rust завершил работу");
    Ok(())
}

fn init_tracing(cli_level: Option<&str>, config: &Config) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // Приоритет: RUST_LOG, затем флаг CLI, затем секция [logging]
    let directives = match cli_level {
        Some(level) => level.to_string(),
        None if config.logging.filter.is_empty() => config.logging.level.clone(),
        None => format!("{},{}", config.logging.level, config.logging.filter),
    };

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directives))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }

    Ok(())
}
