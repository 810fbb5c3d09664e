pub mod click_classifier;
pub mod click_listener;
pub mod click_pipeline;
pub mod desktop_actions;
pub mod dispatcher;
pub mod icon_resolver;
pub mod policy_resolver;
pub mod settings_bridge;
pub mod simulated_desktop;
pub mod state_tracker;
pub mod trace_log;

pub use click_classifier::ClickClassifier;
pub use click_listener::create_click_listener;
pub use click_pipeline::ClickPipeline;
pub use desktop_actions::create_desktop_actions;
pub use dispatcher::ActionDispatcher;
pub use icon_resolver::create_icon_resolver;
pub use policy_resolver::PolicyResolver;
pub use settings_bridge::SettingsBridge;
pub use simulated_desktop::SimulatedDesktop;
pub use state_tracker::create_state_tracker;
pub use trace_log::TraceLog;
