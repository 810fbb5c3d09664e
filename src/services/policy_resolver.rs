use crate::config::{ClickAction, FirstClickBehavior, Policy};
use crate::events::{
    CompletedClick, Decision, DecisionAction, DecisionBranch, DockTarget, WindowCount,
};
use crate::services::dispatcher::ActionDispatcher;
use crate::services::state_tracker::StateTracker;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Резолвер политики: превращает завершённый клик в решение.
/// Состояние приложения запрашивается у трекера в момент решения;
/// никакой памяти о предыдущих кликах здесь нет.
pub struct PolicyResolver {
    policy: RwLock<Policy>,
    tracker: Arc<dyn StateTracker>,
    dispatcher: Arc<ActionDispatcher>,
}

impl PolicyResolver {
    pub fn new(
        policy: Policy,
        tracker: Arc<dyn StateTracker>,
        dispatcher: Arc<ActionDispatcher>,
    ) -> Self {
        Self {
            policy: RwLock::new(policy),
            tracker,
            dispatcher,
        }
    }

    /// Замена политики на лету; действует начиная со следующего клика
    pub fn set_policy(&self, policy: Policy) {
        debug!("Политика обновлена: {:?}", policy);
        *self.policy.write() = policy;
    }

    /// Принимает решение по клику и передаёт его диспетчеру
    pub async fn handle_click(&self, click: &CompletedClick) -> Decision {
        let decision = self.decide(click).await;
        self.dispatcher.dispatch(&decision);
        decision
    }

    async fn decide(&self, click: &CompletedClick) -> Decision {
        let target = match &click.target {
            Some(target) => target,
            None => {
                debug!("Клик без цели: {}", click);
                return Decision::unresolved(click.slot);
            }
        };

        let policy = *self.policy.read();
        let frontmost = self.tracker.is_frontmost(target).await;

        if !frontmost {
            self.decide_first_click(&policy, target, click.slot).await
        } else {
            self.decide_active_click(&policy, target, click.slot).await
        }
    }

    async fn decide_first_click(
        &self,
        policy: &Policy,
        target: &DockTarget,
        slot: Option<u32>,
    ) -> Decision {
        match policy.first_click_behavior {
            FirstClickBehavior::ActivateApp => Decision {
                action: DecisionAction::Activate,
                branch: DecisionBranch::FirstClick,
                target: Some(target.clone()),
                slot,
                gate_skipped: false,
            },
            FirstClickBehavior::AppExpose => {
                let windows = self
                    .windows_for_gate(policy.first_click_app_expose_requires_multiple_windows, target)
                    .await;
                if policy.should_run_first_click_app_expose(windows) {
                    Decision {
                        action: DecisionAction::Expose,
                        branch: DecisionBranch::FirstClick,
                        target: Some(target.clone()),
                        slot,
                        gate_skipped: false,
                    }
                } else {
                    Decision {
                        action: DecisionAction::None,
                        branch: DecisionBranch::FirstClick,
                        target: Some(target.clone()),
                        slot,
                        gate_skipped: true,
                    }
                }
            }
        }
    }

    async fn decide_active_click(
        &self,
        policy: &Policy,
        target: &DockTarget,
        slot: Option<u32>,
    ) -> Decision {
        match policy.click_action {
            ClickAction::HideApp => Decision {
                action: DecisionAction::Hide,
                branch: DecisionBranch::Click,
                target: Some(target.clone()),
                slot,
                gate_skipped: false,
            },
            ClickAction::AppExpose => {
                let windows = self
                    .windows_for_gate(policy.click_app_expose_requires_multiple_windows, target)
                    .await;
                if policy.should_run_click_app_expose(windows) {
                    Decision {
                        action: DecisionAction::Expose,
                        branch: DecisionBranch::Click,
                        target: Some(target.clone()),
                        slot,
                        gate_skipped: false,
                    }
                } else {
                    Decision {
                        action: DecisionAction::None,
                        branch: DecisionBranch::Click,
                        target: Some(target.clone()),
                        slot,
                        gate_skipped: true,
                    }
                }
            }
            ClickAction::None => Decision {
                action: DecisionAction::None,
                branch: DecisionBranch::Click,
                target: Some(target.clone()),
                slot,
                gate_skipped: false,
            },
        }
    }

    /// Число окон запрашивается только когда гейт реально включён
    async fn windows_for_gate(&self, gate_enabled: bool, target: &DockTarget) -> WindowCount {
        if gate_enabled {
            self.tracker.window_count(target).await
        } else {
            WindowCount::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::desktop_actions::SimulatedActions;
    use crate::services::state_tracker::SimulatedStateTracker;
    use crate::services::trace_log::TraceLog;
    use crate::services::SimulatedDesktop;
    use std::time::Duration;

    struct Fixture {
        resolver: PolicyResolver,
        dispatcher: Arc<ActionDispatcher>,
        trace: Arc<TraceLog>,
        desktop: Arc<SimulatedDesktop>,
    }

    fn fixture(policy: Policy) -> Fixture {
        let desktop = Arc::new(SimulatedDesktop::new());
        let trace = Arc::new(TraceLog::new());
        let tracker = Arc::new(SimulatedStateTracker::new(desktop.clone()));
        let actions = Box::new(SimulatedActions::new(desktop.clone()));
        let dispatcher = Arc::new(ActionDispatcher::new(actions, trace.clone()));
        let resolver = PolicyResolver::new(policy, tracker, dispatcher.clone());
        Fixture {
            resolver,
            dispatcher,
            trace,
            desktop,
        }
    }

    /// Действия уходят в отдельный пустой стол: тест управляет состоянием
    /// сам, без гонки с воркером диспетчера
    fn fixture_with_inert_actions(policy: Policy) -> Fixture {
        let desktop = Arc::new(SimulatedDesktop::new());
        let trace = Arc::new(TraceLog::new());
        let tracker = Arc::new(SimulatedStateTracker::new(desktop.clone()));
        let actions = Box::new(SimulatedActions::new(Arc::new(SimulatedDesktop::new())));
        let dispatcher = Arc::new(ActionDispatcher::new(actions, trace.clone()));
        let resolver = PolicyResolver::new(policy, tracker, dispatcher.clone());
        Fixture {
            resolver,
            dispatcher,
            trace,
            desktop,
        }
    }

    fn policy(
        first_click: FirstClickBehavior,
        click: ClickAction,
        first_gate: bool,
        click_gate: bool,
    ) -> Policy {
        let mut policy = Config::default().policy();
        policy.first_click_behavior = first_click;
        policy.click_action = click;
        policy.first_click_app_expose_requires_multiple_windows = first_gate;
        policy.click_app_expose_requires_multiple_windows = click_gate;
        policy
    }

    fn click(bundle: &str) -> CompletedClick {
        CompletedClick::new(
            Some(0),
            Some(DockTarget::new(bundle.to_string(), "app".to_string())),
        )
    }

    #[tokio::test]
    async fn test_first_click_activate() {
        let f = fixture(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", false, Some(1));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::Activate);
        assert_eq!(decision.branch, DecisionBranch::FirstClick);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("firstClick activate executing for org.x")
        );

        // После выполнения действия приложение становится фронтальным
        f.dispatcher.shutdown(Duration::from_secs(1)).await;
        assert!(f.desktop.is_frontmost("app"));
    }

    #[tokio::test]
    async fn test_first_click_expose_gated_by_single_window() {
        let f = fixture(policy(
            FirstClickBehavior::AppExpose,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", false, Some(1));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.gate_skipped);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("firstClick appExpose skipped by shouldRunFirstClickAppExpose for org.x")
        );
    }

    #[tokio::test]
    async fn test_first_click_expose_runs_with_two_windows() {
        let f = fixture(policy(
            FirstClickBehavior::AppExpose,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", false, Some(2));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::Expose);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("firstClick appExpose executing for org.x")
        );
    }

    #[tokio::test]
    async fn test_first_click_expose_runs_with_unknown_count() {
        let f = fixture(policy(
            FirstClickBehavior::AppExpose,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", false, None);

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::Expose);
        assert!(!decision.gate_skipped);
    }

    #[tokio::test]
    async fn test_first_click_expose_gate_disabled() {
        let f = fixture(policy(
            FirstClickBehavior::AppExpose,
            ClickAction::HideApp,
            false,
            true,
        ));
        f.desktop.register("app", false, Some(1));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::Expose);
    }

    #[tokio::test]
    async fn test_active_click_hides_app() {
        let f = fixture(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", true, Some(1));
        f.desktop.set_frontmost(Some("app"));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::Hide);
        assert_eq!(decision.branch, DecisionBranch::Click);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("click hideApp executing for org.x")
        );

        f.dispatcher.shutdown(Duration::from_secs(1)).await;
        assert!(!f.desktop.is_visible("app"));
        assert!(!f.desktop.is_frontmost("app"));
    }

    #[tokio::test]
    async fn test_active_click_expose_matrix() {
        let f = fixture(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::AppExpose,
            true,
            true,
        ));
        f.desktop.register("app", true, Some(1));
        f.desktop.set_frontmost(Some("app"));

        let decision = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(decision.action, DecisionAction::None);
        assert!(decision.gate_skipped);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("click appExpose skipped for org.x")
        );

        f.desktop.set_windows("app", Some(4));
        let decision = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(decision.action, DecisionAction::Expose);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("Triggering App Exposé for org.x")
        );

        f.desktop.set_windows("app", None);
        let decision = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(decision.action, DecisionAction::Expose);
    }

    #[tokio::test]
    async fn test_active_click_none_is_ignored() {
        let f = fixture(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::None,
            true,
            true,
        ));
        f.desktop.register("app", true, Some(3));
        f.desktop.set_frontmost(Some("app"));

        let decision = f.resolver.handle_click(&click("org.x")).await;

        assert_eq!(decision.action, DecisionAction::None);
        assert!(!decision.gate_skipped);
        assert_eq!(f.trace.last().as_deref(), Some("click ignored for org.x"));
    }

    #[tokio::test]
    async fn test_unresolved_click() {
        let f = fixture(Config::default().policy());

        let decision = f
            .resolver
            .handle_click(&CompletedClick::new(Some(9), None))
            .await;

        assert_eq!(decision, Decision::unresolved(Some(9)));
        assert_eq!(
            f.trace.last().as_deref(),
            Some("click unresolved at slot=9")
        );

        let decision = f.resolver.handle_click(&CompletedClick::new(None, None)).await;
        assert_eq!(decision.slot, None);
        assert_eq!(
            f.trace.last().as_deref(),
            Some("click unresolved at slot=?")
        );
    }

    #[tokio::test]
    async fn test_policy_change_applies_to_next_click() {
        let f = fixture_with_inert_actions(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", true, Some(2));
        f.desktop.set_frontmost(Some("app"));

        let decision = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(decision.action, DecisionAction::Hide);

        f.desktop.activate("app");
        f.resolver.set_policy(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::AppExpose,
            true,
            true,
        ));

        let decision = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(decision.action, DecisionAction::Expose);
    }

    #[tokio::test]
    async fn test_each_click_requeries_state() {
        // Один и тот же клик даёт разные решения при смене состояния
        let f = fixture_with_inert_actions(policy(
            FirstClickBehavior::ActivateApp,
            ClickAction::HideApp,
            true,
            true,
        ));
        f.desktop.register("app", false, Some(1));

        let first = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(first.action, DecisionAction::Activate);

        f.desktop.activate("app");
        let second = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(second.action, DecisionAction::Hide);

        f.desktop.hide("app");
        let third = f.resolver.handle_click(&click("org.x")).await;
        assert_eq!(third.action, DecisionAction::Activate);
    }
}
