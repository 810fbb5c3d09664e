use crate::debug_if_enabled;
use crate::events::{CompletedClick, IconRef, PointerEvent, PointerPhase};
use crate::services::icon_resolver::{IconResolution, IconResolver};
use crate::services::policy_resolver::PolicyResolver;
use crate::services::trace_log::TraceLog;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

struct PendingDown {
    at: Instant,
}

/// Классификатор кликов: спаривает события down и up в завершённые клики.
/// Ключ спаривания - слот, разрешённый на момент самого события; события
/// вне иконок спариваются под выделенным пустым ключом, поэтому полный
/// down→up по мёртвому слоту тоже завершается кликом.
///
/// Незавершённые down не истекают со временем, а up без парного down
/// отбрасывается. Цель завершённого клика берётся из разрешения в момент
/// события up.
pub struct ClickClassifier {
    resolver: Box<dyn IconResolver>,
    policy_resolver: Arc<PolicyResolver>,
    trace: Arc<TraceLog>,
    pending: HashMap<Option<u32>, PendingDown>,
}

impl ClickClassifier {
    pub fn new(
        resolver: Box<dyn IconResolver>,
        policy_resolver: Arc<PolicyResolver>,
        trace: Arc<TraceLog>,
    ) -> Self {
        Self {
            resolver,
            policy_resolver,
            trace,
            pending: HashMap::new(),
        }
    }

    /// Обрабатывает одно сырое событие указателя. События приходят в
    /// порядке возникновения; каждая пара down→up даёт ровно один клик.
    pub async fn handle_pointer_event(&mut self, event: PointerEvent) {
        let resolution = self.resolve(&event.icon).await;
        let bundle = resolution
            .target
            .as_ref()
            .map(|t| t.bundle_id.as_str())
            .unwrap_or("unresolved");
        self.trace
            .append(format!("phase={} bundle={}", event.phase, bundle));

        match event.phase {
            PointerPhase::Down => {
                let pending = PendingDown {
                    at: event.timestamp,
                };
                if let Some(prev) = self.pending.insert(resolution.slot, pending) {
                    debug_if_enabled!(
                        "Повторный down на слоте {:?} заменил незавершённый ({}ms назад)",
                        resolution.slot,
                        prev.at.elapsed().as_millis()
                    );
                }
            }
            PointerPhase::Up => {
                if self.pending.remove(&resolution.slot).is_none() {
                    debug_if_enabled!(
                        "up без парного down на слоте {:?}, событие отброшено",
                        resolution.slot
                    );
                    return;
                }

                let click = CompletedClick {
                    slot: resolution.slot,
                    target: resolution.target,
                    timestamp: event.timestamp,
                };
                debug_if_enabled!("Завершён {}", click);
                self.policy_resolver.handle_click(&click).await;
            }
        }
    }

    async fn resolve(&self, icon: &IconRef) -> IconResolution {
        match icon {
            IconRef::Slot(slot) => self.resolver.resolve_slot(*slot).await,
            IconRef::Point { x, y } => self.resolver.resolve(*x, *y).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClickAction, Config, FirstClickBehavior, Policy};
    use crate::events::DockItem;
    use crate::services::desktop_actions::SimulatedActions;
    use crate::services::dispatcher::ActionDispatcher;
    use crate::services::icon_resolver::StaticIconResolver;
    use crate::services::state_tracker::SimulatedStateTracker;
    use crate::services::SimulatedDesktop;
    use parking_lot::Mutex;

    fn item(slot: u32, x: i32, bundle_id: &str, wm_class: &str) -> DockItem {
        DockItem {
            slot,
            x,
            y: 1040,
            width: 56,
            height: 40,
            bundle_id: bundle_id.to_string(),
            wm_class: wm_class.to_string(),
        }
    }

    fn test_policy(click_action: ClickAction, click_gate: bool) -> Policy {
        let mut policy = Config::default().policy();
        policy.first_click_behavior = FirstClickBehavior::ActivateApp;
        policy.click_action = click_action;
        policy.click_app_expose_requires_multiple_windows = click_gate;
        policy
    }

    struct Fixture {
        classifier: ClickClassifier,
        trace: Arc<TraceLog>,
        desktop: Arc<SimulatedDesktop>,
    }

    /// Стенд с инертными действиями: состоянием управляет сам тест
    fn fixture(policy: Policy, items: Vec<DockItem>) -> Fixture {
        let desktop = Arc::new(SimulatedDesktop::new());
        let trace = Arc::new(TraceLog::new());
        let tracker = Arc::new(SimulatedStateTracker::new(desktop.clone()));
        let actions = Box::new(SimulatedActions::new(Arc::new(SimulatedDesktop::new())));
        let dispatcher = Arc::new(ActionDispatcher::new(actions, trace.clone()));
        let policy_resolver = Arc::new(PolicyResolver::new(policy, tracker, dispatcher));
        let classifier = ClickClassifier::new(
            Box::new(StaticIconResolver::new(items)),
            policy_resolver,
            trace.clone(),
        );
        Fixture {
            classifier,
            trace,
            desktop,
        }
    }

    fn two_apps() -> Vec<DockItem> {
        vec![item(0, 0, "org.a", "a"), item(1, 56, "org.b", "b")]
    }

    #[tokio::test]
    async fn test_full_click_produces_one_decision() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());
        f.desktop.register("a", false, Some(1));

        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
            .await;

        assert_eq!(
            f.trace.snapshot(),
            vec![
                "phase=down bundle=org.a".to_string(),
                "phase=up bundle=org.a".to_string(),
                "firstClick activate executing for org.a".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_rapid_clicks_are_never_lost() {
        let mut f = fixture(test_policy(ClickAction::AppExpose, false), two_apps());
        f.desktop.register("a", true, Some(1));
        f.desktop.set_frontmost(Some("a"));

        for _ in 0..3 {
            f.classifier
                .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
                .await;
            f.classifier
                .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
                .await;
        }

        assert_eq!(f.trace.count_matching("phase=up bundle=org.a"), 3);
        assert_eq!(f.trace.count_matching("Triggering App Exposé for org.a"), 3);
    }

    #[tokio::test]
    async fn test_unmatched_up_is_discarded() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());
        f.desktop.register("a", false, Some(1));

        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
            .await;

        assert_eq!(f.trace.snapshot(), vec!["phase=up bundle=org.a".to_string()]);
    }

    #[tokio::test]
    async fn test_second_down_replaces_pending() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());
        f.desktop.register("a", false, Some(1));

        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
            .await;

        assert_eq!(f.trace.count_matching("firstClick activate executing"), 1);
        assert_eq!(f.trace.len(), 4);
    }

    #[tokio::test]
    async fn test_interleaved_clicks_attributed_independently() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());
        f.desktop.register("a", false, Some(1));
        f.desktop.register("b", false, Some(1));

        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(1)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(1)))
            .await;

        assert_eq!(f.trace.count_matching("firstClick activate executing for org.a"), 1);
        assert_eq!(f.trace.count_matching("firstClick activate executing for org.b"), 1);
    }

    #[tokio::test]
    async fn test_unresolved_point_click() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());

        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Point { x: 900, y: 10 }))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Point { x: 900, y: 10 }))
            .await;

        assert_eq!(
            f.trace.snapshot(),
            vec![
                "phase=down bundle=unresolved".to_string(),
                "phase=up bundle=unresolved".to_string(),
                "click unresolved at slot=?".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_click_on_empty_slot_keeps_slot_number() {
        let mut f = fixture(test_policy(ClickAction::HideApp, true), two_apps());

        f.classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(9)))
            .await;
        f.classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(9)))
            .await;

        assert_eq!(
            f.trace.last().as_deref(),
            Some("click unresolved at slot=9")
        );
    }

    /// Резолвер с подменяемой таблицей иконок
    struct SwappableResolver {
        items: Arc<Mutex<Vec<DockItem>>>,
    }

    #[async_trait::async_trait]
    impl IconResolver for SwappableResolver {
        async fn resolve(&self, x: i32, y: i32) -> IconResolution {
            let items = self.items.lock();
            for item in items.iter() {
                if item.contains(x, y) {
                    return IconResolution {
                        slot: Some(item.slot),
                        target: Some(item.target()),
                    };
                }
            }
            IconResolution::unresolved()
        }

        async fn resolve_slot(&self, slot: u32) -> IconResolution {
            let items = self.items.lock();
            let target = items
                .iter()
                .find(|item| item.slot == slot)
                .map(|item| item.target());
            IconResolution {
                slot: Some(slot),
                target,
            }
        }
    }

    #[tokio::test]
    async fn test_attribution_follows_layout_at_up_time() {
        // Раскладка дока меняется между down и up: цель клика берётся
        // по состоянию на момент up
        let desktop = Arc::new(SimulatedDesktop::new());
        desktop.register("a", false, Some(1));
        desktop.register("b", false, Some(1));
        let trace = Arc::new(TraceLog::new());
        let tracker = Arc::new(SimulatedStateTracker::new(desktop.clone()));
        let actions = Box::new(SimulatedActions::new(Arc::new(SimulatedDesktop::new())));
        let dispatcher = Arc::new(ActionDispatcher::new(actions, trace.clone()));
        let policy_resolver = Arc::new(PolicyResolver::new(
            test_policy(ClickAction::HideApp, true),
            tracker,
            dispatcher,
        ));

        let items = Arc::new(Mutex::new(vec![item(0, 0, "org.a", "a")]));
        let resolver = Box::new(SwappableResolver {
            items: items.clone(),
        });
        let mut classifier = ClickClassifier::new(resolver, policy_resolver, trace.clone());

        classifier
            .handle_pointer_event(PointerEvent::down(IconRef::Slot(0)))
            .await;

        // Подмена содержимого слота 0 между down и up
        *items.lock() = vec![item(0, 0, "org.b", "b")];

        classifier
            .handle_pointer_event(PointerEvent::up(IconRef::Slot(0)))
            .await;

        assert_eq!(
            trace.last().as_deref(),
            Some("firstClick activate executing for org.b")
        );
        assert_eq!(trace.count_matching("phase=down bundle=org.a"), 1);
        assert_eq!(trace.count_matching("phase=up bundle=org.b"), 1);
    }
}
