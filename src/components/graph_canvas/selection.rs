//! Bridging canvas interactions to host actions and telemetry.
//!
//! Three independently selectable concepts pass through here: resources
//! (nodes), event groups (edges) and issues (reachable only through a node's
//! issue indicator). Every transition produces exactly one action and one
//! telemetry event; entities absent from a change batch are untouched.

use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use log::warn;

use super::host::{
	Action, ActionSink, EnvironmentApi, Navigator, Notifier, TelemetryEvent, TelemetrySink,
};
use super::types::{GraphEdge, GraphNode, ResourceId, SelectionChange};

/// Translates node/edge/issue interactions into host action dispatch and
/// telemetry, including the async environment tagging operation.
pub struct SelectionBridge {
	actions: Rc<dyn ActionSink>,
	telemetry: Rc<dyn TelemetrySink>,
	navigator: Rc<dyn Navigator>,
	notifier: Rc<dyn Notifier>,
	environments: Rc<dyn EnvironmentApi>,
}

impl SelectionBridge {
	pub fn new(
		actions: Rc<dyn ActionSink>,
		telemetry: Rc<dyn TelemetrySink>,
		navigator: Rc<dyn Navigator>,
		notifier: Rc<dyn Notifier>,
		environments: Rc<dyn EnvironmentApi>,
	) -> Self {
		Self {
			actions,
			telemetry,
			navigator,
			notifier,
			environments,
		}
	}

	/// Relay a node selection change batch. Telemetry is tagged with each
	/// resource's terminal segment kind.
	pub fn on_node_selection_change(&self, changes: &[SelectionChange<ResourceId>]) {
		for change in changes {
			let kind = change.id.terminal_kind().to_string();
			if change.selected {
				self.actions.dispatch(Action::SelectResource(change.id.clone()));
				self.telemetry
					.record(TelemetryEvent::with_kind("resource-selected", kind));
			} else {
				self.actions
					.dispatch(Action::DeselectResource(change.id.clone()));
				self.telemetry
					.record(TelemetryEvent::with_kind("resource-deselected", kind));
			}
		}
	}

	/// Relay an edge selection change batch. An edge aggregates many events;
	/// its first event's kind stands in for the whole group in telemetry.
	pub fn on_edge_selection_change(
		&self,
		changes: &[SelectionChange<String>],
		edges: &HashMap<String, GraphEdge>,
	) {
		for change in changes {
			let kind = edges
				.get(&change.id)
				.and_then(|edge| edge.events.first())
				.map(|event| event.kind.clone())
				.unwrap_or_else(|| "unknown".to_string());
			if change.selected {
				self.actions.dispatch(Action::SelectEdge(change.id.clone()));
				self.telemetry
					.record(TelemetryEvent::with_kind("edge-selected", kind));
			} else {
				self.actions.dispatch(Action::DeselectEdge(change.id.clone()));
				self.telemetry
					.record(TelemetryEvent::with_kind("edge-deselected", kind));
			}
		}
	}

	/// The node's issue indicator was activated: bring up the issues view
	/// and select every issue on the node, in the node's issue-id order.
	pub fn on_issue_activated(&self, node: &GraphNode) {
		self.navigator.open_issues_view();
		for issue_id in &node.issue_ids {
			self.actions.dispatch(Action::SelectIssue(issue_id.clone()));
		}
		self.telemetry.record(TelemetryEvent::with_kind(
			"issues-opened",
			node.id.terminal_kind(),
		));
	}

	/// Tag `resource` with environment `name`.
	///
	/// Returns the future to spawn; it may complete after arbitrary further
	/// state changes, so everything it needs travels with it — the explicit
	/// resource id, never captured render state. Concurrent calls for the
	/// same resource are an accepted race: the last completion wins the
	/// notification (see DESIGN.md).
	pub fn tag_environment(
		&self,
		resource: ResourceId,
		name: String,
		on_done: impl FnOnce(Result<(), String>) + 'static,
	) -> impl Future<Output = ()> + 'static {
		self.environment_op(
			self.environments.tag(&resource, &name),
			resource,
			name,
			EnvOutcome {
				success_event: "environment-tagged",
				failure_event: "environment-tag-failed",
				verb: "added to",
			},
			on_done,
		)
	}

	/// Remove environment `name` from `resource`; mirror of
	/// [`Self::tag_environment`].
	pub fn untag_environment(
		&self,
		resource: ResourceId,
		name: String,
		on_done: impl FnOnce(Result<(), String>) + 'static,
	) -> impl Future<Output = ()> + 'static {
		self.environment_op(
			self.environments.untag(&resource, &name),
			resource,
			name,
			EnvOutcome {
				success_event: "environment-untagged",
				failure_event: "environment-untag-failed",
				verb: "removed from",
			},
			on_done,
		)
	}

	fn environment_op(
		&self,
		operation: impl Future<Output = Result<(), String>> + 'static,
		resource: ResourceId,
		name: String,
		outcome: EnvOutcome,
		on_done: impl FnOnce(Result<(), String>) + 'static,
	) -> impl Future<Output = ()> + 'static {
		let telemetry = Rc::clone(&self.telemetry);
		let notifier = Rc::clone(&self.notifier);
		async move {
			let result = operation.await;
			match &result {
				Ok(()) => {
					notifier.confirm(&format!(
						"Environment '{name}' {} {resource}",
						outcome.verb
					));
					telemetry.record(TelemetryEvent::with_kind(
						outcome.success_event,
						resource.terminal_kind(),
					));
				}
				Err(message) => {
					warn!("environment '{name}' operation on {resource} failed: {message}");
					notifier.error(&format!(
						"Environment '{name}' could not be {} {resource}: {message}",
						outcome.verb
					));
					telemetry.record(TelemetryEvent::with_kind(
						outcome.failure_event,
						resource.terminal_kind(),
					));
				}
			}
			on_done(result);
		}
	}
}

struct EnvOutcome {
	success_event: &'static str,
	failure_event: &'static str,
	verb: &'static str,
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::pin::pin;
	use std::task::{Context, Poll, Waker};

	use super::super::host::EnvironmentFuture;
	use super::super::types::{EdgeLabel, Point, ResourceEvent, resource_id};
	use super::*;

	#[derive(Default)]
	struct RecordingActions(RefCell<Vec<Action>>);

	impl ActionSink for RecordingActions {
		fn dispatch(&self, action: Action) {
			self.0.borrow_mut().push(action);
		}
	}

	#[derive(Default)]
	struct RecordingTelemetry(RefCell<Vec<TelemetryEvent>>);

	impl TelemetrySink for RecordingTelemetry {
		fn record(&self, event: TelemetryEvent) {
			self.0.borrow_mut().push(event);
		}
	}

	#[derive(Default)]
	struct RecordingNavigator(Cell<usize>);

	impl Navigator for RecordingNavigator {
		fn open_issues_view(&self) {
			self.0.set(self.0.get() + 1);
		}
	}

	#[derive(Default)]
	struct RecordingNotifier {
		confirmations: RefCell<Vec<String>>,
		errors: RefCell<Vec<String>>,
	}

	impl Notifier for RecordingNotifier {
		fn confirm(&self, message: &str) {
			self.confirmations.borrow_mut().push(message.to_string());
		}

		fn error(&self, message: &str) {
			self.errors.borrow_mut().push(message.to_string());
		}
	}

	/// Environment API double resolving immediately with a canned result.
	struct StubEnvironments {
		result: Result<(), String>,
	}

	impl EnvironmentApi for StubEnvironments {
		fn tag(&self, _resource: &ResourceId, _name: &str) -> EnvironmentFuture {
			let result = self.result.clone();
			Box::pin(async move { result })
		}

		fn untag(&self, _resource: &ResourceId, _name: &str) -> EnvironmentFuture {
			let result = self.result.clone();
			Box::pin(async move { result })
		}
	}

	struct Harness {
		actions: Rc<RecordingActions>,
		telemetry: Rc<RecordingTelemetry>,
		navigator: Rc<RecordingNavigator>,
		notifier: Rc<RecordingNotifier>,
		bridge: SelectionBridge,
	}

	fn harness(env_result: Result<(), String>) -> Harness {
		let actions = Rc::new(RecordingActions::default());
		let telemetry = Rc::new(RecordingTelemetry::default());
		let navigator = Rc::new(RecordingNavigator::default());
		let notifier = Rc::new(RecordingNotifier::default());
		let bridge = SelectionBridge::new(
			actions.clone(),
			telemetry.clone(),
			navigator.clone(),
			notifier.clone(),
			Rc::new(StubEnvironments { result: env_result }),
		);
		Harness {
			actions,
			telemetry,
			navigator,
			notifier,
			bridge,
		}
	}

	/// Drives a future that is expected to complete without yielding.
	fn drive(future: impl Future<Output = ()>) {
		let mut future = pin!(future);
		let mut cx = Context::from_waker(Waker::noop());
		assert!(matches!(future.as_mut().poll(&mut cx), Poll::Ready(())));
	}

	fn node(id: ResourceId, issue_ids: &[&str]) -> GraphNode {
		GraphNode {
			id,
			num_children: 0,
			collapsed: false,
			environments: Vec::new(),
			issue_ids: issue_ids.iter().map(|s| (*s).to_string()).collect(),
			absolute_position: Point::default(),
			original_parent_id: None,
			original_dimensions: None,
			first_seen_at: None,
			last_seen_at: None,
			highlighted: false,
		}
	}

	#[test]
	fn select_then_deselect_emits_one_action_per_transition() {
		let h = harness(Ok(()));
		let id = resource_id(&[("cluster", "c"), ("workload", "a")]);
		h.bridge.on_node_selection_change(&[SelectionChange {
			id: id.clone(),
			selected: true,
		}]);
		h.bridge.on_node_selection_change(&[SelectionChange {
			id: id.clone(),
			selected: false,
		}]);
		assert_eq!(
			*h.actions.0.borrow(),
			vec![
				Action::SelectResource(id.clone()),
				Action::DeselectResource(id)
			]
		);
		let telemetry = h.telemetry.0.borrow();
		assert_eq!(telemetry.len(), 2);
		assert_eq!(telemetry[0].name, "resource-selected");
		assert_eq!(telemetry[0].kind.as_deref(), Some("workload"));
		assert_eq!(telemetry[1].name, "resource-deselected");
	}

	#[test]
	fn edge_telemetry_uses_first_event_kind() {
		let h = harness(Ok(()));
		let edge = GraphEdge {
			id: "e1".into(),
			original_source_id: resource_id(&[("workload", "a")]),
			original_target_id: resource_id(&[("workload", "b")]),
			label: EdgeLabel::default(),
			section: None,
			events: vec![
				ResourceEvent {
					id: resource_id(&[("event", "ev1")]),
					kind: "deployment".into(),
					summary: None,
				},
				ResourceEvent {
					id: resource_id(&[("event", "ev2")]),
					kind: "restart".into(),
					summary: None,
				},
			],
			event_chain_hovered: false,
		};
		let edges = HashMap::from([("e1".to_string(), edge)]);
		h.bridge.on_edge_selection_change(
			&[SelectionChange {
				id: "e1".to_string(),
				selected: true,
			}],
			&edges,
		);
		assert_eq!(
			*h.actions.0.borrow(),
			vec![Action::SelectEdge("e1".into())]
		);
		assert_eq!(
			h.telemetry.0.borrow()[0].kind.as_deref(),
			Some("deployment")
		);
	}

	#[test]
	fn unknown_edge_still_relays_with_unknown_kind() {
		let h = harness(Ok(()));
		h.bridge.on_edge_selection_change(
			&[SelectionChange {
				id: "gone".to_string(),
				selected: false,
			}],
			&HashMap::new(),
		);
		assert_eq!(
			*h.actions.0.borrow(),
			vec![Action::DeselectEdge("gone".into())]
		);
		assert_eq!(h.telemetry.0.borrow()[0].kind.as_deref(), Some("unknown"));
	}

	#[test]
	fn issue_activation_navigates_then_selects_in_node_order() {
		let h = harness(Ok(()));
		let node = node(resource_id(&[("workload", "w")]), &["i-2", "i-1", "i-3"]);
		h.bridge.on_issue_activated(&node);
		assert_eq!(h.navigator.0.get(), 1);
		assert_eq!(
			*h.actions.0.borrow(),
			vec![
				Action::SelectIssue("i-2".into()),
				Action::SelectIssue("i-1".into()),
				Action::SelectIssue("i-3".into()),
			]
		);
	}

	#[test]
	fn successful_tagging_confirms_and_reports() {
		let h = harness(Ok(()));
		let done = Rc::new(Cell::new(false));
		let done_flag = done.clone();
		drive(h.bridge.tag_environment(
			resource_id(&[("workload", "w")]),
			"prod".into(),
			move |result| {
				assert!(result.is_ok());
				done_flag.set(true);
			},
		));
		assert!(done.get());
		assert_eq!(h.notifier.confirmations.borrow().len(), 1);
		assert!(h.notifier.errors.borrow().is_empty());
		assert_eq!(h.telemetry.0.borrow()[0].name, "environment-tagged");
	}

	#[test]
	fn failed_untagging_surfaces_the_message_and_still_calls_back() {
		let h = harness(Err("stale revision".into()));
		let done = Rc::new(Cell::new(false));
		let done_flag = done.clone();
		drive(h.bridge.untag_environment(
			resource_id(&[("workload", "w")]),
			"prod".into(),
			move |result| {
				assert_eq!(result, Err("stale revision".into()));
				done_flag.set(true);
			},
		));
		assert!(done.get());
		assert!(h.notifier.confirmations.borrow().is_empty());
		let errors = h.notifier.errors.borrow();
		assert_eq!(errors.len(), 1);
		assert!(errors[0].contains("stale revision"));
		assert_eq!(
			h.telemetry.0.borrow()[0].name,
			"environment-untag-failed"
		);
	}
}
