//! Leptos component orchestrating the canvas interaction engine.
//!
//! The component owns the ephemeral interaction state (hover set, gesture
//! classifier, viewport controller) in a mount-scoped context and reads the
//! host-owned [`GraphSnapshot`] reactively. Pointer events feed the gesture
//! classifier, hover feeds the highlight propagator, selection goes through
//! the [`SelectionBridge`], and a `requestAnimationFrame` loop advances
//! viewport transitions and redraws.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, MouseEventInit, Window,
};

use super::gesture::{GestureClassifier, PointerPhase};
use super::highlight::{self, HoverState};
use super::host::{
	Action, ActionSink, ActivationSurface, EnvironmentApi, Navigator, Notifier, TelemetryEvent,
	TelemetrySink,
};
use super::render::{self, CanvasHit};
use super::selection::SelectionBridge;
use super::style::CanvasStyle;
use super::types::{GraphSnapshot, LayoutState, Point, SelectionChange};
use super::viewport::ViewportController;

/// Transition length requested by the fit-view control.
const FIT_VIEW_TRANSITION_MS: f64 = 400.0;

/// Mount-scoped interaction state. Separate mounts never share it.
struct CanvasContext {
	gesture: GestureClassifier,
	hover: HoverState,
	viewport: ViewportController,
	style: CanvasStyle,
	width: f64,
	height: f64,
}

/// Latches the first laid-out cycle. Returns `true` exactly once, on the
/// first call where `laid_out` holds; later relayouts never re-fire.
fn take_initial_render(reported: &Cell<bool>, laid_out: bool) -> bool {
	if laid_out && !reported.get() {
		reported.set(true);
		true
	} else {
		false
	}
}

/// DOM-backed hit-test + synthetic-activation capability.
///
/// Re-dispatching a real `click` lets every ordinary click handler on the
/// page fire even though the canvas classified the gesture as a drag.
struct DomActivationSurface;

impl ActivationSurface for DomActivationSurface {
	fn activate_at(&self, position: Point) -> bool {
		let Some(document) = web_sys::window().and_then(|w| w.document()) else {
			return false;
		};
		let Some(element) = document.element_from_point(position.x as f32, position.y as f32)
		else {
			return false;
		};
		let init = MouseEventInit::new();
		init.set_bubbles(true);
		init.set_cancelable(true);
		init.set_client_x(position.x as i32);
		init.set_client_y(position.y as i32);
		let Ok(event) = MouseEvent::new_with_mouse_event_init_dict("click", &init) else {
			return false;
		};
		element.dispatch_event(&event).unwrap_or(false)
	}
}

/// Renders the interactive topology graph on a canvas element.
///
/// The host supplies the snapshot reactively and receives every interaction
/// through the sink/capability props; the component keeps no state of its
/// own beyond hover, gesture and viewport transitions.
#[component]
pub fn GraphCanvas(
	#[prop(into)] snapshot: Signal<GraphSnapshot>,
	actions: Rc<dyn ActionSink>,
	telemetry: Rc<dyn TelemetrySink>,
	navigator: Rc<dyn Navigator>,
	notifier: Rc<dyn Notifier>,
	environments: Rc<dyn EnvironmentApi>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<CanvasContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let bridge = Rc::new(SelectionBridge::new(
		actions.clone(),
		telemetry.clone(),
		navigator,
		notifier,
		environments,
	));

	// Ephemeral hover/gesture/viewport state dies with the mount.
	let initial_render_reported = Rc::new(Cell::new(false));

	let (context_init, animate_init) = (context.clone(), animate.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		*context_init.borrow_mut() = Some(CanvasContext {
			gesture: GestureClassifier::new(),
			hover: HoverState::new(),
			viewport: ViewportController::new(),
			style: CanvasStyle::default(),
			width: w,
			height: h,
		});

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let mut last_frame_ms = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now_ms = js_sys::Date::now();
			let dt_ms = (now_ms - last_frame_ms).max(0.0);
			last_frame_ms = now_ms;

			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let snap = snapshot.get_untracked();
				c.viewport.apply(snap.viewport);
				c.viewport.tick(dt_ms);
				// Hover and edge map come from the same snapshot, so a
				// removed edge can never light up within this cycle.
				let edges = highlight::highlight(c.hover.hovered(), &snap.edges, &snap.chain_links);
				render::render(
					&snap,
					&edges,
					&ctx,
					c.viewport.transform(),
					c.width,
					c.height,
					&c.style,
				);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// The one-shot first-layout notification. Later relayouts from
	// expand/collapse keep layout_state at LaidOut and never re-fire.
	let (actions_layout, telemetry_layout) = (actions.clone(), telemetry.clone());
	let reported = initial_render_reported.clone();
	Effect::new(move |_| {
		let laid_out = snapshot.with(|s| s.layout_state == LayoutState::LaidOut);
		if take_initial_render(&reported, laid_out) {
			actions_layout.dispatch(Action::InitialRenderCompleted);
			telemetry_layout.record(TelemetryEvent::named("initial-render-completed"));
		}
	});

	let canvas_point = move |ev: &MouseEvent| -> Option<Point> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some(Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};
	let client_point =
		|ev: &MouseEvent| Point::new(ev.client_x() as f64, ev.client_y() as f64);

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.gesture
				.on_pointer_phase(PointerPhase::Start, client_point(&ev), &DomActivationSurface);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas_pos) = canvas_point(&ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.gesture
				.on_pointer_phase(PointerPhase::Move, client_point(&ev), &DomActivationSurface);

			let transform = c.viewport.transform();
			let graph_pos = Point::new(
				(canvas_pos.x - transform.x) / transform.zoom,
				(canvas_pos.y - transform.y) / transform.zoom,
			);
			let snap = snapshot.get_untracked();
			let hovered_edge = match render::hit_test(&snap, &c.style, graph_pos) {
				Some(CanvasHit::Edge(id)) => Some(id),
				_ => None,
			};
			let stale: Vec<String> = c
				.hover
				.hovered()
				.iter()
				.filter(|id| hovered_edge.as_deref() != Some(id.as_str()))
				.cloned()
				.collect();
			for id in stale {
				c.hover.leave(&id);
			}
			if let Some(id) = hovered_edge {
				c.hover.enter(id);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.gesture
				.on_pointer_phase(PointerPhase::End, client_point(&ev), &DomActivationSurface);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.hover.clear();
		}
	};

	// Activation handler. Only synthesized clicks arrive here semantically:
	// the surface reports every native press as a pan, so a trusted click
	// means the browser slipped one through and the classifier already made
	// the call; those are ignored to avoid double activation.
	let context_click = context.clone();
	let (actions_click, telemetry_click, bridge_click) =
		(actions.clone(), telemetry.clone(), bridge.clone());
	let on_click = move |ev: MouseEvent| {
		if ev.is_trusted() {
			return;
		}
		let Some(canvas_pos) = canvas_point(&ev) else {
			return;
		};
		let hit = {
			let borrowed = context_click.borrow();
			let Some(ref c) = *borrowed else {
				return;
			};
			let transform = c.viewport.transform();
			let graph_pos = Point::new(
				(canvas_pos.x - transform.x) / transform.zoom,
				(canvas_pos.y - transform.y) / transform.zoom,
			);
			render::hit_test(&snapshot.get_untracked(), &c.style, graph_pos)
		};
		let snap = snapshot.get_untracked();
		match hit {
			Some(CanvasHit::CollapseToggle(id)) => {
				telemetry_click.record(TelemetryEvent::with_kind(
					"node-collapse-toggled",
					id.terminal_kind(),
				));
				actions_click.dispatch(Action::ToggleNodeCollapsed(id));
			}
			Some(CanvasHit::IssueBadge(id)) => {
				if let Some(node) = snap.nodes.get(&id) {
					bridge_click.on_issue_activated(node);
				}
			}
			Some(CanvasHit::Node(id)) => {
				let selected = snap.selected_node_ids.contains(&id);
				bridge_click.on_node_selection_change(&[SelectionChange {
					id,
					selected: !selected,
				}]);
			}
			Some(CanvasHit::EnvironmentChip(id, index)) => {
				let tag = snap
					.nodes
					.get(&id)
					.and_then(|node| node.environments.get(index))
					.cloned();
				match tag {
					Some(tag) if tag.is_inherited() => {
						// Inherited tags are read-only on this node.
						debug!("ignoring chip click, '{}' is inherited", tag.name);
					}
					Some(tag) => {
						spawn_local(bridge_click.untag_environment(id, tag.name, |_| {}));
					}
					None => {}
				}
			}
			Some(CanvasHit::Edge(id)) => {
				let selected = snap.selected_edge_ids.contains(&id);
				bridge_click.on_edge_selection_change(
					&[SelectionChange {
						id,
						selected: !selected,
					}],
					&snap.edges,
				);
			}
			None => {}
		}
	};

	let context_zi = context.clone();
	let telemetry_zi = telemetry.clone();
	let on_zoom_in = move |_| {
		if let Some(ref mut c) = *context_zi.borrow_mut() {
			c.viewport.zoom_in();
		}
		telemetry_zi.record(TelemetryEvent::named("zoom-in"));
	};
	let context_zo = context.clone();
	let telemetry_zo = telemetry.clone();
	let on_zoom_out = move |_| {
		if let Some(ref mut c) = *context_zo.borrow_mut() {
			c.viewport.zoom_out();
		}
		telemetry_zo.record(TelemetryEvent::named("zoom-out"));
	};
	let (actions_fit, telemetry_fit) = (actions.clone(), telemetry.clone());
	let on_fit_view = move |_| {
		actions_fit.dispatch(Action::FitView {
			duration_ms: FIT_VIEW_TRANSITION_MS,
		});
		telemetry_fit.record(TelemetryEvent::named("fit-view"));
	};
	let (actions_ea, telemetry_ea) = (actions.clone(), telemetry.clone());
	let on_expand_all = move |_| {
		actions_ea.dispatch(Action::ExpandAll);
		telemetry_ea.record(TelemetryEvent::named("expand-all"));
	};
	let (actions_ca, telemetry_ca) = (actions.clone(), telemetry.clone());
	let on_collapse_all = move |_| {
		actions_ca.dispatch(Action::CollapseAll);
		telemetry_ca.record(TelemetryEvent::named("collapse-all"));
	};

	view! {
		<div class="graph-canvas-wrap">
			<canvas
				node_ref=canvas_ref
				class="graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				style="display: block;"
			/>
			<div class="graph-controls">
				<button on:click=on_zoom_in title="Zoom in">"+"</button>
				<button on:click=on_zoom_out title="Zoom out">"\u{2212}"</button>
				<button on:click=on_fit_view title="Fit view">"\u{26F6}"</button>
				<button on:click=on_expand_all title="Expand all">"\u{25BC}"</button>
				<button on:click=on_collapse_all title="Collapse all">"\u{25B2}"</button>
			</div>
		</div>
	}
}
