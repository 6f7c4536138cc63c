//! topology-canvas: interactive explorer for hierarchical resource graphs.
//!
//! This crate provides a WASM canvas component that renders a collapsible
//! resource topology with its event chains, and relays every interaction
//! (selection, hover highlighting, collapse toggles, environment tagging)
//! to the embedding application through narrow host interfaces.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::graph_canvas::{GraphCanvas, GraphData, GraphSnapshot};
use components::graph_canvas::ResourceId;
use components::graph_canvas::host::{
	Action, ActionSink, EnvironmentApi, EnvironmentFuture, Navigator, Notifier, TelemetryEvent,
	TelemetrySink,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("topology-canvas: logging initialized");
}

/// Load the graph snapshot from a script element with id="graph-data".
/// Expected format: JSON matching [`GraphData`].
fn load_snapshot() -> Option<GraphSnapshot> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"topology-canvas: loaded {} nodes, {} edges",
				data.nodes.len(),
				data.edges.len()
			);
			Some(data.into())
		}
		Err(e) => {
			warn!("topology-canvas: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Console-backed host used by the standalone page: actions and telemetry go
/// to the log, environment tagging succeeds without a backend.
struct ConsoleHost;

impl ActionSink for ConsoleHost {
	fn dispatch(&self, action: Action) {
		info!("action: {action:?}");
	}
}

impl TelemetrySink for ConsoleHost {
	fn record(&self, event: TelemetryEvent) {
		debug!("telemetry: {} kind={:?}", event.name, event.kind);
	}
}

impl Navigator for ConsoleHost {
	fn open_issues_view(&self) {
		info!("navigate: issues view");
	}
}

impl Notifier for ConsoleHost {
	fn confirm(&self, message: &str) {
		info!("notice: {message}");
	}

	fn error(&self, message: &str) {
		warn!("error notice: {message}");
	}
}

impl EnvironmentApi for ConsoleHost {
	fn tag(&self, resource: &ResourceId, name: &str) -> EnvironmentFuture {
		info!("tagging {resource} with '{name}'");
		Box::pin(async { Ok(()) })
	}

	fn untag(&self, resource: &ResourceId, name: &str) -> EnvironmentFuture {
		info!("untagging '{name}' from {resource}");
		Box::pin(async { Ok(()) })
	}
}

/// Main application component.
/// Loads the snapshot from the DOM and renders the topology canvas.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let snapshot = load_snapshot().unwrap_or_default();
	let snapshot_signal = Signal::derive(move || snapshot.clone());
	let host = Rc::new(ConsoleHost);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Topology Explorer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<GraphCanvas
				snapshot=snapshot_signal
				actions=host.clone()
				telemetry=host.clone()
				navigator=host.clone()
				notifier=host.clone()
				environments=host
			/>
			<div class="graph-overlay">
				<h1>"Topology Explorer"</h1>
				<p class="subtitle">
					"Hover an event edge to see its chain. Click resources to select them."
				</p>
			</div>
		</div>
	}
}
