use leptos::prelude::*;
use log::warn;

use crate::components::sankey::{FlowRow, FlowTable, SankeyCanvas, SankeyOptions, SankeySettings};

const SOURCES: &[&str] = &["Coal", "Gas", "Nuclear", "Solar", "Wind"];
const CARRIERS: &[&str] = &["Electricity", "Heat", "Fuel"];
const SECTORS: &[&str] = &["Homes", "Industry", "Transport"];
const OUTCOMES: &[&str] = &["Useful", "Lost"];

const SETTINGS: &str = r##"{
	"color_ramp": "jet_r",
	"label_font_size": 14,
	"title_font_size": 18,
	"node_sizes": "{label} {size:.0f}",
	"sort_flows_by_node_position": true
}"##;

/// Generate sample flows through four stages (deterministic).
fn generate_sample_data(n: usize) -> FlowTable {
	let pick = |options: &[&'static str], seed: usize| {
		options[(rand_simple(seed) * options.len() as f64) as usize % options.len()]
	};
	let rows: Vec<FlowRow> = (0..n)
		.map(|i| {
			let weight = 1.0 + (rand_simple(i * 7) * 20.0).round();
			FlowRow::new(
				weight,
				[
					pick(SOURCES, i),
					pick(CARRIERS, i * 3 + 1),
					pick(SECTORS, i * 5 + 2),
					pick(OUTCOMES, i * 11 + 3),
				],
			)
		})
		.collect();
	let titles = ["TWh", "Source", "Carrier", "Sector", "Outcome"]
		.map(String::from)
		.to_vec();
	FlowTable::new(titles, rows).unwrap_or_default()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn sample_options() -> SankeyOptions {
	SankeySettings::from_json(SETTINGS).unwrap_or_else(|err| {
		warn!("falling back to default options: {err}");
		SankeyOptions::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	// Create flow data signal
	let flow_data = Signal::derive(move || generate_sample_data(60));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<SankeyCanvas data=flow_data options=sample_options() fullscreen=true />
				<div class="graph-overlay">
					<h1>"Energy Flows"</h1>
					<p class="subtitle">"Sample flows from source to outcome, sized by weight."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::{NodeSizeAnnotation, TabularSource, build_scene};

	#[test]
	fn test_sample_data_lays_out() {
		let table = generate_sample_data(60);
		assert_eq!(table.row_count(), 60);
		assert_eq!(table.stage_count(), 4);
		let scene = build_scene(&table, &sample_options()).unwrap();
		assert_eq!(scene.phases(), 3);
	}

	#[test]
	fn test_sample_settings_parse() {
		let options = SankeySettings::from_json(SETTINGS).unwrap();
		assert!(matches!(options.node_sizes, NodeSizeAnnotation::Custom(_)));
		assert_eq!(options.node_sizes.annotate("Gas", 41.0), "Gas 41");
	}
}
