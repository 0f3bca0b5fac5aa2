//! Property-based invariant tests for the sankey layout.
//!
//! For any table of positive weights:
//!
//! 1. Block sizes plus gaps fill the span on every side of every stage pair.
//! 2. Blocks on one side never overlap.
//! 3. The flows through a block add up to the block, so cursors end at its
//!    bottom.
//! 4. Scaling every weight by a constant changes nothing.
//! 5. Laying out the same input twice gives the same marks.
//! 6. Every stage title and every block label is drawn exactly once.

use std::collections::BTreeMap;

use proptest::prelude::*;
use sankey_canvas::components::sankey::layout::{
	FlowCursor, StageBlocks, place_flow, scale_factor,
};
use sankey_canvas::components::sankey::{
	BlockOrder, FlowRow, FlowTable, LayoutConfig, Mark, SankeyOptions, TabularSource,
	build_scene,
};

const EPS: f64 = 1e-9;

// ── Helpers ─────────────────────────────────────────────────────────────

fn table_strategy() -> impl Strategy<Value = FlowTable> {
	(2usize..=4)
		.prop_flat_map(|stages| {
			prop::collection::vec(
				(0.1f64..100.0, prop::collection::vec(0u8..4, stages)),
				1..30,
			)
		})
		.prop_map(|rows| {
			let rows = rows
				.into_iter()
				.map(|(weight, labels)| {
					FlowRow::new(weight, labels.into_iter().map(|l| ((b'a' + l) as char).to_string()))
				})
				.collect();
			FlowTable::from_rows(rows).unwrap()
		})
}

fn order_strategy() -> impl Strategy<Value = BlockOrder> {
	prop_oneof![Just(BlockOrder::FirstOccurrence), Just(BlockOrder::Sorted)]
}

fn stages(table: &FlowTable, order: BlockOrder) -> Vec<StageBlocks> {
	let layout = LayoutConfig::default();
	let factor = scale_factor(layout.gap_fraction, table.weight_sum());
	(0..table.stage_count() - 1)
		.map(|phase| StageBlocks::aggregate(table, phase, factor, &layout, order))
		.collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Width conservation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn sizes_and_gaps_fill_the_span(table in table_strategy(), order in order_strategy()) {
		let gaps = LayoutConfig::default().gap_fraction;
		for stage in stages(&table, order) {
			for side in [&stage.left, &stage.right] {
				let sizes: f64 = side.iter().map(|b| b.size).sum();
				if side.len() > 1 {
					let gap_space = gaps / (side.len() - 1) as f64 * (side.len() - 1) as f64;
					prop_assert!((sizes + gap_space - 1.0).abs() < EPS, "sizes {sizes}");
					let last = side.last().unwrap();
					prop_assert!((last.end() - 1.0).abs() < EPS);
				} else {
					// A lone block keeps the gap space empty.
					prop_assert!((sizes - (1.0 - gaps)).abs() < EPS, "sizes {sizes}");
				}
			}
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Non-overlap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn blocks_do_not_overlap(table in table_strategy(), order in order_strategy()) {
		for stage in stages(&table, order) {
			for side in [&stage.left, &stage.right] {
				prop_assert_eq!(side[0].start, 0.0);
				for pair in side.windows(2) {
					prop_assert!(pair[0].end() <= pair[1].start + EPS, "{:?}", pair);
				}
			}
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Flow conservation per block
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn cursors_end_at_block_bottoms(table in table_strategy(), sort in any::<bool>()) {
		let layout = LayoutConfig::default();
		let factor = scale_factor(layout.gap_fraction, table.weight_sum());
		for stage in stages(&table, BlockOrder::FirstOccurrence) {
			let phase = stage.phase;
			let mut cursor = FlowCursor::new(&stage);
			for row in stage.flow_order(&table, sort) {
				let left = stage.left_position(table.label(row, phase + 1)).unwrap();
				let right = stage.right_position(table.label(row, phase + 2)).unwrap();
				let before = cursor.offsets(left, right);
				place_flow(phase, &mut cursor, left, right, table.weight(row) * factor, &layout);
				let after = cursor.offsets(left, right);
				prop_assert!(after.0 >= before.0 && after.1 >= before.1);
				prop_assert!(after.0 <= stage.left[left].end() + EPS);
				prop_assert!(after.1 <= stage.right[right].end() + EPS);
			}
			for (i, block) in stage.left.iter().enumerate() {
				prop_assert!((cursor.left(i) - block.end()).abs() < EPS);
			}
			for (i, block) in stage.right.iter().enumerate() {
				prop_assert!((cursor.right(i) - block.end()).abs() < EPS);
			}
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Scale invariance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn scaling_weights_keeps_the_layout(table in table_strategy(), c in 0.01f64..1000.0) {
		let unscaled = stages(&table, BlockOrder::FirstOccurrence);
		let scaled = stages(&table.scaled(c), BlockOrder::FirstOccurrence);
		prop_assert_eq!(unscaled.len(), scaled.len());
		for (a, b) in unscaled.iter().zip(&scaled) {
			for (x, y) in a.left.iter().chain(&a.right).zip(b.left.iter().chain(&b.right)) {
				prop_assert_eq!(&x.label, &y.label);
				prop_assert!((x.size - y.size).abs() < EPS);
				prop_assert!((x.start - y.start).abs() < EPS);
			}
		}
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn layout_is_deterministic(table in table_strategy(), sort in any::<bool>()) {
		let options = SankeyOptions::default().sort_flows_by_node_position(sort);
		let a = build_scene(&table, &options).unwrap();
		let b = build_scene(&table, &options).unwrap();
		prop_assert_eq!(a.marks(), b.marks());
	}
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Single label placement
// ═════════════════════════════════════════════════════════════════════════

proptest! {
	#[test]
	fn every_label_and_title_drawn_once(table in table_strategy()) {
		let scene = build_scene(&table, &SankeyOptions::default()).unwrap();

		let mut expected: BTreeMap<String, usize> = BTreeMap::new();
		for column in 1..table.column_count() {
			*expected.entry(table.title(column).to_string()).or_default() += 1;
			for (label, _) in table.group_and_sum_by(column) {
				*expected.entry(label).or_default() += 1;
			}
		}

		let mut drawn: BTreeMap<String, usize> = BTreeMap::new();
		for mark in scene.marks() {
			if let Mark::Text(text) = mark {
				*drawn.entry(text.text.clone()).or_default() += 1;
			}
		}
		prop_assert_eq!(drawn, expected);
	}
}
