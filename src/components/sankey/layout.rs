//! Block aggregation and flow stacking for one stage pair.
//!
//! Coordinates here are "offsets": 0 is the top of the drawable span and
//! offsets grow downwards, so a block occupies `start..start + size`. The
//! flip to upward-growing diagram y happens when ribbons and rectangles are
//! built.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use super::config::LayoutConfig;
use super::geometry::{RibbonPath, build_ribbon_path};
use super::types::TabularSource;

/// Order in which the blocks of one side are stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrder {
	/// Order of first appearance in the data.
	#[default]
	FirstOccurrence,
	/// Label order, numbers compared as numbers and placed before text.
	Sorted,
}

/// A category block on one side of a stage pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
	/// Category label.
	pub label: String,
	/// Total weight of the rows in this category.
	pub weight: f64,
	/// Drawn height, `weight * factor`.
	pub size: f64,
	/// Offset of the block's top from the top of the span.
	pub start: f64,
}

impl Block {
	/// Offset just past the block.
	pub fn end(&self) -> f64 {
		self.start + self.size
	}
}

/// Scale from weights to drawn sizes, shared by every stage pair so that the
/// total drawn width is the same everywhere.
pub fn scale_factor(gap_fraction: f64, total_weight: f64) -> f64 {
	(1.0 - gap_fraction) / total_weight
}

fn compare_labels(a: &str, b: &str) -> Ordering {
	match (a.parse::<f64>(), b.parse::<f64>()) {
		(Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
		(Ok(_), Err(_)) => Ordering::Less,
		(Err(_), Ok(_)) => Ordering::Greater,
		(Err(_), Err(_)) => a.cmp(b),
	}
}

/// Turns per-label totals into stacked blocks.
///
/// Labels whose total is not positive get no block and no space. The
/// `gap_fraction` of the span is split evenly between neighbouring blocks;
/// a lone block gets no gap.
pub fn aggregate_side(
	totals: Vec<(String, f64)>,
	factor: f64,
	gap_fraction: f64,
	order: BlockOrder,
) -> Vec<Block> {
	let mut totals: Vec<(String, f64)> = totals
		.into_iter()
		.filter(|(label, total)| {
			let keep = *total > 0.0;
			if !keep {
				debug!("dropping category {label:?} with total weight {total}");
			}
			keep
		})
		.collect();
	if order == BlockOrder::Sorted {
		totals.sort_by(|a, b| compare_labels(&a.0, &b.0));
	}

	let gap = gap_fraction / (totals.len().saturating_sub(1)).max(1) as f64;
	let mut start = 0.0;
	totals
		.into_iter()
		.map(|(label, weight)| {
			let size = weight * factor;
			let block = Block {
				label,
				weight,
				size,
				start,
			};
			start += size + gap;
			block
		})
		.collect()
}

/// Blocks on both sides of one stage pair.
#[derive(Clone, Debug, PartialEq)]
pub struct StageBlocks {
	/// Index of the stage pair, 0 for the leftmost.
	pub phase: usize,
	/// Blocks of the left stage, top to bottom.
	pub left: Vec<Block>,
	/// Blocks of the right stage, top to bottom.
	pub right: Vec<Block>,
	left_index: HashMap<String, usize>,
	right_index: HashMap<String, usize>,
}

fn index_of(blocks: &[Block]) -> HashMap<String, usize> {
	blocks
		.iter()
		.enumerate()
		.map(|(i, b)| (b.label.clone(), i))
		.collect()
}

impl StageBlocks {
	/// Aggregates the columns of stage pair `phase` (category columns
	/// `phase + 1` and `phase + 2`).
	pub fn aggregate<S: TabularSource + ?Sized>(
		source: &S,
		phase: usize,
		factor: f64,
		layout: &LayoutConfig,
		order: BlockOrder,
	) -> Self {
		let left = aggregate_side(
			source.group_and_sum_by(phase + 1),
			factor,
			layout.gap_fraction,
			order,
		);
		let right = aggregate_side(
			source.group_and_sum_by(phase + 2),
			factor,
			layout.gap_fraction,
			order,
		);
		debug!(
			"stage pair {phase}: {} left blocks, {} right blocks",
			left.len(),
			right.len()
		);
		Self {
			phase,
			left_index: index_of(&left),
			right_index: index_of(&right),
			left,
			right,
		}
	}

	/// Stacking position of `label` among the left blocks.
	pub fn left_position(&self, label: &str) -> Option<usize> {
		self.left_index.get(label).copied()
	}

	/// Stacking position of `label` among the right blocks.
	pub fn right_position(&self, label: &str) -> Option<usize> {
		self.right_index.get(label).copied()
	}

	/// Rows in drawing order.
	///
	/// Input order by default; with `sort_by_position` rows are ordered by
	/// the stacking position of their left block, then of their right
	/// block, keeping input order among equals. Rows without a block go last.
	pub fn flow_order<S: TabularSource + ?Sized>(
		&self,
		source: &S,
		sort_by_position: bool,
	) -> Vec<usize> {
		let mut rows: Vec<usize> = (0..source.row_count()).collect();
		if sort_by_position {
			rows.sort_by_key(|&row| {
				(
					self.left_position(source.label(row, self.phase + 1))
						.unwrap_or(usize::MAX),
					self.right_position(source.label(row, self.phase + 2))
						.unwrap_or(usize::MAX),
				)
			});
		}
		rows
	}
}

/// Running offsets of the next free slot in every block of a stage pair.
///
/// Left and right cursors move independently: a flow takes space in the
/// block it leaves and, separately, in the block it enters.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowCursor {
	left: Vec<f64>,
	right: Vec<f64>,
}

impl FlowCursor {
	/// Cursors at the start of every block.
	pub fn new(stage: &StageBlocks) -> Self {
		Self {
			left: stage.left.iter().map(|b| b.start).collect(),
			right: stage.right.iter().map(|b| b.start).collect(),
		}
	}

	/// Current offset in left block `left` and right block `right`.
	pub fn offsets(&self, left: usize, right: usize) -> (f64, f64) {
		(self.left[left], self.right[right])
	}

	/// Moves both cursors past a flow of `width`.
	pub fn advance(&mut self, left: usize, right: usize, width: f64) {
		self.left[left] += width;
		self.right[right] += width;
	}

	/// Current offset of left block `index`.
	pub fn left(&self, index: usize) -> f64 {
		self.left[index]
	}

	/// Current offset of right block `index`.
	pub fn right(&self, index: usize) -> f64 {
		self.right[index]
	}
}

/// Builds the ribbon of a flow of `width` from left block `left` to right
/// block `right`, then advances the cursors past it.
pub fn place_flow(
	phase: usize,
	cursor: &mut FlowCursor,
	left: usize,
	right: usize,
	width: f64,
	layout: &LayoutConfig,
) -> RibbonPath {
	let (l, r) = cursor.offsets(left, right);
	let start = 1.0 - l - width;
	let end = 1.0 - r - width;
	let x = phase as f64;
	let path = build_ribbon_path(
		start,
		start + width,
		end,
		end + width,
		x + layout.left_margin,
		x + layout.right_margin,
	);
	cursor.advance(left, right, width);
	path
}
