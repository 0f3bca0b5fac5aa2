//! Turns a flow table into an ordered list of marks, then paints them.
//!
//! Everything that can fail happens in [`build_scene`]; painting cannot
//! fail, so a surface never sees half a diagram.

use log::debug;

use super::config::SankeyOptions;
use super::error::SankeyResult;
use super::geometry::{BlockRect, Point, RibbonPath, build_block_rect};
use super::layout::{FlowCursor, StageBlocks, place_flow, scale_factor};
use super::palette::{Color, ColorAssignment};
use super::surface::{SankeySurface, TextMark, VerticalAlign};
use super::types::{TabularSource, validate_source};

/// One shape of the diagram.
#[derive(Clone, Debug, PartialEq)]
pub enum Mark {
	/// A category block.
	Block {
		/// Where the block sits.
		rect: BlockRect,
		/// Fill, opacity included.
		color: Color,
	},
	/// A flow ribbon.
	Ribbon {
		/// Outline of the ribbon.
		path: RibbonPath,
		/// Fill, opacity included.
		color: Color,
	},
	/// A label or title.
	Text(TextMark),
}

/// A laid-out diagram, ready to paint.
#[derive(Clone, Debug)]
pub struct Scene {
	marks: Vec<Mark>,
	stages: Vec<StageBlocks>,
	colors: ColorAssignment,
	factor: f64,
}

impl Scene {
	/// Marks in paint order.
	pub fn marks(&self) -> &[Mark] {
		&self.marks
	}

	/// Blocks of every stage pair, left to right.
	pub fn stages(&self) -> &[StageBlocks] {
		&self.stages
	}

	/// Number of stage pairs.
	pub fn phases(&self) -> usize {
		self.stages.len()
	}

	/// Scale from weights to drawn sizes.
	pub fn factor(&self) -> f64 {
		self.factor
	}

	/// Color of every label.
	pub fn colors(&self) -> &ColorAssignment {
		&self.colors
	}

	/// Horizontal extent: one unit per stage pair.
	pub fn x_bounds(&self) -> (f64, f64) {
		(0.0, self.phases() as f64)
	}

	/// Paints every mark, then fixes the view and hides the axes.
	pub fn paint<S: SankeySurface + ?Sized>(&self, surface: &mut S) {
		for mark in &self.marks {
			match mark {
				Mark::Block { rect, color } => surface.fill_block(rect, *color),
				Mark::Ribbon { path, color } => surface.fill_ribbon(path, *color),
				Mark::Text(text) => surface.draw_text(text),
			}
		}
		let (min, max) = self.x_bounds();
		surface.set_x_bounds(min, max);
		surface.hide_axes();
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
	Left,
	Right,
}

struct SceneBuilder<'a, S: ?Sized> {
	source: &'a S,
	options: &'a SankeyOptions,
	colors: &'a ColorAssignment,
	phases: usize,
	factor: f64,
	marks: Vec<Mark>,
}

impl<S: TabularSource + ?Sized> SceneBuilder<'_, S> {
	fn color_of(&self, label: &str) -> Color {
		self.colors.get(label).unwrap_or(Color::BLACK)
	}

	fn push_side(&mut self, stage: &StageBlocks, side: Side) {
		let layout = &self.options.layout;
		let phase = stage.phase;
		let x = phase as f64;
		let (block_x, block_w, blocks, column) = match side {
			Side::Right => (
				x + layout.right_margin,
				1.0 - layout.right_margin,
				&stage.right,
				phase + 2,
			),
			Side::Left => (x, layout.left_margin, &stage.left, phase + 1),
		};
		// Inner boundaries are labelled once, by the right side of the pair
		// before them, centered on the full boundary width.
		let text_x = match side {
			Side::Right if phase + 1 < self.phases => Some(block_x + block_w),
			Side::Left if phase > 0 => None,
			_ => Some(block_x + 0.5 * block_w),
		};

		for block in blocks {
			let color = self.color_of(&block.label).with_alpha(layout.block_alpha);
			self.marks.push(Mark::Block {
				rect: build_block_rect(block_x, 1.0 - block.start - block.size, block_w, block.size),
				color,
			});
			if let (Some(text_x), Some(label_color)) = (text_x, self.options.label_color) {
				self.marks.push(Mark::Text(TextMark {
					at: Point::new(text_x, 1.0 - block.start - 0.5 * block.size),
					text: self.options.node_sizes.annotate(&block.label, block.weight),
					color: label_color,
					font_size: self.options.label_font_size,
					align: VerticalAlign::Center,
				}));
			}
		}

		if let (Some(text_x), Some(title_color)) = (text_x, self.options.title_color) {
			self.marks.push(Mark::Text(TextMark {
				at: Point::new(text_x, 1.0),
				text: self.source.title(column).to_string(),
				color: title_color,
				font_size: self.options.title_font_size,
				align: VerticalAlign::Bottom,
			}));
		}
	}

	fn push_flows(&mut self, stage: &StageBlocks) {
		let layout = &self.options.layout;
		let phase = stage.phase;
		let mut cursor = FlowCursor::new(stage);
		for row in stage.flow_order(self.source, self.options.sort_flows_by_node_position) {
			let from = self.source.label(row, phase + 1);
			let to = self.source.label(row, phase + 2);
			let (Some(left), Some(right)) = (stage.left_position(from), stage.right_position(to))
			else {
				debug!("stage pair {phase}: skipping row {row} ({from:?} -> {to:?}), no block");
				continue;
			};
			let width = self.source.weight(row) * self.factor;
			let path = place_flow(phase, &mut cursor, left, right, width, layout);
			let color = self
				.options
				.flow_color
				.unwrap_or_else(|| self.color_of(from))
				.with_alpha(layout.flow_alpha);
			self.marks.push(Mark::Ribbon { path, color });
		}
	}
}

/// Validates the input and options and lays out the whole diagram.
pub fn build_scene<S: TabularSource + ?Sized>(
	source: &S,
	options: &SankeyOptions,
) -> SankeyResult<Scene> {
	options.validate()?;
	validate_source(source)?;

	let phases = source.stage_count() - 1;
	let colors = ColorAssignment::new(&source.distinct_labels(), options.color_ramp.as_ref());
	let factor = scale_factor(options.layout.gap_fraction, source.weight_sum());

	let mut builder = SceneBuilder {
		source,
		options,
		colors: &colors,
		phases,
		factor,
		marks: Vec::new(),
	};
	let mut stages = Vec::with_capacity(phases);
	for phase in 0..phases {
		let stage = StageBlocks::aggregate(
			source,
			phase,
			factor,
			&options.layout,
			options.block_order,
		);
		builder.push_side(&stage, Side::Right);
		builder.push_side(&stage, Side::Left);
		builder.push_flows(&stage);
		stages.push(stage);
	}
	let marks = builder.marks;
	debug!(
		"laid out {phases} stage pairs, {} labels, {} marks",
		colors.len(),
		marks.len()
	);

	Ok(Scene {
		marks,
		stages,
		colors,
		factor,
	})
}

/// Lays out and paints a diagram. Nothing is painted if the input or the
/// options are rejected.
pub fn draw_sankey<S, D>(source: &S, options: &SankeyOptions, surface: &mut D) -> SankeyResult<()>
where
	S: TabularSource + ?Sized,
	D: SankeySurface + ?Sized,
{
	build_scene(source, options)?.paint(surface);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::config::NodeSizeAnnotation;
	use crate::components::sankey::error::SankeyError;
	use crate::components::sankey::surface::{DrawOp, RecordingSurface};
	use crate::components::sankey::types::{FlowRow, FlowTable};

	const EPS: f64 = 1e-9;

	fn example() -> FlowTable {
		FlowTable::new(
			vec!["weight".into(), "before".into(), "after".into()],
			vec![
				FlowRow::new(10.0, ["A", "X"]),
				FlowRow::new(5.0, ["B", "X"]),
				FlowRow::new(5.0, ["B", "Y"]),
			],
		)
		.unwrap()
	}

	fn three_stages() -> FlowTable {
		FlowTable::new(
			vec!["n".into(), "s0".into(), "s1".into(), "s2".into()],
			vec![
				FlowRow::new(3.0, ["a", "m", "x"]),
				FlowRow::new(2.0, ["b", "m", "y"]),
				FlowRow::new(4.0, ["a", "n", "y"]),
				FlowRow::new(1.0, ["c", "n", "x"]),
			],
		)
		.unwrap()
	}

	#[test]
	fn test_example_paint() {
		let mut surface = RecordingSurface::new();
		draw_sankey(&example(), &SankeyOptions::default(), &mut surface).unwrap();

		assert_eq!(surface.blocks().count(), 4);
		assert_eq!(surface.ribbons().count(), 3);
		let texts: Vec<&str> = surface.texts().map(|t| t.text.as_str()).collect();
		assert_eq!(texts, ["X", "Y", "after", "A", "B", "before"]);
		assert_eq!(
			&surface.ops[surface.ops.len() - 2..],
			[DrawOp::XBounds(0.0, 1.0), DrawOp::HideAxes]
		);

		// The ribbon into Y fills the bottom of the span: offsets 0.775..1.
		let (into_y, _) = surface.ribbons().last().unwrap();
		let v = into_y.vertices();
		assert!(v[3].y.abs() < EPS);
		assert!((v[4].y - 0.225).abs() < EPS);
	}

	#[test]
	fn test_block_rects_and_label_positions() {
		let scene = build_scene(&example(), &SankeyOptions::default()).unwrap();
		let Mark::Block { rect, color } = &scene.marks()[0] else {
			panic!("first mark should be a block");
		};
		// Right block X of the only (and last) stage pair.
		assert!((rect.x - 0.9).abs() < EPS);
		assert!((rect.width - 0.1).abs() < EPS);
		assert!((rect.y - 0.325).abs() < EPS);
		assert!((rect.top() - 1.0).abs() < EPS);
		assert_eq!(color.a, 0.5);

		let Mark::Text(label) = &scene.marks()[1] else {
			panic!("block label expected");
		};
		assert!((label.at.x - 0.95).abs() < EPS);
		assert!((label.at.y - (1.0 - 0.3375)).abs() < EPS);
		assert_eq!(label.align, VerticalAlign::Center);
	}

	#[test]
	fn test_ribbons_use_source_color_unless_overridden() {
		let table = example();
		let scene = build_scene(&table, &SankeyOptions::default()).unwrap();
		let a = scene.colors().get("A").unwrap();
		let Some(Mark::Ribbon { color, .. }) =
			scene.marks().iter().find(|m| matches!(m, Mark::Ribbon { .. }))
		else {
			panic!("no ribbon");
		};
		assert_eq!(*color, a.with_alpha(0.4));

		let grey = Color::rgb(0.5, 0.5, 0.5);
		let scene = build_scene(&table, &SankeyOptions::default().flow_color(grey)).unwrap();
		for mark in scene.marks() {
			if let Mark::Ribbon { color, .. } = mark {
				assert_eq!(*color, grey.with_alpha(0.4));
			}
		}
	}

	#[test]
	fn test_interior_labels_drawn_once() {
		let scene = build_scene(&three_stages(), &SankeyOptions::default()).unwrap();
		let texts: Vec<&TextMark> = scene
			.marks()
			.iter()
			.filter_map(|m| match m {
				Mark::Text(t) => Some(t),
				_ => None,
			})
			.collect();
		let mut names: Vec<&str> = texts.iter().map(|t| t.text.as_str()).collect();
		names.sort_unstable();
		assert_eq!(
			names,
			["a", "b", "c", "m", "n", "s0", "s1", "s2", "x", "y"]
		);

		// The middle stage is labelled on the boundary, at x = 1.
		let m = texts.iter().find(|t| t.text == "m").unwrap();
		assert!((m.at.x - 1.0).abs() < EPS);
		let title = texts.iter().find(|t| t.text == "s1").unwrap();
		assert_eq!(title.at.y, 1.0);
		assert_eq!(title.align, VerticalAlign::Bottom);
		let last = texts.iter().find(|t| t.text == "s2").unwrap();
		assert!((last.at.x - 1.95).abs() < EPS);
		assert_eq!(scene.x_bounds(), (0.0, 2.0));
	}

	#[test]
	fn test_hidden_labels_and_titles() {
		let options = SankeyOptions::default()
			.label_color(None)
			.title_color(None);
		let scene = build_scene(&three_stages(), &options).unwrap();
		assert!(!scene.marks().iter().any(|m| matches!(m, Mark::Text(_))));
	}

	#[test]
	fn test_node_size_annotation_in_labels() {
		let options = SankeyOptions::default()
			.title_color(None)
			.node_sizes(NodeSizeAnnotation::Default);
		let mut surface = RecordingSurface::new();
		draw_sankey(&example(), &options, &mut surface).unwrap();
		let texts: Vec<&str> = surface.texts().map(|t| t.text.as_str()).collect();
		assert_eq!(texts, ["X (15)", "Y (5)", "A (10)", "B (10)"]);
	}

	#[test]
	fn test_rejected_input_paints_nothing() {
		let mut surface = RecordingSurface::new();
		let narrow = FlowTable::from_rows(vec![FlowRow::new(1.0, ["A"])]).unwrap();
		let err = draw_sankey(&narrow, &SankeyOptions::default(), &mut surface).unwrap_err();
		assert_eq!(err, SankeyError::TooFewColumns(2));
		assert!(surface.ops.is_empty());

		let options = SankeyOptions::default().title_font_size(-1.0);
		let err = draw_sankey(&example(), &options, &mut surface).unwrap_err();
		assert!(err.is_configuration());
		assert!(surface.ops.is_empty());
	}

	#[test]
	fn test_rows_into_dropped_blocks_are_skipped() {
		let table = FlowTable::from_rows(vec![
			FlowRow::new(4.0, ["A", "X"]),
			FlowRow::new(0.0, ["A", "ghost"]),
		])
		.unwrap();
		let scene = build_scene(&table, &SankeyOptions::default()).unwrap();
		assert_eq!(scene.stages()[0].right.len(), 1);
		let ribbons = scene
			.marks()
			.iter()
			.filter(|m| matches!(m, Mark::Ribbon { .. }))
			.count();
		assert_eq!(ribbons, 1);
	}

	#[test]
	fn test_sorted_flows_are_drawn_in_stacking_order() {
		let table = FlowTable::from_rows(vec![
			FlowRow::new(1.0, ["A", "Y"]),
			FlowRow::new(1.0, ["B", "X"]),
			FlowRow::new(1.0, ["A", "X"]),
		])
		.unwrap();
		let options = SankeyOptions::default().sort_flows_by_node_position(true);
		let scene = build_scene(&table, &options).unwrap();
		let starts: Vec<f64> = scene
			.marks()
			.iter()
			.filter_map(|m| match m {
				Mark::Ribbon { path, .. } => Some(path.vertices()[7].y),
				_ => None,
			})
			.collect();
		// Both ribbons out of A come first, top to bottom, then B.
		assert_eq!(starts.len(), 3);
		assert!(starts[0] > starts[1] && starts[1] > starts[2]);
	}
}
