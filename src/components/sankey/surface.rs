//! The drawing surface a scene is painted on.

use super::geometry::{BlockRect, Point, RibbonPath};
use super::palette::Color;

/// Vertical anchor of a text mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlign {
	/// The anchor is the middle of the text.
	Center,
	/// The anchor is the bottom of the text; it extends upwards.
	Bottom,
}

/// A horizontally centered piece of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextMark {
	/// Anchor in diagram space.
	pub at: Point,
	/// Text to draw.
	pub text: String,
	/// Fill color.
	pub color: Color,
	/// Font size in pixels.
	pub font_size: f64,
	/// How the text sits relative to the anchor.
	pub align: VerticalAlign,
}

/// The drawing surface a diagram is painted on.
///
/// Coordinates are in diagram space: x runs over stages, y from 0 (bottom)
/// to 1 (top of the drawable span). Calls arrive in paint order and the
/// surface is used by one render at a time.
pub trait SankeySurface {
	/// Fills a block.
	fn fill_block(&mut self, rect: &BlockRect, color: Color);

	/// Fills a ribbon outline.
	fn fill_ribbon(&mut self, path: &RibbonPath, color: Color);

	/// Draws a label or title.
	fn draw_text(&mut self, text: &TextMark);

	/// Sets the horizontal extent of the view.
	fn set_x_bounds(&mut self, min: f64, max: f64);

	/// Hides axis lines, ticks and frame.
	fn hide_axes(&mut self);
}

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
	/// [`SankeySurface::fill_block`].
	Block(BlockRect, Color),
	/// [`SankeySurface::fill_ribbon`].
	Ribbon(RibbonPath, Color),
	/// [`SankeySurface::draw_text`].
	Text(TextMark),
	/// [`SankeySurface::set_x_bounds`].
	XBounds(f64, f64),
	/// [`SankeySurface::hide_axes`].
	HideAxes,
}

/// A surface that remembers every call instead of drawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSurface {
	/// Calls in the order they were made.
	pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
	/// Empty recording.
	pub fn new() -> Self {
		Self::default()
	}

	/// Recorded blocks.
	pub fn blocks(&self) -> impl Iterator<Item = (&BlockRect, &Color)> {
		self.ops.iter().filter_map(|op| match op {
			DrawOp::Block(rect, color) => Some((rect, color)),
			_ => None,
		})
	}

	/// Recorded ribbons.
	pub fn ribbons(&self) -> impl Iterator<Item = (&RibbonPath, &Color)> {
		self.ops.iter().filter_map(|op| match op {
			DrawOp::Ribbon(path, color) => Some((path, color)),
			_ => None,
		})
	}

	/// Recorded texts.
	pub fn texts(&self) -> impl Iterator<Item = &TextMark> {
		self.ops.iter().filter_map(|op| match op {
			DrawOp::Text(text) => Some(text),
			_ => None,
		})
	}
}

impl SankeySurface for RecordingSurface {
	fn fill_block(&mut self, rect: &BlockRect, color: Color) {
		self.ops.push(DrawOp::Block(*rect, color));
	}

	fn fill_ribbon(&mut self, path: &RibbonPath, color: Color) {
		self.ops.push(DrawOp::Ribbon(path.clone(), color));
	}

	fn draw_text(&mut self, text: &TextMark) {
		self.ops.push(DrawOp::Text(text.clone()));
	}

	fn set_x_bounds(&mut self, min: f64, max: f64) {
		self.ops.push(DrawOp::XBounds(min, max));
	}

	fn hide_axes(&mut self) {
		self.ops.push(DrawOp::HideAxes);
	}
}
