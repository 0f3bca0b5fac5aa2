use log::{debug, error};
use web_sys::CanvasRenderingContext2d;

use super::config::SankeyOptions;
use super::geometry::{BlockRect, PathCommand, Point, RibbonPath};
use super::palette::Color;
use super::scale::Viewport;
use super::scene::build_scene;
use super::surface::{SankeySurface, TextMark, VerticalAlign};
use super::types::FlowTable;

const BACKGROUND: &str = "#ffffff";

/// Paints diagrams on a 2D canvas context.
pub(crate) struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
	viewport: Viewport,
}

impl<'a> CanvasSurface<'a> {
	pub(crate) fn new(ctx: &'a CanvasRenderingContext2d, viewport: Viewport) -> Self {
		Self { ctx, viewport }
	}
}

impl SankeySurface for CanvasSurface<'_> {
	fn fill_block(&mut self, rect: &BlockRect, color: Color) {
		let (x0, y0) = self.viewport.point(Point::new(rect.x, rect.top()));
		let (x1, y1) = self.viewport.point(Point::new(rect.right(), rect.y));
		self.ctx.set_fill_style_str(&color.to_css());
		self.ctx.fill_rect(x0, y0, x1 - x0, y1 - y0);
	}

	fn fill_ribbon(&mut self, path: &RibbonPath, color: Color) {
		let ctx = self.ctx;
		let vp = &self.viewport;
		ctx.begin_path();
		for command in path.commands() {
			match *command {
				PathCommand::MoveTo(p) => {
					let (x, y) = vp.point(p);
					ctx.move_to(x, y);
				}
				PathCommand::CubicTo { ctrl1, ctrl2, to } => {
					let ((c1x, c1y), (c2x, c2y), (x, y)) =
						(vp.point(ctrl1), vp.point(ctrl2), vp.point(to));
					ctx.bezier_curve_to(c1x, c1y, c2x, c2y, x, y);
				}
				PathCommand::LineTo(p) => {
					let (x, y) = vp.point(p);
					ctx.line_to(x, y);
				}
				PathCommand::Close => ctx.close_path(),
			}
		}
		ctx.set_fill_style_str(&color.to_css());
		ctx.fill();
	}

	fn draw_text(&mut self, text: &TextMark) {
		let (x, y) = self.viewport.point(text.at);
		self.ctx.set_font(&format!("{}px sans-serif", text.font_size));
		self.ctx.set_text_align("center");
		self.ctx.set_text_baseline(match text.align {
			VerticalAlign::Center => "middle",
			VerticalAlign::Bottom => "bottom",
		});
		self.ctx.set_fill_style_str(&text.color.to_css());
		let _ = self.ctx.fill_text(&text.text, x, y);
	}

	fn set_x_bounds(&mut self, min: f64, max: f64) {
		// The viewport is built from the scene bounds up front, so this only
		// matters to marks painted afterwards.
		self.viewport.set_x_bounds(min, max);
	}

	fn hide_axes(&mut self) {
		// A bare canvas draws no axes.
	}
}

/// Clears the canvas and draws `data`, or an error message if it cannot be
/// laid out.
pub fn render(
	data: &FlowTable,
	options: &SankeyOptions,
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	match build_scene(data, options) {
		Ok(scene) => {
			let viewport = Viewport::new(width, height, scene.x_bounds())
				.with_title_room(options.title_font_size);
			scene.paint(&mut CanvasSurface::new(ctx, viewport));
			debug!("painted {} marks at {width}x{height}", scene.marks().len());
		}
		Err(err) => {
			error!("cannot draw sankey diagram: {err}");
			draw_message(ctx, width, height, &err.to_string());
		}
	}
}

fn draw_message(ctx: &CanvasRenderingContext2d, width: f64, height: f64, message: &str) {
	ctx.set_font("16px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("rgba(200, 40, 40, 0.9)");
	let _ = ctx.fill_text(message, width / 2.0, height / 2.0);
}
