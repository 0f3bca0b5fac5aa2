use super::geometry::Point;

/// Space kept free around the drawable span, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Padding {
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
	pub left: f64,
}

impl Default for Padding {
	fn default() -> Self {
		Self {
			top: 40.0,
			right: 40.0,
			bottom: 10.0,
			left: 40.0,
		}
	}
}

/// Linear map from diagram space to canvas pixels.
///
/// Diagram x spans `x_min..x_max`, diagram y spans `0..1` upwards; canvas y
/// grows downwards, so y is flipped here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	pub padding: Padding,
	x_min: f64,
	x_max: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64, (x_min, x_max): (f64, f64)) -> Self {
		Self {
			width,
			height,
			padding: Padding::default(),
			x_min,
			x_max,
		}
	}

	/// Keeps enough room above the span for titles of `font_size`.
	pub fn with_title_room(mut self, font_size: f64) -> Self {
		self.padding.top = self.padding.top.max(font_size * 2.0);
		self
	}

	pub fn set_x_bounds(&mut self, min: f64, max: f64) {
		self.x_min = min;
		self.x_max = max;
	}

	fn plot_width(&self) -> f64 {
		(self.width - self.padding.left - self.padding.right).max(0.0)
	}

	fn plot_height(&self) -> f64 {
		(self.height - self.padding.top - self.padding.bottom).max(0.0)
	}

	pub fn x(&self, x: f64) -> f64 {
		let span = self.x_max - self.x_min;
		let t = if span > 0.0 { (x - self.x_min) / span } else { 0.0 };
		self.padding.left + t * self.plot_width()
	}

	pub fn y(&self, y: f64) -> f64 {
		self.padding.top + (1.0 - y) * self.plot_height()
	}

	pub fn point(&self, p: Point) -> (f64, f64) {
		(self.x(p.x), self.y(p.y))
	}
}
