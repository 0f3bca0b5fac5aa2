//! Points, block rectangles and ribbon outlines in diagram space.

/// A point in diagram space: x counts stages, y runs from 0 (bottom) to 1
/// (top of the drawable span).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing upwards.
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// An axis-aligned block, anchored at its bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlockRect {
	/// Left edge.
	pub x: f64,
	/// Bottom edge.
	pub y: f64,
	/// Horizontal extent.
	pub width: f64,
	/// Vertical extent.
	pub height: f64,
}

impl BlockRect {
	/// Right edge.
	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	/// Top edge.
	pub fn top(&self) -> f64 {
		self.y + self.height
	}
}

/// Builds the rectangle of a block.
pub fn build_block_rect(x: f64, y_bottom: f64, width: f64, height: f64) -> BlockRect {
	BlockRect {
		x,
		y: y_bottom,
		width,
		height,
	}
}

/// One drawing instruction of a [`RibbonPath`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
	/// Start a new outline at the point.
	MoveTo(Point),
	/// Cubic Bezier from the current point to `to`.
	CubicTo {
		/// First control point.
		ctrl1: Point,
		/// Second control point.
		ctrl2: Point,
		/// End point.
		to: Point,
	},
	/// Straight segment to the point.
	LineTo(Point),
	/// Back to the start of the outline.
	Close,
}

/// Closed outline of one flow ribbon.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonPath {
	commands: Vec<PathCommand>,
}

impl RibbonPath {
	/// Drawing instructions, in order.
	pub fn commands(&self) -> &[PathCommand] {
		&self.commands
	}

	/// Every point the commands mention (end and control points), in order.
	///
	/// For a ribbon these are the eight template vertices: bottom-left,
	/// two controls, bottom-right, top-right, two controls, top-left.
	pub fn vertices(&self) -> Vec<Point> {
		let mut points = Vec::with_capacity(8);
		for command in &self.commands {
			match *command {
				PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
				PathCommand::CubicTo { ctrl1, ctrl2, to } => {
					points.extend([ctrl1, ctrl2, to]);
				}
				PathCommand::Close => {}
			}
		}
		points
	}
}

/// Builds the S-shaped outline of a ribbon between two vertical segments.
///
/// The left edge spans `y_start0..y_start1` at `x_left`, the right edge
/// spans `y_end0..y_end1` at `x_right`. Both long edges are cubic curves
/// whose control points sit on the horizontal midline, so each curve leaves
/// and meets its edge horizontally and the outline is symmetric about the
/// middle.
pub fn build_ribbon_path(
	y_start0: f64,
	y_start1: f64,
	y_end0: f64,
	y_end1: f64,
	x_left: f64,
	x_right: f64,
) -> RibbonPath {
	let mid = (x_left + x_right) / 2.0;
	RibbonPath {
		commands: vec![
			PathCommand::MoveTo(Point::new(x_left, y_start0)),
			PathCommand::CubicTo {
				ctrl1: Point::new(mid, y_start0),
				ctrl2: Point::new(mid, y_end0),
				to: Point::new(x_right, y_end0),
			},
			PathCommand::LineTo(Point::new(x_right, y_end1)),
			PathCommand::CubicTo {
				ctrl1: Point::new(mid, y_end1),
				ctrl2: Point::new(mid, y_start1),
				to: Point::new(x_left, y_start1),
			},
			PathCommand::Close,
		],
	}
}

/// Evaluates a cubic Bezier at `t` in `[0, 1]`.
pub fn cubic_point(p0: Point, ctrl1: Point, ctrl2: Point, p3: Point, t: f64) -> Point {
	let u = 1.0 - t;
	let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
	Point::new(
		a * p0.x + b * ctrl1.x + c * ctrl2.x + d * p3.x,
		a * p0.y + b * ctrl1.y + c * ctrl2.y + d * p3.y,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-12;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
	}

	#[test]
	fn test_ribbon_template() {
		let path = build_ribbon_path(0.2, 0.3, 0.6, 0.7, 0.0, 1.0);
		let v = path.vertices();
		assert_eq!(
			v,
			vec![
				Point::new(0.0, 0.2),
				Point::new(0.5, 0.2),
				Point::new(0.5, 0.6),
				Point::new(1.0, 0.6),
				Point::new(1.0, 0.7),
				Point::new(0.5, 0.7),
				Point::new(0.5, 0.3),
				Point::new(0.0, 0.3),
			]
		);
		assert_eq!(path.commands().last(), Some(&PathCommand::Close));
	}

	#[test]
	fn test_curves_pass_through_corners_and_midpoint() {
		let (l, r) = (2.1, 2.9);
		let path = build_ribbon_path(0.1, 0.25, 0.5, 0.65, l, r);
		let v = path.vertices();
		let (p0, c1, c2, p3) = (v[0], v[1], v[2], v[3]);
		assert!(close(cubic_point(p0, c1, c2, p3, 0.0), Point::new(l, 0.1)));
		assert!(close(cubic_point(p0, c1, c2, p3, 1.0), Point::new(r, 0.5)));
		// Symmetric about the midline: halfway along, halfway up.
		assert!(close(
			cubic_point(p0, c1, c2, p3, 0.5),
			Point::new((l + r) / 2.0, (0.1 + 0.5) / 2.0)
		));
		// Tangents are horizontal at both ends.
		assert_eq!(c1.y, p0.y);
		assert_eq!(c2.y, p3.y);
	}

	#[test]
	fn test_block_rect() {
		let rect = build_block_rect(0.9, 0.325, 0.1, 0.675);
		assert!((rect.top() - 1.0).abs() < EPS);
		assert!((rect.right() - 1.0).abs() < EPS);
	}
}
