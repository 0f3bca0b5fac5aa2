//! Colors, color ramps and the label-to-color assignment.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::error::{SankeyError, SankeyResult};

/// An RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: f64,
	/// Green channel.
	pub g: f64,
	/// Blue channel.
	pub b: f64,
	/// Opacity.
	pub a: f64,
}

impl Color {
	/// Opaque black.
	pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
	/// Opaque white.
	pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

	/// Opaque color from channels in `[0, 1]`.
	pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Same color, different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS `rgba(...)` form, suitable for canvas fill styles.
	pub fn to_css(&self) -> String {
		let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
		format!(
			"rgba({}, {}, {}, {})",
			channel(self.r),
			channel(self.g),
			channel(self.b),
			self.a.clamp(0.0, 1.0)
		)
	}

	fn from_hex(hex: &str) -> Option<Self> {
		let digits: Vec<u8> = hex
			.chars()
			.map(|c| c.to_digit(16).map(|d| d as u8))
			.collect::<Option<_>>()?;
		let pairs = |d: &[u8]| -> Vec<f64> {
			d.chunks(2)
				.map(|p| f64::from(p[0] * 16 + p[1]) / 255.0)
				.collect()
		};
		let channels = match digits.len() {
			3 => digits.iter().map(|&d| f64::from(d * 17) / 255.0).collect(),
			6 | 8 => pairs(&digits),
			_ => return None,
		};
		Some(Self {
			r: channels[0],
			g: channels[1],
			b: channels[2],
			a: channels.get(3).copied().unwrap_or(1.0),
		})
	}
}

const NAMED: &[(&str, Color)] = &[
	("black", Color::BLACK),
	("white", Color::WHITE),
	("gray", Color::rgb(0.5, 0.5, 0.5)),
	("grey", Color::rgb(0.5, 0.5, 0.5)),
	("red", Color::rgb(1.0, 0.0, 0.0)),
	("green", Color::rgb(0.0, 0.5, 0.0)),
	("blue", Color::rgb(0.0, 0.0, 1.0)),
	("orange", Color::rgb(1.0, 0.647, 0.0)),
	("purple", Color::rgb(0.5, 0.0, 0.5)),
	("steelblue", Color::rgb(0.275, 0.51, 0.706)),
];

impl FromStr for Color {
	type Err = SankeyError;

	fn from_str(s: &str) -> SankeyResult<Self> {
		let text = s.trim().to_ascii_lowercase();
		let parsed = match text.strip_prefix('#') {
			Some(hex) => Color::from_hex(hex),
			None => NAMED.iter().find(|(n, _)| *n == text).map(|(_, c)| *c),
		};
		parsed.ok_or_else(|| SankeyError::InvalidColor(s.to_string()))
	}
}

/// Maps a fraction in `[0, 1]` to a color.
pub type ColorRamp = Arc<dyn Fn(f64) -> Color + Send + Sync>;

// Piecewise-linear channel tables: (position, value).
type Channel = &'static [(f64, f64)];

const JET: [Channel; 3] = [
	&[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
	&[
		(0.0, 0.0),
		(0.125, 0.0),
		(0.375, 1.0),
		(0.64, 1.0),
		(0.91, 0.0),
		(1.0, 0.0),
	],
	&[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
];

const VIRIDIS: [Channel; 3] = [
	&[
		(0.0, 0.267),
		(0.25, 0.229),
		(0.5, 0.128),
		(0.75, 0.369),
		(1.0, 0.993),
	],
	&[
		(0.0, 0.005),
		(0.25, 0.322),
		(0.5, 0.567),
		(0.75, 0.789),
		(1.0, 0.906),
	],
	&[
		(0.0, 0.329),
		(0.25, 0.546),
		(0.5, 0.551),
		(0.75, 0.383),
		(1.0, 0.144),
	],
];

fn interpolate(channel: Channel, x: f64) -> f64 {
	let x = x.clamp(0.0, 1.0);
	for pair in channel.windows(2) {
		let ((x0, v0), (x1, v1)) = (pair[0], pair[1]);
		if x <= x1 {
			let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
			return v0 + (v1 - v0) * t;
		}
	}
	channel.last().map(|&(_, v)| v).unwrap_or(0.0)
}

fn sample(table: &[Channel; 3], x: f64) -> Color {
	Color::rgb(
		interpolate(table[0], x),
		interpolate(table[1], x),
		interpolate(table[2], x),
	)
}

/// Blue through cyan, yellow and red.
pub fn jet(x: f64) -> Color {
	sample(&JET, x)
}

/// [`jet`] reversed: red first. The default block ramp.
pub fn jet_r(x: f64) -> Color {
	jet(1.0 - x)
}

/// White to black.
pub fn greys(x: f64) -> Color {
	let v = 1.0 - x.clamp(0.0, 1.0);
	Color::rgb(v, v, v)
}

/// Perceptually ordered purple to yellow.
pub fn viridis(x: f64) -> Color {
	sample(&VIRIDIS, x)
}

/// The ramp used when none is configured.
pub fn default_ramp() -> ColorRamp {
	Arc::new(jet_r)
}

/// Looks up a built-in ramp by name.
pub fn ramp_by_name(name: &str) -> SankeyResult<ColorRamp> {
	let ramp: ColorRamp = match name {
		"jet" => Arc::new(jet),
		"jet_r" => Arc::new(jet_r),
		"greys" => Arc::new(greys),
		"viridis" => Arc::new(viridis),
		other => return Err(SankeyError::UnknownColorRamp(other.to_string())),
	};
	Ok(ramp)
}

/// Color of every distinct label of one diagram.
///
/// The `i`-th of `n` labels gets `ramp(i / n)`. Built fresh for each render,
/// so colors are stable within a diagram and nothing leaks between calls.
#[derive(Clone, Debug, Default)]
pub struct ColorAssignment {
	index: HashMap<String, usize>,
	colors: Vec<Color>,
}

impl ColorAssignment {
	/// Assigns colors to `labels` in the order given.
	pub fn new(labels: &[String], ramp: &dyn Fn(f64) -> Color) -> Self {
		let n = labels.len();
		let mut index = HashMap::with_capacity(n);
		let mut colors = Vec::with_capacity(n);
		for label in labels {
			if index.contains_key(label) {
				continue;
			}
			let i = colors.len();
			index.insert(label.clone(), i);
			colors.push(ramp(i as f64 / n as f64));
		}
		Self { index, colors }
	}

	/// Color assigned to `label`, if it was among the labels.
	pub fn get(&self, label: &str) -> Option<Color> {
		self.index.get(label).map(|&i| self.colors[i])
	}

	/// Number of labels with a color.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Whether no label has a color.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_colors() {
		assert_eq!("black".parse::<Color>().unwrap(), Color::BLACK);
		assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
		let c: Color = "#ff000080".parse().unwrap();
		assert_eq!((c.r, c.g, c.b), (1.0, 0.0, 0.0));
		assert!((c.a - 128.0 / 255.0).abs() < 1e-12);
		assert!(matches!(
			"#12".parse::<Color>(),
			Err(SankeyError::InvalidColor(_))
		));
		assert!("chartreuse-ish".parse::<Color>().is_err());
	}

	#[test]
	fn test_css_output() {
		assert_eq!(Color::rgb(1.0, 0.5, 0.0).to_css(), "rgba(255, 128, 0, 1)");
		assert_eq!(Color::BLACK.with_alpha(0.4).to_css(), "rgba(0, 0, 0, 0.4)");
	}

	#[test]
	fn test_jet_endpoints() {
		assert_eq!(jet(0.0), Color::rgb(0.0, 0.0, 0.5));
		assert_eq!(jet(1.0), Color::rgb(0.5, 0.0, 0.0));
		assert_eq!(jet_r(0.0), jet(1.0));
		// Out-of-range fractions clamp.
		assert_eq!(jet(-3.0), jet(0.0));
	}

	#[test]
	fn test_ramp_by_name() {
		assert_eq!(ramp_by_name("greys").unwrap()(0.0), Color::WHITE);
		assert!(matches!(
			ramp_by_name("rainbow"),
			Err(SankeyError::UnknownColorRamp(_))
		));
	}

	#[test]
	fn test_assignment_is_deterministic() {
		let labels: Vec<String> = ["A", "X", "B", "Y"].map(String::from).to_vec();
		let a = ColorAssignment::new(&labels, &jet_r);
		let b = ColorAssignment::new(&labels, &jet_r);
		assert_eq!(a.len(), 4);
		for label in &labels {
			assert_eq!(a.get(label), b.get(label));
		}
		assert_eq!(a.get("A"), Some(jet_r(0.0)));
		assert_eq!(a.get("B"), Some(jet_r(0.5)));
		assert_eq!(a.get("missing"), None);
	}

	#[test]
	fn test_neighbouring_labels_get_distinct_colors() {
		for n in 2..=60 {
			let labels: Vec<String> = (0..n).map(|i| format!("L{i}")).collect();
			let colors = ColorAssignment::new(&labels, &jet_r);
			for pair in labels.windows(2) {
				assert_ne!(colors.get(&pair[0]), colors.get(&pair[1]), "n = {n}");
			}
		}
	}

	#[test]
	fn test_jet_repeats_colors_for_many_labels() {
		// jet is flat (pure blue) between 0.11 and 0.125, so dense label sets
		// can repeat a color. Accepted, but kept visible here.
		let labels: Vec<String> = (0..200).map(|i| format!("L{i}")).collect();
		let colors = ColorAssignment::new(&labels, &jet);
		assert_eq!(colors.get("L23"), colors.get("L24"));
	}
}
