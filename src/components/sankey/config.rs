//! Layout constants, drawing options and their JSON settings form.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::error::{SankeyError, SankeyResult};
use super::layout::BlockOrder;
use super::palette::{Color, ColorRamp, default_ramp, ramp_by_name};

/// Geometry constants of the diagram, in stage-relative units.
///
/// Each stage pair spans one unit horizontally: its left blocks occupy
/// `0..left_margin`, its right blocks `right_margin..1`, ribbons the rest.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
	/// Share of the vertical span left empty between blocks.
	pub gap_fraction: f64,
	/// Where left blocks end and ribbons begin.
	pub left_margin: f64,
	/// Where ribbons end and right blocks begin.
	pub right_margin: f64,
	/// Opacity of block fills.
	pub block_alpha: f64,
	/// Opacity of ribbon fills.
	pub flow_alpha: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			gap_fraction: 0.1,
			left_margin: 0.1,
			right_margin: 0.9,
			block_alpha: 0.5,
			flow_alpha: 0.4,
		}
	}
}

fn invalid(option: &'static str, reason: impl Into<String>) -> SankeyError {
	SankeyError::InvalidOption {
		option,
		reason: reason.into(),
	}
}

impl LayoutConfig {
	/// Checks every field is in range.
	pub fn validate(&self) -> SankeyResult<()> {
		if !(0.0..1.0).contains(&self.gap_fraction) {
			return Err(invalid(
				"gap_fraction",
				format!("{} is not in [0, 1)", self.gap_fraction),
			));
		}
		if !(0.0 <= self.left_margin
			&& self.left_margin < self.right_margin
			&& self.right_margin <= 1.0)
		{
			return Err(invalid(
				"left_margin",
				format!(
					"need 0 <= left_margin < right_margin <= 1, got {} and {}",
					self.left_margin, self.right_margin
				),
			));
		}
		for (option, alpha) in [
			("block_alpha", self.block_alpha),
			("flow_alpha", self.flow_alpha),
		] {
			if !(0.0..=1.0).contains(&alpha) {
				return Err(invalid(option, format!("{alpha} is not in [0, 1]")));
			}
		}
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
	Text(String),
	Label,
	Size(Option<usize>),
}

/// A parsed node-size template.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
	segments: Vec<Segment>,
}

impl Template {
	/// Parses `{label}`, `{size}`, `{size:.Nf}` and positional `{}` /
	/// `{:.Nf}` fields; `{{` and `}}` are literal braces.
	///
	/// A template without named fields formats the size only and is shown
	/// after the label, separated by a space.
	pub fn parse(template: &str) -> SankeyResult<Self> {
		let fail = |reason: &str| SankeyError::InvalidTemplate {
			template: template.to_string(),
			reason: reason.to_string(),
		};

		let mut segments = Vec::new();
		let mut text = String::new();
		let (mut named, mut positional) = (false, false);
		let mut chars = template.chars().peekable();
		while let Some(c) = chars.next() {
			match c {
				'{' if chars.peek() == Some(&'{') => {
					chars.next();
					text.push('{');
				}
				'}' if chars.peek() == Some(&'}') => {
					chars.next();
					text.push('}');
				}
				'}' => return Err(fail("unmatched '}'")),
				'{' => {
					let mut field = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some(c) => field.push(c),
							None => return Err(fail("unclosed '{'")),
						}
					}
					let (name, spec) = field.split_once(':').unwrap_or((field.as_str(), ""));
					let precision = match spec {
						"" => None,
						"f" => Some(6),
						_ => {
							let digits = spec
								.strip_prefix('.')
								.and_then(|s| s.strip_suffix('f'))
								.ok_or_else(|| fail("only '.Nf' number formats are supported"))?;
							Some(digits.parse().map_err(|_| fail("bad precision"))?)
						}
					};
					if !text.is_empty() {
						segments.push(Segment::Text(std::mem::take(&mut text)));
					}
					match name {
						"label" if spec.is_empty() => {
							named = true;
							segments.push(Segment::Label);
						}
						"label" => return Err(fail("the label takes no format")),
						"size" => {
							named = true;
							segments.push(Segment::Size(precision));
						}
						"" => {
							positional = true;
							segments.push(Segment::Size(precision));
						}
						_ => return Err(fail("unknown field, use {label} or {size}")),
					}
				}
				c => text.push(c),
			}
		}
		if !text.is_empty() {
			segments.push(Segment::Text(text));
		}
		if named && positional {
			return Err(fail("cannot mix named and positional fields"));
		}
		if !named {
			segments.splice(0..0, [Segment::Label, Segment::Text(" ".into())]);
		}
		Ok(Self { segments })
	}

	/// Renders the template for one block.
	pub fn render(&self, label: &str, size: f64) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Text(text) => out.push_str(text),
				Segment::Label => out.push_str(label),
				Segment::Size(None) => out.push_str(&size.to_string()),
				&Segment::Size(Some(precision)) => {
					out.push_str(&format!("{size:.precision$}"));
				}
			}
		}
		out
	}
}

/// How block labels mention the block's total weight.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeSizeAnnotation {
	/// Labels only.
	#[default]
	Off,
	/// `"{label} ({size})"`.
	Default,
	/// A custom template.
	Custom(Template),
}

impl NodeSizeAnnotation {
	/// Resolves a template string.
	pub fn from_template(template: &str) -> SankeyResult<Self> {
		Template::parse(template).map(Self::Custom)
	}

	/// Label text of a block with total weight `size`.
	pub fn annotate(&self, label: &str, size: f64) -> String {
		match self {
			Self::Off => label.to_string(),
			Self::Default => format!("{label} ({size})"),
			Self::Custom(template) => template.render(label, size),
		}
	}
}

/// Everything that changes how a diagram looks.
#[derive(Clone)]
pub struct SankeyOptions {
	/// Colors for blocks, by label rank.
	pub color_ramp: ColorRamp,
	/// One color for every ribbon instead of its source block's color.
	pub flow_color: Option<Color>,
	/// Block label color; `None` hides labels.
	pub label_color: Option<Color>,
	/// Stage title color; `None` hides titles.
	pub title_color: Option<Color>,
	/// Block label font size.
	pub label_font_size: f64,
	/// Stage title font size.
	pub title_font_size: f64,
	/// Whether and how labels show block weights.
	pub node_sizes: NodeSizeAnnotation,
	/// Draw ribbons grouped by block position instead of input order.
	pub sort_flows_by_node_position: bool,
	/// How blocks of one side are stacked.
	pub block_order: BlockOrder,
	/// Geometry constants.
	pub layout: LayoutConfig,
}

impl Default for SankeyOptions {
	fn default() -> Self {
		Self {
			color_ramp: default_ramp(),
			flow_color: None,
			label_color: Some(Color::BLACK),
			title_color: Some(Color::BLACK),
			label_font_size: 20.0,
			title_font_size: 20.0,
			node_sizes: NodeSizeAnnotation::Off,
			sort_flows_by_node_position: false,
			block_order: BlockOrder::FirstOccurrence,
			layout: LayoutConfig::default(),
		}
	}
}

impl fmt::Debug for SankeyOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SankeyOptions")
			.field("flow_color", &self.flow_color)
			.field("label_color", &self.label_color)
			.field("title_color", &self.title_color)
			.field("label_font_size", &self.label_font_size)
			.field("title_font_size", &self.title_font_size)
			.field("node_sizes", &self.node_sizes)
			.field("sort_flows_by_node_position", &self.sort_flows_by_node_position)
			.field("block_order", &self.block_order)
			.field("layout", &self.layout)
			.finish_non_exhaustive()
	}
}

impl SankeyOptions {
	/// Default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the ramp block colors are drawn from.
	pub fn color_ramp<F>(mut self, ramp: F) -> Self
	where
		F: Fn(f64) -> Color + Send + Sync + 'static,
	{
		self.color_ramp = Arc::new(ramp);
		self
	}

	/// Paints every ribbon with `color`.
	pub fn flow_color(mut self, color: Color) -> Self {
		self.flow_color = Some(color);
		self
	}

	/// Sets the label color, `None` to hide labels.
	pub fn label_color(mut self, color: Option<Color>) -> Self {
		self.label_color = color;
		self
	}

	/// Sets the title color, `None` to hide titles.
	pub fn title_color(mut self, color: Option<Color>) -> Self {
		self.title_color = color;
		self
	}

	/// Sets the label font size.
	pub fn label_font_size(mut self, size: f64) -> Self {
		self.label_font_size = size;
		self
	}

	/// Sets the title font size.
	pub fn title_font_size(mut self, size: f64) -> Self {
		self.title_font_size = size;
		self
	}

	/// Sets the node-size annotation.
	pub fn node_sizes(mut self, annotation: NodeSizeAnnotation) -> Self {
		self.node_sizes = annotation;
		self
	}

	/// Draws ribbons grouped by block position.
	pub fn sort_flows_by_node_position(mut self, sort: bool) -> Self {
		self.sort_flows_by_node_position = sort;
		self
	}

	/// Sets the block stacking order.
	pub fn block_order(mut self, order: BlockOrder) -> Self {
		self.block_order = order;
		self
	}

	/// Sets the geometry constants.
	pub fn layout(mut self, layout: LayoutConfig) -> Self {
		self.layout = layout;
		self
	}

	/// Checks every option is usable.
	pub fn validate(&self) -> SankeyResult<()> {
		self.layout.validate()?;
		for (option, size) in [
			("label_font_size", self.label_font_size),
			("title_font_size", self.title_font_size),
		] {
			if !(size.is_finite() && size > 0.0) {
				return Err(invalid(option, format!("{size} is not a positive size")));
			}
		}
		Ok(())
	}
}

/// The `node_sizes` setting: a switch or a template.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeSizeSetting {
	/// `true` for the default template, `false` for none.
	Flag(bool),
	/// A custom template.
	Template(String),
}

impl NodeSizeSetting {
	/// Resolves the setting once, before layout.
	pub fn resolve(&self) -> SankeyResult<NodeSizeAnnotation> {
		match self {
			Self::Flag(false) => Ok(NodeSizeAnnotation::Off),
			Self::Flag(true) => Ok(NodeSizeAnnotation::Default),
			Self::Template(template) => NodeSizeAnnotation::from_template(template),
		}
	}
}

fn black() -> Option<String> {
	Some("black".into())
}

/// Options in their serialized form, e.g. read from JSON.
///
/// Colors are CSS-like strings; `"none"` or `null` hides labels and titles.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SankeySettings {
	/// Name of a built-in ramp.
	pub color_ramp: String,
	/// Color of every ribbon.
	pub flow_color: Option<String>,
	/// Label color.
	#[serde(default = "black")]
	pub label_color: Option<String>,
	/// Title color.
	#[serde(default = "black")]
	pub title_color: Option<String>,
	/// Label font size.
	pub label_font_size: f64,
	/// Title font size.
	pub title_font_size: f64,
	/// Node-size annotation.
	pub node_sizes: NodeSizeSetting,
	/// Draw ribbons grouped by block position.
	pub sort_flows_by_node_position: bool,
	/// Block stacking order.
	pub block_order: BlockOrder,
	/// Geometry constants.
	pub layout: LayoutConfig,
}

impl Default for SankeySettings {
	fn default() -> Self {
		Self {
			color_ramp: "jet_r".into(),
			flow_color: None,
			label_color: black(),
			title_color: black(),
			label_font_size: 20.0,
			title_font_size: 20.0,
			node_sizes: NodeSizeSetting::Flag(false),
			sort_flows_by_node_position: false,
			block_order: BlockOrder::FirstOccurrence,
			layout: LayoutConfig::default(),
		}
	}
}

fn optional_color(value: &Option<String>) -> SankeyResult<Option<Color>> {
	match value.as_deref().map(str::trim) {
		None => Ok(None),
		Some(text) if text.eq_ignore_ascii_case("none") => Ok(None),
		Some(text) => text.parse().map(Some),
	}
}

impl SankeySettings {
	/// Decodes settings from JSON and validates them.
	pub fn from_json(text: &str) -> SankeyResult<SankeyOptions> {
		serde_json::from_str::<Self>(text)?.into_options()
	}

	/// Resolves names, colors and templates into validated options.
	pub fn into_options(self) -> SankeyResult<SankeyOptions> {
		let options = SankeyOptions {
			color_ramp: ramp_by_name(&self.color_ramp)?,
			flow_color: optional_color(&self.flow_color)?,
			label_color: optional_color(&self.label_color)?,
			title_color: optional_color(&self.title_color)?,
			label_font_size: self.label_font_size,
			title_font_size: self.title_font_size,
			node_sizes: self.node_sizes.resolve()?,
			sort_flows_by_node_position: self.sort_flows_by_node_position,
			block_order: self.block_order,
			layout: self.layout,
		};
		options.validate()?;
		Ok(options)
	}
}
