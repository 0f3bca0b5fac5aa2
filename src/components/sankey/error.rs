//! Errors raised while validating input and options.

use thiserror::Error;

/// Everything that can stop a diagram from being laid out.
///
/// Input problems and configuration problems are both reported before any
/// shape reaches the drawing surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SankeyError {
	/// The table needs a weight column plus at least two stage columns.
	#[error("expected at least 3 columns (weight and two stages), found {0}")]
	TooFewColumns(usize),

	/// The table has no rows at all.
	#[error("the dataset has no rows")]
	EmptyDataset,

	/// A row does not have as many cells as the header.
	#[error("row {row} has {found} columns, expected {expected}")]
	RaggedRow {
		/// Zero-based row index.
		row: usize,
		/// Number of cells the row actually has.
		found: usize,
		/// Number of columns in the table.
		expected: usize,
	},

	/// The weight cell is not a finite number.
	#[error("row {row}: weight {value:?} is not a finite number")]
	NonNumericWeight {
		/// Zero-based row index.
		row: usize,
		/// The offending cell, as text.
		value: String,
	},

	/// A flow cannot carry a negative weight.
	#[error("row {row}: weight {weight} is negative")]
	NegativeWeight {
		/// Zero-based row index.
		row: usize,
		/// The offending weight.
		weight: f64,
	},

	/// Weights must add up to something positive for sizes to be defined.
	#[error("total weight must be positive, found {0}")]
	NonPositiveTotal(f64),

	/// An option holds a value outside its accepted range.
	#[error("invalid `{option}` option: {reason}")]
	InvalidOption {
		/// Option name.
		option: &'static str,
		/// What is wrong with it.
		reason: String,
	},

	/// No built-in color ramp has this name.
	#[error("unknown color ramp {0:?}")]
	UnknownColorRamp(String),

	/// The text cannot be read as a color.
	#[error("cannot parse {0:?} as a color")]
	InvalidColor(String),

	/// The node-size template uses an unsupported placeholder.
	#[error("invalid node size template {template:?}: {reason}")]
	InvalidTemplate {
		/// The template as given.
		template: String,
		/// What is wrong with it.
		reason: String,
	},

	/// Settings could not be decoded (unknown key or mismatched type).
	#[error("invalid settings: {0}")]
	Settings(String),
}

impl SankeyError {
	/// Whether the error is about the shape or content of the data.
	pub fn is_malformed_input(&self) -> bool {
		matches!(
			self,
			Self::TooFewColumns(_)
				| Self::EmptyDataset
				| Self::RaggedRow { .. }
				| Self::NonNumericWeight { .. }
				| Self::NegativeWeight { .. }
				| Self::NonPositiveTotal(_)
		)
	}

	/// Whether the error is about the options the diagram was drawn with.
	pub fn is_configuration(&self) -> bool {
		!self.is_malformed_input()
	}
}

impl From<serde_json::Error> for SankeyError {
	fn from(err: serde_json::Error) -> Self {
		Self::Settings(err.to_string())
	}
}

/// Result alias used throughout the sankey component.
pub type SankeyResult<T> = Result<T, SankeyError>;
