//! Flow tables and the tabular interface the layout reads from.

use std::collections::{HashMap, HashSet};

use super::error::{SankeyError, SankeyResult};

/// One weighted flow and the category it belongs to at every stage.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRow {
	/// Width of the flow. Zero is allowed, negative weights are rejected
	/// before layout.
	pub weight: f64,
	/// Category label at stage 0, 1, ..., N.
	pub stages: Vec<String>,
}

impl FlowRow {
	/// Builds a row from a weight and its stage labels.
	pub fn new<I, S>(weight: f64, stages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			weight,
			stages: stages.into_iter().map(Into::into).collect(),
		}
	}
}

/// Read access to a weight column followed by category columns.
///
/// Column 0 is always the weight; columns `1..column_count()` hold the
/// category label of each row at successive stages. Layout code only talks
/// to this trait, never to a concrete container.
pub trait TabularSource {
	/// Number of columns, weight column included.
	fn column_count(&self) -> usize;

	/// Number of rows.
	fn row_count(&self) -> usize;

	/// Weight of `row`.
	fn weight(&self, row: usize) -> f64;

	/// Category label of `row` in `column` (`1..column_count()`).
	fn label(&self, row: usize, column: usize) -> &str;

	/// Header of `column`, drawn above the matching stage.
	fn title(&self, column: usize) -> &str;

	/// Number of category columns.
	fn stage_count(&self) -> usize {
		self.column_count().saturating_sub(1)
	}

	/// Sum of the whole weight column.
	fn weight_sum(&self) -> f64 {
		(0..self.row_count()).map(|row| self.weight(row)).sum()
	}

	/// Total weight per label of `column`, in order of first occurrence.
	fn group_and_sum_by(&self, column: usize) -> Vec<(String, f64)> {
		let mut index: HashMap<&str, usize> = HashMap::new();
		let mut totals: Vec<(String, f64)> = Vec::new();
		for row in 0..self.row_count() {
			let label = self.label(row, column);
			match index.get(label) {
				Some(&i) => totals[i].1 += self.weight(row),
				None => {
					index.insert(label, totals.len());
					totals.push((label.to_string(), self.weight(row)));
				}
			}
		}
		totals
	}

	/// Every label of every category column, row by row, without repeats.
	fn distinct_labels(&self) -> Vec<String> {
		let mut seen: HashSet<&str> = HashSet::new();
		let mut labels = Vec::new();
		for row in 0..self.row_count() {
			for column in 1..self.column_count() {
				let label = self.label(row, column);
				if seen.insert(label) {
					labels.push(label.to_string());
				}
			}
		}
		labels
	}
}

fn default_titles(columns: usize) -> Vec<String> {
	(0..columns).map(|c| c.to_string()).collect()
}

/// Row-oriented flow table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowTable {
	titles: Vec<String>,
	rows: Vec<FlowRow>,
}

impl FlowTable {
	/// Builds a table from column titles (weight column first) and rows.
	///
	/// Every row must carry one label per category column.
	pub fn new(titles: Vec<String>, rows: Vec<FlowRow>) -> SankeyResult<Self> {
		let expected = titles.len();
		for (row, flow) in rows.iter().enumerate() {
			let found = flow.stages.len() + 1;
			if found != expected {
				return Err(SankeyError::RaggedRow {
					row,
					found,
					expected,
				});
			}
		}
		Ok(Self { titles, rows })
	}

	/// Builds a table with numbered titles, the way an unlabeled 2-D array
	/// would be read. The first row fixes the column count.
	pub fn from_rows(rows: Vec<FlowRow>) -> SankeyResult<Self> {
		let columns = rows.first().map(|r| r.stages.len() + 1).unwrap_or(0);
		Self::new(default_titles(columns), rows)
	}

	/// Parses text records whose first cell is the weight.
	///
	/// Without a header the titles are numbered from 0.
	pub fn from_records<R, C>(header: Option<Vec<String>>, records: R) -> SankeyResult<Self>
	where
		R: IntoIterator<Item = Vec<C>>,
		C: AsRef<str>,
	{
		let mut rows = Vec::new();
		for (row, record) in records.into_iter().enumerate() {
			let Some((weight, stages)) = record.split_first() else {
				return Err(SankeyError::TooFewColumns(0));
			};
			let weight_text = weight.as_ref().trim();
			let weight = weight_text
				.parse::<f64>()
				.ok()
				.filter(|w| w.is_finite())
				.ok_or_else(|| SankeyError::NonNumericWeight {
					row,
					value: weight_text.to_string(),
				})?;
			rows.push(FlowRow::new(
				weight,
				stages.iter().map(|s| s.as_ref().trim().to_string()),
			));
		}
		match header {
			Some(titles) => Self::new(titles, rows),
			None => Self::from_rows(rows),
		}
	}

	/// Rows in input order.
	pub fn rows(&self) -> &[FlowRow] {
		&self.rows
	}

	/// Column titles, weight column first.
	pub fn titles(&self) -> &[String] {
		&self.titles
	}

	/// A copy of the table with every weight multiplied by `factor`.
	pub fn scaled(&self, factor: f64) -> Self {
		Self {
			titles: self.titles.clone(),
			rows: self
				.rows
				.iter()
				.map(|r| FlowRow {
					weight: r.weight * factor,
					stages: r.stages.clone(),
				})
				.collect(),
		}
	}
}

impl TabularSource for FlowTable {
	fn column_count(&self) -> usize {
		self.titles.len()
	}

	fn row_count(&self) -> usize {
		self.rows.len()
	}

	fn weight(&self, row: usize) -> f64 {
		self.rows[row].weight
	}

	fn label(&self, row: usize, column: usize) -> &str {
		&self.rows[row].stages[column - 1]
	}

	fn title(&self, column: usize) -> &str {
		&self.titles[column]
	}
}

/// Column-oriented flow table: one weight vector and one label vector per
/// stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnTable {
	titles: Vec<String>,
	weights: Vec<f64>,
	stages: Vec<Vec<String>>,
}

impl ColumnTable {
	/// Builds a table from equally long columns. Titles are numbered when
	/// `titles` is `None`.
	pub fn new(
		titles: Option<Vec<String>>,
		weights: Vec<f64>,
		stages: Vec<Vec<String>>,
	) -> SankeyResult<Self> {
		let titles = titles.unwrap_or_else(|| default_titles(stages.len() + 1));
		if titles.len() != stages.len() + 1 {
			return Err(SankeyError::RaggedRow {
				row: 0,
				found: stages.len() + 1,
				expected: titles.len(),
			});
		}
		for column in &stages {
			if column.len() != weights.len() {
				let row = column.len().min(weights.len());
				return Err(SankeyError::RaggedRow {
					row,
					found: usize::from(weights.len() > row)
						+ stages.iter().filter(|c| c.len() > row).count(),
					expected: titles.len(),
				});
			}
		}
		Ok(Self {
			titles,
			weights,
			stages,
		})
	}
}

impl TabularSource for ColumnTable {
	fn column_count(&self) -> usize {
		self.titles.len()
	}

	fn row_count(&self) -> usize {
		self.weights.len()
	}

	fn weight(&self, row: usize) -> f64 {
		self.weights[row]
	}

	fn label(&self, row: usize, column: usize) -> &str {
		&self.stages[column - 1][row]
	}

	fn title(&self, column: usize) -> &str {
		&self.titles[column]
	}
}

/// Checks that `source` can be laid out, before anything is drawn.
pub fn validate_source<S: TabularSource + ?Sized>(source: &S) -> SankeyResult<()> {
	let columns = source.column_count();
	if columns < 3 {
		return Err(SankeyError::TooFewColumns(columns));
	}
	if source.row_count() == 0 {
		return Err(SankeyError::EmptyDataset);
	}
	for row in 0..source.row_count() {
		let weight = source.weight(row);
		if !weight.is_finite() {
			return Err(SankeyError::NonNumericWeight {
				row,
				value: weight.to_string(),
			});
		}
		if weight < 0.0 {
			return Err(SankeyError::NegativeWeight { row, weight });
		}
	}
	let total = source.weight_sum();
	if total <= 0.0 {
		return Err(SankeyError::NonPositiveTotal(total));
	}
	Ok(())
}
