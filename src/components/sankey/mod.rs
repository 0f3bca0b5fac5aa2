//! Multi-stage sankey diagrams: layout core and canvas component.
//!
//! Rows of a [`TabularSource`] carry a weight and one category per stage.
//! [`build_scene`] aggregates them into blocks, stacks ribbons between
//! neighbouring stages and returns marks that any [`SankeySurface`] can
//! paint; [`SankeyCanvas`] does the same on an HTML canvas.

mod component;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod palette;
mod render;
mod scale;
pub mod scene;
pub mod surface;
pub mod types;

pub use component::SankeyCanvas;
pub use config::{LayoutConfig, NodeSizeAnnotation, SankeyOptions, SankeySettings};
pub use error::{SankeyError, SankeyResult};
pub use layout::BlockOrder;
pub use palette::{Color, ColorAssignment, ColorRamp};
pub use scene::{Mark, Scene, build_scene, draw_sankey};
pub use surface::{RecordingSurface, SankeySurface};
pub use types::{ColumnTable, FlowRow, FlowTable, TabularSource};
