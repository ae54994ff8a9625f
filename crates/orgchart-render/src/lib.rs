#![forbid(unsafe_code)]

//! Layout, diffing and export for the org chart (headless).
//!
//! Nothing here draws. The layout engine produces positions, the diff renderer turns two
//! consecutive layouts into keyed enter/update/exit transitions, and the export module
//! emits self-contained SVG documents.

pub mod animate;
pub mod diff;
pub mod export;
pub mod layout;
pub mod link;
pub mod model;
pub mod scene;
pub mod svg;
pub mod viewport;

pub use animate::{Animator, Frame, Lerp};
pub use diff::{DiffRenderer, KeyPartition, LinkTransition, NodeTransition, RenderDiff};
pub use export::{ExportMode, Exporter, PrintFrame, write_scene};
pub use layout::compute_layout;
pub use link::ElbowPath;
pub use model::{Bounds, LayoutConfig, LayoutLink, LayoutNode, Orientation, TreeLayout};
pub use scene::{NodeDecoration, Scene, SceneLink, SceneNode, SceneOptions, TextStyle};
pub use viewport::{Transform, Viewport};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nothing to render: the scene has no nodes")]
    EmptyScene,
    #[error(transparent)]
    Core(#[from] orgchart_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
