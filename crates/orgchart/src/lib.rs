#![forbid(unsafe_code)]

//! `orgchart` renders an organization hierarchy as a collapsible, searchable tree chart,
//! headlessly.
//!
//! The [`Session`] ties the pieces together: it loads data through a [`DataService`],
//! keeps the expansion state, diffs every re-layout into transitions, drives the viewport
//! and produces export/print documents.
//!
//! # Features
//!
//! - `raster`: PNG and PDF output via pure-Rust SVG rasterization/conversion

pub use orgchart_core::*;

pub mod render {
    pub use orgchart_render::*;
}

pub mod service;
pub mod session;

#[cfg(feature = "raster")]
pub mod raster;

pub use service::{DataService, FileDataService, StaticDataService};
pub use session::{
    LOAD_ERROR_MESSAGE, LoadState, Navigation, Session, export_file_name, export_file_name_today,
};

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error(transparent)]
    Core(#[from] orgchart_core::Error),
    #[error(transparent)]
    Render(#[from] orgchart_render::Error),
    #[error("no chart is loaded")]
    NotLoaded,
}

pub type Result<T> = std::result::Result<T, ChartError>;
