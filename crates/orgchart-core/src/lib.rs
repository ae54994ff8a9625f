#![forbid(unsafe_code)]

//! Org chart hierarchy model (headless).
//!
//! Design goals:
//! - one authoritative child list per node, with expansion tracked as a per-node state
//! - deterministic, testable state transitions (no rendering surface required)
//! - typed configuration with a documented default for every key

pub mod color;
pub mod error;
pub mod expansion;
pub mod import;
pub mod model;
mod navigate;
pub mod search;
pub mod settings;

pub use error::{Error, Result};
pub use expansion::ForcedExpansion;
pub use import::{FlatEmployee, RootHint};
pub use model::{Employee, ExpansionState, NodeId, OrgTree, Point, TreeNode};
pub use search::{
    DebounceInput, SearchDebouncer, SearchHit, SearchIndex, SearchOptions, is_searchable,
};
pub use settings::{ChartSettings, CollapseLevel, NodeColors, PrintOrientation, PrintSize};
