//! One loaded chart: tree, settings, live render state and viewport, owned together.
//!
//! Every operation runs synchronously on the caller's thread. Mutating operations end with
//! a diff pass whose transitions are handed to the session's [`Animator`]; the caller drives
//! time with [`Session::tick`].

use crate::service::DataService;
use crate::{ChartError, Result};
use chrono::NaiveDate;
use orgchart_core::{
    ChartSettings, CollapseLevel, DebounceInput, Employee, ExpansionState, NodeId, OrgTree,
    SearchDebouncer, SearchHit, is_searchable,
};
use orgchart_render::{
    Animator, DiffRenderer, ExportMode, Exporter, LayoutConfig, Orientation, PrintFrame,
    RenderDiff, Scene, SceneOptions, Transform, TreeLayout, Viewport, write_scene,
};
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Shown in place of the chart when the hierarchy cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading data. Please refresh the page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed { message: String },
}

/// Outcome of bringing a search result into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The path was forced open, the view re-rendered and centred on the target.
    Revealed(NodeId),
    /// Auto-expansion is off and the target was already on screen.
    Highlighted(NodeId),
    /// Auto-expansion is off and the target is hidden under a collapsed manager.
    NotVisible(NodeId),
    /// No such employee.
    Miss,
}

pub struct Session<S> {
    service: S,
    state: LoadState,
    tree: Option<OrgTree>,
    settings: ChartSettings,
    orientation: Orientation,
    renderer: DiffRenderer,
    animator: Animator,
    viewport: Viewport,
    exporter: Exporter,
    debouncer: SearchDebouncer,
    results: Vec<SearchHit>,
    highlighted: Option<NodeId>,
    selected: Option<Employee>,
}

impl<S: DataService> Session<S> {
    /// An empty session in [`LoadState::Loading`] over a `width` x `height` viewport.
    pub fn new(service: S, width: f64, height: f64) -> Self {
        Self::with_config(service, width, height, LayoutConfig::default())
    }

    pub fn with_config(service: S, width: f64, height: f64, config: LayoutConfig) -> Self {
        Self {
            service,
            state: LoadState::Loading,
            tree: None,
            settings: ChartSettings::default(),
            orientation: Orientation::default(),
            renderer: DiffRenderer::new(config),
            animator: Animator::default(),
            viewport: Viewport::new(width, height),
            exporter: Exporter::new(config),
            debouncer: SearchDebouncer::default(),
            results: Vec::new(),
            highlighted: None,
            selected: None,
        }
    }

    /// Fetches settings and hierarchy and renders the initial view.
    ///
    /// Settings failures fall back to defaults. A hierarchy failure leaves the session in
    /// [`LoadState::Failed`], where every chart operation is a no-op.
    pub fn load_sync(&mut self) -> &LoadState {
        self.settings = match self.service.fetch_settings() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(%err, "settings unavailable; using defaults");
                ChartSettings::default()
            }
        };

        self.renderer.clear();
        self.animator.clear();
        self.debouncer.cancel();
        self.results.clear();
        self.highlighted = None;
        self.selected = None;
        let (width, height) = self.viewport.size();
        self.viewport = Viewport::new(width, height);

        match self.service.fetch_employees() {
            Ok(root) => {
                let mut tree = OrgTree::build(root);
                tree.apply_initial_collapse(self.settings.collapse_level);
                tracing::info!(
                    employees = tree.len(),
                    collapse_level = %self.settings.collapse_level,
                    "chart loaded"
                );
                self.tree = Some(tree);
                self.state = LoadState::Ready;
                self.update_root();
            }
            Err(err) => {
                tracing::warn!(%err, "hierarchy unavailable");
                self.tree = None;
                self.state = LoadState::Failed {
                    message: LOAD_ERROR_MESSAGE.to_string(),
                };
            }
        }
        &self.state
    }

    pub async fn load(&mut self) -> &LoadState {
        self.load_sync()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn tree(&self) -> Option<&OrgTree> {
        self.tree.as_ref()
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// For direct manipulation (`pan_by`, `zoom_at`, `resize`).
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Layout of the last diff pass.
    pub fn layout(&self) -> Option<&TreeLayout> {
        self.renderer.current_layout()
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    /// The record last picked from the search results, for the detail panel.
    pub fn selected(&self) -> Option<&Employee> {
        self.selected.as_ref()
    }

    pub fn search_results(&self) -> &[SearchHit] {
        &self.results
    }

    /// Advances node, link and viewport transitions. Returns `true` while anything moves.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let nodes = self.animator.tick(dt);
        let view = self.viewport.tick(dt);
        nodes || view
    }

    fn empty_diff(&self) -> RenderDiff {
        RenderDiff::empty(NodeId::ROOT, self.orientation)
    }

    /// Re-renders with `trigger` as the origin of entering and exiting content.
    /// An id this tree never handed out (stale across a reload, or foreign) renders nothing.
    pub fn update(&mut self, trigger: NodeId) -> RenderDiff {
        let Some(tree) = self.tree.as_mut() else {
            return self.empty_diff();
        };
        if !tree.contains(trigger) {
            tracing::debug!(?trigger, "update trigger is not in the chart");
            return self.empty_diff();
        }
        let diff = self.renderer.update(tree, trigger, self.orientation);
        self.animator.apply(&diff);
        diff
    }

    fn update_root(&mut self) -> RenderDiff {
        self.update(NodeId::ROOT)
    }

    pub fn toggle(&mut self, id: NodeId) -> RenderDiff {
        let Some(tree) = self.tree.as_mut() else {
            return self.empty_diff();
        };
        if !tree.contains(id) {
            tracing::debug!(?id, "toggled node is not in the chart");
            return self.empty_diff();
        }
        if tree.toggle(id) == ExpansionState::Leaf {
            return self.empty_diff();
        }
        self.update(id)
    }

    /// [`Session::toggle`] by employee id; `None` for unknown ids.
    pub fn toggle_employee(&mut self, employee_id: &str) -> Option<RenderDiff> {
        let id = self.tree.as_ref()?.get(employee_id)?;
        Some(self.toggle(id))
    }

    pub fn expand_all(&mut self) -> RenderDiff {
        let Some(tree) = self.tree.as_mut() else {
            return self.empty_diff();
        };
        tree.expand_all();
        self.update_root()
    }

    pub fn collapse_all(&mut self) -> RenderDiff {
        let Some(tree) = self.tree.as_mut() else {
            return self.empty_diff();
        };
        tree.collapse_all();
        self.update_root()
    }

    pub fn expand_to_level(&mut self, level: CollapseLevel) -> RenderDiff {
        let Some(tree) = self.tree.as_mut() else {
            return self.empty_diff();
        };
        tree.expand_to_level(level);
        self.update_root()
    }

    /// Immediate search through the data service. Short queries never reach the service;
    /// service failures are logged and yield no results.
    pub fn search(&mut self, query: &str) -> &[SearchHit] {
        self.results = if !is_searchable(query) || self.tree.is_none() {
            Vec::new()
        } else {
            match self.service.search(query.trim()) {
                Ok(hits) => hits,
                Err(err) => {
                    tracing::warn!(%err, query, "search failed");
                    Vec::new()
                }
            }
        };
        &self.results
    }

    /// A keystroke in the search box. Too-short input clears results and the highlight.
    pub fn search_input(&mut self, query: &str, now: Instant) -> DebounceInput {
        let input = self.debouncer.input(query, now);
        if input == DebounceInput::Cleared {
            self.results.clear();
            self.clear_highlight();
        }
        input
    }

    /// Runs the debounced search once it is due. `None` while nothing fired.
    pub fn poll_search(&mut self, now: Instant) -> Option<&[SearchHit]> {
        let query = self.debouncer.poll(now)?;
        Some(self.search(&query))
    }

    /// Timer callback for the search scheduled under `generation` (see
    /// [`DebounceInput::Scheduled`]). A timer superseded by a later keystroke gets `None`.
    pub fn fire_search(&mut self, generation: u64, now: Instant) -> Option<&[SearchHit]> {
        let query = self.debouncer.fire(generation, now)?;
        Some(self.search(&query))
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Shows the chosen record and brings it into view.
    pub fn select_result(&mut self, employee_id: &str) -> Navigation {
        let Some(employee) = self
            .tree
            .as_ref()
            .and_then(|t| t.search_index().get(employee_id))
            .cloned()
        else {
            tracing::debug!(employee_id, "selected result is not in the chart");
            return Navigation::Miss;
        };
        self.selected = Some(employee);
        self.results.clear();
        self.debouncer.cancel();
        self.expand_to_employee(employee_id)
    }

    /// Opens every manager above `employee_id`, re-renders and centres on the target.
    /// With `searchAutoExpand` off, only highlights a target that is already visible.
    pub fn expand_to_employee(&mut self, employee_id: &str) -> Navigation {
        let Some(tree) = self.tree.as_mut() else {
            return Navigation::Miss;
        };

        if !self.settings.search_auto_expand {
            let Some(target) = tree.get(employee_id) else {
                return Navigation::Miss;
            };
            if !tree.is_visible(target) {
                return Navigation::NotVisible(target);
            }
            self.highlighted = Some(target);
            return Navigation::Highlighted(target);
        }

        let Some(target) = tree.expand_path(employee_id) else {
            return Navigation::Miss;
        };
        self.update_root();
        if let Some(tree) = self.tree.as_ref() {
            self.viewport.center_on(tree.node(target).position);
        }
        self.highlighted = Some(target);
        Navigation::Revealed(target)
    }

    pub fn zoom_in(&mut self) -> Transform {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Transform {
        self.viewport.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> Transform {
        self.viewport.reset_zoom()
    }

    /// Fits the visible nodes. Without a rendered layout the viewport is left as is.
    pub fn fit_to_screen(&mut self) -> Transform {
        let bounds = self
            .renderer
            .current_layout()
            .and_then(|l| l.bounds(self.renderer.config()));
        match bounds {
            Some(b) => self.viewport.fit_to_screen(&b),
            None => self.viewport.target(),
        }
    }

    /// Re-lays the chart in `orientation` and fits it.
    pub fn set_orientation(&mut self, orientation: Orientation) -> RenderDiff {
        self.orientation = orientation;
        let diff = self.update_root();
        if self.tree.is_some() {
            self.fit_to_screen();
        }
        diff
    }

    /// The live chart with every decoration, in layout coordinates.
    pub fn live_scene(&self) -> Result<Scene> {
        let (Some(tree), Some(layout)) = (self.tree.as_ref(), self.renderer.current_layout())
        else {
            return Err(ChartError::NotLoaded);
        };
        let options = SceneOptions::live(&self.settings, self.highlighted);
        Ok(Scene::build(tree, layout, self.renderer.config(), &options)?)
    }

    /// What the screen shows right now: viewport-sized, with the resting viewport transform.
    pub fn live_svg(&self) -> Result<String> {
        let scene = self.live_scene()?;
        let (width, height) = self.viewport.size();
        let mut out = String::new();
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}"><g transform="{}">"#,
            orgchart_render::svg::fmt(width),
            orgchart_render::svg::fmt(height),
            self.viewport.target().to_svg()
        );
        write_scene(&mut out, &scene);
        out.push_str("</g></svg>\n");
        Ok(out)
    }

    /// Standalone SVG of the chart, padded and on white, unaffected by the viewport.
    ///
    /// [`ExportMode::FullExpand`] opens every node for the snapshot only; the live tree
    /// keeps its collapse state and is re-rendered afterwards.
    pub fn export(&mut self, mode: ExportMode) -> Result<String> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(ChartError::NotLoaded);
        };
        let scene = self.exporter.scene(
            tree,
            self.renderer.current_layout(),
            self.orientation,
            mode,
            &self.settings,
        )?;
        let svg = self.exporter.export_svg(&scene);
        if mode == ExportMode::FullExpand {
            self.update_root();
        }
        tracing::info!(?mode, nodes = scene.nodes.len(), "exported chart");
        Ok(svg)
    }

    /// Page-sized SVG of the visible chart for the configured paper.
    pub fn print(&self) -> Result<(PrintFrame, String)> {
        let Some(tree) = self.tree.as_ref() else {
            return Err(ChartError::NotLoaded);
        };
        let scene = self
            .exporter
            .print_scene(tree, self.orientation, &self.settings)?;
        Ok(self.exporter.print_svg(&scene, &self.settings))
    }
}

/// `org-chart-YYYY-MM-DD.<extension>`.
pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!("org-chart-{}.{extension}", date.format("%Y-%m-%d"))
}

/// [`export_file_name`] for the local date.
pub fn export_file_name_today(extension: &str) -> String {
    export_file_name(chrono::Local::now().date_naive(), extension)
}
