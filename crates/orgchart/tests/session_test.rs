use futures::executor::block_on;
use orgchart::render::{ExportMode, Orientation};
use orgchart::{
    ChartSettings, CollapseLevel, DataService, DebounceInput, Employee, ExpansionState,
    FileDataService, LoadState, Navigation, OrgTree, SearchHit, Session,
};
use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let org = workspace_root().join("fixtures").join("org");
    std::fs::copy(org.join("basic.json"), dir.path().join("employees.json")).expect("copy");
    std::fs::copy(org.join("settings.json"), dir.path().join("settings.json")).expect("copy");
    dir
}

fn loaded(dir: &tempfile::TempDir) -> Session<FileDataService> {
    let mut session = Session::new(FileDataService::new(dir.path()), 1200.0, 800.0);
    assert_eq!(block_on(session.load()), &LoadState::Ready);
    session
}

fn visible(session: &Session<FileDataService>) -> Vec<String> {
    let tree = session.tree().expect("loaded");
    tree.visible_nodes()
        .into_iter()
        .map(|id| tree.node(id).id().to_string())
        .collect()
}

#[test]
fn settings_file_drives_the_initial_view() {
    let dir = fixture_dir();
    let session = loaded(&dir);
    assert_eq!(session.settings().chart_title, "Acme Corp");
    assert_eq!(session.settings().header_subtitle(), "Updates daily @ 7:30 AM");
    assert_eq!(visible(&session), vec!["1", "2", "3"]);
}

#[test]
fn missing_settings_fall_back_to_defaults() {
    let dir = fixture_dir();
    std::fs::remove_file(dir.path().join("settings.json")).expect("remove");
    let session = loaded(&dir);
    assert_eq!(session.settings().chart_title, "Organization Chart");
    assert_eq!(session.settings().collapse_level, CollapseLevel::Level(2));
}

#[test]
fn missing_hierarchy_fails_softly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new(FileDataService::new(dir.path()), 1200.0, 800.0);
    assert!(matches!(session.load_sync(), LoadState::Failed { .. }));
    assert!(session.collapse_all().entered.is_empty());
    assert!(session.print().is_err());
}

#[test]
fn search_then_select_opens_the_path() {
    let dir = fixture_dir();
    let mut session = loaded(&dir);
    let hits: Vec<String> = session.search("frank").iter().map(|h| h.id.clone()).collect();
    assert_eq!(hits, vec!["42"]);

    let nav = session.select_result("42");
    assert!(matches!(nav, Navigation::Revealed(_)));
    assert_eq!(session.selected().map(|e| e.name.as_str()), Some("Frank Moore"));
    assert!(session.search_results().is_empty());
    assert_eq!(visible(&session), vec!["1", "2", "4", "42", "43", "5", "3"]);

    assert_eq!(session.select_result("999"), Navigation::Miss);
}

#[test]
fn toggles_animate_and_settle() {
    let dir = fixture_dir();
    let mut session = loaded(&dir);
    while session.tick(Duration::from_millis(100)) {}

    let diff = session.toggle_employee("3").expect("carol");
    assert_eq!(diff.entered.len(), 1);
    assert_eq!(
        session.tree().and_then(|t| t.node_by_employee("3")).map(|n| n.state),
        Some(ExpansionState::Expanded)
    );
    assert!(session.tick(Duration::from_millis(250)));
    assert!(!session.tick(Duration::from_millis(250)));

    let again = session.toggle_employee("3").expect("carol");
    assert_eq!(again.exited.len(), 1);
    assert!(session.toggle_employee("nobody").is_none());
}

#[test]
fn orientation_switch_refits_the_chart() {
    let dir = fixture_dir();
    let mut session = loaded(&dir);
    let diff = session.set_orientation(Orientation::Horizontal);
    assert!(diff.is_stable());
    assert!(session.viewport().is_animating());
    let carol = diff.layout.node("3").expect("carol");
    assert_eq!((carol.x, carol.y), (240.0, 60.0));
}

#[test]
fn exports_are_independent_of_the_viewport() {
    let dir = fixture_dir();
    let mut session = loaded(&dir);
    session.zoom_in();
    session.viewport_mut().pan_by(300.0, -50.0);

    let visible_svg = session.export(ExportMode::VisibleOnly).expect("export");
    assert!(!visible_svg.contains("Dana Lee"));
    let full_svg = session.export(ExportMode::FullExpand).expect("export");
    assert!(full_svg.contains("Dana Lee"));
    assert!(!full_svg.contains("scale("));
    assert_eq!(visible(&session), vec!["1", "2", "3"]);

    let (frame, print_svg) = session.print().expect("print");
    assert_eq!((frame.page_width, frame.page_height), (816.0, 1056.0));
    assert!(print_svg.contains("<title>Acme Corp</title>"));
}

#[test]
fn file_service_search_is_capped_at_ten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reports: Vec<String> = (0..15)
        .map(|i| format!(r#"{{"id":"e{i}","name":"Engineer {i}","title":"Engineer"}}"#))
        .collect();
    let doc = format!(
        r#"{{"id":"root","name":"Root","title":"CEO","children":[{}]}}"#,
        reports.join(",")
    );
    std::fs::write(dir.path().join("employees.json"), doc).expect("write");
    let service = FileDataService::new(dir.path());
    assert_eq!(service.search("engineer").expect("search").len(), 10);
}

/// In-memory service that records how often the search endpoint is hit.
struct CountingService {
    root: Employee,
    searches: Cell<usize>,
}

impl CountingService {
    fn new() -> Self {
        Self {
            root: Employee::new("1", "Alice Smith", "CEO"),
            searches: Cell::new(0),
        }
    }
}

impl DataService for CountingService {
    fn fetch_employees(&self) -> Result<Employee, orgchart::Error> {
        Ok(self.root.clone())
    }

    fn fetch_settings(&self) -> Result<ChartSettings, orgchart::Error> {
        Ok(ChartSettings::default())
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>, orgchart::Error> {
        self.searches.set(self.searches.get() + 1);
        let name = self.root.name.to_lowercase();
        Ok(if name.contains(&query.to_lowercase()) {
            vec![SearchHit::from(&self.root)]
        } else {
            Vec::new()
        })
    }
}

#[test]
fn single_character_queries_never_reach_the_service() {
    let mut session = Session::new(CountingService::new(), 1200.0, 800.0);
    assert_eq!(session.load_sync(), &LoadState::Ready);

    assert!(session.search("a").is_empty());
    let t0 = Instant::now();
    assert_eq!(session.search_input("a", t0), DebounceInput::Cleared);
    assert!(session.poll_search(t0 + Duration::from_secs(1)).is_none());
    assert_eq!(session.service().searches.get(), 0);

    let hits: Vec<String> = session.search("ali").iter().map(|h| h.id.clone()).collect();
    assert_eq!(hits, vec!["1"]);
    assert_eq!(session.service().searches.get(), 1);
}

#[test]
fn superseded_search_timer_does_not_hit_the_service() {
    let mut session = Session::new(CountingService::new(), 1200.0, 800.0);
    session.load_sync();
    let t0 = Instant::now();
    let DebounceInput::Scheduled { generation: stale, .. } = session.search_input("al", t0)
    else {
        panic!("expected a scheduled search");
    };
    let DebounceInput::Scheduled {
        generation: current,
        deadline,
    } = session.search_input("ali", t0 + Duration::from_millis(100))
    else {
        panic!("expected a scheduled search");
    };

    assert!(session.fire_search(stale, deadline).is_none());
    assert_eq!(session.service().searches.get(), 0);
    assert_eq!(session.fire_search(current, deadline).map(<[SearchHit]>::len), Some(1));
    assert_eq!(session.service().searches.get(), 1);
}

#[test]
fn ids_from_another_tree_are_ignored() {
    let dir = fixture_dir();
    let mut session = loaded(&dir);
    let before = session.tree().expect("loaded").states();

    let mut reports: Vec<Employee> = (0..20)
        .map(|i| Employee::new(format!("x{i}"), format!("Extra {i}"), "IC"))
        .collect();
    reports.push(Employee::new("far", "Far Away", "IC"));
    let other = OrgTree::build(Employee::new("root", "Root", "CEO").with_children(reports));
    let foreign = other.get("far").expect("far");

    assert!(session.toggle(foreign).layout.nodes.is_empty());
    assert!(session.update(foreign).layout.nodes.is_empty());
    assert_eq!(session.tree().expect("loaded").states(), before);
}
