use futures::executor::block_on;
use orgchart::import::assemble;
use orgchart::raster::{RasterError, RasterOptions, svg_to_pdf, svg_to_png};
use orgchart::render::{Bounds, ExportMode, LayoutLink, LayoutNode, Orientation};
use orgchart::{
    CollapseLevel, DataService, FileDataService, FlatEmployee, LoadState, Navigation, RootHint,
    Session, StaticDataService, export_file_name_today,
};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Data(orgchart::Error),
    Chart(orgchart::ChartError),
    Raster(RasterError),
    Json(serde_json::Error),
    Load(String),
    UnknownEmployee(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Data(err) => write!(f, "{err}"),
            CliError::Chart(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Load(msg) => write!(f, "{msg}"),
            CliError::UnknownEmployee(id) => write!(f, "No employee with id `{id}`"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<orgchart::Error> for CliError {
    fn from(value: orgchart::Error) -> Self {
        Self::Data(value)
    }
}

impl From<orgchart::ChartError> for CliError {
    fn from(value: orgchart::ChartError) -> Self {
        Self::Chart(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Render,
    Print,
    Search,
    Import,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    settings: Option<String>,
    pretty: bool,
    verbose: bool,
    format: OutputFormat,
    full: bool,
    live: bool,
    orientation: Orientation,
    collapse_level: Option<CollapseLevel>,
    expand_all: bool,
    expand_to: Option<String>,
    query: Option<String>,
    root_id: Option<String>,
    root_email: Option<String>,
    viewport_width: f64,
    viewport_height: f64,
    out: Option<String>,
}

fn usage() -> &'static str {
    "orgchart-cli\n\
\n\
USAGE:\n\
  orgchart-cli [layout] [--pretty] [--orientation vertical|horizontal] [--collapse-level <n>|all] [--expand-all] [--expand-to <id>] [--settings <path>] <dir|path>\n\
  orgchart-cli render [--format svg|png|pdf] [--full] [--live] [--orientation vertical|horizontal] [--collapse-level <n>|all] [--expand-all] [--expand-to <id>] [--viewport-width <w>] [--viewport-height <h>] [--settings <path>] [--out <path>] <dir|path>\n\
  orgchart-cli print [--format svg|pdf] [--orientation vertical|horizontal] [--collapse-level <n>|all] [--expand-to <id>] [--settings <path>] [--out <path>] <dir|path>\n\
  orgchart-cli search --query <text> [--pretty] <dir|path>\n\
  orgchart-cli import [--root-id <id>] [--root-email <email>] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - <dir> holds employees.json and optionally settings.json; <path> is a single hierarchy file.\n\
  - render and print write SVG to stdout by default; use --out to write a file.\n\
  - PNG and PDF output defaults to ./org-chart-YYYY-MM-DD.<ext>.\n\
  - --full exports every employee regardless of the collapse state.\n\
  - import turns a flat JSON array of records with managerId into the nested hierarchy.\n\
  - --verbose logs debug output to stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        viewport_width: 1200.0,
        viewport_height: 800.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "print" => args.command = Command::Print,
            "search" => args.command = Command::Search,
            "import" => args.command = Command::Import,
            "--pretty" => args.pretty = true,
            "--verbose" | "-v" => args.verbose = true,
            "--full" => args.full = true,
            "--live" => args.live = true,
            "--expand-all" => args.expand_all = true,
            "--format" => {
                args.format = next_value(&mut it)?
                    .parse::<OutputFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--orientation" => {
                args.orientation = next_value(&mut it)?
                    .parse::<Orientation>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--collapse-level" => {
                let level = CollapseLevel::parse(next_value(&mut it)?)
                    .ok_or(CliError::Usage(usage()))?;
                args.collapse_level = Some(level);
            }
            "--expand-to" => args.expand_to = Some(next_value(&mut it)?.clone()),
            "--query" | "-q" => args.query = Some(next_value(&mut it)?.clone()),
            "--settings" => args.settings = Some(next_value(&mut it)?.clone()),
            "--root-id" => args.root_id = Some(next_value(&mut it)?.clone()),
            "--root-email" => args.root_email = Some(next_value(&mut it)?.clone()),
            "--out" | "-o" => args.out = Some(next_value(&mut it)?.clone()),
            "--viewport-width" => {
                args.viewport_width = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--viewport-height" => {
                args.viewport_height = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    let viewport_ok = |v: f64| v.is_finite() && v > 0.0;
    if !(viewport_ok(args.viewport_width) && viewport_ok(args.viewport_height)) {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Search) && args.query.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Print) && args.format == OutputFormat::Png {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => Ok(std::fs::write(path, text)?),
    }
}

fn write_bytes(bytes: &[u8], out: Option<&str>, format: OutputFormat) -> Result<(), CliError> {
    let path = out
        .map(str::to_string)
        .unwrap_or_else(|| export_file_name_today(format.extension()));
    if path == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path, bytes = bytes.len(), "wrote output");
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    title: &'a str,
    orientation: Orientation,
    bounds: Option<Bounds>,
    nodes: &'a [LayoutNode],
    links: &'a [LayoutLink],
}

/// Reads a single hierarchy file, plus an optional settings file, into memory.
fn static_service(path: &Path, settings: Option<&str>) -> Result<StaticDataService, CliError> {
    let mut service = StaticDataService::new(std::fs::read_to_string(path)?);
    if let Some(settings) = settings {
        service = service.with_settings(std::fs::read_to_string(settings)?);
    }
    Ok(service)
}

fn run(args: Args) -> Result<(), CliError> {
    if let Command::Import = args.command {
        return run_import(&args);
    }

    let Some(input) = args.input.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let path = PathBuf::from(input);
    if path.is_dir() {
        if args.settings.is_some() {
            return Err(CliError::Usage(usage()));
        }
        run_session(FileDataService::new(path), &args)
    } else {
        run_session(static_service(&path, args.settings.as_deref())?, &args)
    }
}

fn run_import(args: &Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let records: Vec<FlatEmployee> = serde_json::from_str(&text)?;
    let hint = RootHint {
        id: args.root_id.clone(),
        email: args.root_email.clone(),
    };
    let root = assemble(&records, &hint)?;
    write_json(&root, args.pretty)
}

fn run_session<S: DataService>(service: S, args: &Args) -> Result<(), CliError> {
    if let Command::Search = args.command {
        let query = args.query.as_deref().unwrap_or_default();
        let hits = service.search(query)?;
        return write_json(&hits, args.pretty);
    }

    let mut session = Session::new(service, args.viewport_width, args.viewport_height);
    if let LoadState::Failed { message } = block_on(session.load()) {
        return Err(CliError::Load(message.clone()));
    }

    if args.orientation != session.orientation() {
        session.set_orientation(args.orientation);
    }
    if let Some(level) = args.collapse_level {
        session.expand_to_level(level);
    }
    if args.expand_all {
        session.expand_all();
    }
    if let Some(id) = args.expand_to.as_deref() {
        if session.expand_to_employee(id) == Navigation::Miss {
            return Err(CliError::UnknownEmployee(id.to_string()));
        }
    }

    match args.command {
        Command::Layout => {
            let Some(layout) = session.layout() else {
                return Err(CliError::Chart(orgchart::ChartError::NotLoaded));
            };
            let out = LayoutOut {
                title: &session.settings().chart_title,
                orientation: layout.orientation,
                bounds: layout.bounds(&orgchart::render::LayoutConfig::default()),
                nodes: &layout.nodes,
                links: &layout.links,
            };
            write_json(&out, args.pretty)
        }
        Command::Render => {
            let svg = if args.live {
                session.fit_to_screen();
                session.viewport_mut().finish();
                session.live_svg()?
            } else {
                let mode = if args.full {
                    ExportMode::FullExpand
                } else {
                    ExportMode::VisibleOnly
                };
                session.export(mode)?
            };
            match args.format {
                OutputFormat::Svg => write_text(&svg, args.out.as_deref()),
                OutputFormat::Png => {
                    let bytes = svg_to_png(&svg, &RasterOptions::default())?;
                    write_bytes(&bytes, args.out.as_deref(), args.format)
                }
                OutputFormat::Pdf => {
                    let bytes = svg_to_pdf(&svg)?;
                    write_bytes(&bytes, args.out.as_deref(), args.format)
                }
            }
        }
        Command::Print => {
            let (_, svg) = session.print()?;
            match args.format {
                OutputFormat::Pdf => {
                    let bytes = svg_to_pdf(&svg)?;
                    write_bytes(&bytes, args.out.as_deref(), args.format)
                }
                _ => write_text(&svg, args.out.as_deref()),
            }
        }
        Command::Search | Command::Import => Ok(()),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
