//! RustKit Grid Smoke Harness
//!
//! Loads a JSON grid description, runs a full layout pass against the
//! requested container size and prints the resolved tracks and child
//! rectangles as JSON. Optionally translates a logical column through a set
//! of realized column ranges, the way a virtualizing host would.

use rustkit_grid::{GridDefinition, GridError, RealizedColumns, Size, Track};
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Parse command line arguments
struct Args {
    grid_file: Option<String>,
    width: f64,
    height: f64,
    realized: Option<String>,
    column: Option<usize>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut grid_file = None;
        let mut width = 800.0;
        let mut height = 600.0;
        let mut realized = None;
        let mut column = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--grid" => {
                    grid_file = args.next();
                }
                "--width" => {
                    if let Some(val) = args.next() {
                        width = val.parse().unwrap_or(800.0);
                    }
                }
                "--height" => {
                    if let Some(val) = args.next() {
                        height = val.parse().unwrap_or(600.0);
                    }
                }
                "--realized" => {
                    realized = args.next();
                }
                "--column" => {
                    column = args.next().and_then(|val| val.parse().ok());
                }
                other => {
                    warn!(arg = other, "ignoring unknown argument");
                }
            }
        }

        Self {
            grid_file,
            width,
            height,
            realized,
            column,
        }
    }
}

/// Parse `a-b,c,d-e` into the set of realized logical column indices.
fn parse_realized(ranges: &str) -> Vec<usize> {
    let mut indices = Vec::new();
    for part in ranges.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (start.trim().parse::<usize>(), end.trim().parse::<usize>()),
            None => (part.parse::<usize>(), part.parse::<usize>()),
        };
        match (start, end) {
            (Ok(start), Ok(end)) if start <= end => indices.extend(start..=end),
            _ => warn!(range = part, "skipping malformed realized range"),
        }
    }
    indices
}

fn tracks_json(tracks: &[Track]) -> Value {
    tracks
        .iter()
        .map(|t| {
            json!({
                "mode": format!("{:?}", t.mode),
                "offset": t.actual_offset,
                "size": t.actual_size,
            })
        })
        .collect()
}

fn run(args: &Args) -> Result<Value, GridError> {
    let definition = match &args.grid_file {
        Some(path) => {
            info!(?path, "Loading grid description");
            GridDefinition::from_json(&std::fs::read_to_string(path)?)?
        }
        None => {
            info!("No --grid given, using an empty grid");
            GridDefinition::default()
        }
    };

    let mut grid = definition.build();
    let desired = grid.measure(Size::new(args.width, args.height));
    let rects = grid.arrange();

    let (lookups, hits, stores) = grid.span_cache().stats();
    info!(
        columns = grid.column_count(),
        rows = grid.row_count(),
        children = rects.len(),
        lookups,
        hits,
        stores,
        "Layout complete"
    );

    let mut output = json!({
        "available": { "width": args.width, "height": args.height },
        "desired": { "width": desired.width, "height": desired.height },
        "columns": tracks_json(grid.columns()),
        "rows": tracks_json(grid.rows()),
        "children": rects
            .iter()
            .map(|r| {
                json!({
                    "x": r.x,
                    "y": r.y,
                    "width": r.width,
                    "height": r.height,
                    "right": r.right(),
                    "bottom": r.bottom(),
                })
            })
            .collect::<Vec<_>>(),
    });

    if let Some(ranges) = &args.realized {
        let realized = RealizedColumns::from_indices(parse_realized(ranges));
        let blocks: Vec<Value> = realized
            .blocks()
            .iter()
            .map(|b| json!([b.start_index, b.end_index, b.start_index_offset]))
            .collect();
        output["realized"] = json!({
            "blocks": blocks,
            "count": realized.realized_count(),
        });

        if let Some(column) = args.column {
            let position = realized.translate_logical_to_realized(column);
            info!(column, ?position, "Translated logical column");
            output["realized"]["translation"] = json!({
                "column": column,
                "position": position,
            });
        }
    }

    Ok(output)
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(
        width = args.width,
        height = args.height,
        "Starting RustKit grid smoke run"
    );

    match run(&args) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize layout: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Grid smoke run failed: {}", e);
            std::process::exit(1);
        }
    }
}
