// ============================================================================
// atlas-edit CLI — headless grid slicing, cell editing, and atlas export
// ============================================================================
//
// Usage examples:
//   atlas-edit -i sheet.png --rows 4 --cols 4 -o atlas.png
//   atlas-edit -i sheet.png --cell-width 20 --cell-height 20 --describe
//   atlas-edit -i sheet.png --rows 4 --cols 4 --op 0:erase --op 1:rotate:90 -o out.png
//   atlas-edit -i sheet.png --rows 2 --cols 2 --cells-dir cells/
//   atlas-edit -i photo.webp -o photo.png          (no grid: re-encode as PNG)
//
// All processing runs synchronously on the current thread against an
// in-process store; nothing persists beyond the invocation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::service::{self, OpRequest, SliceRequest};
use crate::store::ImageStore;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// atlas-edit headless grid editor.
///
/// Slice an image into a grid of cells, apply per-cell edits, and export the
/// reassembled atlas, all without a server.
#[derive(Parser, Debug)]
#[command(
    name = "atlas-edit",
    about = "Headless sprite-grid editor and atlas exporter",
    long_about = "Slice an image into a rectangular grid of equal cells, apply per-cell\n\
                  edits (erase, rotate by a multiple of 90°), and export either single\n\
                  cells or the full reassembled atlas as PNG.\n\n\
                  Example:\n  \
                  atlas-edit -i sheet.png --rows 4 --cols 4 --op 0:erase -o atlas.png"
)]
pub struct CliArgs {
    /// Input image file (any format the decoder supports).
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Number of grid rows. Requires --cols.
    #[arg(long)]
    pub rows: Option<u32>,

    /// Number of grid columns. Requires --rows.
    #[arg(long)]
    pub cols: Option<u32>,

    /// Cell width in pixels. Requires --cell-height.
    #[arg(long)]
    pub cell_width: Option<u32>,

    /// Cell height in pixels. Requires --cell-width.
    #[arg(long)]
    pub cell_height: Option<u32>,

    /// Cell operation, repeatable, applied in order.
    /// Format: "CELL:erase" or "CELL:rotate:DEG" with DEG in {90, 180, 270}.
    #[arg(long, value_name = "SPEC")]
    pub op: Vec<String>,

    /// Undo the most recent operation on a cell, repeatable, applied after
    /// all --op specs.
    #[arg(long, value_name = "CELL")]
    pub undo: Vec<usize>,

    /// Output PNG path. With a grid this is the exported atlas (or one cell
    /// when --cell is given); without a grid, the re-encoded input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Render only this cell index to --output instead of the full atlas.
    #[arg(long, value_name = "CELL")]
    pub cell: Option<usize>,

    /// Directory to write every cell as cell_<id>.png.
    #[arg(long, value_name = "DIR")]
    pub cells_dir: Option<PathBuf>,

    /// Print the resolved grid and cell coordinate list as JSON to stdout.
    #[arg(long)]
    pub describe: bool,

    /// Print per-step progress information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    fn slice_request(&self) -> Option<SliceRequest> {
        if self.rows.is_none()
            && self.cols.is_none()
            && self.cell_width.is_none()
            && self.cell_height.is_none()
        {
            return None;
        }
        Some(SliceRequest {
            rows: self.rows,
            cols: self.cols,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
        })
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    match run_inner(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            crate::log_err!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    let store = ImageStore::new();

    // -- Step 1: Load + register -----------------------------------------
    let bytes = std::fs::read(&args.input)
        .map_err(|e| format!("{}: {}", args.input.display(), e))?;
    let info = service::upload(&store, &bytes).map_err(|e| e.to_string())?;
    if args.verbose {
        println!(
            "loaded {} ({}x{}) as {}",
            args.input.display(),
            info.width,
            info.height,
            info.id
        );
    }

    // -- Step 2: Slice (optional) ----------------------------------------
    let sliced = match args.slice_request() {
        Some(request) => {
            let sliced = service::slice(&store, info.id, request).map_err(|e| e.to_string())?;
            if args.verbose {
                println!(
                    "grid: {} rows x {} cols, cells {}x{}",
                    sliced.rows, sliced.cols, sliced.cell_width, sliced.cell_height
                );
            }
            Some(sliced)
        }
        None => {
            let grid_dependent = !args.op.is_empty()
                || !args.undo.is_empty()
                || args.cell.is_some()
                || args.cells_dir.is_some()
                || args.describe;
            if grid_dependent {
                return Err(
                    "grid-dependent flags require --rows/--cols or --cell-width/--cell-height"
                        .to_string(),
                );
            }
            None
        }
    };

    if args.describe
        && let Some(sliced) = &sliced
    {
        match serde_json::to_string_pretty(sliced) {
            Ok(json) => println!("{}", json),
            Err(e) => crate::log_warn!("could not serialize grid description: {}", e),
        }
    }

    // -- Step 3: Apply edits ---------------------------------------------
    for spec in &args.op {
        let (cell, request) = parse_op_spec(spec)?;
        service::apply_op(&store, info.id, cell, request).map_err(|e| e.to_string())?;
        if args.verbose {
            println!("applied {} to cell {}", spec, cell);
        }
    }
    for &cell in &args.undo {
        let outcome = service::undo_op(&store, info.id, cell);
        if args.verbose {
            println!(
                "undo cell {}: {}",
                cell,
                if outcome.undone { "undone" } else { "nothing to undo" }
            );
        }
    }

    // -- Step 4: Write outputs -------------------------------------------
    if let Some(dir) = &args.cells_dir {
        let sliced = sliced.as_ref().ok_or_else(|| "no grid".to_string())?;
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("{}: {}", dir.display(), e))?;
        for cell in &sliced.cells {
            let png = service::cell_preview(&store, info.id, cell.cell_id)
                .map_err(|e| e.to_string())?;
            let path = dir.join(format!("cell_{}.png", cell.cell_id));
            write_bytes(&path, &png)?;
        }
        if args.verbose {
            println!("wrote {} cells to {}", sliced.cells.len(), dir.display());
        }
    }

    if let Some(output) = &args.output {
        let png = match (args.cell, &sliced) {
            (Some(cell), Some(_)) => service::cell_preview(&store, info.id, cell),
            (None, Some(_)) => service::export_atlas(&store, info.id),
            // No grid: plain re-encode of the stored RGBA image.
            (_, None) => service::preview(&store, info.id),
        }
        .map_err(|e| e.to_string())?;
        write_bytes(output, &png)?;
        if args.verbose {
            println!("wrote {}", output.display());
        }
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse an `--op` spec: "CELL:erase" or "CELL:rotate:DEG".
fn parse_op_spec(spec: &str) -> Result<(usize, OpRequest), String> {
    let mut parts = spec.splitn(3, ':');
    let cell = parts
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| bad_spec(spec))?;
    let kind = parts.next().ok_or_else(|| bad_spec(spec))?;
    let degree = match parts.next() {
        Some(d) => Some(d.parse::<u16>().map_err(|_| bad_spec(spec))?),
        None => None,
    };
    Ok((
        cell,
        OpRequest {
            kind: kind.to_string(),
            degree,
        },
    ))
}

fn bad_spec(spec: &str) -> String {
    format!(
        "bad op spec '{}': expected CELL:erase or CELL:rotate:DEG",
        spec
    )
}

fn write_bytes(path: &std::path::Path, bytes: &[u8]) -> Result<(), String> {
    std::fs::write(path, bytes).map_err(|e| format!("{}: {}", path.display(), e))
}
