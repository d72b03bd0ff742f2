// ============================================================================
// SERVICE FACADE — the crate's external operations over an explicit store
// ============================================================================
//
// One function per request kind, all taking the store by reference so the
// owning process (CLI today, any transport tomorrow) decides the store's
// lifetime and tests can substitute a fresh one. Encoded bytes cross this
// boundary as PNG only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::grid::{CellInfo, GridRequest, GridSpec};
use crate::ops::{CellOp, Rotation};
use crate::renderer;
use crate::store::ImageStore;
use crate::io;

/// Response to a successful upload.
#[derive(Clone, Copy, Debug)]
pub struct UploadInfo {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
}

/// Open request shape for a slice: either pair may be present.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceRequest {
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub cell_width: Option<u32>,
    pub cell_height: Option<u32>,
}

impl SliceRequest {
    /// Close the open shape into a [`GridRequest`]. Rows/cols win when both
    /// pairs are present; neither pair is `InvalidGridParameters`.
    fn into_grid_request(self) -> Result<GridRequest, Error> {
        if let (Some(rows), Some(cols)) = (self.rows, self.cols) {
            return Ok(GridRequest::RowsCols { rows, cols });
        }
        if let (Some(cell_width), Some(cell_height)) = (self.cell_width, self.cell_height) {
            return Ok(GridRequest::CellSize {
                cell_width,
                cell_height,
            });
        }
        Err(Error::InvalidGridParameters(
            "must provide either rows/cols or cellWidth/cellHeight".to_string(),
        ))
    }
}

/// Response to a successful slice: the resolved grid plus every cell's
/// coordinates in row-major order.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceInfo {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub cells: Vec<CellInfo>,
}

/// Open request shape for a cell operation, validated here before anything
/// reaches a log.
#[derive(Clone, Debug, Deserialize)]
pub struct OpRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub degree: Option<u16>,
}

impl OpRequest {
    fn into_cell_op(self) -> Result<CellOp, Error> {
        match self.kind.as_str() {
            "erase" => Ok(CellOp::Erase),
            "rotate" => {
                let degree = self
                    .degree
                    .ok_or_else(|| Error::InvalidOperation("rotate requires a degree".to_string()))?;
                let rotation = Rotation::from_degrees(degree).ok_or_else(|| {
                    Error::InvalidOperation(format!("invalid rotation degree {}", degree))
                })?;
                Ok(CellOp::Rotate { degree: rotation })
            }
            other => Err(Error::InvalidOperation(format!(
                "unknown operation type '{}'",
                other
            ))),
        }
    }
}

/// Whether an undo removed anything.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct UndoOutcome {
    pub undone: bool,
}

/// Decode uploaded bytes and register the image under a fresh id.
pub fn upload(store: &ImageStore, bytes: &[u8]) -> Result<UploadInfo, Error> {
    let image = io::decode_image(bytes)?;
    let (width, height) = (image.width(), image.height());
    let id = store.store_image(image);
    log_info!("stored image {} ({}x{})", id, width, height);
    Ok(UploadInfo { id, width, height })
}

/// Resolve and install a grid partition for the image, replacing any prior
/// grid (and clearing all per-cell edit history with it).
pub fn slice(store: &ImageStore, id: Uuid, request: SliceRequest) -> Result<SliceInfo, Error> {
    let (width, height) = store.dimensions(id).ok_or(Error::NotFound)?;
    let grid = GridSpec::from_request(width, height, request.into_grid_request()?)?;
    if !store.set_grid(id, grid) {
        // Entry deleted between the dimension read and the grid write.
        return Err(Error::NotFound);
    }
    log_info!(
        "sliced {} into {}x{} cells of {}x{}",
        id,
        grid.rows,
        grid.cols,
        grid.cell_width,
        grid.cell_height
    );
    Ok(SliceInfo {
        rows: grid.rows,
        cols: grid.cols,
        cell_width: grid.cell_width,
        cell_height: grid.cell_height,
        cells: grid.cells(),
    })
}

/// PNG bytes of the stored full image, untouched by any grid or edits.
pub fn preview(store: &ImageStore, id: Uuid) -> Result<Vec<u8>, Error> {
    let snap = store.snapshot(id).ok_or(Error::NotFound)?;
    io::encode_png(&snap.pixels)
}

/// PNG bytes of one cell rendered through its operation log.
pub fn cell_preview(store: &ImageStore, id: Uuid, cell: usize) -> Result<Vec<u8>, Error> {
    let snap = store.snapshot(id).ok_or(Error::NotFound)?;
    let grid = snap.grid.ok_or(Error::NotFound)?;
    let ops = snap.cell_ops.get(&cell).map_or(&[][..], |log| log.ops());
    let rendered = renderer::render_cell(&snap.pixels, &grid, cell, ops).ok_or(Error::NotFound)?;
    io::encode_png(&rendered)
}

/// Validate and append one operation to a cell's log.
pub fn apply_op(store: &ImageStore, id: Uuid, cell: usize, request: OpRequest) -> Result<(), Error> {
    let op = request.into_cell_op()?;
    if !store.add_cell_op(id, cell, op) {
        return Err(Error::NotFound);
    }
    log_info!("applied {:?} to {} cell {}", op, id, cell);
    Ok(())
}

/// Pop a cell's most recent operation. Not an error when there is nothing to
/// undo (or the id is unknown); the outcome reports whether anything changed.
pub fn undo_op(store: &ImageStore, id: Uuid, cell: usize) -> UndoOutcome {
    UndoOutcome {
        undone: store.undo_cell_op(id, cell),
    }
}

/// Destroy the entry and everything it owns.
pub fn delete(store: &ImageStore, id: Uuid) -> Result<(), Error> {
    if !store.delete(id) {
        return Err(Error::NotFound);
    }
    log_info!("deleted image {}", id);
    Ok(())
}

/// PNG bytes of the full reassembled atlas, sized to the grid-covered area
/// `(cols*cellWidth) × (rows*cellHeight)`.
pub fn export_atlas(store: &ImageStore, id: Uuid) -> Result<Vec<u8>, Error> {
    let snap = store.snapshot(id).ok_or(Error::NotFound)?;
    let grid = snap.grid.ok_or(Error::NotFound)?;
    let atlas = renderer::render_atlas(&snap.pixels, &grid, &snap.cell_ops);
    io::encode_png(&atlas)
}
