// ============================================================================
// GRID PARTITION — equal-cell slicing of a source image
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How the caller asked for the image to be partitioned.
///
/// Exactly one of the two parameter pairs is given; the missing pair is
/// derived by integer floor division against the image dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridRequest {
    RowsCols { rows: u32, cols: u32 },
    CellSize { cell_width: u32, cell_height: u32 },
}

/// A resolved partition of the source image into `rows × cols` equal cells.
///
/// Invariant: all four fields are ≥ 1, `cols * cell_width` ≤ image width and
/// `rows * cell_height` ≤ image height. When the division leaves a remainder
/// the trailing strip of pixels is simply not addressable by any cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

/// One cell's position in the grid, as reported by a slice request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellInfo {
    pub cell_id: usize,
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridSpec {
    /// Resolve a [`GridRequest`] against the source image dimensions.
    ///
    /// Floor division, never rounding: a 100×100 image with rows=3, cols=3
    /// yields 33×33 cells and a 1-pixel strip on each axis that no cell covers.
    pub fn from_request(width: u32, height: u32, request: GridRequest) -> Result<Self, Error> {
        let spec = match request {
            GridRequest::RowsCols { rows, cols } => {
                if rows == 0 || cols == 0 {
                    return Err(Error::InvalidGridParameters(
                        "rows and cols must be at least 1".to_string(),
                    ));
                }
                GridSpec {
                    rows,
                    cols,
                    cell_width: width / cols,
                    cell_height: height / rows,
                }
            }
            GridRequest::CellSize {
                cell_width,
                cell_height,
            } => {
                if cell_width == 0 || cell_height == 0 {
                    return Err(Error::InvalidGridParameters(
                        "cellWidth and cellHeight must be at least 1".to_string(),
                    ));
                }
                GridSpec {
                    rows: height / cell_height,
                    cols: width / cell_width,
                    cell_width,
                    cell_height,
                }
            }
        };

        // A derived pair of zero means the request asked for more cells than
        // there are pixels (e.g. rows > height), or cells larger than the image.
        if spec.cell_width == 0 || spec.cell_height == 0 || spec.rows == 0 || spec.cols == 0 {
            return Err(Error::InvalidGridParameters(format!(
                "grid does not fit a {}x{} image",
                width, height
            )));
        }

        Ok(spec)
    }

    /// Total number of cells in the partition.
    pub fn cell_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// Top-left pixel offset of a cell, or `None` when the index is out of range.
    pub fn cell_rect(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.cell_count() {
            return None;
        }
        let row = (index / self.cols as usize) as u32;
        let col = (index % self.cols as usize) as u32;
        Some((col * self.cell_width, row * self.cell_height))
    }

    /// Full cell coordinate list in row-major order (cell 0 is top-left).
    pub fn cells(&self) -> Vec<CellInfo> {
        let mut cells = Vec::with_capacity(self.cell_count());
        for row in 0..self.rows {
            for col in 0..self.cols {
                cells.push(CellInfo {
                    cell_id: (row * self.cols + col) as usize,
                    row,
                    col,
                    x: col * self.cell_width,
                    y: row * self.cell_height,
                    w: self.cell_width,
                    h: self.cell_height,
                });
            }
        }
        cells
    }
}
