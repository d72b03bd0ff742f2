// ============================================================================
// IMAGE STORE — the only shared mutable state in the crate
// ============================================================================
//
// Maps an opaque uuid to one stored image plus its grid and per-cell edit
// history. A single mutex guards the whole map: every mutation holds it for
// its duration, and renders read through an atomic snapshot taken under the
// same lock, so a render never pairs a grid from one generation with
// operation logs from another. Pixel data sits behind an Arc, which keeps
// snapshots cheap and lets deletion release memory as soon as the last
// in-flight render drops its clone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image::{DynamicImage, RgbaImage};
use uuid::Uuid;

use crate::grid::GridSpec;
use crate::ops::{CellOp, OpLog};

/// Everything owned on behalf of one uploaded image.
struct ImageEntry {
    /// Always RGBA; immutable once stored.
    pixels: Arc<RgbaImage>,
    grid: Option<GridSpec>,
    /// Lazily created per cell on the first operation.
    cell_ops: HashMap<usize, OpLog>,
}

/// Read-only view of one entry, consistent at the moment it was taken.
pub struct EntrySnapshot {
    pub pixels: Arc<RgbaImage>,
    pub grid: Option<GridSpec>,
    pub cell_ops: HashMap<usize, OpLog>,
}

/// Uuid-keyed registry of uploaded images.
#[derive(Default)]
pub struct ImageStore {
    entries: Mutex<HashMap<Uuid, ImageEntry>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decoded image under a fresh id, converting to RGBA first so
    /// erase/rotate transparency is well-defined on every cell. Sources
    /// without an alpha channel become fully opaque.
    pub fn store_image(&self, image: DynamicImage) -> Uuid {
        let id = Uuid::new_v4();
        let entry = ImageEntry {
            pixels: Arc::new(image.into_rgba8()),
            grid: None,
            cell_ops: HashMap::new(),
        };
        self.lock().insert(id, entry);
        id
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn dimensions(&self, id: Uuid) -> Option<(u32, u32)> {
        self.lock().get(&id).map(|e| e.pixels.dimensions())
    }

    /// Atomically remove the pixels, grid, and every per-cell log for `id`.
    /// Returns `false` when the id is unknown.
    pub fn delete(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Replace the entry's grid. Any existing per-cell logs are cleared:
    /// cell indices are only meaningful relative to one partition, so edits
    /// recorded under the old grid cannot survive a re-slice.
    pub fn set_grid(&self, id: Uuid, grid: GridSpec) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.grid = Some(grid);
                entry.cell_ops.clear();
                true
            }
            None => false,
        }
    }

    pub fn grid(&self, id: Uuid) -> Option<GridSpec> {
        self.lock().get(&id).and_then(|e| e.grid)
    }

    /// Append an operation to a cell's log, creating the log on first use.
    /// Returns `false` when the id is unknown.
    pub fn add_cell_op(&self, id: Uuid, cell: usize, op: CellOp) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.cell_ops.entry(cell).or_default().push(op);
                true
            }
            None => false,
        }
    }

    /// The cell's ordered operations; empty when the id or log is absent.
    pub fn cell_ops(&self, id: Uuid, cell: usize) -> Vec<CellOp> {
        self.lock()
            .get(&id)
            .and_then(|e| e.cell_ops.get(&cell))
            .map(|log| log.ops().to_vec())
            .unwrap_or_default()
    }

    /// Pop the most recent operation for a cell. `false` when the id is
    /// unknown or the log is absent or empty; never an error.
    pub fn undo_cell_op(&self, id: Uuid, cell: usize) -> bool {
        let mut entries = self.lock();
        entries
            .get_mut(&id)
            .and_then(|e| e.cell_ops.get_mut(&cell))
            .is_some_and(|log| log.undo())
    }

    /// Clone the entry's state under the lock for a consistent render.
    pub fn snapshot(&self, id: Uuid) -> Option<EntrySnapshot> {
        self.lock().get(&id).map(|e| EntrySnapshot {
            pixels: Arc::clone(&e.pixels),
            grid: e.grid,
            cell_ops: e.cell_ops.clone(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ImageEntry>> {
        // A poisoned mutex means a panic mid-mutation; the map itself is
        // still structurally sound (no partial inserts), so keep serving.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
