// ============================================================================
// CELL OPERATIONS — the per-cell edit vocabulary and its replay log
// ============================================================================

use serde::{Deserialize, Serialize};

/// Clockwise rotation by a multiple of 90°.
///
/// Serializes as its degree value so the wire shape stays
/// `{"type": "rotate", "degree": 90}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn from_degrees(degree: u16) -> Option<Self> {
        match degree {
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degree: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degree)
            .ok_or_else(|| format!("rotation degree must be 90, 180 or 270, got {}", degree))
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

/// One edit applied to a cell. Immutable once appended to a log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CellOp {
    /// Replace the cell's content with full transparency.
    Erase,
    /// Rotate the cell clockwise about its center, keeping the cell frame.
    Rotate { degree: Rotation },
}

/// Ordered edit history for one cell, replayed from scratch on every render.
///
/// Append-only except for [`OpLog::undo`], which pops the most recently
/// appended entry (strict LIFO).
#[derive(Clone, Debug, Default)]
pub struct OpLog {
    ops: Vec<CellOp>,
}

impl OpLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation. Infallible; degree validation happened upstream.
    pub fn push(&mut self, op: CellOp) {
        self.ops.push(op);
    }

    /// Remove the most recently appended operation.
    ///
    /// Returns `false` when the log is already empty. That is an outcome,
    /// not an error: nothing changed.
    pub fn undo(&mut self) -> bool {
        self.ops.pop().is_some()
    }

    pub fn ops(&self) -> &[CellOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_is_exact_inverse_of_push() {
        let mut log = OpLog::new();
        log.push(CellOp::Erase);
        let before = log.ops().to_vec();

        log.push(CellOp::Rotate {
            degree: Rotation::Cw90,
        });
        assert!(log.undo());
        assert_eq!(log.ops(), before.as_slice());
    }

    #[test]
    fn undo_on_empty_log_is_false() {
        let mut log = OpLog::new();
        assert!(!log.undo());
        assert!(log.is_empty());
    }

    #[test]
    fn ops_preserve_append_order() {
        let mut log = OpLog::new();
        log.push(CellOp::Rotate {
            degree: Rotation::Cw180,
        });
        log.push(CellOp::Erase);
        log.push(CellOp::Rotate {
            degree: Rotation::Cw270,
        });
        assert_eq!(
            log.ops(),
            &[
                CellOp::Rotate {
                    degree: Rotation::Cw180
                },
                CellOp::Erase,
                CellOp::Rotate {
                    degree: Rotation::Cw270
                },
            ]
        );
    }

    #[test]
    fn rotation_degree_validation() {
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Cw180));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(0), None);
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
    }

    #[test]
    fn op_wire_shape_matches_the_api() {
        let erase = serde_json::to_value(CellOp::Erase).unwrap();
        assert_eq!(erase, serde_json::json!({"type": "erase"}));

        let rotate = serde_json::to_value(CellOp::Rotate {
            degree: Rotation::Cw90,
        })
        .unwrap();
        assert_eq!(rotate, serde_json::json!({"type": "rotate", "degree": 90}));

        let parsed: CellOp =
            serde_json::from_value(serde_json::json!({"type": "rotate", "degree": 270})).unwrap();
        assert_eq!(
            parsed,
            CellOp::Rotate {
                degree: Rotation::Cw270
            }
        );
        assert!(
            serde_json::from_value::<CellOp>(serde_json::json!({"type": "rotate", "degree": 45}))
                .is_err()
        );
    }
}
