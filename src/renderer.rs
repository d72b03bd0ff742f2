// ============================================================================
// RENDERERS — deterministic cell and atlas reconstruction from the op log
// ============================================================================
//
// Both renderers are pure functions over (pixels, grid, ops): no caching, no
// mutation of the source. A cell is rebuilt from scratch on every call by
// cropping the original and replaying its operation log in append order, so
// re-rendering with unchanged inputs always yields byte-identical output.

use std::collections::HashMap;

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use crate::grid::GridSpec;
use crate::ops::{CellOp, OpLog, Rotation};

/// Render one cell: crop its rectangle from the source, then replay `ops`.
///
/// Returns `None` when `index` is out of range for the grid. An empty log
/// yields the unmodified crop.
pub fn render_cell(
    pixels: &RgbaImage,
    grid: &GridSpec,
    index: usize,
    ops: &[CellOp],
) -> Option<RgbaImage> {
    let (x, y) = grid.cell_rect(index)?;
    let mut cell = imageops::crop_imm(pixels, x, y, grid.cell_width, grid.cell_height).to_image();

    for op in ops {
        cell = match op {
            // Erase is absorbing: everything after it operates on transparency.
            CellOp::Erase => {
                RgbaImage::from_pixel(grid.cell_width, grid.cell_height, Rgba([0, 0, 0, 0]))
            }
            CellOp::Rotate { degree } => rotate_in_frame(&cell, *degree),
        };
    }

    Some(cell)
}

/// Reassemble the full atlas: a transparent `(cols*cw) × (rows*ch)` canvas
/// with every cell rendered and pasted at its offset, overwriting (not
/// blending) destination pixels.
///
/// Cells are rendered in parallel; paste order does not matter because cell
/// regions are disjoint.
pub fn render_atlas(
    pixels: &RgbaImage,
    grid: &GridSpec,
    cell_ops: &HashMap<usize, OpLog>,
) -> RgbaImage {
    let width = grid.cols * grid.cell_width;
    let height = grid.rows * grid.cell_height;
    let mut atlas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let rendered: Vec<(usize, RgbaImage)> = (0..grid.cell_count())
        .into_par_iter()
        .map(|index| {
            let ops = cell_ops.get(&index).map_or(&[][..], |log| log.ops());
            // cell_rect is in range by construction, render_cell cannot fail here
            let cell = render_cell(pixels, grid, index, ops)
                .unwrap_or_else(|| {
                    RgbaImage::from_pixel(grid.cell_width, grid.cell_height, Rgba([0, 0, 0, 0]))
                });
            (index, cell)
        })
        .collect();

    for (index, cell) in rendered {
        if let Some((x, y)) = grid.cell_rect(index) {
            imageops::replace(&mut atlas, &cell, x as i64, y as i64);
        }
    }

    atlas
}

/// Rotate clockwise about the center while preserving the cell frame.
///
/// For 90°/270° on a non-square cell the rotated (h×w) content is centered in
/// the original w×h frame and clipped at the edges; exposed area stays fully
/// transparent. This matches the behavior of rotating without expansion in
/// the usual raster editors, so a rectangular cell never changes dimensions.
fn rotate_in_frame(cell: &RgbaImage, rotation: Rotation) -> RgbaImage {
    let (w, h) = cell.dimensions();

    let rotated = match rotation {
        Rotation::Cw90 => imageops::rotate90(cell),
        Rotation::Cw180 => return imageops::rotate180(cell),
        Rotation::Cw270 => imageops::rotate270(cell),
    };

    // Square cells keep their frame under 90/270 as well; skip the re-center.
    if rotated.dimensions() == (w, h) {
        return rotated;
    }

    let mut framed = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
    let (rw, rh) = rotated.dimensions();
    let dx = (w as i64 - rw as i64) / 2;
    let dy = (h as i64 - rh as i64) / 2;
    for (x, y, px) in rotated.enumerate_pixels() {
        let tx = x as i64 + dx;
        let ty = y as i64 + dy;
        if tx >= 0 && ty >= 0 && (tx as u32) < w && (ty as u32) < h {
            framed.put_pixel(tx as u32, ty as u32, *px);
        }
    }
    framed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRequest;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    fn grid(width: u32, height: u32, rows: u32, cols: u32) -> GridSpec {
        GridSpec::from_request(width, height, GridRequest::RowsCols { rows, cols }).unwrap()
    }

    #[test]
    fn empty_log_equals_plain_crop() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        let cell = render_cell(&img, &g, 3, &[]).unwrap();
        let crop = imageops::crop_imm(&img, 20, 20, 20, 20).to_image();
        assert_eq!(cell, crop);
    }

    #[test]
    fn out_of_range_index_is_none() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        assert!(render_cell(&img, &g, 4, &[]).is_none());
    }

    #[test]
    fn erase_makes_every_pixel_transparent() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        let cell = render_cell(&img, &g, 0, &[CellOp::Erase]).unwrap();
        assert!(cell.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn erase_is_absorbing_under_later_rotation() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        let ops = [
            CellOp::Erase,
            CellOp::Rotate {
                degree: Rotation::Cw90,
            },
        ];
        let cell = render_cell(&img, &g, 0, &ops).unwrap();
        assert_eq!(cell.dimensions(), (20, 20));
        assert!(cell.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn double_erase_is_still_transparent() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        let cell = render_cell(&img, &g, 0, &[CellOp::Erase, CellOp::Erase]).unwrap();
        assert!(cell.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn rotate_180_twice_is_identity() {
        let img = checker(60, 40);
        let g = grid(60, 40, 2, 3);
        let ops = [
            CellOp::Rotate {
                degree: Rotation::Cw180,
            },
            CellOp::Rotate {
                degree: Rotation::Cw180,
            },
        ];
        let twice = render_cell(&img, &g, 1, &ops).unwrap();
        let plain = render_cell(&img, &g, 1, &[]).unwrap();
        assert_eq!(twice, plain);
    }

    #[test]
    fn four_quarter_turns_on_square_cell_are_identity() {
        let img = checker(40, 40);
        let g = grid(40, 40, 2, 2);
        let quarter = CellOp::Rotate {
            degree: Rotation::Cw90,
        };
        let full = render_cell(&img, &g, 2, &[quarter; 4]).unwrap();
        let plain = render_cell(&img, &g, 2, &[]).unwrap();
        assert_eq!(full, plain);
    }

    #[test]
    fn rotate_90_moves_known_pixel_on_square_cell() {
        // Single opaque white pixel at the cell's top-left corner.
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let g = grid(20, 20, 1, 1);

        let cell = render_cell(
            &img,
            &g,
            0,
            &[CellOp::Rotate {
                degree: Rotation::Cw90,
            }],
        )
        .unwrap();
        // Clockwise quarter turn sends (0,0) to the top-right corner.
        assert_eq!(*cell.get_pixel(19, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*cell.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn rotate_90_keeps_non_square_frame_and_clips() {
        let img = checker(60, 40);
        // Rectangular cells: 30x10.
        let g = GridSpec::from_request(60, 40, GridRequest::RowsCols { rows: 4, cols: 2 }).unwrap();
        assert_eq!((g.cell_width, g.cell_height), (30, 10));
        let cell = render_cell(
            &img,
            &g,
            0,
            &[CellOp::Rotate {
                degree: Rotation::Cw90,
            }],
        )
        .unwrap();
        // Frame is preserved; the 10x30 rotated content is clipped to 30x10.
        assert_eq!(cell.dimensions(), (30, 10));
        // Columns outside the centered 10-wide band are exposed, transparent.
        assert_eq!(cell.get_pixel(0, 0)[3], 0);
        assert_eq!(cell.get_pixel(29, 9)[3], 0);
        // The centered band carries opaque rotated content.
        assert_eq!(cell.get_pixel(15, 5)[3], 255);
    }

    #[test]
    fn atlas_dimensions_and_disjoint_paste() {
        let img = checker(100, 100);
        let g = grid(100, 100, 4, 4);

        let mut cell_ops = HashMap::new();
        let mut log = OpLog::new();
        log.push(CellOp::Erase);
        cell_ops.insert(0usize, log);

        let atlas = render_atlas(&img, &g, &cell_ops);
        assert_eq!(atlas.dimensions(), (100, 100));

        // Erased cell 0 region is fully transparent.
        assert_eq!(atlas.get_pixel(0, 0)[3], 0);
        assert_eq!(atlas.get_pixel(24, 24)[3], 0);

        // Every untouched cell matches the original crop exactly.
        for index in 1..g.cell_count() {
            let (x, y) = g.cell_rect(index).unwrap();
            let region = imageops::crop_imm(&atlas, x, y, 25, 25).to_image();
            let original = imageops::crop_imm(&img, x, y, 25, 25).to_image();
            assert_eq!(region, original, "cell {} diverged", index);
        }
    }

    #[test]
    fn atlas_region_matches_independent_cell_render() {
        let img = checker(60, 40);
        let g = grid(60, 40, 2, 3);

        let mut cell_ops = HashMap::new();
        let mut log = OpLog::new();
        log.push(CellOp::Rotate {
            degree: Rotation::Cw180,
        });
        cell_ops.insert(4usize, log.clone());

        let atlas = render_atlas(&img, &g, &cell_ops);
        let (x, y) = g.cell_rect(4).unwrap();
        let region = imageops::crop_imm(&atlas, x, y, 20, 20).to_image();
        let cell = render_cell(&img, &g, 4, log.ops()).unwrap();
        assert_eq!(region, cell);
    }

    #[test]
    fn atlas_excludes_truncated_remainder() {
        // 100x100 with a 3x3 grid covers only 99x99.
        let img = checker(100, 100);
        let g = grid(100, 100, 3, 3);
        let atlas = render_atlas(&img, &g, &HashMap::new());
        assert_eq!(atlas.dimensions(), (99, 99));
    }

    #[test]
    fn rendering_is_deterministic() {
        let img = checker(60, 40);
        let g = grid(60, 40, 2, 3);
        let ops = [
            CellOp::Rotate {
                degree: Rotation::Cw90,
            },
            CellOp::Erase,
            CellOp::Rotate {
                degree: Rotation::Cw270,
            },
        ];
        let a = render_cell(&img, &g, 2, &ops).unwrap();
        let b = render_cell(&img, &g, 2, &ops).unwrap();
        assert_eq!(a, b);
    }
}
