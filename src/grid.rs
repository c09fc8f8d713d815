//! Pure coordinate math shared by the brush engine and the drag controller.
//!
//! Three spaces are involved: world coordinates (f32, meters), signed cell
//! coordinates (origin at the grid center), and flat vertex indices into the
//! row-major heightfield / brush-overlay buffers.

use bevy::prelude::*;

/// World coordinate to signed cell coordinate via floor division.
pub fn world_to_cell(v: f32, cell_size: f32) -> i32 {
    (v / cell_size).floor() as i32
}

/// World XZ position to a signed cell pair.
pub fn world_to_cell_xz(pos: Vec3, cell_size: f32) -> IVec2 {
    IVec2::new(
        world_to_cell(pos.x, cell_size),
        world_to_cell(pos.z, cell_size),
    )
}

/// Flat vertex index for a signed cell in a `(columns+1) x (rows+1)` grid
/// whose origin sits at the grid center. Each axis is clamped into the valid
/// vertex range, so a brush footprint overhanging the border re-addresses the
/// border vertex instead of walking out of the buffer.
pub fn heightfield_index(cell: IVec2, columns: u32, rows: u32) -> usize {
    let ix = (columns as i32 / 2 + cell.x).clamp(0, columns as i32) as usize;
    let iz = (rows as i32 / 2 + cell.y).clamp(0, rows as i32) as usize;
    iz * (columns as usize + 1) + ix
}

/// Flat index into the brush-overlay buffer for an offset in
/// `[-radius, radius]^2`. The overlay is a `(2*radius+1)^2` vertex grid with
/// the cursor cell at its center.
pub fn brush_index(offset: IVec2, radius: i32) -> usize {
    debug_assert!(offset.x.abs() <= radius && offset.y.abs() <= radius);
    let side = (2 * radius + 1) as usize;
    (radius + offset.y) as usize * side + (radius + offset.x) as usize
}

/// Visit every offset of a square brush footprint, x-major like the
/// heightfield layout expects.
pub fn for_each_brush_cell(radius: i32, mut f: impl FnMut(IVec2)) {
    for i in -radius..=radius {
        for j in -radius..=radius {
            f(IVec2::new(i, j));
        }
    }
}

/// Snap a world coordinate to the center of the cell containing it.
pub fn snap_to_cell_center(v: f32, cell_size: f32) -> f32 {
    (v / cell_size).floor() * cell_size + cell_size * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_cell_floors_negatives() {
        assert_eq!(world_to_cell(0.4, 1.0), 0);
        assert_eq!(world_to_cell(-0.4, 1.0), -1);
        assert_eq!(world_to_cell(-1.0, 1.0), -1);
        assert_eq!(world_to_cell(3.2, 2.0), 1);
    }

    #[test]
    fn heightfield_index_is_row_major_from_center() {
        // 4x4 cells -> 5x5 vertices, center vertex at (2, 2).
        assert_eq!(heightfield_index(IVec2::ZERO, 4, 4), 2 * 5 + 2);
        assert_eq!(heightfield_index(IVec2::new(-2, -2), 4, 4), 0);
        assert_eq!(heightfield_index(IVec2::new(2, 2), 4, 4), 24);
        assert_eq!(heightfield_index(IVec2::new(1, -1), 4, 4), 5 + 3);
    }

    #[test]
    fn heightfield_index_clamps_out_of_range_cells() {
        assert_eq!(
            heightfield_index(IVec2::new(-10, 0), 4, 4),
            heightfield_index(IVec2::new(-2, 0), 4, 4)
        );
        assert_eq!(
            heightfield_index(IVec2::new(0, 99), 4, 4),
            heightfield_index(IVec2::new(0, 2), 4, 4)
        );
    }

    #[test]
    fn brush_index_covers_the_footprint_exactly_once() {
        let radius = 3;
        let side = (2 * radius + 1) as usize;
        let mut seen = vec![false; side * side];
        for_each_brush_cell(radius, |offset| {
            let idx = brush_index(offset, radius);
            assert!(!seen[idx], "index {idx} visited twice");
            seen[idx] = true;
        });
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn brush_center_maps_to_buffer_center() {
        assert_eq!(brush_index(IVec2::ZERO, 3), 3 * 7 + 3);
    }

    #[test]
    fn snap_lands_on_cell_centers_for_any_cell_size() {
        for &s in &[0.5_f32, 1.0, 2.0] {
            for &v in &[-3.7_f32, -0.2, 0.0, 0.49, 5.51] {
                let snapped = snap_to_cell_center(v, s);
                let k = (snapped / s).floor();
                // Grid aligned: result sits inside [k*s, k*s + s).
                assert!(snapped >= k * s && snapped < k * s + s);
                assert!((snapped - (k * s + s * 0.5)).abs() < 1e-6);
            }
        }
    }
}
