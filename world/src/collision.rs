//! Sampled footprint collision against wall cells.

use glam::Vec3;
use maze_escape_core::CellKind;

use crate::maze::Maze;

/// Scale applied to the radius for the four diagonal samples.
pub const DIAGONAL_SAMPLE_SCALE: f32 = 0.7;

/// Offsets sampled around a candidate centre for the provided radius.
///
/// The four axial points sit at the full radius and the four diagonal points
/// at [`DIAGONAL_SAMPLE_SCALE`] times the radius on each axis.
#[must_use]
pub fn footprint_samples(radius: f32) -> [(f32, f32); 8] {
    let diagonal = radius * DIAGONAL_SAMPLE_SCALE;
    [
        (radius, 0.0),
        (-radius, 0.0),
        (0.0, radius),
        (0.0, -radius),
        (diagonal, diagonal),
        (-diagonal, diagonal),
        (diagonal, -diagonal),
        (-diagonal, -diagonal),
    ]
}

/// Reports whether any footprint sample around `candidate` lands on a wall.
///
/// Fast movers may clip a corner between samples at large frame deltas.
#[must_use]
pub fn is_blocked(maze: &Maze, candidate: Vec3, radius: f32) -> bool {
    footprint_samples(radius)
        .iter()
        .any(|(dx, dz)| maze.cell_at(candidate.x + dx, candidate.z + dz) == CellKind::Wall)
}
