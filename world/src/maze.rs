//! Immutable maze layout and the grid/world coordinate mapping.

use std::fmt;

use glam::Vec3;
use maze_escape_core::{CellCoord, CellKind};
use thiserror::Error;

/// Built-in 13×13 layout used when no layout file is supplied.
pub const CLASSIC_LAYOUT: &str = "\
; Maze Escape classic layout
#############
#S....#.....#
#####.#.###.#
#...#.....#.#
#.#.#####.#.#
#.#.....#.#.#
#.#####.#.#.#
#.....#.#.#.#
#####.#.#.#.#
#C....#...#.#
###########.#
#..........C#
###########E#
";

/// Reasons a layout is rejected at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contained no rows after comments and empty lines were skipped.
    #[error("layout does not contain any rows")]
    Empty,
    /// A row's width differs from the width of the first row.
    #[error("row {row} has {found} cells but the layout is {expected} cells wide")]
    Ragged {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A glyph does not map to any cell kind.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column of the glyph.
        column: u32,
        /// Zero-based row of the glyph.
        row: u32,
    },
    /// The layout has no start cell.
    #[error("layout does not contain a start cell")]
    MissingStart,
    /// The layout has more than one start cell.
    #[error("layout contains a second start cell at {0:?}")]
    DuplicateStart(CellCoord),
    /// The layout has no exit cell.
    #[error("layout does not contain an exit cell")]
    MissingExit,
    /// The layout has more than one exit cell.
    #[error("layout contains a second exit cell at {0:?}")]
    DuplicateExit(CellCoord),
    /// The layout has no checkpoint cells.
    #[error("layout does not contain any checkpoint cells")]
    NoCheckpoints,
}

/// Fixed grid of cell kinds that never changes after load.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    start: CellCoord,
    exit: CellCoord,
    checkpoints: Vec<CellCoord>,
}

impl Maze {
    /// Parses the built-in classic layout.
    pub fn classic() -> Result<Self, LayoutError> {
        Self::parse(CLASSIC_LAYOUT)
    }

    /// Parses a textual layout, one row per line.
    ///
    /// `#`/`1` is a wall, `.`/`0`/space is open floor, `S`/`2` the start,
    /// `E`/`3` the exit and `C`/`4` a checkpoint. Lines starting with `;` are
    /// comments and empty lines are skipped. A line of spaces is a row of open
    /// floor, not a blank line.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let mut rows = Vec::new();
        for line in text.lines() {
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let row_index = rows.len() as u32;
            let row = line
                .chars()
                .enumerate()
                .map(|(column, glyph)| {
                    cell_from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                        glyph,
                        column: column as u32,
                        row: row_index,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        Self::from_rows(rows)
    }

    /// Validates a grid of cell kinds supplied row by row.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self, LayoutError> {
        let expected = rows.first().map(Vec::len).ok_or(LayoutError::Empty)?;
        if expected == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        let mut start = None;
        let mut exit = None;
        let mut checkpoints = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(LayoutError::Ragged {
                    row: row_index as u32,
                    expected: expected as u32,
                    found: row.len() as u32,
                });
            }

            for (column, kind) in row.iter().copied().enumerate() {
                let coord = CellCoord::new(column as u32, row_index as u32);
                match kind {
                    CellKind::Start => {
                        if start.replace(coord).is_some() {
                            return Err(LayoutError::DuplicateStart(coord));
                        }
                    }
                    CellKind::Exit => {
                        if exit.replace(coord).is_some() {
                            return Err(LayoutError::DuplicateExit(coord));
                        }
                    }
                    CellKind::Checkpoint => checkpoints.push(coord),
                    CellKind::Wall | CellKind::Path => {}
                }
                cells.push(kind);
            }
        }

        let start = start.ok_or(LayoutError::MissingStart)?;
        let exit = exit.ok_or(LayoutError::MissingExit)?;
        if checkpoints.is_empty() {
            return Err(LayoutError::NoCheckpoints);
        }

        Ok(Self {
            columns: expected as u32,
            rows: rows.len() as u32,
            cells,
            start,
            exit,
            checkpoints,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Location of the unique start cell.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Location of the unique exit cell.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        self.exit
    }

    /// Checkpoint cells in row-major scan order.
    #[must_use]
    pub fn checkpoints(&self) -> &[CellCoord] {
        &self.checkpoints
    }

    /// Kind of the provided cell; anything outside the grid is a wall.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> CellKind {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return CellKind::Wall;
        }
        let index = coord.row() as usize * self.columns as usize + coord.column() as usize;
        self.cells.get(index).copied().unwrap_or(CellKind::Wall)
    }

    /// Kind of the cell containing the world-space point `(x, z)`.
    #[must_use]
    pub fn cell_at(&self, x: f32, z: f32) -> CellKind {
        self.cell_coord_at(x, z)
            .map_or(CellKind::Wall, |coord| self.cell(coord))
    }

    /// Grid cell containing the world-space point `(x, z)`, if it lies inside the grid.
    #[must_use]
    pub fn cell_coord_at(&self, x: f32, z: f32) -> Option<CellCoord> {
        let column = grid_index(x, self.columns)?;
        let row = grid_index(z, self.rows)?;
        Some(CellCoord::new(column, row))
    }

    /// First cell of the provided kind in row-major order.
    #[must_use]
    pub fn find_cell(&self, kind: CellKind) -> Option<CellCoord> {
        self.find_all(kind).next()
    }

    /// Every cell of the provided kind in row-major order.
    pub fn find_all(&self, kind: CellKind) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == kind)
            .map(move |(index, _)| {
                let index = index as u32;
                CellCoord::new(index % columns, index / columns)
            })
    }

    /// World-space centre of the provided cell on the floor plane.
    #[must_use]
    pub fn world_position(&self, coord: CellCoord) -> Vec3 {
        Vec3::new(
            coord.column() as f32 + 0.5 - self.columns as f32 / 2.0,
            0.0,
            coord.row() as f32 + 0.5 - self.rows as f32 / 2.0,
        )
    }

    /// Iterates over every cell together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    /// Renders the maze with canonical glyphs, one row per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.cells.len() + self.rows as usize);
        for (coord, kind) in self.iter() {
            text.push(glyph_for(kind));
            if coord.column() + 1 == self.columns {
                text.push('\n');
            }
        }
        text
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn grid_index(coord: f32, extent: u32) -> Option<u32> {
    let shifted = (coord + extent as f32 / 2.0).floor();
    if !shifted.is_finite() || shifted < 0.0 || shifted >= extent as f32 {
        return None;
    }
    Some(shifted as u32)
}

fn cell_from_glyph(glyph: char) -> Option<CellKind> {
    match glyph {
        '#' | '1' => Some(CellKind::Wall),
        '.' | '0' | ' ' => Some(CellKind::Path),
        'S' | '2' => Some(CellKind::Start),
        'E' | '3' => Some(CellKind::Exit),
        'C' | '4' => Some(CellKind::Checkpoint),
        _ => None,
    }
}

const fn glyph_for(kind: CellKind) -> char {
    match kind {
        CellKind::Wall => '#',
        CellKind::Path => '.',
        CellKind::Start => 'S',
        CellKind::Exit => 'E',
        CellKind::Checkpoint => 'C',
    }
}
