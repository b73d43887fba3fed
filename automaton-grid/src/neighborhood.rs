use crate::{ConfigError, GridCells, Loc};
use arrayvec::ArrayVec;
use std::fmt;
use std::str::FromStr;

/// Positions within the 3x3 block around a cell, as (row, col) indexes into
/// `Neighborhood::rows` and `Neighborhood::cols`. (1, 1) is the center.
const MOORE_CELLS: [(usize, usize); 8] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
];

const VON_NEUMANN_CELLS: [(usize, usize); 4] = [(0, 1), (1, 0), (1, 2), (2, 1)];

/// Which surrounding cells influence a cell's next state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NeighborhoodKind {
    /// The 8 orthogonal and diagonal neighbors.
    #[default]
    Moore,
    /// The 4 orthogonal neighbors.
    VonNeumann,
}

impl NeighborhoodKind {
    pub fn max_neighbors(self) -> u32 {
        self.cells().len() as u32
    }

    fn cells(self) -> &'static [(usize, usize)] {
        match self {
            NeighborhoodKind::Moore => &MOORE_CELLS,
            NeighborhoodKind::VonNeumann => &VON_NEUMANN_CELLS,
        }
    }
}

impl FromStr for NeighborhoodKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moore" => Ok(NeighborhoodKind::Moore),
            "von-neumann" | "von_neumann" | "vonneumann" => Ok(NeighborhoodKind::VonNeumann),
            _ => Err(ConfigError::UnknownNeighborhood(s.to_string())),
        }
    }
}

impl fmt::Display for NeighborhoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborhoodKind::Moore => f.write_str("moore"),
            NeighborhoodKind::VonNeumann => f.write_str("von-neumann"),
        }
    }
}

/// The cells around `center`, with row and column indexes already wrapped
/// around the edges of the grid.
pub struct Neighborhood<'a> {
    cells: &'a GridCells,
    kind: NeighborhoodKind,
    rows: [u32; 3],
    cols: [u32; 3],
}

impl<'a> Neighborhood<'a> {
    pub fn new(cells: &'a GridCells, center: Loc, kind: NeighborhoodKind) -> Self {
        let (row_above, row_below) = Self::adjacent_indexes(center.row, cells.size());
        let (col_left, col_right) = Self::adjacent_indexes(center.col, cells.size());
        Self {
            cells,
            kind,
            rows: [row_above, center.row, row_below],
            cols: [col_left, center.col, col_right],
        }
    }

    /// Neighbor locations in row-major order. Always `max_neighbors` entries;
    /// on grids smaller than 3x3 some of them are the same cell.
    pub fn locs(&self) -> ArrayVec<Loc, 8> {
        self.kind
            .cells()
            .iter()
            .map(|&(row, col)| self.loc(row, col))
            .collect()
    }

    pub fn for_neighbor_cells<F>(&self, mut f: F)
    where
        F: FnMut(bool),
    {
        for &(row, col) in self.kind.cells() {
            f(self.cells[self.loc(row, col)]);
        }
    }

    pub fn num_live_neighbors(&self) -> u32 {
        let mut result = 0;
        self.for_neighbor_cells(|alive| {
            if alive {
                result += 1;
            }
        });
        result
    }

    fn loc(&self, row: usize, col: usize) -> Loc {
        Loc::new(self.rows[row], self.cols[col])
    }

    fn adjacent_indexes(cell_index: u32, max: u32) -> (u32, u32) {
        (
            Self::modulo(cell_index as i64 - 1, max),
            Self::modulo(cell_index as i64 + 1, max),
        )
    }

    fn modulo(val: i64, max: u32) -> u32 {
        val.rem_euclid(max as i64) as u32
    }
}
