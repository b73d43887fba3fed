use crate::{ConfigError, Loc, Random};
use rayon::prelude::*;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Largest supported side length. A single rendered frame of this size is
/// 1 GiB of RGBA pixels.
pub const MAX_GRID_SIZE: u32 = 16_384;

const ALIVE_CHAR: char = '#';
const DEAD_CHAR: char = '.';

/// Square grid of alive/dead cells stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCells {
    cells: Vec<bool>,
    size: u32,
}

impl GridCells {
    /// All-dead grid with `size` cells per side.
    pub fn new(size: u32) -> Result<Self, ConfigError> {
        Self::from_fn(size, |_| false)
    }

    /// Every cell an independent fair coin flip.
    pub fn random(size: u32, rand: &mut Random) -> Result<Self, ConfigError> {
        Self::from_fn(size, |_| rand.next_bool(0.5))
    }

    pub fn from_fn<F>(size: u32, mut f: F) -> Result<Self, ConfigError>
    where
        F: FnMut(Loc) -> bool,
    {
        let size = Self::checked_size(size.into())?;
        let mut cells = Vec::with_capacity(size as usize * size as usize);
        for row in 0..size {
            for col in 0..size {
                cells.push(f(Loc::new(row, col)));
            }
        }
        Ok(Self { cells, size })
    }

    /// Parses rows of `#` (alive) and `.` (dead). Blank lines and surrounding
    /// whitespace are ignored; the rows must form a square.
    pub fn from_pattern(pattern: &str) -> Result<Self, ConfigError> {
        let rows: Vec<&str> = pattern
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let size = u32::try_from(rows.len())
            .map_err(|_| ConfigError::InvalidPattern("too many rows".to_string()))?;
        if size == 0 {
            return Err(ConfigError::InvalidPattern("no rows".to_string()));
        }

        let mut grid = Self::new(size)?;
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != rows.len() {
                return Err(ConfigError::InvalidPattern(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    rows.len()
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let alive = match ch {
                    ALIVE_CHAR | 'O' | 'o' => true,
                    DEAD_CHAR => false,
                    _ => {
                        return Err(ConfigError::InvalidPattern(format!(
                            "unexpected {:?} at row {}, column {}",
                            ch, row, col
                        )));
                    }
                };
                grid[Loc::new(row as u32, col as u32)] = alive;
            }
        }
        Ok(grid)
    }

    /// Validates a requested side length.
    pub fn checked_size(size: i64) -> Result<u32, ConfigError> {
        u32::try_from(size)
            .ok()
            .filter(|size| (1..=MAX_GRID_SIZE).contains(size))
            .ok_or(ConfigError::InvalidSize(size))
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|alive| **alive).count()
    }

    pub fn is_alive(&self, loc: Loc) -> bool {
        self[loc]
    }

    pub fn cells_iter(&self) -> impl DoubleEndedIterator<Item = &bool> + Clone {
        self.cells.iter()
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[bool]> + Clone {
        self.cells.chunks_exact(self.size as usize)
    }

    pub fn live_locs(&self) -> impl Iterator<Item = Loc> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| self.loc_of(index))
    }

    /// Disjoint mutable rows, one rayon work item each.
    pub(crate) fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, bool> {
        let size = self.size as usize;
        self.cells.par_chunks_exact_mut(size)
    }

    fn loc_of(&self, index: usize) -> Loc {
        let size = self.size as usize;
        Loc::new((index / size) as u32, (index % size) as u32)
    }

    fn cell(&self, loc: Loc) -> Option<&bool> {
        let index = loc.grid_index(self.size)?;
        Some(&self.cells[index])
    }

    fn cell_mut(&mut self, loc: Loc) -> Option<&mut bool> {
        let index = loc.grid_index(self.size)?;
        Some(&mut self.cells[index])
    }
}

impl Index<Loc> for GridCells {
    type Output = bool;

    fn index(&self, loc: Loc) -> &Self::Output {
        self.cell(loc)
            .unwrap_or_else(|| panic!("Index indices {}, {} out of bounds", loc.row, loc.col))
    }
}

impl IndexMut<Loc> for GridCells {
    fn index_mut(&mut self, loc: Loc) -> &mut Self::Output {
        self.cell_mut(loc)
            .unwrap_or_else(|| panic!("Index_mut indices {}, {} out of bounds", loc.row, loc.col))
    }
}

impl fmt::Display for GridCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.rows().enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for alive in cells {
                let ch = if *alive { ALIVE_CHAR } else { DEAD_CHAR };
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}
