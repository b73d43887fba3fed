use crate::{
    ConfigError, GridCells, Loc, Neighborhood, NeighborhoodKind, Palette, Random, Rule, Snapshot,
};
use log::{debug, trace};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::mem;

/// Owns a grid and advances it one generation at a time.
///
/// Each step reads only `cells` and writes only `next_cells`, one rayon work
/// item per row, then swaps the two buffers. Without an explicit worker count
/// the rows run on rayon's global pool, which has one thread per CPU.
pub struct GridEngine<R: Rule> {
    cells: GridCells,
    next_cells: GridCells,
    rule: R,
    neighborhood: NeighborhoodKind,
    palette: Palette,
    pool: Option<ThreadPool>,
    generation: u64,
}

impl<R: Rule> GridEngine<R> {
    /// Engine over a `size` x `size` grid of fair coin flips.
    pub fn new(
        size: u32,
        rule: R,
        neighborhood: NeighborhoodKind,
        rand: &mut Random,
    ) -> Result<Self, ConfigError> {
        let cells = GridCells::random(size, rand)?;
        Ok(Self::from_cells(cells, rule, neighborhood))
    }

    pub fn from_cells(cells: GridCells, rule: R, neighborhood: NeighborhoodKind) -> Self {
        debug!(
            "Grid engine: {}x{} cells, {} neighborhood, {} live",
            cells.size(),
            cells.size(),
            neighborhood,
            cells.live_count()
        );
        Self {
            next_cells: cells.clone(),
            cells,
            rule,
            neighborhood,
            palette: Palette::default(),
            pool: None,
            generation: 0,
        }
    }

    /// Runs steps on a dedicated pool of `workers` threads.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("grid-worker-{}", index))
            .build()?;
        debug!("Grid engine: {} dedicated workers", workers);
        self.pool = Some(pool);
        Ok(self)
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn size(&self) -> u32 {
        self.cells.size()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.num_cells()
    }

    pub fn live_count(&self) -> usize {
        self.cells.live_count()
    }

    pub fn is_alive(&self, loc: Loc) -> bool {
        self.cells[loc]
    }

    pub fn cells(&self) -> &GridCells {
        &self.cells
    }

    pub fn neighborhood(&self) -> NeighborhoodKind {
        self.neighborhood
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of completed steps.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn workers(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads)
    }

    /// Computes the next generation of every cell and replaces the grid.
    /// Blocks until all rows are done.
    pub fn step(&mut self) {
        let cells = &self.cells;
        let next_cells = &mut self.next_cells;
        let rule = &self.rule;
        let neighborhood = self.neighborhood;

        let mut update = || {
            next_cells
                .par_rows_mut()
                .enumerate()
                .for_each(|(row, next_row)| {
                    Self::update_row(cells, row as u32, next_row, rule, neighborhood);
                });
        };
        match &self.pool {
            Some(pool) => pool.install(update),
            None => update(),
        }

        mem::swap(&mut self.next_cells, &mut self.cells);
        self.generation += 1;
        trace!(
            "Generation {}: {} live cells",
            self.generation,
            self.cells.live_count()
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::render(&self.cells, &self.palette)
    }

    fn update_row(
        cells: &GridCells,
        row: u32,
        next_row: &mut [bool],
        rule: &R,
        neighborhood: NeighborhoodKind,
    ) {
        for (col, next_cell) in next_row.iter_mut().enumerate() {
            let loc = Loc::new(row, col as u32);
            let around = Neighborhood::new(cells, loc, neighborhood);
            *next_cell = rule.next_state(cells[loc], around.num_live_neighbors());
        }
    }
}

impl<R: Rule> fmt::Debug for GridEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("size", &self.size())
            .field("neighborhood", &self.neighborhood)
            .field("generation", &self.generation)
            .field("workers", &self.workers())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConwayRule;
    use pretty_assertions::assert_eq;

    fn engine(pattern: &str) -> GridEngine<ConwayRule> {
        let cells = GridCells::from_pattern(pattern).unwrap();
        GridEngine::from_cells(cells, ConwayRule, NeighborhoodKind::Moore)
    }

    #[test]
    fn blinker_on_four_by_four_torus() {
        let mut engine = engine(
            "
            ....
            ###.
            ....
            ....
            ",
        );
        engine.step();
        assert_eq!(engine.cells().to_string(), ".#..\n.#..\n.#..\n....");
        assert!(engine.is_alive(Loc::new(1, 1)));

        engine.step();
        assert_eq!(engine.cells().to_string(), "....\n###.\n....\n....");
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn glider_crosses_the_edge() {
        let start = "
            .#....
            ..#...
            ###...
            ......
            ......
            ......
            ";
        let mut engine = engine(start);
        // A glider moves one cell down and right every 4 generations, so
        // after 24 it has wrapped all the way around a 6x6 torus.
        for _ in 0..24 {
            engine.step();
        }
        assert_eq!(engine.cells(), &GridCells::from_pattern(start).unwrap());
    }

    #[test]
    fn von_neumann_uses_orthogonal_neighbors_only() {
        let cells = GridCells::from_pattern(
            "
            .....
            .....
            ..#..
            .....
            .....
            ",
        )
        .unwrap();
        let mut engine = GridEngine::from_cells(
            cells,
            |_alive: bool, count: u32| count >= 1,
            NeighborhoodKind::VonNeumann,
        );
        engine.step();
        assert_eq!(engine.neighborhood(), NeighborhoodKind::VonNeumann);
        let expected = ".....\n..#..\n.#.#.\n..#..\n.....";
        assert_eq!(engine.cells().to_string(), expected);
    }

    #[test]
    fn dimensions_survive_steps() {
        let mut rand = Random::from_seed(1);
        let moore = NeighborhoodKind::Moore;
        let mut engine = GridEngine::new(23, ConwayRule, moore, &mut rand).unwrap();
        for _ in 0..20 {
            engine.step();
            assert_eq!(engine.size(), 23);
            assert_eq!(engine.num_cells(), 23 * 23);
            assert!(engine.live_count() <= engine.num_cells());
        }
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let initial = GridCells::random(37, &mut Random::from_seed(99)).unwrap();
        let history = |workers: usize| {
            let cells = initial.clone();
            let mut engine = GridEngine::from_cells(cells, ConwayRule, NeighborhoodKind::Moore)
                .with_workers(workers)
                .unwrap();
            assert_eq!(engine.workers(), workers);
            (0..12)
                .map(|_| {
                    engine.step();
                    engine.cells().clone()
                })
                .collect::<Vec<_>>()
        };

        let expected = history(1);
        for workers in [2, 8, 64] {
            assert!(history(workers) == expected, "{} workers diverged", workers);
        }
    }

    #[test]
    fn rejects_zero_workers() {
        let result = engine("#").with_workers(0);
        assert!(matches!(result, Err(ConfigError::InvalidWorkers)));
    }

    #[test]
    fn rejects_zero_size() {
        let mut rand = Random::from_seed(0);
        let result = GridEngine::new(0, ConwayRule, NeighborhoodKind::Moore, &mut rand);
        assert!(matches!(result, Err(ConfigError::InvalidSize(0))));
    }

    #[test]
    fn snapshot_matches_current_cells() {
        let mut engine = engine("....\n###.\n....\n....");
        engine.step();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.width(), 4);
        for row in 0..4 {
            for col in 0..4 {
                let loc = Loc::new(row, col);
                assert_eq!(
                    snapshot.pixel(loc),
                    engine.palette().color_rgba(engine.is_alive(loc))
                );
            }
        }
    }

    #[test]
    fn snapshot_uses_engine_palette() {
        let palette = Palette {
            alive: [0xff, 0x00, 0x00, 0xff],
            dead: [0x00, 0x00, 0xff, 0xff],
        };
        let engine = engine("#.\n..").with_palette(palette);
        let snapshot = engine.snapshot();
        assert_eq!(engine.palette(), &palette);
        assert_eq!(snapshot.pixel(Loc::new(0, 0)), palette.alive);
        assert_eq!(snapshot.pixel(Loc::new(1, 1)), palette.dead);
    }

    #[test]
    fn single_cell_grid_is_its_own_neighbor() {
        // Every Moore neighbor of the only cell is the cell itself.
        let mut engine = engine("#");
        engine.step();
        assert!(!engine.is_alive(Loc::new(0, 0)));
    }
}
