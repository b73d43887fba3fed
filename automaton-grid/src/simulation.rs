use crate::{ConfigError, GridCells, GridEngine, NeighborhoodKind, Random, Rule, Snapshot};
use log::info;

pub const DEFAULT_SIZE: i64 = 100;
pub const DEFAULT_STEPS: i64 = 100;

/// Unvalidated run parameters, as they arrive from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    pub size: i64,
    pub steps: i64,
    pub neighborhood: NeighborhoodKind,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
    /// `None` uses one worker per CPU.
    pub workers: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            steps: DEFAULT_STEPS,
            neighborhood: NeighborhoodKind::Moore,
            seed: None,
            workers: None,
        }
    }
}

impl SimulationConfig {
    /// Validates every parameter and builds a randomly initialized
    /// simulation.
    pub fn build<R: Rule>(&self, rule: R) -> Result<Simulation<R>, ConfigError> {
        let size = GridCells::checked_size(self.size)?;
        Simulation::<R>::checked_steps(self.steps)?;

        let mut rand = match self.seed {
            Some(seed) => Random::from_seed(seed),
            None => Random::new(),
        };
        let mut engine = GridEngine::new(size, rule, self.neighborhood, &mut rand)?;
        if let Some(workers) = self.workers {
            engine = engine.with_workers(workers)?;
        }
        Ok(Simulation::new(engine))
    }
}

/// Runs an engine step by step and collects one snapshot per step.
#[derive(Debug)]
pub struct Simulation<R: Rule> {
    engine: GridEngine<R>,
}

impl<R: Rule> Simulation<R> {
    pub fn new(engine: GridEngine<R>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &GridEngine<R> {
        &self.engine
    }

    /// Advances `steps` generations, returning the snapshot taken after each
    /// one in order. Fails without stepping if `steps` is negative.
    pub fn run(&mut self, steps: i64) -> Result<Vec<Snapshot>, ConfigError> {
        let steps = Self::checked_steps(steps)?;
        self.log_start(steps);

        let mut frames = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.engine.step();
            frames.push(self.engine.snapshot());
        }

        self.log_finish();
        Ok(frames)
    }

    /// Advances `steps` generations without rendering any of them, for
    /// callers that only need the final state. Fails without stepping if
    /// `steps` is negative.
    pub fn advance(&mut self, steps: i64) -> Result<(), ConfigError> {
        let steps = Self::checked_steps(steps)?;
        self.log_start(steps);

        for _ in 0..steps {
            self.engine.step();
        }

        self.log_finish();
        Ok(())
    }

    fn log_start(&self, steps: usize) {
        let size = self.engine.size();
        info!("Running {} steps on a {}x{} grid", steps, size, size);
    }

    fn log_finish(&self) {
        info!(
            "Finished at generation {} with {} live cells",
            self.engine.generation(),
            self.engine.live_count()
        );
    }

    fn checked_steps(steps: i64) -> Result<usize, ConfigError> {
        usize::try_from(steps).map_err(|_| ConfigError::NegativeSteps(steps))
    }
}
