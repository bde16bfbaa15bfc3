use crate::error::SimError;
use crate::integrate::integrate;
use crate::maze::{self, MazeSettings, Wall};
use crate::params::{SimConstants, SimParams};
use crate::particle::{fill_block, Particle};
use crate::solver::{compute_density_pressure, compute_forces};
use crate::spatial::SpatialIndex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

/// Row spacing of the dense block appended by `add_particles`, relative to h
const DENSE_ROW_SPACING: f32 = 0.95;

/// Rng stream used for particle layouts (the maze uses the default stream)
const LAYOUT_STREAM: u64 = 1;

/// Whether fluid has made it through the current maze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MazeState {
    #[default]
    Unsolved,
    /// Terminal until the maze is regenerated or cleared
    Solved,
}

impl MazeState {
    pub fn name(&self) -> &str {
        match self {
            MazeState::Unsolved => "Unsolved",
            MazeState::Solved => "Solved",
        }
    }
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// First particle reached the bottom of the domain
    MazeSolved { step: u64 },
    /// An add request was refused at the particle cap
    CapacityReached { count: usize },
}

/// Fluid state plus the static geometry it flows through
pub struct ParticleSystem {
    constants: SimConstants,
    particles: Vec<Particle>,
    walls: Vec<Wall>,
    index: SpatialIndex,
    maze: Option<MazeSettings>,
    state: MazeState,
    seed: u64,
    maze_rng: ChaCha8Rng,
    layout_rng: ChaCha8Rng,
    next_id: u32,
    steps: u64,
    events: Vec<SimEvent>,
}

impl ParticleSystem {
    /// Create an empty, uninitialized system. Nothing is seeded until
    /// [`initialize`](Self::initialize) succeeds.
    pub fn new(params: SimParams, seed: u64) -> Result<Self, SimError> {
        let constants = SimConstants::new(params)?;
        let index = SpatialIndex::new(constants.params.cell_size, constants.params.row_stride);
        Ok(Self {
            constants,
            particles: Vec::new(),
            walls: Vec::new(),
            index,
            maze: None,
            state: MazeState::Unsolved,
            seed,
            maze_rng: ChaCha8Rng::seed_from_u64(seed),
            layout_rng: Self::layout_rng(seed),
            next_id: 0,
            steps: 0,
            events: Vec::new(),
        })
    }

    fn layout_rng(seed: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(LAYOUT_STREAM);
        rng
    }

    /// Generate a maze and seed the dam-break block.
    ///
    /// Out-of-range dimensions are rejected and leave the system untouched.
    pub fn initialize(&mut self, length: u32, threshold: f32) -> Result<(), SimError> {
        let settings = MazeSettings::new(length, threshold)?;
        self.maze = Some(settings);
        self.build_maze(settings);
        self.seed_initial();
        self.state = MazeState::Unsolved;
        self.steps = 0;
        info!(
            length,
            threshold,
            walls = self.walls.len(),
            particles = self.particles.len(),
            "initialized maze"
        );
        Ok(())
    }

    /// Initialize without a maze (open box). `settings` are kept for the
    /// next [`regenerate_maze`](Self::regenerate_maze).
    pub fn initialize_open(&mut self, settings: MazeSettings) {
        self.maze = Some(settings);
        self.clear_maze();
        self.steps = 0;
    }

    fn build_maze(&mut self, settings: MazeSettings) {
        self.walls = maze::generate(&settings, &self.constants.params, &mut self.maze_rng);
        debug!(walls = self.walls.len(), "generated maze walls");
    }

    /// Replace all particles with the initial block
    fn seed_initial(&mut self) {
        self.particles.clear();
        self.next_id = 0;
        self.layout_rng = Self::layout_rng(self.seed);
        let params = &self.constants.params;
        fill_block(
            &mut self.particles,
            params,
            params.smoothing_radius,
            params.initial_particles,
            &mut self.next_id,
            &mut self.layout_rng,
        );
    }

    /// Advance by one fixed time step
    pub fn step(&mut self) {
        self.index.rebuild(&self.particles);
        compute_density_pressure(&mut self.particles, &self.index, &self.constants);
        compute_forces(&mut self.particles, &self.index, &self.constants);
        let contacts = integrate(&mut self.particles, &self.walls, &self.constants);
        self.steps += 1;
        trace!(
            step = self.steps,
            cells = self.index.occupied_cells(),
            indexed = self.index.len(),
            boundary_hits = contacts.boundary_hits,
            wall_hits = contacts.wall_hits,
            "step"
        );

        if contacts.reached_bottom && self.state == MazeState::Unsolved {
            self.state = MazeState::Solved;
            info!(step = self.steps, "maze solved");
            self.events.push(SimEvent::MazeSolved { step: self.steps });
        }
    }

    /// Append a denser block over the starting region, up to the cap.
    /// Returns how many particles were added.
    pub fn add_particles(&mut self) -> usize {
        let params = &self.constants.params;
        let count = self.particles.len();
        if count >= params.max_particles {
            warn!(count, "maximum number of particles reached");
            self.events.push(SimEvent::CapacityReached { count });
            return 0;
        }

        let added = fill_block(
            &mut self.particles,
            params,
            params.smoothing_radius * DENSE_ROW_SPACING,
            params.max_particles,
            &mut self.next_id,
            &mut self.layout_rng,
        );
        info!(added, total = self.particles.len(), "added particles");
        added
    }

    /// Re-seed the initial block, keeping the current walls
    pub fn reset(&mut self) {
        self.seed_initial();
        info!(particles = self.particles.len(), "reset particles");
    }

    /// Generate a fresh maze and restart the flow
    pub fn regenerate_maze(&mut self) {
        let settings = self.maze.unwrap_or_default();
        self.maze = Some(settings);
        self.walls.clear();
        self.build_maze(settings);
        self.seed_initial();
        self.state = MazeState::Unsolved;
        info!(walls = self.walls.len(), "regenerated maze");
    }

    /// Drop the maze and restart the flow in an open box
    pub fn clear_maze(&mut self) {
        self.walls.clear();
        self.seed_initial();
        // Nothing left to solve
        self.state = MazeState::Solved;
        info!("cleared maze");
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn maze_state(&self) -> MazeState {
        self.state
    }

    pub fn maze_settings(&self) -> Option<MazeSettings> {
        self.maze
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn params(&self) -> &SimParams {
        &self.constants.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
