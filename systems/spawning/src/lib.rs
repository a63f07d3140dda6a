#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that drops enemies on an ellipse around the arena.

use std::f32::consts::TAU;

use glam::Vec2;
use horde_survival_core::{Command, Event, GameMode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    probability: f64,
    center: Vec2,
    radii: Vec2,
    rng_seed: u64,
    cap: usize,
}

impl Config {
    /// Creates a configuration spawning with `probability` per tick on the
    /// ellipse described by `center` and `radii`, never exceeding `cap`
    /// living enemies.
    #[must_use]
    pub const fn new(probability: f64, center: Vec2, radii: Vec2, rng_seed: u64, cap: usize) -> Self {
        Self {
            probability,
            center,
            radii,
            rng_seed,
            cap,
        }
    }
}

/// Pure system that emits spawn commands while a run is active.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
        }
    }

    /// Consumes events to emit spawn commands.
    ///
    /// Entering gameplay reseeds the generator so every run replays the same
    /// spawn sequence. Each `TimeAdvanced` event rolls once against the spawn
    /// probability.
    pub fn handle(
        &mut self,
        events: &[Event],
        mode: GameMode,
        living_enemies: usize,
        out: &mut Vec<Command>,
    ) {
        let mut living = living_enemies;
        for event in events {
            match event {
                Event::GameModeChanged {
                    mode: GameMode::Gameplay,
                } => {
                    self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
                }
                Event::TimeAdvanced { .. } if mode == GameMode::Gameplay => {
                    if !self.rng.gen_bool(self.config.probability) {
                        continue;
                    }
                    let angle = self.rng.gen_range(0.0..TAU);
                    if living >= self.config.cap {
                        continue;
                    }
                    living += 1;
                    out.push(Command::SpawnEnemy {
                        position: self.point_on_ellipse(angle),
                    });
                }
                _ => {}
            }
        }
    }

    fn point_on_ellipse(&self, angle: f32) -> Vec2 {
        self.config.center + Vec2::new(angle.cos(), angle.sin()) * self.config.radii
    }
}
