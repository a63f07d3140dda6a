#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step driver that wires the world and the systems together.
//!
//! A [`Session`] owns the authoritative [`World`] plus every system and runs
//! them in a fixed order once per call to [`Session::step`]:
//!
//! 1. `Tick` (clock, hazard expiry, goal update and field rebuild, effect and
//!    attack ageing, weapon cooldowns)
//! 2. spawning
//! 3. player movement
//! 4. steering
//! 5. separation
//! 6. combat
//! 7. pickup collection and level checks

use glam::Vec2;
use horde_survival_core::{Command, ConfigError, Event, GameConfig, GameMode, ProgressSnapshot};
use horde_survival_system_combat::{self as combat, Battlefield, Combat};
use horde_survival_system_progression::Progression;
use horde_survival_system_spawning::{self as spawning, Spawning};
use horde_survival_system_steering::{
    self as steering,
    separation::{self, Separation},
    Steering,
};
use horde_survival_world::{self as world, query, World};
use tracing::{debug, info};

/// Input sampled from the player for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Desired movement direction; zero keeps the player still.
    pub heading: Vec2,
    /// Requests a new run from the title or game-over screen.
    pub start: bool,
}

/// End-of-run figures reported to adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Mode the game is in.
    pub mode: GameMode,
    /// Score, experience, level, kills and elapsed ticks.
    pub progress: ProgressSnapshot,
    /// Remaining player health.
    pub health: i32,
    /// Living enemies.
    pub enemies: usize,
    /// Flow-field rebuilds performed during the run.
    pub rebuilds: u64,
}

/// World plus systems, advanced one fixed step at a time.
#[derive(Debug)]
pub struct Session {
    world: World,
    spawning: Spawning,
    steering: Steering,
    separation: Separation,
    combat: Combat,
    progression: Progression,
}

impl Session {
    /// Creates a session on the title screen with systems configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `config` fails
    /// [`GameConfig::validate`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawning = Spawning::new(spawning::Config::new(
            config.spawning.probability,
            Vec2::from(config.spawning.center),
            Vec2::from(config.spawning.radii),
            config.spawning.seed,
            config.enemy.cap,
        ));
        let steering = Steering::new(steering::Config::new(config.enemy.deflection_stiffness));
        let separation = Separation::new(separation::Config::new(
            config.enemy.separation_stiffness,
            config.enemy.timestep,
        ));
        let combat = Combat::new(combat::Config::new(config.combat.hazard_damage_interval));

        Ok(Self {
            world: World::with_config(config),
            spawning,
            steering,
            separation,
            combat,
            progression: Progression::new(),
        })
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Figures describing the current run.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            mode: query::mode(&self.world),
            progress: query::progress(&self.world),
            health: query::player(&self.world).health,
            enemies: query::enemy_view(&self.world).len(),
            rebuilds: query::grid(&self.world).rebuilds(),
        }
    }

    /// Advances the session by one fixed step, appending every event the
    /// world emitted to `out_events`.
    ///
    /// Outside of gameplay the only effect of a step is starting a new run
    /// when `input.start` is set.
    pub fn step(&mut self, input: &PlayerInput, out_events: &mut Vec<Event>) {
        if query::mode(&self.world) != GameMode::Gameplay {
            if input.start {
                let mut events = Vec::new();
                world::apply(&mut self.world, Command::StartGame, &mut events);
                self.spawning
                    .handle(&events, query::mode(&self.world), 0, &mut Vec::new());
                out_events.extend(events);
            }
            return;
        }

        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut tick_events);
        out_events.extend(tick_events.iter().cloned());

        let mut commands = Vec::new();
        self.spawning.handle(
            &tick_events,
            query::mode(&self.world),
            query::enemy_view(&self.world).len(),
            &mut commands,
        );
        self.execute(&mut commands, out_events);

        if input.heading != Vec2::ZERO {
            commands.push(Command::MovePlayer {
                heading: input.heading,
            });
            self.execute(&mut commands, out_events);
        }

        self.steering.handle(
            &tick_events,
            &query::enemy_view(&self.world),
            query::flow_field(&self.world),
            query::player(&self.world).position,
            &mut commands,
        );
        self.execute(&mut commands, out_events);

        self.separation
            .handle(&tick_events, &query::enemy_view(&self.world), &mut commands);
        self.execute(&mut commands, out_events);

        {
            let player = query::player(&self.world);
            let enemies = query::enemy_view(&self.world);
            let attacks = query::attacks(&self.world);
            let weapons = query::weapons(&self.world);
            self.combat.handle(
                &tick_events,
                Battlefield {
                    player: &player,
                    enemies: &enemies,
                    attacks: &attacks,
                    weapons: &weapons,
                    field: query::flow_field(&self.world),
                },
                &mut commands,
            );
        }
        self.execute(&mut commands, out_events);

        self.settle_progression(tick_events, out_events);

        if query::mode(&self.world) == GameMode::GameOver {
            let summary = self.summary();
            info!(
                seconds = summary.progress.seconds_survived(),
                score = summary.progress.score,
                level = summary.progress.level,
                kills = summary.progress.kills,
                "run ended"
            );
        }
    }

    fn settle_progression(&mut self, tick_events: Vec<Event>, out_events: &mut Vec<Event>) {
        let mut pending = tick_events;
        loop {
            let mut commands = Vec::new();
            self.progression.handle(
                &pending,
                &query::player(&self.world),
                &query::pickups(&self.world),
                query::progress(&self.world),
                &mut commands,
            );
            if commands.is_empty() {
                break;
            }

            pending.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut pending);
            }
            out_events.extend(pending.iter().cloned());
        }
    }

    fn execute(&mut self, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        if !commands.is_empty() {
            debug!(count = commands.len(), "applying commands");
        }
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}
