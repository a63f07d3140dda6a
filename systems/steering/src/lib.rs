#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flow-field steering for the enemy horde.
//!
//! [`Steering`] turns the shared direction field into per-enemy headings and
//! pushes enemies out of impassable cells. [`separation::Separation`] keeps
//! enemies from stacking on top of each other once they have moved.

pub mod separation;

use glam::Vec2;
use horde_survival_core::{Command, EnemySnapshot, EnemyView, Event, FlowFieldView};

/// Configuration parameters required to construct the steering system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    deflection_stiffness: f32,
}

impl Config {
    /// Creates a configuration that pushes enemies out of impassable cells
    /// with the provided spring constant.
    #[must_use]
    pub const fn new(deflection_stiffness: f32) -> Self {
        Self {
            deflection_stiffness,
        }
    }
}

/// Pure system that emits one steering command per enemy and tick.
#[derive(Debug)]
pub struct Steering {
    config: Config,
}

impl Steering {
    /// Creates a new steering system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits [`Command::SteerEnemy`] for every enemy, in identifier order,
    /// when the batch contains a `TimeAdvanced` event.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        field: FlowFieldView<'_>,
        player_position: Vec2,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for enemy in enemies.iter() {
            let (heading, push) = self.steer(enemy, &field, player_position);
            out.push(Command::SteerEnemy {
                enemy: enemy.id,
                heading,
                push,
            });
        }
    }

    /// Heading and positional correction for a single enemy.
    #[must_use]
    pub fn steer(
        &self,
        enemy: &EnemySnapshot,
        field: &FlowFieldView<'_>,
        player_position: Vec2,
    ) -> (Vec2, Vec2) {
        let geometry = field.geometry();
        let cell = geometry.world_to_cell(enemy.position);

        let descends = field.distance(cell).is_some_and(|distance| distance > 0);
        let heading = match field.direction(cell) {
            Some(direction) if descends => direction.unit_vector(),
            _ => (player_position - enemy.position).normalize_or_zero(),
        };

        if !field.is_impassable(cell) {
            return (heading, Vec2::ZERO);
        }

        let center = geometry.cell_to_world_center(cell);
        let offset = enemy.position - center;
        let distance = offset.length();
        let penetration = (geometry.cell_size() * 0.5 + enemy.radius - distance).max(0.0);
        let away = if distance > f32::EPSILON {
            offset / distance
        } else {
            field
                .direction(cell)
                .map_or(Vec2::ZERO, |direction| direction.unit_vector())
        };

        (Vec2::ZERO, away * self.config.deflection_stiffness * penetration)
    }
}
