//! Scripted stand-in for a human player when running headless.

use glam::Vec2;
use horde_survival_core::EnemyView;
use horde_survival_session::PlayerInput;
use horde_survival_world::{query, World};

/// Enemies closer than this make the autopilot flee.
const DANGER_RADIUS: f32 = 120.0;
/// Distance from the arena centre the autopilot tolerates before heading back.
const LEASH: f32 = 200.0;

/// Flees the nearest threatening enemy and otherwise drifts back toward the
/// centre of the grid.
#[derive(Debug, Default)]
pub(crate) struct Autopilot;

impl Autopilot {
    pub(crate) fn input(&mut self, world: &World) -> PlayerInput {
        let player = query::player(world).position;
        let geometry = query::grid(world).geometry();
        let center = geometry.origin() + Vec2::splat(geometry.world_extent() * 0.5);

        PlayerInput {
            heading: steer(player, center, &query::enemy_view(world)),
            start: false,
        }
    }
}

fn steer(player: Vec2, center: Vec2, enemies: &EnemyView) -> Vec2 {
    let nearest = enemies
        .iter()
        .map(|enemy| enemy.position)
        .filter(|position| position.distance(player) < DANGER_RADIUS)
        .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)));

    if let Some(threat) = nearest {
        return (player - threat).normalize_or_zero();
    }
    if player.distance(center) > LEASH {
        return (center - player).normalize_or_zero();
    }
    Vec2::ZERO
}
