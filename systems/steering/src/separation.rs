//! Pairwise separation between overlapping enemies.

use glam::Vec2;
use horde_survival_core::{Command, EnemyId, EnemyView, Event};

/// Configuration parameters required to construct the separation system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    stiffness: f32,
    timestep: f32,
}

impl Config {
    /// Creates a configuration correcting `stiffness × timestep` of each
    /// overlap per tick.
    #[must_use]
    pub const fn new(stiffness: f32, timestep: f32) -> Self {
        Self {
            stiffness,
            timestep,
        }
    }
}

/// Pure system that pushes overlapping enemies apart.
///
/// Candidates come from a sweep over bounding rectangles sorted by their
/// minimum x (ties by id). Pairs are resolved one after another, each seeing
/// the corrections applied by earlier pairs.
#[derive(Debug)]
pub struct Separation {
    config: Config,
    order: Vec<usize>,
    working: Vec<Vec2>,
}

impl Separation {
    /// Creates a new separation system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            order: Vec::new(),
            working: Vec::new(),
        }
    }

    /// Emits [`Command::DisplaceEnemy`] for every enemy that moved, in
    /// identifier order, when the batch contains a `TimeAdvanced` event.
    pub fn handle(&mut self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let snapshots: Vec<_> = enemies.iter().collect();
        self.working.clear();
        self.working
            .extend(snapshots.iter().map(|snapshot| snapshot.position));

        self.order.clear();
        self.order.extend(0..snapshots.len());
        self.order.sort_by(|&a, &b| {
            let (left, right) = (&snapshots[a], &snapshots[b]);
            left.bounds
                .min()
                .x
                .total_cmp(&right.bounds.min().x)
                .then(left.id.cmp(&right.id))
        });

        let factor = self.config.stiffness * self.config.timestep * 0.5;
        for (rank, &first) in self.order.iter().enumerate() {
            let first_bounds = snapshots[first].bounds;
            for &second in &self.order[rank + 1..] {
                let second_bounds = snapshots[second].bounds;
                if second_bounds.min().x >= first_bounds.max().x {
                    break;
                }
                if !first_bounds.intersects(&second_bounds) {
                    continue;
                }

                let reach = snapshots[first].radius + snapshots[second].radius;
                let delta = self.working[first] - self.working[second];
                let distance = delta.length();
                if distance >= reach {
                    continue;
                }

                let axis = if distance > f32::EPSILON {
                    delta / distance
                } else {
                    Vec2::X
                };
                let correction = axis * (reach - distance) * factor;
                self.working[first] += correction;
                self.working[second] -= correction;
            }
        }

        for (snapshot, position) in snapshots.iter().zip(&self.working) {
            let offset = *position - snapshot.position;
            if offset != Vec2::ZERO {
                out.push(displace(snapshot.id, offset));
            }
        }
    }
}

fn displace(enemy: EnemyId, offset: Vec2) -> Command {
    Command::DisplaceEnemy { enemy, offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_survival_core::{Bounds, EnemyAppearance, EnemySnapshot};

    fn snapshot(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            previous_position: position,
            radius: 16.0,
            health: 1,
            bounds: Bounds::from_center_size(position, Vec2::new(32.0, 42.0)),
            appearance: EnemyAppearance::default(),
        }
    }

    fn run(snapshots: Vec<EnemySnapshot>) -> Vec<Command> {
        let mut separation = Separation::new(Config::new(0.75, 0.5));
        let mut out = Vec::new();
        separation.handle(
            &[Event::TimeAdvanced { tick: 1 }],
            &EnemyView::from_snapshots(snapshots),
            &mut out,
        );
        out
    }

    #[test]
    fn overlapping_pair_is_pushed_apart_symmetrically() {
        let commands = run(vec![
            snapshot(0, Vec2::new(0.0, 0.0)),
            snapshot(1, Vec2::new(20.0, 0.0)),
        ]);
        // depth 12, correction 12 * 0.75 * 0.5 * 0.5
        assert_eq!(
            commands,
            vec![
                displace(EnemyId::new(0), Vec2::new(-2.25, 0.0)),
                displace(EnemyId::new(1), Vec2::new(2.25, 0.0)),
            ]
        );
    }

    #[test]
    fn coincident_pair_separates_along_x() {
        let commands = run(vec![
            snapshot(3, Vec2::new(5.0, 5.0)),
            snapshot(1, Vec2::new(5.0, 5.0)),
        ]);
        // equal min-x, so id 1 sorts first and moves toward +x
        assert_eq!(
            commands,
            vec![
                displace(EnemyId::new(1), Vec2::new(6.0, 0.0)),
                displace(EnemyId::new(3), Vec2::new(-6.0, 0.0)),
            ]
        );
    }

    #[test]
    fn distant_enemies_are_left_alone() {
        let commands = run(vec![
            snapshot(0, Vec2::new(0.0, 0.0)),
            snapshot(1, Vec2::new(100.0, 0.0)),
            snapshot(2, Vec2::new(0.0, 100.0)),
        ]);
        assert!(commands.is_empty());
    }

    #[test]
    fn overlapping_rectangles_without_circle_overlap_are_skipped() {
        let commands = run(vec![
            snapshot(0, Vec2::new(0.0, 0.0)),
            snapshot(1, Vec2::new(30.0, 30.0)),
        ]);
        assert!(commands.is_empty());
    }

    #[test]
    fn without_time_nothing_moves() {
        let mut separation = Separation::new(Config::new(0.75, 0.5));
        let mut out = Vec::new();
        separation.handle(
            &[],
            &EnemyView::from_snapshots(vec![
                snapshot(0, Vec2::ZERO),
                snapshot(1, Vec2::ZERO),
            ]),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
