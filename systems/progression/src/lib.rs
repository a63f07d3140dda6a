#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pickup collection and the experience curve.

use horde_survival_core::{
    Command, Event, PickupKind, PickupSnapshot, PlayerSnapshot, ProgressSnapshot,
};

/// First level that can no longer be reached.
pub const MAX_LEVEL: u32 = 100;

/// Experience needed to advance from `level` to the next one.
///
/// Follows `floor((level + 1)² / 0.08)`, evaluated exactly as
/// `(level + 1)² × 25 / 2`. Returns `None` once the next level would reach
/// [`MAX_LEVEL`].
#[must_use]
pub fn next_level_threshold(level: u32) -> Option<u32> {
    let next = level.checked_add(1)?;
    if next >= MAX_LEVEL {
        return None;
    }
    next.checked_mul(next)?.checked_mul(25).map(|value| value / 2)
}

/// Pure system that collects touched pickups and promotes the player.
#[derive(Debug, Default)]
pub struct Progression;

impl Progression {
    /// Creates a new progression system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes events and immutable views to emit progression commands.
    ///
    /// A `TimeAdvanced` event collects every pickup overlapping the player's
    /// bounds. A `PickupCollected` event that granted experience triggers a
    /// level check against `progress`, which must already include the
    /// collected experience.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        pickups: &[PickupSnapshot],
        progress: ProgressSnapshot,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        let mut gained = false;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => ticked = true,
                Event::PickupCollected {
                    kind: PickupKind::Experience { .. },
                    ..
                } => gained = true,
                _ => {}
            }
        }

        if ticked {
            for pickup in pickups {
                if pickup.bounds.intersects(&player.bounds) {
                    out.push(Command::CollectPickup { pickup: pickup.id });
                }
            }
        }

        if gained && Self::ready_to_level(progress) {
            out.push(Command::LevelUp);
        }
    }

    fn ready_to_level(progress: ProgressSnapshot) -> bool {
        next_level_threshold(progress.level)
            .is_some_and(|threshold| progress.experience >= threshold)
    }
}
