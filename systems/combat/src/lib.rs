#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat system resolving weapon fire, contact damage, attack hits and
//! hazard damage-over-time.

use horde_survival_core::{
    AttackSnapshot, Command, EnemyView, Event, FlowFieldView, PlayerSnapshot, WeaponSnapshot,
};

/// Damage dealt by a single contact, attack overlap or hazard pulse.
const HIT_DAMAGE: u32 = 1;

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    hazard_damage_interval: u64,
}

impl Config {
    /// Creates a configuration that damages enemies standing in hazardous
    /// cells once every `hazard_damage_interval` ticks. Zero disables hazard
    /// damage.
    #[must_use]
    pub const fn new(hazard_damage_interval: u64) -> Self {
        Self {
            hazard_damage_interval,
        }
    }
}

/// Read-only state the combat system inspects each tick.
#[derive(Clone, Copy, Debug)]
pub struct Battlefield<'a> {
    /// Player state, including the contact hitbox.
    pub player: &'a PlayerSnapshot,
    /// Living enemies in identifier order.
    pub enemies: &'a EnemyView,
    /// Active attacks.
    pub attacks: &'a [AttackSnapshot],
    /// Cooldown state of every weapon.
    pub weapons: &'a [WeaponSnapshot],
    /// Cost field used to find hazardous cells.
    pub field: FlowFieldView<'a>,
}

/// Pure system that converts overlaps into damage commands.
#[derive(Debug)]
pub struct Combat {
    config: Config,
}

impl Combat {
    /// Creates a new combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits fire and damage commands for every `TimeAdvanced` event.
    ///
    /// Commands are ordered as weapon fire, contact damage, attack hits and
    /// finally hazard pulses; within each group enemies are visited in
    /// identifier order.
    pub fn handle(&mut self, events: &[Event], battlefield: Battlefield<'_>, out: &mut Vec<Command>) {
        for event in events {
            if let Event::TimeAdvanced { tick } = event {
                self.resolve_tick(*tick, &battlefield, out);
            }
        }
    }

    fn resolve_tick(&self, tick: u64, battlefield: &Battlefield<'_>, out: &mut Vec<Command>) {
        for weapon in battlefield.weapons.iter().filter(|weapon| weapon.is_ready()) {
            out.push(Command::FireWeapon {
                weapon: weapon.kind,
            });
        }

        for enemy in battlefield.enemies.iter() {
            if enemy.bounds.intersects(&battlefield.player.hitbox) {
                out.push(Command::DamageEnemy {
                    enemy: enemy.id,
                    amount: HIT_DAMAGE,
                });
                out.push(Command::DamagePlayer { amount: HIT_DAMAGE });
            }
        }

        for attack in battlefield.attacks {
            for enemy in battlefield.enemies.iter() {
                if attack.bounds.intersects(&enemy.bounds) {
                    out.push(Command::DamageEnemy {
                        enemy: enemy.id,
                        amount: HIT_DAMAGE,
                    });
                }
            }
        }

        if self.hazard_pulse(tick) {
            let geometry = battlefield.field.geometry();
            for enemy in battlefield.enemies.iter() {
                let cell = geometry.world_to_cell(enemy.position);
                if battlefield.field.is_hazardous(cell) {
                    out.push(Command::DamageEnemy {
                        enemy: enemy.id,
                        amount: HIT_DAMAGE,
                    });
                }
            }
        }
    }

    fn hazard_pulse(&self, tick: u64) -> bool {
        self.config.hazard_damage_interval > 0 && tick % self.config.hazard_damage_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_pulses_on_interval_multiples() {
        let combat = Combat::new(Config::new(20));
        assert!(!combat.hazard_pulse(1));
        assert!(!combat.hazard_pulse(19));
        assert!(combat.hazard_pulse(20));
        assert!(combat.hazard_pulse(40));
    }

    #[test]
    fn zero_interval_disables_hazard_damage() {
        let combat = Combat::new(Config::new(0));
        assert!(!combat.hazard_pulse(0));
        assert!(!combat.hazard_pulse(20));
    }
}
