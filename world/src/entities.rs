//! Entity records owned by the world.

use glam::Vec2;
use horde_survival_core::{
    AttackSnapshot, Bounds, CellCoord, EffectKind, EffectSnapshot, EnemyAppearance, EnemyId,
    EnemySnapshot, HazardSnapshot, PickupId, PickupKind, PickupSnapshot, PlayerSnapshot,
    WeaponKind, WeaponSnapshot,
};

const PICKUP_SIZE: Vec2 = Vec2::new(32.0, 32.0);
const LEVEL_UP_LIFE: u32 = 20;
const LEVEL_UP_FADE: u8 = 10;
const LEVEL_UP_RISE: f32 = 1.0;
const DEATH_FADE_STEP: u8 = 5;

/// Player avatar.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) health: i32,
    pub(crate) max_health: i32,
    pub(crate) speed: f32,
    pub(crate) facing_left: bool,
    pub(crate) size: Vec2,
    pub(crate) hitbox: Vec2,
}

impl Player {
    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            facing_left: self.facing_left,
            bounds: Bounds::from_center_size(self.position, self.size),
            hitbox: Bounds::from_center_size(self.position, self.hitbox),
        }
    }

    /// Moves along `heading`, clamped to unit length, and updates facing.
    pub(crate) fn walk(&mut self, heading: Vec2) {
        let heading = heading.clamp_length_max(1.0);
        if heading.x.abs() > f32::EPSILON {
            self.facing_left = heading.x < 0.0;
        }
        self.position += heading * self.speed;
    }

    pub(crate) fn heal(&mut self, amount: u32) {
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }
}

/// Enemy integrated with position Verlet.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) previous_position: Vec2,
    pub(crate) radius: f32,
    pub(crate) health: i32,
    pub(crate) size: Vec2,
    pub(crate) appearance: EnemyAppearance,
}

impl Enemy {
    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            previous_position: self.previous_position,
            radius: self.radius,
            health: self.health,
            bounds: Bounds::from_center_size(self.position, self.size),
            appearance: self.appearance,
        }
    }

    /// One integration step: inertia plus `heading` acceleration, damped by
    /// `drag^timestep`, followed by the positional `push`.
    pub(crate) fn integrate(
        &mut self,
        heading: Vec2,
        push: Vec2,
        acceleration: f32,
        drag: f32,
        timestep: f32,
    ) {
        let mut velocity = self.position - self.previous_position;
        velocity += heading * acceleration * timestep;
        velocity *= drag.powf(timestep);
        self.previous_position = self.position;
        self.position += velocity + push;
    }
}

/// Allocates enemy identifiers and cosmetic variants.
#[derive(Clone, Debug)]
pub(crate) struct EnemyFactory {
    next_id: u32,
    spawned: u32,
    radius: f32,
    size: Vec2,
    health: i32,
}

impl EnemyFactory {
    pub(crate) fn new(radius: f32, size: Vec2, health: i32) -> Self {
        Self {
            next_id: 0,
            spawned: 0,
            radius,
            size,
            health,
        }
    }

    pub(crate) fn build(&mut self, position: Vec2) -> Enemy {
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.spawned = self.spawned.wrapping_add(1);

        let appearance = EnemyAppearance {
            style: u8::from(self.spawned % 2 == 0),
            flipped: self.spawned % 3 == 0,
        };

        Enemy {
            id,
            position,
            previous_position: position,
            radius: self.radius,
            health: self.health,
            size: self.size,
            appearance,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Pickup {
    pub(crate) id: PickupId,
    pub(crate) kind: PickupKind,
    pub(crate) position: Vec2,
}

impl Pickup {
    pub(crate) fn snapshot(&self) -> PickupSnapshot {
        PickupSnapshot {
            id: self.id,
            kind: self.kind,
            bounds: Bounds::from_center_size(self.position, PICKUP_SIZE),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Effect {
    pub(crate) kind: EffectKind,
    pub(crate) position: Vec2,
    pub(crate) alpha: u8,
    life: u32,
}

impl Effect {
    pub(crate) fn level_up(position: Vec2) -> Self {
        Self {
            kind: EffectKind::LevelUp,
            position,
            alpha: u8::MAX,
            life: LEVEL_UP_LIFE,
        }
    }

    pub(crate) fn death_fade(position: Vec2) -> Self {
        Self {
            kind: EffectKind::DeathFade,
            position,
            alpha: u8::MAX,
            life: u32::MAX,
        }
    }

    /// Ages the effect by one tick, returning whether it is still visible.
    pub(crate) fn age(&mut self) -> bool {
        match self.kind {
            EffectKind::LevelUp => {
                self.life = self.life.saturating_sub(1);
                self.alpha = self.alpha.saturating_sub(LEVEL_UP_FADE);
                self.position.y += LEVEL_UP_RISE;
                self.life > 0
            }
            EffectKind::DeathFade => {
                self.alpha = self.alpha.saturating_sub(DEATH_FADE_STEP);
                self.alpha > 0
            }
        }
    }

    pub(crate) fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot {
            kind: self.kind,
            position: self.position,
            alpha: self.alpha,
        }
    }
}

/// Damaging area that follows the player.
#[derive(Clone, Debug)]
pub(crate) struct Attack {
    pub(crate) weapon: WeaponKind,
    pub(crate) offset: Vec2,
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
    pub(crate) growth: Vec2,
    pub(crate) life: u32,
}

impl Attack {
    /// Follows the anchor, grows and loses one tick of life.
    pub(crate) fn age(&mut self, anchor: Vec2) -> bool {
        self.position = anchor + self.offset;
        self.size += self.growth;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }

    pub(crate) fn snapshot(&self) -> AttackSnapshot {
        AttackSnapshot {
            weapon: self.weapon,
            bounds: Bounds::from_center_size(self.position, self.size),
            life: self.life,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Hazard {
    pub(crate) cell: CellCoord,
    pub(crate) remaining: u32,
    pub(crate) cost: u32,
}

impl Hazard {
    pub(crate) fn snapshot(&self) -> HazardSnapshot {
        HazardSnapshot {
            cell: self.cell,
            remaining: self.remaining,
        }
    }
}

/// Cooldown bookkeeping for a single weapon.
#[derive(Clone, Debug)]
pub(crate) struct WeaponSlot {
    pub(crate) kind: WeaponKind,
    pub(crate) unlocked: bool,
    pub(crate) cooldown: u32,
    pub(crate) remaining: u32,
}

impl WeaponSlot {
    pub(crate) fn new(kind: WeaponKind, cooldown: u32) -> Self {
        Self {
            kind,
            unlocked: false,
            cooldown,
            remaining: cooldown,
        }
    }

    /// Counts the cooldown down, returning `true` on the tick it reaches zero.
    pub(crate) fn cool(&mut self) -> bool {
        if !self.unlocked || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.unlocked && self.remaining == 0
    }

    pub(crate) fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            kind: self.kind,
            unlocked: self.unlocked,
            cooldown_remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_alternates_style_and_flips_every_third() {
        let mut factory = EnemyFactory::new(16.0, Vec2::new(32.0, 42.0), 1);
        let appearances: Vec<EnemyAppearance> = (0..6)
            .map(|_| factory.build(Vec2::ZERO).appearance)
            .collect();

        let styles: Vec<u8> = appearances.iter().map(|a| a.style).collect();
        let flips: Vec<bool> = appearances.iter().map(|a| a.flipped).collect();
        assert_eq!(styles, vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(flips, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn factory_allocates_sequential_ids() {
        let mut factory = EnemyFactory::new(16.0, Vec2::new(32.0, 42.0), 1);
        assert_eq!(factory.build(Vec2::ZERO).id, EnemyId::new(0));
        assert_eq!(factory.build(Vec2::ZERO).id, EnemyId::new(1));
    }

    #[test]
    fn integration_keeps_momentum_and_applies_drag() {
        let mut enemy = EnemyFactory::new(16.0, Vec2::splat(32.0), 1).build(Vec2::ZERO);
        enemy.integrate(Vec2::X, Vec2::ZERO, 0.05, 0.96, 0.5);
        let first = enemy.position.x;
        assert!((first - 0.025 * 0.96_f32.sqrt()).abs() < 1e-6);

        enemy.integrate(Vec2::ZERO, Vec2::ZERO, 0.05, 0.96, 0.5);
        let coasted = enemy.position.x - first;
        assert!(coasted > 0.0 && coasted < first);
    }

    #[test]
    fn push_is_not_carried_into_the_next_velocity_step_twice() {
        let mut enemy = EnemyFactory::new(16.0, Vec2::splat(32.0), 1).build(Vec2::ZERO);
        enemy.integrate(Vec2::ZERO, Vec2::new(0.0, 2.0), 0.05, 1.0, 0.5);
        assert_eq!(enemy.position, Vec2::new(0.0, 2.0));
        assert_eq!(enemy.previous_position, Vec2::ZERO);
    }

    #[test]
    fn level_up_effect_rises_fades_and_expires() {
        let mut effect = Effect::level_up(Vec2::new(0.0, 60.0));
        let mut ticks = 0;
        while effect.age() {
            ticks += 1;
        }
        assert_eq!(ticks, 19);
        assert!((effect.position.y - 80.0).abs() < f32::EPSILON);
        assert_eq!(effect.alpha, 55);
    }

    #[test]
    fn death_fade_lasts_until_transparent() {
        let mut effect = Effect::death_fade(Vec2::ZERO);
        let mut ticks = 1;
        while effect.age() {
            ticks += 1;
        }
        assert_eq!(ticks, 51);
        assert_eq!(effect.alpha, 0);
    }

    #[test]
    fn attack_follows_anchor_and_grows() {
        let mut attack = Attack {
            weapon: WeaponKind::Punch,
            offset: Vec2::new(-25.0, 0.0),
            position: Vec2::ZERO,
            size: Vec2::new(30.0, 50.0),
            growth: Vec2::new(0.15, 0.2),
            life: 2,
        };
        assert!(attack.age(Vec2::new(100.0, 10.0)));
        assert_eq!(attack.position, Vec2::new(75.0, 10.0));
        assert!((attack.size.y - 50.2).abs() < 1e-4);
        assert!(!attack.age(Vec2::new(100.0, 10.0)));
    }

    #[test]
    fn weapon_slot_only_cools_when_unlocked() {
        let mut slot = WeaponSlot::new(WeaponKind::Punch, 2);
        assert!(!slot.cool());
        assert_eq!(slot.remaining, 2);

        slot.unlocked = true;
        assert!(!slot.cool());
        assert!(slot.cool());
        assert!(slot.is_ready());
        assert!(!slot.cool());
    }

    #[test]
    fn healing_is_capped_at_maximum() {
        let mut player = Player {
            position: Vec2::ZERO,
            health: 10,
            max_health: 16,
            speed: 4.5,
            facing_left: false,
            size: Vec2::new(32.0, 48.0),
            hitbox: Vec2::new(12.0, 18.0),
        };
        player.heal(4);
        assert_eq!(player.health, 14);
        player.heal(40);
        assert_eq!(player.health, 16);
    }

    #[test]
    fn walking_clamps_heading_and_tracks_facing() {
        let mut player = Player {
            position: Vec2::ZERO,
            health: 16,
            max_health: 16,
            speed: 4.5,
            facing_left: false,
            size: Vec2::new(32.0, 48.0),
            hitbox: Vec2::new(12.0, 18.0),
        };
        player.walk(Vec2::new(-3.0, 0.0));
        assert_eq!(player.position, Vec2::new(-4.5, 0.0));
        assert!(player.facing_left);

        player.walk(Vec2::new(0.0, 1.0));
        assert!(player.facing_left);
    }
}
