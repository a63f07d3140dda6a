#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Horde Survival.

mod entities;
mod grid;

use glam::Vec2;
use horde_survival_core::{
    CellCoord, Command, EnemyId, Event, GameConfig, GameMode, PickupId, PickupKind,
    ProgressSnapshot, WeaponKind,
};
use tracing::{debug, info, trace, warn};

use entities::{Attack, Effect, Enemy, EnemyFactory, Hazard, Pickup, Player, WeaponSlot};
pub use grid::WorldGrid;

/// Height above the player at which the level-up banner appears.
const LEVEL_UP_EFFECT_OFFSET: f32 = 60.0;

/// Represents the authoritative Horde Survival world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    mode: GameMode,
    grid: WorldGrid,
    player: Player,
    enemies: Vec<Enemy>,
    factory: EnemyFactory,
    attacks: Vec<Attack>,
    hazards: Vec<Hazard>,
    pickups: Vec<Pickup>,
    next_pickup_id: u32,
    effects: Vec<Effect>,
    weapons: Vec<WeaponSlot>,
    progress: ProgressSnapshot,
}

impl World {
    /// Creates a world on the title screen using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Creates a world on the title screen using the provided configuration.
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        let mut world = Self {
            mode: GameMode::Title,
            grid: WorldGrid::new(config.grid.geometry()),
            player: fresh_player(&config),
            enemies: Vec::new(),
            factory: fresh_factory(&config),
            attacks: Vec::new(),
            hazards: Vec::new(),
            pickups: Vec::new(),
            next_pickup_id: 0,
            effects: Vec::new(),
            weapons: Vec::new(),
            progress: ProgressSnapshot::default(),
            config,
        };
        world.reset_run();
        world
    }

    fn reset_run(&mut self) {
        self.grid = WorldGrid::new(self.config.grid.geometry());
        for cell in self.config.obstacle_cells() {
            if self.grid.is_outside_grid(cell) {
                warn!(?cell, "obstacle lies outside the grid and is ignored");
                continue;
            }
            self.grid.set_impassable(cell);
        }

        self.player = fresh_player(&self.config);
        self.player.position = self.grid.cell_to_world_center(CellCoord::new(
            self.config.player.start_cell[0],
            self.config.player.start_cell[1],
        ));
        self.enemies.clear();
        self.factory = fresh_factory(&self.config);
        self.attacks.clear();
        self.hazards.clear();
        self.pickups.clear();
        self.next_pickup_id = 0;
        self.effects.clear();
        self.progress = ProgressSnapshot {
            level: 1,
            ..ProgressSnapshot::default()
        };
        self.weapons = WeaponKind::ALL
            .iter()
            .map(|kind| {
                let mut slot = WeaponSlot::new(*kind, self.cooldown_for(*kind));
                slot.unlocked = kind.unlock_level() <= self.progress.level;
                slot
            })
            .collect();
    }

    fn cooldown_for(&self, weapon: WeaponKind) -> u32 {
        let combat = &self.config.combat;
        match weapon {
            WeaponKind::Punch => {
                let levels = self.progress.level.saturating_sub(1);
                combat
                    .punch_cooldown
                    .saturating_sub(levels.saturating_mul(combat.punch_cooldown_step))
                    .max(combat.punch_cooldown_floor)
            }
            WeaponKind::ShockField => combat.shock_cooldown,
        }
    }

    fn set_mode(&mut self, mode: GameMode, out_events: &mut Vec<Event>) {
        if self.mode == mode {
            return;
        }
        info!(from = ?self.mode, to = ?mode, "game mode changed");
        self.mode = mode;
        out_events.push(Event::GameModeChanged { mode });
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    fn weapon_mut(&mut self, kind: WeaponKind) -> Option<&mut WeaponSlot> {
        self.weapons.iter_mut().find(|slot| slot.kind == kind)
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        self.progress.ticks = self.progress.ticks.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.progress.ticks,
        });

        let mut index = 0;
        while index < self.hazards.len() {
            let hazard = &mut self.hazards[index];
            hazard.remaining = hazard.remaining.saturating_sub(1);
            if hazard.remaining > 0 {
                index += 1;
                continue;
            }
            let expired = self.hazards.remove(index);
            self.grid.decrease_cost(expired.cell, expired.cost);
            out_events.push(Event::HazardExpired { cell: expired.cell });
            self.push_cost_changed(expired.cell, out_events);
        }

        let goal = self.grid.world_to_cell(self.player.position);
        if self.grid.update_goal(goal) {
            debug!(?goal, rebuilds = self.grid.rebuilds(), "flow field rebuilt");
            out_events.push(Event::FlowFieldRebuilt { goal });
        }

        let anchor = self.player.position;
        self.attacks.retain_mut(|attack| attack.age(anchor));
        self.effects.retain_mut(Effect::age);

        for slot in &mut self.weapons {
            if slot.cool() {
                out_events.push(Event::WeaponReady { weapon: slot.kind });
            }
        }
    }

    fn fire(&mut self, weapon: WeaponKind, out_events: &mut Vec<Event>) {
        let Some(slot) = self.weapon_mut(weapon) else {
            return;
        };
        if !slot.is_ready() {
            trace!(?weapon, "weapon not ready");
            return;
        }
        slot.remaining = slot.cooldown;

        let combat = &self.config.combat;
        match weapon {
            WeaponKind::Punch => {
                let side = if self.player.facing_left { -1.0 } else { 1.0 };
                let offset = Vec2::new(side * combat.attack_offset, 0.0);
                self.attacks.push(Attack {
                    weapon,
                    offset,
                    position: self.player.position + offset,
                    size: Vec2::from(combat.attack_size),
                    growth: Vec2::from(combat.attack_growth),
                    life: combat.attack_life,
                });
            }
            WeaponKind::ShockField => {
                let cell = self.grid.world_to_cell(self.player.position);
                if self.grid.is_outside_grid(cell) {
                    debug!(?cell, "shock field fizzled outside the grid");
                } else {
                    let cost = combat.shock_cost;
                    self.hazards.push(Hazard {
                        cell,
                        remaining: combat.shock_duration,
                        cost,
                    });
                    self.grid.increase_cost(cell, cost);
                    out_events.push(Event::HazardPlaced { cell });
                    self.push_cost_changed(cell, out_events);
                }
            }
        }
        out_events.push(Event::WeaponFired { weapon });
    }

    fn kill(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let enemy = self.enemies.remove(index);
        self.progress.kills = self.progress.kills.saturating_add(1);
        self.progress.score = self
            .progress
            .score
            .saturating_add(self.config.enemy.score_per_kill);
        out_events.push(Event::EnemyKilled {
            enemy: enemy.id,
            position: enemy.position,
        });
        self.effects.push(Effect::death_fade(enemy.position));

        let combat = &self.config.combat;
        let kind = if combat.health_drop_every > 0
            && self.progress.kills % combat.health_drop_every == 0
        {
            PickupKind::Health {
                amount: combat.health_per_pickup,
            }
        } else {
            PickupKind::Experience {
                value: combat.experience_per_pickup,
            }
        };
        let pickup = PickupId::new(self.next_pickup_id);
        self.next_pickup_id = self.next_pickup_id.wrapping_add(1);
        self.pickups.push(Pickup {
            id: pickup,
            kind,
            position: enemy.position,
        });
        out_events.push(Event::PickupDropped { pickup, kind });
    }

    fn level_up(&mut self, out_events: &mut Vec<Event>) {
        self.progress.level = self.progress.level.saturating_add(1);
        self.progress.experience = 0;
        let level = self.progress.level;
        info!(level, "player levelled up");
        out_events.push(Event::LeveledUp { level });
        self.effects.push(Effect::level_up(
            self.player.position + Vec2::new(0.0, LEVEL_UP_EFFECT_OFFSET),
        ));

        for kind in WeaponKind::ALL {
            let cooldown = self.cooldown_for(kind);
            let Some(slot) = self.weapon_mut(kind) else {
                continue;
            };
            slot.cooldown = cooldown;
            slot.remaining = slot.remaining.min(cooldown);
            if !slot.unlocked && kind.unlock_level() <= level {
                slot.unlocked = true;
                info!(weapon = ?kind, "weapon unlocked");
                out_events.push(Event::WeaponUnlocked { weapon: kind });
            }
        }
    }

    fn push_cost_changed(&self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if let Some(cost) = self.grid.cost(cell) {
            out_events.push(Event::CostChanged { cell, cost });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_player(config: &GameConfig) -> Player {
    Player {
        position: Vec2::ZERO,
        health: config.player.health,
        max_health: config.player.health,
        speed: config.player.move_speed,
        facing_left: false,
        size: Vec2::from(config.player.size),
        hitbox: Vec2::from(config.player.hitbox),
    }
}

fn fresh_factory(config: &GameConfig) -> EnemyFactory {
    EnemyFactory::new(
        config.enemy.radius,
        Vec2::from(config.enemy.size),
        config.enemy.health,
    )
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every command other than [`Command::StartGame`] is ignored outside of
/// [`GameMode::Gameplay`]. Commands naming entities that no longer exist are
/// ignored as well.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.mode != GameMode::Gameplay && command != Command::StartGame {
        trace!(?command, mode = ?world.mode, "command ignored outside gameplay");
        return;
    }

    match command {
        Command::StartGame => {
            if world.mode == GameMode::Gameplay {
                return;
            }
            world.reset_run();
            world.set_mode(GameMode::Gameplay, out_events);
            let goal = world.grid.world_to_cell(world.player.position);
            if world.grid.update_goal(goal) {
                out_events.push(Event::FlowFieldRebuilt { goal });
            }
        }
        Command::Tick => world.advance(out_events),
        Command::MovePlayer { heading } => world.player.walk(heading),
        Command::SpawnEnemy { position } => {
            if world.enemies.len() >= world.config.enemy.cap {
                trace!(?position, "enemy cap reached");
                out_events.push(Event::EnemySpawnRejected { position });
                return;
            }
            let enemy = world.factory.build(position);
            debug!(id = enemy.id.get(), ?position, "enemy spawned");
            out_events.push(Event::EnemySpawned {
                enemy: enemy.id,
                position,
            });
            world.enemies.push(enemy);
        }
        Command::SteerEnemy {
            enemy,
            heading,
            push,
        } => {
            let (acceleration, drag, timestep) = (
                world.config.enemy.acceleration,
                world.config.enemy.drag,
                world.config.enemy.timestep,
            );
            if let Some(enemy) = world.enemy_mut(enemy) {
                enemy.integrate(heading, push, acceleration, drag, timestep);
            }
        }
        Command::DisplaceEnemy { enemy, offset } => {
            if let Some(enemy) = world.enemy_mut(enemy) {
                enemy.position += offset;
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            let Some(index) = world.enemies.iter().position(|e| e.id == enemy) else {
                return;
            };
            let amount = i32::try_from(amount).unwrap_or(i32::MAX);
            let target = &mut world.enemies[index];
            target.health = target.health.saturating_sub(amount);
            if target.health > 0 {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    health: target.health,
                });
            } else {
                world.kill(index, out_events);
            }
        }
        Command::DamagePlayer { amount } => {
            let amount = i32::try_from(amount).unwrap_or(i32::MAX);
            world.player.health = world.player.health.saturating_sub(amount);
            out_events.push(Event::PlayerDamaged {
                health: world.player.health,
            });
            if world.player.health <= 0 {
                if world.config.cheats.god_mode {
                    trace!("god mode kept the player alive");
                    return;
                }
                out_events.push(Event::PlayerDied);
                world.set_mode(GameMode::GameOver, out_events);
            }
        }
        Command::FireWeapon { weapon } => world.fire(weapon, out_events),
        Command::CollectPickup { pickup } => {
            let Some(index) = world.pickups.iter().position(|p| p.id == pickup) else {
                return;
            };
            let collected = world.pickups.remove(index);
            match collected.kind {
                PickupKind::Experience { value } => {
                    world.progress.experience = world.progress.experience.saturating_add(value);
                }
                PickupKind::Health { amount } => world.player.heal(amount),
            }
            out_events.push(Event::PickupCollected {
                pickup,
                kind: collected.kind,
            });
        }
        Command::LevelUp => world.level_up(out_events),
        Command::PlaceObstacle { cell } => {
            world.grid.set_impassable(cell);
            world.push_cost_changed(cell, out_events);
        }
        Command::RemoveObstacle { cell } => {
            world.grid.clear_impassable(cell);
            world.push_cost_changed(cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use horde_survival_core::{
        AttackSnapshot, EffectSnapshot, EnemyView, FlowFieldView, GameConfig, GameMode,
        HazardSnapshot, PickupSnapshot, PlayerSnapshot, ProgressSnapshot, WeaponSnapshot,
    };

    use super::{World, WorldGrid};

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Mode the game is currently in.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Provides read-only access to the navigation grid.
    #[must_use]
    pub fn grid(world: &World) -> &WorldGrid {
        &world.grid
    }

    /// Captures the cost, distance and direction fields.
    #[must_use]
    pub fn flow_field(world: &World) -> FlowFieldView<'_> {
        world.grid.view()
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures every living enemy, ordered by identifier.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures the active attacks in creation order.
    #[must_use]
    pub fn attacks(world: &World) -> Vec<AttackSnapshot> {
        world.attacks.iter().map(|attack| attack.snapshot()).collect()
    }

    /// Captures the pickups lying in the arena, ordered by identifier.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        let mut pickups: Vec<PickupSnapshot> =
            world.pickups.iter().map(|pickup| pickup.snapshot()).collect();
        pickups.sort_by_key(|pickup| pickup.id);
        pickups
    }

    /// Captures the running visual effects.
    #[must_use]
    pub fn effects(world: &World) -> Vec<EffectSnapshot> {
        world.effects.iter().map(|effect| effect.snapshot()).collect()
    }

    /// Captures the active hazards.
    #[must_use]
    pub fn hazards(world: &World) -> Vec<HazardSnapshot> {
        world.hazards.iter().map(|hazard| hazard.snapshot()).collect()
    }

    /// Captures the cooldown state of every weapon.
    #[must_use]
    pub fn weapons(world: &World) -> Vec<WeaponSnapshot> {
        world.weapons.iter().map(|slot| slot.snapshot()).collect()
    }

    /// Score, experience, level and elapsed ticks of the current run.
    #[must_use]
    pub fn progress(world: &World) -> ProgressSnapshot {
        world.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_survival_core::WeaponSnapshot;

    fn started(config: GameConfig) -> (World, Vec<Event>) {
        let mut world = World::with_config(config);
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame, &mut events);
        (world, events)
    }

    fn open_config() -> GameConfig {
        GameConfig {
            obstacles: Vec::new(),
            ..GameConfig::default()
        }
    }

    #[test]
    fn world_starts_on_title_and_ignores_gameplay_commands() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec2::ZERO,
            },
            &mut events,
        );

        assert_eq!(query::mode(&world), GameMode::Title);
        assert!(events.is_empty());
        assert_eq!(query::progress(&world).ticks, 0);
    }

    #[test]
    fn start_game_enters_gameplay_and_seeds_field() {
        let (world, events) = started(GameConfig::default());
        assert_eq!(query::mode(&world), GameMode::Gameplay);
        assert_eq!(
            events,
            vec![
                Event::GameModeChanged {
                    mode: GameMode::Gameplay
                },
                Event::FlowFieldRebuilt {
                    goal: CellCoord::new(10, 10)
                },
            ]
        );
        assert_eq!(query::player(&world).position, Vec2::new(420.0, 420.0));
        assert!(query::grid(&world).is_impassable(CellCoord::new(20, 5)));
        assert_eq!(query::progress(&world).level, 1);
    }

    #[test]
    fn out_of_grid_obstacles_are_skipped() {
        let mut config = open_config();
        config.obstacles = vec![[-1, 4], [2, 2]];
        let (world, _) = started(config);
        let costs = query::grid(&world).cost_field();
        assert_eq!(costs.iter().filter(|cost| **cost > 0).count(), 1);
    }

    #[test]
    fn tick_rebuilds_only_when_goal_moves() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(events, vec![Event::TimeAdvanced { tick: 1 }]);

        events.clear();
        for _ in 0..10 {
            apply(
                &mut world,
                Command::MovePlayer {
                    heading: Vec2::new(1.0, 0.0),
                },
                &mut events,
            );
        }
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::FlowFieldRebuilt {
            goal: CellCoord::new(11, 10)
        }));
        assert_eq!(query::flow_field(&world).goal(), CellCoord::new(11, 10));
    }

    #[test]
    fn spawns_respect_the_cap() {
        let mut config = open_config();
        config.enemy.cap = 2;
        let (mut world, _) = started(config);
        let mut events = Vec::new();
        for index in 0..3 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    position: Vec2::splat(index as f32),
                },
                &mut events,
            );
        }

        assert_eq!(query::enemy_view(&world).len(), 2);
        assert_eq!(
            events.last(),
            Some(&Event::EnemySpawnRejected {
                position: Vec2::splat(2.0)
            })
        );
    }

    #[test]
    fn killing_an_enemy_scores_and_drops_experience() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec2::new(50.0, 60.0),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: EnemyId::new(0),
                amount: 1,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EnemyKilled {
                    enemy: EnemyId::new(0),
                    position: Vec2::new(50.0, 60.0)
                },
                Event::PickupDropped {
                    pickup: PickupId::new(0),
                    kind: PickupKind::Experience { value: 1 }
                },
            ]
        );
        let progress = query::progress(&world);
        assert_eq!(progress.score, 10);
        assert_eq!(progress.kills, 1);
        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::effects(&world).len(), 1);
    }

    #[test]
    fn every_configured_kill_drops_health() {
        let mut config = open_config();
        config.combat.health_drop_every = 2;
        let (mut world, _) = started(config);
        let mut events = Vec::new();
        for id in 0..2 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    position: Vec2::ZERO,
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::DamageEnemy {
                    enemy: EnemyId::new(id),
                    amount: 5,
                },
                &mut events,
            );
        }
        let kinds: Vec<PickupKind> = query::pickups(&world).iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PickupKind::Experience { value: 1 },
                PickupKind::Health { amount: 4 }
            ]
        );
    }

    #[test]
    fn damage_to_missing_enemy_is_ignored() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: EnemyId::new(42),
                amount: 1,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn lethal_damage_ends_the_run() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(&mut world, Command::DamagePlayer { amount: 16 }, &mut events);
        assert_eq!(query::mode(&world), GameMode::GameOver);
        assert_eq!(
            events,
            vec![
                Event::PlayerDamaged { health: 0 },
                Event::PlayerDied,
                Event::GameModeChanged {
                    mode: GameMode::GameOver
                },
            ]
        );

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn god_mode_survives_lethal_damage() {
        let mut config = open_config();
        config.cheats.god_mode = true;
        let (mut world, _) = started(config);
        let mut events = Vec::new();
        apply(&mut world, Command::DamagePlayer { amount: 40 }, &mut events);
        assert_eq!(query::mode(&world), GameMode::Gameplay);
        assert_eq!(query::player(&world).health, -24);
    }

    #[test]
    fn restart_after_game_over_resets_the_run() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::DamagePlayer { amount: 99 }, &mut events);
        apply(&mut world, Command::StartGame, &mut events);

        assert_eq!(query::mode(&world), GameMode::Gameplay);
        assert!(query::enemy_view(&world).is_empty());
        assert_eq!(query::progress(&world).ticks, 0);
        assert_eq!(query::player(&world).health, 16);
    }

    #[test]
    fn punch_becomes_ready_after_its_cooldown() {
        let mut config = open_config();
        config.combat.punch_cooldown = 3;
        config.combat.punch_cooldown_floor = 0;
        let (mut world, _) = started(config);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FireWeapon {
                weapon: WeaponKind::Punch,
            },
            &mut events,
        );
        assert!(events.is_empty());

        for _ in 0..3 {
            apply(&mut world, Command::Tick, &mut events);
        }
        assert!(events.contains(&Event::WeaponReady {
            weapon: WeaponKind::Punch
        }));

        events.clear();
        apply(
            &mut world,
            Command::FireWeapon {
                weapon: WeaponKind::Punch,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WeaponFired {
                weapon: WeaponKind::Punch
            }]
        );
        let attacks = query::attacks(&world);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].bounds.center(), Vec2::new(445.0, 420.0));
    }

    #[test]
    fn shock_field_raises_and_restores_cell_cost() {
        let mut config = open_config();
        config.combat.shock_cooldown = 1;
        config.combat.shock_duration = 2;
        let (mut world, _) = started(config);
        let mut events = Vec::new();
        apply(&mut world, Command::LevelUp, &mut events);
        apply(&mut world, Command::LevelUp, &mut events);
        assert!(events.contains(&Event::WeaponUnlocked {
            weapon: WeaponKind::ShockField
        }));

        apply(&mut world, Command::Tick, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::FireWeapon {
                weapon: WeaponKind::ShockField,
            },
            &mut events,
        );
        let cell = CellCoord::new(10, 10);
        assert_eq!(
            events,
            vec![
                Event::HazardPlaced { cell },
                Event::CostChanged { cell, cost: 2 },
                Event::WeaponFired {
                    weapon: WeaponKind::ShockField
                },
            ]
        );
        assert!(query::flow_field(&world).is_hazardous(cell));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::HazardExpired { cell }));
        assert!(events.contains(&Event::FlowFieldRebuilt { goal: cell }));
        assert_eq!(query::grid(&world).cost(cell), Some(0));
        assert!(query::hazards(&world).is_empty());
    }

    fn shocked_world() -> (World, CellCoord) {
        let mut config = open_config();
        config.combat.shock_cooldown = 1;
        config.combat.shock_duration = 2;
        let (mut world, _) = started(config);
        let mut events = Vec::new();
        apply(&mut world, Command::LevelUp, &mut events);
        apply(&mut world, Command::LevelUp, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        apply(
            &mut world,
            Command::FireWeapon {
                weapon: WeaponKind::ShockField,
            },
            &mut events,
        );
        let cell = CellCoord::new(10, 10);
        assert_eq!(query::grid(&world).cost(cell), Some(2));
        (world, cell)
    }

    #[test]
    fn obstacle_under_a_shock_field_outlives_the_hazard() {
        let (mut world, cell) = shocked_world();
        let mut events = Vec::new();
        apply(&mut world, Command::PlaceObstacle { cell }, &mut events);
        assert_eq!(events, vec![Event::CostChanged { cell, cost: 3 }]);

        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.contains(&Event::HazardExpired { cell }));
        assert!(query::hazards(&world).is_empty());
        assert_eq!(query::grid(&world).cost(cell), Some(1));
        assert!(query::flow_field(&world).is_impassable(cell));
    }

    #[test]
    fn removing_a_missing_obstacle_leaves_the_hazard_intact() {
        let (mut world, cell) = shocked_world();
        let mut events = Vec::new();
        apply(&mut world, Command::RemoveObstacle { cell }, &mut events);
        assert_eq!(events, vec![Event::CostChanged { cell, cost: 2 }]);
        assert!(query::flow_field(&world).is_hazardous(cell));
    }

    #[test]
    fn level_up_resets_experience_and_shortens_punch() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(&mut world, Command::LevelUp, &mut events);

        let progress = query::progress(&world);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.experience, 0);
        let punch: WeaponSnapshot = query::weapons(&world)[0];
        assert_eq!(punch.cooldown_remaining, 62);
        let effects = query::effects(&world);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].position, Vec2::new(420.0, 480.0));
    }

    #[test]
    fn steering_integrates_through_world_config() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SteerEnemy {
                enemy: EnemyId::new(0),
                heading: Vec2::X,
                push: Vec2::new(0.0, 1.0),
            },
            &mut events,
        );
        let enemy = query::enemy_view(&world).into_vec()[0];
        assert!(enemy.position.x > 0.0);
        assert!((enemy.position.y - 1.0).abs() < f32::EPSILON);
        assert_eq!(enemy.previous_position, Vec2::ZERO);
    }

    #[test]
    fn obstacles_toggle_through_commands() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        let cell = CellCoord::new(3, 3);
        apply(&mut world, Command::PlaceObstacle { cell }, &mut events);
        apply(&mut world, Command::RemoveObstacle { cell }, &mut events);
        apply(
            &mut world,
            Command::PlaceObstacle {
                cell: CellCoord::new(99, 0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::CostChanged { cell, cost: 1 },
                Event::CostChanged { cell, cost: 0 },
            ]
        );
    }

    #[test]
    fn collecting_experience_accumulates() {
        let (mut world, _) = started(open_config());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec2::ZERO,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageEnemy {
                enemy: EnemyId::new(0),
                amount: 1,
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::CollectPickup {
                pickup: PickupId::new(0),
            },
            &mut events,
        );
        assert_eq!(query::progress(&world).experience, 1);
        assert!(query::pickups(&world).is_empty());
        assert_eq!(events.len(), 1);
    }
}
