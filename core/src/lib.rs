#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde Survival simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views such as [`FlowFieldView`] and [`EnemyView`], and
//! respond exclusively with new command batches.

pub mod config;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{ConfigError, GameConfig};

/// Number of simulation ticks that make up one second of game time.
pub const TICKS_PER_SECOND: u64 = 60;

/// Distance field value stored for cells the breadth-first search never reached.
pub const UNVISITED: u32 = u32::MAX;

/// Distance reported for unvisited or out-of-grid cells when scanning neighbours.
pub const FAR_DISTANCE: u32 = 1000;

/// Describes which top-level state the game is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen waiting for the player to start a run.
    Title,
    /// Active run where enemies hunt the player.
    Gameplay,
    /// The player died; the run summary is frozen until a restart.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh run, resetting every entity and the navigation grid.
    StartGame,
    /// Advances the simulation clock by a single fixed step.
    Tick,
    /// Moves the player along the provided heading at the configured speed.
    MovePlayer {
        /// Desired movement direction; its length is clamped to one.
        heading: Vec2,
    },
    /// Requests that a new enemy enter the arena.
    SpawnEnemy {
        /// World position the enemy appears at.
        position: Vec2,
    },
    /// Applies one integration step to an enemy.
    SteerEnemy {
        /// Enemy being steered.
        enemy: EnemyId,
        /// Unit steering direction used as acceleration.
        heading: Vec2,
        /// Positional correction applied after integration.
        push: Vec2,
    },
    /// Shifts an enemy without affecting its velocity history.
    DisplaceEnemy {
        /// Enemy being displaced.
        enemy: EnemyId,
        /// Offset added to the enemy position.
        offset: Vec2,
    },
    /// Reduces an enemy's health, killing it once depleted.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Hit points removed.
        amount: u32,
    },
    /// Reduces the player's health.
    DamagePlayer {
        /// Hit points removed.
        amount: u32,
    },
    /// Fires the provided weapon if it is unlocked and ready.
    FireWeapon {
        /// Weapon being fired.
        weapon: WeaponKind,
    },
    /// Collects a pickup on behalf of the player.
    CollectPickup {
        /// Pickup being collected.
        pickup: PickupId,
    },
    /// Promotes the player to the next level.
    LevelUp,
    /// Places an obstacle on a grid cell, adding its cost to any hazard
    /// already there. A cell holds at most one obstacle.
    PlaceObstacle {
        /// Cell receiving the obstacle.
        cell: CellCoord,
    },
    /// Clears the obstacle previously placed at a grid cell.
    RemoveObstacle {
        /// Cell losing the obstacle.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the game entered a new mode.
    GameModeChanged {
        /// Mode that became active.
        mode: GameMode,
    },
    /// Indicates that the simulation clock advanced by one step.
    TimeAdvanced {
        /// Index of the gameplay tick that just started.
        tick: u64,
    },
    /// Reports that the distance and direction fields were rebuilt.
    FlowFieldRebuilt {
        /// Goal cell the fields were anchored at.
        goal: CellCoord,
    },
    /// Reports that a cell's cost changed.
    CostChanged {
        /// Cell whose cost changed.
        cell: CellCoord,
        /// Cost stored after the change.
        cost: u32,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Position the enemy appeared at.
        position: Vec2,
    },
    /// Reports that a spawn request was dropped because the enemy cap is reached.
    EnemySpawnRejected {
        /// Position the rejected spawn requested.
        position: Vec2,
    },
    /// Confirms that an enemy lost health but survived.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health remaining after the hit.
        health: i32,
    },
    /// Confirms that an enemy died.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Position at the moment of death.
        position: Vec2,
    },
    /// Confirms that the player lost health.
    PlayerDamaged {
        /// Health remaining after the hit.
        health: i32,
    },
    /// Announces that the player's health ran out.
    PlayerDied,
    /// Announces that a weapon finished its cooldown.
    WeaponReady {
        /// Weapon that can fire again.
        weapon: WeaponKind,
    },
    /// Confirms that a weapon fired.
    WeaponFired {
        /// Weapon that fired.
        weapon: WeaponKind,
    },
    /// Confirms that a hazard now occupies a cell.
    HazardPlaced {
        /// Cell covered by the hazard.
        cell: CellCoord,
    },
    /// Confirms that a hazard ran out and released its cell.
    HazardExpired {
        /// Cell previously covered by the hazard.
        cell: CellCoord,
    },
    /// Confirms that a pickup appeared in the arena.
    PickupDropped {
        /// Identifier assigned to the pickup.
        pickup: PickupId,
        /// Behaviour applied when the pickup is collected.
        kind: PickupKind,
    },
    /// Confirms that the player collected a pickup.
    PickupCollected {
        /// Pickup that was collected.
        pickup: PickupId,
        /// Behaviour that was applied.
        kind: PickupKind,
    },
    /// Announces that the player reached a new level.
    LeveledUp {
        /// Level reached.
        level: u32,
    },
    /// Announces that a new weapon became available.
    WeaponUnlocked {
        /// Weapon that was unlocked.
        weapon: WeaponKind,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Weapons the player can unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Short-range punch wave attached to the player.
    Punch,
    /// Electrified patch dropped on the player's cell.
    ShockField,
}

impl WeaponKind {
    /// Every weapon in unlock order.
    pub const ALL: [WeaponKind; 2] = [WeaponKind::Punch, WeaponKind::ShockField];

    /// Player level at which the weapon becomes available.
    #[must_use]
    pub const fn unlock_level(self) -> u32 {
        match self {
            Self::Punch => 1,
            Self::ShockField => 3,
        }
    }
}

/// Behaviour attached to a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Grants experience points.
    Experience {
        /// Experience granted.
        value: u32,
    },
    /// Restores player health up to the maximum.
    Health {
        /// Hit points restored.
        amount: u32,
    },
}

/// Timed visual effects kept alive by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Floating "level up" banner above the player.
    LevelUp,
    /// Fading corpse left behind by a killed enemy.
    DeathFade,
}

/// Compass directions stored in the direction field.
///
/// North points toward increasing rows (y-up world space).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing rows.
    North,
    /// Toward increasing columns and rows.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Toward increasing columns and decreasing rows.
    SouthEast,
    /// Toward decreasing rows.
    South,
    /// Toward decreasing columns and rows.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Toward decreasing columns and increasing rows.
    NorthWest,
}

impl Direction {
    /// Neighbour scan order used when deriving the direction field.
    ///
    /// Axis-aligned neighbours come first so ties resolve toward them.
    pub const SCAN_ORDER: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Column and row delta to the neighbouring cell in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }

    /// Pre-normalised world-space vector for this direction.
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        use std::f32::consts::FRAC_1_SQRT_2;

        match self {
            Self::North => Vec2::new(0.0, 1.0),
            Self::NorthEast => Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            Self::East => Vec2::new(1.0, 0.0),
            Self::SouthEast => Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            Self::South => Vec2::new(0.0, -1.0),
            Self::SouthWest => Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            Self::West => Vec2::new(-1.0, 0.0),
            Self::NorthWest => Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed because world positions outside the grid still map
/// to a (out-of-grid) cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (column, row) = direction.offset();
        Self::new(self.column + column, self.row + row)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Square grid layout that maps world positions onto cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    dimension: u32,
    cell_size: f32,
    origin: Vec2,
}

impl GridGeometry {
    /// Creates a square grid with `dimension` cells per side.
    #[must_use]
    pub const fn new(dimension: u32, cell_size: f32, origin: Vec2) -> Self {
        Self {
            dimension,
            cell_size,
            origin,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimension
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimension
    }

    /// Edge length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the grid's lower-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let side = usize::try_from(self.dimension).unwrap_or(0);
        side.saturating_mul(side)
    }

    /// Edge length of the whole grid in world units.
    #[must_use]
    pub fn world_extent(&self) -> f32 {
        self.dimension as f32 * self.cell_size
    }

    /// Converts a world position into the containing cell.
    ///
    /// The result is not clamped and may lie outside the grid.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> CellCoord {
        let local = (position - self.origin) / self.cell_size;
        CellCoord::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// World position of a cell's centre.
    ///
    /// The cell is clamped into the grid first, so out-of-grid cells map onto
    /// the nearest border cell.
    #[must_use]
    pub fn cell_to_world_center(&self, cell: CellCoord) -> Vec2 {
        let last = i32::try_from(self.dimension).unwrap_or(i32::MAX).saturating_sub(1).max(0);
        let column = cell.column().clamp(0, last) as f32;
        let row = cell.row().clamp(0, last) as f32;
        let half = self.cell_size * 0.5;
        self.origin + Vec2::new(column * self.cell_size + half, row * self.cell_size + half)
    }

    /// Reports whether the cell lies outside the grid bounds.
    #[must_use]
    pub fn is_outside(&self, cell: CellCoord) -> bool {
        self.index(cell).is_none()
    }

    /// Row-major index of an in-grid cell.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.dimension || row >= self.dimension {
            return None;
        }

        let width = usize::try_from(self.dimension).ok()?;
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at a row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> CellCoord {
        let width = usize::try_from(self.dimension).unwrap_or(1).max(1);
        let column = i32::try_from(index % width).unwrap_or(i32::MAX);
        let row = i32::try_from(index / width).unwrap_or(i32::MAX);
        CellCoord::new(column, row)
    }
}

/// Axis-aligned rectangle anchored at its centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    center: Vec2,
    half_extents: Vec2,
}

impl Bounds {
    /// Creates a rectangle of the given full size centred on `center`.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    /// Centre of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Smallest corner of the rectangle.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Largest corner of the rectangle.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Reports whether two rectangles overlap with a non-zero area.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Centre of the player in world space.
    pub position: Vec2,
    /// Remaining health.
    pub health: i32,
    /// Maximum health.
    pub max_health: i32,
    /// Whether the player faces toward negative x.
    pub facing_left: bool,
    /// Sprite-sized rectangle used for pickups.
    pub bounds: Bounds,
    /// Small rectangle used for enemy contact damage.
    pub hitbox: Bounds,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Current position.
    pub position: Vec2,
    /// Position before the last integration step.
    pub previous_position: Vec2,
    /// Collision radius used for separation.
    pub radius: f32,
    /// Remaining health.
    pub health: i32,
    /// Sprite-sized bounding rectangle.
    pub bounds: Bounds,
    /// Cosmetic variant assigned at spawn.
    pub appearance: EnemyAppearance,
}

/// Cosmetic variant of an enemy, assigned by the world's enemy factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EnemyAppearance {
    /// Sprite row used for the enemy.
    pub style: u8,
    /// Whether the sprite is mirrored horizontally.
    pub flipped: bool,
}

/// Read-only snapshot describing all living enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an active attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackSnapshot {
    /// Weapon that produced the attack.
    pub weapon: WeaponKind,
    /// Area damaging enemies this tick.
    pub bounds: Bounds,
    /// Remaining lifetime in ticks.
    pub life: u32,
}

/// Cooldown state of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeaponSnapshot {
    /// Weapon described by the snapshot.
    pub kind: WeaponKind,
    /// Whether the player has unlocked the weapon.
    pub unlocked: bool,
    /// Ticks left before the weapon can fire.
    pub cooldown_remaining: u32,
}

impl WeaponSnapshot {
    /// Reports whether the weapon can fire this tick.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.unlocked && self.cooldown_remaining == 0
    }
}

/// Immutable representation of a pickup lying in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupSnapshot {
    /// Identifier assigned to the pickup.
    pub id: PickupId,
    /// Behaviour applied on collection.
    pub kind: PickupKind,
    /// Area the player must touch to collect the pickup.
    pub bounds: Bounds,
}

/// Immutable representation of a running visual effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSnapshot {
    /// Kind of effect.
    pub kind: EffectKind,
    /// Current position.
    pub position: Vec2,
    /// Remaining opacity in the 0..=255 range.
    pub alpha: u8,
}

/// Immutable representation of a hazard occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardSnapshot {
    /// Cell covered by the hazard.
    pub cell: CellCoord,
    /// Ticks left before the hazard expires.
    pub remaining: u32,
}

/// Score, experience and level of the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Player level, starting at one.
    pub level: u32,
    /// Experience gathered toward the next level.
    pub experience: u32,
    /// Accumulated score.
    pub score: u32,
    /// Enemies killed during the run.
    pub kills: u32,
    /// Gameplay ticks elapsed during the run.
    pub ticks: u64,
}

impl ProgressSnapshot {
    /// Whole seconds survived during the run.
    #[must_use]
    pub const fn seconds_survived(&self) -> u64 {
        self.ticks / TICKS_PER_SECOND
    }
}

/// Read-only view into the flow field maintained by the world grid.
#[derive(Clone, Copy, Debug)]
pub struct FlowFieldView<'a> {
    geometry: GridGeometry,
    costs: &'a [u32],
    distances: &'a [u32],
    directions: &'a [Direction],
    goal: CellCoord,
}

impl<'a> FlowFieldView<'a> {
    /// Captures a new view backed by the provided dense fields.
    #[must_use]
    pub fn new(
        geometry: GridGeometry,
        costs: &'a [u32],
        distances: &'a [u32],
        directions: &'a [Direction],
        goal: CellCoord,
    ) -> Self {
        Self {
            geometry,
            costs,
            distances,
            directions,
            goal,
        }
    }

    /// Layout of the grid backing the view.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Goal cell the fields were last computed for.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Cost stored for the cell, if it lies within the grid.
    #[must_use]
    pub fn cost(&self, cell: CellCoord) -> Option<u32> {
        self.geometry
            .index(cell)
            .and_then(|index| self.costs.get(index).copied())
    }

    /// Reports whether the cell carries a non-zero cost.
    #[must_use]
    pub fn is_impassable(&self, cell: CellCoord) -> bool {
        self.cost(cell).is_some_and(|cost| cost > 0)
    }

    /// Reports whether the cell carries a damaging cost.
    #[must_use]
    pub fn is_hazardous(&self, cell: CellCoord) -> bool {
        self.cost(cell).is_some_and(|cost| cost > 1)
    }

    /// Hop distance to the goal, or `None` for unvisited and out-of-grid cells.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.geometry
            .index(cell)
            .and_then(|index| self.distances.get(index).copied())
            .filter(|distance| *distance != UNVISITED)
    }

    /// Hop distance with unvisited and out-of-grid cells reported as [`FAR_DISTANCE`].
    #[must_use]
    pub fn distance_value(&self, cell: CellCoord) -> u32 {
        self.distance(cell).unwrap_or(FAR_DISTANCE)
    }

    /// Steering direction stored for the cell, if it lies within the grid.
    #[must_use]
    pub fn direction(&self, cell: CellCoord) -> Option<Direction> {
        self.geometry
            .index(cell)
            .and_then(|index| self.directions.get(index).copied())
    }
}
