//! Flow-field navigation grid shared by every enemy.

use std::collections::VecDeque;

use glam::Vec2;
use horde_survival_core::{
    CellCoord, Direction, FlowFieldView, GridGeometry, FAR_DISTANCE, UNVISITED,
};

/// Running best used when scanning neighbours; above [`FAR_DISTANCE`] so an
/// all-far neighbourhood still picks the first scanned direction.
const SCAN_CEILING: u32 = 10_000;

/// Cost contributed by a single obstacle.
const OBSTACLE_COST: u32 = 1;

/// Cost field plus the distance and direction fields derived from it.
///
/// Distances are reverse breadth-first search results seeded from the goal
/// cell over the four axis-aligned neighbours; directions are derived from the
/// eight surrounding distances so agents can move diagonally. Both derived
/// fields are rebuilt from scratch, never patched.
#[derive(Clone, Debug)]
pub struct WorldGrid {
    geometry: GridGeometry,
    costs: Vec<u32>,
    obstacles: Vec<bool>,
    distances: Vec<u32>,
    directions: Vec<Direction>,
    goal: CellCoord,
    computed_goal: Option<CellCoord>,
    dirty: bool,
    rebuilds: u64,
}

impl WorldGrid {
    /// Creates an all-passable grid with the provided layout.
    #[must_use]
    pub fn new(geometry: GridGeometry) -> Self {
        let cell_count = geometry.cell_count();
        Self {
            geometry,
            costs: vec![0; cell_count],
            obstacles: vec![false; cell_count],
            distances: vec![UNVISITED; cell_count],
            directions: vec![Direction::North; cell_count],
            goal: CellCoord::new(0, 0),
            computed_goal: None,
            dirty: true,
            rebuilds: 0,
        }
    }

    /// Layout of the grid.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Overwrites the cost of a cell. Out-of-grid cells are ignored.
    pub fn set_cost(&mut self, cell: CellCoord, cost: u32) {
        self.mutate_cost(cell, |_| cost);
    }

    /// Adds `amount` to the cost of a cell, saturating at `u32::MAX`.
    pub fn increase_cost(&mut self, cell: CellCoord, amount: u32) {
        self.mutate_cost(cell, |current| current.saturating_add(amount));
    }

    /// Removes `amount` from the cost of a cell, never dropping below zero.
    pub fn decrease_cost(&mut self, cell: CellCoord, amount: u32) {
        self.mutate_cost(cell, |current| current.saturating_sub(amount));
    }

    /// Places an obstacle on the cell, adding its cost on top of whatever
    /// the cell already carries. A cell holds at most one obstacle.
    pub fn set_impassable(&mut self, cell: CellCoord) {
        let Some(index) = self.geometry.index(cell) else {
            return;
        };
        if self.obstacles[index] {
            return;
        }
        self.obstacles[index] = true;
        self.increase_cost(cell, OBSTACLE_COST);
    }

    /// Removes an obstacle placed with [`WorldGrid::set_impassable`],
    /// subtracting only its own cost. Cells without an obstacle are left
    /// untouched.
    pub fn clear_impassable(&mut self, cell: CellCoord) {
        let Some(index) = self.geometry.index(cell) else {
            return;
        };
        if !self.obstacles[index] {
            return;
        }
        self.obstacles[index] = false;
        self.decrease_cost(cell, OBSTACLE_COST);
    }

    /// Reports whether an obstacle sits on the cell.
    #[must_use]
    pub fn has_obstacle(&self, cell: CellCoord) -> bool {
        self.geometry
            .index(cell)
            .is_some_and(|index| self.obstacles[index])
    }

    fn mutate_cost<F>(&mut self, cell: CellCoord, update: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let Some(index) = self.geometry.index(cell) else {
            return;
        };

        let current = self.costs[index];
        let next = update(current);
        if next != current {
            self.costs[index] = next;
            self.dirty = true;
        }
    }

    /// Cost stored for a cell, if it lies within the grid.
    #[must_use]
    pub fn cost(&self, cell: CellCoord) -> Option<u32> {
        self.geometry
            .index(cell)
            .map(|index| self.costs[index])
    }

    /// Reports whether a cell carries a non-zero cost.
    #[must_use]
    pub fn is_impassable(&self, cell: CellCoord) -> bool {
        self.cost(cell).is_some_and(|cost| cost > 0)
    }

    /// Converts a world position into a cell without clamping.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> CellCoord {
        self.geometry.world_to_cell(position)
    }

    /// Centre of a cell in world space, clamping the cell into the grid.
    #[must_use]
    pub fn cell_to_world_center(&self, cell: CellCoord) -> Vec2 {
        self.geometry.cell_to_world_center(cell)
    }

    /// Reports whether a cell lies outside the grid.
    #[must_use]
    pub fn is_outside_grid(&self, cell: CellCoord) -> bool {
        self.geometry.is_outside(cell)
    }

    /// Goal cell most recently requested.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Number of full rebuilds performed so far.
    #[must_use]
    pub const fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Reports whether the derived fields lag behind the goal or cost field.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.dirty || self.computed_goal != Some(self.goal)
    }

    /// Moves the goal and rebuilds the fields only when something changed.
    ///
    /// Returns `true` when a rebuild happened.
    pub fn update_goal(&mut self, goal: CellCoord) -> bool {
        self.goal = goal;
        if !self.is_stale() {
            return false;
        }

        self.recompute(goal);
        true
    }

    /// Rebuilds the distance and direction fields anchored at `goal`.
    ///
    /// An in-grid goal is always seeded with distance zero, even when its cost
    /// marks it impassable. An out-of-grid goal seeds nothing, leaving every
    /// cell unvisited.
    pub fn recompute(&mut self, goal: CellCoord) {
        self.goal = goal;
        self.distances.fill(UNVISITED);

        let mut frontier = VecDeque::new();
        if let Some(index) = self.geometry.index(goal) {
            self.distances[index] = 0;
            frontier.push_back(goal);
        }

        while let Some(cell) = frontier.pop_front() {
            let Some(current_index) = self.geometry.index(cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in axis_neighbors(cell) {
                let Some(neighbor_index) = self.geometry.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != UNVISITED || self.costs[neighbor_index] != 0 {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                frontier.push_back(neighbor);
            }
        }

        for index in 0..self.directions.len() {
            let cell = self.geometry.cell_at(index);
            self.directions[index] = self.best_direction(cell);
        }

        self.computed_goal = Some(goal);
        self.dirty = false;
        self.rebuilds = self.rebuilds.saturating_add(1);
    }

    fn best_direction(&self, cell: CellCoord) -> Direction {
        let mut best_direction = Direction::North;
        let mut best_distance = SCAN_CEILING;

        for direction in Direction::SCAN_ORDER {
            let distance = self.distance_value(cell.step(direction));
            if distance < best_distance {
                best_direction = direction;
                best_distance = distance;
            }
        }

        best_direction
    }

    /// Hop distance to the goal, or `None` for unvisited and out-of-grid cells.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.geometry
            .index(cell)
            .map(|index| self.distances[index])
            .filter(|distance| *distance != UNVISITED)
    }

    /// Hop distance with unvisited and out-of-grid cells reported as [`FAR_DISTANCE`].
    #[must_use]
    pub fn distance_value(&self, cell: CellCoord) -> u32 {
        self.distance(cell).unwrap_or(FAR_DISTANCE)
    }

    /// Steering direction stored for a cell, if it lies within the grid.
    #[must_use]
    pub fn direction(&self, cell: CellCoord) -> Option<Direction> {
        self.geometry
            .index(cell)
            .map(|index| self.directions[index])
    }

    /// Dense cost field in row-major order.
    #[must_use]
    pub fn cost_field(&self) -> &[u32] {
        &self.costs
    }

    /// Dense distance field in row-major order; unvisited cells hold [`UNVISITED`].
    #[must_use]
    pub fn distance_field(&self) -> &[u32] {
        &self.distances
    }

    /// Dense direction field in row-major order.
    #[must_use]
    pub fn direction_field(&self) -> &[Direction] {
        &self.directions
    }

    /// Borrowed view handed to systems.
    #[must_use]
    pub fn view(&self) -> FlowFieldView<'_> {
        FlowFieldView::new(
            self.geometry,
            &self.costs,
            &self.distances,
            &self.directions,
            self.goal,
        )
    }
}

fn axis_neighbors(cell: CellCoord) -> [CellCoord; 4] {
    [
        cell.step(Direction::South),
        cell.step(Direction::West),
        cell.step(Direction::North),
        cell.step(Direction::East),
    ]
}
