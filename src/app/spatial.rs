use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::layout::PositionedNode;

pub const DEFAULT_CELL_SIZE: f32 = 200.0;

// Bounded ring search: rings 0, 1 and 2 around the query cell.
const NEAREST_RING_LIMIT: i32 = 3;

/// Uniform grid over one layout result at one scale factor. Rebuilt wholesale
/// whenever the node set, root or scale factor changes; never mutated in place.
pub struct SpatialIndex {
    cell_size: f32,
    scaled_positions: Vec<Vec2>,
    ids: Vec<String>,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialIndex {
    pub fn new(nodes: &[PositionedNode], scale_factor: f32) -> Self {
        Self::with_cell_size(nodes, scale_factor, DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(nodes: &[PositionedNode], scale_factor: f32, cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };

        let mut scaled_positions = Vec::with_capacity(nodes.len());
        let mut ids = Vec::with_capacity(nodes.len());
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();

        for (index, node) in nodes.iter().enumerate() {
            let scaled = vec2(node.left * scale_factor, node.top * scale_factor);
            let cell = (
                (scaled.x / cell_size).floor() as i32,
                (scaled.y / cell_size).floor() as i32,
            );
            cells.entry(cell).or_default().push(index);
            scaled_positions.push(scaled);
            ids.push(node.id.clone());
        }

        Self {
            cell_size,
            scaled_positions,
            ids,
            cells,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Indices of nodes whose scaled position falls inside the rectangle,
    /// inclusive edges, each node identifier at most once. Order unspecified.
    pub fn nodes_in_bounds(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<usize> {
        if self.ids.is_empty() || min_x > max_x || min_y > max_y {
            return Vec::new();
        }

        let start_x = (min_x / self.cell_size).floor() as i32;
        let end_x = (max_x / self.cell_size).ceil() as i32;
        let start_y = (min_y / self.cell_size).floor() as i32;
        let end_y = (max_y / self.cell_size).ceil() as i32;

        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut result = Vec::new();

        for cell_x in start_x..=end_x {
            for cell_y in start_y..=end_y {
                let Some(indices) = self.cells.get(&(cell_x, cell_y)) else {
                    continue;
                };

                for &index in indices {
                    let position = self.scaled_positions[index];
                    if position.x < min_x
                        || position.x > max_x
                        || position.y < min_y
                        || position.y > max_y
                    {
                        continue;
                    }

                    // One cell per node by construction, but callers are
                    // promised unique identifiers regardless.
                    if seen_ids.insert(self.ids[index].as_str()) {
                        result.push(index);
                    }
                }
            }
        }

        result
    }

    /// Closest node to `(x, y)` found within 3 expanding cell rings. The search
    /// stops at the first ring that yields any candidate, so this is a bounded
    /// latency trade-off, not a global nearest guarantee.
    pub fn nearest_node(&self, x: f32, y: f32) -> Option<usize> {
        if self.ids.is_empty() {
            return None;
        }

        let center_x = (x / self.cell_size).floor() as i32;
        let center_y = (y / self.cell_size).floor() as i32;
        let query = vec2(x, y);

        let mut best: Option<(usize, f32)> = None;

        for ring in 0..NEAREST_RING_LIMIT {
            for dx in -ring..=ring {
                for dy in -ring..=ring {
                    // Interior cells were visited by smaller rings.
                    if ring > 0 && dx.abs() < ring && dy.abs() < ring {
                        continue;
                    }

                    let Some(indices) = self.cells.get(&(center_x + dx, center_y + dy)) else {
                        continue;
                    };

                    for &index in indices {
                        let distance = (self.scaled_positions[index] - query).length();
                        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                            best = Some((index, distance));
                        }
                    }
                }
            }

            if best.is_some() {
                break;
            }
        }

        best.map(|(index, _)| index)
    }
}
