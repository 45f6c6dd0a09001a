use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::layout::{NODE_HEIGHT, NODE_WIDTH, PositionedNode};

use super::viewport::ViewportBounds;

const BASE_BUFFER: f32 = 200.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PerformanceMode {
    Performance,
    #[default]
    Balanced,
    Quality,
}

impl PerformanceMode {
    pub const ALL: [Self; 3] = [Self::Performance, Self::Balanced, Self::Quality];

    pub fn buffer_multiplier(self) -> f32 {
        match self {
            Self::Performance => 0.5,
            Self::Balanced => 1.0,
            Self::Quality => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Balanced => "balanced",
            Self::Quality => "quality",
        }
    }
}

/// Culls one layout result against a buffered viewport. Like the spatial
/// index, an instance is bound to one node set and scale factor and is rebuilt
/// rather than mutated.
pub struct VirtualizationEngine {
    scaled_positions: Vec<Vec2>,
    node_size: Vec2,
    index_by_id: HashMap<String, usize>,
    buffer: f32,
}

impl VirtualizationEngine {
    pub fn new(nodes: &[PositionedNode], scale_factor: f32, mode: PerformanceMode) -> Self {
        let mut scaled_positions = Vec::with_capacity(nodes.len());
        let mut index_by_id = HashMap::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            scaled_positions.push(vec2(node.left * scale_factor, node.top * scale_factor));
            index_by_id.insert(node.id.clone(), index);
        }

        Self {
            scaled_positions,
            node_size: vec2(NODE_WIDTH * scale_factor, NODE_HEIGHT * scale_factor),
            index_by_id,
            buffer: BASE_BUFFER * mode.buffer_multiplier(),
        }
    }

    pub fn buffer(&self) -> f32 {
        self.buffer
    }

    /// Indices of nodes whose footprint intersects the viewport expanded by the
    /// performance-mode buffer on all four sides. Inclusive on every edge.
    pub fn visible_nodes(&self, viewport: &ViewportBounds) -> Vec<usize> {
        let expanded = viewport.expanded(self.buffer);

        self.scaled_positions
            .iter()
            .enumerate()
            .filter(|(_, position)| {
                position.x + self.node_size.x >= expanded.min_x
                    && position.x <= expanded.max_x
                    && position.y + self.node_size.y >= expanded.min_y
                    && position.y <= expanded.max_y
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Nodes within `radius` (inclusive) of the center node's scaled position,
    /// the center itself included. Unknown center ids answer empty.
    pub fn nodes_in_radius(&self, center_id: &str, radius: f32) -> Vec<usize> {
        let Some(&center_index) = self.index_by_id.get(center_id) else {
            return Vec::new();
        };
        let center = self.scaled_positions[center_index];

        self.scaled_positions
            .iter()
            .enumerate()
            .filter(|(_, position)| (**position - center).length() <= radius)
            .map(|(index, _)| index)
            .collect()
    }

    /// Reorders `indices` ascending by distance from the focal point. Copies
    /// first; the caller's ordering is never disturbed.
    pub fn prioritize(&self, indices: &[usize], center_x: f32, center_y: f32) -> Vec<usize> {
        let focus = vec2(center_x, center_y);
        let mut ordered = indices.to_vec();
        ordered.sort_by(|a, b| {
            let da = self
                .scaled_positions
                .get(*a)
                .map_or(f32::INFINITY, |p| (*p - focus).length());
            let db = self
                .scaled_positions
                .get(*b)
                .map_or(f32::INFINITY, |p| (*p - focus).length());
            da.total_cmp(&db)
        });
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, left: f32, top: f32) -> PositionedNode {
        PositionedNode {
            id: id.to_string(),
            left,
            top,
            has_sub_tree: false,
            generation: 0,
        }
    }

    fn diagonal(count: usize, spacing: f32) -> Vec<PositionedNode> {
        (0..count)
            .map(|i| node(&format!("p{i}"), i as f32 * spacing, i as f32 * spacing))
            .collect()
    }

    #[test]
    fn visible_set_is_a_superset_of_the_unexpanded_viewport() {
        let nodes = diagonal(30, 120.0);
        let engine = VirtualizationEngine::new(&nodes, 1.0, PerformanceMode::Performance);
        let viewport = ViewportBounds::new(300.0, 1200.0, 300.0, 1200.0);

        let visible = engine.visible_nodes(&viewport);
        for (index, n) in nodes.iter().enumerate() {
            let strictly_inside = n.left >= viewport.min_x
                && n.left + 150.0 <= viewport.max_x
                && n.top >= viewport.min_y
                && n.top + 80.0 <= viewport.max_y;
            if strictly_inside {
                assert!(visible.contains(&index), "node {} culled", n.id);
            }
        }
    }

    #[test]
    fn buffer_grows_monotonically_across_modes() {
        let nodes = diagonal(40, 150.0);
        let viewport = ViewportBounds::new(1000.0, 2000.0, 1000.0, 2000.0);

        let count_for = |mode| {
            VirtualizationEngine::new(&nodes, 1.0, mode)
                .visible_nodes(&viewport)
                .len()
        };

        let performance = count_for(PerformanceMode::Performance);
        let balanced = count_for(PerformanceMode::Balanced);
        let quality = count_for(PerformanceMode::Quality);
        assert!(performance <= balanced);
        assert!(balanced <= quality);
        // The wider buffers actually pull extra diagonal nodes in here.
        assert!(performance < quality);
    }

    #[test]
    fn performance_mode_buffer_is_one_hundred_units() {
        // 375x812 viewport; nodes 300 units apart on a diagonal past its edge.
        let viewport = ViewportBounds::new(0.0, 375.0, 0.0, 812.0);
        let near = node("near", 425.0, 0.0); // 50 past the right edge
        let far = node("far", 825.0, 0.0); // 450 past the right edge
        let nodes = [near, far];

        let engine = VirtualizationEngine::new(&nodes, 1.0, PerformanceMode::Performance);
        assert_eq!(engine.buffer(), 100.0);

        let visible = engine.visible_nodes(&viewport);
        assert!(visible.contains(&0));
        assert!(!visible.contains(&1));
    }

    #[test]
    fn edge_contact_is_inclusive() {
        let viewport = ViewportBounds::new(0.0, 375.0, 0.0, 812.0);
        // Footprint's left edge lands exactly on the expanded boundary.
        let boundary = node("edge", 475.0, 0.0);
        let engine =
            VirtualizationEngine::new(std::slice::from_ref(&boundary), 1.0, PerformanceMode::Performance);
        assert_eq!(engine.visible_nodes(&viewport), vec![0]);
    }

    #[test]
    fn radius_query_is_inclusive_and_centered_on_the_node() {
        let nodes = [node("a", 0.0, 0.0), node("b", 300.0, 400.0), node("c", 1000.0, 0.0)];
        let engine = VirtualizationEngine::new(&nodes, 1.0, PerformanceMode::Balanced);

        // b is at exactly distance 500 from a.
        let mut hits = engine.nodes_in_radius("a", 500.0);
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);

        assert!(engine.nodes_in_radius("ghost", 500.0).is_empty());
    }

    #[test]
    fn prioritize_sorts_a_copy_nearest_first() {
        let nodes = [node("a", 0.0, 0.0), node("b", 500.0, 0.0), node("c", 200.0, 0.0)];
        let engine = VirtualizationEngine::new(&nodes, 1.0, PerformanceMode::Balanced);

        let original = vec![0usize, 1, 2];
        let ordered = engine.prioritize(&original, 210.0, 0.0);

        assert_eq!(ordered, vec![2, 0, 1]);
        assert_eq!(original, vec![0, 1, 2]);
    }

    #[test]
    fn empty_node_set_is_never_visible() {
        let engine = VirtualizationEngine::new(&[], 1.0, PerformanceMode::Quality);
        let viewport = ViewportBounds::new(-1000.0, 1000.0, -1000.0, 1000.0);
        assert!(engine.visible_nodes(&viewport).is_empty());
    }
}
