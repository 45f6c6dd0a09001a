use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{Result, anyhow};
use eframe::egui::{Vec2, vec2};

use crate::family::FamilyGraph;

pub const NODE_WIDTH: f32 = 150.0;
pub const NODE_HEIGHT: f32 = 80.0;

const HORIZONTAL_GAP: f32 = 40.0;
const VERTICAL_GAP: f32 = 70.0;
const CANVAS_MARGIN: f32 = 60.0;

#[derive(Clone, Debug)]
pub struct PositionedNode {
    pub id: String,
    pub left: f32,
    pub top: f32,
    pub has_sub_tree: bool,
    pub generation: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
    ParentChild,
    Spouse,
}

#[derive(Clone, Debug)]
pub struct Connector {
    pub points: Vec<Vec2>,
    pub kind: ConnectorKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Default)]
pub struct LayoutResult {
    pub nodes: Vec<PositionedNode>,
    pub connectors: Vec<Connector>,
    pub canvas: CanvasSize,
}

/// Generation-ranked top-down layout: spouses sit next to each other, children
/// rows hang under their parents' generation, connectors are elbow polylines.
/// Deterministic for a given (graph, root): children are visited in id order.
pub fn layout_tree(graph: &FamilyGraph, root_id: &str) -> Result<LayoutResult> {
    if graph.persons.is_empty() {
        return Ok(LayoutResult::default());
    }

    if !graph.persons.contains_key(root_id) {
        return Err(anyhow!("layout root {root_id:?} is not in the family graph"));
    }

    let ordered = rank_generations(graph, root_id);

    let mut nodes = Vec::new();
    let mut index_by_id = HashMap::new();
    let mut generation_width = 0.0f32;

    for (generation, ids) in ordered.iter().enumerate() {
        let row_width = ids.len() as f32 * (NODE_WIDTH + HORIZONTAL_GAP) - HORIZONTAL_GAP;
        generation_width = generation_width.max(row_width);

        for (slot, id) in ids.iter().enumerate() {
            let has_sub_tree = graph
                .persons
                .get(id)
                .is_some_and(|person| !person.children.is_empty());

            index_by_id.insert(id.clone(), nodes.len());
            nodes.push(PositionedNode {
                id: id.clone(),
                left: slot as f32 * (NODE_WIDTH + HORIZONTAL_GAP),
                top: generation as f32 * (NODE_HEIGHT + VERTICAL_GAP),
                has_sub_tree,
                generation,
            });
        }
    }

    center_generations(&mut nodes, &ordered, generation_width);

    let mut connectors = build_connectors(graph, &nodes, &index_by_id);

    let canvas = CanvasSize {
        width: generation_width + CANVAS_MARGIN * 2.0,
        height: ordered.len() as f32 * (NODE_HEIGHT + VERTICAL_GAP) - VERTICAL_GAP
            + CANVAS_MARGIN * 2.0,
    };

    for node in &mut nodes {
        node.left += CANVAS_MARGIN;
        node.top += CANVAS_MARGIN;
    }
    for connector in &mut connectors {
        for point in &mut connector.points {
            *point += vec2(CANVAS_MARGIN, CANVAS_MARGIN);
        }
    }

    log::debug!(
        "layout: {} nodes, {} connectors, canvas {:.0}x{:.0}",
        nodes.len(),
        connectors.len(),
        canvas.width,
        canvas.height
    );

    Ok(LayoutResult {
        nodes,
        connectors,
        canvas,
    })
}

// BFS over child edges from the root; spouses join their partner's generation.
// Persons unreachable from the root are appended as trailing generations so the
// whole graph stays visible.
fn rank_generations(graph: &FamilyGraph, root_id: &str) -> Vec<Vec<String>> {
    let mut generations: Vec<Vec<String>> = Vec::new();
    let mut placed: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();

    queue.push_back((root_id.to_string(), 0));
    placed.insert(root_id.to_string());

    while let Some((id, generation)) = queue.pop_front() {
        while generations.len() <= generation {
            generations.push(Vec::new());
        }
        generations[generation].push(id.clone());

        let Some(person) = graph.persons.get(&id) else {
            continue;
        };

        let mut spouses = person
            .spouses
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>();
        spouses.sort_unstable();
        for spouse in spouses {
            if graph.persons.contains_key(spouse) && placed.insert(spouse.to_string()) {
                generations[generation].push(spouse.to_string());
                // Spouses never enter the queue themselves, so pick up their
                // children here or one-sided families would dangle.
                enqueue_children(graph, spouse, generation, &mut placed, &mut queue);
            }
        }

        enqueue_children(graph, &id, generation, &mut placed, &mut queue);
    }

    let mut orphans = graph
        .persons
        .keys()
        .filter(|id| !placed.contains(*id))
        .cloned()
        .collect::<Vec<_>>();
    if !orphans.is_empty() {
        orphans.sort_unstable();
        generations.push(orphans);
    }

    generations
}

fn enqueue_children(
    graph: &FamilyGraph,
    id: &str,
    generation: usize,
    placed: &mut HashSet<String>,
    queue: &mut VecDeque<(String, usize)>,
) {
    let Some(person) = graph.persons.get(id) else {
        return;
    };

    let mut children = person
        .children
        .iter()
        .map(|r| r.id.as_str())
        .collect::<Vec<_>>();
    children.sort_unstable();
    for child in children {
        if graph.persons.contains_key(child) && placed.insert(child.to_string()) {
            queue.push_back((child.to_string(), generation + 1));
        }
    }
}

fn center_generations(
    nodes: &mut [PositionedNode],
    ordered: &[Vec<String>],
    generation_width: f32,
) {
    let mut cursor = 0usize;
    for ids in ordered {
        let row_width = ids.len() as f32 * (NODE_WIDTH + HORIZONTAL_GAP) - HORIZONTAL_GAP;
        let shift = ((generation_width - row_width) * 0.5).max(0.0);
        for node in nodes.iter_mut().skip(cursor).take(ids.len()) {
            node.left += shift;
        }
        cursor += ids.len();
    }
}

fn build_connectors(
    graph: &FamilyGraph,
    nodes: &[PositionedNode],
    index_by_id: &HashMap<String, usize>,
) -> Vec<Connector> {
    let mut connectors = Vec::new();

    for node in nodes {
        let Some(person) = graph.persons.get(&node.id) else {
            continue;
        };

        let parent_bottom = vec2(node.left + NODE_WIDTH * 0.5, node.top + NODE_HEIGHT);

        let mut children = person
            .children
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>();
        children.sort_unstable();
        for child_id in children {
            let Some(&child_index) = index_by_id.get(child_id) else {
                continue;
            };
            let child = &nodes[child_index];
            if child.generation <= node.generation {
                continue;
            }

            let child_top = vec2(child.left + NODE_WIDTH * 0.5, child.top);
            let drop_y = parent_bottom.y + VERTICAL_GAP * 0.5;
            connectors.push(Connector {
                points: vec![
                    parent_bottom,
                    vec2(parent_bottom.x, drop_y),
                    vec2(child_top.x, drop_y),
                    child_top,
                ],
                kind: ConnectorKind::ParentChild,
            });
        }

        for spouse in &person.spouses {
            // One connector per couple.
            if node.id.as_str() >= spouse.id.as_str() {
                continue;
            }
            let Some(&spouse_index) = index_by_id.get(&spouse.id) else {
                continue;
            };
            let partner = &nodes[spouse_index];
            if partner.generation != node.generation {
                continue;
            }

            let (left_node, right_node) = if node.left <= partner.left {
                (node, partner)
            } else {
                (partner, node)
            };
            let y = left_node.top + NODE_HEIGHT * 0.5;
            connectors.push(Connector {
                points: vec![
                    vec2(left_node.left + NODE_WIDTH, y),
                    vec2(right_node.left, y),
                ],
                kind: ConnectorKind::Spouse,
            });
        }
    }

    connectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::test_support::chain;

    #[test]
    fn empty_graph_lays_out_to_nothing() {
        let graph = chain(&[]);
        let result = layout_tree(&graph, "anything");
        // Empty graphs short-circuit before root validation.
        let result = result.unwrap();
        assert!(result.nodes.is_empty());
        assert!(result.connectors.is_empty());
        assert_eq!(result.canvas, CanvasSize::default());
    }

    #[test]
    fn missing_root_is_an_error() {
        let graph = chain(&["a", "b"]);
        assert!(layout_tree(&graph, "ghost").is_err());
    }

    #[test]
    fn generations_stack_downward() {
        let graph = chain(&["a", "b", "c"]);
        let result = layout_tree(&graph, "a").unwrap();
        assert_eq!(result.nodes.len(), 3);

        let top_of = |id: &str| {
            result
                .nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| node.top)
                .unwrap()
        };
        assert!(top_of("a") < top_of("b"));
        assert!(top_of("b") < top_of("c"));
        assert!(result.canvas.height > result.canvas.width);
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = chain(&["a", "b", "c", "d"]);
        let first = layout_tree(&graph, "a").unwrap();
        let second = layout_tree(&graph, "a").unwrap();
        for (left, right) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(left.id, right.id);
            assert_eq!(left.left, right.left);
            assert_eq!(left.top, right.top);
        }
        assert_eq!(first.connectors.len(), second.connectors.len());
    }

    #[test]
    fn parent_child_connectors_are_elbows() {
        let graph = chain(&["a", "b"]);
        let result = layout_tree(&graph, "a").unwrap();
        let connector = result
            .connectors
            .iter()
            .find(|c| c.kind == ConnectorKind::ParentChild)
            .unwrap();
        assert!(connector.points.len() >= 2);
        let first = connector.points.first().unwrap();
        let last = connector.points.last().unwrap();
        assert!(first.y < last.y);
    }

    #[test]
    fn has_sub_tree_marks_persons_with_children() {
        let graph = chain(&["a", "b"]);
        let result = layout_tree(&graph, "a").unwrap();
        let flag_of = |id: &str| {
            result
                .nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| node.has_sub_tree)
                .unwrap()
        };
        assert!(flag_of("a"));
        assert!(!flag_of("b"));
    }
}
