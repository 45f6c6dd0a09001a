use std::collections::{HashMap, HashSet};
use std::fs;

use anyhow::{Context, Result, anyhow};

use crate::util::stable_unit;

use super::graph::{FamilyGraph, PersonRecord, Relation, RelationKind};
use super::parse::parse_family_file;

#[derive(Clone, Debug)]
pub enum FamilySource {
    File {
        path: String,
        root_override: Option<String>,
    },
    Demo {
        generations: usize,
    },
}

pub fn collect_family_graph(source: &FamilySource) -> Result<FamilyGraph> {
    match source {
        FamilySource::File {
            path,
            root_override,
        } => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read family file {path}"))?;
            let (declared_root, records) = parse_family_file(&raw)
                .with_context(|| format!("failed to parse family file {path}"))?;
            build_graph(records, root_override.clone().or(declared_root))
        }
        FamilySource::Demo { generations } => {
            build_graph(generate_demo_tree(*generations), Some("g0-f0-a".to_string()))
        }
    }
}

fn build_graph(records: Vec<PersonRecord>, root_hint: Option<String>) -> Result<FamilyGraph> {
    let mut persons: HashMap<String, PersonRecord> = HashMap::with_capacity(records.len());
    for record in records {
        persons.insert(record.id.clone(), record);
    }

    if persons.is_empty() {
        return Err(anyhow!("family graph has no persons"));
    }

    let known_ids = persons.keys().cloned().collect::<HashSet<_>>();
    for person in persons.values_mut() {
        person.parents.retain(|r| known_ids.contains(&r.id));
        person.children.retain(|r| known_ids.contains(&r.id));
        person.spouses.retain(|r| known_ids.contains(&r.id));
        person.siblings.retain(|r| known_ids.contains(&r.id));
    }

    repair_reciprocal_edges(&mut persons);

    let mut edge_count = 0usize;
    for person in persons.values() {
        edge_count += person.children.len();
        // Spouse links are symmetric after repair; count each pair once.
        edge_count += person
            .spouses
            .iter()
            .filter(|r| person.id.as_str() < r.id.as_str())
            .count();
    }

    let root_id = resolve_root(&persons, root_hint)?;

    Ok(FamilyGraph {
        root_id,
        persons,
        edge_count,
    })
}

// A file may declare only one direction of a relationship. Mirror child->parent
// and spouse<->spouse edges so layout and navigation see a consistent graph.
fn repair_reciprocal_edges(persons: &mut HashMap<String, PersonRecord>) {
    let mut missing_parents: Vec<(String, Relation)> = Vec::new();
    let mut missing_children: Vec<(String, Relation)> = Vec::new();
    let mut missing_spouses: Vec<(String, Relation)> = Vec::new();

    for person in persons.values() {
        for child in &person.children {
            let reciprocal = persons
                .get(&child.id)
                .is_some_and(|other| other.parents.iter().any(|r| r.id == person.id));
            if !reciprocal {
                missing_parents.push((
                    child.id.clone(),
                    Relation {
                        id: person.id.clone(),
                        kind: child.kind,
                    },
                ));
            }
        }

        for parent in &person.parents {
            let reciprocal = persons
                .get(&parent.id)
                .is_some_and(|other| other.children.iter().any(|r| r.id == person.id));
            if !reciprocal {
                missing_children.push((
                    parent.id.clone(),
                    Relation {
                        id: person.id.clone(),
                        kind: parent.kind,
                    },
                ));
            }
        }

        for spouse in &person.spouses {
            let reciprocal = persons
                .get(&spouse.id)
                .is_some_and(|other| other.spouses.iter().any(|r| r.id == person.id));
            if !reciprocal {
                missing_spouses.push((
                    spouse.id.clone(),
                    Relation {
                        id: person.id.clone(),
                        kind: spouse.kind,
                    },
                ));
            }
        }
    }

    let repaired = missing_parents.len() + missing_children.len() + missing_spouses.len();
    if repaired > 0 {
        log::debug!("repaired {repaired} one-sided relationship edges");
    }

    for (id, relation) in missing_parents {
        if let Some(person) = persons.get_mut(&id) {
            person.parents.push(relation);
            person.parents.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }
    for (id, relation) in missing_children {
        if let Some(person) = persons.get_mut(&id) {
            person.children.push(relation);
            person.children.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }
    for (id, relation) in missing_spouses {
        if let Some(person) = persons.get_mut(&id) {
            person.spouses.push(relation);
            person.spouses.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }
}

fn resolve_root(
    persons: &HashMap<String, PersonRecord>,
    root_hint: Option<String>,
) -> Result<String> {
    if let Some(root) = root_hint {
        if persons.contains_key(&root) {
            return Ok(root);
        }
        log::warn!("requested root {root:?} not present, falling back to an ancestor");
    }

    // Oldest ancestor: no parents, most descendant edges, id ties broken lexically.
    persons
        .values()
        .filter(|person| person.parents.is_empty())
        .max_by(|a, b| {
            a.children
                .len()
                .cmp(&b.children.len())
                .then_with(|| b.id.cmp(&a.id))
        })
        .or_else(|| persons.values().min_by(|a, b| a.id.cmp(&b.id)))
        .map(|person| person.id.clone())
        .ok_or_else(|| anyhow!("family graph is unexpectedly empty"))
}

fn generate_demo_tree(generations: usize) -> Vec<PersonRecord> {
    const GIVEN: [&str; 12] = [
        "Ada", "Brin", "Cato", "Dara", "Edda", "Finn", "Greta", "Hugo", "Ines", "Joss", "Kiri",
        "Lior",
    ];
    const FAMILY: [&str; 8] = [
        "Byrne", "Calder", "Devlin", "Egan", "Farrow", "Greer", "Hale", "Ivers",
    ];

    let mut records: Vec<PersonRecord> = Vec::new();
    let mut previous_couples: Vec<(String, String)> = Vec::new();

    for generation in 0..generations {
        let family_count = if generation == 0 {
            1
        } else {
            previous_couples.len()
        };
        let mut couples = Vec::new();

        for family in 0..family_count {
            let a_id = format!("g{generation}-f{family}-a");
            let b_id = format!("g{generation}-f{family}-b");
            let birth = 1880 + (generation as i32) * 27;

            let name_for = |id: &str, slot: usize| {
                let given = GIVEN[(stable_unit(id) * GIVEN.len() as f32) as usize % GIVEN.len()];
                let surname = FAMILY[(family + slot) % FAMILY.len()];
                format!("{given} {surname}")
            };

            let mut a = PersonRecord {
                id: a_id.clone(),
                name: name_for(&a_id, 0),
                birth_year: Some(birth),
                parents: Vec::new(),
                children: Vec::new(),
                spouses: vec![Relation {
                    id: b_id.clone(),
                    kind: RelationKind::Blood,
                }],
                siblings: Vec::new(),
            };
            let b = PersonRecord {
                id: b_id.clone(),
                name: name_for(&b_id, 1),
                birth_year: Some(birth + 2),
                parents: Vec::new(),
                children: Vec::new(),
                spouses: vec![Relation {
                    id: a_id.clone(),
                    kind: RelationKind::Blood,
                }],
                siblings: Vec::new(),
            };

            let parent_slot = family % previous_couples.len().max(1);
            if let Some((parent_a, parent_b)) = previous_couples.get(parent_slot) {
                // Roughly one in eight children in the demo data is adoptive.
                let kind = if stable_unit(&a_id) < 0.125 {
                    RelationKind::Adoptive
                } else {
                    RelationKind::Blood
                };
                a.parents.push(Relation {
                    id: parent_a.clone(),
                    kind,
                });
                a.parents.push(Relation {
                    id: parent_b.clone(),
                    kind,
                });
            }

            couples.push((a_id, b_id));
            records.push(a);
            records.push(b);
        }

        // Each couple raises two children who form the next generation's couples.
        if generation + 1 < generations {
            let next_family_count = (couples.len() * 2).min(24);
            previous_couples = couples
                .iter()
                .cycle()
                .take(next_family_count)
                .cloned()
                .collect();
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_tree_builds_a_rooted_graph() {
        let graph = collect_family_graph(&FamilySource::Demo { generations: 4 }).unwrap();
        assert_eq!(graph.root_id, "g0-f0-a");
        assert!(graph.person_count() > 2);
        assert!(graph.edge_count > 0);
        assert!(graph.persons.contains_key(&graph.root_id));
    }

    #[test]
    fn reciprocal_edges_are_repaired() {
        use crate::family::graph::test_support::{blood, person};

        let mut parent = person("p", "Parent");
        parent.children.push(blood("c"));
        let child = person("c", "Child");

        let graph = build_graph(vec![parent, child], Some("p".to_string())).unwrap();
        let child = graph.persons.get("c").unwrap();
        assert_eq!(child.parents.len(), 1);
        assert_eq!(child.parents[0].id, "p");
    }

    #[test]
    fn missing_root_hint_falls_back_to_an_ancestor() {
        use crate::family::graph::test_support::{blood, person};

        let mut parent = person("p", "Parent");
        parent.children.push(blood("c"));
        let mut child = person("c", "Child");
        child.parents.push(blood("p"));

        let graph = build_graph(vec![parent, child], Some("ghost".to_string())).unwrap();
        assert_eq!(graph.root_id, "p");
    }
}
