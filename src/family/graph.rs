use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationKind {
    Blood,
    Adoptive,
}

impl RelationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Blood => "blood",
            Self::Adoptive => "adoptive",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub id: String,
    pub kind: RelationKind,
}

#[derive(Clone, Debug)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub birth_year: Option<i32>,
    pub parents: Vec<Relation>,
    pub children: Vec<Relation>,
    pub spouses: Vec<Relation>,
    pub siblings: Vec<Relation>,
}

impl PersonRecord {
    pub fn relation_count(&self) -> usize {
        self.parents.len() + self.children.len() + self.spouses.len() + self.siblings.len()
    }
}

#[derive(Clone, Debug)]
pub struct FamilyGraph {
    pub root_id: String,
    pub persons: HashMap<String, PersonRecord>,
    pub edge_count: usize,
}

impl FamilyGraph {
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids = self.persons.keys().map(String::as_str).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Descendant path from the root to `target` following child edges, if one exists.
    pub fn path_from_root(&self, target: &str) -> Option<Vec<String>> {
        if !self.persons.contains_key(target) {
            return None;
        }

        if target == self.root_id {
            return Some(vec![self.root_id.clone()]);
        }

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parent: HashMap<String, String> = HashMap::new();

        queue.push_back(self.root_id.clone());
        visited.insert(self.root_id.clone());

        while let Some(current) = queue.pop_front() {
            if current == target {
                break;
            }

            let Some(person) = self.persons.get(&current) else {
                continue;
            };

            for next in &person.children {
                if !self.persons.contains_key(&next.id) || visited.contains(&next.id) {
                    continue;
                }

                visited.insert(next.id.clone());
                parent.insert(next.id.clone(), current.clone());
                queue.push_back(next.id.clone());
            }
        }

        if !visited.contains(target) {
            return None;
        }

        let mut path = Vec::new();
        let mut cursor = target.to_string();
        path.push(cursor.clone());

        while cursor != self.root_id {
            let prev = parent.get(&cursor)?;
            cursor = prev.clone();
            path.push(cursor.clone());
        }

        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn person(id: &str, name: &str) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            name: name.to_string(),
            birth_year: None,
            parents: Vec::new(),
            children: Vec::new(),
            spouses: Vec::new(),
            siblings: Vec::new(),
        }
    }

    pub fn blood(id: &str) -> Relation {
        Relation {
            id: id.to_string(),
            kind: RelationKind::Blood,
        }
    }

    pub fn chain(ids: &[&str]) -> FamilyGraph {
        let mut persons = HashMap::new();
        for (index, id) in ids.iter().enumerate() {
            let mut record = person(id, id);
            if index > 0 {
                record.parents.push(blood(ids[index - 1]));
            }
            if index + 1 < ids.len() {
                record.children.push(blood(ids[index + 1]));
            }
            persons.insert(id.to_string(), record);
        }

        FamilyGraph {
            root_id: ids.first().map(|id| id.to_string()).unwrap_or_default(),
            edge_count: ids.len().saturating_sub(1),
            persons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::chain;

    #[test]
    fn path_from_root_walks_child_edges() {
        let graph = chain(&["a", "b", "c", "d"]);
        assert_eq!(
            graph.path_from_root("d"),
            Some(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string()
            ])
        );
        assert_eq!(graph.path_from_root("a"), Some(vec!["a".to_string()]));
        assert_eq!(graph.path_from_root("nope"), None);
    }
}
