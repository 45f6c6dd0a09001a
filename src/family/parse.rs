use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::graph::{PersonRecord, Relation, RelationKind};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawFamilyFile {
    #[serde(default)]
    pub(super) root: Option<String>,
    #[serde(default)]
    pub(super) persons: Vec<RawPerson>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawPerson {
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default, rename = "birthYear")]
    pub(super) birth_year: Option<i32>,
    #[serde(default)]
    pub(super) parents: Vec<RawRelation>,
    #[serde(default)]
    pub(super) children: Vec<RawRelation>,
    #[serde(default)]
    pub(super) spouses: Vec<RawRelation>,
    #[serde(default)]
    pub(super) siblings: Vec<RawRelation>,
}

// Relations are either a bare id string or an object with an explicit kind.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawRelation {
    Id(String),
    Tagged {
        id: String,
        #[serde(default)]
        kind: Option<String>,
    },
}

fn convert_relation(raw: RawRelation) -> Result<Relation> {
    let (id, kind) = match raw {
        RawRelation::Id(id) => (id, None),
        RawRelation::Tagged { id, kind } => (id, kind),
    };

    let kind = match kind.as_deref() {
        None | Some("blood") => RelationKind::Blood,
        Some("adoptive") => RelationKind::Adoptive,
        Some(other) => return Err(anyhow!("unknown relation kind {other:?}")),
    };

    Ok(Relation { id, kind })
}

fn convert_relations(raw: Vec<RawRelation>, person_id: &str) -> Result<Vec<Relation>> {
    let mut relations = raw
        .into_iter()
        .map(convert_relation)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid relation on person {person_id}"))?;
    relations.retain(|relation| !relation.id.is_empty() && relation.id != person_id);
    relations.sort_by(|a, b| a.id.cmp(&b.id));
    relations.dedup_by(|a, b| a.id == b.id);
    Ok(relations)
}

pub(super) fn parse_family_file(raw: &str) -> Result<(Option<String>, Vec<PersonRecord>)> {
    let parsed: RawFamilyFile =
        serde_json::from_str(raw).context("invalid JSON in family file")?;

    let mut records = Vec::with_capacity(parsed.persons.len());
    for raw_person in parsed.persons {
        if raw_person.id.is_empty() {
            continue;
        }

        let id = raw_person.id;
        records.push(PersonRecord {
            name: raw_person.name.unwrap_or_else(|| id.clone()),
            birth_year: raw_person.birth_year,
            parents: convert_relations(raw_person.parents, &id)?,
            children: convert_relations(raw_person.children, &id)?,
            spouses: convert_relations(raw_person.spouses, &id)?,
            siblings: convert_relations(raw_person.siblings, &id)?,
            id,
        });
    }

    if records.is_empty() {
        Err(anyhow!("family file contains no persons"))
    } else {
        Ok((parsed.root, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_tagged_relations() {
        let raw = r#"{
            "root": "a",
            "persons": [
                {"id": "a", "name": "Ada", "birthYear": 1901, "children": ["b", {"id": "c", "kind": "adoptive"}]},
                {"id": "b", "parents": [{"id": "a"}]},
                {"id": "c", "parents": [{"id": "a", "kind": "adoptive"}]}
            ]
        }"#;

        let (root, records) = parse_family_file(raw).unwrap();
        assert_eq!(root.as_deref(), Some("a"));
        assert_eq!(records.len(), 3);

        let ada = records.iter().find(|record| record.id == "a").unwrap();
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.birth_year, Some(1901));
        assert_eq!(ada.children.len(), 2);
        assert_eq!(ada.children[1].kind, RelationKind::Adoptive);

        let orphan_name = records.iter().find(|record| record.id == "b").unwrap();
        assert_eq!(orphan_name.name, "b");
    }

    #[test]
    fn rejects_unknown_relation_kind() {
        let raw = r#"{"persons": [{"id": "a", "children": [{"id": "b", "kind": "fostered"}]}]}"#;
        assert!(parse_family_file(raw).is_err());
    }

    #[test]
    fn drops_self_and_duplicate_relations() {
        let raw = r#"{"persons": [{"id": "a", "children": ["a", "b", "b"]}]}"#;
        let (_, records) = parse_family_file(raw).unwrap();
        assert_eq!(records[0].children.len(), 1);
        assert_eq!(records[0].children[0].id, "b");
    }

    #[test]
    fn empty_person_list_is_an_error() {
        assert!(parse_family_file(r#"{"persons": []}"#).is_err());
    }
}
