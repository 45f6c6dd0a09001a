mod graph;
mod load;
mod parse;

pub use graph::{FamilyGraph, PersonRecord, Relation, RelationKind};
pub use load::{FamilySource, collect_family_graph};

#[cfg(test)]
pub(crate) use graph::test_support;
