use serde::Serialize;

use crate::request::FACET_TYPE;

/// Результат одной партиции: уникальные термы (в исходном регистре)
/// в порядке обхода словаря. Живёт до слияния.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub partition_id: String,
    pub terms: Vec<String>,
}

impl PartialResult {
    pub fn new(partition_id: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            partition_id: partition_id.into(),
            terms,
        }
    }

    pub fn empty(partition_id: impl Into<String>) -> Self {
        Self::new(partition_id, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Итог фасета. `entries` уникальны; отсортированы, если просили `sort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetResult {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub entries: Vec<String>,
    #[serde(skip)]
    pub partitions_merged: usize,
}

impl FacetResult {
    pub fn new(name: impl Into<String>, entries: Vec<String>, partitions_merged: usize) -> Self {
        Self {
            name: name.into(),
            kind: FACET_TYPE,
            entries,
            partitions_merged,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
