pub mod json;
pub mod memory;
pub mod strings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::scanner::TermDictionary;

pub const PARTITION_FORMAT_VERSION: u32 = 1;
pub const TERMS_FILE: &str = "terms.json";

/// Тип значений поля в партиции.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Bool,
    /// В разных документах разные типы.
    Mixed,
}

impl FieldKind {
    pub fn is_string(self) -> bool {
        matches!(self, FieldKind::String)
    }

    /// Слияние видов одного поля (между документами или партициями).
    pub fn combine(self, other: FieldKind) -> FieldKind {
        if self == other {
            self
        } else {
            FieldKind::Mixed
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Bool => "bool",
            FieldKind::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Словарь одного поля: уникальные термы в порядке первого появления.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredField {
    pub kind: FieldKind,
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl StoredField {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            terms: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn add_term(&mut self, term: &str) {
        if self.seen.insert(term.to_string()) {
            self.terms.push(term.to_string());
        }
    }

    /// `seen` не сериализуется; восстановить после чтения с диска.
    pub(crate) fn reindex(&mut self) {
        let mut seen = HashSet::with_capacity(self.terms.len());
        self.terms.retain(|t| seen.insert(t.clone()));
        self.seen = seen;
    }
}

/// Содержимое `terms.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionData {
    pub version: u32,
    pub doc_count: u64,
    pub fields: BTreeMap<String, StoredField>,
}

impl Default for PartitionData {
    fn default() -> Self {
        Self {
            version: PARTITION_FORMAT_VERSION,
            doc_count: 0,
            fields: BTreeMap::new(),
        }
    }
}

/// Точка расширения: читатель партиции.
pub trait PartitionReader: TermDictionary {
    fn open_partition(path: &str) -> Result<Self>
    where
        Self: Sized;
    fn doc_count(&self) -> u64;
    /// `None`: поля в партиции нет.
    fn field_kind(&self, field: &str) -> Option<FieldKind>;
}
