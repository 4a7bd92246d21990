use serde_json::Value;

use super::strings::{collect_fields, Leaf};
use super::json::JsonPartitionReader;
use super::{FieldKind, PartitionData, PartitionReader, StoredField};
use crate::scanner::{TermDictionary, TermIter};

/// Партиция в памяти: собирается из JSON-документов или вручную.
#[derive(Debug, Clone)]
pub struct InMemoryPartition {
    id: String,
    data: PartitionData,
}

impl InMemoryPartition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: PartitionData::default(),
        }
    }

    pub fn from_data(id: impl Into<String>, mut data: PartitionData) -> Self {
        for f in data.fields.values_mut() {
            f.reindex();
        }
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &PartitionData {
        &self.data
    }

    pub fn doc_count(&self) -> u64 {
        self.data.doc_count
    }

    /// Добавить строковые термы в поле (для тестов и ручной сборки).
    pub fn add_terms<I, S>(&mut self, field: &str, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for t in terms {
            self.add_leaf(field, Leaf::Str(t.as_ref()));
        }
    }

    pub fn add_json_doc(&mut self, doc: &Value) {
        collect_fields(doc, &mut |path, leaf| self.add_leaf(path, leaf));
        self.data.doc_count += 1;
    }

    fn add_leaf(&mut self, path: &str, leaf: Leaf<'_>) {
        let kind = match leaf {
            Leaf::Str(_) => FieldKind::String,
            Leaf::Number => FieldKind::Number,
            Leaf::Bool => FieldKind::Bool,
        };
        let field = self
            .data
            .fields
            .entry(path.to_string())
            .or_insert_with(|| StoredField::new(kind));
        field.kind = field.kind.combine(kind);
        if let Leaf::Str(s) = leaf {
            field.add_term(s);
        }
    }

    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.data.fields.get(field).map(|f| f.kind)
    }
}

impl TermDictionary for InMemoryPartition {
    fn partition_id(&self) -> &str {
        &self.id
    }

    fn terms(&self, field: &str) -> anyhow::Result<Option<TermIter<'_>>> {
        Ok(self
            .data
            .fields
            .get(field)
            .map(|f| Box::new(f.terms.iter().map(String::as_str)) as TermIter<'_>))
    }
}

impl PartitionReader for InMemoryPartition {
    fn open_partition(path: &str) -> anyhow::Result<Self> {
        JsonPartitionReader::open_partition(path).map(JsonPartitionReader::into_memory)
    }

    fn doc_count(&self) -> u64 {
        self.data.doc_count
    }

    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        InMemoryPartition::field_kind(self, field)
    }
}
