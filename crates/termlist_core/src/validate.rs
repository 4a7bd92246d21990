use std::collections::HashMap;

use crate::error::FacetError;
use crate::partition::FieldKind;
use crate::request::FacetRequest;

/// Метаданные полей по всему корпусу (внешний коллаборатор валидации).
pub trait FieldCatalog {
    /// `None`: поле не известно ни одной партиции.
    fn field_kind(&self, field: &str) -> Option<FieldKind>;
}

/// Каталог, собранный из метаданных партиций.
#[derive(Debug, Default, Clone)]
pub struct FieldKinds {
    kinds: HashMap<String, FieldKind>,
}

impl FieldKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, field: &str, kind: FieldKind) {
        self.kinds
            .entry(field.to_string())
            .and_modify(|k| *k = k.combine(kind))
            .or_insert(kind);
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FieldCatalog for FieldKinds {
    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.kinds.get(field).copied()
    }
}

/// Центральная проверка до рассылки по партициям: каждое поле известно
/// и строковое. Ошибка на первом же плохом поле.
pub fn validate_fields<C>(request: &FacetRequest, catalog: &C) -> Result<(), FacetError>
where
    C: FieldCatalog + ?Sized,
{
    if request.fields().is_empty() {
        return Err(FacetError::invalid_configuration(request.name()));
    }
    for field in request.fields() {
        match catalog.field_kind(field) {
            None => {
                tracing::warn!(field = %field, "no mapping found for field");
                return Err(FacetError::UnknownField {
                    field: field.clone(),
                });
            }
            Some(kind) if !kind.is_string() => {
                tracing::warn!(field = %field, %kind, "no string mapping found for field");
                return Err(FacetError::UnsupportedFieldType {
                    field: field.clone(),
                    kind: kind.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
