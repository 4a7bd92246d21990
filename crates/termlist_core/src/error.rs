use thiserror::Error;

/// Ошибки запроса и сканирования фасета.
#[derive(Debug, Error)]
pub enum FacetError {
    /// `fields` пуст или не задан.
    #[error("fields is required to be set for term list facet [{facet}]")]
    InvalidConfiguration { facet: String },

    /// Поле не известно ни одной партиции.
    #[error("field [{field}] not found")]
    UnknownField { field: String },

    /// Поле есть, но не строковое.
    #[error("no string mapping found for field [{field}] (kind: {kind})")]
    UnsupportedFieldType { field: String, kind: String },

    /// Партиция не открылась / не ответила.
    #[error("partition [{partition}] unavailable: {reason}")]
    PartitionUnavailable { partition: String, reason: String },

    /// Скан партиции прерван снаружи (дедлайн, отмена запроса).
    #[error("scan of partition [{partition}] cancelled")]
    Cancelled { partition: String },

    /// Ошибка словаря термов внутри партиции.
    #[error("term dictionary failed for field [{field}]: {source}")]
    Dictionary {
        field: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FacetError {
    pub fn invalid_configuration(facet: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            facet: facet.into(),
        }
    }

    pub fn partition_unavailable(partition: impl Into<String>, reason: impl ToString) -> Self {
        Self::PartitionUnavailable {
            partition: partition.into(),
            reason: reason.to_string(),
        }
    }

    pub fn cancelled(partition: impl Into<String>) -> Self {
        Self::Cancelled {
            partition: partition.into(),
        }
    }

    /// Ошибка на стороне запроса (а не инфраструктуры): для HTTP 400.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::UnknownField { .. }
                | Self::UnsupportedFieldType { .. }
        )
    }
}

/// Ошибки декодирования partial-result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("varint overflows u64")]
    VarintOverflow,
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    #[error("data kind {0} is not known")]
    UnknownKind(u8),
    #[error("stream type [{0}] is not registered")]
    UnknownStreamType(String),
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}
