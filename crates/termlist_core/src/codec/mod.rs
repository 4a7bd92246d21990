pub mod term_list;
pub mod varint;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CodecError;
use crate::result::PartialResult;

pub use term_list::TermListCodec;

/// Кодек partial-результата для передачи с партиции на узел слияния.
pub trait FacetCodec: Send + Sync {
    fn stream_type(&self) -> &'static str;
    fn write(&self, partial: &PartialResult, out: &mut Vec<u8>);
    fn read(&self, bytes: &[u8]) -> Result<PartialResult, CodecError>;
}

/// Реестр кодеков. Собирается один раз при старте процесса и передаётся
/// по ссылке (или в `Arc`); глобального состояния нет.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Arc<dyn FacetCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр со всеми встроенными кодеками.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register(Arc::new(TermListCodec));
        r
    }

    /// Повторная регистрация того же stream type заменяет кодек.
    pub fn register(&mut self, codec: Arc<dyn FacetCodec>) {
        self.codecs.insert(codec.stream_type(), codec);
    }

    pub fn get(&self, stream_type: &str) -> Option<&Arc<dyn FacetCodec>> {
        self.codecs.get(stream_type)
    }

    pub fn stream_types(&self) -> Vec<&'static str> {
        let mut v: Vec<_> = self.codecs.keys().copied().collect();
        v.sort_unstable();
        v
    }

    /// Конверт: `[str stream_type][payload]`.
    pub fn encode(&self, stream_type: &str, partial: &PartialResult) -> Result<Vec<u8>, CodecError> {
        let codec = self
            .get(stream_type)
            .ok_or_else(|| CodecError::UnknownStreamType(stream_type.to_string()))?;
        let mut out = Vec::with_capacity(16 + partial.terms.iter().map(|t| t.len() + 1).sum::<usize>());
        varint::put_str(codec.stream_type(), &mut out);
        codec.write(partial, &mut out);
        Ok(out)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<PartialResult, CodecError> {
        let (stream_type, payload) = varint::get_str(bytes)?;
        let codec = self
            .get(stream_type)
            .ok_or_else(|| CodecError::UnknownStreamType(stream_type.to_string()))?;
        codec.read(payload)
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("stream_types", &self.stream_types())
            .finish()
    }
}
