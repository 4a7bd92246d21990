use super::varint::{get_str, get_uvarint, put_str, put_uvarint};
use super::FacetCodec;
use crate::error::CodecError;
use crate::request::FACET_TYPE;
use crate::result::PartialResult;

/// Тип данных в payload; пока только строки.
const KIND_STRINGS: u8 = 0;

/// Формат:
/// ```text
/// [u8 kind=0][str partition_id][uvarint count][str term] * count
/// str = [uvarint len][utf8 bytes]
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TermListCodec;

impl FacetCodec for TermListCodec {
    fn stream_type(&self) -> &'static str {
        FACET_TYPE
    }

    fn write(&self, partial: &PartialResult, out: &mut Vec<u8>) {
        out.push(KIND_STRINGS);
        put_str(&partial.partition_id, out);
        put_uvarint(partial.terms.len() as u64, out);
        for t in &partial.terms {
            put_str(t, out);
        }
    }

    fn read(&self, bytes: &[u8]) -> Result<PartialResult, CodecError> {
        let (&kind, rest) = bytes.split_first().ok_or(CodecError::Truncated)?;
        if kind != KIND_STRINGS {
            return Err(CodecError::UnknownKind(kind));
        }
        let (partition_id, rest) = get_str(rest)?;
        let (count, mut rest) = get_uvarint(rest)?;

        // каждый терм занимает минимум байт (длина), так что count > rest.len(): мусор
        if count > rest.len() as u64 {
            return Err(CodecError::Truncated);
        }
        let mut terms = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (t, r) = get_str(rest)?;
            terms.push(t.to_string());
            rest = r;
        }
        if !rest.is_empty() {
            return Err(CodecError::TrailingBytes(rest.len()));
        }
        Ok(PartialResult::new(partition_id, terms))
    }
}
