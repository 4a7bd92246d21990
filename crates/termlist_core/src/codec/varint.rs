// LEB128-подобный uvarint: 7 бит на байт, старший бит: продолжение.
use crate::error::CodecError;

pub fn put_uvarint(mut x: u64, out: &mut Vec<u8>) {
    while x >= 0x80 {
        out.push(((x as u8) & 0x7F) | 0x80);
        x >>= 7;
    }
    out.push(x as u8);
}

/// Возвращает (значение, остаток).
pub fn get_uvarint(bytes: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let mut shift = 0u32;
    let mut val = 0u64;
    for (i, b) in bytes.iter().enumerate() {
        let byte = *b as u64;
        if shift == 63 && byte > 1 {
            return Err(CodecError::VarintOverflow);
        }
        val |= (byte & 0x7F) << shift;
        if (byte & 0x80) == 0 {
            return Ok((val, &bytes[i + 1..]));
        }
        shift += 7;
        if shift > 63 {
            return Err(CodecError::VarintOverflow);
        }
    }
    Err(CodecError::Truncated)
}

/// [uvarint len][utf8]
pub fn put_str(s: &str, out: &mut Vec<u8>) {
    put_uvarint(s.len() as u64, out);
    out.extend_from_slice(s.as_bytes());
}

pub fn get_str(bytes: &[u8]) -> Result<(&str, &[u8]), CodecError> {
    let (len, rest) = get_uvarint(bytes)?;
    let len = usize::try_from(len).map_err(|_| CodecError::Truncated)?;
    if rest.len() < len {
        return Err(CodecError::Truncated);
    }
    let (raw, rest) = rest.split_at(len);
    let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
    Ok((s, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings() {
        let mut buf = Vec::new();
        put_uvarint(0, &mut buf);
        put_uvarint(127, &mut buf);
        put_uvarint(300, &mut buf);
        assert_eq!(buf, vec![0x00, 0x7F, 0xAC, 0x02]);
    }

    #[test]
    fn max_value_fits_in_ten_bytes() {
        let mut buf = Vec::new();
        put_uvarint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), 10);
        let (v, rest) = get_uvarint(&buf).unwrap();
        assert_eq!(v, u64::MAX);
        assert!(rest.is_empty());
    }

    #[test]
    fn overflow_and_truncation() {
        let too_long = [0xFFu8; 11];
        assert_eq!(get_uvarint(&too_long), Err(CodecError::VarintOverflow));
        assert_eq!(get_uvarint(&[0x80, 0x80]), Err(CodecError::Truncated));
        assert_eq!(get_uvarint(&[]), Err(CodecError::Truncated));
    }

    #[test]
    fn str_rejects_bad_utf8_and_short_input() {
        assert_eq!(get_str(&[2, 0xC3, 0x28]), Err(CodecError::InvalidUtf8));
        assert_eq!(get_str(&[5, b'a']), Err(CodecError::Truncated));
    }
}
