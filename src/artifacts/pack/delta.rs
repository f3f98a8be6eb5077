//! Delta encoding primitives
//!
//! Two variable-length integer flavors appear in packs:
//!
//! - *size* varints (object sizes, delta source/target sizes): bit 7 of
//!   each byte is a continuation flag, later bytes carry more significant
//!   bits. The first byte may contribute fewer than 7 bits (4 inside an
//!   object header, where bits 6-4 hold the type).
//! - *offset* varints (ofs-delta base offsets): continuation in bit 7,
//!   later bytes are **less** significant, and each continuation applies a
//!   `+1` bias so multi-byte encodings have no redundant forms.
//!
//! A delta stream is two size varints (source, target) followed by COPY
//! and ADD instructions replayed against the base to produce the target.

use crate::artifacts::core::GitError;
use bytes::Bytes;

/// Decode a size varint starting at `pos`, where the first byte
/// contributes its low `shift` bits. Returns the value and the position
/// past the varint.
pub fn read_size_varint(data: &[u8], pos: usize, shift: usize) -> anyhow::Result<(usize, usize)> {
    let mut byte = *data
        .get(pos)
        .ok_or_else(|| GitError::Corrupt("truncated size varint".to_string()))?;
    let mask = (1u8 << shift) - 1;
    let mut value = (byte & mask) as usize;
    let mut shift = shift;
    let mut pos = pos + 1;

    while byte & 0x80 != 0 {
        byte = *data
            .get(pos)
            .ok_or_else(|| GitError::Corrupt("truncated size varint".to_string()))?;
        value |= ((byte & 0x7F) as usize) << shift;
        shift += 7;
        pos += 1;
    }

    Ok((value, pos))
}

/// Encode a size varint whose first byte contributes `shift` low bits;
/// the caller is responsible for packing type bits into the first byte.
pub fn encode_size_varint(size: usize, shift: usize) -> Vec<u8> {
    let mut encoded = Vec::new();
    let mut size = size;

    let mut first = (size & ((1 << shift) - 1)) as u8;
    size >>= shift;
    if size > 0 {
        first |= 0x80;
    }
    encoded.push(first);

    while size > 0 {
        let mut byte = (size & 0x7F) as u8;
        size >>= 7;
        if size > 0 {
            byte |= 0x80;
        }
        encoded.push(byte);
    }

    encoded
}

/// Decode an ofs-delta base offset starting at `pos`. Later bytes are less
/// significant and each continuation applies the `+1` bias.
pub fn read_offset_varint(data: &[u8], pos: usize) -> anyhow::Result<(usize, usize)> {
    let mut byte = *data
        .get(pos)
        .ok_or_else(|| GitError::Corrupt("truncated offset varint".to_string()))?;
    let mut value = (byte & 0x7F) as usize;
    let mut pos = pos + 1;

    while byte & 0x80 != 0 {
        byte = *data
            .get(pos)
            .ok_or_else(|| GitError::Corrupt("truncated offset varint".to_string()))?;
        value = ((value + 1) << 7) | (byte & 0x7F) as usize;
        pos += 1;
    }

    Ok((value, pos))
}

/// Replay a delta stream against its base, producing the target bytes.
///
/// The advertised source size must equal the base length and the produced
/// bytes must equal the advertised target size; anything else is corrupt.
pub fn apply(delta: &[u8], base: &[u8]) -> anyhow::Result<Bytes> {
    let (source_size, pos) = read_size_varint(delta, 0, 7)?;
    let (target_size, pos) = read_size_varint(delta, pos, 7)?;

    if source_size != base.len() {
        return Err(GitError::Corrupt(format!(
            "delta source size {} does not match base length {}",
            source_size,
            base.len()
        ))
        .into());
    }

    let instructions = &delta[pos..];
    let mut pos = 0;
    let mut target = Vec::with_capacity(target_size);

    while pos < instructions.len() {
        let command = instructions[pos];
        pos += 1;

        if command & 0x80 != 0 {
            // COPY: bits 0-3 select offset bytes, bits 4-6 select size
            // bytes, both little-endian
            let mut offset = 0usize;
            for bit in 0..4 {
                if command & (1 << bit) != 0 {
                    let byte = *instructions.get(pos).ok_or_else(|| {
                        GitError::Corrupt("delta copy: truncated offset".to_string())
                    })?;
                    offset |= (byte as usize) << (8 * bit);
                    pos += 1;
                }
            }

            let mut size = 0usize;
            for bit in 0..3 {
                if command & (0x10 << bit) != 0 {
                    let byte = *instructions.get(pos).ok_or_else(|| {
                        GitError::Corrupt("delta copy: truncated size".to_string())
                    })?;
                    size |= (byte as usize) << (8 * bit);
                    pos += 1;
                }
            }

            // a zero size encodes the maximum copy span
            if size == 0 {
                size = 0x10000;
            }

            if offset + size > base.len() {
                return Err(GitError::Corrupt(format!(
                    "delta copy out of bounds: offset={}, size={}, base length={}",
                    offset,
                    size,
                    base.len()
                ))
                .into());
            }

            target.extend_from_slice(&base[offset..offset + size]);
        } else if command != 0 {
            // ADD: low 7 bits count literal bytes that follow
            let count = (command & 0x7F) as usize;

            if pos + count > instructions.len() {
                return Err(GitError::Corrupt(format!(
                    "delta add out of bounds: length={}, remaining={}",
                    count,
                    instructions.len() - pos
                ))
                .into());
            }

            target.extend_from_slice(&instructions[pos..pos + count]);
            pos += count;
        } else {
            return Err(GitError::Corrupt("delta command byte 0 is reserved".to_string()).into());
        }
    }

    if target.len() != target_size {
        return Err(GitError::Corrupt(format!(
            "delta produced {} bytes, target size is {}",
            target.len(),
            target_size
        ))
        .into());
    }

    Ok(Bytes::from(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;
    use rstest::rstest;

    /// COPY the first five bytes of the base, then ADD five literal bytes.
    fn copy5_add5_delta(target_size: u8) -> Vec<u8> {
        vec![
            10,          // source size
            target_size, // target size
            0b1001_0000, // COPY with one size byte, offset omitted (0)
            5,           // copy 5 bytes
            0b0000_0101, // ADD 5 literal bytes
            b'X',
            b'Y',
            b'Z',
            b'W',
            b'V',
        ]
    }

    #[test]
    fn copy_then_add_reconstructs_target() {
        let result = apply(&copy5_add5_delta(10), b"abcdefghij").unwrap();

        assert_eq!(&result[..], b"abcdeXYZWV");
    }

    #[test]
    fn wrong_target_size_is_corrupt() {
        assert!(apply(&copy5_add5_delta(9), b"abcdefghij").is_err());
        assert!(apply(&copy5_add5_delta(11), b"abcdefghij").is_err());
    }

    #[test]
    fn wrong_source_size_is_corrupt() {
        assert!(apply(&copy5_add5_delta(10), b"abcdefghi").is_err());
    }

    #[test]
    fn copy_past_base_end_is_corrupt() {
        // COPY offset 8, size 5 against a 10-byte base
        let delta = vec![10, 5, 0b1001_0001, 8, 5];
        assert!(apply(&delta, b"abcdefghij").is_err());
    }

    #[test]
    fn add_past_delta_end_is_corrupt() {
        let delta = vec![10, 5, 0b0000_0101, b'X', b'Y'];
        assert!(apply(&delta, b"abcdefghij").is_err());
    }

    #[test]
    fn command_byte_zero_is_reserved() {
        let delta = vec![10, 5, 0x00];
        assert!(apply(&delta, b"abcdefghij").is_err());
    }

    #[rstest]
    #[case(&[0x00], 0)]
    #[case(&[0x7F], 127)]
    #[case(&[0x81, 0x00], 256)] // ((1 + 1) << 7) | 0
    #[case(&[0x80, 0x00], 128)] // ((0 + 1) << 7) | 0
    fn offset_varint_known_vectors(#[case] bytes: &[u8], #[case] expected: usize) {
        let (value, pos) = read_offset_varint(bytes, 0).unwrap();
        assert_eq!(value, expected);
        assert_eq!(pos, bytes.len());
    }

    #[test]
    fn truncated_varints_are_corrupt() {
        assert!(read_size_varint(&[0x80], 0, 7).is_err());
        assert!(read_offset_varint(&[0x80], 0).is_err());
        assert!(read_size_varint(&[], 0, 7).is_err());
    }

    proptest! {
        #[test]
        fn size_varint_round_trips(size in 0usize..1 << 40, shift in 4usize..8) {
            let encoded = encode_size_varint(size, shift);
            let (decoded, pos) = read_size_varint(&encoded, 0, shift).unwrap();

            assert_eq!(decoded, size);
            assert_eq!(pos, encoded.len());
        }
    }
}
