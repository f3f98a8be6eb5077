//! Streaming pack parse
//!
//! Walks the pack buffer object by object, inflating plain entries
//! straight into the object store and remembering where each one started.
//! That offset map is what keeps ofs-delta chains linear: a delta's base
//! is found by `start − negative-offset`, and because bases precede their
//! deltas in the stream, the map already holds the base's resolved hash,
//! even when the base was itself a delta.
//!
//! Ref-deltas name their base by hash instead, so they are queued and
//! resolved in a second pass once every non-delta object is in the store;
//! a thin pack's out-of-pack bases are then found (or reported missing)
//! the same way.

use crate::artifacts::core::GitError;
use crate::artifacts::objects::OBJECT_ID_RAW_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::delta;
use crate::artifacts::pack::{CHECKSUM_SIZE, HEADER_SIZE, PackObjectType, SIGNATURE, VERSION};
use crate::areas::database::Database;
use anyhow::Context;
use byteorder::ByteOrder;
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::io::Read;

/// A ref-delta waiting for its base, kept for the second pass
struct PendingRefDelta {
    base_oid: ObjectId,
    delta: Bytes,
    start: usize,
}

#[derive(new)]
pub struct PackReader<'d> {
    database: &'d Database,
}

impl PackReader<'_> {
    /// Parse a full pack buffer, storing every contained object. Returns
    /// the object count advertised by the header.
    pub fn read(&self, pack: &[u8]) -> anyhow::Result<usize> {
        Self::verify_checksum(pack)?;
        let body = &pack[..pack.len() - CHECKSUM_SIZE];

        let count = Self::parse_header(body)?;
        let mut pos = HEADER_SIZE;

        // start offset of every resolved object, deltas included
        let mut resolved: HashMap<usize, ObjectId> = HashMap::new();
        let mut pending: Vec<PendingRefDelta> = Vec::new();

        for _ in 0..count {
            pos = self.read_entry(body, pos, &mut resolved, &mut pending)?;
        }

        if pos != body.len() {
            return Err(GitError::Corrupt(
                "pack: leftover data after the advertised object count".to_string(),
            )
            .into());
        }

        for delta in pending {
            self.resolve_ref_delta(&delta).with_context(|| {
                format!(
                    "failed to resolve ref-delta at offset {} against base {}",
                    delta.start, delta.base_oid
                )
            })?;
        }

        Ok(count)
    }

    fn verify_checksum(pack: &[u8]) -> anyhow::Result<()> {
        if pack.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(GitError::Corrupt("pack: too short".to_string()).into());
        }

        let expected = &pack[pack.len() - CHECKSUM_SIZE..];
        let actual = Sha1::digest(&pack[..pack.len() - CHECKSUM_SIZE]);

        if expected != actual.as_slice() {
            return Err(GitError::Corrupt("pack: checksum mismatch".to_string()).into());
        }

        Ok(())
    }

    fn parse_header(body: &[u8]) -> anyhow::Result<usize> {
        if &body[0..4] != SIGNATURE {
            return Err(GitError::Corrupt(format!(
                "pack: bad signature {:?}",
                &body[0..4]
            ))
            .into());
        }

        let version = byteorder::NetworkEndian::read_u32(&body[4..8]);
        if version != VERSION {
            return Err(GitError::Unsupported(format!("pack version {version}")).into());
        }

        Ok(byteorder::NetworkEndian::read_u32(&body[8..12]) as usize)
    }

    fn read_entry(
        &self,
        body: &[u8],
        start: usize,
        resolved: &mut HashMap<usize, ObjectId>,
        pending: &mut Vec<PendingRefDelta>,
    ) -> anyhow::Result<usize> {
        let first = *body
            .get(start)
            .ok_or_else(|| GitError::Corrupt("pack: truncated object header".to_string()))?;
        let object_type = PackObjectType::try_from((first >> 4) & 0x07)?;
        // bits 3-0 of the first byte start the size varint
        let (size, pos) = delta::read_size_varint(body, start, 4)?;

        match object_type {
            PackObjectType::OfsDelta => self.read_ofs_delta(body, pos, start, size, resolved),
            PackObjectType::RefDelta => Self::read_ref_delta(body, pos, start, size, pending),
            plain => {
                let (payload, pos) = Self::decompress_entry(body, pos, size)?;
                let oid = self
                    .database
                    .store_bytes(plain.as_object_type()?, payload)?;
                resolved.insert(start, oid);
                Ok(pos)
            }
        }
    }

    fn read_ofs_delta(
        &self,
        body: &[u8],
        pos: usize,
        start: usize,
        size: usize,
        resolved: &mut HashMap<usize, ObjectId>,
    ) -> anyhow::Result<usize> {
        // negative offset back to the base object's start
        let (offset, pos) = delta::read_offset_varint(body, pos)?;
        let (delta_data, pos) = Self::decompress_entry(body, pos, size)?;

        let base_start = start.checked_sub(offset).ok_or_else(|| {
            GitError::Corrupt(format!("pack: ofs-delta offset {offset} reaches before the pack"))
        })?;
        let base_oid = resolved.get(&base_start).ok_or_else(|| {
            GitError::Corrupt(format!(
                "pack: ofs-delta base at offset {base_start} is not a resolved object"
            ))
        })?;

        let (base_type, base_payload) = self.database.read_raw(base_oid)?;
        let target = delta::apply(&delta_data, &base_payload)?;

        let oid = self.database.store_bytes(base_type, target)?;
        resolved.insert(start, oid);

        Ok(pos)
    }

    fn read_ref_delta(
        body: &[u8],
        pos: usize,
        start: usize,
        size: usize,
        pending: &mut Vec<PendingRefDelta>,
    ) -> anyhow::Result<usize> {
        if body.len() < pos + OBJECT_ID_RAW_LENGTH {
            return Err(
                GitError::Corrupt("pack: ref-delta truncated before base id".to_string()).into(),
            );
        }

        let base_oid = ObjectId::from_raw(&body[pos..pos + OBJECT_ID_RAW_LENGTH])?;
        let (delta_data, pos) = Self::decompress_entry(body, pos + OBJECT_ID_RAW_LENGTH, size)?;

        pending.push(PendingRefDelta {
            base_oid,
            delta: delta_data,
            start,
        });

        Ok(pos)
    }

    fn resolve_ref_delta(&self, pending: &PendingRefDelta) -> anyhow::Result<ObjectId> {
        let (base_type, base_payload) = self.database.read_raw(&pending.base_oid)?;
        let target = delta::apply(&pending.delta, &base_payload)?;

        self.database.store_bytes(base_type, target)
    }

    /// Inflate one zlib stream and verify it produced exactly the
    /// advertised number of bytes. Returns the payload and the position
    /// past the compressed data.
    fn decompress_entry(
        body: &[u8],
        pos: usize,
        expected_size: usize,
    ) -> anyhow::Result<(Bytes, usize)> {
        let mut decoder = flate2::bufread::ZlibDecoder::new(&body[pos..]);
        let mut payload = Vec::with_capacity(expected_size);
        decoder
            .read_to_end(&mut payload)
            .map_err(|e| GitError::Corrupt(format!("pack: bad zlib stream: {e}")))?;

        if payload.len() != expected_size {
            return Err(GitError::Corrupt(format!(
                "pack: inflated {} bytes, header advertised {}",
                payload.len(),
                expected_size
            ))
            .into());
        }

        Ok((Bytes::from(payload), pos + decoder.total_in() as usize))
    }
}
