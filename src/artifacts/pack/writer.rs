//! Pack assembly
//!
//! Writes the requested objects as plain (non-deltified) pack entries:
//! signature, version, count, one varint header + zlib stream per object,
//! and the trailing SHA-1. Receive-pack accepts packs without delta
//! compression, so push never deltifies.

use crate::artifacts::pack::delta::encode_size_varint;
use crate::artifacts::pack::{PackObjectType, SIGNATURE, VERSION};
use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::WriteBytesExt;
use bytes::Bytes;
use derive_new::new;
use sha1::{Digest, Sha1};
use std::io::Write;

#[derive(new)]
pub struct PackWriter<'d> {
    database: &'d Database,
}

impl PackWriter<'_> {
    pub fn write(&self, object_ids: &[ObjectId]) -> anyhow::Result<Bytes> {
        if object_ids.is_empty() {
            anyhow::bail!("no objects provided for pack creation");
        }

        let mut pack = Vec::new();
        pack.write_all(SIGNATURE)?;
        pack.write_u32::<byteorder::NetworkEndian>(VERSION)?;
        pack.write_u32::<byteorder::NetworkEndian>(object_ids.len() as u32)?;

        for object_id in object_ids {
            self.encode_object(object_id, &mut pack)
                .with_context(|| format!("failed to encode object {object_id}"))?;
        }

        let checksum = Sha1::digest(&pack);
        pack.write_all(checksum.as_slice())?;

        Ok(Bytes::from(pack))
    }

    fn encode_object(&self, object_id: &ObjectId, pack: &mut Vec<u8>) -> anyhow::Result<()> {
        let (object_type, payload) = self.database.read_raw(object_id)?;

        let mut header = encode_size_varint(payload.len(), 4);
        header[0] |= (PackObjectType::from(object_type) as u8) << 4;
        pack.write_all(&header)?;

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&payload)?;
        pack.write_all(&encoder.finish()?)?;

        Ok(())
    }
}
