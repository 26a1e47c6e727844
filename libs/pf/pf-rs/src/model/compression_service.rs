use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::errors::{PfErrKind, PfResult, Unexpected};

pub fn compress(content: &[u8]) -> PfResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).map_unexpected()?;
    encoder.finish().map_unexpected()
}

/// A blob that fails to inflate was written by something other than the sync pipeline.
pub fn decompress(content: &[u8]) -> PfResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(content);
    let mut result = Vec::<u8>::new();
    decoder.read_to_end(&mut result).map_err(|err| {
        warn!("blob failed to inflate: {err:?}");
        PfErrKind::BlobCorrupted
    })?;
    Ok(result)
}

pub fn compress_json<T: Serialize>(value: &T) -> PfResult<Vec<u8>> {
    compress(&serde_json::to_vec(value)?)
}

pub fn decompress_json<T: DeserializeOwned>(content: &[u8]) -> PfResult<T> {
    serde_json::from_slice(&decompress(content)?).map_err(|err| {
        warn!("blob inflated to malformed json: {err}");
        PfErrKind::BlobCorrupted.into()
    })
}

#[test]
fn compress_decompress() {
    assert_eq!(decompress(&compress(b"hello").unwrap()).unwrap(), b"hello");
}

#[test]
fn garbage_is_corrupted() {
    assert_eq!(decompress(b"not zlib").unwrap_err().kind, PfErrKind::BlobCorrupted);

    let not_a_tree = compress(b"[1, 2, 3]").unwrap();
    let err = decompress_json::<crate::model::drive_node::DriveNode>(&not_a_tree).unwrap_err();
    assert_eq!(err.kind, PfErrKind::BlobCorrupted);
}
