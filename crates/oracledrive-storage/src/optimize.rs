//! Upload optimization
//!
//! Compressible media types are gzip-encoded before validation and storage.
//! The encoding is recorded on the file so downloads can be decoded; content
//! that does not shrink is stored as-is.

use bytes::Bytes;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use oracledrive_core::{ContentEncoding, DriveError, DriveFile, Result, StorageConfig};
use std::io::Read;
use tracing::debug;

pub fn is_compressible(mime_type: &str, config: &StorageConfig) -> bool {
    config
        .compressible_mime_prefixes
        .iter()
        .any(|prefix| mime_type.starts_with(prefix.as_str()))
}

/// Gzip-encode a file when its media type is compressible and the encoded
/// form is actually smaller. Already-encoded files pass through untouched.
pub fn optimize_for_upload(file: DriveFile, config: &StorageConfig) -> Result<DriveFile> {
    if file.encoding != ContentEncoding::Identity || !is_compressible(&file.mime_type, config) {
        return Ok(file);
    }
    let mut encoder = GzEncoder::new(file.content.as_ref(), Compression::default());
    let mut compressed = Vec::with_capacity(file.content.len() / 2);
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| DriveError::storage("optimize_for_upload", e.to_string()))?;
    if compressed.len() as u64 >= file.size {
        debug!(file = %file.id, "compression would not shrink content, storing as-is");
        return Ok(file);
    }
    debug!(
        file = %file.id,
        original = file.size,
        compressed = compressed.len(),
        "gzip upload optimization applied"
    );
    let optimized = DriveFile {
        size: compressed.len() as u64,
        content: Bytes::from(compressed),
        encoding: ContentEncoding::Gzip,
        ..file
    };
    Ok(optimized)
}

/// Decode a stored file back to identity encoding.
pub fn decode(file: DriveFile) -> Result<DriveFile> {
    match file.encoding {
        ContentEncoding::Identity => Ok(file),
        ContentEncoding::Gzip => {
            let mut decoder = GzDecoder::new(file.content.as_ref());
            let mut decoded = Vec::new();
            decoder
                .read_to_end(&mut decoded)
                .map_err(|e| DriveError::storage("decode", e.to_string()))?;
            Ok(DriveFile {
                size: decoded.len() as u64,
                content: Bytes::from(decoded),
                encoding: ContentEncoding::Identity,
                ..file
            })
        }
    }
}

/// Original (pre-compression) length of a stored file, read from the gzip
/// ISIZE trailer for encoded content.
pub fn original_size(file: &DriveFile) -> u64 {
    match file.encoding {
        ContentEncoding::Identity => file.size,
        ContentEncoding::Gzip => {
            let c = &file.content;
            if c.len() < 4 {
                return file.size;
            }
            let tail = &c[c.len() - 4..];
            u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]) as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig::default()
    }

    #[test]
    fn compressible_text_is_gzipped() {
        let file = DriveFile::new("f-1", "log.txt", vec![b'a'; 4096], "text/plain");
        let optimized = optimize_for_upload(file.clone(), &config()).unwrap();
        assert_eq!(optimized.encoding, ContentEncoding::Gzip);
        assert!(optimized.size < file.size);
        assert_eq!(original_size(&optimized), 4096);
    }

    #[test]
    fn optimize_then_decode_roundtrips() {
        let content = b"the quick brown fox jumps over the lazy dog ".repeat(50);
        let file = DriveFile::new("f-1", "fox.txt", content.clone(), "text/plain");
        let optimized = optimize_for_upload(file, &config()).unwrap();
        let decoded = decode(optimized).unwrap();
        assert_eq!(decoded.content.as_ref(), content.as_slice());
        assert_eq!(decoded.encoding, ContentEncoding::Identity);
    }

    #[test]
    fn binary_media_passes_through() {
        let file = DriveFile::new("f-1", "photo.jpg", vec![0u8; 256], "image/jpeg");
        let optimized = optimize_for_upload(file.clone(), &config()).unwrap();
        assert_eq!(optimized, file);
    }

    #[test]
    fn incompressible_content_is_not_stored_gzipped() {
        // High-entropy bytes, pseudo-random without pulling in a rng.
        let content: Vec<u8> = (0u32..2048)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let file = DriveFile::new("f-1", "noise.txt", content, "text/plain");
        let optimized = optimize_for_upload(file.clone(), &config()).unwrap();
        assert_eq!(optimized.encoding, ContentEncoding::Identity);
        assert_eq!(optimized.size, file.size);
    }

    #[test]
    fn identity_original_size_is_declared_size() {
        let file = DriveFile::new("f-1", "a.bin", vec![1, 2, 3], "application/octet-stream");
        assert_eq!(original_size(&file), 3);
    }
}
