//! Per-group metadata records.
//!
//! A [`GroupMeta`] binds one slicing run to later stitching: it records the
//! pre-shrink image size, the size actually tiled, and the tile grid. The
//! record is written once before slicing and read once at stitch time; it
//! is never mutated. Group identity is carried by the object key or
//! directory holding the record (`{group}/meta.json`), not by a field.

use crate::codec::TileGrid;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Height/width pair, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub h: u32,
    pub w: u32,
}

/// Tile grid as persisted in `meta.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMeta {
    pub rows: u32,
    pub cols: u32,
    pub size: u32,
}

/// Metadata record for one image group.
///
/// `orig_image` is the size before the optional working-size shrink;
/// `image` is the size actually tiled. Shrink-only invariant:
/// `image.h <= orig_image.h` and `image.w <= orig_image.w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMeta {
    pub orig_image: Dimensions,
    pub image: Dimensions,
    pub tile: TileMeta,
}

impl GroupMeta {
    /// Builds the record for a tiled image.
    pub fn new(orig_image: Dimensions, image: Dimensions, grid: &TileGrid) -> Self {
        Self {
            orig_image,
            image,
            tile: TileMeta {
                rows: grid.rows,
                cols: grid.cols,
                size: grid.tile_size,
            },
        }
    }

    /// Reconstructs the tile grid recorded at slice time.
    pub fn grid(&self) -> TileGrid {
        TileGrid {
            rows: self.tile.rows,
            cols: self.tile.cols,
            tile_size: self.tile.size,
        }
    }

    /// Serializes the record as the `meta.json` wire format.
    pub fn to_json_bytes(&self) -> Result<Bytes, MetaError> {
        let data = serde_json::to_vec(self)?;
        Ok(Bytes::from(data))
    }

    /// Parses a record from `meta.json` bytes.
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, MetaError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Errors from reading or writing metadata records.
#[derive(Debug, Error)]
pub enum MetaError {
    /// No record exists at the given path.
    #[error("metadata not found at {path}")]
    NotFound { path: PathBuf },

    /// Record exists but is not valid `meta.json`.
    #[error("failed to parse metadata: {0}")]
    Parse(#[from] serde_json::Error),

    /// Filesystem failure other than absence.
    #[error("metadata I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Reads a [`GroupMeta`] from a local `meta.json` file.
///
/// # Errors
///
/// [`MetaError::NotFound`] when the file does not exist, [`MetaError::Parse`]
/// when its contents are not a valid record.
pub fn read_meta(path: &Path) -> Result<GroupMeta, MetaError> {
    let data = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => MetaError::NotFound {
            path: path.to_path_buf(),
        },
        _ => MetaError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    GroupMeta::from_json_bytes(&data)
}

/// Writes a [`GroupMeta`] to a local `meta.json` file.
///
/// Idempotent overwrite: re-running a producer for the same group is safe.
/// Missing parent directories are created.
pub fn write_meta(path: &Path, meta: &GroupMeta) -> Result<(), MetaError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| MetaError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = meta.to_json_bytes()?;
    debug!(path = %path.display(), "writing group metadata");
    std::fs::write(path, &data).map_err(|source| MetaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GroupMeta {
        GroupMeta {
            orig_image: Dimensions { h: 600, w: 800 },
            image: Dimensions { h: 600, w: 800 },
            tile: TileMeta {
                rows: 2,
                cols: 2,
                size: 512,
            },
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let json = String::from_utf8(sample().to_json_bytes().unwrap().to_vec()).unwrap();
        assert!(json.contains("\"orig_image\""));
        assert!(json.contains("\"image\""));
        assert!(json.contains("\"tile\""));
        assert!(json.contains("\"rows\":2"));
        assert!(json.contains("\"size\":512"));
    }

    #[test]
    fn test_json_round_trip() {
        let meta = sample();
        let parsed = GroupMeta::from_json_bytes(&meta.to_json_bytes().unwrap()).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_parses_external_record() {
        let json = br#"{"orig_image":{"h":4096,"w":2048},"image":{"h":1024,"w":512},"tile":{"rows":2,"cols":1,"size":512}}"#;
        let meta = GroupMeta::from_json_bytes(json).unwrap();
        assert_eq!(meta.orig_image.h, 4096);
        assert_eq!(meta.image.w, 512);
        assert_eq!(meta.grid().tile_count(), 2);
    }

    #[test]
    fn test_write_then_read_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group-a").join("meta.json");

        let meta = sample();
        write_meta(&path, &meta).unwrap();
        assert_eq!(read_meta(&path).unwrap(), meta);
    }

    #[test]
    fn test_write_is_idempotent_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");

        let meta = sample();
        write_meta(&path, &meta).unwrap();
        write_meta(&path, &meta).unwrap();
        assert_eq!(read_meta(&path).unwrap(), meta);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_meta(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MetaError::NotFound { .. }));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(read_meta(&path).unwrap_err(), MetaError::Parse(_)));
    }
}
