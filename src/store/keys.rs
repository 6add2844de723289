//! Object key layout shared by producer, worker, and collector.
//!
//! ```text
//! {group}/{role}.tiff        full image (source or mask)
//! {group}/{role}/{i}.png     tile at linear index i, zero-padded
//! {group}/meta.json          group metadata record
//! ```
//!
//! The tile index width is sized to the grid (minimum 3 digits) so keys
//! under a tile prefix sort in tile order.

use std::fmt;

/// Image role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The normalized input image.
    Source,
    /// The predicted binary mask.
    Mask,
}

impl Role {
    /// Key-path segment for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Mask => "mask",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed tile key: `{group}/{role}/{stem}.png`.
///
/// The stem keeps its zero padding so the mask key derived from a source
/// key preserves the original index width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileKey {
    pub group: String,
    pub role: Role,
    pub stem: String,
}

impl TileKey {
    /// Tile index parsed from the zero-padded stem.
    pub fn index(&self) -> Option<usize> {
        self.stem.parse().ok()
    }

    /// The same tile position under a different role.
    pub fn with_role(&self, role: Role) -> String {
        format!("{}/{}/{}.png", self.group, role, self.stem)
    }
}

/// Key of a full image: `{group}/{role}.tiff`.
pub fn image_key(group: &str, role: Role) -> String {
    format!("{group}/{role}.tiff")
}

/// Key of the tile at `index`: `{group}/{role}/{index}.png`, zero-padded
/// to `width` digits.
pub fn tile_key(group: &str, role: Role, index: usize, width: usize) -> String {
    format!("{group}/{role}/{index:0width$}.png")
}

/// Prefix under which a group's tiles of one role live.
pub fn tile_prefix(group: &str, role: Role) -> String {
    format!("{group}/{role}/")
}

/// Key of the group metadata record: `{group}/meta.json`.
pub fn meta_key(group: &str) -> String {
    format!("{group}/meta.json")
}

/// Parses a tile key back into its parts.
///
/// Returns `None` for keys that do not follow the tile layout. Group names
/// may themselves contain `/` separators; the last two segments are the
/// role and the tile file name.
pub fn parse_tile_key(key: &str) -> Option<TileKey> {
    let (rest, file) = key.rsplit_once('/')?;
    let (group, role) = rest.rsplit_once('/')?;
    let role = match role {
        "source" => Role::Source,
        "mask" => Role::Mask,
        _ => return None,
    };
    let stem = file.strip_suffix(".png")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(TileKey {
        group: group.to_string(),
        role,
        stem: stem.to_string(),
    })
}

/// Tile index parsed from a tile key, if it is one.
pub fn parse_tile_index(key: &str) -> Option<usize> {
    parse_tile_key(key)?.index()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(image_key("group-a", Role::Source), "group-a/source.tiff");
        assert_eq!(image_key("group-a", Role::Mask), "group-a/mask.tiff");
        assert_eq!(tile_key("group-a", Role::Source, 7, 3), "group-a/source/007.png");
        assert_eq!(tile_key("group-a", Role::Mask, 1234, 4), "group-a/mask/1234.png");
        assert_eq!(tile_prefix("group-a", Role::Mask), "group-a/mask/");
        assert_eq!(meta_key("group-a"), "group-a/meta.json");
    }

    #[test]
    fn test_parse_tile_key() {
        let parsed = parse_tile_key("group-a/source/007.png").unwrap();
        assert_eq!(parsed.group, "group-a");
        assert_eq!(parsed.role, Role::Source);
        assert_eq!(parsed.index(), Some(7));
        assert_eq!(parsed.with_role(Role::Mask), "group-a/mask/007.png");
    }

    #[test]
    fn test_parse_nested_group() {
        let parsed = parse_tile_key("run-3/group-b/mask/0012.png").unwrap();
        assert_eq!(parsed.group, "run-3/group-b");
        assert_eq!(parsed.role, Role::Mask);
        assert_eq!(parsed.index(), Some(12));
    }

    #[test]
    fn test_parse_rejects_non_tile_keys() {
        assert!(parse_tile_key("group-a/meta.json").is_none());
        assert!(parse_tile_key("group-a/source.tiff").is_none());
        assert!(parse_tile_key("group-a/other/001.png").is_none());
        assert!(parse_tile_key("group-a/source/abc.png").is_none());
        assert!(parse_tile_key("001.png").is_none());
    }

    #[test]
    fn test_tile_keys_sort_in_index_order() {
        let keys: Vec<String> = (0..12).map(|i| tile_key("g", Role::Source, i, 3)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(sorted, keys);
    }
}
