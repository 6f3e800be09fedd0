use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteIdError {
    #[error("sprite id must not be empty")]
    Empty,
    #[error("sprite id must not start or end with '/'")]
    EdgeSlash,
    #[error("sprite id must not contain '\\\\'")]
    Backslash,
    #[error("sprite id must not contain '..'")]
    ParentTraversal,
    #[error("sprite id contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub(crate) fn validate_sprite_id(id: &str) -> Result<(), SpriteIdError> {
    if id.is_empty() {
        return Err(SpriteIdError::Empty);
    }
    if id.starts_with('/') || id.ends_with('/') {
        return Err(SpriteIdError::EdgeSlash);
    }
    if id.contains('\\') {
        return Err(SpriteIdError::Backslash);
    }
    if id.contains("..") {
        return Err(SpriteIdError::ParentTraversal);
    }
    match id.chars().find(|ch| !is_sprite_id_char(*ch)) {
        Some(character) => Err(SpriteIdError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

fn is_sprite_id_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')
}

/// `<root>/<id>.png`, with `/` in the id mapped onto nested directories.
pub(crate) fn sprite_image_path(root: &Path, id: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in id.split('/') {
        path.push(segment);
    }
    path.set_extension("png");
    path
}

/// Candidate ids for a player unit, most specific first.
pub(crate) fn unit_sprite_candidates(unit_id: &str, facing: &str) -> [String; 2] {
    [
        format!("units/{unit_id}_{facing}"),
        format!("units/{unit_id}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_ids() {
        let ids = [
            "grass",
            "units/isaac_up",
            "tiles/path-2",
            "buildings/inn_01",
        ];
        for id in ids {
            assert!(validate_sprite_id(id).is_ok(), "id={id}");
        }
    }

    #[test]
    fn rejects_invalid_ids() {
        let ids = [
            "", "/a", "a/", "..", "a/../b", r"a\b", "Isaac", "a.png", "a b",
        ];
        for id in ids {
            assert!(validate_sprite_id(id).is_err(), "id={id}");
        }
    }

    #[test]
    fn path_nests_segments_and_adds_png() {
        let path = sprite_image_path(Path::new("assets/sprites"), "units/isaac_up");
        assert_eq!(path, Path::new("assets/sprites/units/isaac_up.png"));
    }

    #[test]
    fn unit_candidates_prefer_facing_variant() {
        let [first, second] = unit_sprite_candidates("garet", "left");
        assert_eq!(first, "units/garet_left");
        assert_eq!(second, "units/garet");
    }
}
