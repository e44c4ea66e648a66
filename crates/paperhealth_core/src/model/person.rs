//! Family member model.
//!
//! # Responsibility
//! - Define the person shape shown in the member switcher.
//! - Own avatar color validation and palette rotation rules.
//!
//! # Invariants
//! - `AvatarColor` is always a `#RRGGBB` hex string.
//! - Generated person ids are never reused.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Stable identifier of one family member.
pub type PersonId = String;

/// Built-in avatar palette, in rotation order.
pub const DEFAULT_AVATAR_PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#f97316", "#ef4444", "#14b8a6", "#4b5563",
];

/// Avatar color rejected by hex validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAvatarColor(pub String);

impl Display for InvalidAvatarColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "avatar color must be #RRGGBB, got `{}`", self.0)
    }
}

impl Error for InvalidAvatarColor {}

/// Avatar background color in `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AvatarColor(String);

impl AvatarColor {
    /// Parses and normalizes a hex color to lowercase.
    pub fn parse(value: &str) -> Result<Self, InvalidAvatarColor> {
        let trimmed = value.trim();
        if !HEX_COLOR_RE.is_match(trimmed) {
            return Err(InvalidAvatarColor(value.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for AvatarColor {
    type Error = InvalidAvatarColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<AvatarColor> for String {
    fn from(value: AvatarColor) -> Self {
        value.0
    }
}

impl Display for AvatarColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// One family member whose records are tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    /// Display name. May be blank inside an unsaved member draft.
    pub name: String,
    pub avatar_color: AvatarColor,
}

impl Person {
    /// Creates a person with a caller-provided id.
    pub fn new(
        id: impl Into<PersonId>,
        name: impl Into<String>,
        avatar_color: AvatarColor,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_color,
        }
    }

    /// Returns whether the name is non-empty after trimming.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// First character of the name for avatar rendering, `?` when blank.
    pub fn initial(&self) -> char {
        self.name.trim().chars().next().unwrap_or('?')
    }
}

/// Generates a fresh person id.
pub fn new_person_id() -> PersonId {
    format!("p-{}", Uuid::new_v4().simple())
}

/// Returns the built-in palette as validated colors.
pub fn default_avatar_palette() -> Vec<AvatarColor> {
    DEFAULT_AVATAR_PALETTE
        .iter()
        .map(|value| AvatarColor(value.to_string()))
        .collect()
}

/// First built-in palette color.
pub fn default_avatar_color() -> AvatarColor {
    AvatarColor(DEFAULT_AVATAR_PALETTE[0].to_string())
}

/// Color assigned to a newly added member when `member_count` already exist.
///
/// Returns `None` only for an empty palette.
pub fn palette_color_for(palette: &[AvatarColor], member_count: usize) -> Option<AvatarColor> {
    if palette.is_empty() {
        return None;
    }
    palette.get(member_count % palette.len()).cloned()
}

/// Next palette color after `current`; colors outside the palette restart at
/// the first entry.
pub fn next_palette_color(palette: &[AvatarColor], current: &AvatarColor) -> Option<AvatarColor> {
    if palette.is_empty() {
        return None;
    }
    let next_index = match palette.iter().position(|color| color == current) {
        Some(index) => (index + 1) % palette.len(),
        None => 0,
    };
    palette.get(next_index).cloned()
}

#[cfg(test)]
mod tests {
    use super::{default_avatar_palette, next_palette_color, palette_color_for, AvatarColor};

    #[test]
    fn avatar_color_normalizes_case_and_rejects_non_hex() {
        let color = AvatarColor::parse("#3B82F6").expect("hex color should parse");
        assert_eq!(color.as_str(), "#3b82f6");
        assert!(AvatarColor::parse("blue").is_err());
        assert!(AvatarColor::parse("#12345").is_err());
    }

    #[test]
    fn palette_rotation_wraps_by_member_count() {
        let palette = default_avatar_palette();
        assert_eq!(palette_color_for(&palette, 0), Some(palette[0].clone()));
        assert_eq!(palette_color_for(&palette, 7), Some(palette[1].clone()));
        assert_eq!(palette_color_for(&[], 3), None);
    }

    #[test]
    fn next_color_cycles_and_restarts_for_unknown_colors() {
        let palette = default_avatar_palette();
        let last = palette[palette.len() - 1].clone();
        assert_eq!(next_palette_color(&palette, &last), Some(palette[0].clone()));

        let outsider = AvatarColor::parse("#000000").unwrap();
        assert_eq!(
            next_palette_color(&palette, &outsider),
            Some(palette[0].clone())
        );
    }
}
