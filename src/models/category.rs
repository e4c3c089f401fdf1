//! The six fabrication stages used to partition files and tasks.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Panel,
    Cutting,
    Door,
    StripCurtain,
    Accessories,
    System,
}

impl Category {
    /// Display order of the category cards.
    pub const ALL: [Category; 6] = [
        Category::Panel,
        Category::Cutting,
        Category::Door,
        Category::StripCurtain,
        Category::Accessories,
        Category::System,
    ];

    /// Wire tag used in file listings and upload forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Panel => "panel",
            Category::Cutting => "cutting",
            Category::Door => "door",
            Category::StripCurtain => "strip_curtain",
            Category::Accessories => "accessories",
            Category::System => "system",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Panel => "Panel / Slab",
            Category::Cutting => "Cutting",
            Category::Door => "Door",
            Category::StripCurtain => "Strip Curtain",
            Category::Accessories => "Accessories",
            Category::System => "System",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Panel => "🖼️",
            Category::Cutting => "✂️",
            Category::Door => "🚪",
            Category::StripCurtain => "🎪",
            Category::Accessories => "🔧",
            Category::System => "⚙️",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Panel => "Panel and slab related files",
            Category::Cutting => "Cutting plans and documents",
            Category::Door => "Door specifications and drawings",
            Category::StripCurtain => "Strip curtain documentation",
            Category::Accessories => "Accessories and fittings",
            Category::System => "System integration files",
        }
    }

    /// Collection path of this stage's task board, e.g. `/strip-curtain-tasks`.
    pub fn tasks_path(self) -> String {
        format!("/{}-tasks", self.as_str().replace('_', "-"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category `{0}` (expected one of panel, cutting, door, strip_curtain, accessories, system)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the wire tag plus the kebab-case and label spellings users type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "panel" | "panel_slab" | "panel_/_slab" | "panels" => Ok(Category::Panel),
            "cutting" => Ok(Category::Cutting),
            "door" | "doors" => Ok(Category::Door),
            "strip_curtain" | "stripcurtain" => Ok(Category::StripCurtain),
            "accessories" => Ok(Category::Accessories),
            "system" => Ok(Category::System),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tags_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&Category::StripCurtain).unwrap();
        assert_eq!(json, "\"strip_curtain\"");
        let parsed: Category = serde_json::from_str("\"door\"").unwrap();
        assert_eq!(parsed, Category::Door);
    }

    #[test]
    fn tasks_path_uses_kebab_case() {
        assert_eq!(Category::StripCurtain.tasks_path(), "/strip-curtain-tasks");
        assert_eq!(Category::Door.tasks_path(), "/door-tasks");
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("roof".parse::<Category>().is_err());
        assert_eq!("Strip Curtain".parse::<Category>().unwrap(), Category::StripCurtain);
    }
}
