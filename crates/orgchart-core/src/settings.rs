//! Typed chart configuration. Absent keys take the defaults below; unknown keys are ignored.

use crate::color::{adjust_color, convert_to_12_hour};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_DEPTH_COLOR: &str = "#F0F0F0";

/// Stroke is the fill darkened by this much per channel.
pub const NODE_STROKE_DARKEN: i32 = -50;

const HEADER_GRADIENT_DARKEN: i32 = -30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseLevel {
    /// Nothing is collapsed.
    All,
    /// Nodes at `depth >= n - 1` start collapsed. Always `>= 1`.
    Level(usize),
}

impl Default for CollapseLevel {
    fn default() -> Self {
        Self::Level(2)
    }
}

impl CollapseLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        match raw.parse::<usize>() {
            Ok(n) if n >= 1 => Some(Self::Level(n)),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollapseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Level(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for CollapseLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CollapseLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let parsed = match &value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => n
                .as_u64()
                .filter(|n| *n >= 1)
                .map(|n| Self::Level(n as usize)),
            _ => None,
        };
        Ok(parsed.unwrap_or_else(|| {
            tracing::warn!(%value, "unrecognized collapseLevel; using default");
            Self::default()
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintOrientation {
    Portrait,
    #[default]
    Landscape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintSize {
    #[default]
    A4,
    Letter,
    A3,
}

impl PrintSize {
    /// Page size in CSS pixels (96 dpi) as `(width, height)`.
    pub fn dimensions(self, orientation: PrintOrientation) -> (f64, f64) {
        let (short, long) = match self {
            Self::A4 => (796.0, 1123.0),
            Self::Letter => (816.0, 1056.0),
            Self::A3 => (1123.0, 1587.0),
        };
        match orientation {
            PrintOrientation::Portrait => (short, long),
            PrintOrientation::Landscape => (long, short),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeColors {
    pub level0: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub level4: String,
    pub level5: String,
}

impl Default for NodeColors {
    fn default() -> Self {
        Self {
            level0: "#90EE90".to_string(),
            level1: "#FFFFE0".to_string(),
            level2: "#E0F2FF".to_string(),
            level3: "#FFE4E1".to_string(),
            level4: "#E8DFF5".to_string(),
            level5: "#FFEAA7".to_string(),
        }
    }
}

impl NodeColors {
    pub fn fill_for_depth(&self, depth: usize) -> &str {
        match depth {
            0 => &self.level0,
            1 => &self.level1,
            2 => &self.level2,
            3 => &self.level3,
            4 => &self.level4,
            5 => &self.level5,
            _ => DEFAULT_DEPTH_COLOR,
        }
    }

    pub fn stroke_for_depth(&self, depth: usize) -> String {
        adjust_color(self.fill_for_depth(depth), NODE_STROKE_DARKEN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartSettings {
    pub chart_title: String,
    pub header_color: String,
    pub logo_path: Option<String>,
    pub update_time: String,
    pub auto_update_enabled: bool,
    pub collapse_level: CollapseLevel,
    pub node_colors: NodeColors,
    pub highlight_new_employees: bool,
    pub show_profile_images: bool,
    pub show_departments: bool,
    pub show_employee_count: bool,
    pub search_highlight: bool,
    pub search_auto_expand: bool,
    pub print_orientation: PrintOrientation,
    pub print_size: PrintSize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            chart_title: "Organization Chart".to_string(),
            header_color: "#0078d4".to_string(),
            logo_path: None,
            update_time: "20:00".to_string(),
            auto_update_enabled: true,
            collapse_level: CollapseLevel::default(),
            node_colors: NodeColors::default(),
            highlight_new_employees: true,
            show_profile_images: true,
            show_departments: true,
            show_employee_count: true,
            search_highlight: true,
            search_auto_expand: true,
            print_orientation: PrintOrientation::default(),
            print_size: PrintSize::default(),
        }
    }
}

impl ChartSettings {
    /// Parses a settings document, filling every absent key with its default.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(Error::InvalidSettings {
                message: "settings document must be a JSON object".to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// `"Updates daily @ 8:00 PM"` or `"Auto-update disabled"`.
    pub fn header_subtitle(&self) -> String {
        if !self.auto_update_enabled {
            return "Auto-update disabled".to_string();
        }
        match convert_to_12_hour(&self.update_time) {
            Some(t) => format!("Updates daily @ {t}"),
            None => format!("Updates daily @ {}", self.update_time),
        }
    }

    /// `(start, end)` colours of the header gradient.
    pub fn header_gradient(&self) -> (String, String) {
        (
            self.header_color.clone(),
            adjust_color(&self.header_color, HEADER_GRADIENT_DARKEN),
        )
    }
}
