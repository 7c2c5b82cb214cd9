use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of the sankey body, excluding margins.
    pub width: f32,
    /// Height of the sankey body, excluding margins and title band.
    pub height: f32,
    /// Horizontal extent of each node rectangle.
    pub node_thickness: f32,
    /// Vertical gap between stacked nodes in the same column.
    pub node_padding: f32,
    pub margin: f32,
    pub title_height: f32,
    /// Gap between a node rectangle and its label.
    pub label_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 980.0,
            height: 560.0,
            node_thickness: 25.0,
            node_padding: 20.0,
            margin: 40.0,
            title_height: 46.0,
            label_gap: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<Theme>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
}

/// Loads overrides from an optional JSON file on top of the defaults.
/// Absent sections keep their default values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme) = parsed.theme {
        config.theme = theme;
    }
    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chart_constants() {
        let config = Config::default();
        assert_eq!(config.layout.node_thickness, 25.0);
        assert_eq!(config.layout.node_padding, 20.0);
        assert_eq!(config.theme.font_size, 10.0);
        assert_eq!(config.theme.link_color, "rgba(31, 184, 205, 0.2)");
    }

    #[test]
    fn load_config_without_path_returns_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.render.width, 1200.0);
        assert_eq!(config.render.height, 800.0);
    }

    #[test]
    fn partial_json_overrides_only_named_sections() {
        let parsed: ConfigFile =
            serde_json::from_str(r#"{"layout": {"nodePadding": 12.0}}"#).unwrap();
        let layout = parsed.layout.unwrap();
        assert_eq!(layout.node_padding, 12.0);
        assert_eq!(layout.node_thickness, 25.0);
        assert!(parsed.theme.is_none());
    }
}
