use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_font_size: f32,
    pub text_color: String,
    pub node_border_color: String,
    pub node_border_width: f32,
    pub link_color: String,
    pub background: String,
}

impl Theme {
    /// Presentation constants of the FastRecon chart: 10px base font,
    /// black half-pixel node borders, translucent teal ribbons.
    pub fn fastrecon() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 10.0,
            title_font_size: 17.0,
            text_color: "#2a3f5f".to_string(),
            node_border_color: "black".to_string(),
            node_border_width: 0.5,
            link_color: "rgba(31, 184, 205, 0.2)".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::fastrecon()
    }
}
