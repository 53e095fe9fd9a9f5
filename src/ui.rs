use crate::tool::Tool;

pub struct UiState {
    // Canvas mode applied to workspace clicks
    pub selected_tool: Option<Tool>,

    // Appearance
    pub dark_mode: bool,
    pub show_path: bool,

    // Status bar: last thing that happened and the hovered image pixel
    pub status: String,
    pub cursor_position: Option<(i32, i32)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_tool: None,
            dark_mode: false,
            show_path: true,
            status: "Pick a background image to start".to_string(),
            cursor_position: None,
        }
    }
}
