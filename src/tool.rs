use egui::{InputState, Key};

/// Toolbar entries. Modes stay selected and act on canvas clicks; actions run
/// once when picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Nail,
    Erase,
    Prioritize,
    ExportPositions,
    ExportPattern,
    ImportPositions,
    Background,
    SmartCrop,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Nail,
        Tool::Erase,
        Tool::Prioritize,
        Tool::ExportPositions,
        Tool::ExportPattern,
        Tool::ImportPositions,
        Tool::Background,
        Tool::SmartCrop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Nail => "Nail",
            Tool::Erase => "Erase",
            Tool::Prioritize => "Prioritize",
            Tool::ExportPositions => "Export Positions",
            Tool::ExportPattern => "Export Pattern",
            Tool::ImportPositions => "Import Positions",
            Tool::Background => "Background",
            Tool::SmartCrop => "Smart Crop",
        }
    }

    pub fn shortcut_text(self) -> &'static str {
        match self {
            Tool::Nail => "N",
            Tool::Erase => "E",
            Tool::Prioritize => "P",
            Tool::ExportPositions => "Ctrl+S",
            Tool::ExportPattern => "Ctrl+Shift+S",
            Tool::ImportPositions => "Ctrl+O",
            Tool::Background => "B",
            Tool::SmartCrop => "C",
        }
    }

    /// Whether the tool is a canvas mode rather than a one-shot action.
    pub fn is_mode(self) -> bool {
        matches!(self, Tool::Nail | Tool::Erase | Tool::Prioritize)
    }

    /// Tool triggered by a key press this frame, if any.
    pub fn from_input(input: &InputState) -> Option<Tool> {
        let command = input.modifiers.command;
        let shift = input.modifiers.shift;
        let pressed = |key| input.key_pressed(key);

        if command {
            return if pressed(Key::S) {
                Some(if shift {
                    Tool::ExportPattern
                } else {
                    Tool::ExportPositions
                })
            } else if pressed(Key::O) {
                Some(Tool::ImportPositions)
            } else {
                None
            };
        }

        if pressed(Key::N) {
            Some(Tool::Nail)
        } else if pressed(Key::E) {
            Some(Tool::Erase)
        } else if pressed(Key::P) {
            Some(Tool::Prioritize)
        } else if pressed(Key::B) {
            Some(Tool::Background)
        } else if pressed(Key::C) {
            Some(Tool::SmartCrop)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
