use egui::{Pos2, Rect, Vec2};

/// Where the scaled background sits inside the workspace panel.
///
/// Canvas space has its origin at the top-left corner of the displayed image,
/// one unit per screen point.
pub struct Canvas {
    width: f32,
    height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn get_screen_rect(&self, view_rect: Rect) -> Rect {
        Rect::from_min_size(view_rect.min, Vec2::new(self.width, self.height))
    }

    pub fn screen_to_canvas_pos(&self, screen_pos: Pos2, view_rect: Rect) -> Pos2 {
        (screen_pos - self.get_screen_rect(view_rect).min).to_pos2()
    }

    pub fn canvas_to_screen_pos(&self, canvas_pos: Pos2, view_rect: Rect) -> Pos2 {
        self.get_screen_rect(view_rect).min + canvas_pos.to_vec2()
    }

    /// Rounds a screen position to integer canvas coordinates.
    pub fn click_position(&self, screen_pos: Pos2, view_rect: Rect) -> (i32, i32) {
        let pos = self.screen_to_canvas_pos(screen_pos, view_rect);
        (pos.x.round() as i32, pos.y.round() as i32)
    }
}
