/// Ratio between full-image pixels and canvas pixels.
///
/// Placements are always stored in image space; this type only converts at
/// the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageScale {
    factor: f32,
}

impl ImageScale {
    pub const IDENTITY: ImageScale = ImageScale { factor: 1.0 };

    pub fn new(factor: f32) -> Self {
        if factor.is_finite() && factor > 0.0 {
            Self { factor }
        } else {
            Self::IDENTITY
        }
    }

    /// Scale that shrinks an image to the available canvas width, never enlarging it.
    pub fn fit(image_width: u32, canvas_width: f32) -> Self {
        if canvas_width <= 0.0 {
            return Self::IDENTITY;
        }
        Self::new((image_width as f32 / canvas_width).max(1.0))
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn to_image_space(&self, canvas_x: i32, canvas_y: i32) -> (i32, i32) {
        to_image_space(canvas_x, canvas_y, self.factor)
    }

    pub fn to_canvas_space(&self, image_x: u32, image_y: u32) -> (i32, i32) {
        to_canvas_space(image_x, image_y, self.factor)
    }

    /// Size of an image once drawn on the canvas.
    pub fn displayed_size(&self, image_width: u32, image_height: u32) -> (f32, f32) {
        (
            image_width as f32 / self.factor,
            image_height as f32 / self.factor,
        )
    }
}

impl Default for ImageScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub fn to_image_space(canvas_x: i32, canvas_y: i32, scale: f32) -> (i32, i32) {
    (
        (canvas_x as f32 * scale).round() as i32,
        (canvas_y as f32 * scale).round() as i32,
    )
}

pub fn to_canvas_space(image_x: u32, image_y: u32, scale: f32) -> (i32, i32) {
    (
        (image_x as f32 / scale).round() as i32,
        (image_y as f32 / scale).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(ImageScale::fit(400, 800.0).factor(), 1.0);
        assert_eq!(ImageScale::fit(800, 800.0).factor(), 1.0);
    }

    #[test]
    fn test_fit_downscales_to_canvas_width() {
        let scale = ImageScale::fit(1600, 800.0);
        assert_eq!(scale.factor(), 2.0);
        assert_eq!(scale.displayed_size(1600, 1200), (800.0, 600.0));
    }

    #[test]
    fn test_fit_with_collapsed_canvas() {
        assert_eq!(ImageScale::fit(1600, 0.0), ImageScale::IDENTITY);
    }

    #[test]
    fn test_conversions_round() {
        let scale = ImageScale::new(2.5);
        assert_eq!(scale.to_image_space(3, 4), (8, 10));
        assert_eq!(scale.to_canvas_space(8, 10), (3, 4));
        assert_eq!(to_canvas_space(11, 0, 2.0), (6, 0));
    }

    #[test]
    fn test_invalid_factor_falls_back_to_identity() {
        assert_eq!(ImageScale::new(0.0), ImageScale::IDENTITY);
        assert_eq!(ImageScale::new(f32::NAN), ImageScale::IDENTITY);
    }
}
