use egui::Color32;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WINDOW_TITLE: &str = "String Artist";

pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 800.0;
pub const MIN_WINDOW_WIDTH: f32 = 480.0;
pub const MIN_WINDOW_HEIGHT: f32 = 480.0;

/// Margin between the window edge and the workspace canvas.
pub const WORKSPACE_PADDING: f32 = 50.0;

/// Max distance (canvas px) between a click and a nail for it to count as a hit.
pub const SAFE_ZONE: f32 = 6.0;

/// Inward padding (canvas px) applied to the displayed image when placing nails.
pub const CLICK_PADDING: f32 = 2.0;

pub const NAIL_OUTLINE_RADIUS: f32 = 3.0;
pub const NAIL_RADIUS: f32 = 2.0;
pub const NAIL_OUTLINE_COLOR: Color32 = Color32::BLACK;
pub const NAIL_COLOR: Color32 = Color32::from_rgb(0x0f, 0x0f, 0x0f);
pub const PRIORITY_NAIL_COLOR: Color32 = Color32::from_rgb(0x2f, 0xff, 0x2f);
pub const PATH_COLOR: Color32 = Color32::from_rgb(0xff, 0x00, 0x00);

/// Largest side of the background texture uploaded to the GPU.
pub const MAX_PREVIEW_SIDE: u32 = 2048;

/// Minimum number of nails needed to form a pattern polygon.
pub const MIN_PLACEMENTS: usize = 3;

pub const SIDECAR_SUFFIX: &str = ".placements.json";
pub const PATTERN_EXTENSION: &str = "stringartpng";
pub const PINS_KEY: &str = "pins";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
