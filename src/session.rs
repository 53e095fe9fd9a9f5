use crate::codec::{self, LoadedPlacements};
use crate::coordinate::ImageScale;
use crate::cropper::SmartCropper;
use crate::error::{CropError, PlacementError};
use crate::placement::{Placement, PlacementStore};
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::path::{Path, PathBuf};

/// The photograph nails are placed on.
pub struct Background {
    path: PathBuf,
    image: DynamicImage,
}

impl Background {
    pub fn open(path: &Path) -> Result<Self, PlacementError> {
        // Patterns carry a custom extension, so sniff the format from the bytes.
        let image = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(Self::from_image(path.to_path_buf(), image))
    }

    pub fn from_image(path: PathBuf, image: DynamicImage) -> Self {
        Self { path, image }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.image.in_bounds(x, y)
    }
}

/// Everything one editing session owns: the background, its nails and the
/// current display scale.
#[derive(Default)]
pub struct Session {
    pub(crate) store: PlacementStore,
    pub(crate) background: Option<Background>,
    pub(crate) scale: ImageScale,
    canvas_width: f32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &PlacementStore {
        &self.store
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn scale(&self) -> ImageScale {
        self.scale
    }

    /// Canvas-space size of the background, if one is loaded.
    pub fn displayed_size(&self) -> Option<(f32, f32)> {
        self.background
            .as_ref()
            .map(|bg| self.scale.displayed_size(bg.width(), bg.height()))
    }

    /// Recomputes the scale for a new canvas width. Returns true if it changed.
    pub fn fit_to_canvas(&mut self, canvas_width: f32) -> bool {
        if (canvas_width - self.canvas_width).abs() < f32::EPSILON {
            return false;
        }
        self.canvas_width = canvas_width;
        let previous = self.scale;
        self.refit();
        if previous != self.scale {
            log::debug!("Image scale: {}", self.scale.factor());
            true
        } else {
            false
        }
    }

    fn refit(&mut self) {
        self.scale = match &self.background {
            Some(bg) => ImageScale::fit(bg.width(), self.canvas_width),
            None => ImageScale::IDENTITY,
        };
    }

    /// Replaces the background and drops every nail placed on the old one.
    pub fn set_background(&mut self, background: Background) {
        log::info!(
            "Background set to {:?} ({}x{})",
            background.path(),
            background.width(),
            background.height()
        );
        self.store.clear();
        self.background = Some(background);
        self.refit();
    }

    pub fn load_background(&mut self, path: &Path) -> Result<(), PlacementError> {
        let background = Background::open(path)?;
        self.set_background(background);
        Ok(())
    }

    /// Nails rescaled to canvas space, with their priority flag.
    pub fn canvas_nails(&self) -> Vec<(i32, i32, bool)> {
        self.store
            .iter()
            .map(|p| {
                let (x, y) = self.scale.to_canvas_space(p.x, p.y);
                (x, y, p.priority)
            })
            .collect()
    }

    /// Writes the canonical sidecar next to the background image.
    pub fn export_positions(&self) -> Result<PathBuf, PlacementError> {
        let background = self.background.as_ref().ok_or(PlacementError::NoBackground)?;
        let path = codec::sidecar_path(background.path());
        codec::write_sidecar(&path, &self.store)?;
        log::info!("Exported {} positions to {:?}", self.store.len(), path);
        Ok(path)
    }

    /// Writes the background with the nails embedded as PNG metadata.
    pub fn export_pattern(&self) -> Result<PathBuf, PlacementError> {
        let background = self.background.as_ref().ok_or(PlacementError::NoBackground)?;
        let path = codec::pattern_path(background.path());
        codec::write_pattern(&path, background.image(), &self.store)?;
        log::info!("Exported pattern with {} nails to {:?}", self.store.len(), path);
        Ok(path)
    }

    /// Loads nails from a sidecar or an embedded pattern file.
    ///
    /// Either the whole import applies or the session is left untouched.
    pub fn import_positions(&mut self, path: &Path) -> Result<usize, PlacementError> {
        let (placements, background) = match codec::load(path)? {
            LoadedPlacements::Embedded { placements, image } => {
                (placements, Some(Background::from_image(path.to_path_buf(), image)))
            }
            LoadedPlacements::Sidecar(placements) => {
                let background = match codec::image_path_for_sidecar(path) {
                    Some(image_path) if image_path.is_file() => Some(Background::open(&image_path)?),
                    _ => None,
                };
                (placements, background)
            }
        };

        let target = background
            .as_ref()
            .or(self.background.as_ref())
            .ok_or(PlacementError::NoBackground)?;
        check_bounds(&placements, target)?;

        if let Some(background) = background {
            self.set_background(background);
        }
        let count = placements.len();
        self.store.replace(placements);
        log::info!("Imported {} positions from {:?}", count, path);
        Ok(count)
    }

    /// Orders the nails and cuts the traced polygon out of the background.
    pub fn smart_crop(&mut self) -> Result<(SmartCropper, RgbaImage), CropError> {
        let background = self.background.as_ref().ok_or(CropError::NoBackground)?;
        let cropper = SmartCropper::order(&mut self.store);
        let cropped = cropper.crop(background.image())?;
        Ok((cropper, cropped))
    }
}

fn check_bounds(placements: &[Placement], background: &Background) -> Result<(), PlacementError> {
    match placements.iter().position(|p| !background.contains(p.x, p.y)) {
        Some(i) => {
            let msg = format!(
                "entry {} at ({}, {}) lies outside the {}x{} image",
                i,
                placements[i].x,
                placements[i].y,
                background.width(),
                background.height()
            );
            log::warn!("Error loading placements, {}", msg);
            Err(PlacementError::Load(msg))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    pub(crate) fn blank_background(width: u32, height: u32) -> Background {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        Background::from_image(PathBuf::from("blank.png"), DynamicImage::ImageRgba8(image))
    }

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("string_artist_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_set_background_clears_nails() {
        let mut session = Session::new();
        session.set_background(blank_background(100, 100));
        session.store.push(1, 1);
        session.set_background(blank_background(50, 50));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_fit_to_canvas_updates_scale() {
        let mut session = Session::new();
        session.set_background(blank_background(1000, 500));
        assert!(session.fit_to_canvas(500.0));
        assert_eq!(session.scale().factor(), 2.0);
        assert_eq!(session.displayed_size(), Some((500.0, 250.0)));
        assert!(!session.fit_to_canvas(500.0));
    }

    #[test]
    fn test_canvas_nails_are_rescaled() {
        let mut session = Session::new();
        session.set_background(blank_background(1000, 500));
        session.fit_to_canvas(500.0);
        session.store.push(100, 40);
        assert_eq!(session.canvas_nails(), vec![(50, 20, true)]);
    }

    #[test]
    fn test_export_without_background_fails() {
        let session = Session::new();
        assert!(matches!(
            session.export_positions(),
            Err(PlacementError::NoBackground)
        ));
    }

    #[test]
    fn test_sidecar_round_trip_through_session() {
        let image_path = temp_path("round_trip.png");
        blank_background(40, 40)
            .image()
            .save(&image_path)
            .unwrap();

        let mut session = Session::new();
        session.load_background(&image_path).unwrap();
        session.store.push(5, 5);
        session.store.push(30, 5);
        session.store.push(5, 30);
        session.store.set_priority(2);
        let before = session.store().triples();

        let sidecar = session.export_positions().unwrap();
        assert!(sidecar.to_string_lossy().ends_with(".placements.json"));

        let mut restored = Session::new();
        assert_eq!(restored.import_positions(&sidecar).unwrap(), 3);
        assert_eq!(restored.store().triples(), before);
        assert_eq!(restored.background().unwrap().path(), image_path.as_path());

        let _ = std::fs::remove_file(&sidecar);
        let _ = std::fs::remove_file(&image_path);
    }

    #[test]
    fn test_pattern_round_trip_through_session() {
        let mut session = Session::new();
        session.set_background(blank_background(20, 20));
        session.store.push(1, 1);
        session.store.push(10, 2);
        session.store.push(3, 15);

        let pattern = temp_path("pattern.png");
        codec::write_pattern(&pattern, session.background().unwrap().image(), session.store())
            .unwrap();

        let mut restored = Session::new();
        assert_eq!(restored.import_positions(&pattern).unwrap(), 3);
        assert_eq!(restored.store().triples(), session.store().triples());
        assert_eq!(restored.background().unwrap().width(), 20);

        let _ = std::fs::remove_file(&pattern);
    }

    #[test]
    fn test_sidecar_next_to_pattern_reimports() {
        let mut session = Session::new();
        session.set_background(blank_background(30, 30));
        session.store.push(2, 2);
        session.store.push(25, 4);
        session.store.push(12, 27);
        session.store.set_priority(1);

        let pattern = temp_path("reimport.stringartpng");
        codec::write_pattern(&pattern, session.background().unwrap().image(), session.store())
            .unwrap();

        let mut from_pattern = Session::new();
        from_pattern.import_positions(&pattern).unwrap();
        let sidecar = from_pattern.export_positions().unwrap();
        assert!(sidecar
            .to_string_lossy()
            .ends_with(".stringartpng.placements.json"));

        let mut restored = Session::new();
        assert_eq!(restored.import_positions(&sidecar).unwrap(), 3);
        assert_eq!(restored.store().triples(), session.store().triples());
        assert_eq!(restored.background().unwrap().path(), pattern.as_path());
        assert_eq!(restored.background().unwrap().width(), 30);

        let _ = std::fs::remove_file(&sidecar);
        let _ = std::fs::remove_file(&pattern);
    }

    #[test]
    fn test_failed_import_keeps_state() {
        let mut session = Session::new();
        session.set_background(blank_background(20, 20));
        session.store.push(1, 1);

        let path = temp_path("too_few.placements.json");
        std::fs::write(&path, "[[1,1,1],[2,2,0]]").unwrap();
        let err = session.import_positions(&path).unwrap_err();
        assert!(matches!(err, PlacementError::NotEnoughPoints { .. }));
        assert_eq!(session.store().triples(), vec![(1, 1, true)]);

        std::fs::write(&path, "[[1,1,1],[2,2,0],[50,2,0]]").unwrap();
        let err = session.import_positions(&path).unwrap_err();
        assert!(matches!(err, PlacementError::Load(_)));
        assert_eq!(session.store().len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_without_any_background_fails() {
        let path = temp_path("orphan.placements.json");
        std::fs::write(&path, "[[1,1,1],[2,2,0],[3,3,0]]").unwrap();
        let mut session = Session::new();
        assert!(matches!(
            session.import_positions(&path),
            Err(PlacementError::NoBackground)
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_smart_crop_needs_background() {
        let mut session = Session::new();
        assert!(matches!(session.smart_crop(), Err(CropError::NoBackground)));
    }
}
