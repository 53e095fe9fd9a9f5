use crate::config::{CLICK_PADDING, SAFE_ZONE};
use crate::error::EditError;
use crate::placement::{distance, Placement};
use crate::session::Session;

// Nail editing. Every operation takes canvas-space coordinates and either
// mutates the store or leaves it untouched and reports why.
impl Session {
    /// Places a nail under the click. The first nail becomes the priority nail.
    pub fn place_nail(&mut self, canvas_x: i32, canvas_y: i32) -> Result<usize, EditError> {
        let (width, height, (displayed_w, displayed_h)) =
            match (&self.background, self.displayed_size()) {
                (Some(bg), Some(displayed)) => (bg.width(), bg.height(), displayed),
                _ => {
                    log::debug!("Cannot place nail as there is no image!");
                    return Err(EditError::NoImage);
                }
            };

        let in_bounds = |v: i32, extent: f32| {
            let v = v as f32;
            v >= CLICK_PADDING && v <= extent - CLICK_PADDING
        };
        if !in_bounds(canvas_x, displayed_w) || !in_bounds(canvas_y, displayed_h) {
            log::debug!(
                "Cannot place nail at {:?} as it is not on the image {:?}",
                (canvas_x, canvas_y),
                (displayed_w, displayed_h)
            );
            return Err(EditError::OutOfBounds {
                x: canvas_x,
                y: canvas_y,
            });
        }

        let (x, y) = self.scale.to_image_space(canvas_x, canvas_y);
        let x = x.clamp(0, width as i32 - 1) as u32;
        let y = y.clamp(0, height as i32 - 1) as u32;
        let index = self.store.push(x, y);
        log::info!("Placing nail #{} on image at {:?}", index, (x, y));
        Ok(index)
    }

    pub fn erase_nail(&mut self, canvas_x: i32, canvas_y: i32) -> Result<Placement, EditError> {
        self.erase_nail_within(canvas_x, canvas_y, SAFE_ZONE)
    }

    /// Removes the nail closest to the click if it lies within `safe_zone`.
    pub fn erase_nail_within(
        &mut self,
        canvas_x: i32,
        canvas_y: i32,
        safe_zone: f32,
    ) -> Result<Placement, EditError> {
        let index = self
            .nail_within(canvas_x, canvas_y, safe_zone)
            .map_err(|e| {
                log::debug!("Failed to erase nail at {:?}: {}", (canvas_x, canvas_y), e);
                e
            })?;
        self.erase_nail_at(index).ok_or(EditError::NoNails)
    }

    pub fn erase_nail_at(&mut self, index: usize) -> Option<Placement> {
        let removed = self.store.remove(index)?;
        log::info!("Erased nail #{} at {:?}", index, removed.position());
        if removed.priority {
            if let Some(p) = self.store.priority_index() {
                log::info!("Priority passed to nail #{}", p);
            }
        }
        Some(removed)
    }

    pub fn prioritize_nail(&mut self, canvas_x: i32, canvas_y: i32) -> Result<usize, EditError> {
        self.prioritize_nail_within(canvas_x, canvas_y, SAFE_ZONE)
    }

    /// Makes the nail closest to the click the priority nail.
    pub fn prioritize_nail_within(
        &mut self,
        canvas_x: i32,
        canvas_y: i32,
        safe_zone: f32,
    ) -> Result<usize, EditError> {
        let index = self
            .nail_within(canvas_x, canvas_y, safe_zone)
            .map_err(|e| {
                log::debug!(
                    "Failed to prioritize nail at {:?}: {}",
                    (canvas_x, canvas_y),
                    e
                );
                e
            })?;
        self.prioritize_nail_at(index);
        Ok(index)
    }

    pub fn prioritize_nail_at(&mut self, index: usize) -> bool {
        let changed = self.store.set_priority(index);
        if changed {
            log::info!("Priority nail set to #{}", index);
        }
        changed
    }

    /// Index of the nail nearest to a canvas point and its canvas distance.
    /// On exact ties the lowest index wins.
    pub fn get_closest_nail(&self, canvas_x: i32, canvas_y: i32) -> Option<(usize, f32)> {
        let target = (canvas_x as f32, canvas_y as f32);
        let mut closest: Option<(usize, f32)> = None;
        for (i, placement) in self.store.iter().enumerate() {
            let (x, y) = self.scale.to_canvas_space(placement.x, placement.y);
            let d = distance((x as f32, y as f32), target);
            if closest.map_or(true, |(_, best)| d < best) {
                closest = Some((i, d));
            }
        }
        closest
    }

    fn nail_within(&self, canvas_x: i32, canvas_y: i32, safe_zone: f32) -> Result<usize, EditError> {
        match self.get_closest_nail(canvas_x, canvas_y) {
            None => Err(EditError::NoNails),
            Some((_, distance)) if distance > safe_zone => {
                Err(EditError::OutsideSafeZone { distance })
            }
            Some((index, _)) => Ok(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{EditError, ErrorKind};
    use crate::session::tests::blank_background;
    use crate::session::Session;

    fn session_with_image(width: u32, height: u32, canvas_width: f32) -> Session {
        let mut session = Session::new();
        session.set_background(blank_background(width, height));
        session.fit_to_canvas(canvas_width);
        session
    }

    fn priority_count(session: &Session) -> usize {
        session.store().iter().filter(|p| p.priority).count()
    }

    #[test]
    fn test_place_requires_image() {
        let mut session = Session::new();
        assert_eq!(session.place_nail(10, 10), Err(EditError::NoImage));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_place_descales_to_image_space() {
        let mut session = session_with_image(1000, 600, 500.0);
        assert_eq!(session.place_nail(50, 20), Ok(0));
        assert_eq!(session.place_nail(100, 100), Ok(1));
        assert_eq!(
            session.store().triples(),
            vec![(100, 40, true), (200, 200, false)]
        );
    }

    #[test]
    fn test_place_rejects_clicks_off_the_image() {
        let mut session = session_with_image(100, 80, 400.0);
        assert!(session.place_nail(1, 10).is_err());
        assert!(session.place_nail(10, 79).is_err());
        assert!(session.place_nail(120, 10).is_err());
        assert!(session.place_nail(-5, 10).is_err());
        assert!(session.store().is_empty());

        assert!(session.place_nail(2, 2).is_ok());
        assert!(session.place_nail(98, 78).is_ok());
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_closest_nail_on_empty_store() {
        let session = session_with_image(100, 100, 100.0);
        for (x, y) in [(0, 0), (50, 50), (-10, 300)] {
            assert_eq!(session.get_closest_nail(x, y), None);
        }
    }

    #[test]
    fn test_closest_nail_prefers_lowest_index_on_ties() {
        let mut session = session_with_image(100, 100, 100.0);
        session.place_nail(10, 20).unwrap();
        session.place_nail(30, 20).unwrap();
        assert_eq!(session.get_closest_nail(20, 20), Some((0, 10.0)));
        assert_eq!(session.get_closest_nail(29, 20), Some((1, 1.0)));
    }

    #[test]
    fn test_closest_nail_measures_in_canvas_space() {
        let mut session = session_with_image(400, 400, 100.0);
        session.place_nail(10, 10).unwrap();
        assert_eq!(session.store().triples(), vec![(40, 40, true)]);
        assert_eq!(session.get_closest_nail(13, 14), Some((0, 5.0)));
    }

    #[test]
    fn test_erase_priority_reassigns_first() {
        let mut session = session_with_image(100, 100, 100.0);
        session.place_nail(10, 10).unwrap();
        session.place_nail(10, 20).unwrap();
        session.place_nail(20, 10).unwrap();

        let removed = session.erase_nail(10, 10).unwrap();
        assert!(removed.priority);
        assert_eq!(
            session.store().triples(),
            vec![(10, 20, true), (20, 10, false)]
        );
    }

    #[test]
    fn test_erase_outside_safe_zone_is_ignored() {
        let mut session = session_with_image(100, 100, 100.0);
        session.place_nail(10, 10).unwrap();
        let err = session.erase_nail(10, 17).unwrap_err();
        assert!(matches!(err, EditError::OutsideSafeZone { .. }));
        assert_eq!(err.kind(), ErrorKind::NoTarget);
        assert_eq!(session.store().len(), 1);

        assert!(session.erase_nail(10, 16).is_ok());
        assert_eq!(session.erase_nail(10, 16), Err(EditError::NoNails));
    }

    #[test]
    fn test_prioritize_moves_flag() {
        let mut session = session_with_image(100, 100, 100.0);
        session.place_nail(10, 10).unwrap();
        session.place_nail(50, 50).unwrap();
        session.place_nail(90, 90).unwrap();

        assert_eq!(session.prioritize_nail(52, 48), Ok(1));
        assert_eq!(session.store().priority_index(), Some(1));
        assert_eq!(priority_count(&session), 1);

        assert!(session.prioritize_nail(70, 70).is_err());
        assert_eq!(session.store().priority_index(), Some(1));
    }

    #[test]
    fn test_prioritize_on_empty_store() {
        let mut session = session_with_image(100, 100, 100.0);
        assert_eq!(session.prioritize_nail(5, 5), Err(EditError::NoNails));
    }

    #[test]
    fn test_single_priority_across_click_sequence() {
        let mut session = session_with_image(200, 200, 200.0);
        let clicks = [
            ('n', 10, 10),
            ('n', 40, 40),
            ('n', 80, 30),
            ('p', 80, 30),
            ('e', 80, 30),
            ('n', 120, 150),
            ('p', 121, 149),
            ('e', 10, 10),
            ('e', 120, 150),
            ('n', 5, 5),
            ('e', 40, 40),
            ('e', 5, 5),
            ('n', 60, 60),
        ];
        for (tool, x, y) in clicks {
            let _ = match tool {
                'n' => session.place_nail(x, y).map(|_| ()),
                'e' => session.erase_nail(x, y).map(|_| ()),
                _ => session.prioritize_nail(x, y).map(|_| ()),
            };
            let expected = usize::from(!session.store().is_empty());
            assert_eq!(priority_count(&session), expected);
        }
    }

    #[test]
    fn test_index_based_operations() {
        let mut session = session_with_image(100, 100, 100.0);
        session.place_nail(10, 10).unwrap();
        session.place_nail(20, 20).unwrap();
        assert!(session.prioritize_nail_at(1));
        assert!(!session.prioritize_nail_at(5));
        assert!(session.erase_nail_at(1).unwrap().priority);
        assert_eq!(session.store().priority_index(), Some(0));
        assert!(session.erase_nail_at(3).is_none());
    }
}
