/// One nail marked on the background image, in full-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub priority: bool,
    /// Set while the path orderer runs; never persisted.
    pub scanned: bool,
}

impl Placement {
    pub fn new(x: u32, y: u32, priority: bool) -> Self {
        Self {
            x,
            y,
            priority,
            scanned: false,
        }
    }

    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn distance_to(&self, other: &Placement) -> f32 {
        distance(
            (self.x as f32, self.y as f32),
            (other.x as f32, other.y as f32),
        )
    }
}

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Ordered nails in click/import order.
///
/// Keeps at most one priority flag set and caches its index. A non-empty
/// store always has exactly one priority nail.
#[derive(Debug, Default, Clone)]
pub struct PlacementStore {
    placements: Vec<Placement>,
    priority: Option<usize>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded records, normalizing the priority flags.
    ///
    /// The first flagged record keeps priority and any others are cleared;
    /// with no flags at all the first record is promoted.
    pub fn from_placements(mut placements: Vec<Placement>) -> Self {
        let priority = placements.iter().position(|p| p.priority);
        for (i, placement) in placements.iter_mut().enumerate() {
            placement.priority = Some(i) == priority;
            placement.scanned = false;
        }

        let priority = match priority {
            Some(index) => Some(index),
            None if !placements.is_empty() => {
                placements[0].priority = true;
                Some(0)
            }
            None => None,
        };

        Self {
            placements,
            priority,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Placement> {
        self.placements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }

    pub fn priority_index(&self) -> Option<usize> {
        self.priority
    }

    /// Appends a nail; the first nail of an empty store becomes priority.
    pub fn push(&mut self, x: u32, y: u32) -> usize {
        let index = self.placements.len();
        let priority = self.placements.is_empty();
        self.placements.push(Placement::new(x, y, priority));
        if priority {
            self.priority = Some(index);
        }
        index
    }

    /// Removes a nail. If it held priority, the new first nail takes it over.
    pub fn remove(&mut self, index: usize) -> Option<Placement> {
        if index >= self.placements.len() {
            return None;
        }
        let removed = self.placements.remove(index);

        let previous = self.priority;
        self.priority = match previous {
            _ if self.placements.is_empty() => None,
            Some(p) if p == index => {
                self.placements[0].priority = true;
                Some(0)
            }
            Some(p) if p > index => Some(p - 1),
            other => other,
        };

        Some(removed)
    }

    /// Moves the priority flag to `index`, clearing the previous holder.
    pub fn set_priority(&mut self, index: usize) -> bool {
        if index >= self.placements.len() {
            return false;
        }
        if let Some(previous) = self.priority {
            if let Some(placement) = self.placements.get_mut(previous) {
                placement.priority = false;
            }
        }
        self.placements[index].priority = true;
        self.priority = Some(index);
        true
    }

    pub fn replace(&mut self, placements: Vec<Placement>) {
        *self = Self::from_placements(placements);
    }

    pub fn clear(&mut self) {
        self.placements.clear();
        self.priority = None;
    }

    pub fn reset_scan(&mut self) {
        for placement in &mut self.placements {
            placement.scanned = false;
        }
    }

    pub fn mark_scanned(&mut self, index: usize) {
        if let Some(placement) = self.placements.get_mut(index) {
            placement.scanned = true;
        }
    }

    /// `(x, y, priority)` triples in store order.
    #[cfg(test)]
    pub fn triples(&self) -> Vec<(u32, u32, bool)> {
        self.placements
            .iter()
            .map(|p| (p.x, p.y, p.priority))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priority_count(store: &PlacementStore) -> usize {
        store.iter().filter(|p| p.priority).count()
    }

    #[test]
    fn test_first_push_is_priority() {
        let mut store = PlacementStore::new();
        store.push(1, 1);
        store.push(2, 2);
        assert_eq!(store.priority_index(), Some(0));
        assert!(store.get(0).unwrap().priority);
        assert!(!store.get(1).unwrap().priority);
    }

    #[test]
    fn test_remove_priority_promotes_first() {
        let mut store = PlacementStore::new();
        store.push(10, 10);
        store.push(10, 20);
        store.push(20, 10);
        store.set_priority(1);

        store.remove(1);
        assert_eq!(store.priority_index(), Some(0));
        assert_eq!(store.triples(), vec![(10, 10, true), (20, 10, false)]);
    }

    #[test]
    fn test_remove_before_priority_shifts_index() {
        let mut store = PlacementStore::new();
        store.push(1, 1);
        store.push(2, 2);
        store.push(3, 3);
        store.set_priority(2);

        store.remove(0);
        assert_eq!(store.priority_index(), Some(1));
        assert!(store.get(1).unwrap().priority);
        assert_eq!(priority_count(&store), 1);
    }

    #[test]
    fn test_remove_last_empties_priority() {
        let mut store = PlacementStore::new();
        store.push(1, 1);
        assert!(store.remove(0).is_some());
        assert_eq!(store.priority_index(), None);
        assert!(store.remove(0).is_none());
    }

    #[test]
    fn test_set_priority_clears_previous() {
        let mut store = PlacementStore::new();
        for i in 0..5 {
            store.push(i, i);
        }
        assert!(store.set_priority(3));
        assert!(store.set_priority(4));
        assert!(!store.set_priority(9));
        assert_eq!(store.priority_index(), Some(4));
        assert_eq!(priority_count(&store), 1);
    }

    #[test]
    fn test_from_placements_normalizes_flags() {
        let store = PlacementStore::from_placements(vec![
            Placement::new(0, 0, false),
            Placement::new(1, 1, true),
            Placement::new(2, 2, true),
        ]);
        assert_eq!(store.priority_index(), Some(1));
        assert_eq!(priority_count(&store), 1);

        let store = PlacementStore::from_placements(vec![
            Placement::new(0, 0, false),
            Placement::new(1, 1, false),
        ]);
        assert_eq!(store.priority_index(), Some(0));
        assert!(store.get(0).unwrap().priority);
    }

    #[test]
    fn test_scan_flags() {
        let mut store = PlacementStore::new();
        store.push(1, 1);
        store.push(2, 2);
        store.mark_scanned(1);
        assert!(store.get(1).unwrap().scanned);
        store.reset_scan();
        assert!(store.iter().all(|p| !p.scanned));
    }
}
