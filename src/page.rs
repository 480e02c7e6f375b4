//! Page registry.
//!
//! Pages are append-only: the id of a page is its creation index, and pages
//! are never removed or renumbered, even when emptied.

use crate::grid::Grid;
use crate::traits::{Handle, Surface};
use log::debug;

/// One canvas: an occupancy [`Grid`] plus the surface container its widgets
/// are attached to.
#[derive(Debug, Clone)]
pub struct Page {
    id: usize,
    container: Handle,
    pub(crate) grid: Grid,
}

impl Page {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn container(&self) -> Handle {
        self.container
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Ordered collection of pages.  `pages[i].id() == i` always holds.
#[derive(Debug, Default, Clone)]
pub struct PageRegistry {
    pages: Vec<Page>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new page with an empty grid and a fresh container.
    ///
    /// Returns the new page id.
    pub fn create_page<S: Surface>(&mut self, surface: &mut S) -> usize {
        let id = self.pages.len();
        let container = surface.create_container(id);
        debug!("created page {}", id);
        self.pages.push(Page {
            id,
            container,
            grid: Grid::new(),
        });
        id
    }

    /// Create pages until at least `count` exist.  Returns the ids of the
    /// pages that were created.
    pub fn ensure_pages<S: Surface>(&mut self, surface: &mut S, count: usize) -> Vec<usize> {
        let mut created = Vec::new();
        while self.pages.len() < count {
            created.push(self.create_page(surface));
        }
        created
    }

    pub fn page(&self, id: usize) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_mut(&mut self, id: usize) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Reset every page's grid to empty.  Containers are kept.
    pub(crate) fn clear_grids(&mut self) {
        for page in &mut self.pages {
            page.grid = Grid::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;

    #[test]
    fn ids_follow_creation_order() {
        let mut s = HeadlessSurface::default();
        let mut reg = PageRegistry::new();
        assert_eq!(reg.create_page(&mut s), 0);
        assert_eq!(reg.create_page(&mut s), 1);
        assert_eq!(reg.create_page(&mut s), 2);
        for (i, page) in reg.iter().enumerate() {
            assert_eq!(page.id(), i);
            assert!(page.grid().is_empty());
        }
    }

    #[test]
    fn every_page_gets_its_own_container() {
        let mut s = HeadlessSurface::default();
        let mut reg = PageRegistry::new();
        reg.create_page(&mut s);
        reg.create_page(&mut s);
        assert_ne!(
            reg.page(0).unwrap().container(),
            reg.page(1).unwrap().container()
        );
    }

    #[test]
    fn ensure_pages_only_creates_missing() {
        let mut s = HeadlessSurface::default();
        let mut reg = PageRegistry::new();
        reg.create_page(&mut s);
        assert_eq!(reg.ensure_pages(&mut s, 3), vec![1, 2]);
        assert!(reg.ensure_pages(&mut s, 2).is_empty());
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn unknown_page_lookup_is_none() {
        let reg = PageRegistry::new();
        assert!(reg.page(0).is_none());
        assert!(reg.is_empty());
    }
}
