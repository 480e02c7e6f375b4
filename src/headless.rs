//! A [`Surface`] that draws nothing.
//!
//! [`HeadlessSurface`] keeps just enough bookkeeping (which visual sits in
//! which container, where the placeholder is, which notices were shown) for
//! the daemon to run without a display and for tests to assert on what the
//! board asked the surface to do.  Every call is logged at `debug` level.

use crate::drag::Rect;
use crate::grid::Area;
use crate::traits::{Handle, NoticeLevel, Surface};
use crate::widget::{WidgetId, WidgetKind, WidgetMeta};
use log::{debug, info, warn};
use std::collections::{HashMap, VecDeque};

/// Notices kept for inspection; older ones are dropped.
const NOTICE_HISTORY: usize = 32;

/// Display-less surface.  Every page is reported at the same viewport
/// rectangle.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    next_handle: u64,
    viewport: Rect,
    containers: Vec<Handle>,
    visuals: HashMap<Handle, WidgetId>,
    parents: HashMap<Handle, (Handle, Area)>,
    attach_counts: HashMap<Handle, usize>,
    placeholder: Option<(Handle, Area)>,
    notices: VecDeque<(NoticeLevel, String)>,
    confirm_answer: bool,
    scrolled_to: Option<Handle>,
    menu: Option<(f64, f64)>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(500.0, 500.0)
    }
}

impl HeadlessSurface {
    /// Create a surface whose pages measure `width × height`.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            next_handle: 1,
            viewport: Rect::new(0.0, 0.0, width, height),
            containers: Vec::new(),
            visuals: HashMap::new(),
            parents: HashMap::new(),
            attach_counts: HashMap::new(),
            placeholder: None,
            notices: VecDeque::with_capacity(NOTICE_HISTORY),
            confirm_answer: true,
            scrolled_to: None,
            menu: None,
        }
    }

    /// Answer future [`confirm`](Surface::confirm) prompts with `answer`.
    pub fn set_confirm_answer(&mut self, answer: bool) {
        self.confirm_answer = answer;
    }

    fn alloc(&mut self) -> Handle {
        let h = Handle(self.next_handle);
        self.next_handle += 1;
        h
    }

    //  Inspection

    /// Number of widget visuals created so far.
    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    /// The widget a visual was created for.
    pub fn visual_owner(&self, visual: Handle) -> Option<&WidgetId> {
        self.visuals.get(&visual)
    }

    /// The container for page `page`, if created.
    pub fn container(&self, page: usize) -> Option<Handle> {
        self.containers.get(page).copied()
    }

    /// Page index of the container `visual` is attached to.
    pub fn page_of(&self, visual: Handle) -> Option<usize> {
        let (container, _) = self.parents.get(&visual)?;
        self.containers.iter().position(|c| c == container)
    }

    /// The area `visual` was last attached at.
    pub fn area_of(&self, visual: Handle) -> Option<Area> {
        self.parents.get(&visual).map(|(_, area)| *area)
    }

    /// How many times `visual` has been attached since it was last
    /// detached.
    pub fn attach_count(&self, visual: Handle) -> usize {
        self.attach_counts.get(&visual).copied().unwrap_or(0)
    }

    /// Current placeholder as `(page, area)`.
    pub fn placeholder(&self) -> Option<(usize, Area)> {
        let (container, area) = self.placeholder?;
        let page = self.containers.iter().position(|c| *c == container)?;
        Some((page, area))
    }

    /// The most recent notices, oldest first.
    pub fn notices(&self) -> &VecDeque<(NoticeLevel, String)> {
        &self.notices
    }

    /// The most recent notice.
    pub fn last_notice(&self) -> Option<&(NoticeLevel, String)> {
        self.notices.back()
    }

    /// Page index most recently scrolled to.
    pub fn scrolled_page(&self) -> Option<usize> {
        let target = self.scrolled_to?;
        self.containers.iter().position(|c| *c == target)
    }

    /// Position of the open context menu.
    pub fn menu(&self) -> Option<(f64, f64)> {
        self.menu
    }
}

impl Surface for HeadlessSurface {
    fn create_container(&mut self, page: usize) -> Handle {
        let h = self.alloc();
        if page != self.containers.len() {
            warn!("container for page {} created out of order", page);
        }
        self.containers.push(h);
        h
    }

    fn create_visual(&mut self, id: &WidgetId, kind: &WidgetKind, meta: &WidgetMeta) -> Handle {
        let h = self.alloc();
        debug!("visual {:?}: {} widget {} ({:?})", h, kind.name(), id, meta.name);
        self.visuals.insert(h, id.clone());
        h
    }

    fn attach(&mut self, visual: Handle, container: Handle, area: Area) {
        debug!("attach {:?} to {:?} at {:?}", visual, container, area);
        self.parents.insert(visual, (container, area));
        *self.attach_counts.entry(visual).or_default() += 1;
    }

    fn detach(&mut self, visual: Handle) {
        debug!("detach {:?}", visual);
        self.parents.remove(&visual);
        self.attach_counts.remove(&visual);
    }

    fn page_rect(&self, container: Handle) -> Option<Rect> {
        self.containers
            .contains(&container)
            .then_some(self.viewport)
    }

    fn show_placeholder(&mut self, container: Handle, area: Area) {
        self.placeholder = Some((container, area));
    }

    fn hide_placeholder(&mut self) {
        self.placeholder = None;
    }

    fn scroll_to(&mut self, container: Handle) {
        debug!("scroll to {:?}", container);
        self.scrolled_to = Some(container);
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        info!("[{}] {}", level, message);
        if self.notices.len() == NOTICE_HISTORY {
            self.notices.pop_front();
        }
        self.notices.push_back((level, message.to_string()));
    }

    fn confirm(&mut self, message: &str) -> bool {
        info!("confirm: {} -> {}", message, self.confirm_answer);
        self.confirm_answer
    }

    fn show_menu(&mut self, x: f64, y: f64) {
        self.menu = Some((x, y));
    }

    fn hide_menu(&mut self) {
        self.menu = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_detach_track_parent() {
        let mut s = HeadlessSurface::default();
        let page0 = s.create_container(0);
        let page1 = s.create_container(1);
        let kind = WidgetKind::App { target: "x".into() };
        let v = s.create_visual(&WidgetId::from("a"), &kind, &WidgetMeta::default());

        s.attach(v, page0, Area::new(0, 0, 1, 1));
        assert_eq!(s.page_of(v), Some(0));
        s.attach(v, page1, Area::new(2, 2, 1, 1));
        assert_eq!(s.page_of(v), Some(1));
        assert_eq!(s.area_of(v), Some(Area::new(2, 2, 1, 1)));
        assert_eq!(s.attach_count(v), 2);

        s.detach(v);
        assert_eq!(s.page_of(v), None);
        assert_eq!(s.attach_count(v), 0);
        assert!(s.attach_counts.is_empty());
    }

    #[test]
    fn page_rect_only_for_known_containers() {
        let mut s = HeadlessSurface::new(800.0, 600.0);
        let c = s.create_container(0);
        assert_eq!(s.page_rect(c), Some(Rect::new(0.0, 0.0, 800.0, 600.0)));
        assert_eq!(s.page_rect(Handle(999)), None);
    }

    #[test]
    fn notices_are_recorded() {
        let mut s = HeadlessSurface::default();
        s.notify(NoticeLevel::Error, "nope");
        assert_eq!(s.last_notice(), Some(&(NoticeLevel::Error, "nope".to_string())));
    }

    #[test]
    fn notice_history_keeps_only_the_latest() {
        let mut s = HeadlessSurface::default();
        for i in 0..NOTICE_HISTORY + 10 {
            s.notify(NoticeLevel::Info, &format!("notice {}", i));
        }
        assert_eq!(s.notices().len(), NOTICE_HISTORY);
        assert_eq!(s.notices()[0].1, "notice 10");
        assert_eq!(
            s.last_notice(),
            Some(&(NoticeLevel::Info, format!("notice {}", NOTICE_HISTORY + 9)))
        );
    }
}
