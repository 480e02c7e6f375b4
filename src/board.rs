//! The placement engine: the board owns every page, widget and piece of
//! interaction state, and keeps the page grids consistent with widget
//! positions.
//!
//! [`Board`] reacts to [`Command`]s (drag gestures, navigation, menu
//! actions) and exposes the placement operations directly:
//! [`place`](Board::place), [`move_widget`](Board::move_widget),
//! [`swap`](Board::swap), [`remove`](Board::remove) and the drop policy
//! [`drop_widget`](Board::drop_widget).  Every operation either applies
//! completely or leaves the board exactly as it was.

use crate::actions::{ActionError, ActionRegistry, HandlerId};
use crate::command::{Command, Direction};
use crate::config::PipelineConfig;
use crate::drag::{cell_from_pointer, DragController, DropTarget};
use crate::grid::{Area, Grid, OccupyMode, GRID_COLS, GRID_ROWS};
use crate::page::PageRegistry;
use crate::persist::{LayoutRecord, LayoutStore, StoreError};
use crate::provider::{self, WidgetProvider};
use crate::slot::find_slot;
use crate::traits::{BoardEvent, NoticeLevel, Surface};
use crate::widget::{Position, Span, Widget, WidgetDescriptor, WidgetError, WidgetId, WidgetKind};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::mpsc;

/// Action run when an `app` widget is clicked.
pub const ACTION_LAUNCH: &str = "launch";
/// Action run when a `web` widget is clicked.
pub const ACTION_BROWSE: &str = "browse";
/// Context-menu action that removes the widget after confirmation.
pub const ACTION_DELETE: &str = "delete";

/// Empty pages a saved layout may reach past one page per widget.
const SPARE_RESTORED_PAGES: usize = 8;

/// Possible errors from board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("unknown widget {0}")]
    UnknownWidget(WidgetId),
    #[error("widget {0} already exists")]
    DuplicateWidget(WidgetId),
    #[error("unknown page {0}")]
    UnknownPage(usize),
    #[error("widget {id} does not fit on the grid at {at}")]
    OutOfBounds { id: WidgetId, at: Position },
    #[error("cannot place widget {id} at {at}: destination is occupied")]
    Occupied { id: WidgetId, at: Position },
    #[error("cannot swap {a} with {b}: widgets must be the same size")]
    SizeMismatch { a: WidgetId, b: WidgetId },
    #[error("no free slot for a {cols}x{rows} widget")]
    NoSlot { cols: usize, rows: usize },
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// What a successful drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved,
    Swapped(WidgetId),
}

/// Session state plus the placement engine.
///
/// The board is generic over the [`Surface`] that draws it and the
/// [`LayoutStore`] that persists it, so it can run against a real UI, the
/// [`HeadlessSurface`](crate::headless::HeadlessSurface), or test doubles.
///
/// # Typical usage
///
/// ```ignore
/// let mut board = Board::new(HeadlessSurface::default(), JsonFileStore::new(path));
/// board.register_provider(StaticProvider::new(config.widgets));
/// board.load_widgets();
/// board.handle(Command::Go(Direction::Right))?;
/// ```
pub struct Board<S: Surface, L: LayoutStore> {
    surface: S,
    store: L,
    pages: PageRegistry,
    widgets: Vec<Widget>,
    providers: Vec<Box<dyn WidgetProvider>>,
    actions: ActionRegistry,
    drag: DragController,
    current_page: usize,
    /// Page the provider pipeline is currently filling.
    fill_page: usize,
    menu_widget: Option<WidgetId>,
    events: Option<mpsc::Sender<BoardEvent>>,
    pipeline: PipelineConfig,
    autosave: bool,
}

impl<S: Surface, L: LayoutStore> Board<S, L> {
    /// Create a board with a single empty page.
    pub fn new(mut surface: S, store: L) -> Self {
        let mut pages = PageRegistry::new();
        pages.create_page(&mut surface);
        Self {
            surface,
            store,
            pages,
            widgets: Vec::new(),
            providers: Vec::new(),
            actions: ActionRegistry::new(),
            drag: DragController::new(),
            current_page: 0,
            fill_page: 0,
            menu_widget: None,
            events: None,
            pipeline: PipelineConfig::default(),
            autosave: true,
        }
    }

    /// Set the provider pipeline settings (timeout per provider).
    pub fn set_pipeline_config(&mut self, config: PipelineConfig) {
        self.pipeline = config;
    }

    /// Enable or disable saving the layout after every mutation.
    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    /// Attach an event channel.  The board sends a [`BoardEvent`] for every
    /// page creation, placement, move, swap, removal, restore and page
    /// change.
    pub fn set_events(&mut self, tx: mpsc::Sender<BoardEvent>) {
        self.events = Some(tx);
    }

    //  Accessors

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    /// Index of the page currently in view.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// The widget the context menu is open for.
    pub fn menu_widget(&self) -> Option<&WidgetId> {
        self.menu_widget.as_ref()
    }

    /// Snapshot of every widget's position, in collection order.
    pub fn layout(&self) -> Vec<LayoutRecord> {
        self.widgets
            .iter()
            .map(|w| LayoutRecord::new(w.id().clone(), w.position()))
            .collect()
    }

    //  Actions

    /// Register a handler for a named action (see [`ActionRegistry`]).
    pub fn register_action(
        &mut self,
        key: &str,
        handler: impl FnMut(&Widget) + 'static,
    ) -> Result<HandlerId, BoardError> {
        Ok(self.actions.register(key, handler)?)
    }

    /// Remove a previously registered handler.
    pub fn unregister_action(&mut self, key: &str, id: HandlerId) -> bool {
        self.actions.unregister(key, id)
    }

    /// Run every handler registered under `key` for widget `id`.
    pub fn execute_action(&mut self, key: &str, id: &WidgetId) -> Result<usize, BoardError> {
        let idx = self.index_of(id)?;
        Ok(self.actions.execute(key, &self.widgets[idx]))
    }

    //  Command dispatch

    /// Process a single [`Command`].
    ///
    /// Rejected placements have already been reported to the user through
    /// [`Surface::notify`] when this returns an error.
    pub fn handle(&mut self, cmd: Command) -> Result<(), BoardError> {
        match cmd {
            Command::DragStart { widget } => self.drag_start(&widget)?,
            Command::DragOver { page, x, y } => self.drag_over(page, x, y),
            Command::Drop { page, x, y } => self.drop_at(page, x, y)?,
            Command::DragEnd => self.drag_end(),
            Command::Go(dir) => {
                info!("go {}", dir);
                self.go(dir);
            }
            Command::GoTo(index) => {
                info!("go to page {}", index);
                self.go_to(index);
            }
            Command::Activate { widget } => self.activate(&widget)?,
            Command::ShowMenu { widget, x, y } => self.show_context_menu(&widget, x, y)?,
            Command::HideMenu => self.hide_context_menu(),
            Command::MenuAction(key) => self.menu_action(&key)?,
            Command::Reveal(term) => {
                if self.reveal(&term).is_none() {
                    debug!("no widget matches {:?}", term);
                }
            }
        }
        Ok(())
    }

    //  Provider pipeline

    /// Queue a provider for the next [`load_widgets`](Self::load_widgets).
    pub fn register_provider(&mut self, provider: impl WidgetProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Run every registered provider, in registration order, placing their
    /// widgets first-fit, then apply the saved layout.
    ///
    /// Providers are invoked one at a time; each must complete (or fail, or
    /// time out) before the next starts.  A failing provider contributes no
    /// widgets and does not stop the pipeline.  Providers registered while
    /// the pipeline runs wait for the next call.
    pub fn load_widgets(&mut self) {
        let mut providers = std::mem::take(&mut self.providers);
        let timeout = self.pipeline.provider_timeout();
        info!("running {} widget provider(s)", providers.len());
        for (index, provider) in providers.iter_mut().enumerate() {
            match provider::invoke(provider.as_mut(), timeout) {
                Ok(descriptors) => {
                    for desc in descriptors {
                        if let Err(e) = self.ingest(desc) {
                            warn!("provider {}: skipping widget: {}", index, e);
                            self.surface
                                .notify(NoticeLevel::Error, &format!("Skipped a widget: {}", e));
                        }
                    }
                }
                Err(e) => {
                    warn!("provider {}: {}", index, e);
                    self.surface.notify(
                        NoticeLevel::Error,
                        "Could not load widget data from a provider.",
                    );
                }
            }
        }
        self.restore_layout();
    }

    /// Validate one descriptor and place it on the page being filled,
    /// opening a new page when it does not fit.
    fn ingest(&mut self, desc: WidgetDescriptor) -> Result<(), BoardError> {
        self.check_unused_id(&desc)?;
        let widget = Widget::from_descriptor(&mut self.surface, desc)?;
        let span = widget.span();
        let page = self.fill_page;
        let slot = match self.pages.page(page).and_then(|p| find_slot(p.grid(), span.cols, span.rows)) {
            Some(slot) => slot,
            None => {
                self.fill_page = self.create_page();
                let grid = self.grid(self.fill_page)?;
                find_slot(grid, span.cols, span.rows).ok_or(BoardError::NoSlot {
                    cols: span.cols,
                    rows: span.rows,
                })?
            }
        };
        self.place(widget, self.fill_page, slot.row, slot.col)
    }

    /// Build a widget from `desc` and put it in the first free slot of any
    /// page, appending a page if none has room.  The layout is saved.
    pub fn add_widget(&mut self, desc: WidgetDescriptor) -> Result<WidgetId, BoardError> {
        self.check_unused_id(&desc)?;
        let widget = Widget::from_descriptor(&mut self.surface, desc)?;
        let at = self.first_fit(widget.span())?;
        let id = widget.id().clone();
        self.place(
            widget,
            at.page_id,
            at.grid_row_start - 1,
            at.grid_column_start - 1,
        )?;
        self.persist();
        Ok(id)
    }

    //  Placement operations

    /// Put a new widget at the 0-indexed anchor `(row, col)` of `page`.
    ///
    /// The caller guarantees the destination is free (normally via
    /// [`find_slot`]); only the page and the grid bounds are checked.  The
    /// layout is not saved.
    pub fn place(
        &mut self,
        mut widget: Widget,
        page: usize,
        row: usize,
        col: usize,
    ) -> Result<(), BoardError> {
        if self.widget(widget.id()).is_some() {
            return Err(BoardError::DuplicateWidget(widget.id().clone()));
        }
        if self.pages.page(page).is_none() {
            return Err(BoardError::UnknownPage(page));
        }
        let at = Position::from_anchor(page, row, col);
        let area = widget.area_at(at);
        if !area.in_bounds() {
            return Err(BoardError::OutOfBounds {
                id: widget.id().clone(),
                at,
            });
        }
        widget.position = at;
        let id = widget.id().clone();
        self.grid_mut(page)?.occupy(&id, area, OccupyMode::Add);
        self.widgets.push(widget);
        self.attach_index(self.widgets.len() - 1, page)?;
        debug!("placed {} at {}", id, at);
        self.emit(BoardEvent::Placed { id, at });
        Ok(())
    }

    /// Insert widget `id`'s visual into `page`'s container at the widget's
    /// area and run its post-attach hook.
    pub fn attach(&mut self, id: &WidgetId, page: usize) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        self.attach_index(idx, page)
    }

    fn attach_index(&mut self, idx: usize, page: usize) -> Result<(), BoardError> {
        let container = self
            .pages
            .page(page)
            .ok_or(BoardError::UnknownPage(page))?
            .container();
        let widget = &mut self.widgets[idx];
        let visual = widget.visual();
        self.surface.attach(visual, container, widget.area());
        if let Some(hook) = widget.on_attach.as_mut() {
            hook.call(visual);
        }
        Ok(())
    }

    /// Move widget `id` to the 0-indexed anchor `(row, col)` of `page`.
    ///
    /// The destination must lie on the grid and be free; cells the widget
    /// itself covers count as free when it stays on the same page.  On
    /// failure nothing changes.
    pub fn move_widget(
        &mut self,
        id: &WidgetId,
        page: usize,
        row: usize,
        col: usize,
    ) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        let grid = self.pages.page(page).ok_or(BoardError::UnknownPage(page))?.grid();
        let widget = &self.widgets[idx];
        let from = widget.position();
        let to = Position::from_anchor(page, row, col);
        let area = widget.area_at(to);
        if !area.in_bounds() {
            return Err(BoardError::OutOfBounds { id: id.clone(), at: to });
        }
        let ignore = (from.page_id == page).then(|| widget.id());
        if !grid.is_free(area, ignore) {
            return Err(BoardError::Occupied { id: id.clone(), at: to });
        }

        let old_area = widget.area();
        if let Some(old) = self.pages.page_mut(from.page_id) {
            old.grid.occupy(id, old_area, OccupyMode::Remove);
        }
        self.widgets[idx].position = to;
        self.grid_mut(page)?.occupy(id, area, OccupyMode::Add);
        self.attach_index(idx, page)?;
        info!("moved {} from {} to {}", id, from, to);
        self.persist();
        self.emit(BoardEvent::Moved {
            id: id.clone(),
            from,
            to,
        });
        Ok(())
    }

    /// Exchange the positions of two widgets of identical span.
    ///
    /// Both widgets are cleared from their grids before either is
    /// re-occupied, so the swap works across pages and for overlapping
    /// footprints.  Swapping a widget with itself does nothing.
    pub fn swap(&mut self, a: &WidgetId, b: &WidgetId) -> Result<(), BoardError> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return Ok(());
        }
        if self.widgets[ia].span() != self.widgets[ib].span() {
            return Err(BoardError::SizeMismatch {
                a: a.clone(),
                b: b.clone(),
            });
        }
        let (pa, pb) = (self.widgets[ia].position(), self.widgets[ib].position());
        for page in [pa.page_id, pb.page_id] {
            if self.pages.page(page).is_none() {
                return Err(BoardError::UnknownPage(page));
            }
        }
        let (area_a, area_b) = (self.widgets[ia].area(), self.widgets[ib].area());

        self.grid_mut(pa.page_id)?.occupy(a, area_a, OccupyMode::Remove);
        self.grid_mut(pb.page_id)?.occupy(b, area_b, OccupyMode::Remove);
        self.widgets[ia].position = pb;
        self.widgets[ib].position = pa;
        self.grid_mut(pb.page_id)?.occupy(a, area_b, OccupyMode::Add);
        self.grid_mut(pa.page_id)?.occupy(b, area_a, OccupyMode::Add);
        self.attach_index(ib, pa.page_id)?;
        self.attach_index(ia, pb.page_id)?;

        info!("swapped {} ({}) with {} ({})", a, pa, b, pb);
        self.persist();
        self.emit(BoardEvent::Swapped {
            a: a.clone(),
            b: b.clone(),
        });
        Ok(())
    }

    /// Detach widget `id`, clear its cells and forget it.  Returns the
    /// removed widget.
    pub fn remove(&mut self, id: &WidgetId) -> Result<Widget, BoardError> {
        let idx = self.index_of(id)?;
        let widget = self.widgets.remove(idx);
        self.surface.detach(widget.visual());
        if let Some(page) = self.pages.page_mut(widget.position().page_id) {
            page.grid.occupy(id, widget.area(), OccupyMode::Remove);
        }
        if self.drag.forget(id) {
            self.surface.hide_placeholder();
        }
        if self.menu_widget.as_ref() == Some(id) {
            self.menu_widget = None;
            self.surface.hide_menu();
        }
        info!("removed {}", id);
        self.persist();
        self.emit(BoardEvent::Removed(id.clone()));
        Ok(widget)
    }

    /// Drop widget `id` with its anchor at `(row, col)` on `page`.
    ///
    /// * Free destination → [`move_widget`](Self::move_widget).
    /// * Destination covered by exactly one other widget of the same span →
    ///   [`swap`](Self::swap).
    /// * Anything else is rejected with an error notice.
    pub fn drop_widget(
        &mut self,
        id: &WidgetId,
        page: usize,
        row: usize,
        col: usize,
    ) -> Result<DropOutcome, BoardError> {
        let idx = self.index_of(id)?;
        let grid = self.pages.page(page).ok_or(BoardError::UnknownPage(page))?.grid();
        let widget = &self.widgets[idx];
        let at = Position::from_anchor(page, row, col);
        let area = widget.area_at(at);
        let ignore = (widget.position().page_id == page).then(|| widget.id());

        if grid.is_free(area, ignore) {
            let name = widget.name().to_string();
            self.move_widget(id, page, row, col)?;
            self.surface
                .notify(NoticeLevel::Success, &format!("{} moved.", name));
            return Ok(DropOutcome::Moved);
        }

        let others: Vec<&WidgetId> = grid.occupants(area).into_iter().filter(|o| *o != id).collect();
        let rejection = match others.as_slice() {
            _ if !area.in_bounds() => BoardError::OutOfBounds { id: id.clone(), at },
            [other] => {
                let other = (*other).clone();
                match self.widget(&other) {
                    Some(target) if target.span() == widget.span() => {
                        let names = format!("Swapped {} with {}.", widget.name(), target.name());
                        self.swap(id, &other)?;
                        self.surface.notify(NoticeLevel::Success, &names);
                        return Ok(DropOutcome::Swapped(other));
                    }
                    _ => BoardError::SizeMismatch { a: id.clone(), b: other },
                }
            }
            _ => BoardError::Occupied { id: id.clone(), at },
        };
        debug!("drop rejected: {}", rejection);
        self.surface.notify(
            NoticeLevel::Error,
            "Cannot place widget here. Widgets must be the same size to swap.",
        );
        Err(rejection)
    }

    //  Pointer drag

    /// Begin dragging widget `id`.  Ignored while another drag is active.
    pub fn drag_start(&mut self, id: &WidgetId) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        if !self.drag.begin(id.clone()) {
            debug!("drag already in progress, ignoring drag start on {}", id);
            return Ok(());
        }
        self.hide_context_menu();
        let widget = &self.widgets[idx];
        if let Some(page) = self.pages.page(widget.position().page_id) {
            self.surface.show_placeholder(page.container(), widget.area());
        }
        debug!("drag start {}", id);
        Ok(())
    }

    /// Resolve a pointer position over `page` into a drop target for the
    /// active subject.
    fn pointer_target(&self, page: usize, x: f64, y: f64) -> Option<(DropTarget, Span)> {
        let subject = self.widget(self.drag.subject()?)?;
        let container = self.pages.page(page)?.container();
        let rect = self.surface.page_rect(container)?;
        let span = subject.span();
        let (row, col) = cell_from_pointer(rect, x, y, span)?;
        Some((DropTarget { page, row, col }, span))
    }

    /// Preview the drop position under the pointer.  Never touches the
    /// grids.
    pub fn drag_over(&mut self, page: usize, x: f64, y: f64) {
        if !self.drag.is_dragging() {
            return;
        }
        let Some((target, span)) = self.pointer_target(page, x, y) else {
            debug!("drag over page {}: no target", page);
            return;
        };
        self.drag.hover(target);
        if let Some(p) = self.pages.page(page) {
            let area = Area::new(target.row, target.col, span.cols, span.rows);
            self.surface.show_placeholder(p.container(), area);
        }
    }

    /// Release the dragged widget over `page` and apply the drop policy
    /// exactly once.  When the pointer does not resolve to a cell the last
    /// hovered target is used; with neither this is a cancel.
    pub fn drop_at(&mut self, page: usize, x: f64, y: f64) -> Result<(), BoardError> {
        if !self.drag.is_dragging() {
            return Ok(());
        }
        let pointed = self.pointer_target(page, x, y).map(|(t, _)| t);
        self.surface.hide_placeholder();
        let Some((subject, hovered)) = self.drag.finish() else {
            return Ok(());
        };
        match pointed.or(hovered) {
            Some(t) => {
                debug!("drop {} at page {} ({}, {})", subject, t.page, t.row, t.col);
                self.drop_widget(&subject, t.page, t.row, t.col).map(|_| ())
            }
            None => {
                debug!("drop of {} had no target", subject);
                Ok(())
            }
        }
    }

    /// End the drag gesture.  After a drop this is a no-op; otherwise the
    /// drag is cancelled without changing the layout.
    pub fn drag_end(&mut self) {
        if let Some((subject, _)) = self.drag.finish() {
            debug!("drag of {} cancelled", subject);
            self.surface.hide_placeholder();
        }
    }

    //  Widget interaction

    /// Handle a plain click on a widget.
    ///
    /// While the context menu is open the click only closes it, and clicks
    /// during a drag are ignored.
    pub fn activate(&mut self, id: &WidgetId) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        if self.drag.is_dragging() {
            return Ok(());
        }
        if self.menu_widget.is_some() {
            self.hide_context_menu();
            return Ok(());
        }
        let key = match self.widgets[idx].kind() {
            WidgetKind::App { .. } => ACTION_LAUNCH,
            WidgetKind::Web { .. } => ACTION_BROWSE,
            WidgetKind::Custom { .. } => return Ok(()),
        };
        let ran = self.actions.execute(key, &self.widgets[idx]);
        debug!("activate {}: {} {} handler(s)", id, key, ran);
        Ok(())
    }

    /// Open the context menu for widget `id` at `(x, y)`.
    pub fn show_context_menu(&mut self, id: &WidgetId, x: f64, y: f64) -> Result<(), BoardError> {
        self.index_of(id)?;
        self.menu_widget = Some(id.clone());
        self.surface.show_menu(x, y);
        Ok(())
    }

    /// Close the context menu, if open.
    pub fn hide_context_menu(&mut self) {
        if self.menu_widget.take().is_some() {
            self.surface.hide_menu();
        }
    }

    /// Run a context-menu action for the menu's widget and close the menu.
    ///
    /// Registered handlers run first; [`ACTION_DELETE`] then asks for
    /// confirmation and removes the widget.
    pub fn menu_action(&mut self, key: &str) -> Result<(), BoardError> {
        let Some(id) = self.menu_widget.clone() else {
            debug!("menu action {:?} without a menu subject", key);
            return Ok(());
        };
        self.hide_context_menu();
        self.execute_action(key, &id)?;
        if key.trim() == ACTION_DELETE {
            let name = self.widget(&id).map(|w| w.name().to_string()).unwrap_or_default();
            if self
                .surface
                .confirm(&format!("Are you sure you want to delete \"{}\"?", name))
            {
                self.remove(&id)?;
                self.surface
                    .notify(NoticeLevel::Success, &format!("\"{}\" was deleted.", name));
            }
        }
        Ok(())
    }

    /// Widgets whose name contains `term`, case-insensitively.  A blank
    /// term matches nothing.
    pub fn search(&self, term: &str) -> Vec<&Widget> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        self.widgets
            .iter()
            .filter(|w| w.name().to_lowercase().contains(&term))
            .collect()
    }

    /// Navigate to the page of the first widget matching `term`.  Returns
    /// the page index.
    pub fn reveal(&mut self, term: &str) -> Option<usize> {
        let page = self.search(term).first()?.position().page_id;
        Some(self.go_to(page))
    }

    //  Navigation

    /// Scroll to page `index`, clamped to the existing pages.  Returns the
    /// page actually shown.
    pub fn go_to(&mut self, index: usize) -> usize {
        let index = index.min(self.pages.len().saturating_sub(1));
        if let Some(page) = self.pages.page(index) {
            self.surface.scroll_to(page.container());
        }
        self.current_page = index;
        self.emit(BoardEvent::PageChanged(index));
        index
    }

    /// Scroll one page left or right.
    pub fn go(&mut self, dir: Direction) -> usize {
        let target = match dir {
            Direction::Left => self.current_page.saturating_sub(1),
            Direction::Right => self.current_page + 1,
        };
        self.go_to(target)
    }

    pub fn go_left(&mut self) -> usize {
        self.go(Direction::Left)
    }

    pub fn go_right(&mut self) -> usize {
        self.go(Direction::Right)
    }

    //  Persistence

    /// Write the current layout to the store.
    pub fn save_layout(&mut self) -> Result<(), StoreError> {
        let records = self.layout();
        self.store.save(&records)
    }

    fn persist(&mut self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save_layout() {
            warn!("failed to save layout: {}", e);
        }
    }

    /// Apply the saved layout, if any, and return how many widgets were
    /// repositioned from it.
    ///
    /// Pages up to the highest saved page id are created and every grid is
    /// rebuilt.  Records for unknown widgets, out-of-bounds records and
    /// records colliding with an already restored widget are skipped.
    /// Widgets without a usable record keep their current position, or are
    /// re-placed first-fit if a restored widget now covers it.  An
    /// unreadable layout is ignored.
    pub fn restore_layout(&mut self) -> usize {
        let records = match self.store.load() {
            Ok(Some(records)) => records,
            Ok(None) => {
                debug!("no saved layout");
                return 0;
            }
            Err(e) => {
                warn!("ignoring saved layout: {}", e);
                return 0;
            }
        };

        let page_limit = self.pages.len().max(self.widgets.len()) + SPARE_RESTORED_PAGES;
        let records: Vec<LayoutRecord> = records
            .into_iter()
            .filter(|r| {
                let usable = (1..=GRID_ROWS).contains(&r.grid_row_start)
                    && (1..=GRID_COLS).contains(&r.grid_column_start)
                    && r.page_id < page_limit;
                if !usable {
                    warn!("invalid layout record for {}: {}", r.widget_id, r.position());
                }
                usable
            })
            .collect();

        let pages_needed = records.iter().map(|r| r.page_id + 1).max().unwrap_or(0);
        for page in self.pages.ensure_pages(&mut self.surface, pages_needed) {
            self.emit(BoardEvent::PageCreated(page));
        }
        self.pages.clear_grids();

        let mut settled: HashSet<usize> = HashSet::new();
        for record in &records {
            let Ok(idx) = self.index_of(&record.widget_id) else {
                debug!("saved layout mentions unknown widget {}", record.widget_id);
                continue;
            };
            if settled.contains(&idx) {
                warn!("duplicate layout record for {}", record.widget_id);
                continue;
            }
            let at = record.position();
            let area = self.widgets[idx].area_at(at);
            let free = self
                .pages
                .page(at.page_id)
                .is_some_and(|p| p.grid().is_free(area, None));
            if !free {
                warn!("layout record for {} does not fit at {}", record.widget_id, at);
                continue;
            }
            self.widgets[idx].position = at;
            if let Ok(grid) = self.grid_mut(at.page_id) {
                grid.occupy(&record.widget_id, area, OccupyMode::Add);
            }
            settled.insert(idx);
        }
        let restored = settled.len();

        let mut moved: Vec<usize> = settled.iter().copied().collect();
        for idx in 0..self.widgets.len() {
            if settled.contains(&idx) {
                continue;
            }
            let widget = &self.widgets[idx];
            let (id, at, area, span) = (
                widget.id().clone(),
                widget.position(),
                widget.area(),
                widget.span(),
            );
            let fits = self
                .pages
                .page(at.page_id)
                .is_some_and(|p| p.grid().is_free(area, None));
            if fits {
                if let Ok(grid) = self.grid_mut(at.page_id) {
                    grid.occupy(&id, area, OccupyMode::Add);
                }
                continue;
            }
            match self.first_fit(span) {
                Ok(new_at) => {
                    warn!("{} displaced by saved layout, moved to {}", id, new_at);
                    self.widgets[idx].position = new_at;
                    let area = self.widgets[idx].area();
                    if let Ok(grid) = self.grid_mut(new_at.page_id) {
                        grid.occupy(&id, area, OccupyMode::Add);
                    }
                    moved.push(idx);
                }
                Err(e) => warn!("cannot re-place {}: {}", id, e),
            }
        }

        moved.sort_unstable();
        for idx in moved {
            let page = self.widgets[idx].position().page_id;
            if let Err(e) = self.attach_index(idx, page) {
                warn!("cannot attach {}: {}", self.widgets[idx].id(), e);
            }
        }

        info!("restored {} widget position(s) from saved layout", restored);
        self.emit(BoardEvent::LayoutRestored { restored });
        if restored > 0 {
            self.surface
                .notify(NoticeLevel::Success, "Layout loaded successfully!");
        }
        restored
    }

    //  Internal

    /// Reject a descriptor whose explicit id is already on the board.
    fn check_unused_id(&self, desc: &WidgetDescriptor) -> Result<(), BoardError> {
        match desc.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() && self.widget(&WidgetId::from(id)).is_some() => {
                Err(BoardError::DuplicateWidget(WidgetId::from(id)))
            }
            _ => Ok(()),
        }
    }

    fn index_of(&self, id: &WidgetId) -> Result<usize, BoardError> {
        self.widgets
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| BoardError::UnknownWidget(id.clone()))
    }

    fn grid(&self, page: usize) -> Result<&Grid, BoardError> {
        self.pages
            .page(page)
            .map(|p| p.grid())
            .ok_or(BoardError::UnknownPage(page))
    }

    fn grid_mut(&mut self, page: usize) -> Result<&mut Grid, BoardError> {
        self.pages
            .page_mut(page)
            .map(|p| &mut p.grid)
            .ok_or(BoardError::UnknownPage(page))
    }

    fn create_page(&mut self) -> usize {
        let id = self.pages.create_page(&mut self.surface);
        self.emit(BoardEvent::PageCreated(id));
        id
    }

    /// First free anchor on any page, appending a page when all are full.
    fn first_fit(&mut self, span: Span) -> Result<Position, BoardError> {
        let found = self.pages.iter().find_map(|p| {
            find_slot(p.grid(), span.cols, span.rows).map(|a| Position::from_anchor(p.id(), a.row, a.col))
        });
        if let Some(at) = found {
            return Ok(at);
        }
        let page = self.create_page();
        find_slot(self.grid(page)?, span.cols, span.rows)
            .map(|a| Position::from_anchor(page, a.row, a.col))
            .ok_or(BoardError::NoSlot {
                cols: span.cols,
                rows: span.rows,
            })
    }

    fn emit(&self, event: BoardEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
