//! Widget entities and the descriptors providers hand in.
//!
//! A [`WidgetDescriptor`] is the loosely typed shape a provider produces
//! (and what the JSON config's `"widgets"` list deserializes into).
//! [`Widget::from_descriptor`] validates it into a [`Widget`], whose
//! [`WidgetKind`] carries exactly the fields each kind needs.

use crate::grid::{Area, GRID_COLS, GRID_ROWS};
use crate::traits::{Handle, Surface};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable widget identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Generate a fresh, unique id of the form `widget-<uuid>`.
    pub fn generate() -> Self {
        Self(format!("widget-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a widget does when activated, with the fields that kind requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Launches `target` (an application or URL) directly.
    App { target: String },
    /// Opens `target` in an embedded browser view.
    Web { target: String },
    /// Renders caller-supplied markup; activation does nothing.
    Custom { content: String },
}

impl WidgetKind {
    /// The wire name of the kind (`"app"`, `"web"`, `"custom"`).
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::App { .. } => "app",
            WidgetKind::Web { .. } => "web",
            WidgetKind::Custom { .. } => "custom",
        }
    }

    /// Launch target for `app` and `web` widgets.
    pub fn target(&self) -> Option<&str> {
        match self {
            WidgetKind::App { target } | WidgetKind::Web { target } => Some(target),
            WidgetKind::Custom { .. } => None,
        }
    }
}

/// Display metadata.  Opaque to the placement engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetMeta {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Footprint in cells.  Fixed for a widget's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub cols: usize,
    pub rows: usize,
}

impl Span {
    pub const UNIT: Span = Span { cols: 1, rows: 1 };
}

/// Where a widget sits: page id plus a **1-based** anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub page_id: usize,
    pub grid_row_start: usize,
    pub grid_column_start: usize,
}

impl Position {
    /// Build a position from a page id and a 0-indexed grid anchor.
    pub fn from_anchor(page_id: usize, row: usize, col: usize) -> Self {
        Self {
            page_id,
            grid_row_start: row + 1,
            grid_column_start: col + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} ({}, {})",
            self.page_id, self.grid_row_start, self.grid_column_start
        )
    }
}

/// Customization hook run every time a widget's visual is attached to a
/// page container.
pub struct AttachHook(Box<dyn FnMut(Handle) + Send>);

impl AttachHook {
    pub fn new(f: impl FnMut(Handle) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn call(&mut self, visual: Handle) {
        (self.0)(visual)
    }
}

impl fmt::Debug for AttachHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AttachHook(..)")
    }
}

/// Loosely typed widget description, as produced by a provider.
///
/// # Example
///
/// ```json
/// { "id": "mail", "type": "app", "name": "Mail", "target": "https://mail.example" }
/// { "type": "custom", "colSpan": 3, "contentHTML": "<input type=search>" }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub col_span: Option<usize>,
    #[serde(default)]
    pub row_span: Option<usize>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "contentHTML")]
    pub content_html: Option<String>,
    /// In-process only; never (de)serialized.
    #[serde(skip)]
    pub on_attach: Option<AttachHook>,
}

impl WidgetDescriptor {
    /// Shorthand for an `app` descriptor.
    pub fn app(id: &str, name: &str, target: &str) -> Self {
        Self {
            id: Some(id.into()),
            kind: "app".into(),
            name: Some(name.into()),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Shorthand for a `custom` descriptor.
    pub fn custom(id: &str, content: &str) -> Self {
        Self {
            id: Some(id.into()),
            kind: "custom".into(),
            content_html: Some(content.into()),
            ..Self::default()
        }
    }

    /// Set the span.
    pub fn with_span(mut self, col_span: usize, row_span: usize) -> Self {
        self.col_span = Some(col_span);
        self.row_span = Some(row_span);
        self
    }

    /// Attach a post-attach hook.
    pub fn with_hook(mut self, hook: impl FnMut(Handle) + Send + 'static) -> Self {
        self.on_attach = Some(AttachHook::new(hook));
        self
    }

    /// Requested span, defaulting absent dimensions to 1.
    pub fn span(&self) -> Span {
        Span {
            cols: self.col_span.unwrap_or(1),
            rows: self.row_span.unwrap_or(1),
        }
    }

    /// Check the descriptor and turn it into a [`WidgetKind`] + metadata.
    fn validate(&self) -> Result<(WidgetKind, WidgetMeta, Span), WidgetError> {
        let label = || self.id.clone().unwrap_or_else(|| "<unnamed>".into());
        let span = self.span();
        if span.cols == 0 || span.rows == 0 || span.cols > GRID_COLS || span.rows > GRID_ROWS {
            return Err(WidgetError::InvalidSpan {
                id: label(),
                cols: span.cols,
                rows: span.rows,
            });
        }
        let required = |field: &'static str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| WidgetError::MissingField {
                    id: label(),
                    kind: self.kind.clone(),
                    field,
                })
        };
        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "app" => WidgetKind::App {
                target: required("target", &self.target)?,
            },
            "web" => WidgetKind::Web {
                target: required("target", &self.target)?,
            },
            "custom" => WidgetKind::Custom {
                content: required("contentHTML", &self.content_html)?,
            },
            _ => {
                return Err(WidgetError::UnknownKind {
                    id: label(),
                    kind: self.kind.clone(),
                })
            }
        };
        let meta = WidgetMeta {
            name: self.name.clone().unwrap_or_else(|| "Widget".into()),
            description: self.description.clone().unwrap_or_default(),
            image: self.image.clone().unwrap_or_default(),
        };
        Ok((kind, meta, span))
    }
}

/// Reasons a descriptor is rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("widget {id}: unknown type {kind:?} (expected app, web or custom)")]
    UnknownKind { id: String, kind: String },
    #[error("widget {id}: type {kind:?} requires a non-empty {field}")]
    MissingField {
        id: String,
        kind: String,
        field: &'static str,
    },
    #[error("widget {id}: span {cols}x{rows} does not fit a 5x5 grid")]
    InvalidSpan { id: String, cols: usize, rows: usize },
}

/// A positioned, sized, typed tile.
///
/// The position fields are only mutated by the
/// [`Board`](crate::board::Board), which keeps them in step with the page
/// grids.
#[derive(Debug)]
pub struct Widget {
    id: WidgetId,
    kind: WidgetKind,
    meta: WidgetMeta,
    span: Span,
    pub(crate) position: Position,
    visual: Handle,
    pub(crate) on_attach: Option<AttachHook>,
}

impl Widget {
    /// Build a widget directly.  Its visual is created on `surface` right
    /// away and reused for the widget's whole life.
    ///
    /// The widget starts at page 0, `(1, 1)`; it only occupies grid cells
    /// once the board places it.
    pub fn new<S: Surface>(
        surface: &mut S,
        id: WidgetId,
        kind: WidgetKind,
        meta: WidgetMeta,
        span: Span,
    ) -> Self {
        let visual = surface.create_visual(&id, &kind, &meta);
        Self {
            id,
            kind,
            meta,
            span,
            position: Position::from_anchor(0, 0, 0),
            visual,
            on_attach: None,
        }
    }

    /// Validate a descriptor and build the widget it describes.
    ///
    /// An absent or blank id is replaced by a generated one.
    pub fn from_descriptor<S: Surface>(
        surface: &mut S,
        mut desc: WidgetDescriptor,
    ) -> Result<Self, WidgetError> {
        let (kind, meta, span) = desc.validate()?;
        let id = match desc.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => WidgetId::from(id),
            _ => WidgetId::generate(),
        };
        let mut widget = Self::new(surface, id, kind, meta, span);
        widget.on_attach = desc.on_attach.take();
        Ok(widget)
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn meta(&self) -> &WidgetMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn visual(&self) -> Handle {
        self.visual
    }

    /// The 0-indexed grid area the widget covers on its page.
    pub fn area(&self) -> Area {
        self.area_at(self.position)
    }

    /// The area the widget would cover if anchored at `pos`.
    pub fn area_at(&self, pos: Position) -> Area {
        Area::new(
            pos.grid_row_start.saturating_sub(1),
            pos.grid_column_start.saturating_sub(1),
            self.span.cols,
            self.span.rows,
        )
    }
}
