//! **dashgrd**: a paged, grid-based widget dashboard.
//!
//! Widgets (application launchers, web links, custom content) live on pages
//! of a fixed 5×5 grid.  Each widget covers a rectangle of cells; no two
//! widgets on a page share a cell.  Widgets are loaded from a chain of
//! providers, placed first-fit, and can then be rearranged by dragging:
//! dropping on free cells moves a widget, dropping on a widget of the same
//! size swaps the two.  The layout is saved after every change and restored
//! on the next start.
//!
//! # Architecture
//!
//! The crate is organised around a few seams:
//!
//! * [`traits::Surface`]: the drawing side (page containers, widget
//!   visuals, drop placeholder, notices, menus) so the placement engine is
//!   not coupled to any UI toolkit.  [`headless::HeadlessSurface`] draws
//!   nothing and is used by the daemon and the tests.
//! * [`persist::LayoutStore`]: where the layout is saved.
//! * [`provider::WidgetProvider`]: where the initial widgets come from.
//! * [`traits::CommandSource`]: the transport that delivers user intent
//!   (see [`ipc`]), so the main loop is not coupled to any IPC mechanism.
//!
//! [`board::Board`] ties them together.

pub mod actions;
pub mod board;
pub mod command;
pub mod config;
pub mod drag;
pub mod grid;
pub mod headless;
pub mod ipc;
pub mod page;
pub mod persist;
pub mod provider;
pub mod slot;
pub mod traits;
pub mod widget;
