//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout: title bar, tab bar, menu, page, status bar
//! - `input`: keyboard handling and mapping of raw events to user activity
//! - `pages`: table rendering for the list pages
//! - `styles`: color scheme and text styling

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
