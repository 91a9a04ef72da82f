//! UI components.

pub mod dialogs;
pub mod graph;
pub mod panels;
pub mod toast;
