//! egui presentation layer: filter panel, charts, and a record preview.

pub mod charts;
pub mod panels;
pub mod table;
