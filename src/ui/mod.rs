//! egui widgets binding `AppState` to the screen.

pub mod panels;
pub mod plot;
pub mod table;
