//! Interactive dashboard for exploring used-car listings.
//!
//! The data pipeline (`data`, `chart`, `pipeline`) is independent of the UI:
//! a [`pipeline::ViewRequest`] built from widget state goes in, a
//! [`pipeline::RenderOutput`] with metrics, a chart specification and a
//! preview comes out. `app`, `state` and `ui` bind it to egui.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod ui;
