//! Declarative panels → resolved, drawable descriptions.
//!
//! Nothing here draws pixels: the egui viewer and the JSON export both
//! consume [`RenderedFigure`] and [`TrajectoryView`].

pub mod render;
pub mod spec;
pub mod trajectory;

pub use render::{render, render_panel, RenderedFigure, RenderedPanel, RenderedSeries, SkipReason, SkippedSeries};
pub use spec::{FigureSpec, PanelSpec};
pub use trajectory::{
    planar_view, render_trajectory, BoundingCube, PlanarTrajectoryView, Projection, TrajectoryView,
};
