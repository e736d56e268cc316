use eframe::egui::{Color32, ScrollArea, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};
use rusty_mocap::plot::{
    BoundingCube, PlanarTrajectoryView, Projection, RenderedFigure, TrajectoryView,
};

use super::to_color32;
use crate::state::{AppState, Tab};

const PATH_COLOR: Color32 = Color32::from_rgb(255, 165, 0);
const MIN_PANEL_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

pub fn central_view(ui: &mut Ui, state: &AppState) {
    let Some(run) = &state.run else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No experiment loaded  (File → Reload)");
        });
        return;
    };

    match state.tab {
        Tab::Figure(i) => match run.figures.get(i) {
            Some(figure) => figure_view(ui, state, i, figure),
            None => {
                ui.label("No such figure.");
            }
        },
        Tab::Trajectory3d => match &run.trajectory {
            Some(view) => trajectory_3d(ui, view),
            None => missing(ui, "3D trajectory unavailable: position columns missing"),
        },
        Tab::TrajectoryXz => match &run.planar {
            Some(view) => trajectory_planar(ui, view),
            None => missing(ui, "X-Z trajectory unavailable: position columns missing"),
        },
    }
}

fn missing(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(text);
    });
}

// ---------------------------------------------------------------------------
// Time-series figure: one plot per panel, stacked
// ---------------------------------------------------------------------------

fn figure_view(ui: &mut Ui, state: &AppState, figure_idx: usize, figure: &RenderedFigure) {
    ui.heading(figure.window_title.as_str());

    let n = figure.panels.len().max(1) as f32;
    let height = (ui.available_height() / n - 8.0).max(MIN_PANEL_HEIGHT);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (panel_idx, panel) in figure.panels.iter().enumerate() {
                ui.label(panel.title.as_str());
                Plot::new(("panel", figure_idx, panel_idx))
                    .legend(Legend::default())
                    .x_axis_label(panel.x_label.as_str())
                    .y_axis_label(panel.y_label.as_str())
                    .height(height)
                    .allow_boxed_zoom(true)
                    .allow_drag(true)
                    .allow_scroll(false)
                    .allow_zoom(true)
                    .show(ui, |plot_ui| {
                        for (series_idx, series) in panel.series.iter().enumerate() {
                            if !state.is_visible((figure_idx, panel_idx, series_idx)) {
                                continue;
                            }
                            let points: PlotPoints = series.points.iter().copied().collect();
                            plot_ui.line(
                                Line::new(points)
                                    .name(&series.label)
                                    .color(to_color32(series.color))
                                    .width(1.5),
                            );
                        }
                    });
                ui.add_space(8.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Trajectories
// ---------------------------------------------------------------------------

fn start_end_markers(start: [f64; 2], end: [f64; 2]) -> [Points<'static>; 2] {
    [
        Points::new(vec![start])
            .name("Start")
            .shape(MarkerShape::Circle)
            .radius(6.0)
            .filled(true)
            .color(Color32::GREEN),
        Points::new(vec![end])
            .name("End")
            .shape(MarkerShape::Square)
            .radius(6.0)
            .filled(true)
            .color(Color32::RED),
    ]
}

/// Orthographic view of the 3D path inside its equal-aspect cube.
fn trajectory_3d(ui: &mut Ui, view: &TrajectoryView) {
    ui.heading(view.title.as_str());
    let projection = Projection::default();
    let corners = view.bounds.corners();

    Plot::new("trajectory_3d")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            for (a, b) in BoundingCube::edges() {
                let edge: PlotPoints = [corners[a], corners[b]]
                    .iter()
                    .map(|&p| projection.project(p))
                    .collect();
                plot_ui.line(Line::new(edge).color(Color32::GRAY).width(0.5));
            }

            // Axis names at the far end of the edges leaving corner 0.
            for (axis, name) in ["X", "Y", "Z"].iter().enumerate() {
                let [u, v] = projection.project(corners[1 << axis]);
                plot_ui.text(Text::new(PlotPoint::new(u, v), *name).color(Color32::GRAY));
            }

            let path: PlotPoints = view.path.iter().map(|&p| projection.project(p)).collect();
            plot_ui.line(Line::new(path).name("Trajectory").color(PATH_COLOR).width(1.5));

            let [start, end] = start_end_markers(
                projection.project(view.start),
                projection.project(view.end),
            );
            plot_ui.points(start);
            plot_ui.points(end);
        });
}

fn trajectory_planar(ui: &mut Ui, view: &PlanarTrajectoryView) {
    ui.heading(view.title.as_str());

    Plot::new("trajectory_xz")
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label(view.u_label.as_str())
        .y_axis_label(view.v_label.as_str())
        .show(ui, |plot_ui| {
            let path: PlotPoints = view.path.iter().copied().collect();
            plot_ui.line(Line::new(path).name("Trajectory").color(PATH_COLOR).width(1.5));

            let [start, end] = start_end_markers(view.start, view.end);
            plot_ui.points(start);
            plot_ui.points(end);
        });
}
