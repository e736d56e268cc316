use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_mocap::experiment::ExperimentSource;

use super::to_color32;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – run info and series visibility
// ---------------------------------------------------------------------------

/// Render the left panel: what was loaded, and a checkbox per series of the
/// current figure.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Experiment");
    ui.separator();

    let Some(run) = &state.run else {
        ui.label("No experiment loaded.");
        return;
    };

    ui.label(RichText::new(run.display_name()).strong());
    ui.label(RichText::new(run.source.to_string()).small().weak());
    if let ExperimentSource::Stored(exp) = &run.source {
        if let Some(timestamp) = exp.timestamp {
            ui.label(format!("Recorded {timestamp}"));
        }
        if let Some(description) = &exp.description {
            ui.label(RichText::new(description.as_str()).italics());
        }
    }
    ui.label(format!(
        "{} rows after offset, {} columns",
        run.dataset.row_count(),
        run.dataset.column_count()
    ));
    let derived: Vec<&str> = run.derived.names().collect();
    if derived.is_empty() {
        ui.label("No derived signals");
    } else {
        ui.label(format!("Derived: {}", derived.join(", ")));
    }
    ui.add_space(4.0);

    let Tab::Figure(figure_idx) = state.tab else {
        return;
    };
    let Some(figure) = state.current_figure().cloned() else {
        return;
    };

    ui.heading("Series");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (panel_idx, panel) in figure.panels.iter().enumerate() {
                let n_visible = (0..panel.series.len())
                    .filter(|&s| state.is_visible((figure_idx, panel_idx, s)))
                    .count();
                let header_text =
                    format!("{}  ({n_visible}/{})", panel.title, panel.series.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt((figure_idx, panel_idx))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.set_panel_visible(figure_idx, panel_idx, true);
                            }
                            if ui.small_button("None").clicked() {
                                state.set_panel_visible(figure_idx, panel_idx, false);
                            }
                        });

                        for (series_idx, series) in panel.series.iter().enumerate() {
                            let key = (figure_idx, panel_idx, series_idx);
                            let mut checked = state.is_visible(key);
                            let text = RichText::new(&series.label).color(to_color32(series.color));
                            if ui.checkbox(&mut checked, text).changed() {
                                state.set_visible(key, checked);
                            }
                        }

                        for skipped in &panel.skipped {
                            ui.label(
                                RichText::new(format!(
                                    "skipped {}: {}",
                                    skipped.reference, skipped.reason
                                ))
                                .small()
                                .color(Color32::LIGHT_RED),
                            );
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, view tabs and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .checkbox(&mut state.intake, "Take new files from inbox")
                .changed()
            {
                log::info!("Inbox intake {}", if state.intake { "on" } else { "off" });
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        if ui.button("⟳ Reload").on_hover_text("F5").clicked() {
            state.reload();
        }

        ui.separator();

        let figure_titles: Vec<String> = state
            .config
            .figures
            .iter()
            .map(|f| f.window_title.clone())
            .collect();
        for (i, title) in figure_titles.iter().enumerate() {
            ui.selectable_value(&mut state.tab, Tab::Figure(i), title);
        }
        ui.selectable_value(&mut state.tab, Tab::Trajectory3d, "Trajectory 3D");
        ui.selectable_value(&mut state.tab, Tab::TrajectoryXz, "Trajectory X-Z");

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
