use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

/// Viewer for the latest experiment; F5 re-runs resolution and analysis.
pub struct MocapViewerApp {
    pub state: AppState,
    /// Title last sent to the viewport.
    shown_title: String,
}

impl MocapViewerApp {
    /// Runs the first analysis before the window opens.
    pub fn new(mut state: AppState) -> Self {
        state.reload();
        Self {
            state,
            shown_title: String::new(),
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.state.window_title();
        if title != self.shown_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.shown_title = title;
        }
    }
}

impl eframe::App for MocapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) {
            self.state.reload();
        }
        self.sync_title(ctx);

        // Reload, intake toggle, figure and trajectory tabs
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // Loaded experiment and per-series checkboxes of the open figure
        egui::SidePanel::left("series_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Stacked panels of the open figure, or a trajectory view
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_view(ui, &self.state);
        });
    }
}
