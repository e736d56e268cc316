pub mod panels;
pub mod plot;

use eframe::egui::Color32;
use rusty_mocap::color::Rgb;

pub fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.red, color.green, color.blue)
}
