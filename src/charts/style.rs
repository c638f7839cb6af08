//! Chart Style Module
//! Explicit renderer configuration: fonts, colors and stroke geometry that
//! would otherwise live in mutable global plotting state.

use plotters::style::RGBColor;

/// Fixed categorical palette (tab10).
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
];

/// Color for series `index` out of `total`, spread evenly across the palette.
pub fn palette_color(index: usize, total: usize) -> RGBColor {
    if total <= 1 {
        return PALETTE[0];
    }
    let last = (PALETTE.len() - 1) as f64;
    let position = index.min(total - 1) as f64 * last / (total - 1) as f64;
    PALETTE[(position.round() as usize) % PALETTE.len()]
}

/// Convert a point size to pixels at the given resolution.
pub fn pt_to_px(pt: f64, dpi: u32) -> f64 {
    pt * dpi as f64 / 72.0
}

/// Rendering configuration held by the renderer for its lifetime.
///
/// Font sizes and the line width are in points and scaled by the per-call
/// dpi, so the same style reads identically at any resolution.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub font_family: String,
    pub background: RGBColor,
    pub grid_color: RGBColor,
    pub grid_alpha: f64,
    pub line_width_pt: f64,
    pub line_alpha: f64,
    pub title_pt: f64,
    pub axis_label_pt: f64,
    pub tick_label_pt: f64,
    pub legend_pt: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            background: RGBColor(255, 255, 255),
            grid_color: RGBColor(0, 0, 0),
            grid_alpha: 0.4,
            line_width_pt: 1.2,
            line_alpha: 0.9,
            title_pt: 14.0,
            axis_label_pt: 12.0,
            tick_label_pt: 10.0,
            legend_pt: 10.0,
        }
    }
}
