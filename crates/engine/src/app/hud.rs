use crate::geometry::{TilePosition, WorldPosition};
use crate::layers::SceneType;
use crate::rendering::{draw_text, line_height, text_width, Canvas, Rgba};

use super::LoopMetricsSnapshot;

const TEXT_SCALE: i32 = 2;
const HUD_PADDING: i32 = 6 * TEXT_SCALE;
const HUD_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const HUD_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const HUD_TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const HUD_TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const HUD_PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const HUD_PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];
const PLAYER_SECTION_LABEL: &str = "Player";
const WORLD_SECTION_LABEL: &str = "World";

#[derive(Debug, Clone)]
pub(crate) struct HudData {
    pub metrics: LoopMetricsSnapshot,
    pub player_world: Option<WorldPosition>,
    pub player_tile: Option<TilePosition>,
    pub camera: (f32, f32),
    pub scene: SceneType,
    pub clock: String,
    pub period: &'static str,
    pub nearest_zone: Option<String>,
}

pub(crate) fn build_hud_lines(data: &HudData) -> Vec<String> {
    vec![
        PLAYER_SECTION_LABEL.to_string(),
        match data.player_world {
            Some(pos) => format!("pos: {:.1},{:.1}", pos.x, pos.y),
            None => "pos: none".to_string(),
        },
        match data.player_tile {
            Some(tile) => format!("tile: {},{}", tile.x, tile.y),
            None => "tile: none".to_string(),
        },
        format!("zone: {}", data.nearest_zone.as_deref().unwrap_or("none")),
        String::new(),
        WORLD_SECTION_LABEL.to_string(),
        format!("cam: {:.1},{:.1}", data.camera.0, data.camera.1),
        format!("scene: {}", data.scene.as_str()),
        format!("time: {} {}", data.clock, data.period),
        format!("fps: {:.1}", data.metrics.fps),
    ]
}

fn hud_line_color(line: &str) -> Rgba {
    if matches!(line, PLAYER_SECTION_LABEL | WORLD_SECTION_LABEL) {
        HUD_TEXT_DIM_COLOR
    } else {
        HUD_TEXT_PRIMARY_COLOR
    }
}

pub(crate) fn draw_hud(canvas: &mut Canvas<'_>, lines: &[String]) {
    if lines.is_empty() || canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let widest = lines
        .iter()
        .map(|line| text_width(line, TEXT_SCALE))
        .max()
        .unwrap_or(0);
    let line_advance = line_height(TEXT_SCALE);
    let panel_left = HUD_PADDING - HUD_PANEL_INSET_X;
    let panel_top = HUD_PADDING - HUD_PANEL_INSET_Y;
    let panel_width = widest + HUD_PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * line_advance + HUD_PANEL_INSET_Y * 2;
    canvas.fill_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        HUD_PANEL_BG_COLOR,
    );
    canvas.stroke_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        HUD_PANEL_BORDER_COLOR,
    );

    let mut y = HUD_PADDING;
    for line in lines {
        let color = hud_line_color(line);
        draw_text(canvas, HUD_PADDING, y, line, color, TEXT_SCALE);
        y += line_advance;
    }
}
