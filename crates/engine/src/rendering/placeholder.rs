use crate::geometry::Direction;
use crate::room::FurnitureKind;

use super::canvas::{Canvas, Rgba, ScreenRect};

const OUTLINE: Rgba = [24, 20, 28, 255];
const BUILDING_WALL: Rgba = [196, 170, 128, 255];
const BUILDING_ROOF: Rgba = [148, 62, 52, 255];
const BUILDING_DOOR: Rgba = [92, 58, 36, 255];
const WINDOW_DARK: Rgba = [58, 70, 92, 255];
const TREE_TRUNK: Rgba = [104, 72, 44, 255];
const TREE_CANOPY: Rgba = [46, 112, 58, 255];
const TREE_HIGHLIGHT: Rgba = [78, 148, 76, 255];
const PLAYER_BODY: Rgba = [222, 178, 64, 255];
const SKIN: Rgba = [240, 200, 168, 255];
const NPC_PALETTE: [Rgba; 5] = [
    [88, 120, 196, 255],
    [176, 84, 132, 255],
    [96, 160, 120, 255],
    [200, 120, 72, 255],
    [132, 112, 180, 255],
];

/// Silhouette family drawn when a sprite is not available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Building,
    Tree,
    Decoration,
    Npc,
    Player,
    Furniture(FurnitureKind),
}

/// Stable palette index for an id, so the same NPC keeps its color between runs.
pub fn palette_index(id: &str, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let mut hash = 0x811c_9dc5u32;
    for byte in id.bytes() {
        hash = (hash ^ byte as u32).wrapping_mul(0x0100_0193);
    }
    hash as usize % palette_len
}

/// Window panes of a building placeholder, shared with the night glow pass.
pub fn building_windows(rect: ScreenRect) -> [ScreenRect; 2] {
    let wall_top = rect.y + rect.height * 2 / 5;
    let size = (rect.width / 6).max(2);
    let y = wall_top + (rect.height - (wall_top - rect.y)) / 4;
    [
        ScreenRect::new(rect.x + rect.width / 5, y, size, size),
        ScreenRect::new(rect.x + rect.width * 4 / 5 - size, y, size, size),
    ]
}

pub fn draw_placeholder(
    canvas: &mut Canvas<'_>,
    kind: PlaceholderKind,
    rect: ScreenRect,
    seed: &str,
    facing: Direction,
) {
    if rect.width <= 0 || rect.height <= 0 {
        return;
    }
    match kind {
        PlaceholderKind::Building => draw_building(canvas, rect),
        PlaceholderKind::Tree => draw_tree(canvas, rect),
        PlaceholderKind::Decoration => draw_decoration(canvas, rect, seed),
        PlaceholderKind::Npc => {
            let body = NPC_PALETTE[palette_index(seed, NPC_PALETTE.len())];
            draw_figure(canvas, rect, body, facing);
        }
        PlaceholderKind::Player => draw_figure(canvas, rect, PLAYER_BODY, facing),
        PlaceholderKind::Furniture(furniture) => draw_furniture(canvas, furniture, rect),
    }
}

fn draw_building(canvas: &mut Canvas<'_>, rect: ScreenRect) {
    let roof_bottom = rect.y + rect.height * 2 / 5;
    let wall_height = rect.bottom() - roof_bottom;
    canvas.fill_rect(rect.x, roof_bottom, rect.width, wall_height, BUILDING_WALL);
    canvas.stroke_rect(rect.x, roof_bottom, rect.width, wall_height, OUTLINE);
    canvas.fill_triangle_up(
        rect.center_x(),
        rect.y,
        roof_bottom,
        rect.width / 2 + 2,
        BUILDING_ROOF,
    );
    let door_width = (rect.width / 5).max(3);
    let door_height = (rect.height / 3).max(4);
    canvas.fill_rect(
        rect.center_x() - door_width / 2,
        rect.bottom() - door_height,
        door_width,
        door_height,
        BUILDING_DOOR,
    );
    for window in building_windows(rect) {
        canvas.fill(window, WINDOW_DARK);
        canvas.stroke_rect(window.x, window.y, window.width, window.height, OUTLINE);
    }
}

fn draw_tree(canvas: &mut Canvas<'_>, rect: ScreenRect) {
    let trunk_width = (rect.width / 5).max(2);
    let trunk_top = rect.y + rect.height * 3 / 5;
    canvas.fill_rect(
        rect.center_x() - trunk_width / 2,
        trunk_top,
        trunk_width,
        rect.bottom() - trunk_top,
        TREE_TRUNK,
    );
    let radius = (rect.width / 2).min(rect.height * 2 / 5).max(2);
    let canopy_y = trunk_top - radius / 3;
    canvas.fill_circle(rect.center_x(), canopy_y, radius, TREE_CANOPY);
    canvas.fill_circle(
        rect.center_x() - radius / 3,
        canopy_y - radius / 3,
        radius / 3,
        TREE_HIGHLIGHT,
    );
}

fn draw_decoration(canvas: &mut Canvas<'_>, rect: ScreenRect, seed: &str) {
    const PETALS: [Rgba; 3] = [
        [236, 92, 120, 255],
        [248, 220, 96, 255],
        [168, 132, 236, 255],
    ];
    let petal = PETALS[palette_index(seed, PETALS.len())];
    let radius = (rect.width.min(rect.height) / 4).max(1);
    let center_y = rect.y + rect.height / 2;
    canvas.fill_circle(rect.center_x(), center_y, radius, petal);
    canvas.fill_circle(
        rect.center_x(),
        center_y,
        (radius / 2).max(1),
        [250, 240, 200, 255],
    );
}

fn draw_figure(canvas: &mut Canvas<'_>, rect: ScreenRect, body: Rgba, facing: Direction) {
    let cx = rect.center_x();
    let head_radius = (rect.width / 4).max(2);
    let head_y = rect.y + head_radius + 1;
    let body_top = head_y + head_radius;
    canvas.fill_ellipse(cx, rect.bottom() - 1, rect.width / 3, 2, [0, 0, 0, 80]);
    canvas.fill_rect(
        cx - rect.width / 3,
        body_top,
        rect.width * 2 / 3,
        rect.bottom() - body_top - 1,
        body,
    );
    canvas.fill_circle(cx, head_y, head_radius, SKIN);
    let eye_y = head_y;
    match facing {
        Direction::Down => {
            canvas.blend_pixel(cx - head_radius / 2, eye_y, OUTLINE);
            canvas.blend_pixel(cx + head_radius / 2, eye_y, OUTLINE);
        }
        Direction::Left => canvas.blend_pixel(cx - head_radius / 2, eye_y, OUTLINE),
        Direction::Right => canvas.blend_pixel(cx + head_radius / 2, eye_y, OUTLINE),
        Direction::Up => canvas.fill_rect(
            cx - head_radius,
            head_y - head_radius,
            head_radius * 2,
            head_radius,
            body,
        ),
    }
}

fn draw_furniture(canvas: &mut Canvas<'_>, kind: FurnitureKind, rect: ScreenRect) {
    let (fill, trim): (Rgba, Rgba) = match kind {
        FurnitureKind::Rug => ([150, 52, 60, 255], [214, 176, 88, 255]),
        FurnitureKind::Table => ([140, 96, 60, 255], [96, 62, 38, 255]),
        FurnitureKind::Chair => ([160, 112, 70, 255], [96, 62, 38, 255]),
        FurnitureKind::Bed => ([220, 220, 232, 255], [120, 60, 72, 255]),
        FurnitureKind::Shelf => ([116, 80, 50, 255], [200, 160, 96, 255]),
        FurnitureKind::Counter => ([128, 90, 58, 255], [176, 140, 100, 255]),
        FurnitureKind::Plant => ([60, 128, 64, 255], [150, 92, 56, 255]),
        FurnitureKind::Fireplace => ([110, 104, 100, 255], [236, 136, 48, 255]),
    };
    match kind {
        FurnitureKind::Plant => {
            let pot_height = rect.height / 3;
            canvas.fill_rect(
                rect.x + rect.width / 4,
                rect.bottom() - pot_height,
                rect.width / 2,
                pot_height,
                trim,
            );
            canvas.fill_circle(
                rect.center_x(),
                rect.y + rect.height / 3,
                (rect.width / 2).max(2),
                fill,
            );
        }
        FurnitureKind::Fireplace => {
            canvas.fill(rect, fill);
            canvas.fill_rect(
                rect.x + rect.width / 4,
                rect.y + rect.height / 2,
                rect.width / 2,
                rect.height / 2,
                OUTLINE,
            );
            canvas.fill_ellipse(
                rect.center_x(),
                rect.bottom() - rect.height / 6,
                rect.width / 6,
                rect.height / 8,
                trim,
            );
        }
        FurnitureKind::Bed => {
            canvas.fill(rect, fill);
            canvas.fill_rect(
                rect.x,
                rect.y + rect.height / 3,
                rect.width,
                rect.height * 2 / 3,
                trim,
            );
            canvas.stroke_rect(rect.x, rect.y, rect.width, rect.height, OUTLINE);
        }
        _ => {
            canvas.fill(rect, fill);
            canvas.stroke_rect(
                rect.x + 1,
                rect.y + 1,
                rect.width - 2,
                rect.height - 2,
                trim,
            );
        }
    }
}
