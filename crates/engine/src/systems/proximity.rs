use std::collections::HashSet;

use tracing::debug;

use crate::config::ProximityConfig;
use crate::geometry::{TilePosition, WorldPosition};
use crate::map::{GameMap, TileType, TriggerType};
use crate::rendering::{draw_text, text_width, with_alpha, RenderTarget};

const MARKER_COLOR: [u8; 4] = [255, 226, 120, 255];
const PROMPT_BG: [u8; 4] = [12, 14, 22, 200];
const PROMPT_BORDER: [u8; 4] = [214, 196, 138, 255];
const PROMPT_TEXT: [u8; 4] = [248, 244, 228, 255];
const PROMPT_TEXT_SCALE: i32 = 2;
const PULSE_PERIOD_MS: f64 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Door,
    Npc,
    Trigger,
}

/// Circle around an interactive map feature.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveZone {
    pub id: String,
    pub kind: ZoneKind,
    pub position: WorldPosition,
    pub radius: f32,
    pub label: String,
    pub tile: TilePosition,
    pub trigger_type: Option<TriggerType>,
}

/// Keeps the zones for the current map and the one the player can act on right now.
#[derive(Debug, Clone)]
pub struct ProximitySystem {
    zones: Vec<InteractiveZone>,
    nearest: Option<usize>,
    door_radius_tiles: f32,
    npc_radius_tiles: f32,
    tile_size: f32,
    pulse_clock_ms: f64,
}

impl ProximitySystem {
    pub fn new(config: &ProximityConfig, tile_size: f32) -> Self {
        Self {
            zones: Vec::new(),
            nearest: None,
            door_radius_tiles: config.door_radius_tiles,
            npc_radius_tiles: config.npc_radius_tiles,
            tile_size,
            pulse_clock_ms: 0.0,
        }
    }

    /// Rebuilds zones in map order: door tiles, then shop/tower/transition triggers, then NPCs.
    pub fn set_map(&mut self, map: Option<&GameMap>) {
        let Some(map) = map else {
            self.clear();
            debug!("proximity_zones_cleared");
            return;
        };
        self.zones = self.build_zones(map);
        self.nearest = None;
        debug!(zones = self.zones.len(), "proximity_zones_rebuilt");
    }

    pub fn set_zones(&mut self, zones: Vec<InteractiveZone>) {
        self.zones = zones;
        self.nearest = None;
    }

    pub fn clear(&mut self) {
        self.zones.clear();
        self.nearest = None;
    }

    pub fn zones(&self) -> &[InteractiveZone] {
        &self.zones
    }

    /// Nearest zone strictly inside its radius. Equal distances keep the earlier zone.
    pub fn check_proximity(&mut self, player: WorldPosition) -> Option<&InteractiveZone> {
        let mut best: Option<(usize, f32)> = None;
        for (index, zone) in self.zones.iter().enumerate() {
            let distance = player.distance_to(zone.position);
            if distance >= zone.radius {
                continue;
            }
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        self.nearest = best.map(|(index, _)| index);
        self.nearest_zone()
    }

    pub fn reset_nearest(&mut self) {
        self.nearest = None;
    }

    pub fn can_interact(&self) -> bool {
        self.nearest.is_some()
    }

    pub fn nearest_zone(&self) -> Option<&InteractiveZone> {
        self.nearest.and_then(|index| self.zones.get(index))
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.pulse_clock_ms = (self.pulse_clock_ms + dt_ms.max(0.0) as f64) % PULSE_PERIOD_MS;
    }

    pub fn render(&self, target: &mut RenderTarget<'_>) {
        let angle = self.pulse_clock_ms / PULSE_PERIOD_MS * std::f64::consts::TAU;
        let pulse = angle.sin() as f32 * 0.5 + 0.5;
        let marker_radius = target.view.scale_len(self.tile_size * 0.18).max(2);
        for zone in self.zones.iter().filter(|zone| zone.kind == ZoneKind::Door) {
            let (x, y) = target.view.to_screen(zone.position);
            let alpha = 0.35 + 0.45 * pulse;
            let marker = with_alpha(MARKER_COLOR, alpha);
            let ring = with_alpha(MARKER_COLOR, alpha * 0.6);
            target.canvas.fill_circle(x, y, marker_radius, marker);
            target.canvas.stroke_circle(x, y, marker_radius + 2, ring);
        }

        let Some(zone) = self.nearest_zone() else {
            return;
        };
        let (x, y) = target.view.to_screen(zone.position);
        let bob = (pulse * 3.0).round() as i32;
        let text_w = text_width(&zone.label, PROMPT_TEXT_SCALE);
        let padding = 4;
        let box_w = text_w.saturating_add(padding * 2);
        let box_h = 5 * PROMPT_TEXT_SCALE + padding * 2;
        let lift = target.view.scale_len(self.tile_size * 0.9);
        // Screen positions saturate to i32 bounds far off-canvas.
        let left = x.saturating_sub(box_w / 2);
        let top = y
            .saturating_sub(lift)
            .saturating_sub(box_h)
            .saturating_sub(bob);
        let canvas = &mut target.canvas;
        canvas.fill_rect(left, top, box_w, box_h, PROMPT_BG);
        canvas.stroke_rect(left, top, box_w, box_h, PROMPT_BORDER);
        draw_text(
            canvas,
            left.saturating_add(padding),
            top.saturating_add(padding),
            &zone.label,
            PROMPT_TEXT,
            PROMPT_TEXT_SCALE,
        );
    }

    fn build_zones(&self, map: &GameMap) -> Vec<InteractiveZone> {
        let door_radius = self.door_radius_tiles * self.tile_size;
        let npc_radius = self.npc_radius_tiles * self.tile_size;
        let mut zones = Vec::new();
        let mut seen_ids = HashSet::new();

        for (y, row) in map.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.kind != TileType::Door {
                    continue;
                }
                let Some(trigger_id) = tile.trigger_id.as_deref() else {
                    continue;
                };
                if !seen_ids.insert(trigger_id.to_string()) {
                    continue;
                }
                let tile_position = TilePosition::new(x as i32, y as i32);
                zones.push(InteractiveZone {
                    id: trigger_id.to_string(),
                    kind: ZoneKind::Door,
                    position: tile_position.to_world_center(self.tile_size),
                    radius: door_radius,
                    label: "Enter".to_string(),
                    tile: tile_position,
                    trigger_type: map.trigger(trigger_id).map(|trigger| trigger.kind),
                });
            }
        }

        for trigger in &map.triggers {
            let (kind, label) = match trigger.kind {
                TriggerType::Transition => (ZoneKind::Door, "Enter"),
                TriggerType::Shop => (ZoneKind::Trigger, "Shop"),
                TriggerType::Tower => (ZoneKind::Trigger, "Tower"),
                TriggerType::Battle | TriggerType::Npc | TriggerType::Story => continue,
            };
            if !seen_ids.insert(trigger.id.clone()) {
                continue;
            }
            zones.push(InteractiveZone {
                id: trigger.id.clone(),
                kind,
                position: trigger.position.to_world_center(self.tile_size),
                radius: door_radius,
                label: label.to_string(),
                tile: trigger.position,
                trigger_type: Some(trigger.kind),
            });
        }

        for npc in &map.npcs {
            zones.push(InteractiveZone {
                id: npc.id.clone(),
                kind: ZoneKind::Npc,
                position: npc.position.to_world_center(self.tile_size),
                radius: npc_radius,
                label: format!("Talk to {}", npc.name),
                tile: npc.position,
                trigger_type: None,
            });
        }
        zones
    }
}
