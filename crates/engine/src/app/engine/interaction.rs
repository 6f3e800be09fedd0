use tracing::{debug, info};

use crate::geometry::WorldPosition;
use crate::layers::SceneType;
use crate::map::Building;

use super::{Engine, EngineEvent};

impl Engine {
    /// Runs once per interact press: an enterable building wins over proximity zones.
    pub(super) fn dispatch_interaction(&mut self) {
        if self.scene != SceneType::Overworld {
            return;
        }
        let Some(player) = self.player.world else {
            return;
        };

        if let Some(building) = self.nearby_building(player) {
            let Some(trigger_id) = building.trigger_id.clone() else {
                return;
            };
            info!(building_id = %building.id, trigger_id = %trigger_id, "building_entered");
            self.events.push(EngineEvent::BuildingEntered {
                building_id: building.id.clone(),
                trigger_id,
            });
            if let Some(interior_id) = building.interior_id.as_deref() {
                if self.rooms.contains_key(interior_id) {
                    self.enter_interior(interior_id);
                }
            }
            return;
        }

        if let Some(zone) = self.proximity.nearest_zone().cloned() {
            debug!(zone_id = %zone.id, kind = ?zone.kind, "interaction_dispatched");
            self.events.push(EngineEvent::Interaction { zone });
        }
    }

    /// Closest building with a trigger id whose door is within reach.
    fn nearby_building(&self, player: WorldPosition) -> Option<Building> {
        let map = self.map.as_deref()?;
        let tile_size = self.config.tile_size;
        let reach = self.config.proximity.building_radius_tiles * tile_size;
        map.buildings
            .iter()
            .filter(|building| building.trigger_id.is_some())
            .map(|building| (building, player.distance_to(building.door_world(tile_size))))
            .filter(|(_, distance)| *distance < reach)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(building, _)| building.clone())
    }
}
