//! Smoothing for remote players between server updates.
//!
//! Updates arrive at roughly 20 Hz while rendering runs faster, so
//! each remote plane keeps a displayed pose and a target pose and
//! eases toward the target every frame.

use std::collections::HashMap;

use uuid::Uuid;

use crate::lobby::room::Player;
use crate::sim::state::Vec3;
use crate::ws::protocol::PlayerPatch;

/// A remote player's plane as the local client renders it
#[derive(Debug, Clone)]
pub struct RemotePlane {
    pub position: Vec3,
    /// Rotation in radians (pitch, heading, roll)
    pub rotation: Vec3,
    pub target_position: Vec3,
    pub target_rotation: Vec3,
    pub speed_kmh: f32,
    pub plane: Option<String>,
    pub nickname: String,
    pub color: String,
}

impl RemotePlane {
    fn from_player(player: &Player) -> Self {
        let position = player.position.unwrap_or(Vec3::ZERO);
        let rotation = player.rotation.unwrap_or(Vec3::ZERO);
        Self {
            position,
            rotation,
            target_position: position,
            target_rotation: rotation,
            speed_kmh: player.speed_kmh.unwrap_or(0.0),
            plane: player.plane.clone(),
            nickname: player.nickname.clone(),
            color: player.color.clone(),
        }
    }

    /// Retarget from a partial update; absent fields keep their targets
    pub fn apply_patch(&mut self, patch: &PlayerPatch) {
        if let Some(position) = patch.position {
            self.target_position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.target_rotation = rotation;
        }
        if let Some(speed) = patch.speed {
            self.speed_kmh = speed;
        }
        if let Some(plane) = &patch.plane {
            self.plane = Some(plane.clone());
        }
    }

    /// Ease the displayed pose toward the target. The factor scales
    /// with frame time and saturates at 1, so a long frame snaps to
    /// the target instead of overshooting.
    pub fn interpolate(&mut self, dt_millis: f32) {
        let factor = (0.1 * dt_millis / 16.0).min(1.0);
        self.position = self.position.lerp(&self.target_position, factor);
        self.rotation = self.rotation.lerp(&self.target_rotation, factor);
    }
}

/// Every remote plane in the current room, keyed by player id. The
/// local player is never tracked here; their plane comes straight
/// from the simulation.
#[derive(Debug)]
pub struct RemoteFleet {
    local_id: Uuid,
    planes: HashMap<Uuid, RemotePlane>,
}

impl RemoteFleet {
    pub fn new(local_id: Uuid) -> Self {
        Self {
            local_id,
            planes: HashMap::new(),
        }
    }

    /// Rebuild from a full player roster (room join, game start)
    pub fn sync_roster(&mut self, players: &[Player]) {
        self.planes = players
            .iter()
            .filter(|p| p.id != self.local_id)
            .map(|p| (p.id, RemotePlane::from_player(p)))
            .collect();
    }

    pub fn add_player(&mut self, player: &Player) {
        if player.id != self.local_id {
            self.planes
                .insert(player.id, RemotePlane::from_player(player));
        }
    }

    pub fn remove_player(&mut self, player_id: Uuid) {
        self.planes.remove(&player_id);
    }

    /// Apply a server-relayed update. Updates for the local player or
    /// for unknown ids are dropped.
    pub fn apply_update(&mut self, player_id: Uuid, patch: &PlayerPatch) {
        if player_id == self.local_id {
            return;
        }
        if let Some(plane) = self.planes.get_mut(&player_id) {
            plane.apply_patch(patch);
        }
    }

    /// Advance every plane's smoothing by one frame
    pub fn interpolate(&mut self, dt_millis: f32) {
        for plane in self.planes.values_mut() {
            plane.interpolate(dt_millis);
        }
    }

    pub fn plane(&self, player_id: Uuid) -> Option<&RemotePlane> {
        self.planes.get(&player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &RemotePlane)> {
        self.planes.iter()
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn roster_player(id: Uuid, x: f32) -> Player {
        let mut player = Player::new(id, "Player_test".to_string(), "#FF6B6B".to_string());
        player.position = Some(Vec3::new(x, 2.0, 0.0));
        player
    }

    #[test]
    fn local_player_is_excluded_from_the_fleet() {
        let local = Uuid::new_v4();
        let remote = Uuid::new_v4();

        let mut fleet = RemoteFleet::new(local);
        fleet.sync_roster(&[roster_player(local, 0.0), roster_player(remote, 100.0)]);

        assert_eq!(fleet.len(), 1);
        assert!(fleet.plane(local).is_none());
        assert!(fleet.plane(remote).is_some());
    }

    #[test]
    fn update_moves_the_target_not_the_displayed_pose() {
        let local = Uuid::new_v4();
        let remote = Uuid::new_v4();

        let mut fleet = RemoteFleet::new(local);
        fleet.sync_roster(&[roster_player(remote, 0.0)]);

        fleet.apply_update(
            remote,
            &PlayerPatch {
                position: Some(Vec3::new(10.0, 2.0, 0.0)),
                ..Default::default()
            },
        );

        let plane = fleet.plane(remote).unwrap();
        assert_relative_eq!(plane.position.x, 0.0);
        assert_relative_eq!(plane.target_position.x, 10.0);
    }

    #[test]
    fn interpolation_converges_on_the_target() {
        let local = Uuid::new_v4();
        let remote = Uuid::new_v4();

        let mut fleet = RemoteFleet::new(local);
        fleet.sync_roster(&[roster_player(remote, 0.0)]);
        fleet.apply_update(
            remote,
            &PlayerPatch {
                position: Some(Vec3::new(10.0, 2.0, 0.0)),
                ..Default::default()
            },
        );

        // 16 ms frames: factor 0.1 per frame, geometric approach
        for _ in 0..200 {
            fleet.interpolate(16.0);
        }

        let plane = fleet.plane(remote).unwrap();
        assert_relative_eq!(plane.position.x, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn long_frame_snaps_to_target_without_overshoot() {
        let local = Uuid::new_v4();
        let remote = Uuid::new_v4();

        let mut fleet = RemoteFleet::new(local);
        fleet.sync_roster(&[roster_player(remote, 0.0)]);
        fleet.apply_update(
            remote,
            &PlayerPatch {
                position: Some(Vec3::new(10.0, 2.0, 0.0)),
                ..Default::default()
            },
        );

        // 160 ms would give factor 1.0 exactly; 5000 ms must clamp there
        fleet.interpolate(5_000.0);

        let plane = fleet.plane(remote).unwrap();
        assert_relative_eq!(plane.position.x, 10.0);
    }

    #[test]
    fn updates_for_unknown_players_are_dropped() {
        let mut fleet = RemoteFleet::new(Uuid::new_v4());
        fleet.apply_update(
            Uuid::new_v4(),
            &PlayerPatch {
                speed: Some(300.0),
                ..Default::default()
            },
        );
        assert!(fleet.is_empty());
    }
}
