use crate::arena::{ArenaSet, ArenaTick};
use crate::character::Player;
use crate::gameflow::Encounter;
use crate::prelude::*;
use crate::tuning::WorldBounds;

pub struct CameraFollowPlugin;

impl Plugin for CameraFollowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraView>()
            .add_systems(ArenaTick, camera_follow.in_set(ArenaSet::Camera));
    }
}

/// Horizontal scroll the renderer should apply. Never read back by the simulation.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CameraView {
    pub offset_x: i32,
}

/// Centres the viewport on the player, pinned to the world edges.
pub fn camera_offset(player_x: i32, world: &WorldBounds) -> i32 {
    let center = player_x + ActorKind::Player.frame_size().x / 2;
    let max_offset = (world.width() - world.viewport_width).max(0);
    (center - world.viewport_width / 2).clamp(0, max_offset)
}

pub(crate) fn camera_follow(
    tuning: Res<ArenaTuning>,
    encounter: Res<Encounter>,
    players: Query<&Placement, With<Player>>,
    mut camera: ResMut<CameraView>,
) {
    let Ok(placement) = players.get(encounter.player) else {
        return;
    };
    camera.offset_x = camera_offset(placement.pos.x, &tuning.world);
}
