use crate::animations::SpriteSequence;
use crate::arena::{ArenaSet, ArenaTick};
use crate::camera::CameraView;
use crate::gameflow::Encounter;
use crate::prelude::*;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaView>()
            .add_systems(ArenaTick, publish_view.in_set(ArenaSet::Publish));
    }
}

/// What the renderer needs for one live actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub entity: Entity,
    pub sprite: SpriteSequence,
    pub frame: usize,
    pub pos: IVec2,
    pub facing_left: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HudView {
    pub camera_offset_x: i32,
    pub victory: bool,
    pub defeat: bool,
    pub player_hp: u32,
    pub player_max_hp: u32,
}

/// Read-only snapshot republished at the end of every tick.
#[derive(Resource, Debug, Default, Clone)]
pub struct ArenaView {
    pub actors: Vec<ActorView>,
    pub gem: Option<IVec2>,
    pub hud: HudView,
}

impl ArenaView {
    pub fn actor(&self, entity: Entity) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.entity == entity)
    }
}

pub(crate) fn publish_view(
    encounter: Res<Encounter>,
    camera: Res<CameraView>,
    actors: Query<(Entity, &ActorState, &Placement, &Vitals)>,
    mut view: ResMut<ArenaView>,
) {
    view.actors.clear();
    view.actors.extend(
        actors
            .iter()
            .filter(|(_, state, _, _)| !state.vanished())
            .map(|(entity, state, placement, _)| ActorView {
                entity,
                sprite: state.clock().sequence(),
                frame: state.frame(),
                pos: placement.pos,
                facing_left: placement.facing_left,
            }),
    );
    view.actors.sort_by_key(|a| a.entity);

    view.gem = encounter.gem().filter(|g| !g.picked).map(|g| g.pos);

    let (player_hp, player_max_hp) = actors
        .get(encounter.player)
        .map_or((0, 0), |(_, _, _, v)| (v.hp(), v.max_hp));
    view.hud = HudView {
        camera_offset_x: camera.offset_x,
        victory: encounter.victory(),
        defeat: encounter.defeat(),
        player_hp,
        player_max_hp,
    };
}
