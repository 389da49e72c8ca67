use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use legend_arena::animations::{SpriteCatalog, SpriteSequence};
use legend_arena::arena::run_arena_tick;
use legend_arena::audio::AudioCue;
use legend_arena::character::PlayerInput;
use legend_arena::hud::ArenaView;
use legend_arena::prelude::*;
use legend_arena::{ArenaPlugin, Encounter, EncounterEnded};

const TUNING_PATH: &str = "assets/arena_tuning.json";
const TICK_CAP: u32 = 20_000;
const STRIKE_DISTANCE: i32 = 110;

fn main() -> AppExit {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(4))),
            LogPlugin::default(),
        ))
        .add_plugins(ArenaPlugin::new(TUNING_PATH))
        .insert_resource(SpriteCatalog::with_builtin_frames())
        .add_systems(FixedUpdate, autopilot.before(run_arena_tick))
        .add_systems(FixedUpdate, (report_view, stop_at_tick_cap).after(run_arena_tick))
        .add_systems(Update, (play_cues, exit_on_end))
        .run()
}

/// Which keys the autopilot is currently holding.
#[derive(Default)]
struct Held {
    left: bool,
    right: bool,
}

/// Walks toward the nearest enemy (then the gem) and swings when close.
fn autopilot(
    view: Res<ArenaView>,
    encounter: Option<Res<Encounter>>,
    mut held: Local<Held>,
    mut inputs: EventWriter<PlayerInput>,
) {
    let Some(encounter) = encounter else { return };
    let Some(me) = view.actor(encounter.player) else { return };

    let enemy_x = view
        .actors
        .iter()
        .filter(|a| a.entity != encounter.player)
        .map(|a| a.pos.x)
        .min_by_key(|x| (x - me.pos.x).abs());
    let Some(target_x) = enemy_x.or(view.gem.map(|g| g.x)) else { return };

    let dx = target_x - me.pos.x;
    let (want_left, want_right) = match dx {
        _ if view.gem.is_none() && dx.abs() < STRIKE_DISTANCE => (false, false),
        d if d < 0 => (true, false),
        d if d > 0 => (false, true),
        _ => (false, false),
    };

    if held.left != want_left {
        inputs.write(if want_left { PlayerInput::MoveLeftPressed } else { PlayerInput::MoveLeftReleased });
        held.left = want_left;
    }
    if held.right != want_right {
        inputs.write(if want_right { PlayerInput::MoveRightPressed } else { PlayerInput::MoveRightReleased });
        held.right = want_right;
    }
    if !want_left && !want_right && view.gem.is_none() {
        inputs.write(PlayerInput::AttackPressed);
    }
}

fn report_view(view: Res<ArenaView>, mut catalog: ResMut<SpriteCatalog>, mut ticks: Local<u32>) {
    *ticks += 1;
    if *ticks % 120 != 0 {
        return;
    }
    let hud = view.hud;
    info!("hp {}/{} camera {}", hud.player_hp, hud.player_max_hp, hud.camera_offset_x);
    for actor in &view.actors {
        let frame = catalog.frame(actor.sprite, actor.frame).to_string();
        debug!("  {frame} at {} facing_left={}", actor.pos, actor.facing_left);
    }
    if let Some(gem) = view.gem {
        debug!("  {} at {gem}", catalog.frame(SpriteSequence::Gem, 0));
    }
}

fn play_cues(mut cues: EventReader<AudioCue>) {
    for cue in cues.read() {
        debug!("sfx {}", cue.sound());
    }
}

fn stop_at_tick_cap(mut ticks: Local<u32>, mut exit: EventWriter<AppExit>) {
    *ticks += 1;
    if *ticks == TICK_CAP {
        warn!("no outcome after {TICK_CAP} ticks, stopping");
        exit.write(AppExit::Success);
    }
}

fn exit_on_end(mut ended: EventReader<EncounterEnded>, mut exit: EventWriter<AppExit>) {
    for end in ended.read() {
        info!("encounter ended: {:?}", end.outcome);
        exit.write(AppExit::Success);
    }
}
