mod common;

use std::collections::HashMap;

use common::*;
use legend_arena::audio::AudioCue;
use legend_arena::character::PlayerInput;
use legend_arena::prelude::*;
use legend_arena::{ArenaSim, Outcome};

#[test]
fn gate_opens_the_tick_after_the_last_grunt_vanishes() {
    let mut sim = sim_with(|_| {});
    let player = sim.encounter().player;
    let boss = sim.encounter().boss;
    let grunts = sim.encounter().grunts.clone();
    assert_eq!(grunts.len(), 3);

    kill(&mut sim, grunts[0]);
    kill(&mut sim, grunts[1]);
    for _ in 0..40 {
        // even standing right next to it, the locked boss only idles
        set_x(&mut sim, player, 1500);
        sim.tick_ms(16);
        assert!(!sim.encounter().arena_unlocked());
        assert!(gate_locked(&sim, boss));
        assert_eq!(pose(&sim, boss), Pose::Idle);
        assert_eq!(x(&sim, player), 688);
    }
    assert!(vanished(&sim, grunts[0]) && vanished(&sim, grunts[1]));

    kill(&mut sim, grunts[2]);
    let mut guard = 0;
    while !vanished(&sim, grunts[2]) {
        sim.tick_ms(16);
        assert!(!sim.encounter().arena_unlocked());
        guard += 1;
        assert!(guard < 100);
    }
    // the vanishing tick itself still saw a live grunt at gate time
    assert!(!sim.encounter().arena_unlocked());

    set_x(&mut sim, player, 1300);
    sim.tick_ms(16);
    assert!(sim.encounter().arena_unlocked());
    assert!(!gate_locked(&sim, boss));
    assert_eq!(pose(&sim, boss), Pose::Walk);
    assert_eq!(x(&sim, boss), 1566);

    for _ in 0..200 {
        sim.tick_ms(16);
    }
    let roars = sim.take_cues().into_iter().filter(|c| *c == AudioCue::Roar).count();
    assert_eq!(roars, 1);
}

#[test]
fn player_is_held_to_the_left_half_until_unlock() {
    let mut sim = sim_with(|_| {});
    let player = sim.encounter().player;
    let grunts = sim.encounter().grunts.clone();

    sim.press(PlayerInput::MoveRightPressed);
    for _ in 0..100 {
        sim.tick_ms(16);
    }
    assert_eq!(x(&sim, player), 928 - 240);
    assert_eq!(sim.view().hud.camera_offset_x, 688 + 120 - 464);

    set_x(&mut sim, player, 5000);
    sim.tick_ms(16);
    assert_eq!(x(&sim, player), 688);

    sim.press(PlayerInput::MoveRightReleased);
    set_x(&mut sim, player, -50);
    sim.tick_ms(16);
    assert_eq!(x(&sim, player), 0);

    for g in grunts {
        kill(&mut sim, g);
    }
    for _ in 0..20 {
        sim.tick_ms(16);
    }
    assert!(sim.encounter().arena_unlocked());
    set_x(&mut sim, player, 5000);
    sim.tick_ms(16);
    assert_eq!(x(&sim, player), 1952 - 240);
}

#[test]
fn boss_falls_drops_gem_and_pickup_wins() {
    let mut sim = sim_with(|t| {
        t.grunt_spawn_x.clear();
        t.boss.max_hp = 1;
    });
    let player = sim.encounter().player;
    let boss = sim.encounter().boss;
    set_x(&mut sim, player, 1500);

    sim.press(PlayerInput::AttackPressed);
    let mut guard = 0;
    while !sim.encounter().gem_spawned() {
        sim.tick_ms(16);
        guard += 1;
        assert!(guard < 200, "boss never vanished");
    }
    assert!(vanished(&sim, boss));
    let gem = sim.encounter().gem().unwrap();
    assert_eq!(gem.pos, IVec2::new(1712, 222));
    assert!(!sim.is_over());
    assert_eq!(sim.view().gem, Some(gem.pos));

    sim.press(PlayerInput::MoveRightPressed);
    while !sim.is_over() {
        sim.tick_ms(16);
        guard += 1;
        assert!(guard < 400, "gem never picked up");
    }
    assert!(sim.encounter().victory());
    assert!(sim.encounter().gem_picked());
    assert_eq!(sim.ended(), Some(Outcome::Victory));
    assert!(sim.view().hud.victory);
    assert_eq!(sim.view().gem, None);
    assert!(sim.take_cues().contains(&AudioCue::Pickup));
}

#[test]
fn player_death_latches_defeat_and_halts() {
    let mut sim = sim_with(|t| {
        t.player.max_hp = 1;
        t.grunt_spawn_x = vec![100];
    });
    let player = sim.encounter().player;
    let grunt = sim.encounter().grunts[0];

    let mut guard = 0;
    while !sim.is_over() {
        sim.tick_ms(16);
        guard += 1;
        assert!(guard < 200);
    }
    assert_eq!(hp(&sim, player), 0);
    assert!(vanished(&sim, player));
    assert!(sim.encounter().defeat());
    assert_eq!(sim.ended(), Some(Outcome::Defeat));
    assert!(sim.view().hud.defeat);
    assert_eq!(sim.view().hud.player_hp, 0);

    let ticks = sim.ticks();
    let grunt_x = x(&sim, grunt);
    sim.take_cues();
    for _ in 0..50 {
        sim.tick_ms(16);
    }
    assert_eq!(sim.ticks(), ticks);
    assert_eq!(x(&sim, grunt), grunt_x);
    assert!(sim.take_cues().is_empty());
}

#[test]
fn player_death_clip_runs_full_length_before_vanishing() {
    let mut sim = sim_with(|t| t.player.max_hp = 1);
    let player = sim.encounter().player;
    kill(&mut sim, player);

    // 10 frames x 90 ms
    for _ in 0..44 {
        sim.tick_ms(20);
        assert!(!vanished(&sim, player));
        assert!(!sim.is_over());
    }
    sim.tick_ms(20);
    assert!(vanished(&sim, player));
    assert!(sim.encounter().defeat());
}

#[test]
fn growls_come_from_living_grunts_on_the_interval() {
    let mut sim = sim_with(|_| {});
    for _ in 0..125 {
        sim.tick_ms(16);
    }
    let growls = sim.take_cues().into_iter().filter(|c| *c == AudioCue::Growl).count();
    assert_eq!(growls, 3);
}

/// Crude autopilot: walk to the nearest enemy, swing when close, grab the gem.
fn autopilot(sim: &mut ArenaSim, held: &mut (bool, bool)) {
    let view = sim.view().clone();
    let player = sim.encounter().player;
    let Some(me) = view.actor(player) else { return };
    let target = view
        .actors
        .iter()
        .filter(|a| a.entity != player)
        .map(|a| a.pos.x)
        .min_by_key(|x| (x - me.pos.x).abs())
        .or(view.gem.map(|g| g.x));
    let Some(target) = target else { return };

    let dx = target - me.pos.x;
    let close = view.gem.is_none() && dx.abs() < 110;
    let want = (!close && dx < 0, !close && dx > 0);
    if want.0 != held.0 {
        sim.press(if want.0 { PlayerInput::MoveLeftPressed } else { PlayerInput::MoveLeftReleased });
    }
    if want.1 != held.1 {
        sim.press(if want.1 { PlayerInput::MoveRightPressed } else { PlayerInput::MoveRightReleased });
    }
    *held = want;
    if close {
        sim.press(PlayerInput::AttackPressed);
    }
}

#[test]
fn invariants_hold_through_a_scripted_fight() {
    let mut sim = sim_with(|_| {});
    let mut held = (false, false);
    let mut last_hp: HashMap<Entity, u32> = HashMap::new();

    for _ in 0..6000 {
        if sim.is_over() {
            break;
        }
        autopilot(&mut sim, &mut held);
        sim.tick_ms(16);

        let world = sim.world_mut();
        let mut q = world.query::<(Entity, &Vitals, &ActorState)>();
        for (e, vitals, state) in q.iter(world) {
            assert!(vitals.hp() <= vitals.max_hp);
            if state.vanished() {
                assert!(vitals.dead());
            }
            if vitals.dead() {
                assert_eq!(state.pose(), Pose::Death);
            }
            let prev = last_hp.insert(e, vitals.hp()).unwrap_or(vitals.max_hp);
            assert!(vitals.hp() <= prev, "hp rose for {e}");
        }
    }
}
