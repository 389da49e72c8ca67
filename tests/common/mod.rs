#![allow(dead_code)]

use legend_arena::ArenaSim;
use legend_arena::enemy::EnemyAi;
use legend_arena::prelude::*;

pub fn sim_with(tweak: impl FnOnce(&mut ArenaTuning)) -> ArenaSim {
    let mut tuning = ArenaTuning::default();
    tweak(&mut tuning);
    ArenaSim::new(tuning)
}

pub fn hp(sim: &ArenaSim, e: Entity) -> u32 {
    sim.get::<Vitals>(e).map_or(0, Vitals::hp)
}

pub fn pose(sim: &ArenaSim, e: Entity) -> Pose {
    sim.get::<ActorState>(e).map(ActorState::pose).unwrap()
}

pub fn frame(sim: &ArenaSim, e: Entity) -> usize {
    sim.get::<ActorState>(e).map(ActorState::frame).unwrap()
}

pub fn vanished(sim: &ArenaSim, e: Entity) -> bool {
    sim.get::<ActorState>(e).unwrap().vanished()
}

pub fn x(sim: &ArenaSim, e: Entity) -> i32 {
    sim.get::<Placement>(e).unwrap().pos.x
}

pub fn set_x(sim: &mut ArenaSim, e: Entity, x: i32) {
    sim.get_mut::<Placement>(e).unwrap().pos.x = x;
}

pub fn gate_locked(sim: &ArenaSim, e: Entity) -> bool {
    sim.get::<EnemyAi>(e).unwrap().gate_locked
}

/// Puts `e` into `pose` sitting on `frame`, as a fresh swing.
pub fn force_pose(sim: &mut ArenaSim, e: Entity, pose: Pose, frame: usize) {
    sim.get_mut::<ActorState>(e).unwrap().enter_at(pose, frame);
}

/// Drops hp to zero and starts the death clip, as a killing blow would.
pub fn kill(sim: &mut ArenaSim, e: Entity) {
    let max = sim.get::<Vitals>(e).unwrap().max_hp;
    sim.get_mut::<Vitals>(e).unwrap().apply_damage(max);
    sim.get_mut::<ActorState>(e).unwrap().enter(Pose::Death);
}
