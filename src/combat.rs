use std::collections::HashSet;

use crate::actor::{hitbox, overlaps, reach};
use crate::arena::{ArenaSet, ArenaTick};
use crate::audio::AudioCue;
use crate::character::Invulnerability;
use crate::enemy::HurtFreeze;
use crate::prelude::*;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MeleeHit>().add_systems(
            ArenaTick,
            (reset_swing_guards, detect_melee_hits, apply_melee_hits)
                .chain()
                .in_set(ArenaSet::Combat),
        );
    }
}

/// A qualifying hit found this tick. Damage is already mitigated by defense.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeleeHit {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    /// Player finisher; staggers the boss.
    pub heavy: bool,
}

/// Once-per-swing guard: who this actor already struck during its current swing.
#[derive(Component, Debug, Default, Clone)]
pub struct Swing {
    struck: HashSet<Entity>,
    seq: u32,
    last_frame: Option<usize>,
    cued: bool,
}

impl Swing {
    /// Clears the guard on a new swing, on a frame rewind, or when not attacking.
    pub fn sync(&mut self, state: &ActorState) {
        if !state.is_attacking() {
            self.clear();
            self.last_frame = None;
            return;
        }
        let frame = state.frame();
        let rewound = self.last_frame.is_some_and(|last| frame < last);
        if self.seq != state.swing_seq() || rewound {
            self.clear();
        }
        self.seq = state.swing_seq();
        self.last_frame = Some(frame);
    }

    pub fn has_struck(&self, target: Entity) -> bool {
        self.struck.contains(&target)
    }

    /// Any target already taken by this swing.
    pub fn consumed(&self) -> bool {
        !self.struck.is_empty()
    }

    fn clear(&mut self) {
        self.struck.clear();
        self.cued = false;
    }
}

/// Players hit enemies, enemies hit players. Enemies never hit each other.
fn hostile(attacker: ActorKind, defender: ActorKind) -> bool {
    (attacker == ActorKind::Player) != (defender == ActorKind::Player)
}

pub(crate) fn reset_swing_guards(mut q: Query<(&ActorState, &mut Swing)>) {
    for (state, mut swing) in &mut q {
        swing.sync(state);
    }
}

struct Target {
    entity: Entity,
    kind: ActorKind,
    body: IRect,
    vitals: Vitals,
}

pub(crate) fn detect_melee_hits(
    mut actors: Query<(Entity, &ActorState, &Placement, &Vitals, &mut Swing)>,
    mut hits: EventWriter<MeleeHit>,
    mut cues: EventWriter<AudioCue>,
) {
    let targets: Vec<Target> = actors
        .iter()
        .filter(|(_, state, _, vitals, _)| !state.vanished() && !vitals.dead())
        .map(|(entity, state, placement, vitals, _)| Target {
            entity,
            kind: state.kind(),
            body: hitbox(state.kind(), placement, state.vanished()),
            vitals: *vitals,
        })
        .collect();

    for (attacker, state, placement, vitals, mut swing) in &mut actors {
        if !state.at_hit_frame() || vitals.dead() {
            continue;
        }
        let kind = state.kind();
        if kind != ActorKind::Player && !swing.cued {
            swing.cued = true;
            cues.write(AudioCue::AttackSwing(kind));
        }
        let area = reach(kind, placement, state.vanished());
        for target in &targets {
            if target.entity == attacker
                || !hostile(kind, target.kind)
                || swing.has_struck(target.entity)
                || !overlaps(area, target.body)
            {
                continue;
            }
            swing.struck.insert(target.entity);
            let hit = MeleeHit {
                attacker,
                target: target.entity,
                damage: target.vitals.damage_from(vitals.attack_power),
                heavy: kind == ActorKind::Player && state.pose() == Pose::Attack2,
            };
            debug!("{} {:?} frame {} hits {}", kind.name(), state.pose(), state.frame(), target.kind.name());
            hits.write(hit);
        }
    }
}

pub(crate) fn apply_melee_hits(
    mut hits: EventReader<MeleeHit>,
    mut targets: Query<(
        &mut Vitals,
        &mut ActorState,
        Option<&mut Invulnerability>,
        Option<&mut HurtFreeze>,
    )>,
    tuning: Res<ArenaTuning>,
    mut cues: EventWriter<AudioCue>,
) {
    for hit in hits.read() {
        let Ok((mut vitals, mut state, invuln, freeze)) = targets.get_mut(hit.target) else {
            continue;
        };
        if vitals.dead() || state.vanished() {
            continue;
        }
        let kind = state.kind();
        if let Some(mut invuln) = invuln {
            if invuln.active() {
                debug!("{} ignored {} damage (invulnerable)", kind.name(), hit.damage);
                continue;
            }
            invuln.start(tuning.invulnerability());
        }

        let dealt = vitals.apply_damage(hit.damage);
        debug!("{} took {dealt}, hp {}/{}", kind.name(), vitals.hp(), vitals.max_hp);

        if vitals.dead() {
            if let Some(mut freeze) = freeze {
                freeze.clear();
            }
            state.enter(Pose::Death);
            cues.write(AudioCue::Death(kind));
            info!("{} defeated", kind.name());
            continue;
        }

        cues.write(AudioCue::Hurt(kind));
        if hit.heavy && state.pose() != Pose::Hurt {
            if let Some(mut freeze) = freeze {
                if !freeze.active() {
                    state.enter(Pose::Hurt);
                    freeze.start(tuning.hurt_freeze());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn guard_survives_hit_frame_ticks_and_clears_on_new_swing() {
        let mut world = World::new();
        let target = world.spawn_empty().id();

        let mut state = ActorState::new(ActorKind::Player);
        let mut swing = Swing::default();
        state.enter(Pose::Attack1);
        swing.sync(&state);
        state.advance(Duration::from_millis(100));
        swing.sync(&state);
        swing.struck.insert(target);

        state.advance(Duration::from_millis(16));
        swing.sync(&state);
        assert!(swing.has_struck(target));
        assert!(swing.consumed());

        state.enter(Pose::Attack2);
        swing.sync(&state);
        assert!(!swing.consumed());
    }

    #[test]
    fn guard_clears_when_attack_ends() {
        let mut world = World::new();
        let target = world.spawn_empty().id();

        let mut state = ActorState::new(ActorKind::Grunt);
        let mut swing = Swing::default();
        state.enter(Pose::Attack1);
        swing.sync(&state);
        swing.struck.insert(target);
        state.enter(Pose::Walk);
        swing.sync(&state);
        assert!(!swing.has_struck(target));
    }

    #[test]
    fn guard_clears_when_frame_goes_backwards_within_one_swing() {
        let mut world = World::new();
        let target = world.spawn_empty().id();

        let mut state = ActorState::new(ActorKind::Boss);
        let mut swing = Swing::default();
        state.enter(Pose::Attack1);
        state.advance(Duration::from_millis(300));
        swing.sync(&state);
        swing.struck.insert(target);
        assert_eq!(state.frame(), 3);

        // same swing_seq, but the guard last saw a later frame
        swing.last_frame = Some(5);
        swing.sync(&state);
        assert!(!swing.has_struck(target));
        assert_eq!(swing.last_frame, Some(3));
    }

    #[test]
    fn only_cross_team_pairs_are_hostile() {
        assert!(hostile(ActorKind::Player, ActorKind::Grunt));
        assert!(hostile(ActorKind::Boss, ActorKind::Player));
        assert!(!hostile(ActorKind::Grunt, ActorKind::Boss));
        assert!(!hostile(ActorKind::Player, ActorKind::Player));
    }
}
