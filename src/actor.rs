use std::time::Duration;

use crate::animations::{AnimationClock, clip, hit_frame};
use crate::prelude::*;
use crate::tuning::ActorStats;

// ====== Kinds & poses ======
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ActorKind {
    Player,
    Grunt,
    Boss,
}

impl ActorKind {
    pub fn name(self) -> &'static str {
        match self {
            ActorKind::Player => "player",
            ActorKind::Grunt => "grunt",
            ActorKind::Boss => "boss",
        }
    }

    /// Sprite frame size in world pixels.
    pub fn frame_size(self) -> IVec2 {
        match self {
            ActorKind::Player => IVec2::new(240, 160),
            ActorKind::Grunt => IVec2::new(128, 128),
            ActorKind::Boss => IVec2::new(384, 224),
        }
    }

    /// The movement pose this kind falls back to when it has nothing to do.
    pub fn rest_pose(self) -> Pose {
        match self {
            ActorKind::Grunt => Pose::Walk,
            _ => Pose::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Pose {
    Idle,
    Run,
    Walk,
    Attack1,
    Attack2,
    Hurt,
    Death,
}

impl Pose {
    pub const COUNT: usize = 7;
    pub const ALL: [Pose; Pose::COUNT] = [
        Pose::Idle,
        Pose::Run,
        Pose::Walk,
        Pose::Attack1,
        Pose::Attack2,
        Pose::Hurt,
        Pose::Death,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Pose::Idle => "idle",
            Pose::Run => "run",
            Pose::Walk => "walk",
            Pose::Attack1 => "attack1",
            Pose::Attack2 => "attack2",
            Pose::Hurt => "hurt",
            Pose::Death => "death",
        }
    }

    pub fn is_attack(self) -> bool {
        matches!(self, Pose::Attack1 | Pose::Attack2)
    }

    pub fn is_movement(self) -> bool {
        matches!(self, Pose::Idle | Pose::Run | Pose::Walk)
    }
}

// ====== Vitals ======
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Vitals {
    hp: u32,
    pub max_hp: u32,
    pub attack_power: u32,
    pub defense: u32,
    pub move_speed: i32,
}

impl Vitals {
    pub fn new(stats: ActorStats) -> Self {
        Self {
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            attack_power: stats.attack_power,
            defense: stats.defense,
            move_speed: stats.move_speed,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn dead(&self) -> bool {
        self.hp == 0
    }

    /// Damage a hit of `attack_power` would do against these vitals.
    pub fn damage_from(&self, attack_power: u32) -> u32 {
        attack_power.saturating_sub(self.defense).max(1)
    }

    /// Subtracts an already-mitigated amount. Returns what was actually removed.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        before - self.hp
    }
}

// ====== Placement ======
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Placement {
    pub pos: IVec2,
    pub facing_left: bool,
}

impl Placement {
    pub fn new(x: i32, y: i32, facing_left: bool) -> Self {
        Self { pos: IVec2::new(x, y), facing_left }
    }

    /// Position setter owned by the actor; x is kept inside `[min_x, max_x]`.
    pub fn set_position_clamped(&mut self, x: i32, y: i32, min_x: i32, max_x: i32) {
        self.pos.x = x.clamp(min_x, max_x.max(min_x));
        self.pos.y = y;
    }

    pub fn face_toward(&mut self, target_x: i32) {
        if target_x < self.pos.x {
            self.facing_left = true;
        } else if target_x > self.pos.x {
            self.facing_left = false;
        }
    }
}

/// Axis-aligned box of the actor with transparent sprite margins removed.
pub fn hitbox(kind: ActorKind, placement: &Placement, vanished: bool) -> IRect {
    if vanished {
        return IRect::default();
    }
    let IVec2 { x, y } = placement.pos;
    match kind {
        ActorKind::Player => IRect::new(x, y, x + 180, y + 140),
        ActorKind::Grunt => IRect::new(x, y, x + 128, y + 128),
        ActorKind::Boss => IRect::new(x + 50, y + 50, x + 50 + 284, y + 50 + 174),
    }
}

/// Area an actor's swing covers: its body plus a strike box in front of it.
/// The player swings with its body box alone.
pub fn reach(kind: ActorKind, placement: &Placement, vanished: bool) -> IRect {
    let body = hitbox(kind, placement, vanished);
    if vanished {
        return body;
    }
    let IVec2 { x, y } = placement.pos;
    let left = placement.facing_left;
    let strike = match kind {
        ActorKind::Player => return body,
        ActorKind::Grunt => {
            let sx = if left { x - 20 } else { x + 128 - 30 };
            IRect::new(sx, y + 20, sx + 40, y + 20 + 60)
        }
        ActorKind::Boss => {
            let sx = if left { x - 40 } else { x + 384 - 40 };
            IRect::new(sx, y + 20, sx + 60, y + 20 + 224 - 40)
        }
    };
    body.union(strike)
}

/// Strict overlap. Touching edges and empty boxes never count.
pub fn overlaps(a: IRect, b: IRect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

// ====== State machine ======

/// Current pose plus its animation clock. Every pose entry restarts the clock.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ActorState {
    kind: ActorKind,
    pose: Pose,
    clock: AnimationClock,
    swing_seq: u32,
    vanished: bool,
}

impl ActorState {
    pub fn new(kind: ActorKind) -> Self {
        let pose = kind.rest_pose();
        Self {
            kind,
            pose,
            clock: AnimationClock::for_pose(kind, pose),
            swing_seq: 0,
            vanished: false,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn frame(&self) -> usize {
        self.clock.index()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Bumped on every attack entry so hit guards can tell swings apart.
    pub fn swing_seq(&self) -> u32 {
        self.swing_seq
    }

    pub fn vanished(&self) -> bool {
        self.vanished
    }

    /// Switches pose. Re-entering an attack or death pose restarts it; movement
    /// poses keep their clock when unchanged.
    pub fn enter(&mut self, pose: Pose) {
        if self.vanished {
            return;
        }
        let kind = self.kind;
        let pose = match pose {
            Pose::Attack2 if clip(kind, Pose::Attack2).is_none() => Pose::Attack1,
            Pose::Idle if kind == ActorKind::Grunt => Pose::Walk,
            other => other,
        };
        if pose == self.pose && pose.is_movement() {
            return;
        }
        if pose.is_attack() {
            self.swing_seq = self.swing_seq.wrapping_add(1);
        }
        debug!("{} {:?} -> {:?}", kind.name(), self.pose, pose);
        self.pose = pose;
        self.clock = AnimationClock::for_pose(kind, pose);
    }

    /// Attack pose entry positioned at a given frame.
    pub fn enter_at(&mut self, pose: Pose, frame: usize) {
        self.enter(pose);
        self.clock.seek(frame);
    }

    pub fn is_attacking(&self) -> bool {
        self.pose.is_attack()
    }

    pub fn is_dying(&self) -> bool {
        self.pose == Pose::Death
    }

    /// True on every tick the clock sits on the current attack's hit frame.
    pub fn at_hit_frame(&self) -> bool {
        !self.vanished
            && self.is_attacking()
            && hit_frame(self.kind, self.pose) == Some(self.clock.index())
    }

    /// Steps the clock. Returns true once when a non-looping clip completes.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.vanished {
            return false;
        }
        let was_finished = self.clock.finished();
        self.clock.advance(dt);
        let finished = !was_finished && self.clock.finished();
        if finished && self.pose == Pose::Death {
            self.vanished = true;
            debug!("{} vanished", self.kind.name());
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn damage_floor_is_one() {
        let grunt = Vitals::new(ActorStats::new(40, 6, 0, 2));
        let player = Vitals::new(ActorStats::new(100, 20, 3, 8));
        assert_eq!(grunt.damage_from(10), 10);
        assert_eq!(player.damage_from(18), 15);
        assert_eq!(player.damage_from(2), 1);
        assert_eq!(player.damage_from(0), 1);
    }

    #[test]
    fn hp_saturates_at_zero() {
        let mut v = Vitals::new(ActorStats::new(10, 1, 0, 1));
        assert_eq!(v.apply_damage(4), 4);
        assert_eq!(v.apply_damage(50), 6);
        assert_eq!(v.hp(), 0);
        assert!(v.dead());
        assert_eq!(v.apply_damage(5), 0);
    }

    #[test]
    fn vanished_hitbox_is_empty() {
        let p = Placement::new(300, 200, false);
        let live = hitbox(ActorKind::Boss, &p, false);
        assert_eq!(live, IRect::new(350, 250, 634, 424));
        let gone = hitbox(ActorKind::Boss, &p, true);
        assert!(gone.is_empty());
        assert!(!overlaps(gone, live));
        assert!(!overlaps(gone, gone));
    }

    #[test]
    fn enemy_reach_covers_its_attack_range_on_both_sides() {
        let player_at = |x| hitbox(ActorKind::Player, &Placement::new(x, 186, false), false);

        let boss_left = reach(ActorKind::Boss, &Placement::new(1568, 157, true), false);
        assert!(overlaps(boss_left, player_at(1568 - 150)));
        assert!(overlaps(boss_left, player_at(1568 - 219)));
        assert!(!overlaps(boss_left, player_at(1568 - 220)));

        let boss_right = reach(ActorKind::Boss, &Placement::new(1000, 157, false), false);
        assert!(overlaps(boss_right, player_at(1000)));
        assert!(overlaps(boss_right, player_at(1000 + 219)));

        let grunt_left = reach(ActorKind::Grunt, &Placement::new(500, 298, true), false);
        assert!(overlaps(grunt_left, player_at(500 - 119)));
        let grunt_right = reach(ActorKind::Grunt, &Placement::new(500, 298, false), false);
        assert!(overlaps(grunt_right, player_at(500 + 119)));

        let p = Placement::new(10, 20, true);
        assert_eq!(reach(ActorKind::Player, &p, false), hitbox(ActorKind::Player, &p, false));
        assert!(reach(ActorKind::Boss, &p, true).is_empty());
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = IRect::new(0, 0, 10, 10);
        assert!(!overlaps(a, IRect::new(10, 0, 20, 10)));
        assert!(overlaps(a, IRect::new(9, 9, 20, 20)));
    }

    #[test]
    fn clamped_setter_respects_bounds() {
        let mut p = Placement::new(0, 0, false);
        p.set_position_clamped(900, 186, 0, 688);
        assert_eq!(p.pos, IVec2::new(688, 186));
        p.set_position_clamped(-40, 186, 0, 688);
        assert_eq!(p.pos.x, 0);
    }

    #[test]
    fn attack_entry_restarts_clock_and_bumps_swing() {
        let mut s = ActorState::new(ActorKind::Boss);
        s.enter(Pose::Attack1);
        let first = s.swing_seq();
        s.advance(ms(350));
        assert_eq!(s.frame(), 3);
        assert!(s.at_hit_frame());
        s.enter(Pose::Attack1);
        assert_eq!(s.frame(), 0);
        assert_ne!(s.swing_seq(), first);
    }

    #[test]
    fn grunt_maps_missing_poses() {
        let mut s = ActorState::new(ActorKind::Grunt);
        assert_eq!(s.pose(), Pose::Walk);
        s.enter(Pose::Idle);
        assert_eq!(s.pose(), Pose::Walk);
        s.enter(Pose::Attack2);
        assert_eq!(s.pose(), Pose::Attack1);
    }

    #[test]
    fn death_vanishes_after_full_clip_and_not_before() {
        let mut s = ActorState::new(ActorKind::Grunt);
        s.enter(Pose::Death);
        assert!(!s.advance(ms(239)));
        assert!(!s.vanished());
        assert!(s.advance(ms(1)));
        assert!(s.vanished());
        s.enter(Pose::Walk);
        assert_eq!(s.pose(), Pose::Death);
    }
}
