use crate::prelude::*;

/// Fire-and-forget sound triggers. Nothing in the simulation waits on playback.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    AttackSwing(ActorKind),
    Hurt(ActorKind),
    Death(ActorKind),
    Roar,
    Pickup,
    Growl,
}

impl AudioCue {
    /// Sound asset stem the audio side should play.
    pub fn sound(&self) -> &'static str {
        match self {
            AudioCue::AttackSwing(ActorKind::Player) => "player_attack",
            AudioCue::AttackSwing(ActorKind::Grunt) => "grunt_attack",
            AudioCue::AttackSwing(ActorKind::Boss) => "boss_attack",
            AudioCue::Hurt(ActorKind::Player) => "player_hurt",
            AudioCue::Hurt(_) => "enemy_hurt",
            AudioCue::Death(ActorKind::Player) => "player_death",
            AudioCue::Death(ActorKind::Grunt) => "grunt_death",
            AudioCue::Death(ActorKind::Boss) => "boss_death",
            AudioCue::Roar => "boss_roar",
            AudioCue::Pickup => "gem_pickup",
            AudioCue::Growl => "grunt_growl",
        }
    }
}
