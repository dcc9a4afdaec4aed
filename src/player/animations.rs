use bevy::prelude::*;
use serde::Deserialize;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::assets::GameAssets;
use crate::math::lerp_clamped;
use crate::player::Character;

/// Named animator inputs written by the locomotion controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Reflect)]
pub enum AnimationParameter {
    Speed,
    Vertical,
    Horizontal,
    MotionSpeed,
    Run,
    Grounded,
    Jump,
    FreeFall,
    /// Crouch stance.
    Crunch,
    Prone,
}

/// Write-only view of an animator. The controller never reads it back.
pub trait AnimationSink {
    fn set_float(&mut self, parameter: AnimationParameter, value: f32);
    fn set_bool(&mut self, parameter: AnimationParameter, value: bool);
}

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimatorParameters {
    pub speed: f32,
    pub vertical: f32,
    pub horizontal: f32,
    pub motion_speed: f32,
    pub run: bool,
    pub grounded: bool,
    pub jump: bool,
    pub free_fall: bool,
    pub crunch: bool,
    pub prone: bool,
}

impl AnimationSink for AnimatorParameters {
    fn set_float(&mut self, parameter: AnimationParameter, value: f32) {
        use AnimationParameter::*;
        let slot = match parameter {
            Speed => &mut self.speed,
            Vertical => &mut self.vertical,
            Horizontal => &mut self.horizontal,
            MotionSpeed => &mut self.motion_speed,
            other => {
                warn!("{other} is not a float parameter");
                return;
            }
        };
        *slot = value;
    }

    fn set_bool(&mut self, parameter: AnimationParameter, value: bool) {
        use AnimationParameter::*;
        let slot = match parameter {
            Run => &mut self.run,
            Grounded => &mut self.grounded,
            Jump => &mut self.jump,
            FreeFall => &mut self.free_fall,
            Crunch => &mut self.crunch,
            Prone => &mut self.prone,
            other => {
                warn!("{other} is not a bool parameter");
                return;
            }
        };
        if *slot != value {
            debug!("animator {parameter} = {value}");
        }
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Speed at which the walk clip is fully weighted.
    pub walk_speed: f32,
    /// Speed at which the run clip is fully weighted.
    pub run_speed: f32,
    /// Below this speed crouch/prone clips idle.
    pub moving_threshold: f32,
    /// Weight easing rate per second.
    pub weight_blend_rate: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 6.0,
            moving_threshold: 0.01,
            weight_blend_rate: 10.0,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Component)]
pub struct ClipsT<T> {
    pub idle: T,
    pub walk: T,
    pub run: T,
    pub jump: T,
    pub free_fall: T,
    pub crouch_idle: T,
    pub crouch_walk: T,
    pub prone_idle: T,
    pub prone_crawl: T,
}

impl<T> ClipsT<T> {
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [
            &self.idle,
            &self.walk,
            &self.run,
            &self.jump,
            &self.free_fall,
            &self.crouch_idle,
            &self.crouch_walk,
            &self.prone_idle,
            &self.prone_crawl,
        ]
        .into_iter()
    }

    /// Clips whose playback rate follows the motion speed.
    pub fn locomotion(&self) -> [&T; 4] {
        [&self.walk, &self.run, &self.crouch_walk, &self.prone_crawl]
    }
}

pub type CharacterClips = ClipsT<AnimationNodeIndex>;
pub type ClipWeights = ClipsT<f32>;

/// Clip weights the parameters ask for.
pub fn target_weights(params: &AnimatorParameters, settings: &AnimationSettings) -> ClipWeights {
    if !params.grounded && params.jump {
        return ClipWeights {
            jump: 1.0,
            ..default()
        };
    }
    if !params.grounded && params.free_fall {
        return ClipWeights {
            free_fall: 1.0,
            ..default()
        };
    }

    let moving = params.speed > settings.moving_threshold;
    if params.crunch {
        return if moving {
            ClipWeights {
                crouch_walk: 1.0,
                ..default()
            }
        } else {
            ClipWeights {
                crouch_idle: 1.0,
                ..default()
            }
        };
    }
    if params.prone {
        return if moving {
            ClipWeights {
                prone_crawl: 1.0,
                ..default()
            }
        } else {
            ClipWeights {
                prone_idle: 1.0,
                ..default()
            }
        };
    }

    let speed = params.speed.max(0.0);
    let walk = settings.walk_speed.max(f32::EPSILON);
    if speed <= walk {
        let t = speed / walk;
        ClipWeights {
            idle: 1.0 - t,
            walk: t,
            ..default()
        }
    } else {
        let t = ((speed - walk) / (settings.run_speed - walk).max(f32::EPSILON)).min(1.0);
        ClipWeights {
            walk: 1.0 - t,
            run: t,
            ..default()
        }
    }
}

/// Points from an `AnimationPlayer` in the character's scene back to the
/// character root.
#[derive(Component, Reflect)]
#[relationship(relationship_target = CharacterAnimator)]
pub struct AnimatorOf(pub Entity);

#[derive(Component, Reflect)]
#[relationship_target(relationship = AnimatorOf, linked_spawn)]
pub struct CharacterAnimator(Entity);

impl CharacterAnimator {
    pub fn player(&self) -> Entity {
        self.0
    }
}

pub fn link_animation_players(
    mut commands: Commands,
    players: Query<Entity, Added<AnimationPlayer>>,
    characters: Query<(), With<Character>>,
    parents: Query<&ChildOf>,
) {
    for player in players.iter() {
        let Some(root) = parents
            .iter_ancestors(player)
            .find(|e| characters.contains(*e))
        else {
            continue;
        };
        debug!("linking animation player {player} to character {root}");
        commands.entity(player).insert(AnimatorOf(root));
    }
}

pub fn on_animator_linked(
    on: On<Add, AnimatorOf>,
    assets: Res<GameAssets>,
    mut players: Query<&mut AnimationPlayer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut commands: Commands,
) -> Result {
    let clips = &assets.character_clips;
    if clips.len() < 9 {
        return Err(BevyError::from(format!(
            "character model carries {} animation clips, 9 are required",
            clips.len()
        )));
    }

    let mut graph = AnimationGraph::new();
    let root = graph.root;
    let mut add = |i: usize| graph.add_clip(clips[i].clone(), 0.0, root);
    let nodes = CharacterClips {
        idle: add(0),
        walk: add(1),
        run: add(2),
        jump: add(3),
        free_fall: add(4),
        crouch_idle: add(5),
        crouch_walk: add(6),
        prone_idle: add(7),
        prone_crawl: add(8),
    };

    let mut player = players.get_mut(on.event_target())?;
    for node in nodes.iter() {
        player.play(*node).repeat();
    }

    commands
        .entity(on.event_target())
        .insert(AnimationGraphHandle(graphs.add(graph)))
        .insert(nodes)
        .insert(ClipWeights::default());

    Ok(())
}

pub fn clip_weights_from_parameters(
    mut animators: Query<(&AnimatorOf, &mut ClipWeights)>,
    parameters: Query<&AnimatorParameters>,
    config: Res<crate::config::ControllerConfig>,
) {
    for (AnimatorOf(root), mut weights) in animators.iter_mut() {
        let Ok(params) = parameters.get(*root) else {
            continue;
        };
        *weights = target_weights(params, &config.animation);
    }
}

pub fn apply_clip_weights(
    mut animators: Query<(&AnimatorOf, &ClipWeights, &CharacterClips, &mut AnimationPlayer)>,
    parameters: Query<&AnimatorParameters>,
    config: Res<crate::config::ControllerConfig>,
    time: Res<Time>,
) {
    let t = config.animation.weight_blend_rate * time.delta_secs();
    for (AnimatorOf(root), weights, clips, mut player) in animators.iter_mut() {
        let motion_speed = parameters.get(*root).map_or(1.0, |p| p.motion_speed);
        for (&weight, &node) in weights.iter().zip(clips.iter()) {
            if let Some(clip) = player.animation_mut(node) {
                clip.set_weight(lerp_clamped(clip.weight(), weight, t));
            }
        }
        for &node in clips.locomotion() {
            if let Some(clip) = player.animation_mut(node) {
                clip.set_speed(motion_speed.max(0.0));
            }
        }
    }
}
