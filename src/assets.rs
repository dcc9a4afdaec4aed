use bevy::prelude::*;
use bevy_asset_loader::prelude::*;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    AssetLoading,
    Playing,
}

#[derive(Resource, AssetCollection)]
pub struct GameAssets {
    #[asset(path = "character.glb#Scene0")]
    pub character: Handle<Scene>,

    /// Idle, walk, run, jump, free fall, crouch idle, crouch walk, prone idle
    /// and prone crawl, in that order.
    #[asset(
        paths(
            "character.glb#Animation0",
            "character.glb#Animation1",
            "character.glb#Animation2",
            "character.glb#Animation3",
            "character.glb#Animation4",
            "character.glb#Animation5",
            "character.glb#Animation6",
            "character.glb#Animation7",
            "character.glb#Animation8",
        ),
        collection(typed)
    )]
    pub character_clips: Vec<Handle<AnimationClip>>,
}

pub struct AssetPlugin;

impl Plugin for AssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_loading_state(
                LoadingState::new(GameState::AssetLoading)
                    .continue_to_state(GameState::Playing)
                    .on_failure_continue_to_state(GameState::Playing)
                    .load_collection::<GameAssets>(),
            )
            .add_systems(OnEnter(GameState::Playing), report_missing_assets);
    }
}

/// Without the character model the game still runs, with capsule stand-ins.
fn report_missing_assets(assets: Option<Res<GameAssets>>) {
    if assets.is_none() {
        warn!("character.glb failed to load, characters use a placeholder capsule");
    }
}
