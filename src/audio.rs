//! Background music: attached on the first gesture, played on "yes".

use bevy::audio::{AudioSinkPlayback, PlaybackMode, Volume};
use bevy::prelude::*;

pub const MUSIC_VOLUME: f32 = 0.6;

/// Any click or key press.
#[derive(Event, Clone, Copy, Debug)]
pub struct Gesture;

/// Unmute and play the background music.
#[derive(Event, Clone, Copy, Debug)]
pub struct MusicRequest;

#[derive(Component)]
pub struct BgMusic;

/// Holds the deferred music source until the first gesture.
#[derive(Resource, Debug)]
pub struct AudioPrimer {
    deferred: Option<String>,
    applied: bool,
    listening: bool,
}

impl AudioPrimer {
    pub fn new(deferred: Option<String>) -> Self {
        Self {
            deferred,
            applied: false,
            listening: true,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Stops listening; returns the source to load the first time only.
    pub fn on_gesture(&mut self) -> Option<String> {
        if !self.listening {
            return None;
        }
        self.listening = false;
        if self.applied {
            return None;
        }
        let source = self.deferred.clone()?;
        self.applied = true;
        Some(source)
    }
}

pub struct MusicPlugin;

impl Plugin for MusicPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Gesture>()
            .add_event::<MusicRequest>()
            .add_systems(Update, (prime_on_gesture, play_music).chain());
    }
}

fn prime_on_gesture(
    mut cmd: Commands,
    mut gestures: EventReader<Gesture>,
    mut primer: ResMut<AudioPrimer>,
    assets: Option<Res<AssetServer>>,
) {
    if gestures.is_empty() {
        return;
    }
    gestures.clear();
    if !primer.is_listening() {
        return;
    }

    let Some(source) = primer.on_gesture() else {
        return;
    };
    let Some(assets) = assets else {
        debug!("no asset server, music stays off");
        return;
    };

    // Loaded silent and paused; the "yes" handler turns it up.
    cmd.spawn((
        AudioPlayer::new(assets.load(source)),
        PlaybackSettings {
            mode: PlaybackMode::Loop,
            volume: Volume::new(0.0),
            paused: true,
            ..default()
        },
        BgMusic,
    ));
}

fn play_music(mut requests: EventReader<MusicRequest>, sinks: Query<&AudioSink, With<BgMusic>>) {
    for _ in requests.read() {
        match sinks.get_single() {
            Ok(sink) => {
                sink.set_volume(MUSIC_VOLUME);
                sink.play();
                info!("Music playing");
            }
            Err(_) => debug!("music not ready, staying muted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::question::UiAction;
    use crate::testing::{advance, headless_app, spawn_scaffold};
    use std::time::Duration;

    #[test]
    fn first_gesture_applies_source_once() {
        let mut primer = AudioPrimer::new(Some("sounds/music.ogg".into()));
        assert!(primer.is_listening());
        assert_eq!(primer.on_gesture().as_deref(), Some("sounds/music.ogg"));
        assert!(primer.is_applied());
        assert!(!primer.is_listening());
        assert_eq!(primer.on_gesture(), None);
    }

    #[test]
    fn no_source_still_stops_listening() {
        let mut primer = AudioPrimer::new(None);
        assert_eq!(primer.on_gesture(), None);
        assert!(!primer.is_applied());
        assert!(!primer.is_listening());
    }

    #[test]
    fn gestures_prime_without_an_asset_server() {
        let mut app = headless_app(Settings::default());
        app.world_mut().send_event(Gesture);
        app.world_mut().send_event(Gesture);
        app.update();

        let primer = app.world().resource::<AudioPrimer>();
        assert!(primer.is_applied());
        assert!(!primer.is_listening());
    }

    #[test]
    fn yes_without_loaded_music_stays_quiet() {
        let mut app = headless_app(Settings::default());
        spawn_scaffold(&mut app);
        app.world_mut().send_event(UiAction::Yes);
        advance(&mut app, Duration::from_millis(100));

        let mut music = app.world_mut().query_filtered::<Entity, With<BgMusic>>();
        assert_eq!(music.iter(app.world()).count(), 0);
    }
}
