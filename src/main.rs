//! BE MINE - a little animated proposal
//! Say yes!

mod audio;
mod buttons;
mod celebration;
mod config;
mod dice;
mod hearts;
mod question;
mod scene;
mod screen;
mod stagger;
mod typewriter;

#[cfg(test)]
mod testing;

use bevy::prelude::*;
use bevy::window::WindowMode;

use crate::audio::{AudioPrimer, MusicPlugin};
use crate::buttons::ButtonsPlugin;
use crate::celebration::CelebrationPlugin;
use crate::config::{Settings, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::dice::Dice;
use crate::hearts::{HeartSpawner, HeartsPlugin};
use crate::question::{QuestionFlow, QuestionPlugin};
use crate::scene::{ScenePlugin, BG_COLOR};
use crate::screen::ScreenPlugin;
use crate::typewriter::TypewriterPlugin;

/// Everything except rendering and raw input, so it also runs headless.
pub struct ProposalPlugin {
    settings: Settings,
}

impl ProposalPlugin {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Plugin for ProposalPlugin {
    fn build(&self, app: &mut App) {
        let profile = self.settings.motion();
        app.insert_resource(self.settings.clone())
            .insert_resource(profile)
            .insert_resource(Dice::from_settings(&self.settings))
            .insert_resource(QuestionFlow::from_settings(&self.settings))
            .insert_resource(HeartSpawner::new(&profile))
            .insert_resource(AudioPrimer::new(self.settings.music.clone()))
            .add_plugins((
                ScreenPlugin,
                TypewriterPlugin,
                QuestionPlugin,
                HeartsPlugin,
                CelebrationPlugin,
                MusicPlugin,
                ButtonsPlugin,
            ));
    }
}

fn main() {
    // Load env vars
    let _ = dotenvy::dotenv();
    let settings = Settings::from_env();

    let mode = if settings.fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
    } else {
        WindowMode::Windowed
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "BE MINE 💘".into(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                mode,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(BG_COLOR))
        .add_plugins((ProposalPlugin::new(settings), ScenePlugin))
        .run();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::{BgMusic, Gesture};
    use crate::config::DEFAULT_QUESTION;
    use crate::question::{UiAction, NO_MESSAGES};
    use crate::screen::{Screen, ScreenController, BOOT_DURATION};
    use crate::testing::{advance, child_count, headless_app, spawn_scaffold, text_of, visible_screens};

    fn active(app: &App) -> Option<Screen> {
        app.world().resource::<ScreenController>().active()
    }

    #[test]
    fn full_proposal_flow() {
        let mut app = headless_app(Settings::default());
        let scaffold = spawn_scaffold(&mut app);

        advance(&mut app, Duration::from_millis(100));
        assert_eq!(active(&app), Some(Screen::Boot));

        advance(&mut app, BOOT_DURATION);
        assert_eq!(active(&app), Some(Screen::Intro));

        app.world_mut().send_event(Gesture);
        app.world_mut().send_event(UiAction::Begin);
        advance(&mut app, Duration::from_secs(2));
        assert_eq!(active(&app), Some(Screen::Question));
        assert_eq!(text_of(&app, scaffold.question_text), DEFAULT_QUESTION);
        assert!(app.world().resource::<AudioPrimer>().is_applied());

        for message in NO_MESSAGES {
            app.world_mut().send_event(UiAction::No);
            advance(&mut app, Duration::from_secs(2));
            assert_eq!(text_of(&app, scaffold.question_text), message);
        }
        app.world_mut().send_event(UiAction::No);
        advance(&mut app, Duration::from_secs(2));
        assert_eq!(text_of(&app, scaffold.question_text), DEFAULT_QUESTION);
        assert_eq!(
            app.world().get::<Visibility>(scaffold.arrows),
            Some(&Visibility::Visible)
        );
        assert_eq!(app.world().resource::<QuestionFlow>().no_clicks(), 0);

        app.world_mut().send_event(UiAction::Yes);
        advance(&mut app, Duration::from_millis(500));
        assert_eq!(active(&app), Some(Screen::Celebrate));
        for container in scaffold.containers {
            assert!(child_count(&app, container) > 0);
        }
        // No audio backend here: the music never starts, and nothing breaks.
        let mut music = app.world_mut().query_filtered::<Entity, With<BgMusic>>();
        assert_eq!(music.iter(app.world()).count(), 0);

        app.world_mut().send_event(UiAction::Proceed);
        advance(&mut app, Duration::from_millis(100));
        assert_eq!(active(&app), Some(Screen::Confirm));
        assert_eq!(visible_screens(&mut app), vec![Screen::Confirm]);
    }
}
