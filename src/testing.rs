//! Headless app and a minimal stand-in for the scene, shared by unit tests.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::buttons::{ButtonFace, UiButton};
use crate::celebration::{EffectContainer, EffectKind};
use crate::config::Settings;
use crate::hearts::HeartField;
use crate::question::{Arrows, NeonHalo, QuestionText};
use crate::screen::{Screen, ScreenRoot};
use crate::ProposalPlugin;

pub const STEP: Duration = Duration::from_millis(20);

pub struct Scaffold {
    pub question_text: Entity,
    pub arrows: Entity,
    pub yes: Entity,
    pub no: Entity,
    pub proceed: Entity,
    pub containers: [Entity; 3],
    pub heart_field: Entity,
}

/// App with every headless plugin and a fixed time step. Seeded unless the
/// settings already carry a seed.
pub fn headless_app(settings: Settings) -> App {
    let settings = Settings {
        seed: settings.seed.or(Some(1)),
        ..settings
    };
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .add_plugins(ProposalPlugin::new(settings));
    app
}

/// Runs enough frames to cover `span`, plus a little slack.
pub fn advance(app: &mut App, span: Duration) {
    let frames = span.as_millis() / STEP.as_millis() + 2;
    for _ in 0..frames {
        app.update();
    }
}

pub fn spawn_scaffold(app: &mut App) -> Scaffold {
    let world = app.world_mut();
    let face = ButtonFace {
        size: Vec2::new(160.0, 60.0),
    };

    let question_text = world.spawn((Text2d::new(""), QuestionText)).id();
    let arrows = world
        .spawn((Transform::default(), Visibility::Hidden, Arrows))
        .id();
    let halo = world
        .spawn((Sprite::default(), Visibility::Hidden, NeonHalo))
        .id();
    let yes = world
        .spawn((Transform::default(), UiButton::Yes, face))
        .add_children(&[halo])
        .id();
    let no = world.spawn((Transform::default(), UiButton::No, face)).id();
    let proceed = world
        .spawn((Transform::default(), UiButton::Proceed, face))
        .id();
    let containers = EffectKind::ALL.map(|kind| {
        world
            .spawn((EffectContainer(kind), Transform::default(), Visibility::Inherited))
            .id()
    });
    let heart_field = world
        .spawn((HeartField, Transform::default(), Visibility::Visible))
        .id();

    for screen in Screen::ALL {
        let mut root = world.spawn((ScreenRoot(screen), Transform::default(), Visibility::Hidden));
        match screen {
            Screen::Question => {
                root.add_children(&[question_text, arrows, yes, no]);
            }
            Screen::Celebrate => {
                root.add_children(&[proceed]);
                root.add_children(&containers);
            }
            _ => {}
        }
    }

    Scaffold {
        question_text,
        arrows,
        yes,
        no,
        proceed,
        containers,
        heart_field,
    }
}

pub fn visible_screens(app: &mut App) -> Vec<Screen> {
    let mut roots = app.world_mut().query::<(&ScreenRoot, &Visibility)>();
    let mut shown: Vec<Screen> = roots
        .iter(app.world())
        .filter(|(_, vis)| **vis == Visibility::Visible)
        .map(|(root, _)| root.0)
        .collect();
    shown.sort_by_key(|s| Screen::ALL.iter().position(|x| x == s));
    shown
}

pub fn text_of(app: &App, entity: Entity) -> String {
    app.world()
        .get::<Text2d>(entity)
        .map(|t| t.0.clone())
        .unwrap_or_default()
}

pub fn child_count(app: &App, entity: Entity) -> usize {
    app.world().get::<Children>(entity).map_or(0, |c| c.len())
}
