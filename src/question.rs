//! The yes/no question: rotating "no" messages and the one-shot "yes".

use std::f32::consts::PI;
use std::time::Duration;

use bevy::color::Alpha;
use bevy::prelude::*;

use crate::audio::MusicRequest;
use crate::buttons::UiButton;
use crate::celebration::CelebrationStarted;
use crate::config::{MotionProfile, Settings};
use crate::screen::{Screen, SwitchScreen};
use crate::typewriter::{Typewriter, DEFAULT_TYPE_STEP};

pub const NO_MESSAGES: [&str; 4] = [
    "Are you sure?",
    "Think again 💕",
    "That would break my heart…",
    "Last chance 😢",
];

const BOUNCE_DURATION: Duration = Duration::from_millis(600);
const BOUNCE_LIFT: f32 = 6.0;
const BOUNCE_GROW: f32 = 0.06;

/// What the user did, already resolved to its meaning.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    Begin,
    Yes,
    No,
    Proceed,
}

#[derive(Component)]
pub struct QuestionText;

/// Arrows pointing at the Yes button.
#[derive(Component)]
pub struct Arrows;

/// Glow on the Yes button.
#[derive(Component)]
pub struct Neon;

#[derive(Component)]
pub struct NeonHalo;

#[derive(Component)]
pub struct Bounce {
    timer: Timer,
    base_y: f32,
    base_scale: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionState {
    ShowingQuestion,
    ShowingDecline(usize),
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoOutcome<'a> {
    Decline(&'a str),
    /// Every message was shown; back to the question, pointing at Yes.
    Reset(&'a str),
}

#[derive(Resource, Clone, Debug)]
pub struct QuestionFlow {
    original: String,
    messages: Vec<String>,
    no_clicks: usize,
    committed: bool,
}

impl QuestionFlow {
    pub fn new<S: Into<String>>(original: impl Into<String>, messages: impl IntoIterator<Item = S>) -> Self {
        Self {
            original: original.into(),
            messages: messages.into_iter().map(Into::into).collect(),
            no_clicks: 0,
            committed: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.question.clone(), NO_MESSAGES)
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn no_clicks(&self) -> usize {
        self.no_clicks
    }

    pub fn state(&self) -> QuestionState {
        match (self.committed, self.no_clicks) {
            (true, _) => QuestionState::Committed,
            (false, 0) => QuestionState::ShowingQuestion,
            (false, k) => QuestionState::ShowingDecline(k - 1),
        }
    }

    pub fn decline(&mut self) -> NoOutcome<'_> {
        if self.no_clicks < self.messages.len() {
            let index = self.no_clicks;
            self.no_clicks += 1;
            NoOutcome::Decline(&self.messages[index])
        } else {
            self.no_clicks = 0;
            NoOutcome::Reset(&self.original)
        }
    }

    /// Latches the answer. True only the first time.
    pub fn commit(&mut self) -> bool {
        !std::mem::replace(&mut self.committed, true)
    }
}

pub struct QuestionPlugin;

impl Plugin for QuestionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<UiAction>().add_systems(
            Update,
            (begin_question, answer_no, answer_yes, proceed, play_bounce, glow_neon),
        );
    }
}

fn begin_question(
    mut actions: EventReader<UiAction>,
    flow: Res<QuestionFlow>,
    profile: Res<MotionProfile>,
    mut typewriter: ResMut<Typewriter>,
    question_text: Query<Entity, With<QuestionText>>,
    mut switch: EventWriter<SwitchScreen>,
) {
    for action in actions.read() {
        if *action != UiAction::Begin {
            continue;
        }
        switch.send(SwitchScreen(Screen::Question));
        if let Ok(target) = question_text.get_single() {
            typewriter.start(target, flow.original(), profile.type_step(DEFAULT_TYPE_STEP));
        }
    }
}

fn answer_no(
    mut cmd: Commands,
    mut actions: EventReader<UiAction>,
    mut flow: ResMut<QuestionFlow>,
    profile: Res<MotionProfile>,
    mut typewriter: ResMut<Typewriter>,
    question_text: Query<Entity, With<QuestionText>>,
    mut arrows: Query<&mut Visibility, With<Arrows>>,
    buttons: Query<(Entity, &UiButton, &Transform, Option<&Bounce>)>,
) {
    for action in actions.read() {
        if *action != UiAction::No {
            continue;
        }
        if typewriter.is_typing() {
            typewriter.cancel();
        }

        let step = profile.type_step(DEFAULT_TYPE_STEP);
        let target = question_text.get_single().ok();
        let yes = buttons.iter().find(|(_, b, _, _)| **b == UiButton::Yes);

        match flow.decline() {
            NoOutcome::Decline(message) => {
                if let Some(target) = target {
                    typewriter.start(target, message, step);
                }
                for mut vis in arrows.iter_mut() {
                    *vis = Visibility::Hidden;
                }
                if let Some((entity, ..)) = yes {
                    cmd.entity(entity).remove::<Neon>();
                }
            }
            NoOutcome::Reset(original) => {
                if let Some(target) = target {
                    typewriter.start(target, original, step);
                }
                for mut vis in arrows.iter_mut() {
                    *vis = Visibility::Visible;
                }
                if let Some((entity, _, transform, running)) = yes {
                    let (base_y, base_scale) = running.map_or(
                        (transform.translation.y, transform.scale),
                        |b| (b.base_y, b.base_scale),
                    );
                    cmd.entity(entity).insert((
                        Neon,
                        Bounce {
                            timer: Timer::new(BOUNCE_DURATION, TimerMode::Once),
                            base_y,
                            base_scale,
                        },
                    ));
                }
            }
        }
    }
}

fn answer_yes(
    mut actions: EventReader<UiAction>,
    mut flow: ResMut<QuestionFlow>,
    mut switch: EventWriter<SwitchScreen>,
    mut celebrate: EventWriter<CelebrationStarted>,
    mut music: EventWriter<MusicRequest>,
) {
    for action in actions.read() {
        if *action != UiAction::Yes || !flow.commit() {
            continue;
        }
        info!("Answered yes, starting the celebration");
        switch.send(SwitchScreen(Screen::Celebrate));
        celebrate.send(CelebrationStarted);
        music.send(MusicRequest);
    }
}

fn proceed(mut actions: EventReader<UiAction>, mut switch: EventWriter<SwitchScreen>) {
    for action in actions.read() {
        if *action == UiAction::Proceed {
            switch.send(SwitchScreen(Screen::Confirm));
        }
    }
}

fn play_bounce(
    mut cmd: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Bounce, &mut Transform)>,
) {
    for (entity, mut bounce, mut t) in q.iter_mut() {
        bounce.timer.tick(time.delta());
        if bounce.timer.finished() {
            t.translation.y = bounce.base_y;
            t.scale = bounce.base_scale;
            cmd.entity(entity).remove::<Bounce>();
            continue;
        }
        let k = (bounce.timer.fraction() * PI).sin();
        t.translation.y = bounce.base_y + BOUNCE_LIFT * k;
        t.scale = bounce.base_scale * (1.0 + BOUNCE_GROW * k);
    }
}

fn glow_neon(
    time: Res<Time>,
    buttons: Query<(Has<Neon>, &Children), With<UiButton>>,
    mut halos: Query<(&mut Visibility, &mut Sprite), With<NeonHalo>>,
) {
    let alpha = 0.45 + (time.elapsed_secs() * 4.0).sin() * 0.2;
    for (lit, children) in buttons.iter() {
        for child in children.iter() {
            let Ok((mut vis, mut sprite)) = halos.get_mut(*child) else {
                continue;
            };
            *vis = if lit {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            if lit {
                sprite.color = sprite.color.with_alpha(alpha);
            }
        }
    }
}
