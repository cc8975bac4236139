//! Ambient hearts floating behind every screen.
//!
//! Hearts loop forever and are never despawned; the spawner stops once it
//! has created `heart_cap` of them.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::{percent_x, MotionProfile, Span, WINDOW_HEIGHT};
use crate::dice::Dice;
use crate::scene::{text_font, SceneFont};
use crate::stagger::Stagger;

const LEFT: Span = Span::new(0.0, 100.0);
const DRIFT: Span = Span::new(-80.0, 80.0);
const SCALE: Span = Span::new(0.6, 1.6);
const BLUR: Span = Span::new(0.0, 2.2);
const FONT_SIZE: std::ops::Range<u32> = 20..36;
const MARGIN: f32 = 60.0;
const HEART_TINT: (f32, f32, f32) = (1.0, 0.45, 0.6);

#[derive(Component)]
pub struct HeartField;

#[derive(Component, Debug)]
pub struct FloatingHeart {
    origin_x: f32,
    drift: f32,
    duration: f32,
    age: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeartParams {
    pub glyph: &'static str,
    /// Percent of the scene width.
    pub left: f32,
    pub drift: f32,
    pub scale: f32,
    pub blur: f32,
    pub font_size: f32,
    /// Seconds for one bottom-to-top pass.
    pub duration: f32,
}

impl HeartParams {
    pub fn roll<R: Rng>(rng: &mut R, profile: &MotionProfile) -> Self {
        let glyph = if rng.random::<f32>() > 0.66 {
            "💖"
        } else if rng.random::<f32>() > 0.5 {
            "💘"
        } else {
            "❤"
        };
        Self {
            glyph,
            left: LEFT.roll(rng),
            drift: DRIFT.roll(rng),
            scale: SCALE.roll(rng),
            blur: BLUR.roll(rng),
            font_size: rng.random_range(FONT_SIZE) as f32,
            duration: profile.heart_duration.roll(rng),
        }
    }

    // No real blur in 2D; blurrier hearts are fainter.
    fn alpha(&self) -> f32 {
        0.85 - self.blur * 0.2
    }
}

#[derive(Resource, Debug)]
pub struct HeartSpawner {
    cap: usize,
    spawned: usize,
    seed: Stagger,
    interval: Option<Timer>,
}

impl HeartSpawner {
    pub fn new(profile: &MotionProfile) -> Self {
        Self {
            cap: profile.heart_cap,
            spawned: 0,
            seed: Stagger::new(profile.heart_seed_count, profile.heart_seed_gap),
            interval: Some(Timer::new(profile.heart_interval, TimerMode::Repeating)),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn is_running(&self) -> bool {
        !self.seed.is_done() || self.interval.is_some()
    }

    /// Number of hearts to create this frame.
    pub fn tick(&mut self, delta: Duration) -> usize {
        let mut count = 0;
        for _ in 0..self.seed.tick(delta) {
            if self.spawned < self.cap {
                self.spawned += 1;
                count += 1;
            }
        }

        let fired = match self.interval.as_mut() {
            Some(timer) => {
                timer.tick(delta);
                timer.times_finished_this_tick()
            }
            None => 0,
        };
        for _ in 0..fired {
            if self.spawned >= self.cap {
                self.interval = None;
                break;
            }
            self.spawned += 1;
            count += 1;
        }
        count
    }
}

pub struct HeartsPlugin;

impl Plugin for HeartsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (spawn_hearts, float_hearts));
    }
}

fn spawn_hearts(
    mut cmd: Commands,
    time: Res<Time>,
    profile: Res<MotionProfile>,
    mut spawner: ResMut<HeartSpawner>,
    mut dice: ResMut<Dice>,
    field: Query<Entity, With<HeartField>>,
    font: Option<Res<SceneFont>>,
) {
    let Ok(field) = field.get_single() else {
        return;
    };
    let was_running = spawner.is_running();
    let due = spawner.tick(time.delta());
    if was_running && !spawner.is_running() {
        debug!("heart field full at {} hearts", spawner.cap());
    }
    if due == 0 {
        return;
    }

    let font = font.as_deref();
    cmd.entity(field).with_children(|parent| {
        for _ in 0..due {
            let p = HeartParams::roll(dice.rng(), &profile);
            let (r, g, b) = HEART_TINT;
            let x = percent_x(p.left);
            parent.spawn((
                Text2d::new(p.glyph),
                text_font(font, p.font_size),
                TextColor(Color::srgba(r, g, b, p.alpha())),
                Transform::from_xyz(x, -WINDOW_HEIGHT / 2.0 - MARGIN, 0.0)
                    .with_scale(Vec3::splat(p.scale)),
                FloatingHeart {
                    origin_x: x,
                    drift: p.drift,
                    duration: p.duration,
                    age: 0.0,
                },
            ));
        }
    });
}

fn float_hearts(time: Res<Time>, mut hearts: Query<(&mut FloatingHeart, &mut Transform)>) {
    let travel = WINDOW_HEIGHT + MARGIN * 2.0;
    for (mut heart, mut t) in hearts.iter_mut() {
        heart.age += time.delta_secs();
        let progress = (heart.age % heart.duration) / heart.duration;
        t.translation.y = -WINDOW_HEIGHT / 2.0 - MARGIN + travel * progress;
        t.translation.x = heart.origin_x + heart.drift * progress;
    }
}
