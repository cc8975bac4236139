//! Confetti, sparkles and heart bursts after the "yes".
//!
//! Each generator fires a staggered burst and then drizzles single elements
//! until its stop time. Every element despawns itself when its lifetime ends.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use bevy::color::Alpha;
use bevy::prelude::*;
use rand::Rng;

use crate::config::{percent_x, percent_y, EffectTiming, MotionProfile, Span, WINDOW_HEIGHT};
use crate::dice::Dice;
use crate::scene::{text_font, SceneFont};
use crate::stagger::Stagger;

const CONFETTI_PALETTE: [(u8, u8, u8); 6] = [
    (0xff, 0x8f, 0xab),
    (0xff, 0x4d, 0x6d),
    (0xff, 0xc2, 0xd1),
    (0xff, 0xd6, 0xe0),
    (0xff, 0xe5, 0xec),
    (0xff, 0xff, 0xff),
];
const CONFETTI_OPACITY: f32 = 0.95;
const CONFETTI_WIDTH: std::ops::Range<u32> = 6..12;
const CONFETTI_HEIGHT: std::ops::Range<u32> = 10..18;
const CONFETTI_X: Span = Span::new(2.0, 98.0);
const CONFETTI_FALL: Span = Span::new(3.2, 5.2);
const CONFETTI_SPIN_MS: std::ops::Range<u32> = 800..1600;

const SPARKLE_SIZE: std::ops::Range<u32> = 6..14;
const SPARKLE_POS: Span = Span::new(0.0, 100.0);
const SPARKLE_TWINKLE_MS: Span = Span::new(1200.0, 2200.0);

const BURST_GLYPHS: [&str; 2] = ["💖", "❤"];
const BURST_X: Span = Span::new(8.0, 92.0);
const BURST_Y: Span = Span::new(68.0, 88.0);
const BURST_SIZE: std::ops::Range<u32> = 18..34;
pub const BURST_HEART_LIFETIME: Span = Span::new(2.2, 3.2);
const BURST_RISE: f32 = 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Confetti,
    Sparkle,
    BurstHeart,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [EffectKind::Confetti, EffectKind::Sparkle, EffectKind::BurstHeart];

    pub fn timing(self, profile: &MotionProfile) -> EffectTiming {
        match self {
            EffectKind::Confetti => profile.confetti,
            EffectKind::Sparkle => profile.sparkles,
            EffectKind::BurstHeart => profile.heart_burst,
        }
    }

    /// Longest lifetime an element of this kind can have.
    pub fn max_lifetime(self) -> Duration {
        let secs = match self {
            EffectKind::Confetti => CONFETTI_FALL.max,
            EffectKind::Sparkle => SPARKLE_TWINKLE_MS.max / 1000.0,
            EffectKind::BurstHeart => BURST_HEART_LIFETIME.max,
        };
        Duration::from_secs_f32(secs)
    }
}

/// Parent of every element of one kind.
#[derive(Component, Clone, Copy, Debug)]
pub struct EffectContainer(pub EffectKind);

#[derive(Event, Clone, Copy, Debug)]
pub struct CelebrationStarted;

/// Despawned when the lifetime runs out.
#[derive(Component, Debug)]
pub struct Ephemeral {
    pub lifetime: Timer,
}

impl Ephemeral {
    pub fn new(secs: f32) -> Self {
        Self {
            lifetime: Timer::from_seconds(secs, TimerMode::Once),
        }
    }
}

/// Moves `distance` up over the lifetime while fading out.
#[derive(Component, Debug)]
pub struct Rising {
    pub origin: Vec2,
    pub distance: f32,
    pub alpha: f32,
}

#[derive(Component, Debug)]
struct Falling {
    origin: Vec2,
    distance: f32,
    spin_period: f32,
}

#[derive(Component, Debug)]
struct Twinkle;

#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiParams {
    pub width: f32,
    pub height: f32,
    /// Percent of the scene width.
    pub x: f32,
    pub fall: f32,
    pub spin: f32,
    pub color: (u8, u8, u8),
}

impl ConfettiParams {
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            width: rng.random_range(CONFETTI_WIDTH) as f32,
            height: rng.random_range(CONFETTI_HEIGHT) as f32,
            x: CONFETTI_X.roll(rng),
            fall: CONFETTI_FALL.roll(rng),
            spin: rng.random_range(CONFETTI_SPIN_MS) as f32 / 1000.0,
            color: CONFETTI_PALETTE[rng.random_range(0..CONFETTI_PALETTE.len())],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SparkleParams {
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub twinkle: f32,
}

impl SparkleParams {
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            size: rng.random_range(SPARKLE_SIZE) as f32,
            x: SPARKLE_POS.roll(rng),
            y: SPARKLE_POS.roll(rng),
            twinkle: SPARKLE_TWINKLE_MS.roll(rng) / 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BurstHeartParams {
    pub glyph: &'static str,
    pub x: f32,
    /// Percent from the top.
    pub y: f32,
    pub size: f32,
    pub lifetime: f32,
}

impl BurstHeartParams {
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            glyph: if rng.random::<f32>() > 0.5 {
                BURST_GLYPHS[0]
            } else {
                BURST_GLYPHS[1]
            },
            x: BURST_X.roll(rng),
            y: BURST_Y.roll(rng),
            size: rng.random_range(BURST_SIZE) as f32,
            lifetime: BURST_HEART_LIFETIME.roll(rng),
        }
    }
}

#[derive(Debug)]
struct Generator {
    kind: EffectKind,
    burst: Stagger,
    drizzle: Option<Timer>,
    stop: Timer,
}

impl Generator {
    fn new(kind: EffectKind, timing: EffectTiming) -> Self {
        Self {
            kind,
            burst: Stagger::new(timing.burst, timing.stagger),
            drizzle: Some(Timer::new(timing.drizzle, TimerMode::Repeating)),
            stop: Timer::new(timing.stop_after, TimerMode::Once),
        }
    }

    /// Elements due this frame.
    fn tick(&mut self, delta: Duration) -> usize {
        let mut due = self.burst.tick(delta);

        let remaining = self.stop.remaining();
        self.stop.tick(delta);
        if let Some(drizzle) = self.drizzle.as_mut() {
            drizzle.tick(delta.min(remaining));
            due += drizzle.times_finished_this_tick() as usize;
        }
        if self.stop.finished() {
            self.drizzle = None;
        }
        due
    }

    fn is_finished(&self) -> bool {
        self.burst.is_done() && self.drizzle.is_none()
    }
}

/// Running generators. Started together; nothing else ties them.
#[derive(Resource, Default, Debug)]
pub struct Celebration {
    generators: Vec<Generator>,
    started: usize,
}

impl Celebration {
    pub fn start(&mut self, profile: &MotionProfile) {
        self.started += 1;
        self.generators.extend(
            EffectKind::ALL
                .into_iter()
                .map(|kind| Generator::new(kind, kind.timing(profile))),
        );
    }

    pub fn started_count(&self) -> usize {
        self.started
    }

    pub fn is_running(&self) -> bool {
        !self.generators.is_empty()
    }
}

pub struct CelebrationPlugin;

impl Plugin for CelebrationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Celebration>()
            .add_event::<CelebrationStarted>()
            .add_systems(
                Update,
                (
                    start_celebration,
                    run_generators,
                    (expire_ephemeral, animate_falling, animate_twinkle, animate_rising),
                )
                    .chain(),
            );
    }
}

fn start_celebration(
    mut started: EventReader<CelebrationStarted>,
    profile: Res<MotionProfile>,
    mut celebration: ResMut<Celebration>,
) {
    for _ in started.read() {
        celebration.start(&profile);
    }
}

fn run_generators(
    mut cmd: Commands,
    time: Res<Time>,
    mut celebration: ResMut<Celebration>,
    mut dice: ResMut<Dice>,
    containers: Query<(Entity, &EffectContainer)>,
    font: Option<Res<SceneFont>>,
) {
    let font = font.as_deref();
    let had_generators = celebration.is_running();
    for generator in celebration.generators.iter_mut() {
        let due = generator.tick(time.delta());
        if due == 0 {
            continue;
        }
        let Some((container, _)) = containers.iter().find(|(_, c)| c.0 == generator.kind) else {
            continue;
        };
        cmd.entity(container).with_children(|parent| {
            for _ in 0..due {
                match generator.kind {
                    EffectKind::Confetti => spawn_confetti(parent, ConfettiParams::roll(dice.rng())),
                    EffectKind::Sparkle => spawn_sparkle(parent, SparkleParams::roll(dice.rng())),
                    EffectKind::BurstHeart => {
                        spawn_burst_heart(parent, BurstHeartParams::roll(dice.rng()), font)
                    }
                }
            }
        });
    }
    celebration.generators.retain(|g| !g.is_finished());
    if had_generators && !celebration.is_running() {
        debug!("celebration effects finished");
    }
}

fn spawn_confetti(parent: &mut ChildBuilder, p: ConfettiParams) {
    let (r, g, b) = p.color;
    let origin = Vec2::new(percent_x(p.x), WINDOW_HEIGHT / 2.0 + 20.0);
    parent.spawn((
        Sprite::from_color(
            Color::srgba_u8(r, g, b, (CONFETTI_OPACITY * 255.0) as u8),
            Vec2::new(p.width, p.height),
        ),
        Transform::from_translation(origin.extend(2.0)),
        Ephemeral::new(p.fall),
        Falling {
            origin,
            distance: WINDOW_HEIGHT + 40.0,
            spin_period: p.spin,
        },
    ));
}

fn spawn_sparkle(parent: &mut ChildBuilder, p: SparkleParams) {
    parent.spawn((
        Sprite::from_color(Color::srgba(1.0, 0.97, 0.85, 0.9), Vec2::splat(p.size)),
        Transform::from_xyz(percent_x(p.x), percent_y(p.y), 3.0)
            .with_rotation(Quat::from_rotation_z(PI / 4.0))
            .with_scale(Vec3::ZERO),
        Ephemeral::new(p.twinkle),
        Twinkle,
    ));
}

fn spawn_burst_heart(parent: &mut ChildBuilder, p: BurstHeartParams, font: Option<&SceneFont>) {
    let origin = Vec2::new(percent_x(p.x), percent_y(p.y));
    parent.spawn((
        Text2d::new(p.glyph),
        text_font(font, p.size),
        TextColor(Color::srgb(1.0, 0.3, 0.45)),
        Transform::from_translation(origin.extend(4.0)),
        Ephemeral::new(p.lifetime),
        Rising {
            origin,
            distance: BURST_RISE,
            alpha: 1.0,
        },
    ));
}

fn expire_ephemeral(
    mut cmd: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Ephemeral)>,
) {
    for (entity, mut ephemeral) in q.iter_mut() {
        ephemeral.lifetime.tick(time.delta());
        if ephemeral.lifetime.finished() {
            cmd.entity(entity).despawn_recursive();
        }
    }
}

fn animate_falling(mut q: Query<(&Ephemeral, &Falling, &mut Transform)>) {
    for (ephemeral, falling, mut t) in q.iter_mut() {
        let elapsed = ephemeral.lifetime.elapsed_secs();
        let f = ephemeral.lifetime.fraction();
        let sway = (elapsed * 3.0 + falling.origin.x).sin() * 12.0;
        t.translation.x = falling.origin.x + sway;
        t.translation.y = falling.origin.y - falling.distance * f;
        t.rotation = Quat::from_rotation_z(elapsed / falling.spin_period * TAU);
    }
}

fn animate_twinkle(mut q: Query<(&Ephemeral, &mut Transform), With<Twinkle>>) {
    for (ephemeral, mut t) in q.iter_mut() {
        let k = (ephemeral.lifetime.fraction() * PI).sin();
        t.scale = Vec3::splat(k);
    }
}

fn animate_rising(mut q: Query<(&Ephemeral, &Rising, &mut Transform, &mut TextColor)>) {
    for (ephemeral, rising, mut t, mut color) in q.iter_mut() {
        let f = ephemeral.lifetime.fraction();
        t.translation.x = rising.origin.x;
        t.translation.y = rising.origin.y + rising.distance * f;
        color.0.set_alpha(rising.alpha * (1.0 - f));
    }
}
