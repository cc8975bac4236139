//! Yes / No / Proceed buttons: hit testing, hover tilt and click feedback.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::celebration::{Ephemeral, Rising};
use crate::config::MotionProfile;
use crate::dice::Dice;
use crate::question::UiAction;
use crate::scene::{text_font, SceneFont};
use crate::screen::Screen;

const RIPPLE_SECS: f32 = 0.6;
const RIPPLE_GROWTH: f32 = 3.0;
const MINI_HEART_SECS: f32 = 0.9;
const MINI_HEART_RISE: f32 = 40.0;
const MINI_HEART_JITTER: std::ops::Range<i32> = -8..8;
const MINI_HEART_TILT: std::ops::Range<i32> = -25..25;
const MINI_HEART_GLYPHS: [&str; 2] = ["💖", "❤"];

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiButton {
    Yes,
    No,
    Proceed,
}

impl UiButton {
    pub fn action(self) -> UiAction {
        match self {
            UiButton::Yes => UiAction::Yes,
            UiButton::No => UiAction::No,
            UiButton::Proceed => UiAction::Proceed,
        }
    }

    /// Screen the button lives on.
    pub fn screen(self) -> Screen {
        match self {
            UiButton::Yes | UiButton::No => Screen::Question,
            UiButton::Proceed => Screen::Celebrate,
        }
    }
}

/// Clickable rectangle centered on the button's transform.
#[derive(Component, Clone, Copy, Debug)]
pub struct ButtonFace {
    pub size: Vec2,
}

impl ButtonFace {
    /// Point relative to the button center, if `world` is on the face.
    pub fn local_point(&self, center: Vec2, world: Vec2) -> Option<Vec2> {
        let local = world - center;
        let half = self.size / 2.0;
        (local.x.abs() <= half.x && local.y.abs() <= half.y).then_some(local)
    }

    /// Offset from the center as a fraction of the size, y growing downward.
    fn relative(&self, local: Vec2) -> Vec2 {
        Vec2::new(local.x / self.size.x, -local.y / self.size.y)
    }
}

/// Cursor position in world space, if the cursor is over the window.
#[derive(Resource, Default, Debug)]
pub struct CursorWorld(pub Option<Vec2>);

#[derive(Event, Clone, Copy, Debug)]
pub struct ButtonPressed {
    pub entity: Entity,
    pub button: UiButton,
    /// Press point relative to the button center.
    pub at: Vec2,
}

/// Shared ripple mesh and material; without them presses skip the ripple.
#[derive(Resource, Clone)]
pub struct RippleAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<ColorMaterial>,
}

#[derive(Component)]
struct Ripple;

/// Tilt in degrees around X and Y for a relative cursor offset.
pub fn tilt_degrees(rel: Vec2, max_tilt: Vec2) -> Vec2 {
    Vec2::new(-rel.y * max_tilt.y, rel.x * max_tilt.x)
}

pub struct ButtonsPlugin;

impl Plugin for ButtonsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorWorld>()
            .add_event::<ButtonPressed>()
            .add_systems(Update, (tilt_buttons, route_presses, press_feedback, grow_ripples));
    }
}

fn tilt_buttons(
    cursor: Res<CursorWorld>,
    profile: Res<MotionProfile>,
    mut buttons: Query<(&ButtonFace, &GlobalTransform, &mut Transform), With<UiButton>>,
) {
    for (face, global, mut t) in buttons.iter_mut() {
        let center = global.translation().truncate();
        let hovered = cursor.0.and_then(|world| face.local_point(center, world));
        t.rotation = match hovered {
            Some(local) => {
                let rot = tilt_degrees(face.relative(local), profile.max_tilt);
                Quat::from_euler(EulerRot::XYZ, rot.x.to_radians(), rot.y.to_radians(), 0.0)
            }
            None => Quat::IDENTITY,
        };
    }
}

fn route_presses(mut pressed: EventReader<ButtonPressed>, mut actions: EventWriter<UiAction>) {
    for press in pressed.read() {
        actions.send(press.button.action());
    }
}

fn press_feedback(
    mut cmd: Commands,
    mut pressed: EventReader<ButtonPressed>,
    profile: Res<MotionProfile>,
    mut dice: ResMut<Dice>,
    ripple: Option<Res<RippleAssets>>,
    font: Option<Res<SceneFont>>,
) {
    let font = font.as_deref();
    for press in pressed.read() {
        let Some(mut button) = cmd.get_entity(press.entity) else {
            continue;
        };
        button.with_children(|parent| {
            if let Some(ripple) = ripple.as_deref() {
                parent.spawn((
                    Mesh2d(ripple.mesh.clone()),
                    MeshMaterial2d(ripple.material.clone()),
                    Transform::from_translation(press.at.extend(1.0)).with_scale(Vec3::ZERO),
                    Ephemeral::new(RIPPLE_SECS),
                    Ripple,
                ));
            }
            for _ in 0..profile.mini_hearts {
                let glyph = dice.pick(&MINI_HEART_GLYPHS).copied().unwrap_or("❤");
                let rng = dice.rng();
                let origin = press.at
                    + Vec2::new(
                        rng.random_range(MINI_HEART_JITTER) as f32,
                        rng.random_range(MINI_HEART_JITTER) as f32,
                    );
                let tilt = (rng.random_range(MINI_HEART_TILT) as f32).to_radians();
                parent.spawn((
                    Text2d::new(glyph),
                    text_font(font, 14.0),
                    TextColor(Color::srgb(1.0, 0.4, 0.55)),
                    Transform::from_translation(origin.extend(2.0))
                        .with_rotation(Quat::from_rotation_z(tilt)),
                    Ephemeral::new(MINI_HEART_SECS),
                    Rising {
                        origin,
                        distance: MINI_HEART_RISE,
                        alpha: 1.0,
                    },
                ));
            }
        });
    }
}

fn grow_ripples(mut ripples: Query<(&Ephemeral, &mut Transform), With<Ripple>>) {
    for (ephemeral, mut t) in ripples.iter_mut() {
        t.scale = Vec3::splat(ephemeral.lifetime.fraction() * RIPPLE_GROWTH);
    }
}

/// Longest any click feedback stays around.
pub fn feedback_lifetime() -> Duration {
    Duration::from_secs_f32(RIPPLE_SECS.max(MINI_HEART_SECS))
}
