//! Spawns everything on screen and turns raw mouse and keyboard input into
//! gestures, button presses and screen actions.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy::window::PrimaryWindow;

use crate::audio::Gesture;
use crate::buttons::{ButtonFace, ButtonPressed, CursorWorld, RippleAssets, UiButton};
use crate::celebration::{EffectContainer, EffectKind};
use crate::config::{Settings, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::hearts::HeartField;
use crate::question::{Arrows, NeonHalo, QuestionText, UiAction};
use crate::screen::{Focus, FocusTarget, Screen, ScreenController, ScreenRoot};

// COLORS
pub const BG_COLOR: Color = Color::srgb(0.12, 0.04, 0.09);
const TEXT_PINK: Color = Color::srgb(1.0, 0.82, 0.88);
const TEXT_SOFT: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);
const YES_COLOR: Color = Color::srgb(1.0, 0.3, 0.43);
const NO_COLOR: Color = Color::srgb(0.36, 0.26, 0.33);
const PROCEED_COLOR: Color = Color::srgb(0.95, 0.45, 0.6);
const NEON_COLOR: Color = Color::srgba(1.0, 0.45, 0.7, 0.45);
const RIPPLE_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

// Sizes
const BUTTON_W: f32 = 180.0;
const BUTTON_H: f32 = 64.0;
const BUTTON_GAP: f32 = 240.0;
const NEON_SPREAD: f32 = 28.0;

/// Font able to draw the heart glyphs. Only present once it has loaded.
#[derive(Resource, Clone)]
pub struct SceneFont(pub Handle<Font>);

#[derive(Resource)]
struct PendingFont(Handle<Font>);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FontProgress {
    Waiting,
    Ready,
    Unavailable,
}

fn font_progress(state: Option<LoadState>) -> FontProgress {
    match state {
        Some(LoadState::Loaded) => FontProgress::Ready,
        Some(LoadState::NotLoaded | LoadState::Loading) => FontProgress::Waiting,
        Some(LoadState::Failed(_)) | None => FontProgress::Unavailable,
    }
}

pub fn text_font(font: Option<&SceneFont>, size: f32) -> TextFont {
    TextFont {
        font: font.map(|f| f.0.clone()).unwrap_or_default(),
        font_size: size,
        ..default()
    }
}

/// Slow scale oscillation on titles.
#[derive(Component)]
struct Breathe {
    rate: f32,
    depth: f32,
}

impl Breathe {
    const fn new(rate: f32) -> Self {
        Self { rate, depth: 0.05 }
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (report_settings, setup))
            .add_systems(
                Update,
                (
                    track_cursor,
                    (gesture_input, click_input, focus_input),
                    (await_font, adopt_scene_font).chain(),
                    breathe,
                )
                    .chain(),
            );
    }
}

fn report_settings(settings: Res<Settings>) {
    for problem in &settings.warnings {
        warn!("Ignoring bad setting: {}", problem);
    }
    info!(
        "Reduced motion: {}, music: {}",
        settings.reduced_motion,
        settings.music.as_deref().unwrap_or("off")
    );
}

/// Rounded rectangle as a triangle fan around its center, with
/// `corner_segments` edges per rounded corner.
fn rounded_rect(size: Vec2, radius: f32, corner_segments: u32) -> Mesh {
    use bevy::render::mesh::{Indices, PrimitiveTopology};

    let segments = corner_segments.max(1);
    let half = size / 2.0;
    let r = radius.clamp(0.0, half.min_element());
    let inner = half - Vec2::splat(r);
    // Counter-clockwise from the top-right corner.
    let centers = [
        inner,
        Vec2::new(-inner.x, inner.y),
        -inner,
        Vec2::new(inner.x, -inner.y),
    ];
    let rim: Vec<Vec2> = centers
        .into_iter()
        .enumerate()
        .flat_map(|(quarter, center)| {
            (0..=segments).map(move |i| {
                let turn = quarter as f32 + i as f32 / segments as f32;
                center + Vec2::from_angle(turn * std::f32::consts::FRAC_PI_2) * r
            })
        })
        .collect();

    let outline = std::iter::once(Vec2::ZERO).chain(rim.iter().copied());
    let positions: Vec<[f32; 3]> = outline.clone().map(|p| [p.x, p.y, 0.0]).collect();
    let uvs: Vec<[f32; 2]> = outline
        .map(|p| [p.x / size.x + 0.5, 0.5 - p.y / size.y])
        .collect();
    let n = rim.len() as u32;
    let indices: Vec<u32> = (0..n).flat_map(|i| [0, i + 1, (i + 1) % n + 1]).collect();

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

/// Keeps the visible world inside the 1280x720 scene on any window, so
/// percent positions always span the whole view.
fn scene_projection() -> OrthographicProjection {
    OrthographicProjection {
        scaling_mode: ScalingMode::AutoMax {
            max_width: WINDOW_WIDTH,
            max_height: WINDOW_HEIGHT,
        },
        ..OrthographicProjection::default_2d()
    }
}

fn setup(
    mut cmd: Commands,
    settings: Res<Settings>,
    assets: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<ColorMaterial>>,
) {
    cmd.spawn((Camera2d, scene_projection()));

    // Everything starts on the built-in font; the configured one is swapped
    // in by `adopt_scene_font` after it loads.
    if let Some(path) = &settings.font {
        cmd.insert_resource(PendingFont(assets.load(path.clone())));
    }

    cmd.insert_resource(RippleAssets {
        mesh: meshes.add(Circle::new(18.0)),
        material: mats.add(ColorMaterial::from(RIPPLE_COLOR)),
    });

    // Behind every screen
    cmd.spawn((HeartField, Transform::from_xyz(0.0, 0.0, -5.0), Visibility::Visible));

    let button_mesh = meshes.add(rounded_rect(Vec2::new(BUTTON_W, BUTTON_H), 22.0, 6));

    for screen in Screen::ALL {
        cmd.spawn((ScreenRoot(screen), Transform::default(), Visibility::Hidden))
            .with_children(|root| match screen {
                Screen::Boot => {
                    root.spawn((
                        Text2d::new("💘"),
                        text_font(None, 96.0),
                        TextColor(YES_COLOR),
                        Transform::from_xyz(0.0, 40.0, 10.0),
                        Breathe::new(4.0),
                    ));
                    root.spawn((
                        Text2d::new("warming up a heart…"),
                        text_font(None, 26.0),
                        TextColor(TEXT_SOFT),
                        Transform::from_xyz(0.0, -60.0, 10.0),
                    ));
                }
                Screen::Intro => {
                    root.spawn((
                        Text2d::new("I have something to ask you 💌"),
                        text_font(None, 48.0),
                        TextColor(TEXT_PINK),
                        Transform::from_xyz(0.0, 40.0, 10.0),
                        Breathe::new(2.0),
                    ));
                    root.spawn((
                        Text2d::new("Click anywhere to continue"),
                        text_font(None, 24.0),
                        TextColor(TEXT_SOFT),
                        Transform::from_xyz(0.0, -60.0, 10.0),
                    ));
                }
                Screen::Question => {
                    root.spawn((
                        Text2d::new(""),
                        text_font(None, 48.0),
                        TextColor(TEXT_PINK),
                        Transform::from_xyz(0.0, 140.0, 10.0),
                        QuestionText,
                    ));
                    root.spawn((
                        Text2d::new("➜ ➜ ➜"),
                        text_font(None, 32.0),
                        TextColor(YES_COLOR),
                        Transform::from_xyz(-BUTTON_GAP / 2.0 - BUTTON_W, -40.0, 10.0),
                        Visibility::Hidden,
                        Arrows,
                    ));
                    let yes = ButtonLook {
                        label: "Yes 💖",
                        pos: Vec2::new(-BUTTON_GAP / 2.0, -40.0),
                        color: YES_COLOR,
                    };
                    spawn_button(root, UiButton::Yes, yes, &button_mesh, &mut mats);
                    let no = ButtonLook {
                        label: "No",
                        pos: Vec2::new(BUTTON_GAP / 2.0, -40.0),
                        color: NO_COLOR,
                    };
                    spawn_button(root, UiButton::No, no, &button_mesh, &mut mats);
                }
                Screen::Celebrate => {
                    root.spawn((
                        Text2d::new("YAY! 💞"),
                        text_font(None, 72.0),
                        TextColor(TEXT_PINK),
                        Transform::from_xyz(0.0, 120.0, 10.0),
                        Breathe::new(3.0),
                    ));
                    let proceed = ButtonLook {
                        label: "Continue ✨",
                        pos: Vec2::new(0.0, -120.0),
                        color: PROCEED_COLOR,
                    };
                    spawn_button(root, UiButton::Proceed, proceed, &button_mesh, &mut mats);
                    for kind in EffectKind::ALL {
                        root.spawn((EffectContainer(kind), Transform::default(), Visibility::Inherited));
                    }
                }
                Screen::Confirm => {
                    root.spawn((
                        Text2d::new("It's a date! 💌"),
                        text_font(None, 64.0),
                        TextColor(TEXT_PINK),
                        Transform::from_xyz(0.0, 40.0, 10.0),
                        Breathe::new(2.0),
                    ));
                    root.spawn((
                        Text2d::new("See you on the 14th"),
                        text_font(None, 28.0),
                        TextColor(TEXT_SOFT),
                        Transform::from_xyz(0.0, -50.0, 10.0),
                    ));
                }
            });
    }
}

struct ButtonLook {
    label: &'static str,
    pos: Vec2,
    color: Color,
}

fn spawn_button(
    parent: &mut ChildBuilder,
    kind: UiButton,
    look: ButtonLook,
    mesh: &Handle<Mesh>,
    mats: &mut Assets<ColorMaterial>,
) {
    parent
        .spawn((
            Mesh2d(mesh.clone()),
            MeshMaterial2d(mats.add(ColorMaterial::from(look.color))),
            Transform::from_translation(look.pos.extend(1.0)),
            kind,
            ButtonFace {
                size: Vec2::new(BUTTON_W, BUTTON_H),
            },
        ))
        .with_children(|b| {
            b.spawn((
                Text2d::new(look.label),
                text_font(None, 28.0),
                TextColor(Color::WHITE),
                Transform::from_xyz(0.0, 0.0, 1.0),
            ));
            if kind == UiButton::Yes {
                b.spawn((
                    Sprite::from_color(
                        NEON_COLOR,
                        Vec2::new(BUTTON_W + NEON_SPREAD, BUTTON_H + NEON_SPREAD),
                    ),
                    Transform::from_xyz(0.0, 0.0, -0.5),
                    Visibility::Hidden,
                    NeonHalo,
                ));
            }
        });
}

fn track_cursor(
    windows: Query<&Window, With<PrimaryWindow>>,
    cam: Query<(&Camera, &GlobalTransform)>,
    mut cursor: ResMut<CursorWorld>,
) {
    cursor.0 = None;

    let Ok(win) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_t)) = cam.get_single() else {
        return;
    };
    let Some(screen_pos) = win.cursor_position() else {
        return;
    };
    cursor.0 = camera.viewport_to_world_2d(cam_t, screen_pos).ok();
}

fn gesture_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut gestures: EventWriter<Gesture>,
) {
    let clicked = mouse.get_just_pressed().next().is_some();
    let typed = keys.get_just_pressed().next().is_some();
    if clicked || typed {
        gestures.send(Gesture);
    }
}

fn click_input(
    mouse: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorWorld>,
    controller: Res<ScreenController>,
    buttons: Query<(Entity, &UiButton, &ButtonFace, &GlobalTransform)>,
    mut pressed: EventWriter<ButtonPressed>,
    mut actions: EventWriter<UiAction>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(active) = controller.active() else {
        return;
    };

    // The whole intro screen is the button.
    if active == Screen::Intro {
        actions.send(UiAction::Begin);
        return;
    }

    let Some(world) = cursor.0 else {
        return;
    };
    for (entity, button, face, global) in buttons.iter() {
        if button.screen() != active {
            continue;
        }
        if let Some(at) = face.local_point(global.translation().truncate(), world) {
            pressed.send(ButtonPressed {
                entity,
                button: *button,
                at,
            });
        }
    }
}

fn focus_input(
    keys: Res<ButtonInput<KeyCode>>,
    focus: Res<Focus>,
    controller: Res<ScreenController>,
    buttons: Query<(Entity, &UiButton)>,
    mut pressed: EventWriter<ButtonPressed>,
) {
    if focus.0 != Some(FocusTarget::YesButton) || controller.active() != Some(Screen::Question) {
        return;
    }
    if !keys.any_just_pressed([KeyCode::Enter, KeyCode::Space]) {
        return;
    }
    if let Some((entity, _)) = buttons.iter().find(|(_, b)| **b == UiButton::Yes) {
        pressed.send(ButtonPressed {
            entity,
            button: UiButton::Yes,
            at: Vec2::ZERO,
        });
    }
}

fn await_font(
    mut cmd: Commands,
    assets: Res<AssetServer>,
    pending: Option<Res<PendingFont>>,
) {
    let Some(pending) = pending else {
        return;
    };
    match font_progress(assets.get_load_state(pending.0.id())) {
        FontProgress::Waiting => return,
        FontProgress::Ready => {
            info!("Scene font loaded");
            cmd.insert_resource(SceneFont(pending.0.clone()));
        }
        FontProgress::Unavailable => warn!("Scene font failed to load, keeping the built-in font"),
    }
    cmd.remove_resource::<PendingFont>();
}

/// Moves every text still on the built-in font over to the scene font.
fn adopt_scene_font(font: Option<Res<SceneFont>>, mut texts: Query<&mut TextFont>) {
    let Some(font) = font.filter(|f| f.is_changed()) else {
        return;
    };
    let builtin = Handle::<Font>::default();
    for mut text in texts.iter_mut().filter(|t| t.font == builtin) {
        text.font = font.0.clone();
    }
}

fn breathe(time: Res<Time>, mut q: Query<(&mut Transform, &Breathe)>) {
    let t = time.elapsed_secs();
    for (mut transform, b) in q.iter_mut() {
        transform.scale = Vec3::splat(1.0 + b.depth * (t * b.rate).sin());
    }
}
