//! The five full-window screens and the timed switch between them.

use std::time::Duration;

use bevy::prelude::*;

/// Gap between hiding every screen and showing the target.
pub const SCREEN_SWITCH_DELAY: Duration = Duration::from_millis(16);
/// How long the boot splash stays up before the intro.
pub const BOOT_DURATION: Duration = Duration::from_millis(3500);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Boot,
    Intro,
    Question,
    Celebrate,
    Confirm,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Boot,
        Screen::Intro,
        Screen::Question,
        Screen::Celebrate,
        Screen::Confirm,
    ];

    /// Successor in the normal one-way flow.
    pub fn next(self) -> Option<Screen> {
        match self {
            Screen::Boot => Some(Screen::Intro),
            Screen::Intro => Some(Screen::Question),
            Screen::Question => Some(Screen::Celebrate),
            Screen::Celebrate => Some(Screen::Confirm),
            Screen::Confirm => None,
        }
    }
}

/// Root entity of a screen; its visibility is the screen's "active" flag.
#[derive(Component, Clone, Copy, Debug)]
pub struct ScreenRoot(pub Screen);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    YesButton,
    Screen(Screen),
}

#[derive(Resource, Default, Debug)]
pub struct Focus(pub Option<FocusTarget>);

/// Request to switch screens.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchScreen(pub Screen);

/// A screen just became visible.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenActivated(pub Screen);

#[derive(Resource, Default, Debug)]
pub struct ScreenController {
    active: Option<Screen>,
    pending: Option<(Screen, Timer)>,
}

impl ScreenController {
    pub fn active(&self) -> Option<Screen> {
        self.active
    }

    pub fn pending(&self) -> Option<Screen> {
        self.pending.as_ref().map(|(screen, _)| *screen)
    }

    fn deactivate_all(&mut self) {
        self.active = None;
        self.pending = None;
    }

    fn schedule(&mut self, target: Screen) {
        self.pending = Some((target, Timer::new(SCREEN_SWITCH_DELAY, TimerMode::Once)));
    }

    fn tick(&mut self, delta: Duration) -> Option<Screen> {
        let (_, timer) = self.pending.as_mut()?;
        timer.tick(delta);
        if !timer.finished() {
            return None;
        }
        let (target, _) = self.pending.take()?;
        self.active = Some(target);
        Some(target)
    }
}

#[derive(Resource)]
struct BootTimer(Timer);

pub struct ScreenPlugin;

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScreenController>()
            .init_resource::<Focus>()
            .insert_resource(BootTimer(Timer::new(BOOT_DURATION, TimerMode::Once)))
            .add_event::<SwitchScreen>()
            .add_event::<ScreenActivated>()
            .add_systems(PostStartup, enter_boot)
            .add_systems(
                Update,
                (boot_advance, handle_switch_requests, activate_pending).chain(),
            );
    }
}

fn enter_boot(mut requests: EventWriter<SwitchScreen>) {
    requests.send(SwitchScreen(Screen::Boot));
}

fn boot_advance(
    time: Res<Time>,
    mut boot: ResMut<BootTimer>,
    controller: Res<ScreenController>,
    mut requests: EventWriter<SwitchScreen>,
) {
    let on_boot = controller.active() == Some(Screen::Boot)
        || controller.pending() == Some(Screen::Boot);
    if !on_boot {
        return;
    }
    boot.0.tick(time.delta());
    if let Some(next) = Screen::Boot.next().filter(|_| boot.0.just_finished()) {
        requests.send(SwitchScreen(next));
    }
}

fn handle_switch_requests(
    mut requests: EventReader<SwitchScreen>,
    mut controller: ResMut<ScreenController>,
    mut roots: Query<(&ScreenRoot, &mut Visibility)>,
) {
    for SwitchScreen(target) in requests.read() {
        controller.deactivate_all();
        let mut found = false;
        for (root, mut vis) in roots.iter_mut() {
            *vis = Visibility::Hidden;
            found |= root.0 == *target;
        }
        if found {
            controller.schedule(*target);
        } else {
            debug!("no root for screen {:?}, ignoring switch", target);
        }
    }
}

fn activate_pending(
    time: Res<Time>,
    mut controller: ResMut<ScreenController>,
    mut focus: ResMut<Focus>,
    mut roots: Query<(&ScreenRoot, &mut Visibility)>,
    mut activated: EventWriter<ScreenActivated>,
) {
    let Some(target) = controller.tick(time.delta()) else {
        return;
    };

    for (root, mut vis) in roots.iter_mut() {
        if root.0 == target {
            *vis = Visibility::Visible;
        }
    }
    focus.0 = Some(match target {
        Screen::Question => FocusTarget::YesButton,
        other => FocusTarget::Screen(other),
    });

    info!("Screen active: {:?}", target);
    activated.send(ScreenActivated(target));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{advance, headless_app, spawn_scaffold, visible_screens};

    #[test]
    fn boots_then_moves_to_intro() {
        let mut app = headless_app(Default::default());
        spawn_scaffold(&mut app);

        advance(&mut app, Duration::from_millis(100));
        assert_eq!(app.world().resource::<ScreenController>().active(), Some(Screen::Boot));
        assert_eq!(visible_screens(&mut app), vec![Screen::Boot]);

        advance(&mut app, BOOT_DURATION);
        assert_eq!(app.world().resource::<ScreenController>().active(), Some(Screen::Intro));
        assert_eq!(visible_screens(&mut app), vec![Screen::Intro]);
        assert_eq!(
            app.world().resource::<Focus>().0,
            Some(FocusTarget::Screen(Screen::Intro))
        );
    }

    #[test]
    fn switch_hides_everything_before_showing_target() {
        let mut app = headless_app(Default::default());
        spawn_scaffold(&mut app);
        advance(&mut app, Duration::from_millis(100));

        app.world_mut().send_event(SwitchScreen(Screen::Question));
        app.update();
        let controller = app.world().resource::<ScreenController>();
        assert_eq!(controller.active(), None);
        assert_eq!(controller.pending(), Some(Screen::Question));
        assert!(visible_screens(&mut app).is_empty());

        advance(&mut app, SCREEN_SWITCH_DELAY);
        assert_eq!(visible_screens(&mut app), vec![Screen::Question]);
        assert_eq!(app.world().resource::<Focus>().0, Some(FocusTarget::YesButton));
    }

    #[test]
    fn switching_to_a_missing_screen_is_ignored() {
        let mut app = headless_app(Default::default());
        app.world_mut()
            .spawn((ScreenRoot(Screen::Boot), Visibility::Hidden));
        advance(&mut app, Duration::from_millis(100));

        app.world_mut().send_event(SwitchScreen(Screen::Confirm));
        advance(&mut app, Duration::from_millis(100));
        let controller = app.world().resource::<ScreenController>();
        assert_eq!(controller.active(), None);
        assert_eq!(controller.pending(), None);
    }

    #[test]
    fn flow_only_moves_forward() {
        let mut screen = Screen::Boot;
        let mut seen = vec![screen];
        while let Some(next) = screen.next() {
            screen = next;
            seen.push(screen);
        }
        assert_eq!(seen, Screen::ALL.to_vec());
    }
}
