use std::time::Duration;

use bevy::prelude::*;

pub const DEFAULT_TYPE_STEP: Duration = Duration::from_millis(55);

#[derive(Debug)]
struct TypingJob {
    target: Entity,
    chars: Vec<char>,
    revealed: usize,
    step: Timer,
    dirty: bool,
}

/// Reveals text into a `Text2d` one character at a time. At most one job
/// runs; starting another replaces it.
#[derive(Resource, Default, Debug)]
pub struct Typewriter {
    job: Option<TypingJob>,
}

impl Typewriter {
    /// Clears `target` and starts typing `text` every `step`.
    pub fn start(&mut self, target: Entity, text: &str, step: Duration) {
        self.job = Some(TypingJob {
            target,
            chars: text.chars().collect(),
            revealed: 0,
            step: Timer::new(step, TimerMode::Repeating),
            dirty: true,
        });
    }

    /// Stops the running job where it is.
    pub fn cancel(&mut self) {
        self.job = None;
    }

    pub fn is_typing(&self) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.revealed < job.chars.len())
    }

    /// Advances the running job; returns the target's new text when it changed.
    fn advance(&mut self, delta: Duration) -> Option<(Entity, String)> {
        let job = self.job.as_mut()?;

        job.step.tick(delta);
        let due = job.step.times_finished_this_tick() as usize;
        if due > 0 && job.revealed < job.chars.len() {
            job.revealed = (job.revealed + due).min(job.chars.len());
            job.dirty = true;
        }

        let update: Option<(Entity, String)> = job
            .dirty
            .then(|| (job.target, job.chars[..job.revealed].iter().collect()));
        job.dirty = false;

        if job.revealed >= job.chars.len() {
            self.job = None;
        }
        update
    }
}

pub struct TypewriterPlugin;

impl Plugin for TypewriterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Typewriter>()
            .add_systems(Update, run_typewriter);
    }
}

fn run_typewriter(time: Res<Time>, mut typewriter: ResMut<Typewriter>, mut texts: Query<&mut Text2d>) {
    let Some((target, shown)) = typewriter.advance(time.delta()) else {
        return;
    };
    if let Ok(mut text) = texts.get_mut(target) {
        text.0 = shown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(55);

    fn entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn start_clears_then_reveals_one_char_per_step() {
        let target = entity();
        let mut tw = Typewriter::default();
        tw.start(target, "Hey", STEP);
        assert!(tw.is_typing());

        assert_eq!(tw.advance(Duration::ZERO), Some((target, String::new())));
        assert_eq!(tw.advance(Duration::from_millis(30)), None);
        assert_eq!(tw.advance(Duration::from_millis(25)), Some((target, "H".into())));
        assert_eq!(tw.advance(STEP * 2), Some((target, "Hey".into())));
        assert!(!tw.is_typing());
        assert_eq!(tw.advance(STEP), None);
    }

    #[test]
    fn emoji_count_as_one_step() {
        let target = entity();
        let mut tw = Typewriter::default();
        tw.start(target, "💕!", STEP);
        assert_eq!(tw.advance(STEP), Some((target, "💕".into())));
        assert_eq!(tw.advance(STEP), Some((target, "💕!".into())));
    }

    #[test]
    fn restart_replaces_the_running_job() {
        let target = entity();
        let mut tw = Typewriter::default();
        tw.start(target, "Are you sure?", STEP);
        tw.advance(STEP * 3);
        tw.start(target, "No", STEP);
        assert_eq!(tw.advance(Duration::ZERO), Some((target, String::new())));
        assert_eq!(tw.advance(STEP * 10), Some((target, "No".into())));
    }

    #[test]
    fn cancel_stops_mid_word() {
        let target = entity();
        let mut tw = Typewriter::default();
        tw.start(target, "Last chance", STEP);
        tw.advance(STEP);
        tw.cancel();
        assert!(!tw.is_typing());
        assert_eq!(tw.advance(STEP * 20), None);
    }

    #[test]
    fn empty_text_just_clears() {
        let target = entity();
        let mut tw = Typewriter::default();
        tw.start(target, "", STEP);
        assert!(!tw.is_typing());
        assert_eq!(tw.advance(Duration::ZERO), Some((target, String::new())));
        assert_eq!(tw.advance(STEP), None);
    }
}
