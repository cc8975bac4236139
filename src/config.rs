//! Settings read from the environment and the two motion profiles.
//!
//! Every count, interval and duration used by the scene lives here so the
//! reduced-motion profile can be compared against the normal one.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

// SCENE
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;

pub const DEFAULT_QUESTION: &str = "Will you be my Valentine?";
pub const DEFAULT_MUSIC: &str = "sounds/music.ogg";

const ENV_REDUCED_MOTION: &str = "BE_MINE_REDUCED_MOTION";
const ENV_QUESTION: &str = "BE_MINE_QUESTION";
const ENV_MUSIC: &str = "BE_MINE_MUSIC";
const ENV_FONT: &str = "BE_MINE_FONT";
const ENV_SEED: &str = "BE_MINE_SEED";
const ENV_FULLSCREEN: &str = "BE_MINE_FULLSCREEN";

/// Horizontal percentage of the scene (0 = left edge) to world x.
pub fn percent_x(percent: f32) -> f32 {
    (percent / 100.0 - 0.5) * WINDOW_WIDTH
}

/// Vertical percentage of the scene (0 = top edge) to world y.
pub fn percent_y(percent: f32) -> f32 {
    (0.5 - percent / 100.0) * WINDOW_HEIGHT
}

#[derive(Resource, Clone, Debug, PartialEq)]
pub struct Settings {
    pub reduced_motion: bool,
    pub question: String,
    /// Deferred music source, applied on the first user gesture.
    pub music: Option<String>,
    /// Optional font for the heart glyphs; Bevy's built-in font until it loads.
    pub font: Option<String>,
    pub seed: Option<u64>,
    pub fullscreen: bool,
    /// Problems met while reading the environment, logged once the app runs.
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            question: DEFAULT_QUESTION.to_string(),
            music: Some(DEFAULT_MUSIC.to_string()),
            font: None,
            seed: None,
            fullscreen: true,
            warnings: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Bad values are recorded
    /// in `warnings` and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_REDUCED_MOTION) {
            match parse_flag(&raw) {
                Ok(v) => settings.reduced_motion = v,
                Err(e) => settings.warnings.push(format!("{ENV_REDUCED_MOTION}: {e}")),
            }
        }
        if let Some(raw) = lookup(ENV_FULLSCREEN) {
            match parse_flag(&raw) {
                Ok(v) => settings.fullscreen = v,
                Err(e) => settings.warnings.push(format!("{ENV_FULLSCREEN}: {e}")),
            }
        }
        if let Some(raw) = lookup(ENV_QUESTION) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                settings
                    .warnings
                    .push(format!("{ENV_QUESTION} is empty, keeping the default question"));
            } else {
                settings.question = trimmed.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_MUSIC) {
            settings.music = optional_path(&raw);
        }
        if let Some(raw) = lookup(ENV_FONT) {
            settings.font = optional_path(&raw);
        }
        if let Some(raw) = lookup(ENV_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => settings.seed = Some(seed),
                Err(e) => settings.warnings.push(format!("{ENV_SEED}: {e}")),
            }
        }

        settings
    }

    pub fn motion(&self) -> MotionProfile {
        if self.reduced_motion {
            MotionProfile::reduced()
        } else {
            MotionProfile::normal()
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    }
}

// Empty disables the asset.
fn optional_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Closed range of a randomized visual parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn roll<R: Rng>(&self, rng: &mut R) -> f32 {
        rng.random_range(self.min..self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Typing step under reduced motion, whatever the caller asked for.
pub const REDUCED_TYPE_STEP: Duration = Duration::from_millis(15);

/// Burst-then-drizzle timing of one celebration generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectTiming {
    pub burst: usize,
    pub stagger: Duration,
    pub drizzle: Duration,
    pub stop_after: Duration,
}

impl EffectTiming {
    /// Upper bound of elements emitted by the drizzle.
    pub fn drizzle_count(&self) -> u128 {
        self.stop_after.as_millis() / self.drizzle.as_millis().max(1)
    }
}

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct MotionProfile {
    pub reduced: bool,
    pub heart_cap: usize,
    pub heart_seed_count: usize,
    pub heart_seed_gap: Duration,
    pub heart_interval: Duration,
    pub heart_duration: Span,
    pub confetti: EffectTiming,
    pub sparkles: EffectTiming,
    pub heart_burst: EffectTiming,
    pub mini_hearts: usize,
    /// Max tilt in degrees: x drives rotation around Y, y around X.
    pub max_tilt: Vec2,
}

impl MotionProfile {
    pub const fn normal() -> Self {
        Self {
            reduced: false,
            heart_cap: 70,
            heart_seed_count: 40,
            heart_seed_gap: Duration::from_millis(100),
            heart_interval: Duration::from_millis(800),
            heart_duration: Span::new(12.0, 20.0),
            confetti: EffectTiming {
                burst: 140,
                stagger: Duration::from_millis(8),
                drizzle: Duration::from_millis(120),
                stop_after: Duration::from_millis(9000),
            },
            sparkles: EffectTiming {
                burst: 30,
                stagger: Duration::from_millis(80),
                drizzle: Duration::from_millis(160),
                stop_after: Duration::from_millis(9000),
            },
            heart_burst: EffectTiming {
                burst: 38,
                stagger: Duration::from_millis(90),
                drizzle: Duration::from_millis(180),
                stop_after: Duration::from_millis(8000),
            },
            mini_hearts: 4,
            max_tilt: Vec2::new(10.0, 8.0),
        }
    }

    pub const fn reduced() -> Self {
        Self {
            reduced: true,
            heart_cap: 35,
            heart_seed_count: 18,
            heart_seed_gap: Duration::from_millis(100),
            heart_interval: Duration::from_millis(1400),
            heart_duration: Span::new(8.0, 12.0),
            confetti: EffectTiming {
                burst: 60,
                stagger: Duration::from_millis(12),
                drizzle: Duration::from_millis(180),
                stop_after: Duration::from_millis(6000),
            },
            sparkles: EffectTiming {
                burst: 18,
                stagger: Duration::from_millis(80),
                drizzle: Duration::from_millis(220),
                stop_after: Duration::from_millis(6000),
            },
            heart_burst: EffectTiming {
                burst: 20,
                stagger: Duration::from_millis(120),
                drizzle: Duration::from_millis(260),
                stop_after: Duration::from_millis(5000),
            },
            mini_hearts: 2,
            max_tilt: Vec2::new(6.0, 6.0),
        }
    }

    /// Typing speed actually used for a requested step.
    pub fn type_step(&self, requested: Duration) -> Duration {
        if self.reduced {
            REDUCED_TYPE_STEP
        } else {
            requested
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
    }

    #[test]
    fn default_font_is_the_builtin_one() {
        assert_eq!(Settings::default().font, None);
        let blank = Settings::from_lookup(lookup(&[("BE_MINE_FONT", "  ")]));
        assert_eq!(blank.font, None);
    }

    #[test]
    fn type_step_only_changes_under_reduced_motion() {
        let requested = Duration::from_millis(55);
        assert_eq!(MotionProfile::normal().type_step(requested), requested);
        assert_eq!(MotionProfile::reduced().type_step(requested), REDUCED_TYPE_STEP);
    }

    #[test]
    fn reads_every_key() {
        let settings = Settings::from_lookup(lookup(&[
            ("BE_MINE_REDUCED_MOTION", "Yes"),
            ("BE_MINE_QUESTION", "  Dinner on Friday?  "),
            ("BE_MINE_MUSIC", "sounds/other.ogg"),
            ("BE_MINE_FONT", "fonts/Hearts.ttf"),
            ("BE_MINE_SEED", "42"),
            ("BE_MINE_FULLSCREEN", "off"),
        ]));
        assert!(settings.reduced_motion);
        assert_eq!(settings.question, "Dinner on Friday?");
        assert_eq!(settings.music.as_deref(), Some("sounds/other.ogg"));
        assert_eq!(settings.font.as_deref(), Some("fonts/Hearts.ttf"));
        assert_eq!(settings.seed, Some(42));
        assert!(!settings.fullscreen);
        assert!(settings.motion().reduced);
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("BE_MINE_REDUCED_MOTION", "sometimes"),
            ("BE_MINE_QUESTION", "   "),
            ("BE_MINE_SEED", "-3"),
        ]));
        assert!(!settings.reduced_motion);
        assert_eq!(settings.question, DEFAULT_QUESTION);
        assert_eq!(settings.seed, None);
        assert_eq!(settings.warnings.len(), 3);
        assert!(settings.warnings[0].starts_with("BE_MINE_REDUCED_MOTION"));
    }

    #[test]
    fn reduced_profile_never_moves_more() {
        let n = MotionProfile::normal();
        let r = MotionProfile::reduced();

        assert!(r.type_step(Duration::from_millis(55)) <= n.type_step(Duration::from_millis(55)));
        assert!(r.heart_cap <= n.heart_cap);
        assert!(r.heart_seed_count <= n.heart_seed_count);
        assert!(r.heart_interval >= n.heart_interval);
        assert!(r.heart_duration.max <= n.heart_duration.max);
        assert!(r.heart_duration.min <= n.heart_duration.min);
        assert!(r.mini_hearts <= n.mini_hearts);
        assert!(r.max_tilt.x <= n.max_tilt.x && r.max_tilt.y <= n.max_tilt.y);

        for (r, n) in [
            (r.confetti, n.confetti),
            (r.sparkles, n.sparkles),
            (r.heart_burst, n.heart_burst),
        ] {
            assert!(r.burst <= n.burst);
            assert!(r.stop_after <= n.stop_after);
            assert!(r.drizzle >= n.drizzle);
            assert!(r.drizzle_count() <= n.drizzle_count());
        }
    }

    #[test]
    fn percent_maps_onto_the_scene() {
        assert_eq!(percent_x(0.0), -WINDOW_WIDTH / 2.0);
        assert_eq!(percent_x(50.0), 0.0);
        assert_eq!(percent_y(0.0), WINDOW_HEIGHT / 2.0);
        assert_eq!(percent_y(100.0), -WINDOW_HEIGHT / 2.0);
    }
}
