use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::Settings;

/// Random source behind every randomized visual parameter.
#[derive(Resource)]
pub struct Dice(StdRng);

impl Dice {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        match settings.seed {
            Some(seed) => Self::seeded(seed),
            None => Self(StdRng::from_os_rng()),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.0
    }

    /// Picks one of `items`, each with equal weight.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.0.random_range(0..items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rolls() {
        let mut a = Dice::seeded(7);
        let mut b = Dice::seeded(7);
        let xs: Vec<u32> = (0..8).map(|_| a.rng().random_range(0..1000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng().random_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn pick_stays_inside_the_slice() {
        let mut dice = Dice::seeded(1);
        let glyphs = ["a", "b", "c"];
        for _ in 0..50 {
            assert!(glyphs.contains(dice.pick(&glyphs).unwrap()));
        }
        let empty: [u8; 0] = [];
        assert!(dice.pick(&empty).is_none());
    }
}
