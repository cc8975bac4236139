use std::time::Duration;

/// Issues `total` items, item `i` due at `i * gap` after the first tick.
#[derive(Clone, Debug)]
pub struct Stagger {
    total: usize,
    issued: usize,
    gap: Duration,
    elapsed: Duration,
}

impl Stagger {
    pub fn new(total: usize, gap: Duration) -> Self {
        Self {
            total,
            issued: 0,
            gap,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the clock and returns how many items became due, in order.
    pub fn tick(&mut self, delta: Duration) -> usize {
        if self.is_done() {
            return 0;
        }
        if self.issued > 0 {
            self.elapsed += delta;
        }
        let due = if self.gap.is_zero() {
            self.total
        } else {
            let slots = (self.elapsed.as_nanos() / self.gap.as_nanos()) as usize;
            (slots + 1).min(self.total)
        };
        let fresh = due - self.issued;
        self.issued = due;
        fresh
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    pub fn is_done(&self) -> bool {
        self.issued >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_item_is_due_immediately() {
        let mut stagger = Stagger::new(3, 100 * MS);
        assert_eq!(stagger.tick(Duration::ZERO), 1);
        assert_eq!(stagger.tick(99 * MS), 0);
        assert_eq!(stagger.tick(MS), 1);
        assert_eq!(stagger.tick(100 * MS), 1);
        assert!(stagger.is_done());
        assert_eq!(stagger.tick(10_000 * MS), 0);
    }

    #[test]
    fn a_long_frame_releases_everything_due() {
        let mut stagger = Stagger::new(140, 8 * MS);
        assert_eq!(stagger.tick(Duration::ZERO), 1);
        assert_eq!(stagger.tick(80 * MS), 10);
        assert_eq!(stagger.tick(10_000 * MS), 129);
        assert_eq!(stagger.issued(), 140);
    }

    #[test]
    fn empty_stagger_is_done_from_the_start() {
        let mut stagger = Stagger::new(0, 8 * MS);
        assert!(stagger.is_done());
        assert_eq!(stagger.tick(MS), 0);
    }
}
