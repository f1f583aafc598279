//! Progress indicator state derived from the current step

/// Visual state of one step indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Completed,
    Active,
    Pending,
}

impl Indicator {
    /// Labels are highlighted for completed and active steps
    pub fn is_highlighted(&self) -> bool {
        !matches!(self, Indicator::Pending)
    }
}

/// Snapshot of the whole progress bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// One entry per step, in order
    pub indicators: Vec<Indicator>,
    /// One entry per gap between consecutive steps; true when completed
    pub connectors: Vec<bool>,
}

impl Progress {
    /// Compute indicator and connector states for `current` (1-based) of `total`
    pub fn at(current: usize, total: usize) -> Self {
        let indicators = (1..=total)
            .map(|step| match step.cmp(&current) {
                std::cmp::Ordering::Less => Indicator::Completed,
                std::cmp::Ordering::Equal => Indicator::Active,
                std::cmp::Ordering::Greater => Indicator::Pending,
            })
            .collect();

        let connectors = (1..total).map(|line| line < current).collect();

        Self {
            indicators,
            connectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_three_of_four() {
        let progress = Progress::at(3, 4);
        assert_eq!(
            progress.indicators,
            vec![
                Indicator::Completed,
                Indicator::Completed,
                Indicator::Active,
                Indicator::Pending
            ]
        );
        assert_eq!(progress.connectors, vec![true, true, false]);
    }

    #[test]
    fn test_first_step() {
        let progress = Progress::at(1, 3);
        assert_eq!(progress.indicators[0], Indicator::Active);
        assert!(progress.indicators[1..]
            .iter()
            .all(|i| *i == Indicator::Pending));
        assert_eq!(progress.connectors, vec![false, false]);
    }

    #[test]
    fn test_single_step_has_no_connectors() {
        let progress = Progress::at(1, 1);
        assert_eq!(progress.indicators, vec![Indicator::Active]);
        assert!(progress.connectors.is_empty());
    }

    #[test]
    fn test_label_highlighting() {
        assert!(Indicator::Completed.is_highlighted());
        assert!(Indicator::Active.is_highlighted());
        assert!(!Indicator::Pending.is_highlighted());
    }
}
