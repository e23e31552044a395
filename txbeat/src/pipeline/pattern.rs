// The 64-step drum pattern and the hash -> pattern mapping.

use thiserror::Error;

use crate::shared::{StepKind, STEPS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("step {index} is out of range (0-{max})", max = STEPS - 1)]
    OutOfRange { index: usize },
}

/// Four bars of sixteenths. Always exactly `STEPS` long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    steps: [StepKind; STEPS],
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            steps: [StepKind::Off; STEPS],
        }
    }
}

impl Pattern {
    /// Map an identifier onto steps, one character per step.
    ///
    /// The first two characters (the `0x`) are dropped, digits become kicks,
    /// hex letters become snares and anything else is a rest. The result is
    /// padded with rests or cut down to `STEPS`. Callers validate the
    /// identifier first; this never fails.
    pub fn derive(identifier: &str) -> Self {
        let mut steps = [StepKind::Off; STEPS];
        let body = identifier.trim().chars().skip(2);
        for (slot, ch) in steps.iter_mut().zip(body) {
            *slot = classify(ch);
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[StepKind; STEPS] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<StepKind> {
        self.steps.get(index).copied()
    }

    /// Replace one cell. Cells are swapped whole, the transport never sees
    /// a half-written step.
    pub fn edit_step(&mut self, index: usize, kind: StepKind) -> Result<&Pattern, PatternError> {
        let slot = self
            .steps
            .get_mut(index)
            .ok_or(PatternError::OutOfRange { index })?;
        *slot = kind;
        Ok(self)
    }

    /// Kick -> Snare -> Off -> Kick, returns the new value.
    pub fn cycle_step(&mut self, index: usize) -> Result<StepKind, PatternError> {
        let next = self
            .get(index)
            .ok_or(PatternError::OutOfRange { index })?
            .next();
        self.edit_step(index, next)?;
        Ok(next)
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| **s == kind).count()
    }
}

fn classify(ch: char) -> StepKind {
    match ch {
        '0'..='9' => StepKind::Kick,
        'a'..='f' | 'A'..='F' => StepKind::Snare,
        _ => StepKind::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(body: &str) -> String {
        format!("0x{body}")
    }

    #[test]
    fn same_identifier_same_pattern() {
        let id = hash_of("5e1d9f0a7c3b2e4d6f8a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e");
        assert_eq!(Pattern::derive(&id), Pattern::derive(&id));
    }

    #[test]
    fn always_sixty_four_steps() {
        let long = "9".repeat(300);
        for input in ["", "0x", "0x1", "hello", long.as_str(), "0x🥁🥁🥁"] {
            assert_eq!(Pattern::derive(input).steps().len(), STEPS);
        }
    }

    #[test]
    fn zeros_are_kicks_and_fs_are_snares() {
        let kicks = Pattern::derive(&hash_of(&"0".repeat(64)));
        assert!(kicks.steps().iter().all(|s| *s == StepKind::Kick));

        let snares = Pattern::derive(&hash_of(&"f".repeat(64)));
        assert!(snares.steps().iter().all(|s| *s == StepKind::Snare));

        let upper = Pattern::derive(&hash_of(&"F".repeat(64)));
        assert_eq!(upper, snares);
    }

    #[test]
    fn alternating_body_alternates() {
        let p = Pattern::derive(&hash_of(&"0f".repeat(32)));
        for (i, step) in p.steps().iter().enumerate() {
            let want = if i % 2 == 0 { StepKind::Kick } else { StepKind::Snare };
            assert_eq!(*step, want, "step {i}");
        }
    }

    #[test]
    fn short_body_pads_with_rests() {
        let p = Pattern::derive("0x12ab");
        assert_eq!(
            &p.steps()[..4],
            &[StepKind::Kick, StepKind::Kick, StepKind::Snare, StepKind::Snare]
        );
        assert!(p.steps()[4..].iter().all(|s| *s == StepKind::Off));
    }

    #[test]
    fn long_body_keeps_first_sixty_four() {
        let body = format!("{}{}", "a".repeat(64), "0".repeat(10));
        let p = Pattern::derive(&hash_of(&body));
        assert_eq!(p.count(StepKind::Snare), STEPS);
    }

    #[test]
    fn non_hex_characters_are_rests() {
        let p = Pattern::derive("0x1g2");
        assert_eq!(
            &p.steps()[..3],
            &[StepKind::Kick, StepKind::Off, StepKind::Kick]
        );
    }

    #[test]
    fn cycling_wraps_after_three() {
        let mut p = Pattern::derive(&hash_of(&"0".repeat(64)));
        assert_eq!(p.cycle_step(7), Ok(StepKind::Snare));
        assert_eq!(p.cycle_step(7), Ok(StepKind::Off));
        assert_eq!(p.cycle_step(7), Ok(StepKind::Kick));
        assert_eq!(p.get(7), Some(StepKind::Kick));
        // neighbours untouched
        assert_eq!(p.count(StepKind::Kick), STEPS);
    }

    #[test]
    fn edits_out_of_range_are_rejected() {
        let mut p = Pattern::default();
        assert_eq!(
            p.edit_step(STEPS, StepKind::Kick).err(),
            Some(PatternError::OutOfRange { index: STEPS })
        );
        assert_eq!(p.cycle_step(100), Err(PatternError::OutOfRange { index: 100 }));
        assert_eq!(p, Pattern::default());
    }

    #[test]
    fn edit_step_returns_updated_pattern() {
        let mut p = Pattern::default();
        let updated = p.edit_step(3, StepKind::Snare).unwrap();
        assert_eq!(updated.get(3), Some(StepKind::Snare));
        assert_eq!(updated.count(StepKind::Snare), 1);
    }
}
