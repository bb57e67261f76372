//! Sub-trial protocol table
//!
//! A protocol is the fixed, ordered list of sub-trials of one session.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Target counts of the reference protocol, in blocks of rising difficulty
pub const REFERENCE_COUNTS: [usize; 16] = [2, 2, 2, 3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5];

/// One entry of the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTrial {
    pub index: usize,
    /// Number of dots marked as targets (and clicks expected)
    pub required_tracked: usize,
}

/// Read-only ordered sub-trial table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    sub_trials: Vec<SubTrial>,
}

impl Protocol {
    /// Build a protocol from required target counts
    pub fn new(counts: &[usize]) -> Result<Self, ProtocolError> {
        if counts.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if let Some(index) = counts.iter().position(|&c| c == 0) {
            return Err(ProtocolError::ZeroCount { index });
        }
        let sub_trials = counts
            .iter()
            .enumerate()
            .map(|(index, &required_tracked)| SubTrial {
                index,
                required_tracked,
            })
            .collect();
        Ok(Self { sub_trials })
    }

    /// The 16-entry reference protocol
    pub fn reference() -> Self {
        let sub_trials = REFERENCE_COUNTS
            .iter()
            .enumerate()
            .map(|(index, &required_tracked)| SubTrial {
                index,
                required_tracked,
            })
            .collect();
        Self { sub_trials }
    }

    pub fn len(&self) -> usize {
        self.sub_trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SubTrial> {
        self.sub_trials.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubTrial> {
        self.sub_trials.iter()
    }

    /// Largest target count of any sub-trial
    pub fn max_required(&self) -> usize {
        self.sub_trials
            .iter()
            .map(|s| s.required_tracked)
            .max()
            .unwrap_or(0)
    }

    /// Check that every sub-trial fits in a field of `dot_count` dots
    pub fn check_fits(&self, dot_count: usize) -> Result<(), ProtocolError> {
        match self
            .sub_trials
            .iter()
            .find(|s| s.required_tracked > dot_count)
        {
            Some(s) => Err(ProtocolError::TooManyTargets {
                index: s.index,
                count: s.required_tracked,
                dots: dot_count,
            }),
            None => Ok(()),
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::reference()
    }
}
