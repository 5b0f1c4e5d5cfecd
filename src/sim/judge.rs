//! Sequence judging
//!
//! `Collecting -> Success | Failed`, both terminal. A selection is checked
//! before it is recorded, so the progress is always a prefix of the
//! canonical order.

use serde::{Deserialize, Serialize};

use super::token::{Revealable, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgePhase {
    Collecting,
    Success,
    Failed,
}

/// Result of one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Correct, more to go; `progress` selections matched so far
    Accepted { id: TokenId, progress: usize },
    /// Correct, and the order is complete
    Success,
    /// Wrong token; every label has been revealed
    Failed { expected: TokenId, got: TokenId },
    /// The judging is already over
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SequenceJudge {
    canonical: Vec<TokenId>,
    progress: Vec<TokenId>,
    phase: JudgePhase,
}

impl SequenceJudge {
    pub fn new(canonical: Vec<TokenId>) -> Self {
        let phase = if canonical.is_empty() {
            JudgePhase::Success
        } else {
            JudgePhase::Collecting
        };
        Self {
            progress: Vec::with_capacity(canonical.len()),
            canonical,
            phase,
        }
    }

    /// Canonical order `1..=count`
    pub fn identity(count: usize) -> Self {
        Self::new((1..=count as u32).map(TokenId).collect())
    }

    pub fn phase(&self) -> JudgePhase {
        self.phase
    }

    pub fn canonical(&self) -> &[TokenId] {
        &self.canonical
    }

    pub fn progress(&self) -> &[TokenId] {
        &self.progress
    }

    /// The id the next selection must be
    pub fn expected(&self) -> Option<TokenId> {
        match self.phase {
            JudgePhase::Collecting => self.canonical.get(self.progress.len()).copied(),
            _ => None,
        }
    }

    pub fn submit<T: Revealable>(&mut self, id: TokenId, tokens: &mut [T]) -> Verdict {
        let Some(expected) = self.expected() else {
            return Verdict::Ignored;
        };

        if id != expected {
            self.phase = JudgePhase::Failed;
            self.reveal_all(tokens);
            log::debug!("Expected token {}, got {}", expected, id);
            return Verdict::Failed { expected, got: id };
        }

        if let Some(token) = tokens.iter_mut().find(|t| t.id() == id) {
            token.reveal();
        }
        self.progress.push(id);

        if self.progress.len() == self.canonical.len() {
            self.phase = JudgePhase::Success;
            Verdict::Success
        } else {
            Verdict::Accepted {
                id,
                progress: self.progress.len(),
            }
        }
    }

    /// Reveal every token, walking the canonical order
    fn reveal_all<T: Revealable>(&self, tokens: &mut [T]) {
        for id in &self.canonical {
            if let Some(token) = tokens.iter_mut().find(|t| t.id() == *id) {
                token.reveal();
            }
        }
    }
}
