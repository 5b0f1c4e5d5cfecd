//! Collision-free random layouts
//!
//! Tokens are axis-aligned squares of side `footprint`. A layout is valid
//! when every square lies inside the field and no two squares overlap.
//! Candidates are drawn uniformly and rejected on conflict, with a finite
//! attempt budget per token and a grid-packing fallback.

use glam::UVec2;
use rand::Rng;

use super::token::TokenId;
use crate::error::PlacementError;
use crate::platform::Viewport;
use crate::settings::{ExhaustionPolicy, PlacementSettings};

/// True if two squares of side `size` at `a` and `b` overlap.
///
/// Squares that only touch along an edge do not overlap.
#[inline]
pub fn overlaps(a: UVec2, b: UVec2, size: u32) -> bool {
    a.x.abs_diff(b.x) < size && a.y.abs_diff(b.y) < size
}

/// One round's positions, in the order the tokens were given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementRound {
    positions: Vec<(TokenId, UVec2)>,
    /// Set when rejection sampling gave up and the grid was used
    packed: bool,
}

impl PlacementRound {
    pub fn get(&self, id: TokenId) -> Option<UVec2> {
        self.positions
            .iter()
            .find(|(token, _)| *token == id)
            .map(|(_, pos)| *pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, UVec2)> + '_ {
        self.positions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn used_grid_fallback(&self) -> bool {
        self.packed
    }
}

/// A bounded field that tokens of one footprint are scattered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementField {
    footprint: u32,
    width: u32,
    height: u32,
}

impl PlacementField {
    /// Fails with `InfeasibleField` if a single token cannot fit
    pub fn new(footprint: u32, viewport: Viewport) -> Result<Self, PlacementError> {
        if footprint > viewport.width || footprint > viewport.height {
            return Err(PlacementError::InfeasibleField {
                footprint,
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            footprint,
            width: viewport.width,
            height: viewport.height,
        })
    }

    pub fn footprint(&self) -> u32 {
        self.footprint
    }

    /// Largest valid x coordinate
    pub fn max_x(&self) -> u32 {
        self.width - self.footprint
    }

    /// Largest valid y coordinate
    pub fn max_y(&self) -> u32 {
        self.height - self.footprint
    }

    fn grid(&self) -> (usize, usize) {
        (
            (self.width / self.footprint) as usize,
            (self.height / self.footprint) as usize,
        )
    }

    /// Most tokens that fit without overlap.
    ///
    /// For axis-aligned squares this is exactly the number of grid cells.
    pub fn capacity(&self) -> usize {
        if self.footprint == 0 {
            return usize::MAX;
        }
        let (cols, rows) = self.grid();
        cols.saturating_mul(rows)
    }

    /// Whether `pos` keeps the whole square inside the field
    pub fn contains(&self, pos: UVec2) -> bool {
        pos.x <= self.max_x() && pos.y <= self.max_y()
    }

    /// Check a round against the in-bounds and non-overlap invariants
    pub fn admits(&self, round: &PlacementRound) -> bool {
        let positions = &round.positions;
        positions.iter().enumerate().all(|(i, (_, a))| {
            self.contains(*a)
                && positions[i + 1..]
                    .iter()
                    .all(|(_, b)| !overlaps(*a, *b, self.footprint))
        })
    }

    /// Lay out `tokens` for one round
    pub fn layout<R: Rng + ?Sized>(
        &self,
        tokens: &[TokenId],
        settings: &PlacementSettings,
        rng: &mut R,
    ) -> Result<PlacementRound, PlacementError> {
        let capacity = self.capacity();
        if tokens.len() > capacity {
            return Err(PlacementError::PlacementExhausted {
                tokens: tokens.len(),
                capacity,
            });
        }

        let round = match self.sample(tokens, settings.max_attempts, rng) {
            Some(round) => round,
            None => match settings.exhaustion {
                ExhaustionPolicy::GridPack => {
                    log::debug!("Rejection sampling exhausted, packing {} tokens on the grid", tokens.len());
                    self.grid_pack(tokens, rng)
                }
                ExhaustionPolicy::Fail => {
                    return Err(PlacementError::PlacementExhausted {
                        tokens: tokens.len(),
                        capacity,
                    });
                }
            },
        };

        debug_assert!(self.admits(&round));
        Ok(round)
    }

    /// Rejection sampling; `None` once any token runs out of attempts
    fn sample<R: Rng + ?Sized>(
        &self,
        tokens: &[TokenId],
        max_attempts: u32,
        rng: &mut R,
    ) -> Option<PlacementRound> {
        let mut positions: Vec<(TokenId, UVec2)> = Vec::with_capacity(tokens.len());

        for &id in tokens {
            let mut placed = None;
            for _ in 0..max_attempts {
                let candidate = UVec2::new(
                    rng.random_range(0..=self.max_x()),
                    rng.random_range(0..=self.max_y()),
                );
                if !positions
                    .iter()
                    .any(|(_, used)| overlaps(candidate, *used, self.footprint))
                {
                    placed = Some(candidate);
                    break;
                }
            }
            positions.push((id, placed?));
        }

        Some(PlacementRound {
            positions,
            packed: false,
        })
    }

    /// Assign each token a distinct random cell of the footprint-pitch grid.
    /// Callers must have checked `tokens.len() <= capacity()`.
    fn grid_pack<R: Rng + ?Sized>(&self, tokens: &[TokenId], rng: &mut R) -> PlacementRound {
        if self.footprint == 0 {
            return PlacementRound {
                positions: tokens.iter().map(|&id| (id, UVec2::ZERO)).collect(),
                packed: true,
            };
        }
        let (cols, _) = self.grid();
        let cells = rand::seq::index::sample(rng, self.capacity(), tokens.len());
        let positions = tokens
            .iter()
            .zip(cells.iter())
            .map(|(&id, cell)| {
                let col = (cell % cols) as u32;
                let row = (cell / cols) as u32;
                (id, UVec2::new(col * self.footprint, row * self.footprint))
            })
            .collect();

        PlacementRound {
            positions,
            packed: true,
        }
    }
}
