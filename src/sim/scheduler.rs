//! Timed relocation schedule
//!
//! `Idle -> Running(round, max_rounds) -> Obscured -> Idle`
//!
//! The scheduler never waits on its own. `start` and each relocation hand
//! back a `TickRequest`; the host arms a timer and feeds the ticket back
//! through `tick`. Any ticket other than the pending one is stale.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::placement::PlacementField;
use super::token::{Positionable, Revealable, TokenId};
use crate::error::PlacementError;
use crate::platform::Viewport;
use crate::settings::{Pacing, PlacementSettings};

/// Identifies one scheduled tick of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickTicket {
    /// Bumped every time the schedule is stopped or restarted
    pub generation: u64,
    /// Position of the tick within its run
    pub seq: u32,
}

/// Ask the host to call back with `ticket` after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRequest {
    pub ticket: TickTicket,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    Idle,
    /// `round` relocations have been applied so far
    Running { round: u32, max_rounds: u32 },
    /// All rounds done and labels hidden
    Obscured,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the pending ticket; nothing changed
    Stale,
    /// Round `round` (0-based) was applied and the next tick requested
    Relocated { round: u32, next: TickRequest },
    /// Every label was hidden; the schedule is finished
    Obscured,
}

#[derive(Debug, Clone)]
pub struct RoundScheduler {
    pacing: Pacing,
    placement: PlacementSettings,
    phase: SchedulerPhase,
    generation: u64,
    seq: u32,
    pending: Option<TickTicket>,
}

impl RoundScheduler {
    pub fn new(pacing: Pacing, placement: PlacementSettings) -> Self {
        Self {
            pacing,
            placement,
            phase: SchedulerPhase::Idle,
            generation: 0,
            seq: 0,
            pending: None,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<TickTicket> {
        self.pending
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Begin a run. The first look lasts longer the more rounds there are.
    ///
    /// A schedule that is still running is superseded; its pending ticket
    /// becomes stale.
    pub fn start(&mut self, max_rounds: u32) -> TickRequest {
        if self.phase != SchedulerPhase::Idle {
            log::debug!("Restarting schedule from {:?}", self.phase);
        }
        self.generation += 1;
        self.seq = 0;
        self.phase = SchedulerPhase::Running {
            round: 0,
            max_rounds,
        };
        self.request(self.pacing.first_look(max_rounds))
    }

    /// Cancel the schedule. Returns the ticket the host should cancel, if any.
    pub fn stop(&mut self) -> Option<TickTicket> {
        self.generation += 1;
        self.phase = SchedulerPhase::Idle;
        self.pending.take()
    }

    /// Handle a fired timer.
    ///
    /// A round's layout is computed in full before any token moves, so a
    /// placement failure leaves the previous layout standing. The failure
    /// ends the schedule.
    pub fn tick<T, R>(
        &mut self,
        ticket: TickTicket,
        tokens: &mut [T],
        footprint: u32,
        viewport: Viewport,
        rng: &mut R,
    ) -> Result<TickOutcome, PlacementError>
    where
        T: Positionable + Revealable,
        R: Rng + ?Sized,
    {
        if self.pending != Some(ticket) {
            log::debug!("Ignoring stale tick {:?}", ticket);
            return Ok(TickOutcome::Stale);
        }
        self.pending = None;

        let SchedulerPhase::Running { round, max_rounds } = self.phase else {
            return Ok(TickOutcome::Stale);
        };

        if round >= max_rounds {
            for token in tokens.iter_mut() {
                token.obscure();
            }
            self.phase = SchedulerPhase::Obscured;
            log::info!("All {} rounds done, labels hidden", max_rounds);
            return Ok(TickOutcome::Obscured);
        }

        let ids: Vec<TokenId> = tokens.iter().map(|t| t.id()).collect();
        let layout = PlacementField::new(footprint, viewport)
            .and_then(|field| field.layout(&ids, &self.placement, rng));
        let layout = match layout {
            Ok(layout) => layout,
            Err(e) => {
                self.stop();
                return Err(e);
            }
        };

        for token in tokens.iter_mut() {
            if let Some(pos) = layout.get(token.id()) {
                token.set_position(pos);
            }
        }

        self.phase = SchedulerPhase::Running {
            round: round + 1,
            max_rounds,
        };
        log::debug!("Round {}/{} placed", round + 1, max_rounds);

        let next = self.request(self.pacing.round_interval());
        Ok(TickOutcome::Relocated { round, next })
    }

    fn request(&mut self, delay: Duration) -> TickRequest {
        self.seq += 1;
        let ticket = TickTicket {
            generation: self.generation,
            seq: self.seq,
        };
        self.pending = Some(ticket);
        TickRequest { ticket, delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, HeadlessToken, PlatformEvent, TokenSurface};
    use crate::sim::placement::overlaps;
    use crate::sim::token::Token;
    use glam::UVec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEW: Viewport = Viewport::new(800, 600);

    fn tokens(platform: &mut HeadlessPlatform, n: u32) -> Vec<Token<HeadlessToken>> {
        (1..=n)
            .map(|i| {
                let id = TokenId(i);
                let handle = platform.create_token(id, &i.to_string(), "#FFFFFF");
                Token::new(id, i.to_string(), "#FFFFFF", handle)
            })
            .collect()
    }

    fn scheduler() -> RoundScheduler {
        RoundScheduler::new(Pacing::default(), PlacementSettings::default())
    }

    #[test]
    fn test_custom_pacing() {
        let pacing = Pacing {
            first_look_per_round_ms: 250,
            round_interval_ms: 500,
        };
        let mut sched = RoundScheduler::new(pacing, PlacementSettings::default());
        assert_eq!(sched.pacing(), &pacing);

        let first = sched.start(3);
        assert_eq!(first.delay, Duration::from_millis(750));
        assert_eq!(first.delay, sched.pacing().first_look(3));
    }

    #[test]
    fn test_full_schedule() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 4);
        platform.drain_events();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sched = scheduler();

        let first = sched.start(4);
        assert_eq!(first.delay, Duration::from_millis(4000));
        assert_eq!(sched.phase(), SchedulerPhase::Running { round: 0, max_rounds: 4 });

        let mut ticket = first.ticket;
        let mut rounds = Vec::new();
        loop {
            match sched.tick(ticket, &mut toks, 50, VIEW, &mut rng).unwrap() {
                TickOutcome::Relocated { round, next } => {
                    assert_eq!(next.delay, Duration::from_millis(2000));
                    for (i, a) in toks.iter().enumerate() {
                        for b in &toks[i + 1..] {
                            assert!(!overlaps(a.position(), b.position(), 50));
                        }
                    }
                    rounds.push(round);
                    ticket = next.ticket;
                }
                TickOutcome::Obscured => break,
                TickOutcome::Stale => panic!("pending ticket reported stale"),
            }
        }

        assert_eq!(rounds, vec![0, 1, 2, 3]);
        assert_eq!(sched.phase(), SchedulerPhase::Obscured);
        assert_eq!(sched.pending(), None);
        assert!(toks.iter().all(|t| !t.is_revealed()));

        let events = platform.drain_events();
        let moves = events
            .iter()
            .filter(|e| matches!(e, PlatformEvent::Moved { .. }))
            .count();
        let hides = events
            .iter()
            .filter(|e| matches!(e, PlatformEvent::LabelHidden { .. }))
            .count();
        assert_eq!(moves, 4 * 4);
        assert_eq!(hides, 4);
        // Hides come strictly after the last move
        let last_move = events
            .iter()
            .rposition(|e| matches!(e, PlatformEvent::Moved { .. }))
            .unwrap();
        let first_hide = events
            .iter()
            .position(|e| matches!(e, PlatformEvent::LabelHidden { .. }))
            .unwrap();
        assert!(first_hide > last_move);

        // Replaying the finished ticket does nothing
        assert_eq!(
            sched.tick(ticket, &mut toks, 50, VIEW, &mut rng).unwrap(),
            TickOutcome::Stale
        );
        assert!(platform.drain_events().is_empty());
    }

    #[test]
    fn test_stop_makes_pending_ticket_stale() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 3);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut sched = scheduler();

        let first = sched.start(3);
        assert_eq!(sched.stop(), Some(first.ticket));
        assert_eq!(sched.phase(), SchedulerPhase::Idle);
        assert_eq!(
            sched.tick(first.ticket, &mut toks, 50, VIEW, &mut rng).unwrap(),
            TickOutcome::Stale
        );
        assert!(toks.iter().all(|t| t.position() == UVec2::ZERO));
    }

    #[test]
    fn test_restart_supersedes_old_ticket() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 3);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut sched = scheduler();

        let old = sched.start(3);
        let new = sched.start(5);
        assert_ne!(old.ticket, new.ticket);
        assert_eq!(
            sched.tick(old.ticket, &mut toks, 50, VIEW, &mut rng).unwrap(),
            TickOutcome::Stale
        );
        assert!(matches!(
            sched.tick(new.ticket, &mut toks, 50, VIEW, &mut rng).unwrap(),
            TickOutcome::Relocated { round: 0, .. }
        ));
    }

    #[test]
    fn test_placement_failure_keeps_last_layout() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 3);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut sched = scheduler();

        let first = sched.start(3);
        let TickOutcome::Relocated { next, .. } =
            sched.tick(first.ticket, &mut toks, 50, VIEW, &mut rng).unwrap()
        else {
            panic!("first tick should relocate");
        };
        let before: Vec<UVec2> = toks.iter().map(|t| t.position()).collect();

        // Window shrank below a single token
        let err = sched
            .tick(next.ticket, &mut toks, 50, Viewport::new(40, 600), &mut rng)
            .unwrap_err();
        assert!(matches!(err, PlacementError::InfeasibleField { .. }));
        assert_eq!(sched.phase(), SchedulerPhase::Idle);
        assert_eq!(sched.pending(), None);
        assert_eq!(toks.iter().map(|t| t.position()).collect::<Vec<_>>(), before);
        assert!(toks.iter().all(|t| t.is_revealed()));
    }

    #[test]
    fn test_crowded_field_aborts_round() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 3);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut sched = scheduler();

        let first = sched.start(3);
        let err = sched
            .tick(first.ticket, &mut toks, 50, Viewport::new(100, 60), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::PlacementExhausted {
                tokens: 3,
                capacity: 2
            }
        );
        assert!(toks.iter().all(|t| t.position() == UVec2::ZERO));
    }

    #[test]
    fn test_zero_rounds_hides_on_first_tick() {
        let mut platform = HeadlessPlatform::new(50, VIEW);
        let mut toks = tokens(&mut platform, 3);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sched = scheduler();

        let first = sched.start(0);
        assert_eq!(first.delay, Duration::ZERO);
        assert_eq!(
            sched.tick(first.ticket, &mut toks, 50, VIEW, &mut rng).unwrap(),
            TickOutcome::Obscured
        );
    }
}
