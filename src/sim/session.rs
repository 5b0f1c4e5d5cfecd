//! One player's game: tokens, schedule and judge for the current run
//!
//! Timer tickets and selections arrive independently and are handled in
//! arrival order on the single event thread.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::judge::{JudgePhase, SequenceJudge, Verdict};
use super::placement::PlacementField;
use super::scheduler::{RoundScheduler, TickOutcome, TickTicket};
use super::token::{Token, TokenId};
use crate::consts::*;
use crate::error::{GameError, PlacementError};
use crate::platform::Platform;
use crate::settings::Settings;

pub struct GameSession<P: Platform> {
    platform: P,
    settings: Settings,
    /// Seed the RNG was created from
    seed: u64,
    rng: Pcg32,
    tokens: Vec<Token<P::Handle>>,
    scheduler: RoundScheduler,
    /// `None` between runs
    judge: Option<SequenceJudge>,
    /// Runs started so far
    runs: u64,
}

impl<P: Platform> GameSession<P> {
    pub fn new(platform: P, settings: Settings, seed: u64) -> Self {
        let scheduler = RoundScheduler::new(settings.pacing, settings.placement);
        Self {
            platform,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tokens: Vec::new(),
            scheduler,
            judge: None,
            runs: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn tokens(&self) -> &[Token<P::Handle>] {
        &self.tokens
    }

    pub fn scheduler(&self) -> &RoundScheduler {
        &self.scheduler
    }

    pub fn judge(&self) -> Option<&SequenceJudge> {
        self.judge.as_ref()
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Start a fresh run with `count` tokens, replacing any current run
    pub fn start_run(&mut self, count: usize) -> Result<(), GameError> {
        self.settings.check_token_count(count)?;
        if self.settings.palette.len() < count {
            return Err(GameError::InvalidSettings(format!(
                "palette has {} colors for {} tokens",
                self.settings.palette.len(),
                count
            )));
        }

        self.clear_game();

        // A field that cannot hold a single token fails before anything is shown
        if let Err(e) = PlacementField::new(self.platform.footprint(), self.platform.viewport()) {
            log::warn!("Run not started: {}", e);
            self.platform.notify(MSG_PLACEMENT_FAILED);
            return Err(e.into());
        }

        let mut colors: Vec<String> = self.settings.palette[..count].to_vec();
        colors.shuffle(&mut self.rng);

        for (i, color) in colors.into_iter().enumerate() {
            let id = TokenId(i as u32 + 1);
            let label = id.to_string();
            let handle = self.platform.create_token(id, &label, &color);
            self.tokens.push(Token::new(id, label, color, handle));
        }

        self.judge = Some(SequenceJudge::identity(count));
        self.runs += 1;

        let first = self.scheduler.start(count as u32);
        self.platform.schedule(first.delay, first.ticket);
        log::info!(
            "Run {} started with {} tokens, first shuffle in {:?}",
            self.runs,
            count,
            first.delay
        );
        Ok(())
    }

    /// Tear down the current run. The pending tick is cancelled first so
    /// it can never touch the next run's tokens.
    pub fn clear_game(&mut self) {
        if let Some(ticket) = self.scheduler.stop() {
            self.platform.cancel(ticket);
        }
        for token in self.tokens.drain(..) {
            token.destroy();
        }
        self.judge = None;
        self.platform.clear_notification();
    }

    /// Deliver a fired timer
    pub fn on_tick(&mut self, ticket: TickTicket) -> Result<TickOutcome, PlacementError> {
        let footprint = self.platform.footprint();
        let viewport = self.platform.viewport();
        let outcome = self.scheduler.tick(
            ticket,
            &mut self.tokens,
            footprint,
            viewport,
            &mut self.rng,
        );

        match &outcome {
            Ok(TickOutcome::Relocated { next, .. }) => {
                self.platform.schedule(next.delay, next.ticket);
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Shuffle aborted: {}", e);
                // The run is over, no verdict can follow
                self.judge = None;
                self.platform.notify(MSG_PLACEMENT_FAILED);
            }
        }
        outcome
    }

    /// The player picked `id`
    pub fn select(&mut self, id: TokenId) -> Verdict {
        let Some(judge) = self.judge.as_mut() else {
            return Verdict::Ignored;
        };

        let verdict = judge.submit(id, &mut self.tokens);
        match verdict {
            Verdict::Success => {
                log::info!("Run {} solved", self.runs);
                self.platform.notify(MSG_SUCCESS);
            }
            Verdict::Failed { expected, got } => {
                log::info!("Run {} failed: expected {}, got {}", self.runs, expected, got);
                self.platform.notify(MSG_WRONG_ORDER);
            }
            Verdict::Accepted { .. } | Verdict::Ignored => {}
        }
        verdict
    }

    /// Judge phase of the current run
    pub fn judge_phase(&self) -> Option<JudgePhase> {
        self.judge.as_ref().map(|j| j.phase())
    }
}
