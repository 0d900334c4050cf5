//! Turn loop between two move sources.

use crate::players::MoveSource;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strictly_checkers::{
    Color, GameState, GameViewState, LegalityPolicy, MoveError, MoveOutcome, Permissive,
    PlayerMove, RuleEngine, project,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Messages sent from the runner to presentation layers.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A move was applied to the board.
    MoveApplied {
        /// Side that moved.
        color: Color,
        /// The move as proposed.
        mv: PlayerMove,
        /// What it did.
        outcome: MoveOutcome,
    },
    /// A move was refused and the board left unchanged.
    MoveRejected {
        /// Side that tried to move.
        color: Color,
        /// The refused move.
        mv: PlayerMove,
        /// Why it was refused.
        error: MoveError,
    },
    /// Fresh board snapshot after a turn.
    StateChanged(GameViewState),
    /// The loop ended. `winner` is `None` when it was stopped early.
    GameOver {
        /// The winner, if the game was decided.
        winner: Option<Color>,
    },
}

/// The two injected move sources.
pub struct GameEnvironment {
    red: Box<dyn MoveSource>,
    black: Box<dyn MoveSource>,
}

impl GameEnvironment {
    /// Pairs a source for each color.
    pub fn new(red: Box<dyn MoveSource>, black: Box<dyn MoveSource>) -> Self {
        Self { red, black }
    }

    /// The source playing `color`.
    pub fn source(&self, color: Color) -> &dyn MoveSource {
        match color {
            Color::Red => self.red.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    fn source_mut(&mut self, color: Color) -> &mut dyn MoveSource {
        match color {
            Color::Red => self.red.as_mut(),
            Color::Black => self.black.as_mut(),
        }
    }
}

/// What happens to the turn when the engine refuses a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectedMovePolicy {
    /// The refused move still uses up the turn.
    #[default]
    ConsumesTurn,
    /// The same side is asked again.
    Retry,
}

/// Loop settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerOptions {
    /// Turn handling for refused moves.
    pub rejected_move: RejectedMovePolicy,
    /// Stop after this many move requests without a winner.
    pub max_turns: Option<usize>,
}

/// Lifecycle of a [`GameRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RunnerPhase {
    /// Created, not yet started.
    Idle,
    /// Loop is running.
    Playing,
    /// A winner was decided.
    Finished,
    /// Stopped early by request, turn limit or a failing move source.
    Stopped,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// The winner, if decided.
    pub winner: Option<Color>,
    /// Move requests answered, refused moves included.
    pub turns: usize,
    /// Final phase, [`RunnerPhase::Finished`] or [`RunnerPhase::Stopped`].
    pub phase: RunnerPhase,
}

/// Requests a running game to stop.
///
/// A pending move request is abandoned.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Signals the runner to stop.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// True once a stop was requested.
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Drives a game: asks each side for moves, applies them, detects the
/// winner and republishes the board.
///
/// All state mutation happens inside [`GameRunner::run`], so the state
/// needs no locking.
pub struct GameRunner {
    state: GameState,
    environment: GameEnvironment,
    engine: RuleEngine<Box<dyn LegalityPolicy>>,
    options: RunnerOptions,
    phase: RunnerPhase,
    turns: usize,
    events: Option<mpsc::UnboundedSender<GameEvent>>,
    snapshot: watch::Sender<GameViewState>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

impl GameRunner {
    /// Creates an idle runner with the permissive ruleset.
    pub fn new(state: GameState, environment: GameEnvironment) -> Self {
        let (snapshot, _) = watch::channel(project(&state));
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            state,
            environment,
            engine: RuleEngine::new(Box::new(Permissive)),
            options: RunnerOptions::default(),
            phase: RunnerPhase::Idle,
            turns: 0,
            events: None,
            snapshot,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    /// Screens moves with `policy` instead of accepting everything.
    pub fn with_policy(mut self, policy: impl LegalityPolicy + 'static) -> Self {
        self.engine = RuleEngine::new(Box::new(policy));
        self
    }

    /// Replaces the loop settings.
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends [`GameEvent`]s to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// The authoritative state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    /// The injected move sources.
    pub fn environment(&self) -> &GameEnvironment {
        &self.environment
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> GameViewState {
        self.snapshot.borrow().clone()
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<GameViewState> {
        self.snapshot.subscribe()
    }

    /// Handle for stopping the loop from outside.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Runs the loop on a new task.
    pub fn spawn(mut self) -> JoinHandle<Result<GameOutcome>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Plays until a winner emerges or the loop is stopped.
    ///
    /// # Errors
    ///
    /// Fails if the runner was already started or a move source fails. The
    /// runner is left [`RunnerPhase::Stopped`] in the latter case.
    #[instrument(skip(self), fields(red = %self.environment.red.name(), black = %self.environment.black.name()))]
    pub async fn run(&mut self) -> Result<GameOutcome> {
        if self.phase != RunnerPhase::Idle {
            bail!("Game runner already started (phase {})", self.phase);
        }
        self.phase = RunnerPhase::Playing;
        info!(first = %self.state.current_player(), "Starting game");

        let result = self.play().await;
        if result.is_err() {
            self.phase = RunnerPhase::Stopped;
        }
        result
    }

    async fn play(&mut self) -> Result<GameOutcome> {
        let decided = self.state.settle_winner();
        self.publish();
        if let Some(winner) = decided {
            return Ok(self.finish(winner));
        }

        loop {
            if let Some(limit) = self.options.max_turns
                && self.turns >= limit
            {
                info!(limit, "Turn limit reached");
                return Ok(self.halt());
            }

            let color = self.state.current_player();
            let source = self.environment.source_mut(color);
            let name = source.name().to_owned();
            debug!(source = %name, color = %color, "Waiting for move");

            let request = source.next_move(&self.state);
            let next = tokio::select! {
                biased;
                () = stop_requested(&mut self.stop_rx) => None,
                result = request => Some(
                    result.with_context(|| format!("{name} failed to move for {color}"))?
                ),
            };
            let Some(mv) = next else {
                info!("Stop requested");
                return Ok(self.halt());
            };

            self.turns += 1;
            let consumed = self.apply(color, mv);
            let winner = self.state.settle_winner();
            if consumed {
                self.state.toggle_turn();
            }
            self.publish();

            if let Some(winner) = winner {
                return Ok(self.finish(winner));
            }
        }
    }

    /// Applies `mv` and reports whether it used up the turn.
    fn apply(&mut self, color: Color, mv: PlayerMove) -> bool {
        match self.engine.apply(&mut self.state, mv, color) {
            Ok(outcome) => {
                info!(color = %color, mv = %mv, captured = outcome.captured.is_some(), "Move applied");
                self.emit(GameEvent::MoveApplied { color, mv, outcome });
                true
            }
            Err(error) => {
                warn!(color = %color, mv = %mv, error = %error, "Move rejected");
                self.emit(GameEvent::MoveRejected { color, mv, error });
                self.options.rejected_move == RejectedMovePolicy::ConsumesTurn
            }
        }
    }

    fn publish(&self) {
        let view = project(&self.state);
        self.snapshot.send_replace(view.clone());
        self.emit(GameEvent::StateChanged(view));
    }

    fn emit(&self, event: GameEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }

    fn finish(&mut self, winner: Color) -> GameOutcome {
        info!(winner = %winner, turns = self.turns, "Game over");
        self.phase = RunnerPhase::Finished;
        self.emit(GameEvent::GameOver {
            winner: Some(winner),
        });
        self.outcome()
    }

    fn halt(&mut self) -> GameOutcome {
        self.phase = RunnerPhase::Stopped;
        self.emit(GameEvent::GameOver { winner: None });
        self.outcome()
    }

    fn outcome(&self) -> GameOutcome {
        GameOutcome {
            winner: self.state.winner(),
            turns: self.turns,
            phase: self.phase,
        }
    }
}

/// Resolves once the stop flag is raised.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Sender gone: nobody can stop us any more.
            std::future::pending::<()>().await;
        }
    }
}
