use std::collections::HashMap;
use std::time::Duration;

use reversi_engine::{Challenge, Effect, Point, RenderData, Strategy, Ticket, TimerKind};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::CaptchaConfig;
use crate::error::CaptchaError;

type Reply<T> = oneshot::Sender<Result<T, CaptchaError>>;

enum Command {
    Render(Reply<RenderData>),
    Place(Point, Reply<RenderData>),
    Pass(Reply<RenderData>),
    Reset(Reply<RenderData>),
    Dismiss(Reply<RenderData>),
    Fire(Ticket),
}

/// Handle to a challenge running on its own tokio task.
///
/// The task owns the [`Challenge`] and one abortable timer per
/// [`TimerKind`]. Dropping every handle stops the task and aborts its timers.
#[derive(Debug, Clone)]
pub struct ChallengeHandle {
    tx: mpsc::UnboundedSender<Command>,
    updates: watch::Receiver<RenderData>,
}

impl ChallengeHandle {
    /// Spawn a task driving `challenge`. `on_satisfied` runs at most once,
    /// when the player has lost and the success delay has elapsed.
    pub fn spawn<S, F>(challenge: Challenge<S>, on_satisfied: F) -> Self
    where
        S: Strategy + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (updates_tx, updates) = watch::channel(challenge.render());

        let runner = Runner {
            challenge,
            timers: HashMap::new(),
            tx: tx.downgrade(),
            updates: updates_tx,
            on_satisfied: Some(Box::new(on_satisfied)),
            announced: false,
        };
        tokio::spawn(runner.run(rx));

        ChallengeHandle { tx, updates }
    }

    /// Spawn against the random opponent using `config`.
    pub fn from_config<F>(config: &CaptchaConfig, on_satisfied: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(config.challenge(), on_satisfied)
    }

    /// Receiver that sees fresh render data after every state change,
    /// including opponent moves made by timers.
    pub fn subscribe(&self) -> watch::Receiver<RenderData> {
        self.updates.clone()
    }

    pub async fn render(&self) -> Result<RenderData, CaptchaError> {
        self.request(Command::Render).await
    }

    pub async fn place_stone(&self, point: Point) -> Result<RenderData, CaptchaError> {
        self.request(|reply| Command::Place(point, reply)).await
    }

    pub async fn pass(&self) -> Result<RenderData, CaptchaError> {
        self.request(Command::Pass).await
    }

    pub async fn reset(&self) -> Result<RenderData, CaptchaError> {
        self.request(Command::Reset).await
    }

    pub async fn dismiss(&self) -> Result<RenderData, CaptchaError> {
        self.request(Command::Dismiss).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, CaptchaError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .map_err(|_| CaptchaError::Closed)?;
        response.await.map_err(|_| CaptchaError::Closed)?
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Render(_) => write!(f, "Render"),
            Command::Place(point, _) => write!(f, "Place({point:?})"),
            Command::Pass(_) => write!(f, "Pass"),
            Command::Reset(_) => write!(f, "Reset"),
            Command::Dismiss(_) => write!(f, "Dismiss"),
            Command::Fire(ticket) => write!(f, "Fire({ticket:?})"),
        }
    }
}

struct Runner<S> {
    challenge: Challenge<S>,
    timers: HashMap<TimerKind, (Ticket, JoinHandle<()>)>,
    /// Weak so pending timers do not keep the task alive.
    tx: mpsc::WeakUnboundedSender<Command>,
    updates: watch::Sender<RenderData>,
    on_satisfied: Option<Box<dyn FnOnce() + Send>>,
    /// Outcome of the current game already logged.
    announced: bool,
}

impl<S: Strategy> Runner<S> {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let effects = self.challenge.start();
        self.apply(effects);
        self.publish();

        while let Some(command) = rx.recv().await {
            match command {
                Command::Render(reply) => {
                    let _ = reply.send(Ok(self.challenge.render()));
                    continue;
                }
                Command::Place(point, reply) => {
                    let result = self.challenge.place_stone(point);
                    if result.is_ok() {
                        tracing::debug!("Player placed at {point:?}");
                    }
                    self.respond(result, reply);
                }
                Command::Pass(reply) => {
                    let result = self.challenge.pass();
                    if result.is_ok() {
                        tracing::debug!("Player passed");
                    }
                    self.respond(result, reply);
                }
                Command::Reset(reply) => {
                    tracing::info!("Challenge reset");
                    self.announced = false;
                    let effects = self.challenge.reset();
                    self.respond(Ok(effects), reply);
                }
                Command::Dismiss(reply) => {
                    tracing::info!("Challenge dismissed");
                    let effects = self.challenge.dismiss();
                    self.respond(Ok(effects), reply);
                }
                Command::Fire(ticket) => self.fire(ticket),
            }
            self.publish();
        }

        for (_, (_, handle)) in self.timers.drain() {
            handle.abort();
        }
        tracing::debug!("Challenge task stopped");
    }

    fn respond(
        &mut self,
        result: Result<Vec<Effect>, reversi_engine::ReversiError>,
        reply: Reply<RenderData>,
    ) {
        let response = match result {
            Ok(effects) => {
                self.apply(effects);
                Ok(self.challenge.render())
            }
            Err(e) => {
                tracing::debug!("Action rejected: {e}");
                Err(CaptchaError::Rejected(e))
            }
        };
        let _ = reply.send(response);
    }

    fn fire(&mut self, ticket: Ticket) {
        if self
            .timers
            .get(&ticket.kind)
            .is_some_and(|(pending, _)| *pending == ticket)
        {
            self.timers.remove(&ticket.kind);
        }

        let before = self.challenge.engine().moves().len();
        let effects = self.challenge.fire(ticket);
        if ticket.kind == TimerKind::OpponentMove {
            match self.challenge.engine().moves().get(before) {
                Some(turn) => tracing::debug!(
                    "Opponent ({}) answered: {} {:?}",
                    self.challenge.strategy().name(),
                    turn.kind,
                    turn.pos
                ),
                None => tracing::debug!("Ignoring stale timer {ticket:?}"),
            }
        }
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { ticket, delay_ms } => self.schedule(ticket, delay_ms),
                Effect::Cancel { ticket } => {
                    if let Some((_, handle)) = self.timers.remove(&ticket.kind) {
                        handle.abort();
                    }
                }
                Effect::Satisfied => match self.on_satisfied.take() {
                    Some(callback) => {
                        tracing::info!("Challenge satisfied");
                        callback();
                    }
                    None => tracing::warn!("Challenge satisfied twice; ignoring"),
                },
            }
        }

        if !self.announced
            && let Some(outcome) = self.challenge.engine().outcome()
        {
            self.announced = true;
            let counts = self.challenge.engine().counts();
            tracing::info!(
                "Game over: {outcome} ({})",
                reversi_engine::score::format_result(counts)
            );
        }
    }

    fn schedule(&mut self, ticket: Ticket, delay_ms: u64) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Command::Fire(ticket));
            }
        });

        if let Some((_, previous)) = self.timers.insert(ticket.kind, (ticket, handle)) {
            previous.abort();
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.challenge.render());
    }
}
