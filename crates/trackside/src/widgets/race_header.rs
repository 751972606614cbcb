//! Header bar bound to the race control channel.
//!
//! Domain events arrive on the emitting thread; the header only queues them
//! and applies the queue during Update, so the tree is never touched from a
//! callback.

use std::collections::BTreeMap;

use crossbeam_channel::Receiver;
use trackside_shared::{DomainEvent, EventChannel, PilotId, RaceId};
use trackside_ui::{
    Color, DrawContext, NodeId, NodeTree, Rect, Sizing, Theme, TreeResult, UpdateContext, Widget,
};

/// Formats a lap time as `m:ss.mmm`, or `ss.mmm` under a minute.
#[must_use]
pub fn format_lap(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{seconds}.{millis:03}")
    }
}

/// Title, status and best lap of the current race.
#[derive(Debug)]
pub struct RaceHeader {
    events: Receiver<DomainEvent>,
    race: Option<RaceId>,
    running: bool,
    laps: u32,
    best: Option<(PilotId, u64)>,
    pilots: BTreeMap<PilotId, String>,
    fill: Color,
    text: Color,
    muted: Color,
    live: Color,
    best_color: Color,
}

impl RaceHeader {
    /// Creates a header draining `events`.
    #[must_use]
    pub fn new(events: Receiver<DomainEvent>, theme: &Theme) -> Self {
        Self {
            events,
            race: None,
            running: false,
            laps: 0,
            best: None,
            pilots: BTreeMap::new(),
            fill: theme.surface,
            text: theme.text,
            muted: theme.text_muted,
            live: theme.primary,
            best_color: theme.overall_best,
        }
    }

    /// Subscribes to `channel` and parents a header under `parent`.
    ///
    /// The subscription is owned by the header node and released when it is
    /// disposed.
    ///
    /// # Errors
    ///
    /// Fails if `parent` has been disposed; nothing stays subscribed then.
    pub fn attach(
        tree: &mut NodeTree,
        parent: NodeId,
        relative: Rect,
        channel: &EventChannel<DomainEvent>,
        theme: &Theme,
    ) -> TreeResult<NodeId> {
        let (subscription, events) = channel.subscribe_queue();
        let header = tree.create_with(Self::new(events, theme), relative, Sizing::Relative);
        tree.hold_subscription(header, subscription);
        if let Err(err) = tree.add_child(parent, header) {
            tree.dispose(header);
            return Err(err);
        }
        Ok(header)
    }

    /// The race on display.
    #[must_use]
    pub fn race(&self) -> Option<RaceId> {
        self.race
    }

    /// Applies one event. Returns true if anything visible changed.
    fn apply(&mut self, event: DomainEvent) -> bool {
        match event {
            DomainEvent::RaceChanged { race } => {
                if self.race == race {
                    return false;
                }
                tracing::debug!(?race, "race changed");
                self.race = race;
                self.running = false;
                self.laps = 0;
                self.best = None;
                true
            }
            DomainEvent::PilotAdded { pilot, name } => {
                self.pilots.insert(pilot, name);
                self.best.is_some_and(|(best, _)| best == pilot)
            }
            DomainEvent::PilotRemoved { pilot } => {
                self.pilots.remove(&pilot);
                self.best.is_some_and(|(best, _)| best == pilot)
            }
            DomainEvent::LapRecorded {
                race,
                pilot,
                lap_ms,
                ..
            } => {
                if self.race != Some(race) {
                    return false;
                }
                self.laps += 1;
                if self.best.map_or(true, |(_, best)| lap_ms < best) {
                    self.best = Some((pilot, lap_ms));
                }
                true
            }
            DomainEvent::RaceStarted { race } => self.set_running(race, true),
            DomainEvent::RaceEnded { race } => self.set_running(race, false),
        }
    }

    fn set_running(&mut self, race: RaceId, running: bool) -> bool {
        if self.race != Some(race) || self.running == running {
            return false;
        }
        self.running = running;
        true
    }

    fn title(&self) -> String {
        match self.race {
            Some(race) => format!("Race {}", race.raw()),
            None => "No race selected".to_string(),
        }
    }
}

impl Widget for RaceHeader {
    fn name(&self) -> &'static str {
        "race_header"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            changed |= self.apply(event);
        }
        if changed {
            ctx.request_redraw();
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        ctx.fill(self.fill);

        let title = self.title();
        if self.race.is_none() {
            ctx.text_at(&title, bounds.x + 12.0, bounds.y + 8.0, self.muted, 18.0);
            return;
        }
        ctx.text_at(&title, bounds.x + 12.0, bounds.y + 8.0, self.text, 18.0);

        let (status, color) = if self.running {
            ("LIVE", self.live)
        } else {
            ("READY", self.muted)
        };
        ctx.text_at(status, bounds.x + bounds.width * 0.4, bounds.y + 8.0, color, 18.0);

        let laps = format!("Laps {}", self.laps);
        ctx.text_at(&laps, bounds.x + bounds.width * 0.55, bounds.y + 8.0, self.text, 18.0);

        if let Some((pilot, ms)) = self.best {
            let who = self
                .pilots
                .get(&pilot)
                .cloned()
                .unwrap_or_else(|| pilot.to_string());
            let best = format!("Best {} {who}", format_lap(ms));
            ctx.text_at(&best, bounds.x + bounds.width * 0.7, bounds.y + 8.0, self.best_color, 18.0);
        }
    }
}
