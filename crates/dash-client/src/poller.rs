//! The poll loop: one session per UTC day.
//!
//! A session owns the snapshot, the schedule and the block states. Two timers
//! drive it: a 100 ms clock tick that only repaints the Time block, and the
//! receiver-configured poll tick that fires the four feed fetches. Each tick
//! spawns its fetches onto a helper task and sends the batch back over a
//! channel, so a slow receiver never stalls the clock or the rollover check.
//! Completions apply in whatever order the network produces, which is safe
//! because each feed replaces only its own snapshot slice.
//!
//! On UTC date rollover the session ends and the caller starts a fresh one,
//! mirroring the upstream dashboard's full page reload: the schedule's
//! lexicographic HHMMSS comparisons are only valid within the day it was
//! built for.

use chrono::{Local, Utc};
use dash_proto::api::ReceiverConfig;
use dash_proto::config::Config;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{self, ReceiverApi};
use crate::blocks::{Block, Blocks, RenderContext, RenderInstruction};
use crate::error::FeedError;
use crate::schedule::{self, parser, Schedule};
use crate::snapshot::{FeedUpdate, ViewSnapshot};

/// Clock-tick period for the Time block.
const CLOCK_TICK_MS: u64 = 100;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The UTC date no longer matches the schedule's build date.
    DateRollover,
}

/// True when the schedule was built for a different UTC day than `today`.
/// Checked once per poll tick; the session ends on the first mismatch, so the
/// restart fires exactly once per date change.
fn rollover_due(schedule_date: &str, today: &str) -> bool {
    schedule_date != today
}

pub struct Session {
    api: ReceiverApi,
    receiver: ReceiverConfig,
    poll_secs: u64,
    snapshot: ViewSnapshot,
    schedule: Schedule,
    blocks: Blocks,
    render_tx: mpsc::Sender<(Block, RenderInstruction)>,
}

impl Session {
    /// Build a session for the current UTC day, downloading the DOP schedule
    /// when the spacecraft has a provider. Schedule failure is non-fatal; the
    /// block just stays empty for the day.
    pub async fn start(
        local: &Config,
        api: ReceiverApi,
        receiver: ReceiverConfig,
        render_tx: mpsc::Sender<(Block, RenderInstruction)>,
    ) -> Self {
        let date = schedule::utc_date_stamp();
        let schedule = if receiver.spacecraft == "GK-2A" {
            match api::fetch_schedule_lines(
                api.client(),
                &local.schedule.proxy_url,
                &date,
                &receiver.downlink,
            )
            .await
            {
                Ok(lines) => {
                    let sch = parser::parse(&lines, &date);
                    info!("[schedule] loaded {} entries for {}", sch.entries.len(), date);
                    sch
                }
                Err(e) => {
                    warn!("[schedule] download failed, block stays empty: {e}");
                    Schedule::empty(&date)
                }
            }
        } else {
            debug!(
                "[schedule] no DOP provider for {}, skipping",
                receiver.spacecraft
            );
            Schedule::empty(&date)
        };

        let poll_secs = local
            .receiver
            .interval_override_secs
            .unwrap_or(receiver.interval)
            .max(1);

        Self {
            api,
            receiver,
            poll_secs,
            snapshot: ViewSnapshot::default(),
            schedule,
            blocks: Blocks::default(),
            render_tx,
        }
    }

    /// Run until date rollover.
    pub async fn run(mut self) -> SessionEnd {
        let mut clock_tick =
            tokio::time::interval(std::time::Duration::from_millis(CLOCK_TICK_MS));
        clock_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut poll_tick =
            tokio::time::interval(std::time::Duration::from_secs(self.poll_secs));
        poll_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // consume the interval's immediate first tick; the double startup
        // poll below takes its place
        poll_tick.tick().await;

        let (feed_tx, mut feed_rx) =
            mpsc::channel::<Vec<Result<FeedUpdate, FeedError>>>(4);

        // Poll twice up front to mask the empty default state before the
        // first round trip resolves. Cosmetic, not load-bearing.
        self.spawn_poll(feed_tx.clone());
        self.spawn_poll(feed_tx.clone());

        loop {
            tokio::select! {
                _ = clock_tick.tick() => {
                    self.emit_time();
                }
                _ = poll_tick.tick() => {
                    if rollover_due(&self.schedule.date, &schedule::utc_date_stamp()) {
                        info!("[poll] UTC date rolled over, ending session");
                        return SessionEnd::DateRollover;
                    }
                    self.spawn_poll(feed_tx.clone());
                }
                Some(batch) = feed_rx.recv() => {
                    for result in batch {
                        self.apply_feed(result);
                    }
                    self.emit_all().await;
                }
            }
        }
    }

    /// One poll tick: four concurrent independent fetches on a helper task,
    /// batched back over `tx` for the session task to apply. A failed feed is
    /// logged and its slice keeps the previous value; no feed blocks another.
    fn spawn_poll(&self, tx: mpsc::Sender<Vec<Result<FeedUpdate, FeedError>>>) {
        let api = self.api.clone();
        tokio::spawn(async move {
            let (vcid, image, progress, partial) = tokio::join!(
                api.fetch_vcid(),
                api.fetch_latest_image(),
                api.fetch_progress(),
                api.fetch_partial(),
            );
            let batch = vec![
                vcid.map(FeedUpdate::Vcid),
                image.map(FeedUpdate::LatestImage),
                progress.map(FeedUpdate::Progress),
                partial.map(FeedUpdate::Partial),
            ];
            let _ = tx.send(batch).await;
        });
    }

    fn apply_feed(&mut self, result: Result<FeedUpdate, FeedError>) {
        match result {
            Ok(update) => {
                debug!("[poll] {} updated", update.feed_name());
                self.snapshot.apply(update);
            }
            // stale-but-valid beats empty: the slice keeps its prior value
            Err(e) => warn!("[poll] feed failed: {e}"),
        }
    }

    /// Time frames repaint ten times a second; dropping one on a full channel
    /// is invisible, so this send stays lossy.
    fn emit_time(&mut self) {
        let ctx = RenderContext {
            receiver: &self.receiver,
            snapshot: &self.snapshot,
            schedule: &self.schedule,
            now_utc: Utc::now(),
            now_local: Local::now(),
        };
        let instruction = self.blocks.render(Block::Time, &ctx);
        let _ = self.render_tx.try_send((Block::Time, instruction));
    }

    /// Poll-tick instructions must all land: a dropped build would leave the
    /// block marked built but never constructed downstream, so these sends
    /// wait for channel space.
    async fn emit_all(&mut self) {
        let ctx = RenderContext {
            receiver: &self.receiver,
            snapshot: &self.snapshot,
            schedule: &self.schedule,
            now_utc: Utc::now(),
            now_local: Local::now(),
        };
        let instructions = self.blocks.render_all(&ctx);
        for (block, instruction) in instructions {
            if instruction == RenderInstruction::Skip {
                continue;
            }
            if self.render_tx.send((block, instruction)).await.is_err() {
                // receiver gone, nothing left to paint
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleEntry;
    use std::time::Duration;

    #[test]
    fn rollover_fires_only_on_date_change() {
        assert!(!rollover_due("20200312", "20200312"));
        assert!(rollover_due("20200312", "20200313"));
        // an empty-but-stamped schedule still rolls over
        let sch = Schedule::empty("20200312");
        assert!(rollover_due(&sch.date, "20200313"));
    }

    fn receiver() -> ReceiverConfig {
        ReceiverConfig {
            spacecraft: "GK-2A".to_string(),
            downlink: "LRIT".to_string(),
            interval: 1,
            images: true,
            vcid_blacklist: Vec::new(),
            version: "1.1".to_string(),
        }
    }

    fn session_with(
        api: ReceiverApi,
        schedule: Schedule,
        render_tx: mpsc::Sender<(Block, RenderInstruction)>,
    ) -> Session {
        Session {
            api,
            receiver: receiver(),
            poll_secs: 1,
            snapshot: ViewSnapshot::default(),
            schedule,
            blocks: Blocks::default(),
            render_tx,
        }
    }

    #[tokio::test]
    async fn clock_keeps_ticking_while_fetches_hang() {
        // A bound-but-never-accepted socket: connections complete but no
        // response ever comes, so every fetch hangs until its timeout.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let api = ReceiverApi::with_timeout(&format!("http://{addr}"), Duration::from_secs(5));

        let (render_tx, mut render_rx) = mpsc::channel(256);
        let session = session_with(api, Schedule::empty(&schedule::utc_date_stamp()), render_tx);

        let _ = tokio::time::timeout(Duration::from_millis(1200), session.run()).await;

        let mut time_frames = 0;
        while let Ok((block, _)) = render_rx.try_recv() {
            if block == Block::Time {
                time_frames += 1;
            }
        }
        assert!(time_frames >= 5, "clock starved: {time_frames} Time frames");
    }

    #[tokio::test]
    async fn build_instructions_survive_a_full_channel() {
        let schedule = Schedule {
            date: "20200312".to_string(),
            entries: vec![ScheduleEntry {
                start: "000000".to_string(),
                end: "235959".to_string(),
                product_type: "FD".to_string(),
                product_id: "FD001".to_string(),
                label: "Full Disk".to_string(),
                operational: true,
            }],
        };

        // Capacity one: a lossy send would drop everything after the first
        // instruction even though the blocks already flipped to built.
        let (render_tx, mut render_rx) = mpsc::channel(1);
        let mut session = session_with(ReceiverApi::new("http://127.0.0.1:1"), schedule, render_tx);
        session.snapshot.apply(FeedUpdate::Progress(Vec::new()));

        let emitter = tokio::spawn(async move {
            session.emit_all().await;
        });

        let mut seen = Vec::new();
        while let Some((block, _)) = render_rx.recv().await {
            seen.push(block);
        }
        emitter.await.unwrap();

        for block in [Block::VChan, Block::Schedule, Block::Progress] {
            assert!(seen.contains(&block), "{} instruction lost", block.title());
        }
    }
}
