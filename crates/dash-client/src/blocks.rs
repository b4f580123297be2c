//! The five dashboard blocks and their render decisions.
//!
//! A block never draws; it returns a [`RenderInstruction`] describing what an
//! external presentation layer should do to its surface. Every block carries
//! an explicit build state: `Unbuilt` until its first instruction constructs
//! the surface, then `Built` and patched each tick. State is never inferred
//! from previously rendered output.

use chrono::{DateTime, Local, Utc};
use dash_proto::api::ReceiverConfig;

use crate::image::{self, ImageDecision};
use crate::progress::{self, ProgressView};
use crate::schedule::{window, EntryState, Schedule};
use crate::snapshot::ViewSnapshot;

/// Identity of a dashboard block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    VChan,
    Time,
    LatestImage,
    Schedule,
    Progress,
}

impl Block {
    pub const ALL: [Block; 5] = [
        Block::VChan,
        Block::Time,
        Block::LatestImage,
        Block::Schedule,
        Block::Progress,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Block::VChan => "Virtual Channel",
            Block::Time => "Time",
            Block::LatestImage => "Latest Image",
            Block::Schedule => "Schedule",
            Block::Progress => "Download Progress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Unbuilt,
    Built,
}

/// One virtual-channel indicator in the VChan block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VchanIndicator {
    pub vcid: u8,
    pub code: &'static str,
    pub name: &'static str,
    pub blacklisted: bool,
}

/// One row of the schedule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// `HH:MM:SS`, colonised from the entry's HHMMSS.
    pub start: String,
    pub end: String,
    pub product_type: String,
    pub product_id: String,
    pub state: EntryState,
}

/// Everything the blocks need to decide a render, read-only.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub receiver: &'a ReceiverConfig,
    pub snapshot: &'a ViewSnapshot,
    pub schedule: &'a Schedule,
    pub now_utc: DateTime<Utc>,
    pub now_local: DateTime<Local>,
}

/// What the presentation layer should do to one block's surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Leave the surface untouched (data not yet available, or unchanged).
    Skip,
    /// Construct the indicator set once.
    BuildVchan { indicators: Vec<VchanIndicator> },
    /// Toggle active flags; blacklisted channels are never listed here.
    PatchVchan { active: Vec<(u8, bool)> },
    /// Repaint both clocks. Formatting is the renderer's concern.
    Time {
        local: DateTime<Local>,
        utc: DateTime<Utc>,
    },
    /// Show `decision`; touch the image element only when `url_changed`.
    Image {
        decision: ImageDecision,
        url_changed: bool,
    },
    /// Construct the schedule table shell and header once.
    BuildSchedule { header: String },
    /// Rewrite the visible schedule rows. `all_started` marks the
    /// end-of-day tail window (every entry's start has passed).
    PatchSchedule {
        rows: Vec<ScheduleRow>,
        all_started: bool,
    },
    /// Rewrite the progress list.
    Progress { status: String, view: ProgressView },
}

/// Per-spacecraft virtual-channel tables.
fn vchan_table(spacecraft: &str) -> &'static [(u8, &'static str, &'static str)] {
    match spacecraft {
        "GK-2A" => &[
            (0, "FD", "Full Disk"),
            (4, "ANT", "Alpha-numeric Text"),
            (5, "ADD", "Additional Data"),
            (63, "IDLE", "Fill Data"),
        ],
        _ => &[],
    }
}

fn colonise(hhmmss: &str) -> String {
    // the parser only admits six ASCII digits, but a hand-built entry must
    // not be able to split a char boundary here
    if hhmmss.len() == 6 && hhmmss.is_ascii() {
        format!("{}:{}:{}", &hhmmss[0..2], &hhmmss[2..4], &hhmmss[4..6])
    } else {
        hhmmss.to_string()
    }
}

/// Build/patch state for all five blocks, driven once per tick.
#[derive(Debug)]
pub struct Blocks {
    vchan: BlockState,
    schedule: BlockState,
    /// Last image decision, for the URL-change check.
    last_image: Option<ImageDecision>,
}

impl Default for Blocks {
    fn default() -> Self {
        Self {
            vchan: BlockState::Unbuilt,
            schedule: BlockState::Unbuilt,
            last_image: None,
        }
    }
}

impl Blocks {
    /// Render one block against the current context.
    pub fn render(&mut self, block: Block, ctx: &RenderContext<'_>) -> RenderInstruction {
        match block {
            Block::VChan => self.render_vchan(ctx),
            Block::Time => RenderInstruction::Time {
                local: ctx.now_local,
                utc: ctx.now_utc,
            },
            Block::LatestImage => self.render_image(ctx),
            Block::Schedule => self.render_schedule(ctx),
            Block::Progress => Self::render_progress(ctx),
        }
    }

    /// Render every block in declaration order.
    pub fn render_all(&mut self, ctx: &RenderContext<'_>) -> Vec<(Block, RenderInstruction)> {
        Block::ALL
            .iter()
            .map(|&b| (b, self.render(b, ctx)))
            .collect()
    }

    fn render_vchan(&mut self, ctx: &RenderContext<'_>) -> RenderInstruction {
        let table = vchan_table(&ctx.receiver.spacecraft);
        if table.is_empty() {
            return RenderInstruction::Skip;
        }
        match self.vchan {
            BlockState::Unbuilt => {
                self.vchan = BlockState::Built;
                let indicators = table
                    .iter()
                    .map(|&(vcid, code, name)| VchanIndicator {
                        vcid,
                        code,
                        name,
                        blacklisted: ctx.receiver.vcid_blacklist.contains(&vcid),
                    })
                    .collect();
                RenderInstruction::BuildVchan { indicators }
            }
            BlockState::Built => {
                let current = ctx.snapshot.current_vcid.flatten();
                let active = table
                    .iter()
                    .filter(|(vcid, _, _)| !ctx.receiver.vcid_blacklist.contains(vcid))
                    .map(|&(vcid, _, _)| (vcid, Some(vcid) == current))
                    .collect();
                RenderInstruction::PatchVchan { active }
            }
        }
    }

    fn render_image(&mut self, ctx: &RenderContext<'_>) -> RenderInstruction {
        let decision = image::select(ctx.snapshot, ctx.receiver);
        let url_changed = self
            .last_image
            .as_ref()
            .map(|prev| prev.url != decision.url)
            .unwrap_or(true);
        self.last_image = Some(decision.clone());
        RenderInstruction::Image {
            decision,
            url_changed,
        }
    }

    fn render_schedule(&mut self, ctx: &RenderContext<'_>) -> RenderInstruction {
        if ctx.schedule.is_empty() {
            return RenderInstruction::Skip;
        }
        match self.schedule {
            BlockState::Unbuilt => {
                self.schedule = BlockState::Built;
                RenderInstruction::BuildSchedule {
                    header: format!(
                        "{} {} Schedule",
                        ctx.receiver.spacecraft, ctx.receiver.downlink
                    ),
                }
            }
            BlockState::Built => {
                let now = ctx.now_utc.format("%H%M%S").to_string();
                let win = window::window_for(ctx.schedule, &now);
                let rows = win
                    .entries
                    .iter()
                    .map(|(entry, state)| ScheduleRow {
                        start: colonise(&entry.start),
                        end: colonise(&entry.end),
                        product_type: entry.product_type.clone(),
                        product_id: entry.product_id.clone(),
                        state: *state,
                    })
                    .collect();
                RenderInstruction::PatchSchedule {
                    rows,
                    all_started: win.all_started,
                }
            }
        }
    }

    fn render_progress(ctx: &RenderContext<'_>) -> RenderInstruction {
        // Distinct from NoActiveDownloads: before the first fetch lands the
        // block is left alone entirely.
        let Some(downloads) = ctx.snapshot.active_downloads.as_deref() else {
            return RenderInstruction::Skip;
        };
        let view = progress::summarize(downloads);
        let status = match &view {
            ProgressView::NoActiveDownloads => "No active downloads".to_string(),
            ProgressView::Active(items) => format!("{} active download(s)", items.len()),
        };
        RenderInstruction::Progress { status, view }
    }
}
