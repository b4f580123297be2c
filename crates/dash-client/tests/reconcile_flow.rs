//! End-to-end reconciliation flow without a network: feeds applied in
//! arbitrary orders must converge to the same render decisions, and a parsed
//! DOP must window correctly against a wall clock.

use dash_client::blocks::{Block, Blocks, RenderContext, RenderInstruction};
use dash_client::image::{self, ImageKind};
use dash_client::schedule::{parser, window, EntryState, Schedule};
use dash_client::snapshot::{FeedUpdate, ViewSnapshot};
use dash_proto::api::{PartialImageInfo, ProgressResponse, ReceiverConfig};

fn receiver_config() -> ReceiverConfig {
    serde_json::from_value(serde_json::json!({
        "spacecraft": "GK-2A",
        "downlink": "LRIT",
        "interval": 1,
        "images": true,
        "vcid_blacklist": [4, 5],
        "version": "1.1.2",
    }))
    .unwrap()
}

fn feed_updates() -> Vec<FeedUpdate> {
    let progress: ProgressResponse = serde_json::from_str(
        r#"{"active_downloads": {
            "FD_202003121230": {
                "product_type": "FD",
                "product_name": "IMG_FD_202003121230",
                "segments_received": 4,
                "total_segments": 10,
                "progress_percent": 40.0,
                "channels": {"0": {"segment_count": 4, "segments": [1, 2, 3, 4]}}
            }
        }}"#,
    )
    .unwrap();

    vec![
        FeedUpdate::Vcid(Some(0)),
        FeedUpdate::LatestImage(Some("received/LRIT/20200312/FD/IMG_FD_OLD.jpg".to_string())),
        FeedUpdate::Progress(progress.into_downloads().unwrap()),
        FeedUpdate::Partial(vec![(
            "FD".to_string(),
            PartialImageInfo {
                path: "/data/partial/fd.jpg".to_string(),
                product_name: "IMG_FD_202003121230".to_string(),
                segments: 4,
                total_segments: 10,
            },
        )]),
    ]
}

/// Every permutation of feed arrival order yields the same snapshot and the
/// same image decision: the partial FD wins.
#[test]
fn feed_order_does_not_change_the_outcome() {
    let config = receiver_config();
    let updates = feed_updates();
    let n = updates.len();

    let mut decisions = Vec::new();
    // rotate through arrival orders (poll completions are unordered)
    for rotation in 0..n {
        let mut snapshot = ViewSnapshot::default();
        for i in 0..n {
            snapshot.apply(updates[(rotation + i) % n].clone());
        }
        decisions.push(image::select(&snapshot, &config));
    }

    for decision in &decisions {
        assert_eq!(decision.kind, ImageKind::Partial);
        assert_eq!(decision.url, "/api/latest/fd/partial");
        assert_eq!(
            decision.caption,
            "IMG_FD_202003121230_partial (4/10 segments)"
        );
        assert!(decision.emphasised);
    }
}

/// A dropped feed (no update applied) leaves its slice at the last good
/// value while the other feeds keep flowing.
#[test]
fn stale_slice_survives_a_failed_tick() {
    let mut snapshot = ViewSnapshot::default();
    for update in feed_updates() {
        snapshot.apply(update);
    }

    // next tick: image feed fails (nothing applied), vcid changes
    snapshot.apply(FeedUpdate::Vcid(Some(63)));

    assert_eq!(snapshot.current_vcid, Some(Some(63)));
    assert_eq!(
        snapshot.latest_image_path(),
        Some("received/LRIT/20200312/FD/IMG_FD_OLD.jpg")
    );
}

const DOP_FIXTURE: &[&str] = &[
    "GK-2A LRIT DAILY OPERATIONS PLAN (2020-03-12)",
    "",
    "TIME(UTC)\tID\tTYPE\tOPS",
    "000000-001000\tFD001\tFD\tO",
    "001000-002000\tEGMSG01\tEGMSG\tX",
    "002000-003000\tFD002\tFD\tO",
    "003000-004000\tANT001\tANT\tO",
    "004000-005000\tFD003\tFD\tO",
    "TOTAL 5 ENTRIES",
    "ABBREVIATIONS:",
    "FD: Full Disk, ANT: Alpha-numeric Text",
];

#[test]
fn dop_parses_and_windows_against_the_clock() {
    let lines: Vec<String> = DOP_FIXTURE.iter().map(|s| s.to_string()).collect();
    let schedule = parser::parse(&lines, "20200312");
    assert_eq!(schedule.entries.len(), 4, "EGMSG row dropped");

    let win = window::window_for(&schedule, "002500");
    assert_eq!(win.first_index, 0);
    assert_eq!(win.entries.len(), 4);

    let states: Vec<EntryState> = win.entries.iter().map(|(_, s)| *s).collect();
    assert_eq!(
        states,
        vec![
            EntryState::Past,    // FD001 ended 001000
            EntryState::Current, // FD002 spans 002500
            EntryState::Future,  // ANT001
            EntryState::Future,  // FD003 (also the final entry)
        ]
    );
}

/// Drive the block set the way a session does: build pass, then patch pass.
#[test]
fn blocks_build_then_patch_over_two_ticks() {
    let config = receiver_config();
    let lines: Vec<String> = DOP_FIXTURE.iter().map(|s| s.to_string()).collect();
    let schedule = parser::parse(&lines, "20200312");

    let mut snapshot = ViewSnapshot::default();
    for update in feed_updates() {
        snapshot.apply(update);
    }

    let mut blocks = Blocks::default();
    let ctx = RenderContext {
        receiver: &config,
        snapshot: &snapshot,
        schedule: &schedule,
        now_utc: chrono::Utc::now(),
        now_local: chrono::Local::now(),
    };

    let first: Vec<RenderInstruction> =
        blocks.render_all(&ctx).into_iter().map(|(_, i)| i).collect();
    assert!(matches!(first[0], RenderInstruction::BuildVchan { .. }));
    assert!(matches!(first[3], RenderInstruction::BuildSchedule { .. }));

    let second = blocks.render_all(&ctx);
    for (block, instruction) in second {
        match block {
            Block::VChan => {
                let RenderInstruction::PatchVchan { active } = instruction else {
                    panic!("vchan must patch after build");
                };
                // blacklisted 4 and 5 excluded; VCID 0 is the active one
                assert_eq!(active, vec![(0, true), (63, false)]);
            }
            Block::Schedule => {
                assert!(matches!(instruction, RenderInstruction::PatchSchedule { .. }));
            }
            Block::LatestImage => {
                let RenderInstruction::Image { url_changed, decision } = instruction else {
                    panic!("image block always decides");
                };
                assert!(!url_changed, "same snapshot, same URL");
                assert_eq!(decision.kind, ImageKind::Partial);
            }
            Block::Progress => {
                let RenderInstruction::Progress { status, .. } = instruction else {
                    panic!("progress fetched, must render");
                };
                assert_eq!(status, "1 active download(s)");
            }
            Block::Time => {
                assert!(matches!(instruction, RenderInstruction::Time { .. }));
            }
        }
    }

    // an empty schedule never rebuilds mid-session; it is skipped instead
    let empty = Schedule::empty("20200312");
    let ctx_empty = RenderContext {
        receiver: &config,
        snapshot: &snapshot,
        schedule: &empty,
        now_utc: chrono::Utc::now(),
        now_local: chrono::Local::now(),
    };
    let mut fresh = Blocks::default();
    let all = fresh.render_all(&ctx_empty);
    let schedule_instr = &all.iter().find(|(b, _)| *b == Block::Schedule).unwrap().1;
    assert_eq!(*schedule_instr, RenderInstruction::Skip);
}
