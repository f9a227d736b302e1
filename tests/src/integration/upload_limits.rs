//! # Upload Limit Integration Scenarios
//!
//! Drives the governor through the runtime container with a pinned clock,
//! covering the full life of a capped relay day:
//!
//! 1. **Historical serving** eats the target byte by byte until the node
//!    hangs up on the offending peer
//! 2. **Recent blocks** keep flowing free of charge even with the budget gone
//! 3. **Window reset** after 24h reopens historical serving
//! 4. **Privileged peers** are never disconnected, whatever the target
//! 5. **Concurrent fetchers** share one window, overshooting by at most one
//!    in-flight block each
//!
//! All scenarios run against the real channel transport so hangup delivery
//! and teardown reporting are exercised, not mocked.

#[cfg(test)]
mod tests {
    use node_runtime::adapters::PeerDelivery;
    use node_runtime::{GovernorContainer, NodeConfig};
    use parking_lot::Mutex;
    use shared_types::NodeId;
    use std::sync::Arc;
    use std::thread;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tr_01_upload_governor::ports::outbound::BlockMeta;
    use tr_01_upload_governor::{GovernorError, ServeOutcome, UploadGovernorApi};

    const START: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    // 800 MiB daily target, the tuning the limit was designed around.
    const TARGET: u64 = 800 << 20;
    // Default reserve: one day of new-block relay at 4 MB per block.
    const RESERVE: u64 = 144 * 4_000_000;

    const OLD_BLOCK_SIZE: u64 = 1_000_000;
    const TIP_BLOCK_SIZE: u64 = 250_000;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn peer(n: u8) -> NodeId {
        NodeId([n; 32])
    }

    /// A relay pinned at `START` with the given upload target and the
    /// default reserve.
    fn relay_with_target(max_upload_target: u64) -> GovernorContainer {
        let mut config = NodeConfig::default();
        config.upload.max_upload_target = max_upload_target;
        config.clock.mock_time = Some(START);
        GovernorContainer::new(config)
    }

    /// Seed the store with a chain: one heavyweight block from twelve days
    /// ago and a fresh-ish tip from two days ago.
    fn seed_chain(container: &GovernorContainer) -> (BlockMeta, BlockMeta) {
        let old_block = BlockMeta {
            hash: [0xAA; 32],
            size_bytes: OLD_BLOCK_SIZE,
            produced_at: START - 12 * DAY,
        };
        let tip = BlockMeta {
            hash: [0xBB; 32],
            size_bytes: TIP_BLOCK_SIZE,
            produced_at: START - 2 * DAY,
        };
        container.store().insert(old_block);
        container.store().insert(tip);
        (old_block, tip)
    }

    /// Drain a delivery channel, returning (blocks seen, hangups seen).
    fn drain(rx: &mut UnboundedReceiver<PeerDelivery>) -> (usize, usize) {
        let mut blocks = 0;
        let mut hangups = 0;
        while let Ok(delivery) = rx.try_recv() {
            match delivery {
                PeerDelivery::Block(_) => blocks += 1,
                PeerDelivery::Hangup => hangups += 1,
            }
        }
        (blocks, hangups)
    }

    // =============================================================================
    // SCENARIO 1: HISTORICAL SERVING EXHAUSTS THE TARGET
    // =============================================================================

    /// A peer hammering one heavyweight old block gets exactly the budget's
    /// worth of blocks, then one denial with a hangup, then silence.
    #[test]
    fn test_historical_serving_consumes_the_daily_target() {
        let container = relay_with_target(TARGET);
        let (old_block, _tip) = seed_chain(&container);
        let service = container.service();

        let mut rx = container.connect_peer(peer(0), false).unwrap();

        // Serving continues while headroom is positive, so the fetch that
        // crosses the line still goes out.
        let available = TARGET - RESERVE;
        let expected_sends = (available / OLD_BLOCK_SIZE + 1) as usize;
        assert_eq!(expected_sends, 263);

        let mut sent = 0;
        let mut denied = 0;
        let mut ignored = 0;
        for _ in 0..300 {
            match service.handle_block_request(peer(0), old_block.hash).unwrap() {
                ServeOutcome::Sent { bytes } => {
                    assert_eq!(bytes, OLD_BLOCK_SIZE);
                    sent += 1;
                }
                ServeOutcome::Denied => {
                    // The denial lands right after the last funded send.
                    assert_eq!(sent, expected_sends);
                    denied += 1;
                }
                ServeOutcome::Ignored => ignored += 1,
            }
        }
        assert_eq!(sent, expected_sends);
        assert_eq!(denied, 1);
        assert_eq!(ignored, 300 - expected_sends - 1);

        // Every funded block hit the wire, then the hangup.
        let (blocks, hangups) = drain(&mut rx);
        assert_eq!(blocks, expected_sends);
        assert_eq!(hangups, 1);

        let status = service.upload_status();
        assert_eq!(status.bytes_served, expected_sends as u64 * OLD_BLOCK_SIZE);
        assert_eq!(status.bytes_left, 0);
        assert!(!status.serve_historical);
        // The reserve tripped the limit long before the raw target.
        assert!(!status.target_reached);

        // The per-peer ledger counted every send.
        let snapshot = service.peer_snapshots();
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot[0].privileged);
        assert_eq!(snapshot[0].blocks_served, expected_sends as u64);
        assert_eq!(snapshot[0].bytes_served, expected_sends as u64 * OLD_BLOCK_SIZE);

        // The session loop confirms the close; the id goes stale.
        container.peer_departed(peer(0));
        assert_eq!(
            service.handle_block_request(peer(0), old_block.hash),
            Err(GovernorError::UnknownPeer(peer(0)))
        );
    }

    // =============================================================================
    // SCENARIO 2: RECENT BLOCKS STAY FREE
    // =============================================================================

    /// With the whole target eaten by the reserve, recent blocks still flow,
    /// uncharged, and only the historical fetch draws the hangup.
    #[test]
    fn test_recent_blocks_flow_free_under_exhausted_target() {
        // Target equal to the reserve: zero bytes for historical serving.
        let container = relay_with_target(RESERVE);
        let (old_block, tip) = seed_chain(&container);
        let service = container.service();

        let mut rx = container.connect_peer(peer(1), false).unwrap();

        for _ in 0..800 {
            assert_eq!(
                service.handle_block_request(peer(1), tip.hash).unwrap(),
                ServeOutcome::Sent {
                    bytes: TIP_BLOCK_SIZE
                }
            );
        }

        // 200 MB went out without touching the budget.
        let status = service.upload_status();
        assert_eq!(status.bytes_served, 0);
        assert_eq!(status.bytes_left, 0);

        // One historical request is one too many.
        assert_eq!(
            service.handle_block_request(peer(1), old_block.hash).unwrap(),
            ServeOutcome::Denied
        );

        let (blocks, hangups) = drain(&mut rx);
        assert_eq!(blocks, 800);
        assert_eq!(hangups, 1);

        // The per-peer ledger kept counting the free sends.
        let snapshot = service.peer_snapshots();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].blocks_served, 800);
        assert_eq!(snapshot[0].bytes_served, 800 * TIP_BLOCK_SIZE);
    }

    // =============================================================================
    // SCENARIO 3: THE WINDOW RESETS AFTER 24 HOURS
    // =============================================================================

    /// Once the clock crosses the window boundary the spent budget is
    /// forgotten and historical serving reopens for surviving peers.
    #[test]
    fn test_window_reset_reopens_historical_serving() {
        let container = relay_with_target(TARGET);
        let service = container.service();

        // One block heavy enough to exhaust the budget in two fetches.
        let heavy = BlockMeta {
            hash: [0xCC; 32],
            size_bytes: 150_000_000,
            produced_at: START - 12 * DAY,
        };
        let tip = BlockMeta {
            hash: [0xBB; 32],
            size_bytes: TIP_BLOCK_SIZE,
            produced_at: START - 2 * DAY,
        };
        container.store().insert(heavy);
        container.store().insert(tip);

        let _rx1 = container.connect_peer(peer(1), false).unwrap();
        let mut rx2 = container.connect_peer(peer(2), false).unwrap();

        // 262.8 MB available: two 150 MB fetches fit under the positive
        // headroom rule, the third draws the hangup.
        for _ in 0..2 {
            assert_eq!(
                service.handle_block_request(peer(1), heavy.hash).unwrap(),
                ServeOutcome::Sent { bytes: 150_000_000 }
            );
        }
        assert_eq!(
            service.handle_block_request(peer(1), heavy.hash).unwrap(),
            ServeOutcome::Denied
        );

        // A day later the second peer, never disconnected, is served again.
        container.clock().mock().unwrap().advance(DAY);
        assert_eq!(
            service.handle_block_request(peer(2), heavy.hash).unwrap(),
            ServeOutcome::Sent { bytes: 150_000_000 }
        );
        let (blocks, hangups) = drain(&mut rx2);
        assert_eq!((blocks, hangups), (1, 0));

        // The fresh window only remembers the post-reset fetch.
        let status = service.upload_status();
        assert_eq!(status.bytes_served, 150_000_000);
        assert_eq!(status.window_resets_in_secs, DAY);
        assert!(status.serve_historical);
    }

    // =============================================================================
    // SCENARIO 4: PRIVILEGED PEERS ARE NEVER CUT OFF
    // =============================================================================

    /// Under a 1 MiB target nothing historical is fundable, yet the
    /// privileged peer keeps fetching while an ordinary peer is dropped on
    /// its first attempt.
    #[test]
    fn test_privileged_peer_survives_a_tiny_target() {
        let container = relay_with_target(1 << 20);
        let (old_block, _tip) = seed_chain(&container);
        let service = container.service();

        let mut privileged_rx = container.connect_peer(peer(3), true).unwrap();
        let mut ordinary_rx = container.connect_peer(peer(4), false).unwrap();

        for _ in 0..20 {
            assert_eq!(
                service.handle_block_request(peer(3), old_block.hash).unwrap(),
                ServeOutcome::Sent {
                    bytes: OLD_BLOCK_SIZE
                }
            );
        }

        assert_eq!(
            service.handle_block_request(peer(4), old_block.hash).unwrap(),
            ServeOutcome::Denied
        );

        let (blocks, hangups) = drain(&mut privileged_rx);
        assert_eq!((blocks, hangups), (20, 0));
        let (blocks, hangups) = drain(&mut ordinary_rx);
        assert_eq!((blocks, hangups), (0, 1));

        // Privileged traffic never touches the budget.
        assert_eq!(service.upload_status().bytes_served, 0);
    }

    // =============================================================================
    // SCENARIO 5: CONCURRENT FETCHERS SHARE ONE WINDOW
    // =============================================================================

    /// Two fetcher threads race one window sized for exactly twenty blocks.
    /// The ledger the threads keep must agree with what each session channel
    /// delivered and with the governor's own books.
    #[test]
    fn test_concurrent_fetchers_share_one_window() {
        let container = relay_with_target(RESERVE + 20 * OLD_BLOCK_SIZE);
        let (old_block, _tip) = seed_chain(&container);
        let service = container.service();

        let served_log: Arc<Mutex<Vec<(NodeId, u64)>>> = Arc::new(Mutex::new(Vec::new()));

        let mut receivers = Vec::new();
        let mut fetchers = Vec::new();
        for n in [5, 6] {
            let id = peer(n);
            receivers.push((id, container.connect_peer(id, false).unwrap()));

            let service = container.service();
            let log = Arc::clone(&served_log);
            fetchers.push(thread::spawn(move || loop {
                match service.handle_block_request(id, old_block.hash).unwrap() {
                    ServeOutcome::Sent { bytes } => log.lock().push((id, bytes)),
                    ServeOutcome::Denied => break,
                    ServeOutcome::Ignored => {
                        panic!("peer {} raced its own teardown", hex::encode(id.0))
                    }
                }
            }));
        }
        for fetcher in fetchers {
            fetcher.join().unwrap();
        }

        // Both threads can pass the last positive headroom check before
        // either charge lands: at most one extra block per thread.
        let log = served_log.lock();
        assert!((20..=21).contains(&log.len()), "sent {} blocks", log.len());
        assert!(log.iter().all(|(_, bytes)| *bytes == OLD_BLOCK_SIZE));

        let status = service.upload_status();
        assert_eq!(status.bytes_served, log.len() as u64 * OLD_BLOCK_SIZE);
        assert_eq!(status.bytes_left, 0);
        assert!(!status.serve_historical);

        // Each thread's tally matches the per-peer ledger and its channel.
        for record in service.peer_snapshots() {
            let from_log = log.iter().filter(|(id, _)| *id == record.peer_id).count();
            assert_eq!(record.blocks_served, from_log as u64);
        }
        for (id, mut rx) in receivers {
            let from_log = log.iter().filter(|(p, _)| *p == id).count();
            let (blocks, hangups) = drain(&mut rx);
            assert_eq!(blocks, from_log, "deliveries for {}", hex::encode(id.0));
            assert_eq!(hangups, 1);
        }
    }

    // =============================================================================
    // SCENARIO 6: MALFORMED TARGETS ABORT STARTUP
    // =============================================================================

    /// A target the parser rejects must stop the node before any peer is
    /// accepted, with the canonical error line.
    #[test]
    fn test_startup_rejects_malformed_target() {
        let err = NodeConfig::from_lookup(|var| {
            (var == "TR_MAX_UPLOAD_TARGET").then(|| "abc".to_string())
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse TR_MAX_UPLOAD_TARGET: 'abc'");
    }
}
