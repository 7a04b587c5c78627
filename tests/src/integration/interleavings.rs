//! # Randomized Interleavings
//!
//! Many transfers across three chains with the two rails driven in random
//! order: vendor settlements one at a time, relayer passes, and new
//! dispatches mixed freely. Whatever the schedule, every body arrives once
//! with its full amount and no value is created or lost.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{Harness, THREE_CHAINS};
    use ll_01_bridge_adapters::BridgeAdapterType;
    use ll_02_router::TestLiquidityLayerMessageRecipient;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_transport::RelayerConfig;
    use shared_types::{H256, U256};
    use std::sync::Arc;

    const TRANSFERS: usize = 24;
    const MAX_STEPS: usize = 2_000;

    struct Planned {
        origin: &'static str,
        destination: &'static str,
        adapter_type: BridgeAdapterType,
        amount: u64,
        recipient: H256,
        body: Vec<u8>,
        hook: Arc<TestLiquidityLayerMessageRecipient>,
    }

    fn sender(chain: &str) -> H256 {
        H256::from_low_u64_be(0x5E00 + u64::from(chain.as_bytes()[4]))
    }

    // A tight budget parks most early messages until their settlement lands.
    fn tight_harness() -> Harness {
        Harness::deploy_with_relayer(&THREE_CHAINS, RelayerConfig { max_attempts: 2 })
    }

    fn plan(h: &Harness, rng: &mut StdRng) -> Vec<Planned> {
        (0..TRANSFERS)
            .map(|i| {
                let origin = rng.gen_range(0..THREE_CHAINS.len());
                let offset = rng.gen_range(1..THREE_CHAINS.len());
                let destination = (origin + offset) % THREE_CHAINS.len();
                let adapter_type = BridgeAdapterType::ALL[rng.gen_range(0..2)];
                let recipient = H256::from_low_u64_be(0x1_0000 + i as u64);
                let destination = THREE_CHAINS[destination].0;
                Planned {
                    origin: THREE_CHAINS[origin].0,
                    destination,
                    adapter_type,
                    amount: rng.gen_range(1..=500),
                    recipient,
                    body: format!("transfer-{i}").into_bytes(),
                    hook: h.recipient(destination, recipient),
                }
            })
            .collect()
    }

    fn assert_all_delivered(h: &Harness, planned: &[Planned], supply: U256) {
        for p in planned {
            let received = p.hook.received();
            assert_eq!(received.len(), 1, "{:?} delivered once", String::from_utf8_lossy(&p.body));
            assert_eq!(received[0].body, p.body);
            assert_eq!(received[0].amount, U256::from(p.amount));
            assert_eq!(received[0].sender, sender(p.origin));
            assert_eq!(h.balance(p.destination, p.recipient), U256::from(p.amount));
        }
        assert_eq!(h.total_supply(), supply);
        assert_eq!(h.contract_holdings(), U256::zero());
        assert!(h.core.network().dead_letters().is_empty());
        for chain in h.app.chains() {
            assert!(h.router(&chain).undelivered_transfers().is_empty());
        }
    }

    async fn run_schedule(seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let h = tight_harness();
        let planned = plan(&h, &mut rng);
        for p in &planned {
            h.fund(p.origin, sender(p.origin), p.amount);
        }
        let supply = h.total_supply();

        let mut next = 0;
        for _ in 0..MAX_STEPS {
            let done = next == planned.len()
                && h.core.network().pending_count() == 0
                && h.core.network().parked_count() == 0
                && BridgeAdapterType::ALL
                    .iter()
                    .all(|t| h.vendor(*t).pending_count() == 0);
            if done {
                break;
            }

            match rng.gen_range(0..3) {
                0 if next < planned.len() => {
                    let p = &planned[next];
                    h.send(
                        p.origin,
                        sender(p.origin),
                        p.destination,
                        p.recipient,
                        p.amount,
                        p.adapter_type,
                        &p.body,
                    )
                    .await
                    .unwrap();
                    next += 1;
                }
                1 => {
                    let vendor = h.vendor(BridgeAdapterType::ALL[rng.gen_range(0..2)]);
                    vendor.settle_next().unwrap();
                }
                _ => {
                    let report = h.relay().await;
                    assert!(report.dead_lettered.is_empty(), "seed {seed}");
                }
            }
        }

        assert_eq!(next, planned.len(), "seed {seed} ran out of steps");
        assert_all_delivered(&h, &planned, supply);
    }

    #[tokio::test]
    async fn test_random_schedules() {
        for seed in 0..8 {
            run_schedule(seed).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch() {
        let h = Arc::new(tight_harness());
        let mut rng = StdRng::seed_from_u64(42);
        let planned = Arc::new(plan(&h, &mut rng));
        for p in planned.iter() {
            h.fund(p.origin, sender(p.origin), p.amount);
        }
        let supply = h.total_supply();

        let handles: Vec<_> = (0..planned.len())
            .map(|i| {
                let h = h.clone();
                let planned = planned.clone();
                tokio::spawn(async move {
                    let p = &planned[i];
                    h.send(
                        p.origin,
                        sender(p.origin),
                        p.destination,
                        p.recipient,
                        p.amount,
                        p.adapter_type,
                        &p.body,
                    )
                    .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Relay first so every message is deferred once.
        let early = h.relay().await;
        assert_eq!(early.deferred.len(), planned.len());
        h.settle_all();
        let late = h.relay().await;
        assert_eq!(late.delivered.len(), planned.len());

        assert_all_delivered(&h, &planned, supply);
    }
}
