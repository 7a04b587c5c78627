//! # Integration Test Flows
//!
//! One transfer at a time through a two-chain deployment.
//!
//! ## Flows Tested
//!
//! 1. **Order independence**: settle-then-deliver and deliver-then-settle,
//!    including settlement after the relayer's retry budget is spent
//! 2. **Router authentication**: envelopes from unenrolled senders are dead-lettered
//! 3. **Recipient failure**: claimed funds are escrowed, then released by the owner
//! 4. **Vendor replay**: a duplicate settlement is refused and reverted
//! 5. **Vendor isolation**: Circle and Portal share nonces without colliding

#[cfg(test)]
mod tests {
    use crate::integration::harness::{owner, token, Harness, TWO_CHAINS};
    use ll_01_bridge_adapters::{
        BridgeAdapterApi, BridgeAdapterError, BridgeAdapterType, SentTransfer, SettlementState,
        VendorError,
    };
    use ll_02_router::{LiquidityLayerMessage, RouterError};
    use shared_transport::{MessageTransport, RelayerConfig};
    use shared_types::{H256, U256};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn sender() -> H256 {
        H256::from_low_u64_be(0x5E)
    }

    fn recipient() -> H256 {
        H256::from_low_u64_be(0xBEEF)
    }

    // =============================================================================
    // ORDER INDEPENDENCE
    // =============================================================================

    #[tokio::test]
    async fn test_settle_then_deliver() {
        for adapter_type in BridgeAdapterType::ALL {
            let h = Harness::deploy(&TWO_CHAINS);
            let hook = h.recipient("test2", recipient());
            h.fund("test1", sender(), 1000);

            h.send("test1", sender(), "test2", recipient(), 1000, adapter_type, &[0x00])
                .await
                .unwrap();
            h.settle_all();
            let report = h.relay().await;

            assert_eq!(report.delivered.len(), 1, "{adapter_type}");
            assert_eq!(h.balance("test2", recipient()), U256::from(1000));
            assert_eq!(h.balance("test1", sender()), U256::zero());
            assert_eq!(hook.count(), 1);
            assert_eq!(h.contract_holdings(), U256::zero());
        }
    }

    #[tokio::test]
    async fn test_deliver_then_settle() {
        for adapter_type in BridgeAdapterType::ALL {
            let h = Harness::deploy(&TWO_CHAINS);
            let hook = h.recipient("test2", recipient());
            h.fund("test1", sender(), 1000);

            h.send("test1", sender(), "test2", recipient(), 1000, adapter_type, &[0x00])
                .await
                .unwrap();

            let early = h.relay().await;
            assert_eq!(early.deferred.len(), 1);
            assert_eq!(hook.count(), 0);
            assert_eq!(h.balance("test2", recipient()), U256::zero());
            assert_eq!(h.core.network().pending_count(), 1);

            h.settle_all();
            let late = h.relay().await;
            assert_eq!(late.delivered.len(), 1);
            assert_eq!(h.balance("test2", recipient()), U256::from(1000));
            assert_eq!(hook.count(), 1);
            assert!(h.core.network().dead_letters().is_empty());
        }
    }

    #[tokio::test]
    async fn test_settlement_after_retry_budget_spent() {
        for adapter_type in BridgeAdapterType::ALL {
            let h = Harness::deploy_with_relayer(&TWO_CHAINS, RelayerConfig { max_attempts: 3 });
            let hook = h.recipient("test2", recipient());
            h.fund("test1", sender(), 1000);

            h.send("test1", sender(), "test2", recipient(), 1000, adapter_type, &[0x00])
                .await
                .unwrap();
            for _ in 0..3 {
                h.relay().await;
            }
            assert_eq!(h.core.network().parked_count(), 1, "{adapter_type}");
            assert!(h.core.network().dead_letters().is_empty());

            h.settle_all();
            for _ in 0..5 {
                h.relay().await;
            }
            assert_eq!(h.balance("test2", recipient()), U256::from(1000));
            assert_eq!(hook.count(), 1);
            assert_eq!(h.core.network().parked_count(), 0);
            assert!(h.core.network().dead_letters().is_empty());
            assert_eq!(h.contract_holdings(), U256::zero());
        }
    }

    #[tokio::test]
    async fn test_round_trip_conserves_supply() {
        let h = Harness::deploy(&TWO_CHAINS);
        let back = h.recipient("test1", sender());
        let there = h.recipient("test2", recipient());
        h.fund("test1", sender(), 700);
        let supply = h.total_supply();

        h.send("test1", sender(), "test2", recipient(), 700, BridgeAdapterType::Circle, b"out")
            .await
            .unwrap();
        h.settle_all();
        h.relay().await;

        h.ledger("test2")
            .approve(token(), recipient(), h.router("test2").address(), U256::from(300));
        h.send("test2", recipient(), "test1", sender(), 300, BridgeAdapterType::Portal, b"back")
            .await
            .unwrap();
        h.settle_all();
        h.relay().await;

        assert_eq!(h.balance("test1", sender()), U256::from(300));
        assert_eq!(h.balance("test2", recipient()), U256::from(400));
        assert_eq!(h.total_supply(), supply);
        assert_eq!((there.count(), back.count()), (1, 1));
    }

    // =============================================================================
    // ROUTER AUTHENTICATION
    // =============================================================================

    #[tokio::test]
    async fn test_unenrolled_sender_dead_lettered() {
        let h = Harness::deploy(&TWO_CHAINS);
        let hook = h.recipient("test2", recipient());
        h.fund("test1", sender(), 1000);
        h.send("test1", sender(), "test2", recipient(), 1000, BridgeAdapterType::Circle, b"")
            .await
            .unwrap();

        // A forged envelope naming the real settlement.
        let pending = h.vendor(BridgeAdapterType::Circle).pending();
        let sent = SentTransfer {
            correlation_key: ll_01_bridge_adapters::derive_correlation_key(
                BridgeAdapterType::Circle,
                pending[0].origin_vendor_domain,
                pending[0].nonce,
            ),
            origin_vendor_domain: pending[0].origin_vendor_domain,
            nonce: pending[0].nonce,
        };
        let thief = H256::from_low_u64_be(0x666);
        let forged = LiquidityLayerMessage::new(
            thief,
            thief,
            BridgeAdapterType::Circle,
            &sent,
            token(),
            U256::from(1000),
            vec![],
        );
        h.core
            .mailbox("test1")
            .unwrap()
            .dispatch(thief, h.domain("test2"), h.router("test2").address(), forged.encode().unwrap())
            .await
            .unwrap();

        h.settle_all();
        let report = h.relay().await;
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(report.dead_lettered.len(), 1);

        let dead = h.core.network().dead_letters();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].message.sender, thief);
        assert_eq!(h.balance("test2", thief), U256::zero());
        assert_eq!(h.balance("test2", recipient()), U256::from(1000));
        assert_eq!(hook.count(), 1);
    }

    #[tokio::test]
    async fn test_direct_handle_from_stranger() {
        let h = Harness::deploy(&TWO_CHAINS);
        let stranger = H256::from_low_u64_be(0x1234);
        let err = ll_02_router::LiquidityLayerRouterApi::handle_message(
            &*h.router("test2"),
            h.domain("test1"),
            stranger,
            &[1],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RouterError::UnenrolledRouter { .. }));
    }

    // =============================================================================
    // RECIPIENT FAILURE
    // =============================================================================

    #[tokio::test]
    async fn test_hook_failure_escrow_and_release() {
        let h = Harness::deploy(&TWO_CHAINS);
        let hook = h.recipient("test2", recipient());
        hook.set_failing(true);
        h.fund("test1", sender(), 250);

        h.send("test1", sender(), "test2", recipient(), 250, BridgeAdapterType::Portal, b"x")
            .await
            .unwrap();
        h.settle_all();
        let report = h.relay().await;
        assert_eq!(report.dead_lettered.len(), 1);

        let router = h.router("test2");
        let escrowed = router.undelivered_transfers();
        assert_eq!(escrowed.len(), 1);
        assert_eq!(escrowed[0].original_sender, sender());
        assert_eq!(escrowed[0].amount, U256::from(250));
        assert_eq!(h.balance("test2", router.address()), U256::from(250));
        assert_eq!(h.balance("test2", recipient()), U256::zero());

        // Redelivery cannot claim twice.
        let dead = h.core.network().dead_letters();
        hook.set_failing(false);
        assert!(h.core.network().requeue_dead_letter(dead[0].id));
        let retry = h.relay().await;
        assert_eq!(retry.dead_lettered.len(), 1);
        assert_eq!(hook.count(), 0);

        let key = escrowed[0].correlation_key;
        router
            .remediate_undelivered(owner(), key, recipient())
            .unwrap();
        assert_eq!(h.balance("test2", recipient()), U256::from(250));
        assert_eq!(h.balance("test2", router.address()), U256::zero());
        assert!(router.undelivered_transfers().is_empty());
    }

    // =============================================================================
    // VENDOR REPLAY
    // =============================================================================

    #[tokio::test]
    async fn test_replayed_settlement_refused() {
        for adapter_type in BridgeAdapterType::ALL {
            let h = Harness::deploy(&TWO_CHAINS);
            h.recipient("test2", recipient());
            h.fund("test1", sender(), 90);
            h.send("test1", sender(), "test2", recipient(), 90, adapter_type, b"")
                .await
                .unwrap();

            let vendor = h.vendor(adapter_type);
            let settlement = vendor.pending()[0].clone();
            h.settle_all();
            let supply = h.total_supply();

            let replay =
                vendor.replay_settlement(settlement.origin_vendor_domain, settlement.nonce);
            assert!(matches!(
                replay,
                Err(VendorError::Receiver(BridgeAdapterError::DuplicateSettlement(_)))
            ));
            assert_eq!(h.total_supply(), supply);

            h.relay().await;
            assert_eq!(h.balance("test2", recipient()), U256::from(90));
            assert_eq!(h.contract_holdings(), U256::zero());
        }
    }

    // =============================================================================
    // VENDOR ISOLATION
    // =============================================================================

    #[tokio::test]
    async fn test_vendors_do_not_collide() {
        let h = Harness::deploy(&TWO_CHAINS);
        let hook = h.recipient("test2", recipient());
        h.fund("test1", sender(), 30);

        h.send("test1", sender(), "test2", recipient(), 10, BridgeAdapterType::Circle, b"c")
            .await
            .unwrap();
        h.send("test1", sender(), "test2", recipient(), 20, BridgeAdapterType::Portal, b"p")
            .await
            .unwrap();

        let circle = h.vendor(BridgeAdapterType::Circle).pending()[0].clone();
        let portal = h.vendor(BridgeAdapterType::Portal).pending()[0].clone();
        assert_eq!((circle.nonce, portal.nonce), (0, 0));

        // Only Portal settles: only Portal's message is delivered.
        h.vendor(BridgeAdapterType::Portal).settle_all();
        let first = h.relay().await;
        assert_eq!((first.delivered.len(), first.deferred.len()), (1, 1));
        assert_eq!(h.balance("test2", recipient()), U256::from(20));

        let circle_adapter = h.app.adapter("test2", BridgeAdapterType::Circle).unwrap();
        let circle_key = ll_01_bridge_adapters::derive_correlation_key(
            BridgeAdapterType::Circle,
            circle.origin_vendor_domain,
            circle.nonce,
        );
        assert_eq!(circle_adapter.settlement_state(&circle_key), SettlementState::Unknown);

        h.vendor(BridgeAdapterType::Circle).settle_all();
        h.relay().await;
        assert_eq!(h.balance("test2", recipient()), U256::from(30));
        assert_eq!(circle_adapter.settlement_state(&circle_key), SettlementState::Claimed);

        let bodies: Vec<Vec<u8>> = hook.received().into_iter().map(|r| r.body).collect();
        assert_eq!(bodies, vec![b"p".to_vec(), b"c".to_vec()]);
    }
}
