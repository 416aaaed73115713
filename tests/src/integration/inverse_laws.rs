//! # Inverse Laws
//!
//! Every forward ledger operation has an exact inverse:
//!
//! - `apply_unconfirmed → apply_confirmed → undo_confirmed → undo_unconfirmed`
//!   leaves every account as it was, for each transaction kind
//! - ticking blocks forward and then backward over the same chain leaves the
//!   round fields (balances, fees, rewards, block counters) as they were
//!
//! Comparisons ignore `block_id`, the back-reference to the last block that
//! touched an account.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use shared_crypto::Ed25519KeyPair;
    use shared_types::constants::fees;
    use shared_types::{
        Account, Address, Amount, DelegateAsset, KeyChange, PublicKey, SecondSignatureAsset,
        Transaction, TransactionAsset,
    };

    use crate::fixtures::{
        block_at, delegate_keys, funded, round_fields, signed, without_block_id, Ledger,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Run `tx` through both tracks and back, re-reading the sender before
    /// each step.
    async fn round_trip(ledger: &Ledger, sender: Address, tx: &Transaction) {
        let block = block_at(7);
        let applier = &ledger.applier;

        applier
            .apply_unconfirmed(tx, &ledger.account(sender))
            .await
            .unwrap();
        applier
            .apply_confirmed(tx, &block, &ledger.account(sender))
            .await
            .unwrap();
        applier
            .undo_confirmed(tx, &block, &ledger.account(sender))
            .await
            .unwrap();
        applier
            .undo_unconfirmed(tx, &ledger.account(sender))
            .await
            .unwrap();
    }

    fn assert_restored(ledger: &Ledger, original: &Account) {
        assert_eq!(
            without_block_id(ledger.account(original.address)),
            without_block_id(original.clone())
        );
    }

    // =============================================================================
    // TRANSACTION KINDS
    // =============================================================================

    #[tokio::test]
    async fn test_send_inverse() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, sender) = funded("alice", 10_000_000);
        ledger.store.insert_account(sender.clone());
        let recipient = Address::new(42);
        let tx = signed(&keypair, TransactionAsset::Send, Some(recipient), 100, 10);

        round_trip(&ledger, sender.address, &tx).await;

        assert_restored(&ledger, &sender);
        assert_eq!(
            without_block_id(ledger.account(recipient)),
            Account::new(recipient)
        );
    }

    #[tokio::test]
    async fn test_vote_inverse() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, sender) = funded("alice", 10 * fees::VOTE);
        ledger.store.insert_account(sender.clone());
        let delegate = PublicKey::new([5; 32]);
        let tx = signed(
            &keypair,
            TransactionAsset::Vote(vec![KeyChange::Add(delegate)]),
            Some(sender.address),
            0,
            fees::VOTE,
        );

        round_trip(&ledger, sender.address, &tx).await;

        assert_restored(&ledger, &sender);
    }

    #[tokio::test]
    async fn test_vote_removal_inverse() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, mut sender) = funded("alice", 10 * fees::VOTE);
        let delegate = PublicKey::new([5; 32]);
        sender.delegates = vec![delegate];
        sender.u_delegates = vec![delegate];
        ledger.store.insert_account(sender.clone());
        let tx = signed(
            &keypair,
            TransactionAsset::Vote(vec![KeyChange::Remove(delegate)]),
            Some(sender.address),
            0,
            fees::VOTE,
        );

        round_trip(&ledger, sender.address, &tx).await;

        assert_restored(&ledger, &sender);
    }

    #[tokio::test]
    async fn test_delegate_registration_inverse() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, sender) = funded("alice", 30 * fees::DELEGATE);
        ledger.store.insert_account(sender.clone());
        let asset = DelegateAsset {
            username: "alice".into(),
            public_key: Some(keypair.public_key()),
        };
        let tx = signed(
            &keypair,
            TransactionAsset::Delegate(asset),
            None,
            0,
            fees::DELEGATE,
        );

        round_trip(&ledger, sender.address, &tx).await;

        assert_restored(&ledger, &sender);
    }

    #[tokio::test]
    async fn test_second_signature_inverse() {
        let ledger = Ledger::new(101, Vec::new());
        let (keypair, sender) = funded("alice", 20 * fees::SECOND_SIGNATURE);
        ledger.store.insert_account(sender.clone());
        let second = Ed25519KeyPair::from_secret("alice second").unwrap();
        let tx = signed(
            &keypair,
            TransactionAsset::SecondSignature(SecondSignatureAsset {
                public_key: second.public_key(),
            }),
            None,
            0,
            fees::SECOND_SIGNATURE,
        );

        round_trip(&ledger, sender.address, &tx).await;

        assert_restored(&ledger, &sender);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_send_inverse_for_any_amount(
            amount in 1u64..=5_000_000,
            fee in 0u64..=1_000,
        ) {
            runtime().block_on(async {
                let ledger = Ledger::new(101, Vec::new());
                let (keypair, sender) = funded("alice", 10_000_000);
                ledger.store.insert_account(sender.clone());
                let recipient = Address::new(9);
                let tx = signed(&keypair, TransactionAsset::Send, Some(recipient), amount, fee);

                round_trip(&ledger, sender.address, &tx).await;

                assert_restored(&ledger, &sender);
                assert_eq!(ledger.account(recipient).balance, Amount::ZERO);
            });
        }

        #[test]
        fn prop_backward_ticks_restore_round_fields(
            delegates in 2usize..=4,
            length in 2usize..=12,
            blocks in prop::collection::vec((0usize..4, 0u64..=1_000, 0u64..=500), 12),
        ) {
            runtime().block_on(async {
                let keys = delegate_keys(4);
                let ranking = keys[..delegates].iter().map(|k| k.public_key()).collect();
                let ledger = Ledger::new(delegates as u64, ranking);

                let generators: Vec<&Ed25519KeyPair> = blocks[..length]
                    .iter()
                    .map(|(g, _, _)| &keys[g % delegates])
                    .collect();
                let fees: Vec<u64> = blocks[..length].iter().map(|(_, f, _)| *f).collect();
                let rewards: Vec<u64> = blocks[..length].iter().map(|(_, _, r)| *r).collect();
                let chain = ledger.append_chain(&generators, &fees, &rewards).await;

                ledger.rounds.tick(&chain[0]).await.unwrap();
                let before: Vec<_> = keys
                    .iter()
                    .map(|k| round_fields(&ledger.account_of(&k.public_key())))
                    .collect();

                for block in &chain[1..] {
                    ledger.rounds.tick(block).await.unwrap();
                }
                for i in (1..chain.len()).rev() {
                    ledger.rounds.backward_tick(&chain[i], &chain[i - 1]).await.unwrap();
                }

                let after: Vec<_> = keys
                    .iter()
                    .map(|k| round_fields(&ledger.account_of(&k.public_key())))
                    .collect();
                assert_eq!(after, before);
                assert!(!ledger.flags.rounds_ticking());
            });
        }
    }
}
