//! # Ledger Properties
//!
//! Random operation sequences driven against a staffed ledger:
//!
//! - stage only moves forward, one step per successful transition
//! - failed operations leave stage, documents and logs untouched
//! - evidence grows by exactly one record per successful operation
//! - batch creation is all-or-nothing
//! - an individual batch claim never touches siblings or the batch

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use proptest::prelude::*;
    use shared_types::{ErrorKind, ItemId, LedgerError, Principal, Stage};
    use subsidy_runtime::SubsidyLedger;

    #[derive(Debug, Clone, Copy)]
    enum ItemOp {
        Process,
        Transport,
        Distribute,
        Claim { with_receipt: bool },
        AddDocument(Stage),
        LogAction,
    }

    fn item_op() -> impl Strategy<Value = ItemOp> {
        prop_oneof![
            Just(ItemOp::Process),
            Just(ItemOp::Transport),
            Just(ItemOp::Distribute),
            any::<bool>().prop_map(|with_receipt| ItemOp::Claim { with_receipt }),
            prop::sample::select(Stage::ALL.to_vec()).prop_map(ItemOp::AddDocument),
            Just(ItemOp::LogAction),
        ]
    }

    fn caller() -> impl Strategy<Value = Principal> {
        prop::sample::select(PRINCIPALS.to_vec())
    }

    fn apply(
        ledger: &mut SubsidyLedger,
        op: ItemOp,
        caller: Principal,
        id: ItemId,
        now: u64,
    ) -> Result<(), LedgerError> {
        match op {
            ItemOp::Process => ledger.process_item(caller, id, "ipfs://p", now),
            ItemOp::Transport => ledger.transport_item(caller, id, "ipfs://t", now),
            ItemOp::Distribute => ledger.distribute_item(caller, id, "ipfs://d", now),
            ItemOp::Claim { with_receipt } => {
                let receipt = with_receipt.then_some("ipfs://receipt");
                ledger.claim_subsidy(caller, id, receipt, now)
            }
            ItemOp::AddDocument(stage) => ledger.add_document(caller, id, stage, "ipfs://x", now),
            ItemOp::LogAction => ledger.log_action(caller, id, "inspected", now),
        }
        .map(|_| ())
    }

    /// Documents and log entries a successful `op` adds.
    fn evidence_added(op: ItemOp) -> (usize, usize) {
        match op {
            ItemOp::Process | ItemOp::Transport | ItemOp::Distribute => (1, 1),
            ItemOp::Claim { with_receipt } => (usize::from(with_receipt), 1),
            ItemOp::AddDocument(_) => (1, 1),
            ItemOp::LogAction => (0, 1),
        }
    }

    fn is_transition(op: ItemOp) -> bool {
        matches!(
            op,
            ItemOp::Process | ItemOp::Transport | ItemOp::Distribute | ItemOp::Claim { .. }
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn property_item_ops_are_monotonic_and_atomic(
            ops in prop::collection::vec((item_op(), caller()), 1..40),
        ) {
            let mut ledger = staffed_ledger();
            let (id, _) = ledger.create_item(PROCESSOR, BENEFICIARY, GENESIS_TIME).unwrap();

            for (step, (op, caller)) in ops.into_iter().enumerate() {
                let before = ledger.item(id).unwrap();
                let docs_before = ledger.documents(id).unwrap().len();
                let logs_before = ledger.logs(id).unwrap().len();

                let result = apply(&mut ledger, op, caller, id, GENESIS_TIME + step as u64);
                let after = ledger.item(id).unwrap();
                let docs_after = ledger.documents(id).unwrap().len();
                let logs_after = ledger.logs(id).unwrap().len();

                prop_assert!(after.stage >= before.stage);
                prop_assert_eq!(after.beneficiary, before.beneficiary);

                match result {
                    Ok(()) => {
                        if is_transition(op) {
                            prop_assert_eq!(Some(after.stage), before.stage.next());
                        } else {
                            prop_assert_eq!(after.stage, before.stage);
                        }
                        let (docs, logs) = evidence_added(op);
                        prop_assert_eq!(docs_after, docs_before + docs);
                        prop_assert_eq!(logs_after, logs_before + logs);
                    }
                    Err(_) => {
                        prop_assert_eq!(&after, &before);
                        prop_assert_eq!(docs_after, docs_before);
                        prop_assert_eq!(logs_after, logs_before);
                    }
                }
                prop_assert_eq!(after.claimed, after.stage == Stage::Claimed);
            }
        }

        #[test]
        fn property_roleless_callers_change_nothing(
            ops in prop::collection::vec(item_op(), 1..20),
        ) {
            let mut ledger = staffed_ledger();
            let (id, _) = ledger.create_item(PROCESSOR, OTHER_BENEFICIARY, GENESIS_TIME).unwrap();
            let item = ledger.item(id).unwrap();
            let docs = ledger.documents(id).unwrap();
            let logs = ledger.logs(id).unwrap();

            for op in ops {
                let err = apply(&mut ledger, op, STRANGER, id, GENESIS_TIME + 1).unwrap_err();
                prop_assert_eq!(err.kind(), ErrorKind::Unauthorized);
            }

            prop_assert_eq!(ledger.item(id).unwrap(), item);
            prop_assert_eq!(ledger.documents(id).unwrap(), docs);
            prop_assert_eq!(ledger.logs(id).unwrap(), logs);
        }

        #[test]
        fn property_batch_creation_is_all_or_nothing(
            fresh in 1usize..8,
            advanced in prop::collection::vec(any::<bool>(), 1..8),
            missing in any::<bool>(),
        ) {
            let mut ledger = staffed_ledger();
            let mut ids = fresh_items(&mut ledger, BENEFICIARY, fresh);
            for (id, advance) in ids.clone().into_iter().zip(advanced) {
                if advance {
                    ledger.process_item(PROCESSOR, id, "ipfs://p", GENESIS_TIME).unwrap();
                }
            }
            if missing {
                ids.push(ledger.item_count() + 1);
            }

            let items_before: Vec<_> = (1..=ledger.item_count())
                .map(|id| (ledger.item(id).unwrap(), ledger.logs(id).unwrap().len()))
                .collect();
            let all_fresh = items_before.iter().all(|(item, _)| item.stage == Stage::Created);

            let result = ledger.create_batch(PROCESSOR, &ids, "lot", GENESIS_TIME + 1);

            if all_fresh && !missing {
                prop_assert!(result.is_ok());
                prop_assert_eq!(ledger.batch_count(), 1);
                for (item, _) in &items_before {
                    let now = ledger.item(item.id).unwrap();
                    prop_assert_eq!(now.stage, Stage::Processed);
                    prop_assert_eq!(now.batch_id, Some(1));
                }
            } else {
                let err = result.unwrap_err();
                prop_assert!(matches!(err.kind(), ErrorKind::InvalidStage | ErrorKind::NotFound));
                prop_assert_eq!(ledger.batch_count(), 0);
                for (item, logs) in &items_before {
                    prop_assert_eq!(&ledger.item(item.id).unwrap(), item);
                    prop_assert_eq!(ledger.logs(item.id).unwrap().len(), *logs);
                }
            }
        }

        #[test]
        fn property_individual_claim_isolates_siblings(
            size in 1usize..12,
            pick in any::<prop::sample::Index>(),
        ) {
            let mut ledger = staffed_ledger();
            let ids = fresh_items(&mut ledger, BENEFICIARY, size);
            let (batch_id, _) = ledger.create_batch(PROCESSOR, &ids, "", GENESIS_TIME).unwrap();
            ledger.transport_batch(TRANSPORTER, batch_id, "ipfs://t", GENESIS_TIME + 1).unwrap();
            ledger.distribute_batch(DISTRIBUTOR, batch_id, "ipfs://d", GENESIS_TIME + 2).unwrap();

            let target = ids[pick.index(size)];
            let batch_before = ledger.batch(batch_id).unwrap();
            let batch_docs = ledger.batch_documents(batch_id).unwrap().len();
            let batch_logs = ledger.batch_logs(batch_id).unwrap().len();
            let siblings: Vec<_> = ids
                .iter()
                .filter(|id| **id != target)
                .map(|id| (ledger.item(*id).unwrap(), ledger.logs(*id).unwrap().len()))
                .collect();

            ledger
                .verify_individual_claim(DISTRIBUTOR, batch_id, target, GENESIS_TIME + 3)
                .unwrap();

            prop_assert!(ledger.item(target).unwrap().claimed);
            prop_assert_eq!(ledger.batch(batch_id).unwrap(), batch_before);
            prop_assert_eq!(ledger.batch_documents(batch_id).unwrap().len(), batch_docs);
            prop_assert_eq!(ledger.batch_logs(batch_id).unwrap().len(), batch_logs);
            for (sibling, logs) in &siblings {
                prop_assert_eq!(&ledger.item(sibling.id).unwrap(), sibling);
                prop_assert_eq!(ledger.logs(sibling.id).unwrap().len(), *logs);
            }
        }
    }
}
