//! # Workflow Scenarios
//!
//! End-to-end walkthroughs of the item and batch lifecycles:
//!
//! 1. Single item from creation to claim
//! 2. Skipping a stage is rejected
//! 3. Double claim is rejected
//! 4. Batch cascade with one individual claim
//! 5. Evidence from a principal without a role is rejected

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_bus::SubsidyEvent;
    use shared_types::{ErrorKind, Operation, Stage};

    // =============================================================================
    // ITEM LIFECYCLE
    // =============================================================================

    #[test]
    fn test_single_item_full_lifecycle() {
        let mut ledger = staffed_ledger();

        let (id, event) = ledger.create_item(PROCESSOR, BENEFICIARY, 100).unwrap();
        assert_eq!(id, 1);
        assert_eq!(ledger.item(1).unwrap().stage, Stage::Created);
        assert!(matches!(event, SubsidyEvent::ItemCreated { item_id: 1, .. }));

        ledger.process_item(PROCESSOR, 1, "CID_A", 101).unwrap();
        assert_eq!(ledger.item(1).unwrap().stage, Stage::Processed);

        ledger.transport_item(TRANSPORTER, 1, "CID_B", 102).unwrap();
        assert_eq!(ledger.item(1).unwrap().stage, Stage::Transported);

        ledger.distribute_item(DISTRIBUTOR, 1, "CID_C", 103).unwrap();
        assert_eq!(ledger.item(1).unwrap().stage, Stage::Distributed);

        let event = ledger.claim_subsidy(BENEFICIARY, 1, None, 104).unwrap();
        assert_eq!(event.operation(), Operation::ClaimSubsidy);
        assert_eq!(event.stage(), Some(Stage::Claimed));

        let item = ledger.item(1).unwrap();
        assert_eq!(item.stage, Stage::Claimed);
        assert!(item.claimed);

        let uris: Vec<_> = ledger
            .documents(1)
            .unwrap()
            .into_iter()
            .map(|doc| (doc.stage_tag, doc.uri))
            .collect();
        assert_eq!(
            uris,
            vec![
                (Stage::Processed, "CID_A".to_string()),
                (Stage::Transported, "CID_B".to_string()),
                (Stage::Distributed, "CID_C".to_string()),
            ]
        );

        let actions: Vec<_> = ledger
            .logs(1)
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                "createItem",
                "processItem",
                "transportItem",
                "distributeItem",
                "claimSubsidy"
            ]
        );
    }

    #[test]
    fn test_transport_before_process_rejected() {
        let mut ledger = staffed_ledger();
        let (id, _) = ledger.create_item(PROCESSOR, BENEFICIARY, 100).unwrap();

        let err = ledger.transport_item(TRANSPORTER, id, "CID_B", 101).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStage);

        let item = ledger.item(id).unwrap();
        assert_eq!(item.stage, Stage::Created);
        assert!(ledger.documents(id).unwrap().is_empty());
        assert_eq!(ledger.logs(id).unwrap().len(), 1);
    }

    #[test]
    fn test_second_claim_rejected() {
        let mut ledger = staffed_ledger();
        let id = distributed_item(&mut ledger, BENEFICIARY);
        ledger.claim_subsidy(BENEFICIARY, id, None, 200).unwrap();
        let logs_after_claim = ledger.logs(id).unwrap().len();

        let err = ledger.claim_subsidy(BENEFICIARY, id, None, 201).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyClaimed);

        let err = ledger.claim_subsidy(ADMIN, id, None, 202).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyClaimed);
        assert_eq!(ledger.logs(id).unwrap().len(), logs_after_claim);
    }

    #[test]
    fn test_admin_claims_on_behalf_with_receipt() {
        let mut ledger = staffed_ledger();
        let id = distributed_item(&mut ledger, BENEFICIARY);

        let err = ledger.claim_subsidy(OTHER_BENEFICIARY, id, None, 200).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        ledger
            .claim_subsidy(ADMIN, id, Some("ipfs://receipt"), 201)
            .unwrap();
        let docs = ledger.documents(id).unwrap();
        let receipt = docs.last().unwrap();
        assert_eq!(receipt.stage_tag, Stage::Claimed);
        assert_eq!(receipt.uri, "ipfs://receipt");
        assert_eq!(receipt.attached_by, ADMIN);
    }

    // =============================================================================
    // BATCH LIFECYCLE
    // =============================================================================

    #[test]
    fn test_batch_cascade_and_individual_claim() {
        let mut ledger = staffed_ledger();
        let ids = fresh_items(&mut ledger, BENEFICIARY, 3);
        assert_eq!(ids, vec![1, 2, 3]);

        let (batch_id, _) = ledger
            .create_batch(PROCESSOR, &ids, "Warehouse A", 300)
            .unwrap();
        let batch = ledger.batch(batch_id).unwrap();
        assert_eq!(batch.stage, Stage::Processed);
        assert_eq!(batch.note, "Warehouse A");
        for id in &ids {
            assert_eq!(ledger.item(*id).unwrap().stage, Stage::Processed);
            assert_eq!(ledger.item(*id).unwrap().batch_id, Some(batch_id));
        }

        ledger
            .transport_batch(TRANSPORTER, batch_id, "ipfs://truck", 301)
            .unwrap();
        ledger
            .distribute_batch(DISTRIBUTOR, batch_id, "ipfs://hall", 302)
            .unwrap();
        for id in &ids {
            assert_eq!(ledger.item(*id).unwrap().stage, Stage::Distributed);
        }

        ledger
            .verify_individual_claim(BENEFICIARY, batch_id, 2, 303)
            .unwrap();

        let claimed = ledger.item(2).unwrap();
        assert!(claimed.claimed);
        assert_eq!(claimed.stage, Stage::Claimed);
        for sibling in [1, 3] {
            let item = ledger.item(sibling).unwrap();
            assert!(!item.claimed);
            assert_eq!(item.stage, Stage::Distributed);
        }
        assert_eq!(ledger.batch(batch_id).unwrap().stage, Stage::Distributed);
    }

    #[test]
    fn test_batch_managed_item_rejects_individual_steps() {
        let mut ledger = staffed_ledger();
        let ids = fresh_items(&mut ledger, BENEFICIARY, 2);
        let (batch_id, _) = ledger.create_batch(PROCESSOR, &ids, "", 300).unwrap();

        let err = ledger.transport_item(TRANSPORTER, ids[0], "ipfs://t", 301).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStage);

        let err = ledger.create_batch(PROCESSOR, &ids, "again", 302).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(ledger.batch_count(), 1);

        let err = ledger
            .verify_individual_claim(BENEFICIARY, batch_id + 1, ids[0], 303)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_non_member_claim_rejected() {
        let mut ledger = staffed_ledger();
        let ids = fresh_items(&mut ledger, BENEFICIARY, 2);
        let (batch_id, _) = ledger.create_batch(PROCESSOR, &ids, "", 300).unwrap();
        let outsider = distributed_item(&mut ledger, BENEFICIARY);

        let err = ledger
            .verify_individual_claim(BENEFICIARY, batch_id, outsider, 301)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotMember);
        assert!(!ledger.item(outsider).unwrap().claimed);

        for item_id in [ids[0], outsider] {
            let err = ledger
                .verify_individual_claim(STRANGER, batch_id, item_id, 302)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
    }

    // =============================================================================
    // EVIDENCE
    // =============================================================================

    #[test]
    fn test_document_from_roleless_principal_rejected() {
        let mut ledger = staffed_ledger();
        let (id, _) = ledger.create_item(PROCESSOR, BENEFICIARY, 100).unwrap();
        ledger.process_item(PROCESSOR, id, "CID_A", 101).unwrap();
        let before = ledger.documents(id).unwrap().len();

        let err = ledger
            .add_document(STRANGER, id, Stage::Processed, "ipfs://x", 102)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(ledger.documents(id).unwrap().len(), before);

        ledger
            .add_document(PROCESSOR, id, Stage::Processed, "ipfs://x", 103)
            .unwrap();
        assert_eq!(ledger.documents(id).unwrap().len(), before + 1);
    }

    #[test]
    fn test_revoked_transporter_cannot_move_goods() {
        let mut ledger = staffed_ledger();
        let (id, _) = ledger.create_item(PROCESSOR, BENEFICIARY, 100).unwrap();
        ledger.process_item(PROCESSOR, id, "CID_A", 101).unwrap();

        assert!(ledger
            .revoke_role(ROOT, shared_types::Role::Transporter, TRANSPORTER, 102)
            .unwrap()
            .is_some());
        let err = ledger.transport_item(TRANSPORTER, id, "CID_B", 103).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(ledger.item(id).unwrap().stage, Stage::Processed);
    }
}
