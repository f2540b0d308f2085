//! # Concurrent Access
//!
//! Many tasks driving one `SubsidyService` on a multi-threaded runtime.
//! Mutations are serialized by the service's write guard, so competing
//! claims resolve deterministically and events arrive in commit order.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use shared_bus::{EventFilter, EventTopic, SubsidyEvent};
    use shared_types::{ErrorKind, Stage};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn distributed(service: &subsidy_runtime::SubsidyService) -> u64 {
        let id = service.create_item(PROCESSOR, BENEFICIARY).await.unwrap();
        service.process_item(PROCESSOR, id, "ipfs://p").await.unwrap();
        service.transport_item(TRANSPORTER, id, "ipfs://t").await.unwrap();
        service.distribute_item(DISTRIBUTOR, id, "ipfs://d").await.unwrap();
        id
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exactly_one_concurrent_claim_succeeds() {
        let (service, _clock) = staffed_service();
        let id = distributed(&service).await;
        let mut claims = service.subscribe(EventFilter::topics(vec![EventTopic::Claims]));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                let caller = if i % 2 == 0 { BENEFICIARY } else { ADMIN };
                tokio::spawn(async move { service.claim_subsidy(caller, id, None).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(event) => {
                    succeeded += 1;
                    assert_eq!(event.stage(), Some(Stage::Claimed));
                }
                Err(err) => assert_eq!(err.kind(), ErrorKind::AlreadyClaimed),
            }
        }

        assert_eq!(succeeded, 1);
        assert!(service.item(id).await.unwrap().claimed);
        assert_eq!(claims.drain().len(), 1);

        let stats = service.stats().await;
        assert_eq!(stats.operations_rejected, 15);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_publish_in_id_order() {
        let (service, _clock) = staffed_service();
        let mut created = service.subscribe(EventFilter::topics(vec![EventTopic::Items]));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create_item(PROCESSOR, BENEFICIARY).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
        assert_eq!(service.item_count().await, 32);

        let mut seen = Vec::new();
        while seen.len() < 32 {
            let event = timeout(Duration::from_secs(5), created.recv())
                .await
                .expect("event within timeout")
                .expect("bus open");
            if let SubsidyEvent::ItemCreated { item_id, .. } = event {
                seen.push(item_id);
            }
        }
        assert_eq!(seen, ids);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_batches_share_no_items() {
        let (service, _clock) = staffed_service();
        let mut ids = Vec::new();
        for _ in 0..6 {
            ids.push(service.create_item(PROCESSOR, BENEFICIARY).await.unwrap());
        }

        let first = {
            let service = service.clone();
            let ids = ids[..4].to_vec();
            tokio::spawn(async move { service.create_batch(PROCESSOR, &ids, "north").await })
        };
        let second = {
            let service = service.clone();
            let ids = ids[2..].to_vec();
            tokio::spawn(async move { service.create_batch(PROCESSOR, &ids, "south").await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(service.batch_count().await, 1);

        let batch = service.batch(1).await.unwrap();
        for id in &ids {
            let item = service.item(*id).await.unwrap();
            if batch.contains(*id) {
                assert_eq!(item.stage, Stage::Processed);
                assert_eq!(item.batch_id, Some(1));
            } else {
                assert_eq!(item.stage, Stage::Created);
                assert_eq!(item.batch_id, None);
            }
        }
    }
}
