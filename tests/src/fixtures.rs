//! # Test Fixtures
//!
//! A ledger staffed with one principal per role, plus helpers that walk
//! items to a given stage.

use shared_types::{ItemId, Principal, Role};
use std::sync::Arc;
use subsidy_runtime::{ManualTimeSource, RuntimeConfig, SubsidyLedger, SubsidyService};

/// Holds `SUPER_ADMIN`.
pub const ROOT: Principal = Principal::new([0x01; 20]);
/// Holds `PROCESSOR`.
pub const PROCESSOR: Principal = Principal::new([0x02; 20]);
/// Holds `TRANSPORTER`.
pub const TRANSPORTER: Principal = Principal::new([0x03; 20]);
/// Holds `DISTRIBUTOR`.
pub const DISTRIBUTOR: Principal = Principal::new([0x04; 20]);
/// Holds `ADMIN`.
pub const ADMIN: Principal = Principal::new([0x0A; 20]);
/// Beneficiary of most test items. Holds no role.
pub const BENEFICIARY: Principal = Principal::new([0x05; 20]);
/// A second beneficiary. Holds no role.
pub const OTHER_BENEFICIARY: Principal = Principal::new([0x06; 20]);
/// Holds no role and owns nothing.
pub const STRANGER: Principal = Principal::new([0x07; 20]);

/// Every fixture principal, for random caller selection.
pub const PRINCIPALS: [Principal; 8] = [
    ROOT,
    PROCESSOR,
    TRANSPORTER,
    DISTRIBUTOR,
    ADMIN,
    BENEFICIARY,
    OTHER_BENEFICIARY,
    STRANGER,
];

/// Start time of every fixture clock.
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Configuration granting one fixture principal per role.
pub fn staffed_config() -> RuntimeConfig {
    RuntimeConfig::new(ROOT)
        .with_grant(Role::Admin, ADMIN)
        .with_grant(Role::Processor, PROCESSOR)
        .with_grant(Role::Transporter, TRANSPORTER)
        .with_grant(Role::Distributor, DISTRIBUTOR)
}

/// A synchronous ledger staffed per [`staffed_config`].
pub fn staffed_ledger() -> SubsidyLedger {
    match SubsidyLedger::bootstrap(&staffed_config(), GENESIS_TIME) {
        Ok((ledger, _)) => ledger,
        Err(e) => panic!("fixture bootstrap failed: {e}"),
    }
}

/// An async service staffed per [`staffed_config`], with its clock.
pub fn staffed_service() -> (SubsidyService, Arc<ManualTimeSource>) {
    let clock = Arc::new(ManualTimeSource::new(GENESIS_TIME));
    match SubsidyService::from_config(&staffed_config(), clock.clone()) {
        Ok(service) => (service, clock),
        Err(e) => panic!("fixture bootstrap failed: {e}"),
    }
}

/// Create an item for `beneficiary` and walk it to `Distributed`.
pub fn distributed_item(ledger: &mut SubsidyLedger, beneficiary: Principal) -> ItemId {
    let (id, _) = ledger
        .create_item(PROCESSOR, beneficiary, GENESIS_TIME)
        .unwrap_or_else(|e| panic!("create_item: {e}"));
    ledger
        .process_item(PROCESSOR, id, "ipfs://processing", GENESIS_TIME + 1)
        .unwrap_or_else(|e| panic!("process_item: {e}"));
    ledger
        .transport_item(TRANSPORTER, id, "ipfs://transport", GENESIS_TIME + 2)
        .unwrap_or_else(|e| panic!("transport_item: {e}"));
    ledger
        .distribute_item(DISTRIBUTOR, id, "ipfs://distribution", GENESIS_TIME + 3)
        .unwrap_or_else(|e| panic!("distribute_item: {e}"));
    id
}

/// Create `count` items for `beneficiary` and return their ids.
pub fn fresh_items(ledger: &mut SubsidyLedger, beneficiary: Principal, count: usize) -> Vec<ItemId> {
    (0..count)
        .map(|_| {
            ledger
                .create_item(PROCESSOR, beneficiary, GENESIS_TIME)
                .map(|(id, _)| id)
                .unwrap_or_else(|e| panic!("create_item: {e}"))
        })
        .collect()
}
