//! # Wire Commands
//!
//! JSON request/response shapes accepted by `subsidy-node`, one per line.
//!
//! ```json
//! {"caller":"0x02..02","op":"processItem","itemId":1,"uri":"ipfs://proc"}
//! {"ok":true,"result":{...}}
//! {"ok":false,"error":{"kind":"InvalidStage","message":"..."}}
//! ```

use crate::service::SubsidyService;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{BatchId, ItemId, LedgerError, Principal, Role, Stage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// One command line: the acting principal plus the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Acting principal. Required by every mutation; queries ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Principal>,
    /// What to do.
    #[serde(flatten)]
    pub command: Command,
}

/// Every operation and query reachable over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[allow(missing_docs)]
pub enum Command {
    GrantRole { role: Role, principal: Principal },
    RevokeRole { role: Role, principal: Principal },
    RenounceRole { role: Role },
    HasRole { role: Role, principal: Principal },
    Members { role: Role },

    CreateItem { beneficiary: Principal },
    ProcessItem { item_id: ItemId, uri: String },
    TransportItem { item_id: ItemId, uri: String },
    DistributeItem { item_id: ItemId, uri: String },
    ClaimSubsidy {
        item_id: ItemId,
        #[serde(default)]
        uri: Option<String>,
    },
    AddDocument { item_id: ItemId, stage_tag: Stage, uri: String },
    LogAction { item_id: ItemId, action: String },
    Item { item_id: ItemId },
    Documents { item_id: ItemId },
    Logs { item_id: ItemId },
    ItemCount,
    ClaimableItems { beneficiary: Principal },

    CreateBatch {
        item_ids: Vec<ItemId>,
        #[serde(default)]
        note: String,
    },
    TransportBatch { batch_id: BatchId, uri: String },
    DistributeBatch { batch_id: BatchId, uri: String },
    VerifyIndividualClaim { batch_id: BatchId, item_id: ItemId },
    Batch { batch_id: BatchId },
    BatchDocuments { batch_id: BatchId },
    BatchLogs { batch_id: BatchId },
    BatchCount,

    Stats,
}

impl Command {
    /// Whether the command only reads ledger state.
    #[must_use]
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::HasRole { .. }
                | Command::Members { .. }
                | Command::Item { .. }
                | Command::Documents { .. }
                | Command::Logs { .. }
                | Command::ItemCount
                | Command::ClaimableItems { .. }
                | Command::Batch { .. }
                | Command::BatchDocuments { .. }
                | Command::BatchLogs { .. }
                | Command::BatchCount
                | Command::Stats
        )
    }
}

/// Error half of a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable kind: a ledger `ErrorKind`, `MalformedRequest` or `Internal`.
    pub kind: String,
    /// Human readable description.
    pub message: String,
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the command succeeded.
    pub ok: bool,
    /// Command output on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// A successful response carrying `value`.
    pub fn success<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => Self {
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self::failure("Internal", e.to_string()),
        }
    }

    /// A failed response.
    pub fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: kind.into(),
                message: message.into(),
            }),
        }
    }

    /// A line that did not parse as a [`Request`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::failure("MalformedRequest", message)
    }
}

impl From<LedgerError> for Response {
    fn from(error: LedgerError) -> Self {
        Self::failure(error.kind().to_string(), error.to_string())
    }
}

fn respond<T: Serialize>(result: Result<T, LedgerError>) -> Response {
    match result {
        Ok(value) => Response::success(value),
        Err(error) => error.into(),
    }
}

/// Apply one request to the service.
///
/// Mutations without a non-null caller are answered `MalformedRequest`
/// and never reach the ledger.
pub async fn dispatch(service: &SubsidyService, request: Request) -> Response {
    let caller = match request.caller {
        Some(caller) if !caller.is_zero() => caller,
        _ if request.command.is_query() => Principal::ZERO,
        _ => {
            debug!(command = ?request.command, "Mutation without caller");
            return Response::malformed("mutating command requires a non-null caller");
        }
    };
    match request.command {
        Command::GrantRole { role, principal } => {
            respond(service.grant_role(caller, role, principal).await)
        }
        Command::RevokeRole { role, principal } => {
            respond(service.revoke_role(caller, role, principal).await)
        }
        Command::RenounceRole { role } => respond(service.renounce_role(caller, role).await),
        Command::HasRole { role, principal } => {
            Response::success(service.has_role(role, principal).await)
        }
        Command::Members { role } => Response::success(service.members(role).await),

        Command::CreateItem { beneficiary } => {
            respond(service.create_item(caller, beneficiary).await)
        }
        Command::ProcessItem { item_id, uri } => {
            respond(service.process_item(caller, item_id, &uri).await)
        }
        Command::TransportItem { item_id, uri } => {
            respond(service.transport_item(caller, item_id, &uri).await)
        }
        Command::DistributeItem { item_id, uri } => {
            respond(service.distribute_item(caller, item_id, &uri).await)
        }
        Command::ClaimSubsidy { item_id, uri } => {
            respond(service.claim_subsidy(caller, item_id, uri.as_deref()).await)
        }
        Command::AddDocument {
            item_id,
            stage_tag,
            uri,
        } => respond(service.add_document(caller, item_id, stage_tag, &uri).await),
        Command::LogAction { item_id, action } => {
            respond(service.log_action(caller, item_id, &action).await)
        }
        Command::Item { item_id } => respond(service.item(item_id).await),
        Command::Documents { item_id } => respond(service.documents(item_id).await),
        Command::Logs { item_id } => respond(service.logs(item_id).await),
        Command::ItemCount => Response::success(service.item_count().await),
        Command::ClaimableItems { beneficiary } => {
            Response::success(service.claimable_items(beneficiary).await)
        }

        Command::CreateBatch { item_ids, note } => {
            respond(service.create_batch(caller, &item_ids, &note).await)
        }
        Command::TransportBatch { batch_id, uri } => {
            respond(service.transport_batch(caller, batch_id, &uri).await)
        }
        Command::DistributeBatch { batch_id, uri } => {
            respond(service.distribute_batch(caller, batch_id, &uri).await)
        }
        Command::VerifyIndividualClaim { batch_id, item_id } => {
            respond(service.verify_individual_claim(caller, batch_id, item_id).await)
        }
        Command::Batch { batch_id } => respond(service.batch(batch_id).await),
        Command::BatchDocuments { batch_id } => respond(service.batch_documents(batch_id).await),
        Command::BatchLogs { batch_id } => respond(service.batch_logs(batch_id).await),
        Command::BatchCount => Response::success(service.batch_count().await),

        Command::Stats => Response::success(service.stats().await),
    }
}

/// Read newline-delimited requests from `reader` until EOF and write one
/// response line per request to `writer`.
///
/// Blank lines are skipped. Returns the number of requests answered.
pub async fn serve<R, W>(
    service: &SubsidyService,
    reader: R,
    mut writer: W,
) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => dispatch(service, request).await,
            Err(e) => {
                debug!(error = %e, "Malformed request line");
                Response::malformed(e.to_string())
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}
