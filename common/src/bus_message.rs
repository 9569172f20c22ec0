//! Defines the metadata-only events emitted by the ledger state machine and
//! the queue the host consumes them from
//!
//! Event payloads deliberately carry only social-graph metadata: group ids,
//! expense ids, and (where membership is already public) acting principals.
//! No event ever carries an amount or an opaque amount handle

use crossbeam::channel::{unbounded, Receiver as CrossbeamReceiver, Sender as CrossbeamSender};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{ExpenseId, GroupId, Principal, Timestamp};

/// The queue type for ledger events
pub type LedgerEventQueue = CrossbeamSender<LedgerEvent>;
/// The receiver type for ledger events
pub type LedgerEventReceiver = CrossbeamReceiver<LedgerEvent>;

/// Create a new ledger event queue and receiver
pub fn new_ledger_event_queue() -> (LedgerEventQueue, LedgerEventReceiver) {
    unbounded()
}

// ----------------------
// | Event Topic Names |
// ----------------------

/// The topic published to when group metadata or membership changes
pub fn group_topic(group_id: GroupId) -> String {
    format!("group-updates-{group_id}")
}

/// The topic published to for a principal's account activity
pub fn account_topic(principal: &Principal) -> String {
    format!("account-updates-{principal}")
}

// ---------------
// | Event Types |
// ---------------

/// An event emitted by the state machine after a successful mutation
#[derive(Clone, Debug, Serialize)]
pub struct LedgerEvent {
    /// A unique id for the event
    pub id: Uuid,
    /// The event payload
    pub message: LedgerBusMessage,
}

impl LedgerEvent {
    /// Wrap a bus message in an event with a fresh id
    pub fn new(message: LedgerBusMessage) -> Self {
        Self { id: Uuid::new_v4(), message }
    }
}

/// The metadata-only payloads broadcast by the ledger
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum LedgerBusMessage {
    /// A group was created
    GroupCreated {
        /// The id of the new group
        group_id: GroupId,
        /// The creating principal
        creator: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// A member was added to a group
    MemberAdded {
        /// The group the member joined
        group_id: GroupId,
        /// The added member
        member: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// A member was removed from a group
    MemberRemoved {
        /// The group the member left
        group_id: GroupId,
        /// The removed member
        member: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// An expense was recorded against a group
    ExpenseAdded {
        /// The group the expense belongs to
        group_id: GroupId,
        /// The id of the new expense
        expense_id: ExpenseId,
        /// The paying principal
        payer: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// A deposit completed for a principal; the amount is never disclosed
    DepositCompleted {
        /// The depositing principal
        account: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// A withdrawal completed for a principal; the amount is never disclosed
    WithdrawalCompleted {
        /// The withdrawing principal
        account: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// An in-group transfer (with auto-settlement) completed; neither the
    /// transferred amount nor the settled portion is disclosed
    TransferCompleted {
        /// The group the transfer was scoped to
        group_id: GroupId,
        /// The sending principal
        from: Principal,
        /// The receiving principal
        to: Principal,
        /// The timestamp of the event
        timestamp: Timestamp,
    },
    /// The administrative principal was rotated
    AdminRotated {
        /// The timestamp of the event
        timestamp: Timestamp,
    },
}

#[cfg(test)]
mod test {
    use super::{new_ledger_event_queue, LedgerBusMessage, LedgerEvent};
    use crate::types::Principal;

    /// Tests that events flow through the queue in publish order
    #[test]
    fn test_event_queue_ordering() {
        let (queue, receiver) = new_ledger_event_queue();

        for group_id in 0..3 {
            let message = LedgerBusMessage::GroupCreated {
                group_id,
                creator: Principal::ZERO,
                timestamp: 0,
            };
            queue.send(LedgerEvent::new(message)).unwrap();
        }

        for expected in 0..3 {
            let event = receiver.recv().unwrap();
            match event.message {
                LedgerBusMessage::GroupCreated { group_id, .. } => {
                    assert_eq!(group_id, expected)
                },
                _ => panic!("unexpected message type"),
            }
        }
    }

    /// Tests that serialized deposit events carry no amount field
    #[test]
    fn test_deposit_event_metadata_only() {
        let message = LedgerBusMessage::DepositCompleted {
            account: Principal::new([1u8; 32]),
            timestamp: 42,
        };
        let serialized = serde_json::to_string(&message).unwrap();

        assert!(!serialized.contains("amount"));
        assert!(serialized.contains("DepositCompleted"));
    }
}
