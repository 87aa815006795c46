use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Lifecycle states of an inter-store transfer.
///
/// Transitions are monotonic along `pending -> approved -> in_transit ->
/// completed`; the only other legal edge is `pending -> cancelled`. The two
/// terminal states have no successors, which is what guarantees settlement
/// runs at most once per transfer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    InTransit,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn legal_successors(&self) -> &'static [TransferStatus] {
        match self {
            TransferStatus::Pending => &[TransferStatus::Approved, TransferStatus::Cancelled],
            TransferStatus::Approved => &[TransferStatus::InTransit],
            TransferStatus::InTransit => &[TransferStatus::Completed],
            TransferStatus::Completed | TransferStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: TransferStatus) -> bool {
        self.legal_successors().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.legal_successors().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transfer_number: String,
    pub from_store_id: String,
    pub to_store_id: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Parses the stored status string. A row can only be written through
    /// [`TransferStatus`], so an unparsable value is a data corruption bug.
    pub fn status_enum(&self) -> Result<TransferStatus, DbErr> {
        self.status
            .parse()
            .map_err(|_| DbErr::Custom(format!("unknown transfer status '{}'", self.status)))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_item::Entity")]
    TransferItems,
}

impl Related<super::transfer_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::TransferStatus;

    #[test]
    fn happy_path_chain_is_legal() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Approved));
        assert!(TransferStatus::Approved.can_transition_to(TransferStatus::InTransit));
        assert!(TransferStatus::InTransit.can_transition_to(TransferStatus::Completed));
    }

    #[test]
    fn cancellation_only_from_pending() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::Approved.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::InTransit.can_transition_to(TransferStatus::Cancelled));
    }

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(TransferStatus::Completed.is_terminal());
        assert!(TransferStatus::Cancelled.is_terminal());
        assert!(!TransferStatus::Completed.can_transition_to(TransferStatus::Completed));
        assert!(!TransferStatus::Cancelled.can_transition_to(TransferStatus::Completed));
    }

    #[test]
    fn no_shortcuts_into_completed() {
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Completed));
        assert!(!TransferStatus::Approved.can_transition_to(TransferStatus::Completed));
    }

    #[test]
    fn wire_format_round_trips() {
        assert_eq!(TransferStatus::InTransit.to_string(), "in_transit");
        assert_eq!(
            "in_transit".parse::<TransferStatus>().unwrap(),
            TransferStatus::InTransit
        );
        assert!("shipped".parse::<TransferStatus>().is_err());
    }
}
