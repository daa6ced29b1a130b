use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use antiwaste_core::{Address, Aggregate, AggregateRoot, DomainError, UserId};
use antiwaste_events::Event;

antiwaste_core::typed_aggregate_id!(
    /// Seller identifier.
    SellerId
);

/// Seller approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SellerStatus {
    Pending,
    Approved,
    Rejected,
}

impl SellerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerStatus::Pending => "PENDING",
            SellerStatus::Approved => "APPROVED",
            SellerStatus::Rejected => "REJECTED",
        }
    }
}

impl core::fmt::Display for SellerStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for SellerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(SellerStatus::Pending),
            "APPROVED" => Ok(SellerStatus::Approved),
            "REJECTED" => Ok(SellerStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown seller status '{other}'"))),
        }
    }
}

/// Aggregate root: Seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    id: SellerId,
    user_id: UserId,
    store_name: String,
    address: Option<Address>,
    description: String,
    status: SellerStatus,
    rejection_reason: Option<String>,
    registered_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Seller {
    /// Create an empty, not-yet-registered aggregate instance.
    pub fn empty(id: SellerId) -> Self {
        Self {
            id,
            user_id: UserId::nil(),
            store_name: String::new(),
            address: None,
            description: String::new(),
            status: SellerStatus::Pending,
            rejection_reason: None,
            registered_at: None,
            version: 0,
            created: false,
        }
    }

    /// Register a new seller profile in `PENDING` status.
    pub fn register(cmd: RegisterSeller) -> Result<(Self, Vec<SellerEvent>), DomainError> {
        let mut seller = Self::empty(cmd.seller_id);
        let events = seller.execute(&SellerCommand::RegisterSeller(cmd))?;
        Ok((seller, events))
    }

    /// Approve the seller, clearing any previous rejection reason.
    ///
    /// Idempotent: approving an approved seller leaves the state unchanged.
    pub fn approve(&mut self, occurred_at: DateTime<Utc>) -> Result<Vec<SellerEvent>, DomainError> {
        self.execute(&SellerCommand::ApproveSeller(ApproveSeller {
            seller_id: self.id,
            occurred_at,
        }))
    }

    pub fn reject(
        &mut self,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SellerEvent>, DomainError> {
        self.execute(&SellerCommand::RejectSeller(RejectSeller {
            seller_id: self.id,
            reason: reason.into(),
            occurred_at,
        }))
    }

    /// Replace store name, description and address wholesale.
    pub fn update_details(
        &mut self,
        store_name: impl Into<String>,
        description: impl Into<String>,
        address: Option<Address>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SellerEvent>, DomainError> {
        self.execute(&SellerCommand::UpdateSellerDetails(UpdateSellerDetails {
            seller_id: self.id,
            store_name: store_name.into(),
            description: description.into(),
            address,
            occurred_at,
        }))
    }

    pub fn id_typed(&self) -> SellerId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> SellerStatus {
        self.status
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.registered_at
    }

    /// The single gate checked before any offer may be created for this seller.
    pub fn is_approved(&self) -> bool {
        self.status == SellerStatus::Approved
    }
}

impl AggregateRoot for Seller {
    type Id = SellerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterSeller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSeller {
    pub seller_id: SellerId,
    pub user_id: UserId,
    pub store_name: String,
    pub address: Option<Address>,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveSeller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveSeller {
    pub seller_id: SellerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectSeller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectSeller {
    pub seller_id: SellerId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateSellerDetails (wholesale replace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSellerDetails {
    pub seller_id: SellerId,
    pub store_name: String,
    pub description: String,
    pub address: Option<Address>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SellerCommand {
    RegisterSeller(RegisterSeller),
    ApproveSeller(ApproveSeller),
    RejectSeller(RejectSeller),
    UpdateSellerDetails(UpdateSellerDetails),
}

/// Event: SellerRegistered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRegistered {
    pub seller_id: SellerId,
    pub user_id: UserId,
    pub store_name: String,
    pub address: Address,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SellerApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerApproved {
    pub seller_id: SellerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SellerRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRejected {
    pub seller_id: SellerId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SellerDetailsUpdated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerDetailsUpdated {
    pub seller_id: SellerId,
    pub store_name: String,
    pub description: String,
    pub address: Address,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SellerEvent {
    SellerRegistered(SellerRegistered),
    SellerApproved(SellerApproved),
    SellerRejected(SellerRejected),
    SellerDetailsUpdated(SellerDetailsUpdated),
}

impl Event for SellerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SellerEvent::SellerRegistered(_) => "sellers.seller.registered",
            SellerEvent::SellerApproved(_) => "sellers.seller.approved",
            SellerEvent::SellerRejected(_) => "sellers.seller.rejected",
            SellerEvent::SellerDetailsUpdated(_) => "sellers.seller.details_updated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SellerEvent::SellerRegistered(e) => e.occurred_at,
            SellerEvent::SellerApproved(e) => e.occurred_at,
            SellerEvent::SellerRejected(e) => e.occurred_at,
            SellerEvent::SellerDetailsUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Seller {
    type Command = SellerCommand;
    type Event = SellerEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SellerEvent::SellerRegistered(e) => {
                self.id = e.seller_id;
                self.user_id = e.user_id;
                self.store_name = e.store_name.clone();
                self.address = Some(e.address.clone());
                self.description = e.description.clone();
                self.status = SellerStatus::Pending;
                self.rejection_reason = None;
                self.registered_at = Some(e.occurred_at);
                self.created = true;
            }
            SellerEvent::SellerApproved(_) => {
                self.status = SellerStatus::Approved;
                self.rejection_reason = None;
            }
            SellerEvent::SellerRejected(e) => {
                self.status = SellerStatus::Rejected;
                self.rejection_reason = Some(e.reason.clone());
            }
            SellerEvent::SellerDetailsUpdated(e) => {
                self.store_name = e.store_name.clone();
                self.description = e.description.clone();
                self.address = Some(e.address.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, DomainError> {
        match command {
            SellerCommand::RegisterSeller(cmd) => self.handle_register(cmd),
            SellerCommand::ApproveSeller(cmd) => self.handle_approve(cmd),
            SellerCommand::RejectSeller(cmd) => self.handle_reject(cmd),
            SellerCommand::UpdateSellerDetails(cmd) => self.handle_update(cmd),
        }
    }
}

impl Seller {
    fn ensure_seller_id(&self, seller_id: SellerId) -> Result<(), DomainError> {
        if self.id != seller_id {
            return Err(DomainError::invalid_operation("seller_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self, seller_id: SellerId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_seller_id(seller_id)
    }

    fn handle_register(&self, cmd: &RegisterSeller) -> Result<Vec<SellerEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("seller already exists"));
        }
        if cmd.user_id.is_nil() {
            return Err(DomainError::validation("user id cannot be empty"));
        }
        if cmd.store_name.trim().is_empty() {
            return Err(DomainError::validation("store name cannot be empty"));
        }
        let Some(address) = cmd.address.clone() else {
            return Err(DomainError::validation("address is required"));
        };

        Ok(vec![SellerEvent::SellerRegistered(SellerRegistered {
            seller_id: cmd.seller_id,
            user_id: cmd.user_id,
            store_name: cmd.store_name.trim().to_string(),
            address,
            description: cmd.description.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_approve(&self, cmd: &ApproveSeller) -> Result<Vec<SellerEvent>, DomainError> {
        self.ensure_created(cmd.seller_id)?;

        Ok(vec![SellerEvent::SellerApproved(SellerApproved {
            seller_id: cmd.seller_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectSeller) -> Result<Vec<SellerEvent>, DomainError> {
        self.ensure_created(cmd.seller_id)?;

        if cmd.reason.trim().is_empty() {
            return Err(DomainError::validation("rejection reason cannot be empty"));
        }

        Ok(vec![SellerEvent::SellerRejected(SellerRejected {
            seller_id: cmd.seller_id,
            reason: cmd.reason.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateSellerDetails) -> Result<Vec<SellerEvent>, DomainError> {
        self.ensure_created(cmd.seller_id)?;

        if cmd.store_name.trim().is_empty() {
            return Err(DomainError::validation("store name cannot be empty"));
        }
        let Some(address) = cmd.address.clone() else {
            return Err(DomainError::validation("address is required"));
        };

        Ok(vec![SellerEvent::SellerDetailsUpdated(SellerDetailsUpdated {
            seller_id: cmd.seller_id,
            store_name: cmd.store_name.trim().to_string(),
            description: cmd.description.clone(),
            address,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        Address::new("12 Avenue Hassan II", "Rabat", Some("10000".into()), "MA").unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn register_cmd() -> RegisterSeller {
        RegisterSeller {
            seller_id: SellerId::generate(),
            user_id: UserId::new(),
            store_name: "Boulangerie du Coin".to_string(),
            address: Some(test_address()),
            description: "Fresh bread, day-old pastries".to_string(),
            occurred_at: test_time(),
        }
    }

    fn registered_seller() -> Seller {
        Seller::register(register_cmd()).unwrap().0
    }

    #[test]
    fn register_creates_pending_seller() {
        let cmd = register_cmd();
        let (seller, events) = Seller::register(cmd.clone()).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(seller.status(), SellerStatus::Pending);
        assert!(!seller.is_approved());
        assert_eq!(seller.user_id(), cmd.user_id);
        assert_eq!(seller.address(), Some(&test_address()));
        assert_eq!(seller.version(), 1);
    }

    #[test]
    fn register_rejects_nil_user() {
        let mut cmd = register_cmd();
        cmd.user_id = UserId::nil();

        let err = Seller::register(cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("user id")));
    }

    #[test]
    fn register_rejects_blank_store_name() {
        let mut cmd = register_cmd();
        cmd.store_name = "   ".to_string();

        let err = Seller::register(cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_rejects_missing_address() {
        let mut cmd = register_cmd();
        cmd.address = None;

        let err = Seller::register(cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("address")));
    }

    #[test]
    fn register_twice_is_a_conflict() {
        let seller = registered_seller();
        let mut cmd = register_cmd();
        cmd.seller_id = seller.id_typed();

        let err = seller.handle(&SellerCommand::RegisterSeller(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn approve_then_reject_then_approve_clears_reason() {
        let mut seller = registered_seller();

        seller.approve(test_time()).unwrap();
        assert!(seller.is_approved());

        seller.reject("bad docs", test_time()).unwrap();
        assert_eq!(seller.status(), SellerStatus::Rejected);
        assert_eq!(seller.rejection_reason(), Some("bad docs"));

        seller.approve(test_time()).unwrap();
        assert_eq!(seller.status(), SellerStatus::Approved);
        assert_eq!(seller.rejection_reason(), None);
    }

    #[test]
    fn approve_is_idempotent() {
        let mut seller = registered_seller();

        seller.approve(test_time()).unwrap();
        let status_once = seller.status();
        let reason_once = seller.rejection_reason().map(str::to_string);

        seller.approve(test_time()).unwrap();
        assert_eq!(seller.status(), status_once);
        assert_eq!(seller.rejection_reason().map(str::to_string), reason_once);
        assert_eq!(seller.status(), SellerStatus::Approved);
    }

    #[test]
    fn reject_requires_reason() {
        let mut seller = registered_seller();
        let err = seller.reject("  ", test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(seller.status(), SellerStatus::Pending);
    }

    #[test]
    fn update_details_replaces_address_wholesale() {
        let mut seller = registered_seller();
        let new_address = Address::new("3 Rue de Fes", "Casablanca", None, "MA").unwrap();

        seller
            .update_details("Le Fournil", "Organic bakery", Some(new_address.clone()), test_time())
            .unwrap();

        assert_eq!(seller.store_name(), "Le Fournil");
        assert_eq!(seller.description(), "Organic bakery");
        assert_eq!(seller.address(), Some(&new_address));
    }

    #[test]
    fn update_details_rejects_blank_name_or_missing_address() {
        let mut seller = registered_seller();

        let err = seller.update_details(" ", "x", Some(test_address()), test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = seller.update_details("Name", "x", None, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn commands_on_unregistered_seller_are_not_found() {
        let mut seller = Seller::empty(SellerId::generate());
        let err = seller.approve(test_time()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("approved".parse::<SellerStatus>().unwrap(), SellerStatus::Approved);
        assert!("archived".parse::<SellerStatus>().is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: whatever approve/reject sequence ran before, a final
            /// approve always leaves an approved seller without a reason.
            #[test]
            fn final_approve_always_clears_reason(steps in proptest::collection::vec(any::<bool>(), 0..20)) {
                let mut seller = registered_seller();
                for approve in steps {
                    if approve {
                        seller.approve(Utc::now()).unwrap();
                    } else {
                        seller.reject("incomplete documents", Utc::now()).unwrap();
                    }
                }
                seller.approve(Utc::now()).unwrap();

                prop_assert!(seller.is_approved());
                prop_assert_eq!(seller.rejection_reason(), None);
            }
        }
    }
}
