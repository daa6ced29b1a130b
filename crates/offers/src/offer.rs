use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use antiwaste_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money, UserId};
use antiwaste_events::Event;
use antiwaste_products::ProductId;
use antiwaste_sellers::SellerId;

use crate::history::{StatusChange, StatusHistory};
use crate::status::{OfferStatus, OfferTransition};

antiwaste_core::typed_aggregate_id!(
    /// Offer identifier.
    OfferId
);

/// History reason recorded when a published offer is edited.
pub const RESET_TO_DRAFT_REASON: &str = "Reset to draft after modification";

/// Aggregate root: Offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    id: OfferId,
    seller_id: SellerId,
    product_id: ProductId,
    title: String,
    description: String,
    price: Option<Money>,
    original_price: Option<Money>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    expiration_date: Option<DateTime<Utc>>,
    status: OfferStatus,
    status_history: StatusHistory,
    version: u64,
    created: bool,
}

impl Offer {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: OfferId) -> Self {
        Self {
            id,
            seller_id: SellerId::new(AggregateId::nil()),
            product_id: ProductId::new(AggregateId::nil()),
            title: String::new(),
            description: String::new(),
            price: None,
            original_price: None,
            start_date: DateTime::<Utc>::UNIX_EPOCH,
            end_date: None,
            expiration_date: None,
            status: OfferStatus::Draft,
            status_history: StatusHistory::default(),
            version: 0,
            created: false,
        }
    }

    /// Create a new offer in `DRAFT` with an empty history.
    pub fn create(cmd: CreateOffer) -> Result<(Self, Vec<OfferEvent>), DomainError> {
        let mut offer = Self::empty(cmd.offer_id);
        let events = offer.execute(&OfferCommand::CreateOffer(cmd))?;
        Ok((offer, events))
    }

    pub fn submit_for_validation(
        &mut self,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, DomainError> {
        self.execute(&OfferCommand::SubmitOffer(SubmitOffer {
            offer_id: self.id,
            occurred_at,
        }))
    }

    pub fn validate(
        &mut self,
        admin_id: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, DomainError> {
        self.execute(&OfferCommand::ValidateOffer(ValidateOffer {
            offer_id: self.id,
            admin_id,
            occurred_at,
        }))
    }

    pub fn reject(
        &mut self,
        admin_id: UserId,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, DomainError> {
        self.execute(&OfferCommand::RejectOffer(RejectOffer {
            offer_id: self.id,
            admin_id,
            reason: reason.into(),
            occurred_at,
        }))
    }

    pub fn cancel(
        &mut self,
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, DomainError> {
        self.execute(&OfferCommand::CancelOffer(CancelOffer {
            offer_id: self.id,
            user_id,
            occurred_at,
        }))
    }

    /// Merge `changes` into the offer. Editing a published offer sends it
    /// back to `DRAFT`.
    pub fn update_details(
        &mut self,
        changes: OfferChanges,
        changed_by: Option<UserId>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, DomainError> {
        self.execute(&OfferCommand::UpdateOfferDetails(UpdateOfferDetails {
            offer_id: self.id,
            changes,
            changed_by,
            occurred_at,
        }))
    }

    pub fn id_typed(&self) -> OfferId {
        self.id
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Option<&Money> {
        self.price.as_ref()
    }

    pub fn original_price(&self) -> Option<&Money> {
        self.original_price.as_ref()
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }

    pub fn status(&self) -> OfferStatus {
        self.status
    }

    pub fn status_history(&self) -> &StatusHistory {
        &self.status_history
    }

    /// Published and inside both its validity window and its best-before date.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == OfferStatus::Published
            && self.start_date <= now
            && self.end_date.is_none_or(|end| end > now)
            && self.expiration_date.is_none_or(|exp| exp > now)
    }

    /// Fields still missing before the offer can be moderated.
    pub fn missing_content(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.original_price.is_none() {
            missing.push("original_price");
        }
        if self.expiration_date.is_none() {
            missing.push("expiration_date");
        }
        missing
    }
}

impl AggregateRoot for Offer {
    type Id = OfferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateOffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOffer {
    pub offer_id: OfferId,
    pub seller_id: SellerId,
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    /// Server time of the request; the reference "now" for date checks.
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitOffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOffer {
    pub offer_id: OfferId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ValidateOffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateOffer {
    pub offer_id: OfferId,
    pub admin_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectOffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectOffer {
    pub offer_id: OfferId,
    pub admin_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOffer {
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Partial offer edit. `None` or blank keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Command: UpdateOfferDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOfferDetails {
    pub offer_id: OfferId,
    pub changes: OfferChanges,
    pub changed_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferCommand {
    CreateOffer(CreateOffer),
    SubmitOffer(SubmitOffer),
    ValidateOffer(ValidateOffer),
    RejectOffer(RejectOffer),
    CancelOffer(CancelOffer),
    UpdateOfferDetails(UpdateOfferDetails),
}

/// Event: OfferCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCreated {
    pub offer_id: OfferId,
    pub seller_id: SellerId,
    pub product_id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OfferSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSubmitted {
    pub offer_id: OfferId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OfferValidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferValidated {
    pub offer_id: OfferId,
    pub admin_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OfferRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRejected {
    pub offer_id: OfferId,
    pub admin_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OfferCanceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCanceled {
    pub offer_id: OfferId,
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OfferDetailsUpdated (carries the resulting field values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDetailsUpdated {
    pub offer_id: OfferId,
    pub title: String,
    pub description: String,
    pub price: Option<Money>,
    pub original_price: Option<Money>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    /// Set when the edit moved a published offer back to `DRAFT`.
    pub reset_to_draft: bool,
    pub changed_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferEvent {
    OfferCreated(OfferCreated),
    OfferSubmitted(OfferSubmitted),
    OfferValidated(OfferValidated),
    OfferRejected(OfferRejected),
    OfferCanceled(OfferCanceled),
    OfferDetailsUpdated(OfferDetailsUpdated),
}

impl Event for OfferEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OfferEvent::OfferCreated(_) => "offers.offer.created",
            OfferEvent::OfferSubmitted(_) => "offers.offer.submitted",
            OfferEvent::OfferValidated(_) => "offers.offer.validated",
            OfferEvent::OfferRejected(_) => "offers.offer.rejected",
            OfferEvent::OfferCanceled(_) => "offers.offer.canceled",
            OfferEvent::OfferDetailsUpdated(_) => "offers.offer.details_updated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OfferEvent::OfferCreated(e) => e.occurred_at,
            OfferEvent::OfferSubmitted(e) => e.occurred_at,
            OfferEvent::OfferValidated(e) => e.occurred_at,
            OfferEvent::OfferRejected(e) => e.occurred_at,
            OfferEvent::OfferCanceled(e) => e.occurred_at,
            OfferEvent::OfferDetailsUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Offer {
    type Command = OfferCommand;
    type Event = OfferEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OfferEvent::OfferCreated(e) => {
                self.id = e.offer_id;
                self.seller_id = e.seller_id;
                self.product_id = e.product_id;
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.price = e.price.clone();
                self.original_price = e.original_price.clone();
                self.start_date = e.start_date;
                self.end_date = e.end_date;
                self.expiration_date = e.expiration_date;
                self.status = OfferStatus::Draft;
                self.created = true;
            }
            OfferEvent::OfferSubmitted(e) => {
                self.record(OfferStatus::PendingValidation, None, e.occurred_at, None);
            }
            OfferEvent::OfferValidated(e) => {
                self.record(OfferStatus::Published, Some(e.admin_id), e.occurred_at, None);
            }
            OfferEvent::OfferRejected(e) => {
                self.record(
                    OfferStatus::Rejected,
                    Some(e.admin_id),
                    e.occurred_at,
                    Some(e.reason.clone()),
                );
            }
            OfferEvent::OfferCanceled(e) => {
                self.record(OfferStatus::Canceled, Some(e.user_id), e.occurred_at, None);
            }
            OfferEvent::OfferDetailsUpdated(e) => {
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.price = e.price.clone();
                self.original_price = e.original_price.clone();
                self.start_date = e.start_date;
                self.end_date = e.end_date;
                self.expiration_date = e.expiration_date;
                if e.reset_to_draft {
                    self.record(
                        OfferStatus::Draft,
                        e.changed_by,
                        e.occurred_at,
                        Some(RESET_TO_DRAFT_REASON.to_string()),
                    );
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, DomainError> {
        match command {
            OfferCommand::CreateOffer(cmd) => self.handle_create(cmd),
            OfferCommand::SubmitOffer(cmd) => self.handle_submit(cmd),
            OfferCommand::ValidateOffer(cmd) => self.handle_validate(cmd),
            OfferCommand::RejectOffer(cmd) => self.handle_reject(cmd),
            OfferCommand::CancelOffer(cmd) => self.handle_cancel(cmd),
            OfferCommand::UpdateOfferDetails(cmd) => self.handle_update(cmd),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn ensure_discount(price: Option<&Money>, original_price: Option<&Money>) -> Result<(), DomainError> {
    if let (Some(price), Some(original)) = (price, original_price) {
        if !price.is_less_than(original)? {
            return Err(DomainError::invalid_operation(
                "price must be lower than original price",
            ));
        }
    }
    Ok(())
}

fn ensure_dates(
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    expiration_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if expiration_date.is_some_and(|exp| exp <= now) {
        return Err(DomainError::invalid_operation(
            "expiration date must be in the future",
        ));
    }
    if end_date.is_some_and(|end| end <= start_date) {
        return Err(DomainError::validation("end date must be after start date"));
    }
    Ok(())
}

impl Offer {
    fn record(
        &mut self,
        status: OfferStatus,
        changed_by: Option<UserId>,
        changed_at: DateTime<Utc>,
        reason: Option<String>,
    ) {
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            changed_by,
            changed_at,
            reason,
        });
    }

    fn ensure_created(&self, offer_id: OfferId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != offer_id {
            return Err(DomainError::invalid_operation("offer_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateOffer) -> Result<Vec<OfferEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("offer already exists"));
        }
        if cmd.seller_id.is_nil() {
            return Err(DomainError::validation("seller id cannot be empty"));
        }
        if cmd.product_id.is_nil() {
            return Err(DomainError::validation("product id cannot be empty"));
        }

        ensure_discount(cmd.price.as_ref(), cmd.original_price.as_ref())?;
        ensure_dates(cmd.start_date, cmd.end_date, cmd.expiration_date, cmd.occurred_at)?;

        Ok(vec![OfferEvent::OfferCreated(OfferCreated {
            offer_id: cmd.offer_id,
            seller_id: cmd.seller_id,
            product_id: cmd.product_id,
            title: cmd.title.trim().to_string(),
            description: cmd.description.trim().to_string(),
            price: cmd.price.clone(),
            original_price: cmd.original_price.clone(),
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            expiration_date: cmd.expiration_date,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitOffer) -> Result<Vec<OfferEvent>, DomainError> {
        self.ensure_created(cmd.offer_id)?;
        self.status.transition(OfferTransition::Submit)?;

        let missing = self.missing_content();
        if !missing.is_empty() {
            return Err(DomainError::incomplete(missing));
        }

        Ok(vec![OfferEvent::OfferSubmitted(OfferSubmitted {
            offer_id: cmd.offer_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_validate(&self, cmd: &ValidateOffer) -> Result<Vec<OfferEvent>, DomainError> {
        self.ensure_created(cmd.offer_id)?;
        self.status.transition(OfferTransition::Validate)?;

        Ok(vec![OfferEvent::OfferValidated(OfferValidated {
            offer_id: cmd.offer_id,
            admin_id: cmd.admin_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectOffer) -> Result<Vec<OfferEvent>, DomainError> {
        self.ensure_created(cmd.offer_id)?;
        self.status.transition(OfferTransition::Reject)?;

        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("rejection reason cannot be empty"));
        }

        Ok(vec![OfferEvent::OfferRejected(OfferRejected {
            offer_id: cmd.offer_id,
            admin_id: cmd.admin_id,
            reason: reason.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOffer) -> Result<Vec<OfferEvent>, DomainError> {
        self.ensure_created(cmd.offer_id)?;
        self.status.transition(OfferTransition::Cancel)?;

        Ok(vec![OfferEvent::OfferCanceled(OfferCanceled {
            offer_id: cmd.offer_id,
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateOfferDetails) -> Result<Vec<OfferEvent>, DomainError> {
        self.ensure_created(cmd.offer_id)?;
        let next = self.status.transition(OfferTransition::Edit)?;

        let changes = &cmd.changes;
        let price = changes.price.clone().or_else(|| self.price.clone());
        let original_price = changes
            .original_price
            .clone()
            .or_else(|| self.original_price.clone());
        if changes.price.is_some() || changes.original_price.is_some() {
            ensure_discount(price.as_ref(), original_price.as_ref())?;
        }

        let start_date = changes.start_date.unwrap_or(self.start_date);
        let end_date = changes.end_date.or(self.end_date);
        let expiration_date = changes.expiration_date.or(self.expiration_date);
        // Only a newly supplied expiration date is held against "now".
        ensure_dates(
            start_date,
            end_date,
            changes.expiration_date,
            cmd.occurred_at,
        )?;

        Ok(vec![OfferEvent::OfferDetailsUpdated(OfferDetailsUpdated {
            offer_id: cmd.offer_id,
            title: non_blank(&changes.title).unwrap_or_else(|| self.title.clone()),
            description: non_blank(&changes.description).unwrap_or_else(|| self.description.clone()),
            price,
            original_price,
            start_date,
            end_date,
            expiration_date,
            reset_to_draft: next != self.status,
            changed_by: cmd.changed_by,
            occurred_at: cmd.occurred_at,
        })])
    }
}
