//! Workflow vocabulary shared by every transaction family
use chrono::{DateTime, TimeZone, Utc};
use minicbor::{Decode, Decoder, Encode, Encoder};
use std::collections::BTreeMap;
use std::fmt;

#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Role {
    #[n(0)]
    Assignor,
    #[n(1)]
    Assignee,
    #[n(2)]
    FiscalReviewer,
    #[n(3)]
    Validator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Assignor,
        Role::Assignee,
        Role::FiscalReviewer,
        Role::Validator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Assignor => "ASSIGNOR",
            Role::Assignee => "ASSIGNEE",
            Role::FiscalReviewer => "FISCAL_REVIEWER",
            Role::Validator => "VALIDATOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Proposal phases, declared in their intended forward order
#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum LifecycleState {
    #[n(0)]
    Preparation,
    #[n(1)]
    Proposed,
    #[n(2)]
    TakenInCharge,
    #[n(3)]
    Validated,
    #[n(4)]
    Invalidated,
    #[n(5)]
    ContractToSign,
    #[n(6)]
    ContractSigned,
    #[n(7)]
    ToBeSettled,
    #[n(8)]
    Settled,
    #[n(9)]
    Purchased,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 10] = [
        LifecycleState::Preparation,
        LifecycleState::Proposed,
        LifecycleState::TakenInCharge,
        LifecycleState::Validated,
        LifecycleState::Invalidated,
        LifecycleState::ContractToSign,
        LifecycleState::ContractSigned,
        LifecycleState::ToBeSettled,
        LifecycleState::Settled,
        LifecycleState::Purchased,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleState::Preparation => "PREPARATION",
            LifecycleState::Proposed => "PROPOSED",
            LifecycleState::TakenInCharge => "TAKEN_IN_CHARGE",
            LifecycleState::Validated => "VALIDATED",
            LifecycleState::Invalidated => "INVALIDATED",
            LifecycleState::ContractToSign => "CONTRACT_TO_SIGN",
            LifecycleState::ContractSigned => "CONTRACT_SIGNED",
            LifecycleState::ToBeSettled => "TO_BE_SETTLED",
            LifecycleState::Settled => "SETTLED",
            LifecycleState::Purchased => "PURCHASED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum AccreditationState {
    #[n(0)]
    Preparation,
    #[n(1)]
    PendingValidation,
    #[n(2)]
    Accredited,
    #[n(3)]
    Invalid,
}

impl AccreditationState {
    pub const ALL: [AccreditationState; 4] = [
        AccreditationState::Preparation,
        AccreditationState::PendingValidation,
        AccreditationState::Accredited,
        AccreditationState::Invalid,
    ];
}

#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum OfferState {
    #[n(0)]
    DraftByAssignor,
    #[n(1)]
    ProposedByAssignee,
    #[n(2)]
    WithdrawnByAssignee,
    #[n(3)]
    Accepted,
    #[n(4)]
    Rejected,
}

impl OfferState {
    pub const ALL: [OfferState; 5] = [
        OfferState::DraftByAssignor,
        OfferState::ProposedByAssignee,
        OfferState::WithdrawnByAssignee,
        OfferState::Accepted,
        OfferState::Rejected,
    ];
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    #[n(0)]
    Invoice,
    #[n(1)]
    FiscalCertificate,
    #[n(2)]
    Identity,
    #[n(3)]
    TransferReceipt,
    #[n(4)]
    Other,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub public_key: String, // the user's state address is derived from this
    #[n(2)]
    pub role: Role,
    #[n(3)]
    pub group_id: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, public_key: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            public_key: public_key.into(),
            role,
            group_id: None,
        }
    }
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub content_ref: String, // hash or uri of the off-chain content
    #[n(2)]
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(id: impl Into<String>, content_ref: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            id: id.into(),
            content_ref: content_ref.into(),
            kind,
        }
    }
}

/// Items of a nested collection are addressed by their own id
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Document {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A nested per-item collection. Items are only ever replaced whole, by id.
///
/// `lookup` never creates an entry; only `upsert` inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T>(BTreeMap<String, T>);

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T: Keyed> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn lookup(&self, id: &str) -> Option<&T> {
        self.0.get(id)
    }
    /// Replace the item with the same id, or insert it. Returns the replaced item.
    pub fn upsert(&mut self, item: T) -> Option<T> {
        self.0.insert(item.key().to_string(), item)
    }
    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.0.remove(id)
    }
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }
}

impl<T: Keyed> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.upsert(item);
        }
        collection
    }
}

impl<C, T: Encode<C>> Encode<C> for Collection<T> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.0.encode(e, ctx)
    }
}

impl<'b, C, T: Decode<'b, C> + Keyed> Decode<'b, C> for Collection<T> {
    fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let items: BTreeMap<String, T> = BTreeMap::decode(d, ctx)?;
        // every entry must be filed under its own id
        if let Some((id, _)) = items.iter().find(|(id, item)| id.as_str() != item.key()) {
            return Err(minicbor::decode::Error::message(format!(
                "collection entry {id} holds an item with a different id"
            )));
        }
        Ok(Self(items))
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new_with(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(TimeStamp)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
