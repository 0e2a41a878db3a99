//! Proposal aggregate and the action payloads of the `proposta_cessione` family
use crate::types::{Collection, Document, Keyed, LifecycleState, OfferState};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub bidder_id: String,
    #[n(2)]
    pub bid_state: OfferState,
    #[n(3)]
    pub amount: u64, // integer currency units
}

impl Offer {
    pub fn new(id: impl Into<String>, bidder_id: impl Into<String>, bid_state: OfferState) -> Self {
        Self {
            id: id.into(),
            bidder_id: bidder_id.into(),
            bid_state,
            amount: 0,
        }
    }
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }
}

impl Keyed for Offer {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub content_ref: String,
}

impl Contract {
    pub fn new(id: impl Into<String>, content_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_ref: content_ref.into(),
        }
    }
}

impl Keyed for Contract {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub assignor_id: String,
    #[n(2)]
    pub assignee_group_id: String,
    #[n(3)]
    pub assignee_selected_id: Option<String>, // set once a counterparty inside the group is chosen
    #[n(4)]
    pub lifecycle_state: LifecycleState,
    #[n(5)]
    pub note: String,
    #[n(6)]
    pub offers: Collection<Offer>,
    #[n(7)]
    pub documents: Collection<Document>,
    #[n(8)]
    pub contracts: Collection<Contract>,
}

/// Builder for a fresh proposal in `PREPARATION`
#[derive(Debug, Default)]
pub struct ProposalBuilder {
    id: Option<String>,
    assignor_id: Option<String>,
    assignee_group_id: Option<String>,
    lifecycle_state: Option<LifecycleState>,
    note: String,
    documents: Vec<Document>,
}

impl ProposalBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
    pub fn set_assignor(mut self, assignor_id: impl Into<String>) -> Self {
        self.assignor_id = Some(assignor_id.into());
        self
    }
    pub fn set_assignee_group(mut self, group_id: impl Into<String>) -> Self {
        self.assignee_group_id = Some(group_id.into());
        self
    }
    pub fn set_state(mut self, state: LifecycleState) -> Self {
        self.lifecycle_state = Some(state);
        self
    }
    pub fn set_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
    pub fn add_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }
    /// Checks that every identifying field is set
    pub fn build(self) -> anyhow::Result<Proposal> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow::Error::msg("Proposal id is not set"))?;
        let assignor_id = self
            .assignor_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow::Error::msg("Assignor is not set"))?;
        let assignee_group_id = self
            .assignee_group_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow::Error::msg("Assignee group is not set"))?;

        Ok(Proposal {
            id,
            assignor_id,
            assignee_group_id,
            assignee_selected_id: None,
            lifecycle_state: self.lifecycle_state.unwrap_or(LifecycleState::Preparation),
            note: self.note,
            offers: Collection::new(),
            documents: self.documents.into_iter().collect(),
            contracts: Collection::new(),
        })
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalAction {
    #[n(0)]
    CreateProposal,
    #[n(1)]
    UpdateState,
    #[n(2)]
    UpdateOffers,
    #[n(3)]
    DeleteOffers,
    #[n(4)]
    UpdateDocuments,
    #[n(5)]
    UpdateContracts,
}

impl ProposalAction {
    pub fn name(&self) -> &'static str {
        match self {
            ProposalAction::CreateProposal => "CREATE_PROPOSAL",
            ProposalAction::UpdateState => "UPDATE_STATE",
            ProposalAction::UpdateOffers => "UPDATE_OFFERS",
            ProposalAction::DeleteOffers => "DELETE_OFFERS",
            ProposalAction::UpdateDocuments => "UPDATE_DOCUMENTS",
            ProposalAction::UpdateContracts => "UPDATE_CONTRACTS",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateState {
    #[n(0)]
    pub proposal_id: String,
    #[n(1)]
    pub new_state: LifecycleState,
    #[n(2)]
    pub note: String,
    #[n(3)]
    pub assignee_selected_id: Option<String>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateOffers {
    #[n(0)]
    pub proposal_id: String,
    #[n(1)]
    pub offers: Vec<Offer>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct DeleteOffers {
    #[n(0)]
    pub proposal_id: String,
    #[n(1)]
    pub offer_ids: Vec<String>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateDocuments {
    #[n(0)]
    pub proposal_id: String,
    #[n(1)]
    pub documents: Vec<Document>,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct UpdateContracts {
    #[n(0)]
    pub proposal_id: String,
    #[n(1)]
    pub contracts: Vec<Contract>,
}

/// Envelope of every `proposta_cessione` transaction.
///
/// Exactly the sub-payload named by `action` is read; the others are ignored.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct ProposalPayload {
    #[n(0)]
    pub action: ProposalAction,
    #[n(1)]
    pub create: Option<Proposal>,
    #[n(2)]
    pub update_state: Option<UpdateState>,
    #[n(3)]
    pub update_offers: Option<UpdateOffers>,
    #[n(4)]
    pub delete_offers: Option<DeleteOffers>,
    #[n(5)]
    pub update_documents: Option<UpdateDocuments>,
    #[n(6)]
    pub update_contracts: Option<UpdateContracts>,
}

impl ProposalPayload {
    fn empty(action: ProposalAction) -> Self {
        Self {
            action,
            create: None,
            update_state: None,
            update_offers: None,
            delete_offers: None,
            update_documents: None,
            update_contracts: None,
        }
    }
    pub fn create(proposal: Proposal) -> Self {
        Self {
            create: Some(proposal),
            ..Self::empty(ProposalAction::CreateProposal)
        }
    }
    pub fn update_state(
        proposal_id: impl Into<String>,
        new_state: LifecycleState,
        note: impl Into<String>,
        assignee_selected_id: Option<String>,
    ) -> Self {
        Self {
            update_state: Some(UpdateState {
                proposal_id: proposal_id.into(),
                new_state,
                note: note.into(),
                assignee_selected_id,
            }),
            ..Self::empty(ProposalAction::UpdateState)
        }
    }
    pub fn update_offers(proposal_id: impl Into<String>, offers: Vec<Offer>) -> Self {
        Self {
            update_offers: Some(UpdateOffers {
                proposal_id: proposal_id.into(),
                offers,
            }),
            ..Self::empty(ProposalAction::UpdateOffers)
        }
    }
    pub fn delete_offers(proposal_id: impl Into<String>, offer_ids: Vec<String>) -> Self {
        Self {
            delete_offers: Some(DeleteOffers {
                proposal_id: proposal_id.into(),
                offer_ids,
            }),
            ..Self::empty(ProposalAction::DeleteOffers)
        }
    }
    pub fn update_documents(proposal_id: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            update_documents: Some(UpdateDocuments {
                proposal_id: proposal_id.into(),
                documents,
            }),
            ..Self::empty(ProposalAction::UpdateDocuments)
        }
    }
    pub fn update_contracts(proposal_id: impl Into<String>, contracts: Vec<Contract>) -> Self {
        Self {
            update_contracts: Some(UpdateContracts {
                proposal_id: proposal_id.into(),
                contracts,
            }),
            ..Self::empty(ProposalAction::UpdateContracts)
        }
    }
    /// An envelope that declares `action` but carries no sub-payload
    pub fn bare(action: ProposalAction) -> Self {
        Self::empty(action)
    }
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(minicbor::to_vec(self)?)
    }
}
