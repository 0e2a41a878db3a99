//! Transitions of the `proposta_cessione` family
use super::{TpRequest, TransactionHandler, decode_payload, require};
use crate::address::{self, PROPOSAL_FAMILY};
use crate::auth::{
    self, CONTRACT_ROLES, CREATE_ROLES, DOCUMENT_ROLES, Scope, offer_removal_roles,
    offer_state_roles, proposal_state_roles,
};
use crate::error::{ApplyError, ValidationError};
use crate::proposal::{
    DeleteOffers, Proposal, ProposalAction, ProposalPayload, UpdateContracts, UpdateDocuments,
    UpdateOffers, UpdateState,
};
use crate::state::StateContext;
use crate::types::{LifecycleState, User};
use tracing::debug;

const OFFER_PHASES: &[LifecycleState] = &[LifecycleState::Proposed];
// settlement transfer receipts are uploaded during TO_BE_SETTLED
const DOCUMENT_PHASES: &[LifecycleState] =
    &[LifecycleState::Preparation, LifecycleState::ToBeSettled];
const CONTRACT_PHASES: &[LifecycleState] = &[LifecycleState::ContractToSign];

fn require_phase(
    proposal: &Proposal,
    phases: &'static [LifecycleState],
) -> Result<(), ValidationError> {
    if phases.contains(&proposal.lifecycle_state) {
        Ok(())
    } else {
        Err(ValidationError::WrongPhase {
            expected: phases,
            actual: proposal.lifecycle_state,
        })
    }
}

pub struct ProposalHandler;

impl ProposalHandler {
    fn create(
        &self,
        signer: &User,
        proposal: Proposal,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        auth::authorize(
            signer,
            Some(CREATE_ROLES),
            Scope::owner(&proposal.assignor_id),
            ProposalAction::CreateProposal.name(),
        )?;
        // no existence check: re-creating an id overwrites it
        state.set_proposal(&proposal)
    }

    fn update_state(
        &self,
        signer: &User,
        update: UpdateState,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut proposal = state.get_proposal(&update.proposal_id)?;
        auth::authorize(
            signer,
            Some(proposal_state_roles(update.new_state)),
            Scope::for_proposal(signer.role, &proposal),
            update.new_state.name(),
        )?;

        proposal.lifecycle_state = update.new_state;
        proposal.note = update.note;
        if let Some(selected) = update.assignee_selected_id {
            proposal.assignee_selected_id = Some(selected);
        }
        state.set_proposal(&proposal)
    }

    fn update_offers(
        &self,
        signer: &User,
        update: UpdateOffers,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut proposal = state.get_proposal(&update.proposal_id)?;
        require_phase(&proposal, OFFER_PHASES)?;

        // the whole batch is authorized before anything is merged
        for offer in &update.offers {
            auth::authorize(
                signer,
                Some(offer_state_roles(offer.bid_state)),
                Scope::for_offer(signer.role, &proposal, offer),
                ProposalAction::UpdateOffers.name(),
            )?;
            // replacing a bid also requires acting for whoever placed it
            if let Some(existing) = proposal.offers.lookup(&offer.id) {
                auth::authorize(
                    signer,
                    None,
                    Scope::for_offer(signer.role, &proposal, existing),
                    ProposalAction::UpdateOffers.name(),
                )?;
            }
        }
        for offer in update.offers {
            proposal.offers.upsert(offer);
        }
        state.set_proposal(&proposal)
    }

    fn delete_offers(
        &self,
        signer: &User,
        delete: DeleteOffers,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut proposal = state.get_proposal(&delete.proposal_id)?;
        require_phase(&proposal, OFFER_PHASES)?;

        for offer_id in &delete.offer_ids {
            let Some(offer) = proposal.offers.lookup(offer_id) else {
                return Err(ValidationError::OfferDoesNotExist(offer_id.clone()).into());
            };
            auth::authorize(
                signer,
                Some(offer_removal_roles(offer.bid_state)),
                Scope::for_offer(signer.role, &proposal, offer),
                ProposalAction::DeleteOffers.name(),
            )?;
            proposal.offers.remove(offer_id);
        }
        state.set_proposal(&proposal)
    }

    fn update_documents(
        &self,
        signer: &User,
        update: UpdateDocuments,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut proposal = state.get_proposal(&update.proposal_id)?;
        require_phase(&proposal, DOCUMENT_PHASES)?;
        auth::authorize(
            signer,
            Some(DOCUMENT_ROLES),
            Scope::for_proposal(signer.role, &proposal),
            ProposalAction::UpdateDocuments.name(),
        )?;

        for document in update.documents {
            proposal.documents.upsert(document);
        }
        state.set_proposal(&proposal)
    }

    fn update_contracts(
        &self,
        signer: &User,
        update: UpdateContracts,
        state: &mut StateContext<'_>,
    ) -> Result<(), ApplyError> {
        let mut proposal = state.get_proposal(&update.proposal_id)?;
        require_phase(&proposal, CONTRACT_PHASES)?;
        auth::authorize(
            signer,
            Some(CONTRACT_ROLES),
            Scope::owner(&proposal.assignor_id),
            ProposalAction::UpdateContracts.name(),
        )?;

        for contract in update.contracts {
            proposal.contracts.upsert(contract);
        }
        state.set_proposal(&proposal)
    }
}

impl TransactionHandler for ProposalHandler {
    fn family_name(&self) -> &'static str {
        PROPOSAL_FAMILY
    }

    fn family_versions(&self) -> &'static [&'static str] {
        &["1.0"]
    }

    fn namespaces(&self) -> Vec<String> {
        vec![address::proposal_namespace()]
    }

    fn apply(&self, request: &TpRequest, state: &mut StateContext<'_>) -> Result<(), ApplyError> {
        let payload: ProposalPayload = decode_payload(&request.payload)?;
        let action = payload.action;
        debug!(action = action.name(), "applying proposal transaction");

        match action {
            ProposalAction::CreateProposal => {
                let proposal = require(payload.create, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.create(&signer, proposal, state)
            }
            ProposalAction::UpdateState => {
                let update = require(payload.update_state, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_state(&signer, update, state)
            }
            ProposalAction::UpdateOffers => {
                let update = require(payload.update_offers, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_offers(&signer, update, state)
            }
            ProposalAction::DeleteOffers => {
                let delete = require(payload.delete_offers, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.delete_offers(&signer, delete, state)
            }
            ProposalAction::UpdateDocuments => {
                let update = require(payload.update_documents, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_documents(&signer, update, state)
            }
            ProposalAction::UpdateContracts => {
                let update = require(payload.update_contracts, action.name())?;
                let signer = state.get_user(&request.signer_public_key)?;
                self.update_contracts(&signer, update, state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{Offer, ProposalBuilder};
    use crate::store::MemoryStore;
    use crate::types::{OfferState, Role};

    fn offers(offers: Vec<Offer>) -> UpdateOffers {
        UpdateOffers {
            proposal_id: "P1".into(),
            offers,
        }
    }

    fn seeded() -> (MemoryStore, User, User) {
        let mut store = MemoryStore::new();
        let assignor = User::new("U1", "pk-a", Role::Assignor);
        let bidder = User::new("B", "pk-b", Role::Assignee).with_group("G1");
        let mut state = StateContext::new(&mut store);
        state.set_user(&assignor).unwrap();
        state.set_user(&bidder).unwrap();
        let mut proposal = ProposalBuilder::new()
            .set_id("P1")
            .set_assignor("U1")
            .set_assignee_group("G1")
            .build()
            .unwrap();
        proposal.lifecycle_state = LifecycleState::Proposed;
        state.set_proposal(&proposal).unwrap();
        (store, assignor, bidder)
    }

    #[test]
    fn bidder_cannot_overwrite_anothers_offer() {
        let (mut store, _, bidder) = seeded();
        let rival = User::new("C", "pk-c", Role::Assignee).with_group("G1");
        let mut state = StateContext::new(&mut store);
        state.set_user(&rival).unwrap();
        let handler = ProposalHandler;

        let offer = Offer::new("O1", "B", OfferState::ProposedByAssignee);
        handler
            .update_offers(&bidder, offers(vec![offer]), &mut state)
            .unwrap();

        let hijack = Offer::new("O1", "C", OfferState::ProposedByAssignee);
        let err = handler
            .update_offers(&rival, offers(vec![hijack]), &mut state)
            .unwrap_err();

        assert!(matches!(
            err.validation(),
            Some(ValidationError::UnauthorizedIdentity { .. })
        ));
        let stored = state.get_proposal("P1").unwrap();
        assert_eq!(stored.offers.lookup("O1").unwrap().bidder_id, "B");
    }

    #[test]
    fn assignor_accepts_a_bid() {
        let (mut store, assignor, bidder) = seeded();
        let mut state = StateContext::new(&mut store);
        let handler = ProposalHandler;

        let offer = Offer::new("O1", "B", OfferState::ProposedByAssignee).with_amount(90_000);
        handler
            .update_offers(&bidder, offers(vec![offer.clone()]), &mut state)
            .unwrap();
        let accepted = Offer {
            bid_state: OfferState::Accepted,
            ..offer
        };
        handler
            .update_offers(&assignor, offers(vec![accepted]), &mut state)
            .unwrap();

        let stored = state.get_proposal("P1").unwrap();
        assert_eq!(
            stored.offers.lookup("O1").unwrap().bid_state,
            OfferState::Accepted
        );
        assert_eq!(stored.offers.lookup("O1").unwrap().amount, 90_000);
    }

    #[test]
    fn foreign_assignor_cannot_clear_bids() {
        let (mut store, _, bidder) = seeded();
        let outsider = User::new("U2", "pk-u2", Role::Assignor);
        let mut state = StateContext::new(&mut store);
        state.set_user(&outsider).unwrap();
        let handler = ProposalHandler;
        let offer = Offer::new("O1", "B", OfferState::ProposedByAssignee);
        handler
            .update_offers(&bidder, offers(vec![offer]), &mut state)
            .unwrap();

        let err = handler
            .delete_offers(
                &outsider,
                DeleteOffers {
                    proposal_id: "P1".into(),
                    offer_ids: vec!["O1".into()],
                },
                &mut state,
            )
            .unwrap_err();

        assert!(matches!(
            err.validation(),
            Some(ValidationError::UnauthorizedIdentity { .. })
        ));
        assert!(state.get_proposal("P1").unwrap().offers.contains("O1"));
    }

    #[test]
    fn duplicate_delete_of_same_offer_fails() {
        let (mut store, assignor, bidder) = seeded();
        let mut state = StateContext::new(&mut store);
        let handler = ProposalHandler;
        let offer = Offer::new("O1", "B", OfferState::ProposedByAssignee);
        handler
            .update_offers(&bidder, offers(vec![offer]), &mut state)
            .unwrap();

        let err = handler
            .delete_offers(
                &assignor,
                DeleteOffers {
                    proposal_id: "P1".into(),
                    offer_ids: vec!["O1".into(), "O1".into()],
                },
                &mut state,
            )
            .unwrap_err();

        assert_eq!(
            err.validation(),
            Some(&ValidationError::OfferDoesNotExist("O1".into()))
        );
        assert!(state.get_proposal("P1").unwrap().offers.contains("O1"));
    }
}
