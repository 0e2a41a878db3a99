use anyhow::Context;
use credit_assignment::{
    ApplyError, Processor, TpRequest, ValidationError,
    address::{self, PROPOSAL_FAMILY, USER_FAMILY},
    proposal::{Contract, Offer, ProposalBuilder, ProposalPayload},
    state::StateContext,
    store::{SledStore, Store},
    types::{Document, DocumentKind, LifecycleState, OfferState, Role, User},
    utils,
};
use sled::open;
use std::sync::Arc;

use tempfile::{TempDir, tempdir}; // Use for test db cleanup.

// Every test gets its own sled database in a temp dir, sled locks the db file.
fn open_store(name: &str) -> anyhow::Result<(TempDir, SledStore)> {
    let temp_dir = tempdir()?;
    let db = open(temp_dir.path().join(name))?;
    Ok((temp_dir, SledStore::new(Arc::new(db))))
}

fn register(processor: &Processor, store: &mut dyn Store, user: &User) -> anyhow::Result<()> {
    let request = TpRequest::new(
        USER_FAMILY,
        "1.0",
        user.public_key.clone(),
        minicbor::to_vec(user)?,
    );
    processor
        .apply(&request, store)
        .with_context(|| format!("registering {}", user.id))
}

fn submit(
    processor: &Processor,
    store: &mut dyn Store,
    signer: &User,
    payload: ProposalPayload,
) -> Result<(), ApplyError> {
    let request = TpRequest::new(
        PROPOSAL_FAMILY,
        "1.0",
        signer.public_key.clone(),
        minicbor::to_vec(&payload).expect("payload encodes"),
    );
    processor.apply(&request, store)
}

fn transition(state: LifecycleState) -> ProposalPayload {
    ProposalPayload::update_state("P1", state, format!("moved to {state}"), None)
}

#[test]
fn assignor_opens_bidding_and_clears_an_offer() -> anyhow::Result<()> {
    let (_dir, mut store) = open_store("bidding.db")?;
    let processor = Processor::with_default_handlers();

    let assignor = User::new("U1", "pk-a", Role::Assignor);
    let bidder = User::new("B", "pk-b", Role::Assignee).with_group("G1");
    register(&processor, &mut store, &assignor)?;
    register(&processor, &mut store, &bidder)?;

    let proposal_id = utils::new_proposal_id()?;
    let offer_id = utils::new_offer_id()?;
    let open_bidding =
        || ProposalPayload::update_state(&proposal_id, LifecycleState::Proposed, "open", None);

    let proposal = ProposalBuilder::new()
        .set_id(proposal_id.clone())
        .set_assignor("U1")
        .set_assignee_group("G1")
        .build()?;
    submit(&processor, &mut store, &assignor, ProposalPayload::create(proposal))
        .context("Proposal failed on create: ")?;

    let stored = store.get(&[address::proposal_address(&proposal_id)])?;
    assert_eq!(stored.len(), 1);

    // PROPOSED may only be set by the assignor
    let err = submit(&processor, &mut store, &bidder, open_bidding()).unwrap_err();
    assert!(matches!(
        err,
        ApplyError::InvalidTransaction(ValidationError::UnauthorizedRole { .. })
    ));

    submit(&processor, &mut store, &assignor, open_bidding())
        .context("Proposal failed on PROPOSED: ")?;

    let offer =
        Offer::new(offer_id.clone(), "B", OfferState::ProposedByAssignee).with_amount(95_000);
    submit(
        &processor,
        &mut store,
        &bidder,
        ProposalPayload::update_offers(&proposal_id, vec![offer]),
    )
    .context("Offer failed: ")?;

    let proposal = StateContext::new(&mut store).get_proposal(&proposal_id)?;
    assert_eq!(proposal.offers.len(), 1);

    submit(
        &processor,
        &mut store,
        &assignor,
        ProposalPayload::delete_offers(&proposal_id, vec![offer_id.clone()]),
    )
    .context("Offer removal failed: ")?;

    let proposal = StateContext::new(&mut store).get_proposal(&proposal_id)?;
    assert!(proposal.offers.is_empty());
    assert_eq!(proposal.lifecycle_state, LifecycleState::Proposed);

    Ok(())
}

#[test]
fn proposal_runs_to_purchase() -> anyhow::Result<()> {
    let (_dir, mut store) = open_store("lifecycle.db")?;
    let processor = Processor::with_default_handlers();

    let assignor = User::new(utils::new_user_id()?, "pk-a", Role::Assignor);
    let bidder = User::new("B", "pk-b", Role::Assignee).with_group("G1");
    let other_member = User::new("C", "pk-c", Role::Assignee).with_group("G1");
    let reviewer = User::new("R", "pk-r", Role::FiscalReviewer).with_group("G1");
    for user in [&assignor, &bidder, &other_member, &reviewer] {
        register(&processor, &mut store, user)?;
    }

    let proposal = ProposalBuilder::new()
        .set_id("P1")
        .set_assignor(assignor.id.clone())
        .set_assignee_group("G1")
        .add_document(Document::new("D1", "sha256:invoice", DocumentKind::Invoice))
        .build()?;
    submit(&processor, &mut store, &assignor, ProposalPayload::create(proposal))?;
    submit(&processor, &mut store, &assignor, transition(LifecycleState::Proposed))?;

    let offer = Offer::new("O1", "B", OfferState::ProposedByAssignee).with_amount(95_000);
    submit(
        &processor,
        &mut store,
        &bidder,
        ProposalPayload::update_offers("P1", vec![offer.clone()]),
    )?;
    let accepted = Offer {
        bid_state: OfferState::Accepted,
        ..offer
    };
    submit(
        &processor,
        &mut store,
        &assignor,
        ProposalPayload::update_offers("P1", vec![accepted]),
    )?;

    // the bidder takes the proposal in charge and becomes the selected assignee
    submit(
        &processor,
        &mut store,
        &bidder,
        ProposalPayload::update_state(
            "P1",
            LifecycleState::TakenInCharge,
            "taken",
            Some("B".into()),
        ),
    )?;

    // from now on the rest of the group is shut out
    let err = submit(
        &processor,
        &mut store,
        &other_member,
        transition(LifecycleState::Validated),
    )
    .unwrap_err();
    assert!(matches!(
        err.validation(),
        Some(ValidationError::UnauthorizedIdentity { .. })
    ));

    submit(&processor, &mut store, &reviewer, transition(LifecycleState::Validated))?;
    submit(&processor, &mut store, &bidder, transition(LifecycleState::ContractToSign))?;

    let contract = Contract::new("C1", "sha256:contract");
    submit(
        &processor,
        &mut store,
        &assignor,
        ProposalPayload::update_contracts("P1", vec![contract]),
    )?;

    submit(&processor, &mut store, &assignor, transition(LifecycleState::ContractSigned))?;
    submit(&processor, &mut store, &bidder, transition(LifecycleState::ToBeSettled))?;

    let receipt = Document::new("D2", "sha256:receipt", DocumentKind::TransferReceipt);
    submit(
        &processor,
        &mut store,
        &bidder,
        ProposalPayload::update_documents("P1", vec![receipt]),
    )?;

    submit(&processor, &mut store, &bidder, transition(LifecycleState::Settled))?;
    submit(&processor, &mut store, &assignor, transition(LifecycleState::Purchased))?;

    let proposal = StateContext::new(&mut store).get_proposal("P1")?;
    assert_eq!(proposal.lifecycle_state, LifecycleState::Purchased);
    assert_eq!(proposal.assignee_selected_id.as_deref(), Some("B"));
    assert_eq!(proposal.documents.len(), 2);
    assert_eq!(proposal.contracts.len(), 1);
    assert_eq!(
        proposal.offers.lookup("O1").map(|o| o.bid_state),
        Some(OfferState::Accepted)
    );

    Ok(())
}

#[test]
fn contracts_wait_for_contract_to_sign() -> anyhow::Result<()> {
    let (_dir, mut store) = open_store("contracts.db")?;
    let processor = Processor::with_default_handlers();

    let assignor = User::new("U1", "pk-a", Role::Assignor);
    register(&processor, &mut store, &assignor)?;
    let proposal = ProposalBuilder::new()
        .set_id("P1")
        .set_assignor("U1")
        .set_assignee_group("G1")
        .build()?;
    submit(&processor, &mut store, &assignor, ProposalPayload::create(proposal))?;

    let err = submit(
        &processor,
        &mut store,
        &assignor,
        ProposalPayload::update_contracts("P1", vec![Contract::new("C1", "sha256:c")]),
    )
    .unwrap_err();

    assert!(matches!(
        err.validation(),
        Some(ValidationError::WrongPhase {
            actual: LifecycleState::Preparation,
            ..
        })
    ));

    Ok(())
}

#[test]
fn unregistered_signer_is_rejected() -> anyhow::Result<()> {
    let (_dir, mut store) = open_store("unregistered.db")?;
    let processor = Processor::with_default_handlers();

    let ghost = User::new("U1", "pk-ghost", Role::Assignor);
    let proposal = ProposalBuilder::new()
        .set_id("P1")
        .set_assignor("U1")
        .set_assignee_group("G1")
        .build()?;

    let err = submit(&processor, &mut store, &ghost, ProposalPayload::create(proposal))
        .unwrap_err();

    assert_eq!(
        err,
        ApplyError::InvalidTransaction(ValidationError::NotFound(address::user_address(
            "pk-ghost"
        )))
    );
    assert!(store.get(&[address::proposal_address("P1")])?.is_empty());

    Ok(())
}
