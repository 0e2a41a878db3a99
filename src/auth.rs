//! Authorization matrices and the evaluator that applies them
//!
//! Each matrix maps a target state to the roles allowed to move an entity (or
//! one of its nested items) into it. Scoping ties the acting user to the
//! entity: an assignor must be the entity's own assignor, an assignee-side user
//! must belong to the entity's counterparty group.
use crate::error::ValidationError;
use crate::proposal::{Offer, Proposal};
use crate::types::{AccreditationState, LifecycleState, OfferState, Role, User};

pub const DOCUMENT_ROLES: &[Role] = &[Role::Assignor, Role::Assignee];
pub const CONTRACT_ROLES: &[Role] = &[Role::Assignor];
pub const CREATE_ROLES: &[Role] = &[Role::Assignor];

/// Roles allowed to set a proposal's lifecycle state to `state`
pub fn proposal_state_roles(state: LifecycleState) -> &'static [Role] {
    match state {
        LifecycleState::Preparation
        | LifecycleState::Proposed
        | LifecycleState::ContractSigned
        | LifecycleState::Purchased => &[Role::Assignor],
        LifecycleState::TakenInCharge
        | LifecycleState::ContractToSign
        | LifecycleState::ToBeSettled
        | LifecycleState::Settled => &[Role::Assignee],
        LifecycleState::Validated | LifecycleState::Invalidated => {
            &[Role::Assignee, Role::FiscalReviewer]
        }
    }
}

/// Roles allowed to write an offer carrying `state`
pub fn offer_state_roles(state: OfferState) -> &'static [Role] {
    match state {
        OfferState::DraftByAssignor | OfferState::Accepted | OfferState::Rejected => {
            &[Role::Assignor]
        }
        OfferState::ProposedByAssignee | OfferState::WithdrawnByAssignee => &[Role::Assignee],
    }
}

/// Roles allowed to remove an offer currently in `state`.
/// The proposal's assignor may always clear offers off their own proposal.
pub fn offer_removal_roles(state: OfferState) -> &'static [Role] {
    match state {
        OfferState::ProposedByAssignee | OfferState::WithdrawnByAssignee => {
            &[Role::Assignor, Role::Assignee]
        }
        OfferState::DraftByAssignor | OfferState::Accepted | OfferState::Rejected => {
            &[Role::Assignor]
        }
    }
}

pub fn accreditation_state_roles(state: AccreditationState) -> &'static [Role] {
    match state {
        AccreditationState::Preparation | AccreditationState::PendingValidation => {
            &[Role::Assignor]
        }
        AccreditationState::Accredited | AccreditationState::Invalid => &[Role::Assignee],
    }
}

/// Identity constraints on the acting user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    pub owner_id: Option<&'a str>,
    pub group_id: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn owner(owner_id: &'a str) -> Self {
        Self {
            owner_id: Some(owner_id),
            group_id: None,
        }
    }
    pub fn group(group_id: &'a str) -> Self {
        Self {
            owner_id: None,
            group_id: Some(group_id),
        }
    }

    /// Scope of `role` acting on `proposal` itself.
    ///
    /// Once an assignee is selected only that assignee may act for the group.
    pub fn for_proposal(role: Role, proposal: &'a Proposal) -> Self {
        match role {
            Role::Assignor => Scope::owner(&proposal.assignor_id),
            Role::Assignee => Self {
                owner_id: proposal.assignee_selected_id.as_deref(),
                group_id: Some(&proposal.assignee_group_id),
            },
            Role::FiscalReviewer => Scope::group(&proposal.assignee_group_id),
            Role::Validator => Scope::default(),
        }
    }

    /// Scope of `role` acting on `offer` of `proposal`. Assignees act for their own bids only.
    ///
    /// The assignor is bound to `proposal.assignor_id` here too, so another
    /// assignor cannot accept, reject or clear bids on a proposal that is not
    /// theirs. A bare role check would let any assignor through.
    pub fn for_offer(role: Role, proposal: &'a Proposal, offer: &'a Offer) -> Self {
        match role {
            Role::Assignor => Scope::owner(&proposal.assignor_id),
            Role::Assignee | Role::FiscalReviewer => Self {
                owner_id: Some(&offer.bidder_id),
                group_id: Some(&proposal.assignee_group_id),
            },
            Role::Validator => Scope::default(),
        }
    }
}

/// Checks `user` against the allowed roles and the identity scope.
///
/// Rules are applied in order (role, owner, group) and all must pass.
pub fn authorize(
    user: &User,
    allowed_roles: Option<&[Role]>,
    scope: Scope<'_>,
    action: &str,
) -> Result<(), ValidationError> {
    if let Some(roles) = allowed_roles {
        if !roles.contains(&user.role) {
            return Err(ValidationError::UnauthorizedRole {
                role: user.role,
                action: action.to_string(),
            });
        }
    }
    if let Some(owner_id) = scope.owner_id {
        if user.id != owner_id {
            return Err(ValidationError::UnauthorizedIdentity {
                expected: Some(owner_id.to_string()),
                actual: user.id.clone(),
            });
        }
    }
    if let Some(group_id) = scope.group_id {
        if user.group_id.as_deref() != Some(group_id) {
            return Err(ValidationError::UnauthorizedGroup {
                expected: Some(group_id.to_string()),
                actual: user.group_id.clone(),
            });
        }
    }
    Ok(())
}
