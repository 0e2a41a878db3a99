//! Transaction processors for a credit assignment proposal workflow.
//!
//! Three transaction families share one ledger state: `proposta_cessione`
//! (proposals with their offers, documents and contracts),
//! `richiesta_accreditamento` (accreditation requests) and `utente` (user
//! identities). Each transition reads its inputs from the host store, checks
//! the acting user's role and identity, and writes the new entity back in a
//! single commit.

pub mod accreditation;
pub mod address;
pub mod auth;
pub mod error;
pub mod handler;
pub mod proposal;
pub mod state;
pub mod store;
pub mod types;
pub mod utils;

pub use error::{ApplyError, StoreError, ValidationError};
pub use handler::{Processor, TpRequest, TransactionHandler};
