//! Single-use invite codes.

pub mod ledger;

pub use ledger::InviteLedger;
