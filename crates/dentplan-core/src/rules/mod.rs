//! Pure business rules of the treatment-plan lifecycle.
//!
//! Nothing in here touches the database. The engine loads state, asks these
//! modules what is allowed and what should happen next, then writes.

pub mod access;
pub mod approval;
pub mod ledger;
pub mod progression;
pub mod transitions;

pub use approval::Decision;
pub use transitions::{FinancialEffect, Transition};
