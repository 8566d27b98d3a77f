//! In-memory doubles for the chain client and injected wallets, used only by
//! tests.

pub mod chain;
pub mod fixtures;
pub mod wallet;
