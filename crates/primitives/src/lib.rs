pub mod context;
pub mod effects;
pub mod errors;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;
