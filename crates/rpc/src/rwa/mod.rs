pub mod errors;
pub mod v0_1_0;
