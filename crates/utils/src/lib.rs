pub mod service;
pub mod session;
pub mod units;
pub mod url;
