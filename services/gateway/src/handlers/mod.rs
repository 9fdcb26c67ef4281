pub mod account;
pub mod trade;
pub mod wallet;
