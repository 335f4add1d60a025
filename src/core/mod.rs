pub mod currency;
pub mod hop;
pub mod ledger;
pub mod party;
pub mod pool;
