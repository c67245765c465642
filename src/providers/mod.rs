pub mod coincap;

pub use coincap::CoinCapProvider;
