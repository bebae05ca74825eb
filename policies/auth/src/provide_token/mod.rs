mod chain;
pub use chain::ProvideTokenChain;

mod static_provider;
pub use static_provider::StaticTokenProvider;
