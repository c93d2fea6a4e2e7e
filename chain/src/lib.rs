pub mod config;
pub mod error;
pub mod fixture;
pub mod tool_chain;

pub use config::{ForkCatalog, HarnessConfig};
pub use error::ChainError;
pub use fixture::{run_fixture, BlockchainFixture, FixtureFile, FixtureReport};
pub use tool_chain::ToolChain;
