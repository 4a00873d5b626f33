pub mod error;
pub mod finalize;
pub mod ledger;
pub mod output;
pub mod parser;
pub mod snapshot;
pub mod stats;
pub mod submit;
