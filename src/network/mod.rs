pub mod commands;
pub mod fetch;

pub use commands::{dispatch, CommandValue, ProtocolCommand, Transport};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{decode_data_uri, RemoteFetch};
