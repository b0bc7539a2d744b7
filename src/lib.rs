pub mod analyzers;
pub mod events;
pub mod fetch;
pub mod network;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
