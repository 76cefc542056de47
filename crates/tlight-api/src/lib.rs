// tlight-api: Async Rust client for the lighting gateway HTTP API

pub mod client;
mod effects;
pub mod error;
pub mod models;
mod nodes;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{
    GatewayLight, GatewayNode, IndividualLight, LightWriteBody, NodeFeatures, NodeState,
    NodeWriteBody, NodesResponse, RgbColor,
};
pub use transport::TransportConfig;
