//! Graph attention network.
//!
//! A [`Gat`] stacks [`GatConv`] layers over a [`BatchedGraph`](crate::graph::BatchedGraph):
//!
//! - `num_layers` hidden layers whose heads are concatenated, each followed
//!   by the configured [`Activation`];
//! - one output layer with `num_classes` units per head and a residual
//!   connection;
//! - a per-graph readout (see [`Pooling`]) and a [`Linear`] head.
//!
//! Parameters are plain `ndarray` matrices and serialize with serde, so a
//! model can be stored with [`Gat::to_json`]. Only inference is provided;
//! [`loss`] holds masked objectives for callers that train elsewhere.

mod activation;
mod config;
mod conv;
mod error;
mod linear;
pub mod loss;
mod network;

pub use activation::Activation;
pub use config::{GatConfig, Pooling};
pub use conv::{GatConv, Residual};
pub use error::Error;
pub use linear::Linear;
pub use loss::{masked_bce_with_logits, masked_mse};
pub use network::Gat;
