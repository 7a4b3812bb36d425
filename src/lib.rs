//! Rust library for controlling Sony Bravia televisions over the local HTTP
//! control API
//!
//! This library provides an async API for pairing with and controlling a
//! Bravia set on the local network. It supports:
//!
//! - PIN-based pairing with cookie authentication
//! - Remote key emulation via IRCC codes
//! - Power, volume, and mute control
//! - Input and channel selection by display name
//! - App listing and launching
//! - Media transport keys (play, pause, stop, next, previous)
//! - Power-on via wake-on-LAN
//! - State queries: power status, volume, playing content, system info
//!
//! # Quick Start
//!
//! ```no_run
//! use bravia_rc::BraviaClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BraviaClient::new("192.168.1.50", Some("AA:BB:CC:DD:EE:FF".parse()?))?;
//!
//!     // First call with an empty PIN makes the set display one on screen;
//!     // a second call with that PIN completes pairing.
//!     client.connect("4321", "my-remote:1", "Living Room Remote").await?;
//!
//!     client.turn_on().await?;
//!     client.set_volume_level(0.25).await?;
//!     client.select_source("HDMI 2").await?;
//!
//!     if let Some(playing) = client.playing_info().await? {
//!         println!("Now playing: {:?}", playing.title);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Client**: High-level control API and lazily-populated caches
//! - **Transport**: HTTP plumbing, cookie handling, IRCC and JSON-RPC posts
//! - **Protocol**: Wire envelopes and service paths
//! - **Types**: Typed response records
//! - **Wol**: Wake-on-LAN magic packet
//!
//! All network calls are sequential with a fixed 10-second timeout; nothing
//! is retried. Errors are returned as [`BraviaError`] values so callers pick
//! their own fail-soft or fail-hard policy, with one exception:
//! [`BraviaClient::power_status`] maps every failure to
//! [`PowerStatus::Off`], making it safe for high-frequency polling.

mod client;
mod error;
mod protocol;
mod transport;
mod types;
mod wol;

// Public exports
pub use client::BraviaClient;
pub use error::{BraviaError, Result};
pub use protocol::{ircc_envelope, RpcRequest, RpcResponse};
pub use types::{
    App, ContentItem, InputSource, PlayingInfo, PowerStatus, RemoteCommand, SystemInfo, VolumeInfo,
};
pub use wol::MacAddr;
