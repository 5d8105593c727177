//! # Groundlink
//!
//! A bridge between a remote vehicle's [MAVLink](https://mavlink.io/en/) telemetry/command link
//! and ground control surfaces. Groundlink decodes the binary wire protocol into a canonical
//! [`VehicleState`](telemetry::VehicleState) snapshot, turns operator intents (arm, change mode,
//! go-to, upload a mission) into correctly framed outbound messages, and manages the stateful
//! handshakes — mission transfer and command acknowledgement — that the protocol requires.
//!
//! The physical link is assumed to drop, stall, and reorder, so liveness detection and
//! reconnection are first-class concerns: a heartbeat watchdog declares the link lost after a
//! configurable window and the supervisor re-establishes the transport on a fixed interval.
//!
//! Display and control collaborators never touch frames, sequence numbers, or checksums. They
//! consume the [`VehicleLink`](link::VehicleLink) handle: a read-only telemetry subscription, a
//! connection/mission event subscription, and intent-level command and mission operations.
//!
//! ## Quick start
//!
//! ```no_run
//! use groundlink::prelude::*;
//!
//! # async fn example() -> groundlink::errors::Result<()> {
//! let transport = SerialTransport::new("/dev/ttyUSB0");
//! let link = VehicleLink::spawn(transport, LinkConfig::default());
//!
//! link.connect().await?;
//!
//! let mut telemetry = link.telemetry();
//! telemetry.changed().await.ok();
//! println!("mode: {}", telemetry.borrow().mode);
//!
//! link.arm_disarm(true).await?;
//! link.takeoff(20.0).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod commands;
pub mod consts;
pub mod errors;
pub mod io;
pub mod link;
pub mod mission;
pub mod prelude;
pub mod protocol;
pub mod telemetry;
