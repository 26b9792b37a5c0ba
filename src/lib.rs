//! npi154 - Host-side NPI/MT link to TI-15.4 MAC co-processors
//!
//! This library drives a TI-15.4-Stack MAC co-processor over its Network
//! Processor Interface. It covers the MT frame codec, typed MT command
//! tables, synchronous request correlation, indication routing and the
//! application-facing MAC API.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use npi154::api::{ApiMac, ApiMacCallbacks, StartCnf};
//! use npi154::transport::{Npi, NpiConfig, StreamTransport};
//!
//! let transport = StreamTransport::open_device("/dev/ttyACM0")?;
//! let npi = Npi::start(transport, NpiConfig::default())?;
//! let mut mac = ApiMac::new(npi)?;
//!
//! mac.register_callbacks(ApiMacCallbacks {
//!     start_cnf: Some(Box::new(|cnf: &StartCnf| println!("started: {}", cnf.status))),
//!     ..ApiMacCallbacks::default()
//! });
//! let ext_addr = mac.init(false)?;
//! println!("co-processor {ext_addr:02x?}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layers
//!
//! - [`protocol`]: MT frames, UART framing with FCS, payload cursors, link counters
//! - [`mt`]: one request struct per MAC/SYS/UTIL command, indication decoders
//! - [`transport`]: byte links, the NPI worker threads, SREQ/SRSP correlation
//! - [`api`]: capability and address conversion, PIB access, IE parsing, callbacks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod mt;
pub mod protocol;
pub mod transport;

pub use api::ApiMac;
pub use mt::{MacStatus, MtIndication, decode_indication};
pub use protocol::{
    CommandType, Error, MAX_PAYLOAD_SIZE, MtFrame, Result, SOF, Subsystem, metrics,
};
pub use transport::{Npi, NpiConfig, NpiHandle, TransportError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
