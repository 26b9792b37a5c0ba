//! NPI transport: byte links, the worker threads, SREQ/SRSP correlation and
//! inbound routing.

mod correlator;
mod error;
mod link;
mod memory;
mod npi;
mod router;
mod stream;

pub use correlator::{Correlator, CorrelatorState};
pub use error::TransportError;
pub use link::{MtLink, Transport, TransportRead, TransportWrite};
pub use memory::MemoryTransport;
pub use npi::{Npi, NpiConfig, NpiEvent, NpiHandle};
pub use router::{Dispatcher, DropReason, IndicationHandler, Route, Router};
pub use stream::StreamTransport;
