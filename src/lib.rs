//! Serde support for the ZeroMQ Property Language (ZPL).
//!
//! ZPL is a line-oriented configuration format: nesting is expressed by
//! indenting 4 spaces per level, a bare key opens a section and `key = value`
//! sets a property. Repeating a key adds another value. `#` starts a comment.
//!
//! ```text
//! # Notice that indentation is always 4 spaces, there are no tabs.
//! context
//!     iothreads = 1
//!     verbose = 1      #   Ask for a trace
//! main
//!     type = zmq_queue
//!     frontend
//!         option
//!             hwm = 1000
//!             swap = 25000000
//!             subscribe = "#2"
//!         bind = tcp://eth0:5555
//!     backend
//!         bind = tcp://eth0:5556
//! ```
//!
//! Documents decode into any `Deserialize` struct or string-keyed map
//! ([`from_str`], [`from_reader`]), or into the ordered, dynamically typed
//! [`Section`]. Values are encoded back with [`to_string`].

pub use de::SQUASH_FIELD;
pub use error::{Error, Location};
pub use events::{Event, EventReader, events};
pub use options::{DuplicateValuePolicy, Options};
pub use section::{Node, Property, Section};
pub use ser::{to_fmt_writer, to_io_writer, to_string};
pub use zpl_serde::{
    from_reader, from_reader_with_options, from_section, from_section_with_options, from_slice,
    from_slice_with_options, from_str, from_str_with_options,
};

mod builder;
mod de;
pub mod error;
pub mod events;
mod float_format;
pub mod macros;
mod matcher;
pub mod options;
mod parse_scalars;
mod scanner;
pub mod section;
pub mod ser;
mod ser_error;
mod zpl_serde;
