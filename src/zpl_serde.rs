//! Decode entry points.
//!
//! Every `from_*` function first checks that the target type can be a ZPL
//! document root (a struct or a string-keyed map, possibly behind `Option`,
//! `Box` or a newtype), then builds a [`Section`] from the input and projects
//! it onto the target. Decoding stops at the first error.

use std::io::{BufRead, BufReader, Read};

use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use serde::de::{Deserialize, DeserializeOwned};

use crate::builder::build;
use crate::de::{Cfg, SectionDeserializer, check_target};
use crate::error::Error;
use crate::events::EventReader;
use crate::options::Options;
use crate::section::Section;

/// Deserialize a ZPL document from a string.
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Context {
///     iothreads: u32,
///     verbose: bool,
/// }
///
/// #[derive(Deserialize)]
/// struct Root {
///     context: Context,
/// }
///
/// let root: Root = serde_zpl::from_str("context\n    iothreads = 1\n    verbose = 1\n").unwrap();
/// assert_eq!(root.context.iothreads, 1);
/// assert!(root.context.verbose);
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, Error> {
    from_str_with_options(input, Options::default())
}

/// Deserialize a ZPL document from a string with configurable [`Options`].
pub fn from_str_with_options<T: DeserializeOwned>(input: &str, options: Options) -> Result<T, Error> {
    decode(EventReader::with_options(input.as_bytes(), &options), &options)
}

/// Deserialize a ZPL document from UTF-8 bytes.
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, Error> {
    from_slice_with_options(input, Options::default())
}

/// Deserialize a ZPL document from UTF-8 bytes with configurable [`Options`].
pub fn from_slice_with_options<T: DeserializeOwned>(input: &[u8], options: Options) -> Result<T, Error> {
    decode(EventReader::with_options(input, &options), &options)
}

/// Deserialize a ZPL document from a byte stream.
///
/// The stream is read incrementally. A byte order mark selects UTF-8 or
/// UTF-16 decoding; without one the input must be UTF-8.
pub fn from_reader<R: Read, T: DeserializeOwned>(reader: R) -> Result<T, Error> {
    from_reader_with_options(reader, Options::default())
}

/// Deserialize a ZPL document from a byte stream with configurable [`Options`].
pub fn from_reader_with_options<R: Read, T: DeserializeOwned>(reader: R, options: Options) -> Result<T, Error> {
    decode(EventReader::with_options(buffered(reader), &options), &options)
}

/// Project an already decoded [`Section`] onto `T`.
///
/// Strings in `T` may borrow from the section.
///
/// ```rust
/// use serde::Deserialize;
/// use serde_zpl::Section;
///
/// #[derive(Deserialize)]
/// struct Endpoint<'a> {
///     bind: &'a str,
/// }
///
/// let section: Section = "bind = tcp://*:5555\n".parse().unwrap();
/// let endpoint: Endpoint = serde_zpl::from_section(&section).unwrap();
/// assert_eq!(endpoint.bind, "tcp://*:5555");
/// ```
pub fn from_section<'de, T: Deserialize<'de>>(section: &'de Section) -> Result<T, Error> {
    from_section_with_options(section, &Options::default())
}

/// Project an already decoded [`Section`] onto `T` with configurable [`Options`].
///
/// Only the value-level settings (`duplicate_values`, `strict_booleans`) apply here.
pub fn from_section_with_options<'de, T: Deserialize<'de>>(
    section: &'de Section,
    options: &Options,
) -> Result<T, Error> {
    T::deserialize(SectionDeserializer::root(section, Cfg::from_options(options)))
}

fn decode<R: BufRead, T: DeserializeOwned>(reader: EventReader<R>, options: &Options) -> Result<T, Error> {
    check_target::<T>()?;
    tracing::debug!(target_type = std::any::type_name::<T>(), "decoding ZPL document");
    let mut root = Section::new();
    build(reader, &mut root)?;
    let value = from_section_with_options(&root, options)?;
    tracing::debug!(entries = root.len(), "decoded ZPL document");
    Ok(value)
}

/// Transcode a byte stream to UTF-8 (BOM-aware) and buffer it.
pub(crate) fn buffered<R: Read>(reader: R) -> BufReader<DecodeReaderBytes<R, Vec<u8>>> {
    // None = sniff a BOM, pass the bytes through unchanged without one
    let decoder = DecodeReaderBytesBuilder::new().encoding(None).build(reader);
    BufReader::new(decoder)
}
