//! Single-pass ZPL serializer.
//!
//! Structs and maps become sections, one indent level (4 spaces) deeper per
//! nesting. Scalars become `key = value` lines; sequences repeat the key once
//! per element, so a `Vec` of structs becomes repeated sections. A struct
//! field or map entry named `*` writes its entries at the level of its parent.
//! `None` and unit values are skipped. Field order follows the `Serialize`
//! impl; maps are written in their own iteration order.
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Frontend {
//!     bind: Vec<String>,
//! }
//!
//! #[derive(Serialize)]
//! struct Main {
//!     #[serde(rename = "type")]
//!     kind: String,
//!     frontend: Frontend,
//! }
//!
//! let main = Main {
//!     kind: "zmq_queue".into(),
//!     frontend: Frontend { bind: vec!["tcp://eth0:5555".into(), "inproc://device".into()] },
//! };
//! let text = serde_zpl::to_string(&main).unwrap();
//! assert_eq!(
//!     text,
//!     "type = zmq_queue\nfrontend\n    bind = tcp://eth0:5555\n    bind = inproc://device\n"
//! );
//! ```

use std::fmt::{self, Write};
use std::io;

use serde::ser::{
    self, Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::de::SQUASH_FIELD;
use crate::float_format::write_float_string;
use crate::matcher::{INDENT_STEP, is_valid_key};

pub use crate::ser_error::Error;

/// Result alias for the serializer.
pub type Result<T> = std::result::Result<T, Error>;

/// Serialize a value to a ZPL `String`.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = String::new();
    to_fmt_writer(&mut out, value)?;
    Ok(out)
}

/// Serialize a value into any [`fmt::Write`] target.
pub fn to_fmt_writer<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    let mut ser = ZplSerializer::new(out);
    value.serialize(&mut ser)
}

/// Serialize a value into any [`io::Write`] target.
///
/// ```rust
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("verbose", 1);
/// let mut buf = Vec::new();
/// serde_zpl::to_io_writer(&mut buf, &map).unwrap();
/// assert_eq!(buf, b"verbose = 1\n");
/// ```
pub fn to_io_writer<W: io::Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    let mut adapter = IoAdapter { out, error: None };
    let result = to_fmt_writer(&mut adapter, value);
    match (result, adapter.error.take()) {
        (Err(Error::Format { .. }), Some(error)) => Err(Error::IO { error }),
        (result, _) => result,
    }
}

/// Bridges `fmt::Write` to `io::Write`, keeping the I/O error that `fmt` cannot carry.
struct IoAdapter<'a, W: io::Write> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<W: io::Write> Write for IoAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_all(s.as_bytes()).map_err(|error| {
            self.error = Some(error);
            fmt::Error
        })
    }
}

/// Core ZPL serializer writing into a `fmt::Write` target.
pub struct ZplSerializer<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> ZplSerializer<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    fn indent(&mut self, depth: usize) -> Result<()> {
        for _ in 0..depth * INDENT_STEP {
            self.out.write_char(' ')?;
        }
        Ok(())
    }

    fn write_header(&mut self, depth: usize, key: &str) -> Result<()> {
        self.indent(depth)?;
        self.out.write_str(key)?;
        self.out.write_char('\n')?;
        Ok(())
    }

    /// Write `key = ` and let `value` render the rest of the line.
    fn write_property<F>(&mut self, depth: usize, key: &str, value: F) -> Result<()>
    where
        F: FnOnce(&mut W) -> Result<()>,
    {
        self.indent(depth)?;
        self.out.write_str(key)?;
        self.out.write_str(" = ")?;
        value(&mut *self.out)?;
        self.out.write_char('\n')?;
        Ok(())
    }
}

fn check_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(Error::InvalidKey { key: key.to_string() })
    }
}

fn invalid_root<T>(kind: &'static str) -> Result<T> {
    Err(Error::InvalidRoot { kind })
}

/// The document root: only structs and maps (possibly wrapped) are accepted.
impl<'a, 'b, W: Write> Serializer for &'a mut ZplSerializer<'b, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = MapSer<'a, 'b, W>;
    type SerializeStruct = StructSer<'a, 'b, W>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        invalid_root("bool")
    }
    fn serialize_i8(self, _v: i8) -> Result<()> {
        invalid_root("i8")
    }
    fn serialize_i16(self, _v: i16) -> Result<()> {
        invalid_root("i16")
    }
    fn serialize_i32(self, _v: i32) -> Result<()> {
        invalid_root("i32")
    }
    fn serialize_i64(self, _v: i64) -> Result<()> {
        invalid_root("i64")
    }
    fn serialize_i128(self, _v: i128) -> Result<()> {
        invalid_root("i128")
    }
    fn serialize_u8(self, _v: u8) -> Result<()> {
        invalid_root("u8")
    }
    fn serialize_u16(self, _v: u16) -> Result<()> {
        invalid_root("u16")
    }
    fn serialize_u32(self, _v: u32) -> Result<()> {
        invalid_root("u32")
    }
    fn serialize_u64(self, _v: u64) -> Result<()> {
        invalid_root("u64")
    }
    fn serialize_u128(self, _v: u128) -> Result<()> {
        invalid_root("u128")
    }
    fn serialize_f32(self, _v: f32) -> Result<()> {
        invalid_root("f32")
    }
    fn serialize_f64(self, _v: f64) -> Result<()> {
        invalid_root("f64")
    }
    fn serialize_char(self, _v: char) -> Result<()> {
        invalid_root("char")
    }
    fn serialize_str(self, _v: &str) -> Result<()> {
        invalid_root("a string")
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        invalid_root("bytes")
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(self, name: &'static str, _index: u32, _variant: &'static str) -> Result<()> {
        invalid_root(name)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        invalid_root(name)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        invalid_root("a sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        invalid_root("a tuple")
    }

    fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        invalid_root(name)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        invalid_root(name)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSer {
            ser: self,
            depth: 0,
            pending: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSer { ser: self, depth: 0 })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        invalid_root(name)
    }
}

/// The value of one key: a property line, a section, or repeats of either.
pub struct FieldSer<'a, 'b, W: Write> {
    ser: &'a mut ZplSerializer<'b, W>,
    key: &'a str,
    depth: usize,
    /// Entries go to the enclosing section instead of a section of their own.
    squash: bool,
}

impl<'a, 'b, W: Write> FieldSer<'a, 'b, W> {
    fn property<F>(self, value: F) -> Result<()>
    where
        F: FnOnce(&mut W) -> Result<()>,
    {
        if self.squash {
            return Err(Error::InvalidValue {
                key: self.key.to_string(),
                msg: "the catch-all field must hold a map or a struct".to_string(),
            });
        }
        self.ser.write_property(self.depth, self.key, value)
    }

    fn text(self, v: &str) -> Result<()> {
        if v.contains(['\n', '\r']) {
            return Err(Error::InvalidValue {
                key: self.key.to_string(),
                msg: "line breaks cannot be written".to_string(),
            });
        }
        self.property(|out| {
            out.write_str(if v.is_empty() { "\"\"" } else { v })?;
            Ok(())
        })
    }

    fn display<T: fmt::Display>(self, v: T) -> Result<()> {
        self.property(|out| {
            write!(out, "{v}")?;
            Ok(())
        })
    }

    /// Open the section this field names and return the depth of its children.
    fn open(&mut self) -> Result<usize> {
        if self.squash {
            return Ok(self.depth);
        }
        self.ser.write_header(self.depth, self.key)?;
        Ok(self.depth + 1)
    }
}

impl<'a, 'b, W: Write> Serializer for FieldSer<'a, 'b, W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSer<'a, 'b, W>;
    type SerializeTuple = SeqSer<'a, 'b, W>;
    type SerializeTupleStruct = SeqSer<'a, 'b, W>;
    type SerializeTupleVariant = SeqSer<'a, 'b, W>;
    type SerializeMap = MapSer<'a, 'b, W>;
    type SerializeStruct = StructSer<'a, 'b, W>;
    type SerializeStructVariant = StructSer<'a, 'b, W>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.display(if v { 1 } else { 0 })
    }
    fn serialize_i8(self, v: i8) -> Result<()> {
        self.display(v)
    }
    fn serialize_i16(self, v: i16) -> Result<()> {
        self.display(v)
    }
    fn serialize_i32(self, v: i32) -> Result<()> {
        self.display(v)
    }
    fn serialize_i64(self, v: i64) -> Result<()> {
        self.display(v)
    }
    fn serialize_i128(self, v: i128) -> Result<()> {
        self.display(v)
    }
    fn serialize_u8(self, v: u8) -> Result<()> {
        self.display(v)
    }
    fn serialize_u16(self, v: u16) -> Result<()> {
        self.display(v)
    }
    fn serialize_u32(self, v: u32) -> Result<()> {
        self.display(v)
    }
    fn serialize_u64(self, v: u64) -> Result<()> {
        self.display(v)
    }
    fn serialize_u128(self, v: u128) -> Result<()> {
        self.display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.property(|out| write_float_string(out, v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.property(|out| write_float_string(out, v))
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.text(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.text(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        match std::str::from_utf8(v) {
            Ok(text) => self.text(text),
            Err(_) => Err(Error::InvalidValue {
                key: self.key.to_string(),
                msg: "bytes are not valid UTF-8".to_string(),
            }),
        }
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.text(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    /// Written as a section holding one entry named after the variant.
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        mut self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        let depth = self.open()?;
        value.serialize(FieldSer {
            ser: self.ser,
            key: variant,
            depth,
            squash: false,
        })
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSer {
            ser: self.ser,
            key: self.key,
            depth: self.depth,
            squash: self.squash,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        mut self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let depth = self.open()?;
        Ok(SeqSer {
            ser: self.ser,
            key: variant,
            depth,
            squash: false,
        })
    }

    fn serialize_map(mut self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let depth = self.open()?;
        Ok(MapSer {
            ser: self.ser,
            depth,
            pending: None,
        })
    }

    fn serialize_struct(mut self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        let depth = self.open()?;
        Ok(StructSer { ser: self.ser, depth })
    }

    fn serialize_struct_variant(
        mut self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let depth = self.open()?;
        self.ser.write_header(depth, variant)?;
        Ok(StructSer {
            ser: self.ser,
            depth: depth + 1,
        })
    }
}

/// Repeats the key for every element.
pub struct SeqSer<'a, 'b, W: Write> {
    ser: &'a mut ZplSerializer<'b, W>,
    key: &'a str,
    depth: usize,
    squash: bool,
}

impl<W: Write> SeqSer<'_, '_, W> {
    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(FieldSer {
            ser: &mut *self.ser,
            key: self.key,
            depth: self.depth,
            squash: self.squash,
        })
    }
}

impl<W: Write> SerializeSeq for SeqSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> SerializeTuple for SeqSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> SerializeTupleStruct for SeqSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> SerializeTupleVariant for SeqSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Entries of a map; keys must render as valid ZPL keys, or be `*` to write
/// the entry's children at the map's own level.
pub struct MapSer<'a, 'b, W: Write> {
    ser: &'a mut ZplSerializer<'b, W>,
    depth: usize,
    pending: Option<String>,
}

impl<W: Write> SerializeMap for MapSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        let key = key.serialize(KeySer)?;
        if key != SQUASH_FIELD {
            check_key(&key)?;
        }
        self.pending = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("map value serialized before its key"))?;
        value.serialize(FieldSer {
            ser: &mut *self.ser,
            key: &key,
            depth: self.depth,
            squash: key == SQUASH_FIELD,
        })
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Fields of a struct, in declaration order.
pub struct StructSer<'a, 'b, W: Write> {
    ser: &'a mut ZplSerializer<'b, W>,
    depth: usize,
}

impl<W: Write> StructSer<'_, '_, W> {
    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let squash = key == SQUASH_FIELD;
        if !squash {
            check_key(key)?;
        }
        value.serialize(FieldSer {
            ser: &mut *self.ser,
            key,
            depth: self.depth,
            squash,
        })
    }
}

impl<W: Write> SerializeStruct for StructSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> SerializeStructVariant for StructSer<'_, '_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Renders a map key to text. Strings, chars, integers and unit variants qualify.
struct KeySer;

fn non_text_key<T>(kind: &str) -> Result<T> {
    Err(Error::InvalidKey {
        key: format!("<{kind}>"),
    })
}

impl Serializer for KeySer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }
    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<String> {
        Ok(variant.to_string())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        non_text_key("bool")
    }
    fn serialize_f32(self, _v: f32) -> Result<String> {
        non_text_key("f32")
    }
    fn serialize_f64(self, _v: f64) -> Result<String> {
        non_text_key("f64")
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        non_text_key("bytes")
    }
    fn serialize_none(self) -> Result<String> {
        non_text_key("none")
    }
    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<String> {
        non_text_key("option")
    }
    fn serialize_unit(self) -> Result<String> {
        non_text_key("unit")
    }
    fn serialize_unit_struct(self, name: &'static str) -> Result<String> {
        non_text_key(name)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        non_text_key(name)
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        non_text_key("sequence")
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        non_text_key("tuple")
    }
    fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        non_text_key(name)
    }
    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        non_text_key(name)
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        non_text_key("map")
    }
    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        non_text_key(name)
    }
    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        non_text_key(name)
    }
}
