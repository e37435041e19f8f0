//! Serde deserializers that project a decoded [`Section`] onto typed targets.
//!
//! The field table of a struct target is the `fields` slice serde hands to
//! `deserialize_struct`. Keys are matched against it exactly; a key that
//! matches nothing goes to the field named `*` (if the struct has one) or
//! fails as an unknown field. Section nodes decode into structs and maps,
//! property nodes into scalars and sequences.

use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};

use crate::error::{Error, Location};
use crate::options::{DuplicateValuePolicy, Options};
use crate::parse_scalars::{parse_bool, parse_f32, parse_f64, parse_int_signed, parse_int_unsigned};
use crate::section::{Node, Property, Section};

/// Name of the struct field that receives every unmatched key.
pub const SQUASH_FIELD: &str = "*";

/// Decoder settings threaded through the deserializers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cfg {
    pub(crate) dup_policy: DuplicateValuePolicy,
    pub(crate) strict_booleans: bool,
}

impl Cfg {
    pub(crate) fn from_options(options: &Options) -> Self {
        Self {
            dup_policy: options.duplicate_values,
            strict_booleans: options.strict_booleans,
        }
    }
}

impl Default for Cfg {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

/// Methods of targets a given deserializer never accepts.
macro_rules! reject {
    ($($method:ident => $ty:literal),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
                self.reject($ty)
            }
        )*
    };
}

/// Methods a property hands to the scalar it resolves to.
macro_rules! forward_to_scalar {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                self.scalar()?.$method(visitor)
            }
        )*
    };
}

macro_rules! parse_int {
    ($($method:ident => $visit:ident($ty:ident) via $parse:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                visitor.$visit($parse::<$ty>(self.value, stringify!($ty), self.location)?)
            }
        )*
    };
}

/// One property value.
pub(crate) struct ScalarDeserializer<'de> {
    value: &'de str,
    location: Location,
    cfg: Cfg,
}

impl<'de> ScalarDeserializer<'de> {
    pub(crate) fn new(value: &'de str, location: Location, cfg: Cfg) -> Self {
        Self {
            value,
            location,
            cfg,
        }
    }

    fn type_error(&self, msg: String) -> Error {
        Error::type_error(msg).with_location(self.location)
    }

    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        Err(self.type_error(format!("expected a section for {ty}, found value `{}`", self.value)))
    }

    fn values(&self) -> ValuesAccess<std::iter::Once<&'de str>> {
        ValuesAccess {
            values: std::iter::once(self.value),
            location: self.location,
            cfg: self.cfg,
        }
    }
}

impl<'de> Deserializer<'de> for ScalarDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let b = parse_bool(self.value, self.cfg.strict_booleans).map_err(|msg| self.type_error(msg))?;
        visitor.visit_bool(b)
    }

    parse_int! {
        deserialize_i8 => visit_i8(i8) via parse_int_signed,
        deserialize_i16 => visit_i16(i16) via parse_int_signed,
        deserialize_i32 => visit_i32(i32) via parse_int_signed,
        deserialize_i64 => visit_i64(i64) via parse_int_signed,
        deserialize_i128 => visit_i128(i128) via parse_int_signed,
        deserialize_u8 => visit_u8(u8) via parse_int_unsigned,
        deserialize_u16 => visit_u16(u16) via parse_int_unsigned,
        deserialize_u32 => visit_u32(u32) via parse_int_unsigned,
        deserialize_u64 => visit_u64(u64) via parse_int_unsigned,
        deserialize_u128 => visit_u128(u128) via parse_int_unsigned,
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_f32(parse_f32(self.value, self.location)?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_f64(parse_f64(self.value, self.location)?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let mut chars = self.value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(self.type_error(format!("expected a single character, found `{}`", self.value))),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_bytes(self.value.as_bytes())
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_bytes(self.value.as_bytes())
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a map")
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    /// A value names a unit variant.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let variant: de::value::StrDeserializer<'_, Error> = self.value.into_deserializer();
        visitor.visit_enum(variant).map_err(|e| e.with_default_location(self.location))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }
}

/// Every value of a property, in document order.
struct ValuesAccess<I> {
    values: I,
    location: Location,
    cfg: Cfg,
}

impl<'de, I> SeqAccess<'de> for ValuesAccess<I>
where
    I: Iterator<Item = &'de str>,
{
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Error> {
        match self.values.next() {
            Some(value) => seed
                .deserialize(ScalarDeserializer::new(value, self.location, self.cfg))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.values.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// A key holding one or more values.
struct PropertyDeserializer<'de> {
    name: &'de str,
    property: &'de Property,
    cfg: Cfg,
}

impl<'de> PropertyDeserializer<'de> {
    fn new(name: &'de str, property: &'de Property, cfg: Cfg) -> Self {
        Self {
            name,
            property,
            cfg,
        }
    }

    fn type_error(&self, msg: String) -> Error {
        Error::type_error(msg).with_location(self.property.location())
    }

    /// The value a single-valued slot receives, per the duplicate policy.
    fn scalar(&self) -> Result<ScalarDeserializer<'de>, Error> {
        let values = self.property.values();
        let value = match self.cfg.dup_policy {
            DuplicateValuePolicy::LastWins => values.last(),
            DuplicateValuePolicy::FirstWins => values.first(),
            DuplicateValuePolicy::Error => match values {
                [value] => Some(value),
                _ => {
                    return Err(self.type_error(format!(
                        "`{}` is given {} times but holds a single value",
                        self.name,
                        values.len()
                    )));
                }
            },
        };
        let value = value.ok_or_else(|| self.type_error(format!("`{}` has no value", self.name)))?;
        Ok(ScalarDeserializer::new(value, self.property.location(), self.cfg))
    }

    fn values(&self) -> ValuesAccess<impl Iterator<Item = &'de str>> {
        ValuesAccess {
            values: self.property.values().iter().map(String::as_str),
            location: self.property.location(),
            cfg: self.cfg,
        }
    }

    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        Err(self.type_error(format!("`{}` is a property, expected a section for {ty}", self.name)))
    }
}

impl<'de> Deserializer<'de> for PropertyDeserializer<'de> {
    type Error = Error;

    /// Self-describing targets see every value as a sequence of strings.
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    forward_to_scalar! {
        deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_identifier
        deserialize_bytes deserialize_byte_buf deserialize_unit
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.scalar()?.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_seq(self.values())
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a map")
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.scalar()?.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }
}

/// A section, either the document root (`name` is `None`) or a nested one.
pub(crate) struct SectionDeserializer<'de> {
    name: Option<&'de str>,
    section: &'de Section,
    cfg: Cfg,
}

impl<'de> SectionDeserializer<'de> {
    pub(crate) fn root(section: &'de Section, cfg: Cfg) -> Self {
        Self {
            name: None,
            section,
            cfg,
        }
    }

    fn child(name: &'de str, section: &'de Section, cfg: Cfg) -> Self {
        Self {
            name: Some(name),
            section,
            cfg,
        }
    }

    /// The root only decodes into structs and maps; nested sections report
    /// the shape mismatch as a type error.
    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        match self.name {
            None => Err(Error::invalid_target(ty)),
            Some(name) => Err(Error::Type {
                msg: format!("`{name}` is a section, cannot decode it into {ty}"),
                location: self.section.location(),
            }),
        }
    }

    fn access(
        &self,
        fields: Option<&'static [&'static str]>,
        record: &'static str,
    ) -> SectionAccess<'de, std::slice::Iter<'de, (String, Node)>> {
        SectionAccess::new(
            self.section.entries().iter(),
            fields,
            record,
            self.section.location(),
            self.cfg,
        )
    }
}

impl<'de> Deserializer<'de> for SectionDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(None, "map"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(None, "map"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(Some(fields), name))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    /// A nested section with exactly one entry selects the variant named by its key.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        if self.name.is_none() {
            return self.reject(name);
        }
        match self.section.entries() {
            [(key, node)] => visitor.visit_enum(NodeEnumAccess {
                key,
                node,
                cfg: self.cfg,
            }),
            _ => Err(Error::Type {
                msg: format!(
                    "section for enum {name} must hold exactly one entry, found {}",
                    self.section.len()
                ),
                location: self.section.location(),
            }),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    reject! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "a string",
        deserialize_string => "a string",
        deserialize_identifier => "an identifier",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "()",
        deserialize_seq => "a sequence",
    }
}

/// Entries a struct did not declare, handed to its `*` field.
struct SquashDeserializer<'de> {
    entries: Vec<&'de (String, Node)>,
    location: Location,
    cfg: Cfg,
}

impl<'de> SquashDeserializer<'de> {
    fn access(
        self,
        fields: Option<&'static [&'static str]>,
        record: &'static str,
    ) -> SectionAccess<'de, std::vec::IntoIter<&'de (String, Node)>> {
        SectionAccess::new(self.entries.into_iter(), fields, record, self.location, self.cfg)
    }

    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        Err(Error::Type {
            msg: format!("the `{SQUASH_FIELD}` field must be a map or a struct, not {ty}"),
            location: self.location,
        })
    }
}

impl<'de> Deserializer<'de> for SquashDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(None, "map"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(None, "map"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_map(self.access(Some(fields), name))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    reject! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "a string",
        deserialize_string => "a string",
        deserialize_identifier => "an identifier",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "()",
        deserialize_seq => "a sequence",
    }
}

enum Pending<'de> {
    Entry(&'de str, &'de Node),
    Squash(Vec<&'de (String, Node)>),
}

/// Walks the entries of a section as a serde map.
struct SectionAccess<'de, I> {
    entries: I,
    /// Declared field names; `None` accepts every key.
    fields: Option<&'static [&'static str]>,
    record: &'static str,
    /// Unmatched entries, collected when the record has a `*` field.
    squashed: Option<Vec<&'de (String, Node)>>,
    pending: Option<Pending<'de>>,
    location: Location,
    cfg: Cfg,
}

impl<'de, I> SectionAccess<'de, I>
where
    I: Iterator<Item = &'de (String, Node)>,
{
    fn new(
        entries: I,
        fields: Option<&'static [&'static str]>,
        record: &'static str,
        location: Location,
        cfg: Cfg,
    ) -> Self {
        let squash = fields.is_some_and(|fields| fields.contains(&SQUASH_FIELD));
        Self {
            entries,
            fields,
            record,
            squashed: squash.then(Vec::new),
            pending: None,
            location,
            cfg,
        }
    }
}

impl<'de, I> MapAccess<'de> for SectionAccess<'de, I>
where
    I: Iterator<Item = &'de (String, Node)>,
{
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        for entry in self.entries.by_ref() {
            let (key, node) = entry;
            let declared = match self.fields {
                None => true,
                Some(fields) => key != SQUASH_FIELD && fields.iter().any(|field| field == key),
            };
            if declared {
                self.pending = Some(Pending::Entry(key.as_str(), node));
                return seed.deserialize(KeyDeserializer(key.as_str())).map(Some);
            }
            match self.squashed.as_mut() {
                Some(squashed) => squashed.push(entry),
                None => {
                    return Err(Error::UnknownField {
                        field: key.clone(),
                        record: self.record,
                        location: node.location(),
                    });
                }
            }
        }
        if let Some(squashed) = self.squashed.take() {
            self.pending = Some(Pending::Squash(squashed));
            return seed.deserialize(KeyDeserializer(SQUASH_FIELD)).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        match self.pending.take() {
            Some(Pending::Entry(key, node)) => deserialize_node(seed, key, node, self.cfg),
            Some(Pending::Squash(entries)) => seed
                .deserialize(SquashDeserializer {
                    entries,
                    location: self.location,
                    cfg: self.cfg,
                })
                .map_err(|e| e.with_default_location(self.location)),
            None => Err(Error::Usage {
                msg: "map value requested before its key",
            }),
        }
    }
}

fn deserialize_node<'de, S: DeserializeSeed<'de>>(
    seed: S,
    name: &'de str,
    node: &'de Node,
    cfg: Cfg,
) -> Result<S::Value, Error> {
    let result = match node {
        Node::Section(section) => seed.deserialize(SectionDeserializer::child(name, section, cfg)),
        Node::Property(property) => seed.deserialize(PropertyDeserializer::new(name, property, cfg)),
    };
    result.map_err(|e| e.with_default_location(node.location()))
}

/// Map keys and field names. Only string-like key types are accepted.
struct KeyDeserializer<'de>(&'de str);

impl<'de> KeyDeserializer<'de> {
    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        Err(Error::invalid_target(format!("a map keyed by {ty}")))
    }
}

impl<'de> Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.0)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let variant: de::value::StrDeserializer<'_, Error> = self.0.into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    reject! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "()",
        deserialize_seq => "a sequence",
        deserialize_map => "a map",
    }
}

/// A nested section with a single entry, read as an externally tagged enum.
struct NodeEnumAccess<'de> {
    key: &'de str,
    node: &'de Node,
    cfg: Cfg,
}

impl<'de> EnumAccess<'de> for NodeEnumAccess<'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self), Error> {
        let variant = seed.deserialize(KeyDeserializer(self.key))?;
        Ok((variant, self))
    }
}

impl<'de> VariantAccess<'de> for NodeEnumAccess<'de> {
    type Error = Error;

    /// Only an empty section names a unit variant.
    fn unit_variant(self) -> Result<(), Error> {
        match self.node {
            Node::Section(section) if section.is_empty() => Ok(()),
            node => Err(Error::Type {
                msg: format!("unit variant `{}` cannot hold values or sections", self.key),
                location: node.location(),
            }),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
        deserialize_node(seed, self.key, self.node, self.cfg)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        match self.node {
            Node::Property(property) => {
                PropertyDeserializer::new(self.key, property, self.cfg).deserialize_seq(visitor)
            }
            Node::Section(section) => {
                SectionDeserializer::child(self.key, section, self.cfg).deserialize_seq(visitor)
            }
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.node {
            Node::Section(section) => SectionDeserializer::child(self.key, section, self.cfg)
                .deserialize_struct("enum variant", fields, visitor),
            Node::Property(property) => PropertyDeserializer::new(self.key, property, self.cfg)
                .deserialize_struct("enum variant", fields, visitor),
        }
    }
}

/// Check that `T` can be a decode root before any input is read.
///
/// `T` is driven against an empty map whose first key is empty; struct and
/// string-keyed map targets get past that point (usually failing later with
/// an unrelated error), everything else reports [`Error::InvalidTarget`].
pub(crate) fn check_target<'de, T: de::Deserialize<'de>>() -> Result<(), Error> {
    match T::deserialize(TargetProbe) {
        Err(err @ Error::InvalidTarget { .. }) => Err(err),
        _ => Ok(()),
    }
}

struct TargetProbe;

impl TargetProbe {
    fn reject<T>(&self, ty: &'static str) -> Result<T, Error> {
        Err(Error::invalid_target(ty))
    }
}

impl<'de> Deserializer<'de> for TargetProbe {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(ProbeMap)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_map(ProbeMap)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_map(ProbeMap)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value, Error> {
        self.reject("a tuple")
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        self.reject(name)
    }

    reject! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "a string",
        deserialize_string => "a string",
        deserialize_identifier => "an identifier",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "()",
        deserialize_seq => "a sequence",
    }
}

struct ProbeMap;

impl<'de> MapAccess<'de> for ProbeMap {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        seed.deserialize(KeyDeserializer("")).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, _seed: V) -> Result<V::Value, Error> {
        Err(Error::msg("target probe stops after the first key"))
    }
}
