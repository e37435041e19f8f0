//! Dynamic decode target: an ordered tree of sections and properties.
//!
//! A [`Section`] keeps entries in first-appearance order and indexes them by
//! key. Each key holds either a nested section or a property; a property holds
//! every value given for that key, in document order.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use ahash::AHashMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smallvec::SmallVec;

use crate::de::{Cfg, ScalarDeserializer};
use crate::error::{Error, Location};
use crate::matcher::is_valid_key;
use crate::options::Options;

/// All values given for one key.
#[derive(Clone, Debug, Default)]
pub struct Property {
    values: SmallVec<[String; 1]>,
    location: Location,
}

impl Property {
    /// A property holding a single value.
    pub fn new(value: impl Into<String>) -> Self {
        let mut values = SmallVec::new();
        values.push(value.into());
        Self {
            values,
            location: Location::UNKNOWN,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Line of the most recent value, if it came from a document.
    pub fn location(&self) -> Location {
        self.location
    }

    fn push(&mut self, value: String, location: Location) {
        self.values.push(value);
        self.location = location;
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Property {}

/// The value held by one key of a [`Section`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Section(Section),
    Property(Property),
}

impl Node {
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(section) => Some(section),
            Node::Property(_) => None,
        }
    }

    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Node::Property(property) => Some(property),
            Node::Section(_) => None,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Node::Section(section) => section.location,
            Node::Property(property) => property.location,
        }
    }
}

/// An ordered ZPL section: the root of a document or any nested block.
///
/// ```rust
/// use serde_zpl::Section;
///
/// let root: Section = "main\n    type = zmq_queue\n    bind = a\n    bind = b\n".parse().unwrap();
/// let main = root.section("main").unwrap();
/// assert_eq!(main.get_str("type").unwrap(), "zmq_queue");
/// assert_eq!(main.values("bind").unwrap(), ["a", "b"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Section {
    entries: Vec<(String, Node)>,
    index: AHashMap<String, usize>,
    location: Location,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    fn at(location: Location) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Line of the header that opened this section; unknown for the root.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub(crate) fn entries(&self) -> &[(String, Node)] {
        &self.entries
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    /// The nested section `name`, if the key holds one.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.node(name).and_then(Node::as_section)
    }

    /// The nested section `name`, created empty when absent.
    ///
    /// Fails with [`Error::TypeConflict`] when the key already holds a property
    /// and with [`Error::InvalidEntry`] when `name` is not a ZPL key.
    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section, Error> {
        check_key(name)?;
        let slot = self.section_slot(name, Location::UNKNOWN)?;
        match &mut self.entries[slot].1 {
            Node::Section(section) => Ok(section),
            Node::Property(_) => Err(Error::TypeConflict {
                name: name.to_string(),
                location: Location::UNKNOWN,
            }),
        }
    }

    /// All values of property `name`, if the key holds one.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.node(name).and_then(Node::as_property).map(Property::values)
    }

    /// The single value of property `name`.
    pub fn get_str(&self, name: &str) -> Result<&str, Error> {
        self.single(name).map(|(value, _)| value)
    }

    /// The single value of property `name`, read as a boolean.
    pub fn get_bool(&self, name: &str) -> Result<bool, Error> {
        self.get(name)
    }

    /// The single value of property `name`, converted to `T`.
    ///
    /// ```rust
    /// use serde_zpl::Section;
    ///
    /// let root: Section = "port = 5555\n".parse().unwrap();
    /// assert_eq!(root.get::<u16>("port").unwrap(), 5555);
    /// assert!(root.get::<u8>("port").is_err());
    /// ```
    pub fn get<'a, T: Deserialize<'a>>(&'a self, name: &str) -> Result<T, Error> {
        let (value, location) = self.single(name)?;
        T::deserialize(ScalarDeserializer::new(value, location, Cfg::default()))
            .map_err(|e| e.with_default_location(location))
    }

    fn single(&self, name: &str) -> Result<(&str, Location), Error> {
        match self.node(name) {
            None => Err(Error::NotFound {
                name: name.to_string(),
            }),
            Some(Node::Section(section)) => Err(Error::Type {
                msg: format!("`{name}` is a section, not a property"),
                location: section.location,
            }),
            Some(Node::Property(property)) => match property.values.as_slice() {
                [value] => Ok((value.as_str(), property.location)),
                values => Err(Error::MultipleValues {
                    name: name.to_string(),
                    count: values.len(),
                    location: property.location,
                }),
            },
        }
    }

    /// Append `value` to property `name`, creating the property when absent.
    ///
    /// Fails with [`Error::Type`] when the key already holds a section and
    /// with [`Error::InvalidEntry`] when `name` is not a ZPL key or `value`
    /// spans several lines.
    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), Error> {
        let (name, value) = (name.into(), value.into());
        check_key(&name)?;
        check_value(&name, &value)?;
        self.push_value_at(name, value, Location::UNKNOWN)
    }

    pub(crate) fn push_value_at(&mut self, name: String, value: String, location: Location) -> Result<(), Error> {
        match self.index.get(&name) {
            Some(&slot) => match &mut self.entries[slot].1 {
                Node::Property(property) => {
                    property.push(value, location);
                    Ok(())
                }
                Node::Section(_) => Err(Error::Type {
                    msg: format!("cannot add a value to `{name}`: the key already holds a section"),
                    location,
                }),
            },
            None => {
                let mut property = Property::new(value);
                property.location = location;
                self.insert_new(name, Node::Property(property));
                Ok(())
            }
        }
    }

    /// Slot of section `name`, appending an empty one when absent.
    fn section_slot(&mut self, name: &str, location: Location) -> Result<usize, Error> {
        match self.index.get(name) {
            Some(&slot) => match &self.entries[slot].1 {
                Node::Section(_) => Ok(slot),
                Node::Property(_) => Err(Error::TypeConflict {
                    name: name.to_string(),
                    location,
                }),
            },
            None => Ok(self.insert_new(name.to_string(), Node::Section(Section::at(location)))),
        }
    }

    /// Move section `name` out of this one so it can be filled independently.
    ///
    /// An existing section is reopened with its content; the slot must be
    /// refilled with [`Section::restore_section`].
    pub(crate) fn take_section(&mut self, name: &str, location: Location) -> Result<(usize, Section), Error> {
        let slot = self.section_slot(name, location)?;
        match &mut self.entries[slot].1 {
            Node::Section(section) => Ok((slot, std::mem::take(section))),
            Node::Property(_) => Err(Error::TypeConflict {
                name: name.to_string(),
                location,
            }),
        }
    }

    pub(crate) fn restore_section(&mut self, slot: usize, section: Section) {
        if let Some((_, node)) = self.entries.get_mut(slot) {
            *node = Node::Section(section);
        }
    }

    fn insert_new(&mut self, name: String, node: Node) -> usize {
        let slot = self.entries.len();
        self.index.insert(name.clone(), slot);
        self.entries.push((name, node));
        slot
    }

    /// Merge `node` into key `name`: properties append, sections merge recursively.
    fn merge(&mut self, name: String, node: Node) -> Result<(), Error> {
        let Some(&slot) = self.index.get(&name) else {
            self.insert_new(name, node);
            return Ok(());
        };
        match (&mut self.entries[slot].1, node) {
            (Node::Property(existing), Node::Property(added)) => {
                existing.values.extend(added.values);
                existing.location = added.location;
                Ok(())
            }
            (Node::Section(existing), Node::Section(added)) => {
                for (key, child) in added.entries {
                    existing.merge(key, child)?;
                }
                Ok(())
            }
            (Node::Property(_), Node::Section(added)) => Err(Error::TypeConflict {
                name,
                location: added.location,
            }),
            (Node::Section(_), Node::Property(added)) => Err(Error::Type {
                msg: format!("cannot add a value to `{name}`: the key already holds a section"),
                location: added.location,
            }),
        }
    }

    /// Decode a ZPL document into this section, merging with what it holds.
    pub fn extend_from_str(&mut self, input: &str) -> Result<(), Error> {
        self.extend_from_str_with_options(input, &Options::default())
    }

    pub fn extend_from_str_with_options(&mut self, input: &str, options: &Options) -> Result<(), Error> {
        crate::builder::build(crate::EventReader::with_options(input.as_bytes(), options), self)
    }

    /// Decode a ZPL document from a byte stream into this section.
    pub fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        self.extend_from_reader_with_options(reader, &Options::default())
    }

    pub fn extend_from_reader_with_options<R: Read>(&mut self, reader: R, options: &Options) -> Result<(), Error> {
        crate::builder::build(
            crate::EventReader::with_options(crate::zpl_serde::buffered(reader), options),
            self,
        )
    }
}

fn check_key(name: &str) -> Result<(), Error> {
    if is_valid_key(name) {
        Ok(())
    } else {
        Err(Error::InvalidEntry {
            name: name.to_string(),
            msg: "keys are letters, digits and `/`, starting with a letter or digit",
        })
    }
}

fn check_value(name: &str, value: &str) -> Result<(), Error> {
    if value.contains(['\n', '\r']) {
        Err(Error::InvalidEntry {
            name: name.to_string(),
            msg: "values cannot contain line breaks",
        })
    } else {
        Ok(())
    }
}

/// Equality compares keys, their order and values; locations are ignored.
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Section {}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut section = Section::new();
        section.extend_from_str(s)?;
        Ok(section)
    }
}

/// Renders the section as a ZPL document.
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::ser::to_fmt_writer(f, self).map_err(|_| fmt::Error)
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in &self.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Section(section) => section.serialize(serializer),
            Node::Property(property) => property.serialize(serializer),
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a sequence of strings or a map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Property(Property::new(if v { "true" } else { "false" })))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Property(Property::new(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Property(Property::new(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Property(Property::new(v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Property(Property::new(v)))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Property(Property::new(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut property = Property::default();
        while let Some(value) = seq.next_element::<String>()? {
            property.values.push(value);
        }
        if property.is_empty() {
            return Err(de::Error::invalid_length(0, &"at least one value"));
        }
        Ok(Node::Property(property))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Node, A::Error> {
        SectionVisitor.visit_map(map).map(Node::Section)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct SectionVisitor;

impl<'de> Visitor<'de> for SectionVisitor {
    type Value = Section;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of sections and properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Section, A::Error> {
        let mut section = Section::new();
        while let Some((key, node)) = map.next_entry::<String, Node>()? {
            // nested sections were checked by their own visit
            check_key(&key).map_err(de::Error::custom)?;
            if let Node::Property(property) = &node {
                for value in &property.values {
                    check_value(&key, value).map_err(de::Error::custom)?;
                }
            }
            section.merge(key, node).map_err(de::Error::custom)?;
        }
        Ok(section)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionVisitor)
    }
}
