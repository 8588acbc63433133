//! Provides the dynamic value type templates are rendered against.
//!
//! A [`Value`] is the hierarchical data context of a render: a tree of
//! strings, numbers, booleans, sequences and maps.  Values are typically
//! not constructed variant by variant but converted from anything
//! serializable via [`Value::from_serialize`] or the
//! [`context!`](crate::context) macro:
//!
//! ```
//! use nanotemplate::{context, Value};
//!
//! let ctx = context! {
//!     name => "Peter",
//!     tags => vec!["a", "b"],
//! };
//! assert_eq!(ctx.get_path("name").as_str(), Some("Peter"));
//! ```
//!
//! The engine never mutates a context.  Iteration with `{{#each}}`
//! constructs fresh, derived contexts instead.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{self, Serialize, Serializer};

/// Represents a dynamically typed context value.
///
/// Missing data is modeled as [`Value::Undefined`] rather than as an error;
/// an undefined value renders as the empty string and is falsy.  JSON `null`
/// maps to [`Value::None`] which behaves the same way for rendering and
/// truthiness purposes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// A value that does not exist (a failed lookup).
    #[default]
    Undefined,
    /// The explicit null value.
    None,
    /// A boolean.
    Bool(bool),
    /// An unsigned integer.
    U64(u64),
    /// A signed integer.
    I64(i64),
    /// A float.
    F64(f64),
    /// A string.
    String(String),
    /// A sequence of values.
    Seq(Vec<Value>),
    /// A mapping of string keys to values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// The undefined value, also the result of failed path lookups.
    pub const UNDEFINED: Value = Value::Undefined;

    /// Resolves a dot separated path within this value.
    ///
    /// The path is split on `.` and walked one key at a time, descending
    /// into nested maps.  The walk stops with [`Value::UNDEFINED`] as soon
    /// as a key is missing or the current value is not a map.  Lookups
    /// never fail; absence is a normal result.
    ///
    /// ```
    /// # use nanotemplate::context;
    /// let ctx = context! { user => context! { name => "Peter" } };
    /// assert_eq!(ctx.get_path("user.name").as_str(), Some("Peter"));
    /// assert!(ctx.get_path("user.email").is_undefined());
    /// assert!(ctx.get_path("user.name.first").is_undefined());
    /// ```
    pub fn get_path(&self, path: &str) -> &Value {
        let mut rv = self;
        for segment in path.split('.') {
            rv = match rv {
                Value::Map(map) => map.get(segment).unwrap_or(&Value::UNDEFINED),
                _ => return &Value::UNDEFINED,
            };
        }
        rv
    }

    /// Returns `true` if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Is this value truthy?
    ///
    /// Undefined, none, `false`, numeric zero and the empty string are
    /// falsy; everything else (including empty sequences and maps) is
    /// truthy.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Undefined | Value::None => false,
            Value::Bool(val) => *val,
            Value::U64(val) => *val != 0,
            Value::I64(val) => *val != 0,
            Value::F64(val) => *val != 0.0,
            Value::String(val) => !val.is_empty(),
            Value::Seq(_) | Value::Map(_) => true,
        }
    }

    /// If the value is a string, returns it.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(val) => Some(val),
            _ => None,
        }
    }

    /// If the value is a sequence, returns a slice of its elements.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Creates a value from something that can be serialized.
    ///
    /// This is how contexts are normally built: any `serde` serializable
    /// value (including `serde_json::Value`) converts into the engine's
    /// value type.  Conversion does not fail; the rare shapes the engine
    /// cannot represent (such as byte strings) come out as
    /// [`Value::Undefined`].
    ///
    /// ```
    /// # use nanotemplate::Value;
    /// let val = Value::from_serialize(&vec![1, 2, 3]);
    /// assert!(val.as_seq().is_some());
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Value {
        transform(value)
    }

    /// Parses a JSON document into a context value.
    ///
    /// This is a convenience for callers whose data source is a JSON API
    /// response.  Parse failures are the caller's retrieval concern and
    /// surface as `serde_json` errors, not template errors.
    #[cfg(feature = "json")]
    #[cfg_attr(docsrs, doc(cfg(feature = "json")))]
    pub fn from_json(source: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(source).map(|val| Value::from_serialize(&val))
    }
}

fn fmt_item(item: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match item {
        Value::String(s) => write!(f, "{:?}", s),
        _ => write!(f, "{}", item),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::None => Ok(()),
            Value::Bool(val) => write!(f, "{}", val),
            Value::U64(val) => write!(f, "{}", val),
            Value::I64(val) => write!(f, "{}", val),
            Value::F64(val) => {
                if val.is_finite() && val.fract() == 0.0 {
                    write!(f, "{:.1}", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            Value::String(val) => f.write_str(val),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    fmt_item(item, f)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", key)?;
                    fmt_item(value, f)?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! value_from {
    ($src:ty, $dst:ident) => {
        impl From<$src> for Value {
            fn from(val: $src) -> Value {
                Value::$dst(val as _)
            }
        }
    };
}

impl From<bool> for Value {
    fn from(val: bool) -> Value {
        Value::Bool(val)
    }
}

value_from!(u8, U64);
value_from!(u16, U64);
value_from!(u32, U64);
value_from!(u64, U64);
value_from!(i8, I64);
value_from!(i16, I64);
value_from!(i32, I64);
value_from!(i64, I64);
value_from!(f32, F64);
value_from!(f64, F64);

impl From<String> for Value {
    fn from(val: String) -> Value {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Value {
        Value::String(val.to_owned())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value {
        Value::None
    }
}

impl From<Vec<Value>> for Value {
    fn from(val: Vec<Value>) -> Value {
        Value::Seq(val)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(val: BTreeMap<String, Value>) -> Value {
        Value::Map(val)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Value::Seq(iter.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Undefined | Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::U64(u) => serializer.serialize_u64(*u),
            Value::I64(i) => serializer.serialize_i64(*i),
            Value::F64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Seq(elements) => elements.serialize(serializer),
            Value::Map(entries) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Debug)]
struct InvalidValue(String);

impl std::error::Error for InvalidValue {}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ser::Error for InvalidValue {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        InvalidValue(msg.to_string())
    }
}

fn transform<T: Serialize + ?Sized>(value: &T) -> Value {
    value.serialize(ValueSerializer).unwrap_or(Value::Undefined)
}

/// Serializer that builds a `Value` out of anything serializable.
struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = InvalidValue;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value, InvalidValue> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, InvalidValue> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, InvalidValue> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, InvalidValue> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, InvalidValue> {
        Ok(Value::I64(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, InvalidValue> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, InvalidValue> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, InvalidValue> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, InvalidValue> {
        Ok(Value::U64(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, InvalidValue> {
        Ok(Value::F64(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, InvalidValue> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, InvalidValue> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, value: &str) -> Result<Value, InvalidValue> {
        Ok(Value::String(value.to_owned()))
    }

    fn serialize_bytes(self, _value: &[u8]) -> Result<Value, InvalidValue> {
        Err(ser::Error::custom("byte strings are unsupported"))
    }

    fn serialize_none(self) -> Result<Value, InvalidValue> {
        Ok(Value::None)
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        Ok(transform(value))
    }

    fn serialize_unit(self) -> Result<Value, InvalidValue> {
        Ok(Value::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, InvalidValue> {
        Ok(Value::None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, InvalidValue> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        Ok(transform(value))
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue>
    where
        T: Serialize,
    {
        let mut map = BTreeMap::new();
        map.insert(variant.to_owned(), transform(value));
        Ok(Value::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, InvalidValue> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(len.unwrap_or(0).min(1024)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, InvalidValue> {
        Ok(SerializeTupleVariant {
            name: variant,
            fields: Vec::with_capacity(len.min(1024)),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, InvalidValue> {
        let _ = len;
        Ok(SerializeMap {
            entries: BTreeMap::new(),
            key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, InvalidValue> {
        Ok(SerializeStruct {
            fields: BTreeMap::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, InvalidValue> {
        Ok(SerializeStructVariant {
            variant,
            map: BTreeMap::new(),
        })
    }
}

struct SerializeSeq {
    elements: Vec<Value>,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.elements.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::Seq(self.elements))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.elements.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::Seq(self.elements))
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.elements.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::Seq(self.elements))
    }
}

struct SerializeTupleVariant {
    name: &'static str,
    fields: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.fields.push(transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        let mut map = BTreeMap::new();
        map.insert(self.name.to_owned(), Value::Seq(self.fields));
        Ok(Value::Map(map))
    }
}

struct SerializeMap {
    entries: BTreeMap<String, Value>,
    key: Option<String>,
}

fn map_key(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        match key.serialize(ValueSerializer) {
            Ok(key) => self.key = Some(map_key(key)),
            Err(_) => self.key = None,
        }
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        if let Some(key) = self.key.take() {
            self.entries.insert(key, transform(value));
        }
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::Map(self.entries))
    }
}

struct SerializeStruct {
    fields: BTreeMap<String, Value>,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.fields.insert(key.to_owned(), transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::Map(self.fields))
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    map: BTreeMap<String, Value>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue>
    where
        T: Serialize,
    {
        self.map.insert(key.to_owned(), transform(value));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        let mut rv = BTreeMap::new();
        rv.insert(self.variant.to_owned(), Value::Map(self.map));
        Ok(Value::Map(rv))
    }
}
