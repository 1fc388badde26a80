use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IntoDeserializer},
};

const INDENT: usize = 2;

/// A JSON number that keeps integers and floats apart so exported content
/// prints exactly what was stored.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNumber {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Serialize for ContentNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentNumber::I64(v) => serializer.serialize_i64(*v),
            ContentNumber::U64(v) => serializer.serialize_u64(*v),
            ContentNumber::F64(v) => serializer.serialize_f64(*v),
        }
    }
}

impl ContentNumber {
    fn write_json(&self, out: &mut String) {
        match self {
            ContentNumber::I64(v) => out.push_str(&v.to_string()),
            ContentNumber::U64(v) => out.push_str(&v.to_string()),
            ContentNumber::F64(v) => {
                // JSON has no NaN/Infinity; mirror what a browser's stringify emits.
                if !v.is_finite() {
                    out.push_str("null");
                    return;
                }
                let mut buf = ryu::Buffer::new();
                let s = buf.format_finite(*v);
                out.push_str(s.strip_suffix(".0").unwrap_or(s));
            }
        }
    }
}

/// A node of the bilingual content tree.
///
/// The tree is type-erased: sections, item records and leaves are all
/// `ContentValue`s, and the typed shape lives in [`crate::content`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContentValue {
    #[default]
    Null,
    Bool(bool),
    Number(ContentNumber),
    String(String),
    Array(Vec<ContentValue>),
    Object(IndexMap<String, ContentValue>),
}

impl ContentValue {
    pub fn empty_object() -> Self {
        ContentValue::Object(IndexMap::new())
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ContentValue>> {
        match self {
            ContentValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, ContentValue>> {
        match self {
            ContentValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ContentValue]> {
        match self {
            ContentValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContentValue> {
        self.as_object().and_then(|m| m.get(key))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ContentValue::Array(_) | ContentValue::Object(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ContentValue::Null => "null",
            ContentValue::Bool(_) => "bool",
            ContentValue::Number(_) => "number",
            ContentValue::String(_) => "string",
            ContentValue::Array(_) => "array",
            ContentValue::Object(_) => "object",
        }
    }

    /// Text shown by a bound field. Null and containers render blank.
    pub fn display_text(&self) -> String {
        match self {
            ContentValue::String(s) => s.clone(),
            ContentValue::Bool(b) => b.to_string(),
            ContentValue::Number(n) => {
                let mut out = String::new();
                n.write_json(&mut out);
                out
            }
            ContentValue::Null | ContentValue::Array(_) | ContentValue::Object(_) => String::new(),
        }
    }

    /// Parse JSON or JSON5 text.
    pub fn parse(text: &str) -> anyhow::Result<ContentValue> {
        Ok(json5::from_str::<ContentValue>(text)?)
    }

    /// Pretty JSON with two-space indentation and `"key": value` pairs.
    pub fn to_json_pretty(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out, 0, true);
        out
    }

    pub fn to_json_compact(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out, 0, false);
        out
    }

    fn write_json(&self, out: &mut String, indent: usize, pretty: bool) {
        match self {
            ContentValue::Null => out.push_str("null"),
            ContentValue::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            ContentValue::Number(n) => n.write_json(out),
            ContentValue::String(s) => write_escaped_string(out, s),
            ContentValue::Array(values) => {
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if pretty {
                        out.push('\n');
                        out.push_str(&" ".repeat(indent + INDENT));
                    }
                    v.write_json(out, indent + INDENT, pretty);
                }
                if pretty && !values.is_empty() {
                    out.push('\n');
                    out.push_str(&" ".repeat(indent));
                }
                out.push(']');
            }
            ContentValue::Object(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if pretty {
                        out.push('\n');
                        out.push_str(&" ".repeat(indent + INDENT));
                    }
                    write_escaped_string(out, k);
                    out.push(':');
                    if pretty {
                        out.push(' ');
                    }
                    v.write_json(out, indent + INDENT, pretty);
                }
                if pretty && !map.is_empty() {
                    out.push('\n');
                    out.push_str(&" ".repeat(indent));
                }
                out.push('}');
            }
        }
    }
}

impl From<&str> for ContentValue {
    fn from(s: &str) -> Self {
        ContentValue::String(s.to_string())
    }
}

impl From<String> for ContentValue {
    fn from(s: String) -> Self {
        ContentValue::String(s)
    }
}

fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl Serialize for ContentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentValue::Null => serializer.serialize_unit(),
            ContentValue::Bool(v) => serializer.serialize_bool(*v),
            ContentValue::Number(n) => n.serialize(serializer),
            ContentValue::String(s) => serializer.serialize_str(s),
            ContentValue::Array(values) => values.serialize(serializer),
            ContentValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = ContentValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ContentValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ContentValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(ContentValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ContentValue::Number(ContentNumber::I64(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ContentValue::Number(ContentNumber::U64(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(ContentValue::Number(ContentNumber::F64(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ContentValue::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ContentValue::String(v))
            }

            fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<ContentValue>()? {
                    values.push(value);
                }
                Ok(ContentValue::Array(values))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut values = IndexMap::new();
                while let Some((key, value)) = map.next_entry::<String, ContentValue>()? {
                    values.insert(key, value);
                }
                Ok(ContentValue::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl ContentValue {
    fn unexpected(&self) -> de::Unexpected<'_> {
        match self {
            ContentValue::Null => de::Unexpected::Unit,
            ContentValue::Bool(b) => de::Unexpected::Bool(*b),
            ContentValue::Number(ContentNumber::I64(n)) => de::Unexpected::Signed(*n),
            ContentValue::Number(ContentNumber::U64(n)) => de::Unexpected::Unsigned(*n),
            ContentValue::Number(ContentNumber::F64(n)) => de::Unexpected::Float(*n),
            ContentValue::String(s) => de::Unexpected::Str(s),
            ContentValue::Array(_) => de::Unexpected::Seq,
            ContentValue::Object(_) => de::Unexpected::Map,
        }
    }
}

/// Reads typed structs straight out of a tree, without going through text.
impl<'de> Deserializer<'de> for &'de ContentValue {
    type Error = de::value::Error;

    fn deserialize_any<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            ContentValue::Null => visitor.visit_unit(),
            ContentValue::Bool(b) => visitor.visit_bool(*b),
            ContentValue::Number(ContentNumber::I64(n)) => visitor.visit_i64(*n),
            ContentValue::Number(ContentNumber::U64(n)) => visitor.visit_u64(*n),
            ContentValue::Number(ContentNumber::F64(n)) => visitor.visit_f64(*n),
            ContentValue::String(s) => visitor.visit_borrowed_str(s),
            ContentValue::Array(values) => {
                let mut seq =
                    de::value::SeqDeserializer::<_, de::value::Error>::new(values.iter());
                let out = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(out)
            }
            ContentValue::Object(map) => {
                let mut entries = de::value::MapDeserializer::<_, de::value::Error>::new(
                    map.iter().map(|(k, v)| (k.as_str(), v)),
                );
                let out = visitor.visit_map(&mut entries)?;
                entries.end()?;
                Ok(out)
            }
        }
    }

    fn deserialize_option<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            ContentValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_enum<V: de::Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            ContentValue::String(s) => {
                let variant: de::value::BorrowedStrDeserializer<'de, Self::Error> =
                    de::value::BorrowedStrDeserializer::new(s);
                visitor.visit_enum(variant)
            }
            other => Err(de::Error::invalid_type(other.unexpected(), &"a variant name")),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple tuple_struct
        map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, de::value::Error> for &'de ContentValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}
