//! Dot-delimited addressing into a [`ContentValue`] tree.
//!
//! The walker knows nothing about the portfolio shape: `hero.name`,
//! `portfolio.items.2.title` and `zh.footer.qrcode` are all just segment lists.
//! Reads never fail on absent data; writes always succeed on a well-formed
//! path by creating whatever containers are missing.

use crate::content::Language;
use crate::value::ContentValue;
use std::{borrow::Cow, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path {path:?} has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },
    #[error("path {path:?} names a key inside a sequence at position {position}")]
    NotAContainer { path: String, position: usize },
    #[error("path {path:?} index {index} is too far past the end of a sequence of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

/// How many slots a write may add past the end of a sequence.
pub const MAX_ARRAY_PADDING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        // "01" stays a key so the path prints back as written.
        let canonical = raw == "0" || !raw.starts_with('0');
        if canonical
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = raw.parse::<usize>()
        {
            return PathSegment::Index(index);
        }
        PathSegment::Key(raw.to_string())
    }

    /// The segment as an object key (indices become their decimal form).
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(k) => Cow::Borrowed(k),
            PathSegment::Index(i) => Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentPath {
    segments: Vec<PathSegment>,
}

impl ContentPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolve a language-relative path against that language's root.
    pub fn under(&self, lang: Language) -> ContentPath {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(PathSegment::Key(lang.code().to_string()));
        segments.extend(self.segments.iter().cloned());
        ContentPath { segments }
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        for (position, raw) in s.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathError::EmptySegment {
                    path: s.to_string(),
                    position,
                });
            }
            segments.push(PathSegment::parse(raw));
        }
        Ok(ContentPath { segments })
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Walk `path` from `tree`. Anything absent along the way resolves to `None`.
pub fn read<'a>(tree: &'a ContentValue, path: &ContentPath) -> Option<&'a ContentValue> {
    path.segments
        .iter()
        .try_fold(tree, |node, segment| match (node, segment) {
            (ContentValue::Array(items), PathSegment::Index(i)) => items.get(*i),
            (ContentValue::Object(map), segment) => map.get(segment.as_key().as_ref()),
            _ => None,
        })
}

/// Return a new tree equal to `tree` except that the leaf at `path` is `value`.
/// On error `tree` is untouched and no new tree is built.
pub fn write(
    tree: &ContentValue,
    path: &ContentPath,
    value: ContentValue,
) -> Result<ContentValue, PathError> {
    let mut next = tree.clone();
    write_in_place(&mut next, path, value)?;
    Ok(next)
}

/// Set the leaf at `path` inside `tree`, creating containers as needed.
///
/// Missing intermediates become empty objects. A scalar sitting where a
/// container is required is replaced by an empty object. Indices past the
/// end of an array pad it with nulls, up to [`MAX_ARRAY_PADDING`] slots.
/// A key addressed into an array is rejected so its elements survive.
///
/// Every check runs before the first mutation, so an error leaves `tree`
/// exactly as it was.
pub(crate) fn write_in_place(
    tree: &mut ContentValue,
    path: &ContentPath,
    value: ContentValue,
) -> Result<(), PathError> {
    check_writable(tree, path)?;
    let mut current = tree;
    for segment in &path.segments {
        current = match (current, segment) {
            (ContentValue::Array(items), PathSegment::Index(i)) => {
                if items.len() <= *i {
                    items.resize(*i + 1, ContentValue::Null);
                }
                &mut items[*i]
            }
            (node, segment) => object_slot(node, segment),
        };
    }
    *current = value;
    Ok(())
}

fn check_writable(tree: &ContentValue, path: &ContentPath) -> Result<(), PathError> {
    let mut current = Some(tree);
    for (position, segment) in path.segments.iter().enumerate() {
        current = match (current, segment) {
            (Some(ContentValue::Array(items)), PathSegment::Index(i)) => {
                let gap = i.saturating_sub(items.len());
                if gap > MAX_ARRAY_PADDING {
                    return Err(PathError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *i,
                        len: items.len(),
                    });
                }
                items.get(*i)
            }
            (Some(ContentValue::Array(_)), PathSegment::Key(_)) => {
                return Err(PathError::NotAContainer {
                    path: path.to_string(),
                    position,
                });
            }
            (Some(ContentValue::Object(map)), segment) => map.get(segment.as_key().as_ref()),
            // Scalars and missing nodes become fresh objects below this point.
            _ => None,
        };
    }
    Ok(())
}

fn object_slot<'a>(node: &'a mut ContentValue, segment: &PathSegment) -> &'a mut ContentValue {
    if node.as_object_mut().is_none() {
        *node = ContentValue::empty_object();
    }
    match node {
        ContentValue::Object(map) => map
            .entry(segment.as_key().into_owned())
            .or_insert(ContentValue::Null),
        _ => unreachable!("node was just made an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentPath, MAX_ARRAY_PADDING, PathError, PathSegment, read, write};
    use crate::content::Language;
    use crate::value::ContentValue;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> ContentPath {
        s.parse().unwrap()
    }

    fn tree(text: &str) -> ContentValue {
        ContentValue::parse(text).unwrap()
    }

    #[test]
    fn numeric_segments_parse_as_indices() {
        let p = path("portfolio.items.12.title");
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("portfolio".into()),
                PathSegment::Key("items".into()),
                PathSegment::Index(12),
                PathSegment::Key("title".into()),
            ]
        );
        assert_eq!(p.to_string(), "portfolio.items.12.title");
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert_eq!("".parse::<ContentPath>(), Err(PathError::Empty));
        assert_eq!(
            "hero..name".parse::<ContentPath>(),
            Err(PathError::EmptySegment {
                path: "hero..name".into(),
                position: 1
            })
        );
    }

    #[test]
    fn under_prefixes_the_language_root() {
        assert_eq!(path("hero.name").under(Language::En).to_string(), "en.hero.name");
    }

    #[test]
    fn read_resolves_objects_and_arrays() {
        let t = tree(r#"{"items":[{"title":"a"},{"title":"b"}]}"#);
        assert_eq!(read(&t, &path("items.1.title")), Some(&ContentValue::from("b")));
    }

    #[test]
    fn read_past_sequence_end_is_none() {
        let t = tree(r#"{"portfolio":{"items":[{"title":"a"},{"title":"b"}]}}"#);
        assert_eq!(read(&t, &path("portfolio.items.2.title")), None);
    }

    #[test]
    fn read_through_scalar_is_none() {
        let t = tree(r#"{"hero":{"name":"A"}}"#);
        assert_eq!(read(&t, &path("hero.name.first")), None);
        assert_eq!(read(&t, &path("footer.message")), None);
    }

    #[test]
    fn numeric_segment_on_object_reads_decimal_key() {
        let t = tree(r#"{"map":{"0":"zero"}}"#);
        assert_eq!(read(&t, &path("map.0")), Some(&ContentValue::from("zero")));
    }

    #[test]
    fn write_leaves_input_untouched() {
        let t = tree(r#"{"zh":{"hero":{"name":"A"}},"en":{"hero":{"name":"B"}}}"#);
        let before = t.clone();
        let next = write(&t, &path("zh.hero.name"), "C".into()).unwrap();
        assert_eq!(t, before);
        assert_eq!(
            next,
            tree(r#"{"zh":{"hero":{"name":"C"}},"en":{"hero":{"name":"B"}}}"#)
        );
    }

    #[test]
    fn write_creates_missing_intermediate_objects() {
        let t = tree("{}");
        let next = write(&t, &path("life.items.0.title"), "x".into()).unwrap();
        // Missing intermediates are mappings, even for numeric segments.
        assert_eq!(next, tree(r#"{"life":{"items":{"0":{"title":"x"}}}}"#));
        assert_eq!(
            read(&next, &path("life.items.0.title")),
            Some(&ContentValue::from("x"))
        );
    }

    #[test]
    fn write_past_array_end_pads_with_null() {
        let t = tree(r#"{"tags":["a"]}"#);
        let next = write(&t, &path("tags.2"), "c".into()).unwrap();
        assert_eq!(next, tree(r#"{"tags":["a",null,"c"]}"#));
    }

    #[test]
    fn write_through_scalar_replaces_it_with_object() {
        let t = tree(r#"{"hero":"flat"}"#);
        let next = write(&t, &path("hero.name"), "A".into()).unwrap();
        assert_eq!(next, tree(r#"{"hero":{"name":"A"}}"#));
    }

    #[test]
    fn write_then_read_returns_value() {
        let t = tree(r#"{"a":[{"b":1}]}"#);
        for p in ["a.0.b", "a.0.c", "a.3", "x.y.z", "a"] {
            let next = write(&t, &path(p), "v".into()).unwrap();
            assert_eq!(read(&next, &path(p)), Some(&ContentValue::from("v")), "{p}");
        }
    }

    #[test]
    fn leading_zero_segments_stay_keys() {
        let p = path("map.01.0");
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("map".into()),
                PathSegment::Key("01".into()),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(p.to_string(), "map.01.0");
    }

    #[test]
    fn key_into_array_is_rejected_and_keeps_elements() {
        let t = tree(r#"{"items":[{"title":"a"},{"title":"b"}]}"#);
        assert_eq!(
            write(&t, &path("items.extra"), "x".into()),
            Err(PathError::NotAContainer {
                path: "items.extra".into(),
                position: 1
            })
        );
        assert_eq!(read(&t, &path("items.1.title")), Some(&ContentValue::from("b")));
    }

    #[test]
    fn huge_indices_are_rejected_without_allocating() {
        let t = tree(r#"{"tags":["a"]}"#);
        let max = format!("tags.{}", usize::MAX);
        assert!(matches!(
            write(&t, &path(&max), "x".into()),
            Err(PathError::IndexOutOfRange { len: 1, .. })
        ));
        assert!(matches!(
            write(&t, &path("tags.1000000000000"), "x".into()),
            Err(PathError::IndexOutOfRange { index: 1_000_000_000_000, .. })
        ));
    }

    #[test]
    fn padding_stops_at_the_limit() {
        let t = tree(r#"{"tags":["a"]}"#);
        let last_ok = 1 + MAX_ARRAY_PADDING;
        let next = write(&t, &path(&format!("tags.{last_ok}")), "z".into()).unwrap();
        let len = next.get("tags").and_then(|v| v.as_array()).map(<[_]>::len);
        assert_eq!(len, Some(last_ok + 1));
        assert!(write(&t, &path(&format!("tags.{}", last_ok + 1)), "z".into()).is_err());
    }
}
