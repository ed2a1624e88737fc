//! # Value Domain
//!
//! `Value` is one scalar setting (bool, integer, string) or one of two
//! markers: `Any`, which matches every value, and `None`, which matches
//! nothing. `Values` is an immutable set of values: finite, universal, or
//! co-finite (every value except a finite few).
//!
//! ## Algebra
//!
//! | operation | universal operand | empty operand |
//! |-----------|-------------------|---------------|
//! | `union` | universal | other operand |
//! | `intersect` | other operand | empty |
//! | `difference` (`x - y`) | `U - {a} = U except {a}`, `x - U = {}` | `x - {} = x` |
//!
//! The three forms are closed under all three operations. A co-finite set
//! with nothing excepted is the universal set, so equal sets compare equal.
//!
//! A set built from an iterator containing `Any` collapses to the universal
//! set; `None` is never stored.
//!
//! ## Wire form
//!
//! Scalars serialize natively. Markers serialize as `{"marker":"any"}` and
//! `{"marker":"none"}`; the universal set serializes as a one-element list
//! holding the `Any` marker, and a co-finite set as
//! `[{"marker":"any","except":[..]}]`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// String scalar.
    Str(String),
    /// Matches every value.
    Any,
    /// Matches nothing.
    None,
}

impl Value {
    /// True for `Bool`, `Int` and `Str`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Any | Value::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
            Value::Any => f.write_str("Any"),
            Value::None => f.write_str("None"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MarkerKind {
    Any,
    None,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Marker {
    marker: MarkerKind,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Bool(bool),
    Int(i64),
    Str(String),
    Marker(Marker),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Value::Bool(b) => ValueRepr::Bool(*b),
            Value::Int(i) => ValueRepr::Int(*i),
            Value::Str(s) => ValueRepr::Str(s.clone()),
            Value::Any => ValueRepr::Marker(Marker { marker: MarkerKind::Any }),
            Value::None => ValueRepr::Marker(Marker { marker: MarkerKind::None }),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ValueRepr::deserialize(deserializer)? {
            ValueRepr::Bool(b) => Value::Bool(b),
            ValueRepr::Int(i) => Value::Int(i),
            ValueRepr::Str(s) => Value::Str(s),
            ValueRepr::Marker(Marker { marker: MarkerKind::Any }) => Value::Any,
            ValueRepr::Marker(Marker { marker: MarkerKind::None }) => Value::None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Set {
    All,
    /// Every value except these; never empty.
    AllExcept(BTreeSet<Value>),
    Only(BTreeSet<Value>),
}

/// Co-finite set, normalised to the universal set when nothing is excepted.
fn all_except(excepted: BTreeSet<Value>) -> Values {
    if excepted.is_empty() {
        ALL_VALUES
    } else {
        Values(Set::AllExcept(excepted))
    }
}

fn only(members: BTreeSet<Value>) -> Values {
    Values(Set::Only(members))
}

/// An immutable set of [`Value`]s, possibly universal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Values(Set);

/// The universal set: every value is a member.
pub const ALL_VALUES: Values = Values(Set::All);

/// The empty set: no value is a member.
pub const NO_VALUES: Values = Values(Set::Only(BTreeSet::new()));

impl Values {
    /// The universal set.
    pub fn all() -> Self {
        ALL_VALUES
    }

    /// The empty set.
    pub fn none() -> Self {
        NO_VALUES
    }

    /// Build a set from anything convertible into values.
    pub fn of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values.into_iter().map(Into::into).collect()
    }

    /// True for the universal set.
    pub fn is_all(&self) -> bool {
        matches!(self.0, Set::All)
    }

    /// True for the empty set.
    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Set::Only(s) if s.is_empty())
    }

    /// True for a set that holds every value but a finite few.
    pub fn is_cofinite(&self) -> bool {
        matches!(self.0, Set::AllExcept(_))
    }

    /// Number of explicit members; `None` for universal and co-finite sets.
    pub fn len(&self) -> Option<usize> {
        match &self.0 {
            Set::All | Set::AllExcept(_) => None,
            Set::Only(s) => Some(s.len()),
        }
    }

    /// Iterate over explicit members in order. Universal and co-finite sets
    /// yield nothing.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        let members = match &self.0 {
            Set::All | Set::AllExcept(_) => None,
            Set::Only(s) => Some(s.iter()),
        };
        members.into_iter().flatten()
    }

    /// Membership test. `None` is never a member; `Any` only of the universal set.
    pub fn contains(&self, value: &Value) -> bool {
        match (&self.0, value) {
            (_, Value::None) => false,
            (Set::All, _) => true,
            (_, Value::Any) => false,
            (Set::AllExcept(e), v) => !e.contains(v),
            (Set::Only(s), v) => s.contains(v),
        }
    }

    /// Values in either set.
    pub fn union(&self, other: &Values) -> Values {
        match (&self.0, &other.0) {
            (Set::All, _) | (_, Set::All) => ALL_VALUES,
            (Set::AllExcept(a), Set::AllExcept(b)) => {
                all_except(a.intersection(b).cloned().collect())
            }
            (Set::AllExcept(e), Set::Only(s)) | (Set::Only(s), Set::AllExcept(e)) => {
                all_except(e.difference(s).cloned().collect())
            }
            (Set::Only(a), Set::Only(b)) => only(a.union(b).cloned().collect()),
        }
    }

    /// Values in both sets.
    pub fn intersect(&self, other: &Values) -> Values {
        match (&self.0, &other.0) {
            (Set::All, _) => other.clone(),
            (_, Set::All) => self.clone(),
            (Set::AllExcept(a), Set::AllExcept(b)) => all_except(a.union(b).cloned().collect()),
            (Set::AllExcept(e), Set::Only(s)) | (Set::Only(s), Set::AllExcept(e)) => {
                only(s.difference(e).cloned().collect())
            }
            (Set::Only(a), Set::Only(b)) => only(a.intersection(b).cloned().collect()),
        }
    }

    /// Values in `self` that are not in `other`.
    pub fn difference(&self, other: &Values) -> Values {
        match (&self.0, &other.0) {
            (_, Set::All) => NO_VALUES,
            (Set::All, Set::AllExcept(e)) => only(e.clone()),
            (Set::All, Set::Only(s)) => all_except(s.clone()),
            (Set::AllExcept(a), Set::AllExcept(b)) => only(b.difference(a).cloned().collect()),
            (Set::AllExcept(e), Set::Only(s)) => all_except(e.union(s).cloned().collect()),
            (Set::Only(s), Set::AllExcept(e)) => only(s.intersection(e).cloned().collect()),
            (Set::Only(a), Set::Only(b)) => only(a.difference(b).cloned().collect()),
        }
    }

    /// True if no value is a member of both sets.
    pub fn is_disjoint(&self, other: &Values) -> bool {
        self.intersect(other).is_empty()
    }
}

impl Default for Values {
    fn default() -> Self {
        NO_VALUES
    }
}

impl FromIterator<Value> for Values {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = BTreeSet::new();
        for value in iter {
            match value {
                Value::Any => return ALL_VALUES,
                Value::None => {}
                scalar => {
                    set.insert(scalar);
                }
            }
        }
        only(set)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &BTreeSet<Value>) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Set::All => f.write_str("Any"),
            Set::AllExcept(e) => {
                f.write_str("Any except ")?;
                write_list(f, e)
            }
            Set::Only(s) => write_list(f, s),
        }
    }
}

/// `{"marker":"any","except":[..]}`, the co-finite element of a list.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnyExcept {
    marker: MarkerKind,
    except: BTreeSet<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValuesItem {
    AnyExcept(AnyExcept),
    Value(Value),
}

impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Set::All => [Value::Any].serialize(serializer),
            Set::AllExcept(e) => [AnyExcept {
                marker: MarkerKind::Any,
                except: e.clone(),
            }]
            .serialize(serializer),
            Set::Only(s) => serializer.collect_seq(s),
        }
    }
}

impl<'de> Deserialize<'de> for Values {
    /// The list is read as the union of its elements.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<ValuesItem>::deserialize(deserializer)?;
        let mut scalars = Vec::new();
        let mut cofinite = Vec::new();
        for item in items {
            match item {
                ValuesItem::AnyExcept(AnyExcept {
                    marker: MarkerKind::Any,
                    except,
                }) => cofinite.push(all_except(
                    except.into_iter().filter(Value::is_scalar).collect(),
                )),
                ValuesItem::AnyExcept(AnyExcept {
                    marker: MarkerKind::None,
                    ..
                }) => {
                    return Err(serde::de::Error::custom(
                        "\"except\" only applies to the \"any\" marker",
                    ))
                }
                ValuesItem::Value(value) => scalars.push(value),
            }
        }
        let listed: Values = scalars.into_iter().collect();
        Ok(cofinite.iter().fold(listed, |acc, set| acc.union(set)))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            (-5i64..5).prop_map(Value::Int),
            "[a-d]".prop_map(Value::Str),
        ]
    }

    fn finite() -> impl Strategy<Value = Values> {
        prop::collection::vec(scalar(), 0..6).prop_map(|v| v.into_iter().collect())
    }

    fn values() -> impl Strategy<Value = Values> {
        prop_oneof![
            1 => Just(ALL_VALUES),
            2 => finite().prop_map(|x| ALL_VALUES.difference(&x)),
            6 => finite(),
        ]
    }

    proptest! {
        #[test]
        fn universal_and_empty_laws(x in values()) {
            prop_assert_eq!(x.union(&ALL_VALUES), ALL_VALUES);
            prop_assert_eq!(x.intersect(&ALL_VALUES), x.clone());
            prop_assert_eq!(x.union(&NO_VALUES), x.clone());
            prop_assert_eq!(x.intersect(&NO_VALUES), NO_VALUES);
        }

        #[test]
        fn union_and_intersect_commute(x in values(), y in values()) {
            prop_assert_eq!(x.union(&y), y.union(&x));
            prop_assert_eq!(x.intersect(&y), y.intersect(&x));
        }

        #[test]
        fn union_and_intersect_associate(x in values(), y in values(), z in values()) {
            prop_assert_eq!(x.union(&y).union(&z), x.union(&y.union(&z)));
            prop_assert_eq!(x.intersect(&y).intersect(&z), x.intersect(&y.intersect(&z)));
        }

        #[test]
        fn difference_is_disjoint_from_subtrahend(x in values(), y in values()) {
            prop_assert!(x.difference(&y).is_disjoint(&y));
        }

        #[test]
        fn membership_follows_the_operations(x in values(), y in values(), s in scalar()) {
            prop_assert_eq!(x.union(&y).contains(&s), x.contains(&s) || y.contains(&s));
            prop_assert_eq!(x.intersect(&y).contains(&s), x.contains(&s) && y.contains(&s));
            prop_assert_eq!(x.difference(&y).contains(&s), x.contains(&s) && !y.contains(&s));
        }

        #[test]
        fn serde_roundtrip(x in values()) {
            let json = serde_json::to_string(&x).unwrap();
            let back: Values = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, x);
        }
    }
}
