//! Types and logic for handling multi-segment [`Version`]s.

use crate::{Error, MAX_SEGMENT_BITS, Reason, Release};
use itertools::EitherOrBoth::{Both, Left, Right};
use itertools::Itertools;
use nom::character::complete::char;
use nom::combinator::opt;
use nom::error::ErrorKind;
use nom::multi::separated_list1;
use nom::{IResult, Parser};
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::Ordering;
use std::cmp::Ordering::{Equal, Greater, Less};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// A version number made of any number of numeric segments, with an optional
/// prerelease and optional build metadata.
///
/// Legal versions are of the form: `[v]N(.N)*[-PREREL][+META]`
///
/// - Simple Sample: `1.2`
/// - Full Sample: `v1.2.3.4-alpha.2+a1b2c3.1`
///
/// A leading `=` is not part of a `Version`. Inside a [`crate::Constraint`] it
/// is read as the [`crate::Op::Exact`] operator instead.
///
/// # Rules
///
/// 1. Segments are unbounded non-negative integers (up to
///    [`MAX_SEGMENT_BITS`] wide). Missing trailing segments count as zero.
/// 2. Pre-release versions have *lower* precedence than normal versions.
/// 3. Build metadata does not affect version precedence.
///
/// # Examples
///
/// ```
/// use version_constraints::Version;
///
/// let orig = "1.2-r1+git";
/// let v = Version::new(orig).unwrap();
///
/// assert_eq!(orig, v.original());
/// assert_eq!("1.2.0-r1+git", v.to_string());
/// assert_eq!(v, Version::new("1.2.0.0-r1").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<BigUint>,
    pre_rel: Option<Release>,
    meta: Option<String>,
    original: String,
}

impl Version {
    /// Parse a `Version` from some input.
    pub fn new<S>(s: S) -> Option<Version>
    where
        S: AsRef<str>,
    {
        match Version::parse(s.as_ref()) {
            Ok(("", v)) => Some(v),
            _ => None,
        }
    }

    /// The numeric segments, exactly as many as were written.
    ///
    /// ```
    /// use version_constraints::Version;
    ///
    /// let v = Version::new("1.2").unwrap();
    /// assert_eq!(2, v.segments().len());
    /// ```
    pub fn segments(&self) -> &[BigUint] {
        &self.segments
    }

    /// The prerelease section, if any, without its leading `-`.
    pub fn prerelease(&self) -> Option<&Release> {
        self.pre_rel.as_ref()
    }

    /// The build metadata, if any, without its leading `+`.
    pub fn metadata(&self) -> Option<&str> {
        self.meta.as_deref()
    }

    /// The exact text this `Version` was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Does this `Version` carry a prerelease?
    pub fn is_prerelease(&self) -> bool {
        self.pre_rel.is_some()
    }

    /// The numeric part of this `Version` alone, padded to at least three
    /// segments.
    ///
    /// ```
    /// use version_constraints::Version;
    ///
    /// let v = Version::new("1.2-beta+git").unwrap();
    /// assert_eq!("1.2.0", v.core().original());
    /// ```
    pub fn core(&self) -> Version {
        let segments = self.padded().cloned().collect::<Vec<_>>();
        let original = segments.iter().join(".");

        Version {
            segments,
            pre_rel: None,
            meta: None,
            original,
        }
    }

    /// Segments zero-padded to the conventional three.
    fn padded(&self) -> impl Iterator<Item = &BigUint> {
        static ZERO: BigUint = BigUint::ZERO;
        let missing = 3usize.saturating_sub(self.segments.len());

        self.segments
            .iter()
            .chain(std::iter::repeat_n(&ZERO, missing))
    }

    /// Are the first `n` segments of both versions equal, counting missing
    /// segments as zero?
    pub(crate) fn same_prefix(&self, other: &Version, n: usize) -> bool {
        self.segments
            .iter()
            .zip_longest(&other.segments)
            .take(n)
            .all(|eob| match eob {
                Both(a, b) => a == b,
                Left(x) | Right(x) => x.is_zero(),
            })
    }

    /// Compare only the numeric segments, padding the shorter side with zeroes.
    pub(crate) fn cmp_segments(&self, other: &Version) -> Ordering {
        self.segments
            .iter()
            .zip_longest(&other.segments)
            .find_map(|eob| match eob {
                Both(a, b) => match a.cmp(b) {
                    Equal => None,
                    ord => Some(ord),
                },
                Left(a) if !a.is_zero() => Some(Greater),
                Right(b) if !b.is_zero() => Some(Less),
                // 1.2.0 == 1.2
                Left(_) | Right(_) => None,
            })
            .unwrap_or(Equal)
    }

    /// The raw `nom` parser for [`Version`]. Feel free to use this in
    /// combination with other general `nom` parsers.
    ///
    /// A segment wider than [`MAX_SEGMENT_BITS`] is a hard failure, reported
    /// with [`ErrorKind::TooLarge`].
    pub fn parse(i: &str) -> IResult<&str, Version> {
        let start = i;
        let (i, _) = opt(char('v')).parse(i)?;
        let (i, segments) = separated_list1(char('.'), crate::parsers::unsigned).parse(i)?;

        if segments.iter().any(|s| s.bits() > MAX_SEGMENT_BITS) {
            let e = nom::error::Error::new(start, ErrorKind::TooLarge);
            return Err(nom::Err::Failure(e));
        }

        let (i, pre_rel) = opt(Release::parse).parse(i)?;
        let (i, meta) = opt(crate::parsers::meta).parse(i)?;
        let original = start[..start.len() - i.len()].to_string();

        let v = Version {
            segments,
            pre_rel,
            meta,
            original,
        };

        Ok((i, v))
    }

    #[cfg(feature = "serde")]
    /// Function suitable for use as a serde deserializer for a `Version` that
    /// may be absent, since an empty string is not a legal `Version`.
    ///
    /// ```rust
    /// use version_constraints::Version;
    /// use serde::Deserialize;
    /// use serde_json::from_str;
    ///
    /// #[derive(Deserialize)]
    /// struct Foo {
    ///    #[serde(deserialize_with = "Version::deserialize_optional")]
    ///    version: Option<Version>,
    /// }
    ///
    /// let foo: Foo = from_str(r#"{"version": ""}"#).unwrap();
    /// assert!(foo.version.is_none());
    /// let foo: Foo = from_str(r#"{"version": "1.2"}"#).unwrap();
    /// assert!(foo.version.is_some());
    /// ```
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Version>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        match s.as_str() {
            "" => Ok(None),
            _ => s.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

/// For Rust, it is a Law that the following must hold:
///
/// > k1 == k2 -> hash(k1) == hash(k2)
///
/// And so this is hand-implemented, since `PartialEq` also is. Trailing zero
/// segments are skipped, since `1.2` and `1.2.0` are equal.
impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let significant = self
            .segments
            .iter()
            .rposition(|s| !s.is_zero())
            .map_or(0, |n| n + 1);

        self.segments[..significant].hash(state);
        self.pre_rel.hash(state);
    }
}

/// Two Versions are equal if their padded segments and prereleases are equal.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build metadata does not affect version precendence, and pre-release versions
/// have *lower* precedence than normal versions.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.cmp_segments(other) {
            Equal => match (&self.pre_rel, &other.pre_rel) {
                (None, None) => Equal,
                (None, _) => Greater,
                (_, None) => Less,
                (Some(ap), Some(bp)) => ap.cmp(bp),
            },
            ord => ord,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.padded().join("."))?;

        if let Some(p) = &self.pre_rel {
            write!(f, "-{}", p)?;
        }

        if let Some(m) = &self.meta {
            write!(f, "+{}", m)?;
        }

        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Version::parse(s) {
            Ok(("", v)) => Ok(v),
            Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => {
                Err(Error::invalid(Reason::SegmentTooLarge, s))
            }
            _ => Err(Error::invalid(Reason::MalformedVersion, s)),
        }
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    /// ```
    /// use version_constraints::Version;
    ///
    /// let orig = "1.2.3.4";
    /// let prsd: Version = orig.try_into().unwrap();
    /// assert_eq!(orig, prsd.to_string());
    /// ```
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Version::from_str(value)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.original)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        s.parse().map_err(D::Error::custom)
    }
}
