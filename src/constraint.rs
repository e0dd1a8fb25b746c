//! Constraints on version numbers.

use crate::{Error, Reason, Version};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::multispace0;
use nom::combinator::{opt, value};
use nom::error::ErrorKind;
use nom::{IResult, Parser};
use num_traits::Zero;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// [`Version`] comparison operators used in a [`Constraint`]: `=`, `!=`, `>`,
/// `>=`, `<`, `<=`, `~>`, `~`, `^`.
///
/// The plain comparisons follow the ordering of [`Version`] exactly. The three
/// range operators accept anything at or above their version, so long as a
/// number of leading segments stay *pinned* to those of the version.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Op {
    /// A matching `Version` exactly equals the constraint. This is the
    /// operator assumed when none is written.
    Exact,
    /// A matching `Version` is anything but the constraint.
    NotEqual,
    /// A matching `Version` must be strictly greater than the constraint.
    Greater,
    /// A matching `Version` must be greater than or equal to the constraint.
    GreaterEq,
    /// A matching `Version` must be strictly less than the constraint.
    Less,
    /// A matching `Version` must be less than or equal to the constraint.
    LessEq,
    /// The "pessimistic" operator. All but the last written segment are
    /// pinned, so `~> 1.0.7` means `>= 1.0.7, < 1.1` and `~> 1.0` means
    /// `>= 1.0, < 2`. A single segment is pinned by itself.
    Pessimistic,
    /// Like [`Op::Pessimistic`], except that a two-segment version pins both
    /// segments: `~1.1` means `>= 1.1, < 1.2` and `~1` means `>= 1, < 2`.
    Tilde,
    /// Everything up to and including the first non-zero segment is pinned,
    /// so `^1.1` means `>= 1.1, < 2` and `^0.2.3` means `>= 0.2.3, < 0.3`.
    /// If every written segment is zero, they are all pinned.
    Caret,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Exact => write!(f, "="),
            Op::NotEqual => write!(f, "!="),
            Op::Greater => write!(f, ">"),
            Op::GreaterEq => write!(f, ">="),
            Op::Less => write!(f, "<"),
            Op::LessEq => write!(f, "<="),
            Op::Pessimistic => write!(f, "~>"),
            Op::Tilde => write!(f, "~"),
            Op::Caret => write!(f, "^"),
        }
    }
}

impl Op {
    fn parse(i: &str) -> IResult<&str, Op> {
        // Two-character operators must be tried first.
        alt((
            value(Op::NotEqual, tag("!=")),
            value(Op::GreaterEq, tag(">=")),
            value(Op::LessEq, tag("<=")),
            value(Op::Pessimistic, tag("~>")),
            value(Op::Exact, tag("=")),
            value(Op::Greater, tag(">")),
            value(Op::Less, tag("<")),
            value(Op::Tilde, tag("~")),
            value(Op::Caret, tag("^")),
        ))
        .parse(i)
    }

    /// Does `candidate` satisfy this operator against `operand`?
    fn evaluate(self, operand: &Version, candidate: &Version) -> bool {
        match self {
            Op::Exact => candidate == operand,
            Op::NotEqual => candidate != operand,
            Op::Greater => candidate > operand,
            Op::GreaterEq => candidate >= operand,
            Op::Less => candidate < operand,
            Op::LessEq => candidate <= operand,
            Op::Pessimistic => {
                admits_prerelease(operand, candidate)
                    && candidate >= operand
                    && candidate.same_prefix(operand, self.pinned(operand))
            }
            Op::Tilde | Op::Caret => {
                candidate >= operand && candidate.same_prefix(operand, self.pinned(operand))
            }
        }
    }

    /// How many leading segments of `operand` a range operator holds fixed.
    fn pinned(self, operand: &Version) -> usize {
        let written = operand.segments().len();

        match self {
            Op::Pessimistic => written.saturating_sub(1).max(1),
            Op::Tilde if written <= 2 => written,
            Op::Tilde => written - 1,
            Op::Caret => operand
                .segments()
                .iter()
                .position(|s| !s.is_zero())
                .map_or(written, |n| n + 1),
            _ => written,
        }
    }
}

/// A pessimistic range whose version carries a prerelease only reaches
/// prereleases of that very same release: `~> 2.1.0-a` accepts `2.1.0-beta`,
/// but neither `2.1.0` nor `2.2.0-alpha`. Without a prerelease, the range is as
/// permissive as its lower `>=` bound. Tilde and caret ranges don't restrict
/// prereleases at all.
fn admits_prerelease(operand: &Version, candidate: &Version) -> bool {
    match (operand.is_prerelease(), candidate.is_prerelease()) {
        (true, true) => candidate.cmp_segments(operand).is_eq(),
        (true, false) => false,
        (false, _) => true,
    }
}

/// A single version constraint, like `>= 1.2` or `~> 1.0.7`.
///
/// See also [`Op`] for all possibilities, and [`crate::Constraints`] for
/// combining several of them.
///
/// ```
/// use version_constraints::{Constraint, Version};
/// use std::str::FromStr;
///
/// let pess = Constraint::from_str("~> 1.0.7").unwrap();
/// assert!(pess.check(&Version::new("1.0.7").unwrap()));
/// assert!(pess.check(&Version::new("1.0.7.5").unwrap()));
/// assert!(!pess.check(&Version::new("1.1.0").unwrap()));
///
/// // A bare version demands equality.
/// let bare = Constraint::from_str("1.0").unwrap();
/// assert!(bare.check(&Version::new("1.0.0").unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct Constraint {
    op: Op,
    version: Version,
    original: String,
}

impl Constraint {
    /// Parse a new `Constraint` from a string.
    pub fn new<S>(s: S) -> Option<Self>
    where
        S: AsRef<str>,
    {
        Constraint::from_str(s.as_ref()).ok()
    }

    /// Build a `Constraint` directly, without going through text.
    ///
    /// ```
    /// use version_constraints::{Constraint, Op, Version};
    ///
    /// let c = Constraint::from_parts(Op::Caret, Version::new("1.2").unwrap());
    /// assert_eq!("^1.2", c.to_string());
    /// ```
    pub fn from_parts(op: Op, version: Version) -> Constraint {
        let original = format!("{}{}", op, version.original());

        Constraint {
            op,
            version,
            original,
        }
    }

    /// The operator of this `Constraint`.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The version this `Constraint` compares against.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Does the version of this `Constraint` carry a prerelease?
    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// Check if a version satisfies this constraint.
    pub fn check(&self, other: &Version) -> bool {
        self.op.evaluate(&self.version, other)
    }

    /// The raw `nom` parser for [`Constraint`]. Feel free to use this in
    /// combination with other general `nom` parsers.
    ///
    /// Surrounding whitespace is consumed, and a missing operator means
    /// [`Op::Exact`].
    pub fn parse(i: &str) -> IResult<&str, Constraint> {
        let (i, _) = multispace0(i)?;
        let start = i;
        let (i, op) = opt(Op::parse).parse(i)?;
        let (i, _) = multispace0(i)?;
        let (i, version) = Version::parse(i)?;
        let original = start[..start.len() - i.len()].to_string();
        let (i, _) = multispace0(i)?;

        let c = Constraint {
            op: op.unwrap_or(Op::Exact),
            version,
            original,
        };

        Ok((i, c))
    }

    /// Explain why `s` didn't parse as a `Constraint`.
    fn diagnose(s: &str, e: Option<nom::Err<nom::error::Error<&str>>>) -> Error {
        let rest = s.trim_start();
        let rest = match Op::parse(rest) {
            Ok((rest, _)) => rest.trim_start(),
            Err(_) => rest,
        };

        let reason = match e {
            Some(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Reason::SegmentTooLarge,
            _ if s.trim().is_empty() => Reason::Empty,
            _ if rest.starts_with(|c: char| c.is_ascii_punctuation()) => Reason::UnknownOperator,
            _ => Reason::MalformedConstraint,
        };

        Error::invalid(reason, s)
    }
}

/// Two Constraints are equal if their operators and versions are, regardless
/// of how they were written.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.version == other.version
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        self.version.hash(state);
    }
}

impl FromStr for Constraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Constraint::parse(s) {
            Ok(("", c)) => Ok(c),
            Ok(_) => Err(Constraint::diagnose(s, None)),
            Err(e) => Err(Constraint::diagnose(s, Some(e))),
        }
    }
}

impl TryFrom<&str> for Constraint {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Constraint::from_str(value)
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.original)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.original)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        s.parse().map_err(D::Error::custom)
    }
}
