//! A library for parsing, comparing, and constraining version numbers.
//!
//! Version numbers here are dotted runs of numbers of any length and any
//! precision, optionally followed by a SemVer-style prerelease and build
//! metadata:
//!
//! > 1.2.3.4-rc.1+linux.x86
//!
//! Versions are ordered according to the precedence rules of [Semantic
//! Versioning][semver], extended to any number of segments. Missing segments
//! count as zero, so `1.2` and `1.2.0` are the same version.
//!
//! # Usage
//!
//! ```
//! use version_constraints::Version;
//!
//! let a = Version::new("1.2").unwrap();
//! let b = Version::new("1.2.0-rc.1").unwrap();
//! let c = Version::new("1.2.0+build.5").unwrap();
//!
//! assert!(b < a);
//! assert_eq!(a, c); // Metadata never counts.
//! ```
//!
//! # Version Constraints
//!
//! A [`Constraint`] pairs an operator with a version, like `>= 1.2` or
//! `~> 1.0.7`. Several of them can be joined with `,` (all must hold) and
//! `||` (any group may hold) to form [`Constraints`].
//!
//! ```
//! use version_constraints::{Constraints, Version};
//!
//! let cs = Constraints::new(">= 1.0, < 1.2 || > 1.3").unwrap();
//!
//! assert!(cs.check(&Version::new("1.1.5").unwrap()));
//! assert!(cs.check(&Version::new("1.3.2").unwrap()));
//! assert!(!cs.check(&Version::new("1.2.3").unwrap()));
//! ```
//!
//! See [`Op`] for every operator and its exact meaning.
//!
//! # Usage with `nom`
//!
//! In constructing your own [`nom`](https://lib.rs/nom) parsers, you can
//! integrate the parsers used for the types in this crate via
//! [`Version::parse`] and [`Constraint::parse`].
//!
//! # Features
//!
//! The `serde` feature (on by default) encodes [`Version`], [`Constraint`],
//! and [`Constraints`] as plain strings, so that they can sit inside any
//! structured format as a single string field.
//!
//! [semver]: http://semver.org

#![warn(missing_docs)]

use itertools::EitherOrBoth::{Both, Left, Right};
use itertools::Itertools;
use nom::character::complete::char;
use nom::multi::separated_list1;
use nom::{IResult, Parser};
use num_bigint::BigUint;
use parsers::hyphenated_alphanums;
use std::cmp::Ordering;
use std::cmp::Ordering::{Equal, Greater, Less};

mod constraint;
mod constraints;
mod parsers;
mod version;

pub use constraint::{Constraint, Op};
pub use constraints::Constraints;
pub use version::Version;

/// The largest number of bits a single version segment may occupy.
///
/// Segments are arbitrary-precision, so values past the 64-bit range are
/// fine, but anything wider than this is rejected as malformed.
pub const MAX_SEGMENT_BITS: u64 = 128;

/// Errors unique to the parsing of version numbers and their constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Some string failed to parse into a [`Version`], [`Constraint`], or
    /// [`Constraints`] via functions like [`std::str::FromStr::from_str`] or
    /// [`TryFrom::try_from`].
    #[error("Invalid format ({reason}): {input:?}")]
    InvalidFormat {
        /// Why the input was rejected.
        reason: Reason,
        /// The offending input.
        input: String,
    },
}

impl Error {
    pub(crate) fn invalid(reason: Reason, input: &str) -> Error {
        log::debug!("Rejected {input:?}: {reason}");

        Error::InvalidFormat {
            reason,
            input: input.to_string(),
        }
    }

    /// The reason the input was rejected.
    pub fn reason(&self) -> Reason {
        match self {
            Error::InvalidFormat { reason, .. } => *reason,
        }
    }
}

/// The various ways in which parsing can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The text doesn't follow the version grammar.
    MalformedVersion,
    /// A version segment is wider than [`MAX_SEGMENT_BITS`].
    SegmentTooLarge,
    /// A clause starts with an operator that isn't one of [`Op`].
    UnknownOperator,
    /// There was nothing to parse.
    Empty,
    /// A clause or a full expression is otherwise malformed, like with a
    /// dangling `,` or `||`.
    MalformedConstraint,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::MalformedVersion => write!(f, "malformed version"),
            Reason::SegmentTooLarge => write!(f, "segment too large"),
            Reason::UnknownOperator => write!(f, "unknown operator"),
            Reason::Empty => write!(f, "empty"),
            Reason::MalformedConstraint => write!(f, "malformed constraint"),
        }
    }
}

/// The prerelease section of a [`Version`], a sequence of [`Chunk`]s with
/// comparison behaviour according to SemVer's rules for prereleases.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Release(pub Vec<Chunk>);

impl Release {
    fn parse(i: &str) -> IResult<&str, Release> {
        let (i, _) = char('-').parse(i)?;
        separated_list1(char('.'), Chunk::parse)
            .map(Release)
            .parse(i)
    }
}

impl PartialOrd for Release {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Release {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip_longest(&other.0)
            .find_map(|eob| match eob {
                Both(a, b) => match a.cmp(b) {
                    Equal => None,
                    ord => Some(ord),
                },
                // From the Semver spec: A larger set of pre-release fields has
                // a higher precedence than a smaller set, if all the preceding
                // identifiers are equal.
                Left(_) => Some(Greater),
                Right(_) => Some(Less),
            })
            .unwrap_or(Equal)
    }
}

impl std::fmt::Display for Release {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

/// A single prerelease identifier.
///
/// Either entirely numerical (with no leading zeroes) or alphanumerical (a
/// free mixture of numbers, letters, and hyphens). A run of digits with a
/// leading zero, like `007`, is kept as alphanumerical so that it prints back
/// exactly as it was written.
///
/// # Examples
///
/// - `1`
/// - `20150826`
/// - `rc`
/// - `x-y-z`
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Chunk {
    /// A nice, pure number.
    Numeric(BigUint),
    /// A mixture of letters, numbers, and hyphens.
    Alphanum(String),
}

impl Chunk {
    fn parse(i: &str) -> IResult<&str, Chunk> {
        let (i, ids) = hyphenated_alphanums(i)?;
        let is_number = ids.bytes().all(|b| b.is_ascii_digit())
            && (ids.len() == 1 || !ids.starts_with('0'));

        let chunk = match ids.parse::<BigUint>() {
            Ok(n) if is_number => Chunk::Numeric(n),
            _ => Chunk::Alphanum(ids.to_string()),
        };

        Ok((i, chunk))
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numbers compare numerically, and always sort before words.
impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Numeric(a), Chunk::Numeric(b)) => a.cmp(b),
            (Chunk::Numeric(_), Chunk::Alphanum(_)) => Less,
            (Chunk::Alphanum(_), Chunk::Numeric(_)) => Greater,
            (Chunk::Alphanum(a), Chunk::Alphanum(b)) => a.cmp(b),
        }
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Chunk::Numeric(n) => write!(f, "{}", n),
            Chunk::Alphanum(a) => write!(f, "{}", a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn chanks() {
        assert_eq!(
            Ok(("", Chunk::Numeric(BigUint::from(123u32)))),
            Chunk::parse("123")
        );
        assert_eq!(
            Ok(("", Chunk::Alphanum("123a".to_string()))),
            Chunk::parse("123a")
        );
        assert_eq!(
            Ok(("", Chunk::Alphanum("123-456".to_string()))),
            Chunk::parse("123-456")
        );
        assert_eq!(
            Ok(("", Chunk::Alphanum("007".to_string()))),
            Chunk::parse("007")
        );
        assert_eq!(
            Ok(("", Chunk::Numeric(BigUint::from(0u32)))),
            Chunk::parse("0")
        );
    }

    #[test]
    fn good_versions() {
        let goods = vec![
            "1",
            "1.2",
            "1.2.3",
            "1.2.3.4.5.6",
            "1.2.3-1",
            "1.2.3-alpha",
            "1.2.3-alpha.2",
            "1.2.3+a1b2c3.1",
            "1.2.3-alpha.2+a1b2c3.1",
            "1.0.0-x-y-z.-",
            "1.0.0-alpha+001",
            "1.0.0+21AF26D3---117B344092BD",
            "1.2.2-00a",
            "v1.2.3",
            "01.002.3",
            "18446744073709551616.0.0",
        ];

        for s in goods {
            let v = Version::new(s);
            assert!(v.is_some(), "Should be a Version: {}", s);
            assert_eq!(Some(s), v.as_ref().map(|v| v.original()));
        }
    }

    #[test]
    fn bad_versions() {
        let bads = vec![
            "",
            "a.b.c",
            "1.",
            ".1",
            "1..2",
            "1.2.3-",
            "1.2.3+",
            "1.2.3+a1b!2c3.1",
            "1.2.3 ",
            " 1.2.3",
            "1.x",
            // `=` is an operator, never part of a version.
            "=1.2.3",
            "11387778780781445675529500000000000000000",
        ];

        bads.iter().for_each(|s| assert_eq!(None, Version::new(s), "{}", s));
    }

    #[test]
    fn error_reasons() {
        let too_big = Version::from_str("1.11387778780781445675529500000000000000000").unwrap_err();
        assert_eq!(Reason::SegmentTooLarge, too_big.reason());

        let garbage = Version::from_str("1.2.x").unwrap_err();
        assert_eq!(Reason::MalformedVersion, garbage.reason());
        assert_eq!(
            Error::InvalidFormat {
                reason: Reason::MalformedVersion,
                input: "1.2.x".to_string(),
            },
            garbage
        );

        let op = Constraint::from_str("=> 1.0").unwrap_err();
        assert_eq!(Reason::UnknownOperator, op.reason());

        let empty = Constraints::from_str("  ").unwrap_err();
        assert_eq!(Reason::Empty, empty.reason());

        let dangling = Constraints::from_str(">= 1.0,").unwrap_err();
        assert_eq!(Reason::MalformedConstraint, dangling.reason());

        let dangling = Constraints::from_str(">= 1.0 ||").unwrap_err();
        assert_eq!(Reason::MalformedConstraint, dangling.reason());
    }

    #[test]
    fn error_display() {
        let e = Version::from_str("1.2.x").unwrap_err();
        assert_eq!("Invalid format (malformed version): \"1.2.x\"", e.to_string());
        assert_eq!("segment too large", Reason::SegmentTooLarge.to_string());
        assert_eq!("unknown operator", Reason::UnknownOperator.to_string());
    }

    #[test]
    /// The exact example from http://semver.org
    fn semver_ord() {
        let vs = vec![
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];

        for (a, b) in vs.iter().tuple_windows() {
            cmp_versions(a, b);
        }
    }

    #[test]
    fn version_ord() {
        let vs = vec!["0.9.9.9", "1.0.0.0.1", "1.0.0.1", "1.0.1", "2", "10"];

        for (a, b) in vs.iter().tuple_windows() {
            cmp_versions(a, b);
        }

        cmp_versions("1.2-5", "1.2");
        cmp_versions("1.2.0-rc.1", "1.2");
        cmp_versions("1.0.0-1", "1.0.0-a");
        cmp_versions("1.0.0-9", "1.0.0-10");
        cmp_versions("18446744073709551615", "18446744073709551616");
    }

    fn cmp_versions(a: &str, b: &str) {
        let x = Version::new(a).unwrap();
        let y = Version::new(b).unwrap();

        assert!(x < y, "{} < {}", x, y);
    }

    #[test]
    fn equality() {
        let pairs = vec![
            ("1.0", "1.0.0"),
            ("1", "1.0.0.0"),
            ("1.0.0+a", "1.0.0+b"),
            ("v1.2.3", "1.2.3"),
            ("01.2.3", "1.2.3"),
            ("1.2-rc.1", "1.2.0.0-rc.1+meta"),
        ];

        for (a, b) in pairs {
            let x = Version::new(a).unwrap();
            let y = Version::new(b).unwrap();

            assert_eq!(Equal, x.cmp(&y), "{} == {}", a, b);
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_eq() {
        assert!(Constraint::from_str("= 1.0")
            .unwrap()
            .check(&Version::new("1.0.0").unwrap()));
        assert!(!Constraint::from_str("= 1.0")
            .unwrap()
            .check(&Version::new("1.1.5").unwrap()));
        assert!(Constraint::from_str("1.0")
            .unwrap()
            .check(&Version::new("1.0.0").unwrap()));
        assert!(Constraint::from_str("=6.0.0-pre134")
            .unwrap()
            .check(&Version::new("6.0-pre134").unwrap()));
    }

    #[test]
    fn test_ne() {
        let ne = Constraint::from_str("!= 1.1.1").unwrap();
        assert!(!ne.check(&Version::new("1.1.1").unwrap()));
        assert!(!ne.check(&Version::new("1.1.1.0+git").unwrap()));
        assert!(ne.check(&Version::new("1.1.1-rc.1").unwrap()));
        assert!(ne.check(&Version::new("1.1.2").unwrap()));
    }

    #[test]
    fn test_gt() {
        let gt = Constraint::from_str(">1.1.1").unwrap();

        assert!(!gt.check(&Version::new("1.1.1").unwrap()));
        assert!(gt.check(&Version::new("2.2.2").unwrap()));
        assert!(gt.check(&Version::new("1.2.0").unwrap()));
        assert!(gt.check(&Version::new("1.1.1.1").unwrap()));
        assert!(!gt.check(&Version::new("0.9.9").unwrap()));
        assert!(!gt.check(&Version::new("1.1.0").unwrap()));
    }

    #[test]
    fn test_lt() {
        let lt = Constraint::from_str("<1.1.1").unwrap();
        assert!(!lt.check(&Version::new("1.1.1").unwrap()));
        assert!(!lt.check(&Version::new("2.2.2").unwrap()));
        assert!(!lt.check(&Version::new("1.1.1.1").unwrap()));
        assert!(lt.check(&Version::new("0.9.9").unwrap()));
        assert!(lt.check(&Version::new("1.1.0").unwrap()));
        assert!(lt.check(&Version::new("1.1.1-rc.1").unwrap()));
    }

    #[test]
    fn test_gte() {
        let gte = Constraint::from_str(">=1.1.1").unwrap();
        assert!(gte.check(&Version::new("1.1.1").unwrap()));
        assert!(gte.check(&Version::new("1.1.1.0").unwrap()));
        assert!(gte.check(&Version::new("2.0.0").unwrap()));
        assert!(!gte.check(&Version::new("0.9.9").unwrap()));
        assert!(!gte.check(&Version::new("1.1.1-rc.1").unwrap()));
    }

    #[test]
    fn test_lte() {
        let lte = Constraint::from_str("<=1.1.1").unwrap();
        assert!(lte.check(&Version::new("1.1.1").unwrap()));
        assert!(lte.check(&Version::new("1.1.1-rc.1").unwrap()));
        assert!(!lte.check(&Version::new("1.1.2").unwrap()));
        assert!(lte.check(&Version::new("0.9.9").unwrap()));
    }

    #[test]
    fn test_pessimistic() {
        let pess = Constraint::from_str("~> 1").unwrap();
        assert!(pess.check(&Version::new("1.9.9").unwrap()));
        assert!(!pess.check(&Version::new("2.0.0").unwrap()));

        let pess = Constraint::from_str("~> 1.0.7").unwrap();
        assert!(pess.check(&Version::new("1.0.7").unwrap()));
        assert!(pess.check(&Version::new("1.0.99").unwrap()));
        assert!(!pess.check(&Version::new("1.1.0").unwrap()));
        assert!(!pess.check(&Version::new("1.1.0-rc.1").unwrap()));
    }

    #[test]
    fn test_tilde() {
        let tilde = Constraint::from_str("~1.1.1").unwrap();
        assert!(tilde.check(&Version::new("1.1.1").unwrap()));
        assert!(tilde.check(&Version::new("1.1.2").unwrap()));
        assert!(tilde.check(&Version::new("1.1.3").unwrap()));
        assert!(!tilde.check(&Version::new("1.2.0").unwrap()));
        assert!(!tilde.check(&Version::new("2.0.0").unwrap()));
        assert!(!tilde.check(&Version::new("0.9.9").unwrap()));
        assert!(!tilde.check(&Version::new("1.0.0").unwrap()));

        let tilde = Constraint::from_str("~1.2.3.4").unwrap();
        assert!(tilde.check(&Version::new("1.2.3.9").unwrap()));
        assert!(!tilde.check(&Version::new("1.2.4").unwrap()));
    }

    #[test]
    fn test_tilde_prerelease() {
        let tilde = Constraint::from_str("~1.2.0-rc.1").unwrap();
        assert!(tilde.check(&Version::new("1.2.0-rc.1").unwrap()));
        assert!(tilde.check(&Version::new("1.2.0-rc.2").unwrap()));
        assert!(tilde.check(&Version::new("1.2.0").unwrap()));
        assert!(tilde.check(&Version::new("1.2.5").unwrap()));
        assert!(tilde.check(&Version::new("1.2.5-beta").unwrap()));
        assert!(!tilde.check(&Version::new("1.2.0-beta").unwrap()));
        assert!(!tilde.check(&Version::new("1.3.0").unwrap()));
    }

    #[test]
    fn test_caret() {
        let caret = Constraint::from_str("^1.1.1").unwrap();
        assert!(caret.check(&Version::new("1.1.1").unwrap()));
        assert!(caret.check(&Version::new("1.1.2").unwrap()));
        assert!(caret.check(&Version::new("1.2.0").unwrap()));
        assert!(!caret.check(&Version::new("2.0.0").unwrap()));
        assert!(!caret.check(&Version::new("0.9.9").unwrap()));
        assert!(!caret.check(&Version::new("1.0.0").unwrap()));

        let caret = Constraint::from_str("^0.2.3").unwrap();
        assert!(caret.check(&Version::new("0.2.9").unwrap()));
        assert!(!caret.check(&Version::new("0.3.0").unwrap()));

        let caret = Constraint::from_str("^0.0.3").unwrap();
        assert!(caret.check(&Version::new("0.0.3").unwrap()));
        assert!(!caret.check(&Version::new("0.0.4").unwrap()));

        let caret = Constraint::from_str("^0.0").unwrap();
        assert!(caret.check(&Version::new("0.0.7").unwrap()));
        assert!(!caret.check(&Version::new("0.1.0").unwrap()));
    }

    #[test]
    fn test_caret_prerelease() {
        let caret = Constraint::from_str("^1.2.0-rc.1").unwrap();
        assert!(caret.check(&Version::new("1.2.0-rc.1").unwrap()));
        assert!(caret.check(&Version::new("1.2.0-rc.2").unwrap()));
        assert!(caret.check(&Version::new("1.2.0").unwrap()));
        assert!(caret.check(&Version::new("1.3.0").unwrap()));
        assert!(!caret.check(&Version::new("1.2.0-alpha").unwrap()));
        assert!(!caret.check(&Version::new("2.0.0").unwrap()));
        assert!(!caret.check(&Version::new("2.0.0-rc.1").unwrap()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        use serde::Deserialize;

        #[derive(Deserialize)]
        struct Pinned {
            version: Version,
            requirement: Constraint,
        }

        let pinned: Pinned =
            serde_json::from_str(r#"{"version": "1.2.3", "requirement": ">= 1.2"}"#).unwrap();

        assert_eq!(pinned.version, Version::new("1.2.3").unwrap());
        assert_eq!(
            pinned.requirement,
            Constraint::from_parts(Op::GreaterEq, Version::new("1.2").unwrap())
        );
        assert!(pinned.requirement.check(&pinned.version));

        let bad = serde_json::from_str::<Pinned>(r#"{"version": "1.x", "requirement": "1"}"#);
        assert!(bad.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        use serde::Serialize;

        #[derive(Serialize)]
        struct Pinned {
            version: Version,
            requirement: Constraint,
        }

        let test_object = Pinned {
            version: Version::new("v1.2+git").unwrap(),
            requirement: Constraint::from_str("~> 1.2").unwrap(),
        };

        let string = serde_json::to_string(&test_object).unwrap();

        assert_eq!(
            string,
            "{\"version\":\"v1.2+git\",\"requirement\":\"~> 1.2\"}"
        );
    }
}
