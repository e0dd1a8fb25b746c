//! Disjunctions of conjunctions of [`Constraint`]s.

use crate::{Constraint, Error, Reason, Version};
use itertools::Itertools;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// A full version constraint expression, like `>= 1.0, < 1.2 || > 1.3`.
///
/// Clauses joined by `,` form a group, all of which must hold. Groups joined
/// by `||` are alternatives, any one of which may hold.
///
/// # Examples
///
/// ```
/// use version_constraints::{Constraints, Version};
///
/// let cs = Constraints::new(">= 1.2, < 1.0 || ~> 2.0, < 3").unwrap();
/// assert_eq!(2, cs.len());
/// assert_eq!(2, cs.groups()[0].len());
///
/// assert!(cs.check(&Version::new("2.5").unwrap()));
/// assert!(!cs.check(&Version::new("1.5").unwrap()));
/// assert_eq!(">= 1.2, < 1.0 || ~> 2.0, < 3", cs.to_string());
/// ```
///
/// With the `serde` feature, `Constraints` are encoded as a single string:
///
/// ```
/// # #[cfg(feature = "serde")] {
/// use version_constraints::Constraints;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Package {
///     requires: Constraints,
/// }
///
/// let json = r#"{"requires":">= 1.0, < 2.0"}"#;
/// let pkg: Package = serde_json::from_str(json).unwrap();
/// assert_eq!(json, serde_json::to_string(&pkg).unwrap());
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraints(Vec<Vec<Constraint>>);

impl Constraints {
    /// Parse new `Constraints` from a string.
    pub fn new<S>(s: S) -> Option<Self>
    where
        S: AsRef<str>,
    {
        Constraints::from_str(s.as_ref()).ok()
    }

    /// The `||`-separated groups, each holding its `,`-separated clauses in
    /// their original order.
    pub fn groups(&self) -> &[Vec<Constraint>] {
        &self.0
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Constraint>> {
        self.0.iter()
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for parsed `Constraints`, which hold at least one clause.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if a version satisfies every clause of at least one group.
    pub fn check(&self, other: &Version) -> bool {
        self.0
            .iter()
            .any(|group| group.iter().all(|c| c.check(other)))
    }

    /// Like [`Constraints::check`], but parses the version first.
    ///
    /// ```
    /// use version_constraints::Constraints;
    ///
    /// let cs = Constraints::new("^1.1").unwrap();
    /// assert_eq!(Ok(true), cs.check_str("1.2.3"));
    /// assert_eq!(Ok(false), cs.check_str("2.1.0"));
    /// assert!(cs.check_str("1.x").is_err());
    /// ```
    pub fn check_str(&self, version: &str) -> Result<bool, Error> {
        let v = Version::from_str(version)?;

        Ok(self.check(&v))
    }

    fn group(expr: &str, group: &str) -> Result<Vec<Constraint>, Error> {
        group
            .split(',')
            .map(|clause| match clause.trim() {
                "" => Err(Error::invalid(Reason::MalformedConstraint, expr)),
                clause => Constraint::from_str(clause),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Constraints {
    type Item = &'a Vec<Constraint>;
    type IntoIter = std::slice::Iter<'a, Vec<Constraint>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromStr for Constraints {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(Error::invalid(Reason::Empty, s));
        }

        s.split("||")
            .map(|group| Constraints::group(s, group))
            .collect::<Result<Vec<_>, _>>()
            .map(Constraints)
    }
}

impl TryFrom<&str> for Constraints {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Constraints::from_str(value)
    }
}

impl std::fmt::Display for Constraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups = self.0.iter().map(|group| group.iter().join(", "));

        write!(f, "{}", groups.format(" || "))
    }
}

#[cfg(feature = "serde")]
impl Serialize for Constraints {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Constraints {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        s.parse().map_err(D::Error::custom)
    }
}
