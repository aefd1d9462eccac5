//! npm-style version ranges.
//! npm 风格的版本范围。
//!
//! Only what `dependencySatisfies` needs: parsing `major.minor.patch`
//! versions and testing them against ranges built from `*`, x-ranges,
//! `~`, `^`, comparators, hyphen ranges and `||`. Pre-release versions are
//! always eligible, as with node-semver's `includePrerelease`.

use std::cmp::Ordering;
use std::fmt;

/// One dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreRelease {
    Numeric(u64),
    Alpha(String),
}

impl PreRelease {
    fn parse(part: &str) -> Option<Self> {
        if part.is_empty() {
            return None;
        }
        if part.bytes().all(|b| b.is_ascii_digit()) {
            return part.parse().ok().map(PreRelease::Numeric);
        }
        if part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Some(PreRelease::Alpha(part.to_string()));
        }
        None
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreRelease::Numeric(a), PreRelease::Numeric(b)) => a.cmp(b),
            (PreRelease::Numeric(_), PreRelease::Alpha(_)) => Ordering::Less,
            (PreRelease::Alpha(_), PreRelease::Numeric(_)) => Ordering::Greater,
            (PreRelease::Alpha(a), PreRelease::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A concrete `major.minor.patch[-pre]` version. Build metadata is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<PreRelease>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// The smallest pre-release of this version (`x.y.z-0`).
    fn floor(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            pre: vec![PreRelease::Numeric(0)],
            ..Self::new(major, minor, patch)
        }
    }

    /// Parse a full version. A leading `v` or `=` is accepted.
    pub fn parse(text: &str) -> Option<Self> {
        let partial = Partial::parse(text)?;
        match (partial.major, partial.minor, partial.patch) {
            (Some(major), Some(minor), Some(patch)) => Some(Self {
                major,
                minor,
                patch,
                pre: partial.pre,
            }),
            _ => None,
        }
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // a release sorts after its pre-releases
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, part) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            match part {
                PreRelease::Numeric(n) => write!(f, "{n}")?,
                PreRelease::Alpha(s) => f.write_str(s)?,
            }
        }
        Ok(())
    }
}

/// A version with possibly wildcarded components (`1`, `1.x`, `1.2.*`).
#[derive(Debug, Clone, PartialEq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Vec<PreRelease>,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('=').unwrap_or(text).trim_start();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);
        let text = text.split('+').next().unwrap_or(text);

        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (text, None),
        };

        let mut components = [None; 3];
        let mut wildcard = false;
        let parts: Vec<&str> = if core.is_empty() {
            Vec::new()
        } else {
            core.split('.').collect()
        };
        if parts.len() > 3 {
            return None;
        }
        for (slot, part) in components.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard = true;
                continue;
            }
            // nothing concrete may follow a wildcard
            if wildcard || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = Some(part.parse().ok()?);
        }

        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(PreRelease::parse)
                .collect::<Option<Vec<_>>>()?,
            None => Vec::new(),
        };

        Some(Partial {
            major: components[0],
            minor: components[1],
            patch: components[2],
            pre,
        })
    }

    fn is_any(&self) -> bool {
        self.major.is_none()
    }

    /// Lowest version this partial stands for; wildcards become the
    /// `-0` floor so pre-releases are included.
    fn lower(&self) -> Version {
        match (self.major, self.minor, self.patch) {
            (Some(major), Some(minor), Some(patch)) => Version {
                major,
                minor,
                patch,
                pre: self.pre.clone(),
            },
            (major, minor, _) => {
                Version::floor(major.unwrap_or(0), minor.unwrap_or(0), 0)
            }
        }
    }

    /// Exclusive upper bound for a partial, or `None` when fully specified.
    fn upper_exclusive(&self) -> Option<Version> {
        match (self.major, self.minor, self.patch) {
            (None, _, _) => None,
            (Some(major), None, _) => Some(Version::floor(major + 1, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::floor(major, minor + 1, 0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone, PartialEq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// A comparator nothing satisfies.
    fn never() -> Self {
        Self::new(Op::Lt, Version::floor(0, 0, 0))
    }

    fn test(&self, version: &Version) -> bool {
        let ordering = version.cmp(&self.version);
        match self.op {
            Op::Lt => ordering == Ordering::Less,
            Op::Le => ordering != Ordering::Greater,
            Op::Gt => ordering == Ordering::Greater,
            Op::Ge => ordering != Ordering::Less,
            Op::Eq => ordering == Ordering::Equal,
        }
    }
}

/// A parsed range: alternatives joined by `||`, each a conjunction of
/// comparators. An empty conjunction matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    sets: Vec<Vec<Comparator>>,
}

impl Range {
    pub fn parse(text: &str) -> Option<Self> {
        let sets = text
            .split("||")
            .map(parse_set)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { sets })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.sets
            .iter()
            .any(|set| set.iter().all(|comparator| comparator.test(version)))
    }
}

/// Whether `version` satisfies `range`. Unparseable input never does.
pub fn satisfies(version: &str, range: &str) -> bool {
    match (Version::parse(version), Range::parse(range)) {
        (Some(version), Some(range)) => range.matches(&version),
        _ => false,
    }
}

const OPERATORS: &[&str] = &[">=", "<=", "~>", ">", "<", "=", "~", "^"];

fn parse_set(text: &str) -> Option<Vec<Comparator>> {
    let words: Vec<&str> = text.split_whitespace().collect();

    if let [from, "-", to] = words.as_slice() {
        return hyphen(from, to);
    }

    // glue a bare operator to the version after it: `>= 1.2.3`
    let mut terms = Vec::new();
    let mut pending: Option<&str> = None;
    for word in words {
        match pending.take() {
            Some(op) => terms.push(format!("{op}{word}")),
            None if OPERATORS.contains(&word) => pending = Some(word),
            None => terms.push(word.to_string()),
        }
    }
    if pending.is_some() {
        return None;
    }

    let mut comparators = Vec::new();
    for term in terms {
        comparators.extend(parse_term(&term)?);
    }
    Some(comparators)
}

fn hyphen(from: &str, to: &str) -> Option<Vec<Comparator>> {
    let from = Partial::parse(from)?;
    let to = Partial::parse(to)?;
    let mut comparators = Vec::new();
    if !from.is_any() {
        comparators.push(Comparator::new(Op::Ge, from.lower()));
    }
    if !to.is_any() {
        comparators.push(match to.upper_exclusive() {
            Some(upper) => Comparator::new(Op::Lt, upper),
            None => Comparator::new(Op::Le, to.lower()),
        });
    }
    Some(comparators)
}

fn parse_term(term: &str) -> Option<Vec<Comparator>> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| term.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", term));
    let partial = Partial::parse(rest)?;

    let comparators = match op {
        "" | "=" => x_range(&partial),
        "~" | "~>" => tilde(&partial),
        "^" => caret(&partial),
        ">" => greater(&partial),
        ">=" => {
            if partial.is_any() {
                Vec::new()
            } else {
                vec![Comparator::new(Op::Ge, partial.lower())]
            }
        }
        "<" => {
            if partial.is_any() {
                vec![Comparator::never()]
            } else {
                vec![Comparator::new(Op::Lt, partial.lower())]
            }
        }
        "<=" => match partial.upper_exclusive() {
            _ if partial.is_any() => Vec::new(),
            Some(upper) => vec![Comparator::new(Op::Lt, upper)],
            None => vec![Comparator::new(Op::Le, partial.lower())],
        },
        _ => return None,
    };
    Some(comparators)
}

fn x_range(partial: &Partial) -> Vec<Comparator> {
    if partial.is_any() {
        return Vec::new();
    }
    match partial.upper_exclusive() {
        Some(upper) => vec![
            Comparator::new(Op::Ge, partial.lower()),
            Comparator::new(Op::Lt, upper),
        ],
        None => vec![Comparator::new(Op::Eq, partial.lower())],
    }
}

fn greater(partial: &Partial) -> Vec<Comparator> {
    match (partial.major, partial.minor, partial.patch) {
        (None, _, _) => vec![Comparator::never()],
        (Some(major), None, _) => vec![Comparator::new(Op::Ge, Version::floor(major + 1, 0, 0))],
        (Some(major), Some(minor), None) => {
            vec![Comparator::new(Op::Ge, Version::floor(major, minor + 1, 0))]
        }
        _ => vec![Comparator::new(Op::Gt, partial.lower())],
    }
}

fn tilde(partial: &Partial) -> Vec<Comparator> {
    let Some(major) = partial.major else {
        return Vec::new();
    };
    let upper = match partial.minor {
        None => Version::floor(major + 1, 0, 0),
        Some(minor) => Version::floor(major, minor + 1, 0),
    };
    let mut lower = partial.lower();
    if partial.patch.is_none() {
        lower.pre.clear();
    }
    vec![
        Comparator::new(Op::Ge, lower),
        Comparator::new(Op::Lt, upper),
    ]
}

fn caret(partial: &Partial) -> Vec<Comparator> {
    let Some(major) = partial.major else {
        return Vec::new();
    };
    // the first non-zero component may not change
    let upper = match (major, partial.minor, partial.patch) {
        (_, None, _) => Version::floor(major + 1, 0, 0),
        (0, Some(minor), None) => Version::floor(0, minor + 1, 0),
        (0, Some(0), Some(patch)) => Version::floor(0, 0, patch + 1),
        (0, Some(minor), Some(_)) => Version::floor(0, minor + 1, 0),
        _ => Version::floor(major + 1, 0, 0),
    };
    let mut lower = partial.lower();
    if partial.patch.is_some() && partial.pre.is_empty() {
        lower = Version::floor(major, partial.minor.unwrap_or(0), partial.patch.unwrap_or(0));
    }
    vec![
        Comparator::new(Op::Ge, lower),
        Comparator::new(Op::Lt, upper),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        let v = |s| Version::parse(s).unwrap();
        assert!(v("1.2.3") < v("1.2.4"));
        assert!(v("1.2.3-alpha") < v("1.2.3"));
        assert!(v("1.2.3-alpha") < v("1.2.3-alpha.1"));
        assert!(v("1.2.3-alpha.1") < v("1.2.3-beta"));
        assert!(v("1.2.3-2") < v("1.2.3-10"));
        assert!(v("1.2.3-9") < v("1.2.3-a"));
        assert_eq!(v("v1.2.3+build.5"), Version::new(1, 2, 3));
        assert_eq!(v("1.2.3-rc.1").to_string(), "1.2.3-rc.1");
        assert!(Version::parse("1.2").is_none());
        assert!(Version::parse("one.two.three").is_none());
    }

    #[test]
    fn test_star_and_x_ranges() {
        assert!(satisfies("0.0.1", "*"));
        assert!(satisfies("3.0.0-beta.1", "*"));
        assert!(satisfies("1.9.9", ""));
        assert!(satisfies("1.4.0", "1.x"));
        assert!(satisfies("1.4.0", "1"));
        assert!(!satisfies("2.0.0", "1.x"));
        assert!(satisfies("1.2.9", "1.2.*"));
        assert!(!satisfies("1.3.0", "1.2"));
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(satisfies("1.2.3", "=1.2.3"));
        assert!(!satisfies("1.2.4", "1.2.3"));
    }

    #[test]
    fn test_tilde_ranges() {
        assert!(satisfies("1.2.9", "~1.2.3"));
        assert!(!satisfies("1.3.0", "~1.2.3"));
        assert!(!satisfies("1.2.2", "~1.2.3"));
        assert!(satisfies("1.9.0", "~1"));
        assert!(satisfies("1.2.0", "~>1.2"));
    }

    #[test]
    fn test_caret_ranges() {
        assert!(satisfies("1.9.0", "^1.2.3"));
        assert!(!satisfies("2.0.0", "^1.2.3"));
        assert!(!satisfies("2.0.0-alpha", "^1.2.3"));
        assert!(satisfies("0.2.9", "^0.2.3"));
        assert!(!satisfies("0.3.0", "^0.2.3"));
        assert!(satisfies("0.0.3", "^0.0.3"));
        assert!(!satisfies("0.0.4", "^0.0.3"));
        assert!(satisfies("0.9.0", "^0"));
        assert!(satisfies("1.3.0-beta.1", "^1.2.0"));
    }

    #[test]
    fn test_comparators_and_unions() {
        assert!(satisfies("1.5.0", ">=1.2.3 <2.0.0"));
        assert!(satisfies("1.5.0", ">= 1.2.3 < 2"));
        assert!(!satisfies("2.0.0", ">=1.2.3 <2.0.0"));
        assert!(satisfies("2.0.0", ">1"));
        assert!(!satisfies("1.9.9", ">1"));
        assert!(satisfies("1.2.9", "<=1.2"));
        assert!(!satisfies("1.3.0", "<=1.2"));
        assert!(satisfies("3.1.0", "^1.0.0 || ^3.0.0"));
        assert!(!satisfies("2.1.0", "^1.0.0 || ^3.0.0"));
    }

    #[test]
    fn test_hyphen_ranges() {
        assert!(satisfies("1.2.3", "1.2.3 - 2.3.4"));
        assert!(satisfies("2.3.4", "1.2.3 - 2.3.4"));
        assert!(!satisfies("2.3.5", "1.2.3 - 2.3.4"));
        assert!(satisfies("2.3.9", "1.2 - 2.3"));
        assert!(!satisfies("2.4.0", "1.2 - 2.3"));
    }

    #[test]
    fn test_invalid_input_never_matches() {
        assert!(!satisfies("1.2.3", "not a range"));
        assert!(!satisfies("latest", "*"));
        assert!(!satisfies("1.2.3", ">="));
    }
}
