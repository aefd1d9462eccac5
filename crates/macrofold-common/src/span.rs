//! Source spans.
//! 源码范围。

use std::fmt;

/// A byte offset into the source text.
/// 源码中的字节偏移。
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BytePos(pub u32);

impl fmt::Debug for BytePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<usize> for BytePos {
    fn from(pos: usize) -> Self {
        BytePos(pos as u32)
    }
}

impl From<BytePos> for usize {
    fn from(pos: BytePos) -> Self {
        pos.0 as usize
    }
}

/// A half-open byte range `start..end` in the source text.
/// 源码中的半开区间 `start..end`。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
}

impl Span {
    /// Span used for synthesized nodes that have no source text.
    pub const DUMMY: Span = Span {
        start: BytePos(0),
        end: BytePos(0),
    };

    pub fn new(start: usize, end: usize) -> Self {
        Span {
            start: BytePos::from(start),
            end: BytePos::from(end),
        }
    }

    /// Smallest span covering both `self` and `other`.
    /// 覆盖 `self` 与 `other` 的最小范围。
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.0.saturating_sub(self.start.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        usize::from(self.start)..usize::from(self.end)
    }

    /// The text this span covers, or `""` when it lies outside `source`.
    /// 此范围覆盖的源码文本；越界时返回空串。
    pub fn slice<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.range()).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_covers_both() {
        let merged = Span::new(10, 20).to(Span::new(4, 12));
        assert_eq!(merged, Span::new(4, 20));
        assert_eq!(merged.len(), 16);
    }

    #[test]
    fn slice_and_contains() {
        let source = "a.b + c";
        let span = Span::new(0, 3);
        assert_eq!(span.slice(source), "a.b");
        assert!(Span::new(0, 7).contains(span));
        assert!(!span.contains(Span::new(2, 5)));
        assert_eq!(Span::new(5, 50).slice(source), "");
    }

    #[test]
    fn empty_span() {
        assert!(Span::DUMMY.is_empty());
        assert!(!Span::new(1, 2).is_empty());
    }
}
