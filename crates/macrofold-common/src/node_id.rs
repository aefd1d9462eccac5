//! Node identity.
//! 节点标识。

use std::fmt;

/// Identity of one expression node within a single parse.
/// 单次解析中一个表达式节点的标识。
///
/// Two handles that point at the same syntactic occurrence carry the same
/// `NodeId`, which is what memo caches key on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh node ids in allocation order.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `base`, for fragments parsed separately from a host tree.
    pub fn starting_at(base: u32) -> Self {
        Self { next: base }
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far (including the base offset).
    pub fn peek(&self) -> u32 {
        self.next
    }
}
