//! Common utilities and data structures for macrofold.
//! macrofold 的通用工具和数据结构。
//!
//! This crate provides foundational types shared by every stage:
//! - `Span`: Source code location tracking
//! - `NodeId`: Stable identity of one syntactic occurrence

mod node_id;
mod span;

pub use node_id::{NodeId, NodeIdGen};
pub use span::{BytePos, Span};
