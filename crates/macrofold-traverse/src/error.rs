//! Structural navigation errors.

use crate::{NodeKind, Slot};
use macrofold_common::NodeId;
use thiserror::Error;

/// The caller and the tree disagree about a node's shape.
///
/// These are programming errors in the code doing the navigation, never a
/// property of the source being analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("expected a single node in `{slot}` of {kind:?} {node:?}, found a list")]
    ExpectedSingle {
        node: NodeId,
        kind: NodeKind,
        slot: Slot,
    },

    #[error("expected a list in `{slot}` of {kind:?} {node:?}, found a single node")]
    ExpectedSequence {
        node: NodeId,
        kind: NodeKind,
        slot: Slot,
    },

    #[error("{kind:?} {node:?} has no `{slot}` slot")]
    MissingSlot {
        node: NodeId,
        kind: NodeKind,
        slot: Slot,
    },
}
