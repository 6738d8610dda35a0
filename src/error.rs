//! Reconciliation errors and diagnostics.

use eddy_core::{ComponentId, HostError, Key};
use thiserror::Error;

/// Errors that abort the mount or diff of one subtree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The element cannot be classified into a manager variant.
    #[error("cannot classify element `{tag}`: {reason}")]
    InvalidElementKind {
        /// Offending tag or element name.
        tag: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The host rejected a mutation.
    #[error(transparent)]
    Host(#[from] HostError),
    /// The manager was asked to update before it was mounted.
    #[error("manager is not mounted")]
    NotMounted,
    /// The mailbox of an async component no longer accepts requests.
    #[error("mailbox of component {0:?} is closed")]
    MailboxClosed(ComponentId),
    /// The mailbox of an async component already holds as many events as it may queue.
    #[error("mailbox of component {0:?} is full")]
    MailboxFull(ComponentId),
}

/// Non-fatal conditions recorded while reconciling.
///
/// Diagnostics are logged as they happen and kept until drained with
/// [`Renderer::take_diagnostics`](crate::Renderer::take_diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A sequence contained items without a key; their state is lost on reorder.
    MissingKey {
        /// Number of unkeyed items in the sequence.
        unkeyed: usize,
        /// Length of the sequence.
        len: usize,
    },
    /// The same key appeared more than once in a sequence. The duplicate was mounted fresh.
    DuplicateKey(Key),
    /// An async reply arrived after a newer request superseded it and was discarded.
    StaleAsyncReply {
        /// Component the reply was for.
        component: ComponentId,
        /// Generation of the discarded reply.
        generation: u64,
        /// Latest generation issued for the component.
        latest: u64,
    },
    /// A reply arrived for a component that is no longer mounted.
    OrphanAsyncReply(ComponentId),
    /// A subtree failed to mount or update; siblings were left untouched.
    SubtreeFailed(ReconcileError),
}
