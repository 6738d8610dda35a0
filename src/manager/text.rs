use std::rc::Rc;

use eddy_core::NodeId;
use tracing::trace;

use crate::{ReconcileError, context::Ctx};

/// Manager of a text leaf.
#[derive(Debug)]
pub struct TextManager {
    text: Rc<str>,
    node: Option<NodeId>,
}

impl TextManager {
    pub(crate) const fn new(text: Rc<str>) -> Self {
        Self { text, node: None }
    }

    /// The current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The element last reconciled.
    #[must_use]
    pub const fn element(&self) -> &Rc<str> {
        &self.text
    }

    /// The text leaf, once mounted.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        let node = ctx.host.create_text(&self.text)?;
        self.node = Some(node);
        Ok(vec![node])
    }

    /// Swaps the leaf for a new one when the text changed. Unchanged text is a no-op.
    pub(crate) fn receive(
        &mut self,
        next: &Rc<str>,
        ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        let old = self.node.ok_or(ReconcileError::NotMounted)?;
        if *self.text == **next {
            return Ok(());
        }
        let node = ctx.host.create_text(next)?;
        ctx.host.replace_with(old, &[node])?;
        trace!(old = old.index(), new = node.index(), "text replaced");
        self.text = next.clone();
        self.node = Some(node);
        Ok(())
    }
}
