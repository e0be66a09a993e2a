//! Segment chain driver.
//!
//! Runs one step per segment of a dimension, resolving the segment's style
//! first and committing its primitives only once the step succeeds.

use super::context::LayoutContext;
use crate::errors::Result;
use crate::log::{debug, warn};
use crate::style::StyleResolver;

/// Walk over the segments of one dimension
pub struct Chain<'r> {
    resolver: &'r dyn StyleResolver,
    count: usize,
    stacked: bool,
}

impl<'r> Chain<'r> {
    pub fn new(resolver: &'r dyn StyleResolver, count: usize, stacked: bool) -> Self {
        Self {
            resolver,
            count,
            stacked,
        }
    }

    /// Run `step` on every segment in order.
    ///
    /// A failing step drops its own primitives and stops the chain; earlier
    /// segments stay committed.
    pub fn run<'a, F>(&self, ctx: &mut LayoutContext<'a>, mut step: F) -> Result<()>
    where
        F: FnMut(&mut LayoutContext<'a>, usize) -> Result<()>,
    {
        for segment in 0..self.count {
            let style = self.resolver.resolve(segment)?;
            ctx.begin_segment(segment, segment == 0, segment + 1 == self.count, style);
            ctx.stack.height = 0.0;

            if let Err(err) = step(ctx, segment) {
                ctx.discard_segment();
                warn!(segment, error = %err, "segment failed, stroke aborted");
                return Err(err);
            }
            ctx.commit_segment();

            if self.stacked {
                ctx.stack.total += ctx.stack.height;
            }
            debug!(
                segment,
                stack_height = ctx.stack.height,
                stack_total = ctx.stack.total,
                sweep = ctx.sweep.total(),
                "segment committed"
            );
        }
        Ok(())
    }
}
