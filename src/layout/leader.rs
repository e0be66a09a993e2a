//! Ball-and-chain leaders from the dimension line to displaced text.

use glam::DVec3;

use super::context::LayoutContext;
use super::segment::emit_line;
use super::terminator::line_terminator;
use super::text::{PlacedText, elbow_length, leader_attaches_left};
use crate::output::LineRole;
use crate::style::GlyphKind;

/// Points of a leader: the chain runs `from -> elbow`, the elbow runs
/// `elbow -> attach` along the text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeaderPath {
    pub from: DVec3,
    pub elbow: DVec3,
    pub attach: DVec3,
}

pub fn leader_path(ctx: &LayoutContext<'_>, from: DVec3, text: &PlacedText) -> LeaderPath {
    let margin = ctx.style.text_margin.raw();
    let elbow = elbow_length(&ctx.style);
    let (left, right) = text.ends(margin);
    let (attach, elbow) = if leader_attaches_left(&ctx.style, text, from) {
        (left, left - text.direction * elbow)
    } else {
        (right, right + text.direction * elbow)
    };
    LeaderPath { from, elbow, attach }
}

/// Emit the leader with a dot where it leaves the dimension line
pub fn emit_leader(ctx: &mut LayoutContext<'_>, from: DVec3, text: &PlacedText) -> LeaderPath {
    let path = leader_path(ctx, from, text);
    emit_line(ctx, path.from, path.elbow, LineRole::Leader);
    emit_line(ctx, path.elbow, path.attach, LineRole::Leader);
    line_terminator(ctx, path.elbow, path.from, GlyphKind::Dot);
    path
}
