//! Dimension-type strategies and the registry that picks one per kind.
//!
//! Each strategy drives the shared layout machinery through a [`Chain`]
//! of segments:
//! - `linear`: straight dimension lines, chained or stacked
//! - `angular`: arcs between rays, with the chord variant
//! - `ordinate`: offsets from a datum with dog-leg leaders
//! - `label_line`: direction and length labels on a line
//!
//! [`Chain`]: crate::layout::Chain

pub mod angular;
pub mod label_line;
pub mod linear;
pub mod ordinate;

use std::collections::BTreeMap;

use enum_dispatch::enum_dispatch;

pub use angular::AngularStrategy;
pub use label_line::LabelLineStrategy;
pub use linear::LinearStrategy;
pub use ordinate::OrdinateStrategy;

use crate::definition::{DimensionDefinition, DimensionKind};
use crate::errors::{LayoutError, Result};
use crate::layout::LayoutContext;
use crate::log::debug;
use crate::metrics::TextMetrics;
use crate::output::Sink;
use crate::style::StyleResolver;

/// Lays out every segment of one dimension kind
#[enum_dispatch]
pub trait DimensionStrategy {
    fn stroke(
        &self,
        ctx: &mut LayoutContext<'_>,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
    ) -> Result<()>;
}

/// Every built-in strategy
#[enum_dispatch(DimensionStrategy)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    LinearStrategy,
    AngularStrategy,
    OrdinateStrategy,
    LabelLineStrategy,
}

/// Maps dimension kinds to the strategy that strokes them
#[derive(Clone, Debug)]
pub struct StrategyRegistry {
    strategies: BTreeMap<DimensionKind, Strategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(DimensionKind::LinearSize, LinearStrategy)
            .register(DimensionKind::LinearLocation, LinearStrategy)
            .register(DimensionKind::AngleSize, AngularStrategy)
            .register(DimensionKind::ArcSize, AngularStrategy)
            .register(DimensionKind::AngleLocation, AngularStrategy)
            .register(DimensionKind::ArcLocation, AngularStrategy)
            .register(DimensionKind::Ordinate, OrdinateStrategy)
            .register(DimensionKind::LabelLine, LabelLineStrategy);
        registry
    }
}

impl StrategyRegistry {
    /// Registry without any strategy
    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: DimensionKind, strategy: impl Into<Strategy>) -> &mut Self {
        self.strategies.insert(kind, strategy.into());
        self
    }

    pub fn get(&self, kind: DimensionKind) -> Result<Strategy> {
        self.strategies
            .get(&kind)
            .copied()
            .ok_or(LayoutError::NoStrategy { kind })
    }

    /// Lay out `def`, sending primitives to `sink` segment by segment
    pub fn stroke(
        &self,
        def: &DimensionDefinition,
        resolver: &dyn StyleResolver,
        metrics: &dyn TextMetrics,
        sink: &mut dyn Sink,
    ) -> Result<()> {
        let strategy = self.get(def.kind)?;
        def.require_points(def.kind.min_points())?;
        debug!(kind = ?def.kind, points = def.points.len(), "stroking dimension");
        let mut ctx = LayoutContext::new(resolver.base().clone(), def.frame, def.view, metrics, sink);
        strategy.stroke(&mut ctx, def, resolver)
    }
}
