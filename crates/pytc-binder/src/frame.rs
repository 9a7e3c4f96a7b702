//! A [`Frame`] (spec §3.3) is one level of the binder's frame stack: a
//! mapping from [`LiteralKey`] to the refined [`TypeId`] known to hold at
//! that point on that control-flow path.

use crate::key::LiteralKey;
use pytc_solver::TypeId;
use rustc_hash::FxHashMap;

pub type Frame = FxHashMap<LiteralKey, TypeId>;
