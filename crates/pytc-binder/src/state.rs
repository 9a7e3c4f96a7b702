//! The occurrence-typing binder (spec §4.H): frame-stack refinement of
//! expression types across branches, loops, and exception handlers.
//!
//! Grounded directly on mypy's `binder.py` `ConditionalTypeBinder` — the
//! same frame-stack-of-maps design, the same `options_on_return` escape
//! bookkeeping for `break`/`continue`/`return`/`raise`, the same
//! dependency-invalidation discipline on assignment. The difference from
//! the teacher crate this workspace otherwise imitates is deliberate: the
//! teacher's own "binder" is a *name* binder (symbol tables, import
//! graphs) — entirely out of scope here (spec §1) — so this module's
//! shape instead follows the upstream system the spec's Binder component
//! actually describes, while keeping this crate's Rust idiom (explicit
//! `Ctx`, no interior mutability, no globals) consistent with
//! `pytc-solver`.

use crate::key::LiteralKey;
use crate::frame::Frame;
use pytc_solver::{join_types, same_type, Ctx, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// One level of loop or `try` nesting, identified by the frame index it
/// was opened at.
pub type FrameIndex = usize;

/// Frame-stack state for one function-body traversal (spec §5: "scoped to
/// one function-body traversal; nested-function traversals push an
/// isolated stack" — callers construct a fresh `BinderState` per nested
/// function rather than sharing one across an enclosing/inner pair).
#[derive(Debug)]
pub struct BinderState {
    frames: Vec<Frame>,
    /// Per frame-stack-depth, the set of frames that may flow into that
    /// depth from an escape (`break`/`continue`/`return`) or a normal
    /// fall-through.
    options_on_return: Vec<Vec<Frame>>,
    /// The originally-declared type of every key ever pushed, consulted
    /// by `assign_type`'s Any-suppression rule and by `pop_frame`'s
    /// option-merge rule.
    declarations: FxHashMap<LiteralKey, TypeId>,
    /// `x -> {x.a, x.a.b}`: invalidated together when `x` is reassigned.
    dependencies: FxHashMap<LiteralKey, FxHashSet<LiteralKey>>,
    breaking_out: bool,
    last_pop_changed: bool,
    last_pop_breaking_out: bool,
    try_frames: FxHashSet<FrameIndex>,
    loop_frames: Vec<FrameIndex>,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            options_on_return: vec![Vec::new()],
            declarations: FxHashMap::default(),
            dependencies: FxHashMap::default(),
            breaking_out: false,
            last_pop_changed: false,
            last_pop_breaking_out: false,
            try_frames: FxHashSet::default(),
            loop_frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_breaking_out(&self) -> bool {
        self.breaking_out
    }

    #[must_use]
    pub fn last_pop_changed(&self) -> bool {
        self.last_pop_changed
    }

    #[must_use]
    pub fn last_pop_breaking_out(&self) -> bool {
        self.last_pop_breaking_out
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
        self.options_on_return.push(Vec::new());
    }

    fn add_dependencies(&mut self, key: &LiteralKey) {
        if self.declarations.contains_key(key) {
            return;
        }
        for prefix in key.prefixes() {
            self.dependencies.entry(prefix).or_default().insert(key.clone());
        }
    }

    /// `push(expr, type)` (spec): records `type` at the current top frame.
    /// `declared` is the variable's originally-declared type, consulted
    /// from the (external) pre-resolved symbol table the first time this
    /// key is seen — later calls ignore it.
    pub fn push(&mut self, key: LiteralKey, declared: TypeId, refined: TypeId) {
        if !self.declarations.contains_key(&key) {
            self.declarations.insert(key.clone(), declared);
            self.add_dependencies(&key);
        }
        self.frames.last_mut().expect("frame stack never empty").insert(key, refined);
    }

    fn get_in(frames: &[Frame], key: &LiteralKey) -> Option<TypeId> {
        frames.iter().rev().find_map(|f| f.get(key).copied())
    }

    /// `get(expr)`: walks the frame stack top-down, returning the first
    /// hit, `None` if this key was never refined on this path.
    #[must_use]
    pub fn get(&self, key: &LiteralKey) -> Option<TypeId> {
        Self::get_in(&self.frames, key)
    }

    #[must_use]
    pub fn declared_type(&self, key: &LiteralKey) -> Option<TypeId> {
        self.declarations.get(key).copied()
    }

    /// `invalidate_dependencies(expr)`: removes every key that depends on
    /// `key`, from every frame — overly conservative by design (spec:
    /// mirrors mypy's own "invalidates globally, including in code paths
    /// unreachable from here").
    pub fn invalidate_dependencies(&mut self, key: &LiteralKey) {
        let Some(deps) = self.dependencies.get(key).cloned() else { return };
        debug!(dependents = deps.len(), "invalidating dependent keys after reassignment");
        for dep in deps {
            for frame in &mut self.frames {
                frame.remove(&dep);
            }
        }
    }

    /// `assign_type(expr, inferred, declared, restrict_any)` (spec §4.H).
    /// Caller is responsible for having already checked `inferred <:
    /// declared` elsewhere; this function assumes that check passed (a
    /// failing one is a type error reported by the caller, and the binder
    /// does nothing further, per spec: "If `inferred` is not a subtype of
    /// `declared`, treat as a type error elsewhere and do nothing").
    pub fn assign_type(&mut self, ctx: &mut Ctx, key: LiteralKey, inferred: TypeId, declared: TypeId, restrict_any: bool) {
        self.invalidate_dependencies(&key);
        if !pytc_solver::is_subtype(ctx, inferred, declared) {
            return;
        }
        let enclosing = self.get(&key).unwrap_or(declared);
        if enclosing.is_any() && !restrict_any {
            // keep the existing Any refinement
        } else if inferred.is_any() {
            self.push(key.clone(), declared, declared);
        } else {
            self.push(key.clone(), declared, inferred);
        }
        let try_frames: Vec<FrameIndex> = self.try_frames.iter().copied().collect();
        for index in try_frames {
            self.allow_jump(index);
        }
    }

    /// `allow_jump(index)`: copies the union of every frame from
    /// `index + 1` onward into `options_on_return[index]`, recording that
    /// an escape (or a `try`-body's "anything beyond this point might not
    /// have run") could land back at depth `index`.
    pub fn allow_jump(&mut self, index: FrameIndex) {
        let mut merged = Frame::default();
        for frame in self.frames.iter().skip(index + 1) {
            for (k, &v) in frame {
                merged.insert(k.clone(), v);
            }
        }
        if let Some(options) = self.options_on_return.get_mut(index) {
            options.push(merged);
        }
    }

    /// `pop_frame(fall_through)`: pops the top frame, first recording a
    /// fall-through escape `fall_through` levels up if control did not
    /// necessarily leave via break/continue/return, then merges every
    /// escape recorded for the frame being popped into the new top.
    #[tracing::instrument(level = "trace", skip(self, ctx))]
    pub fn pop_frame(&mut self, ctx: &mut Ctx, fall_through: usize) -> Frame {
        if fall_through > 0 && !self.breaking_out {
            let index = self.options_on_return.len().saturating_sub(1 + fall_through);
            self.allow_jump(index);
        }
        let result = self.frames.pop().expect("frame stack never empty");
        let options = self.options_on_return.pop().expect("options stack matches frame stack");
        self.last_pop_changed = self.update_from_options(ctx, &options);
        self.last_pop_breaking_out = self.breaking_out;
        result
    }

    /// `update_from_options` (spec: "merge accumulated options into the
    /// new top: for each key seen in any option frame, take the join of
    /// its values; if a key's declaration is `Any`, keep the key only if
    /// all options agree").
    fn update_from_options(&mut self, ctx: &mut Ctx, options: &[Frame]) -> bool {
        let mut changed = false;
        let mut keys: FxHashSet<LiteralKey> = FxHashSet::default();
        for frame in options {
            keys.extend(frame.keys().cloned());
        }
        for key in keys {
            let current = self.get(&key);
            let resulting: Vec<Option<TypeId>> = options.iter().map(|f| f.get(&key).copied().or(current)).collect();
            if resulting.iter().any(Option::is_none) {
                continue;
            }
            let resulting: Vec<TypeId> = resulting.into_iter().map(|t| t.unwrap()).collect();
            let declared_is_any = self.declarations.get(&key).is_some_and(|d| d.is_any());
            let merged = if declared_is_any {
                let first = resulting[0];
                if resulting[1..].iter().all(|&t| same_type(ctx.interner, first, t)) {
                    first
                } else {
                    TypeId::ANY
                }
            } else {
                resulting[1..].iter().fold(resulting[0], |acc, &t| join_types(ctx, acc, t))
            };
            if current.is_none_or(|c| !same_type(ctx.interner, c, merged)) {
                self.frames.last_mut().expect("frame stack never empty").insert(key, merged);
                changed = true;
            }
        }
        changed
    }

    pub fn push_loop_frame(&mut self) {
        self.loop_frames.push(self.frames.len() - 1);
    }

    pub fn pop_loop_frame(&mut self) {
        self.loop_frames.pop();
    }

    pub fn enter_try_frame(&mut self) {
        self.try_frames.insert(self.frames.len() - 1);
    }

    pub fn exit_try_frame(&mut self) {
        self.try_frames.remove(&(self.frames.len() - 1));
    }

    /// Marks the current path as diverging (return/raise/break/continue);
    /// subsequent statements on this path are unreachable and must not be
    /// type-checked as if they ran.
    pub fn unreachable(&mut self) {
        self.breaking_out = true;
    }

    /// `handle_break`: escapes to the frame the innermost loop was opened
    /// at, then marks the path unreachable.
    pub fn handle_break(&mut self) {
        if let Some(&index) = self.loop_frames.last() {
            self.allow_jump(index);
        }
        self.unreachable();
    }

    /// `handle_continue`: same escape target as `break` in this design —
    /// callers distinguish "resume the loop header" from "leave the loop"
    /// by which frame they resume checking from after the pop; the binder
    /// only needs to know that control leaves the current straight-line
    /// path.
    pub fn handle_continue(&mut self) {
        if let Some(&index) = self.loop_frames.last() {
            self.allow_jump(index);
        }
        self.unreachable();
    }

    /// Resets `breaking_out` on entry to a new straight-line region (e.g.
    /// the start of an `except` handler), mirroring mypy's
    /// `frame_context`'s save/restore of `breaking_out` around a nested
    /// `with` block.
    pub fn reset_breaking_out(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.breaking_out, value)
    }
}
