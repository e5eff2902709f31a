//! Declaration guard
//!
//! Inspects top-level declarations as they stream in from the parser:
//! enforces the reserved-prefix policy on user functions and hands
//! externally linked function bodies to the reference-count annotator.
//! Synthesized declarations (the static cleanup function) re-enter through
//! an explicit worklist instead of a recursive call, and are checked
//! exactly like parsed ones.

use std::collections::VecDeque;
use log::trace;
use rsc_common::ErrorReporter;
use rsc_frontend::refcount::RefCountVisitor;
use rsc_frontend::{FunctionDefinition, TopLevelItem};
use crate::naming::RESERVED_FUNCTION_PREFIX;

pub struct DeclarationGuard {
    allow_rs_prefix: bool,
    pending: VecDeque<TopLevelItem>,
}

impl DeclarationGuard {
    pub fn new(allow_rs_prefix: bool) -> Self {
        Self {
            allow_rs_prefix,
            pending: VecDeque::new(),
        }
    }

    /// Process one group of sibling top-level declarations
    pub fn check_items(
        &mut self,
        items: &mut [TopLevelItem],
        refcount: &mut RefCountVisitor,
        reporter: &mut ErrorReporter,
    ) {
        // Disallow user-defined functions with the reserved prefix
        if !self.allow_rs_prefix {
            for item in items.iter() {
                if let TopLevelItem::Function(fd) = item {
                    self.check_reserved_prefix(fd, reporter);
                }
            }
        }

        // Process any externally linked function definitions
        for item in items.iter_mut() {
            if let TopLevelItem::Function(fd) = item {
                if fd.is_global() {
                    refcount.annotate(fd);
                }
            }
        }
    }

    fn check_reserved_prefix(&self, fd: &FunctionDefinition, reporter: &mut ErrorReporter) {
        if !fd.name.starts_with(RESERVED_FUNCTION_PREFIX) {
            return;
        }
        if fd.is_in_system_header() {
            return;
        }
        reporter.error(
            format!(
                "invalid function name prefix, \"{}\" is reserved: '{}'",
                RESERVED_FUNCTION_PREFIX, fd.name
            ),
            fd.span.clone(),
        );
    }

    /// Queue a synthesized declaration for re-injection
    pub fn enqueue(&mut self, item: TopLevelItem) {
        self.pending.push_back(item);
    }

    /// Drain the worklist, running every queued declaration through the
    /// same checks as parsed ones, and return them for inclusion in the
    /// unit.
    pub fn drain(
        &mut self,
        refcount: &mut RefCountVisitor,
        reporter: &mut ErrorReporter,
    ) -> Vec<TopLevelItem> {
        let mut processed = Vec::with_capacity(self.pending.len());
        while let Some(item) = self.pending.pop_front() {
            if let TopLevelItem::Function(fd) = &item {
                trace!("re-injecting synthesized declaration '{}'", fd.name);
            }
            let mut group = [item];
            self.check_items(&mut group, refcount, reporter);
            let [item] = group;
            processed.push(item);
        }
        processed
    }
}
