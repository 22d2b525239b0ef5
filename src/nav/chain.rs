/**
 * ============================================================================
 * NAVIGATION CHAIN TRACKER
 * ============================================================================
 *
 * PURPOSE: Maintain the session's navigation chain as the user moves
 *          between modules
 *
 * CHAIN FORMAT:
 * Entries serialize as class:module:step:clickPoint:timestamp:: and join
 * with commas. Interior runs of 3+ consecutive same-module entries render
 * as a single TRUNCATEDx<N> marker; the full entries are kept internally so
 * a back move always restores the exact prior serialized form.
 *
 * TRANSITION RULES:
 * - Validation (edge legality, required contextual options) happens before
 *   any mutation; root tab click points skip it
 * - An unresolvable display class bumps the step counter only
 * - "back" restores the state captured before the previous move, or drops
 *   the newest entry when several backs stack up
 * - Reset modules (the feed-like roots) clear the chain and restart the
 *   step counter at their configured value
 *
 * ============================================================================
 */

use crate::clock;
use crate::error::TelemetryError;
use crate::nav::{graph, registry};
use std::collections::HashMap;

/**
 * One chain entry, kept structured until serialization
 */
#[derive(Debug, Clone, PartialEq)]
struct NavEntry {
    display_class: String,
    module: String,
    step: u32,
    click_point: String,
    timestamp: String,
}

impl NavEntry {
    fn serialize(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}::",
            self.display_class, self.module, self.step, self.click_point, self.timestamp
        )
    }
}

/**
 * Session-scoped navigation state
 */
#[derive(Debug, Default)]
pub struct NavChainTracker {
    entries: Vec<NavEntry>,
    step: u32,
    prev_display_class: Option<String>,
    sequence: u64,
    // State captured before the most recent move, consumed by one "back"
    undo: Option<(Vec<NavEntry>, u32)>,
}

impl NavChainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Serialized chain with interior same-module runs collapsed
     */
    pub fn chain(&self) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            let module = &self.entries[i].module;
            let mut run_end = i + 1;
            while run_end < self.entries.len() && self.entries[run_end].module == *module {
                run_end += 1;
            }
            let run_len = run_end - i;
            // Terminal runs stay expanded; only runs with a follower collapse
            if run_len >= 3 && run_end < self.entries.len() {
                segments.push(format!("TRUNCATEDx{}", run_len));
            } else {
                for entry in &self.entries[i..run_end] {
                    segments.push(entry.serialize());
                }
            }
            i = run_end;
        }
        segments.join(",")
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn prev_display_class(&self) -> Option<&str> {
        self.prev_display_class.as_deref()
    }

    /**
     * Apply one navigation move and return the resulting serialized chain
     *
     * The class selector, when a module has several display classes, rides
     * in the options map under "class_selector".
     */
    pub fn transition(
        &mut self,
        from: &str,
        to: &str,
        click_point: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, TelemetryError> {
        if !registry::is_root_click_point(click_point) {
            validate_path(from, to, click_point)?;
            validate_options(from, to, options)?;
        }

        if click_point != "back" {
            self.undo = Some((self.entries.clone(), self.step));
        }

        let selector = options.get("class_selector").map(String::as_str);
        let display_class = match registry::resolve_display_class(to, selector) {
            Some(class) => class,
            None => {
                // No class to embed: the move happened, the chain cannot show it
                log::debug!("no display class for module '{}', step-only move", to);
                self.step += 1;
                return Ok(self.chain());
            }
        };

        if click_point == "back" {
            match self.undo.take() {
                Some((entries, step)) => {
                    self.entries = entries;
                    self.step = step;
                }
                None => {
                    self.entries.pop();
                    self.step = self.step.saturating_sub(1);
                }
            }
        } else if let Some(start) = registry::reset_step(to) {
            self.entries.clear();
            self.step = start;
            self.push_entry(display_class, to, click_point);
        } else {
            self.step += 1;
            self.push_entry(display_class, to, click_point);
        }

        self.prev_display_class = Some(display_class.to_string());
        self.sequence += 1;
        Ok(self.chain())
    }

    fn push_entry(&mut self, display_class: &str, module: &str, click_point: &str) {
        self.entries.push(NavEntry {
            display_class: display_class.to_string(),
            module: module.to_string(),
            step: self.step,
            click_point: click_point.to_string(),
            timestamp: clock::high_precision_now(),
        });
    }
}

/**
 * Reject moves that are not edges of the transition graph
 * Root tab click points never reach this check
 */
pub fn validate_path(from: &str, to: &str, click_point: &str) -> Result<(), TelemetryError> {
    if registry::is_root_click_point(click_point) {
        return Ok(());
    }
    if graph::find_edge(from, to).is_none() {
        return Err(TelemetryError::InvalidNavigation {
            from: from.to_string(),
            to: to.to_string(),
            reason: format!("no edge in the transition graph (click point '{}')", click_point),
        });
    }
    Ok(())
}

/**
 * Reject moves missing a contextual option their edge requires
 */
pub fn validate_options(
    from: &str,
    to: &str,
    options: &HashMap<String, String>,
) -> Result<(), TelemetryError> {
    let Some(edge) = graph::find_edge(from, to) else {
        return Ok(());
    };
    for key in edge.required_options {
        if !options.contains_key(*key) {
            return Err(TelemetryError::InvalidNavigation {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("missing required option '{}'", key),
            });
        }
    }
    Ok(())
}
