//! oracle::layout — where parameters, inputs, and outputs live in the session.
//!
//! Purpose
//! -------
//! Map the calibration's logical quantities (reaction slots, component names)
//! onto hierarchical session paths. Every path is built by appending a key to
//! a caller-supplied [`PathTemplate`]; nothing about the simulation tree is
//! hard-coded here.
//!
//! Key behaviors
//! -------------
//! - Parameter `2i` goes to `pre_exp + slot[i]`, parameter `2i + 1` to
//!   `act_energy + slot[i]`.
//! - Input components resolve against `write_base` under
//!   [`InputAddressing::Uniform`]. [`InputAddressing::Legacy`] reproduces the
//!   older convention where the first few input components lived under a
//!   separate feed block.
//! - Output components always resolve against `read_base`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `slots` is non-empty and free of duplicates; checked by
//!   [`OracleLayout::new`].
//! - Templates are plain prefixes: no separator is inserted between base and
//!   key.
use std::collections::HashSet;

use crate::oracle::errors::{OracleError, OracleResult};

/// A path prefix to which a key is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    base: String,
}

impl PathTemplate {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `base + key`.
    pub fn resolve(&self, key: &str) -> String {
        let mut path = String::with_capacity(self.base.len() + key.len());
        path.push_str(&self.base);
        path.push_str(key);
        path
    }
}

/// Opaque key identifying one reaction's parameter pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionSlot(String);

impl ReactionSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReactionSlot {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ReactionSlot {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// How input component names are turned into write paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputAddressing {
    /// Every input component resolves against `write_base`.
    #[default]
    Uniform,
    /// The first `leading_count` input components resolve against
    /// `leading_base`; the rest against `write_base`.
    Legacy { leading_base: PathTemplate, leading_count: usize },
}

/// Number of input components routed to the feed block in legacy addressing.
pub const LEGACY_LEADING_COUNT: usize = 2;

/// Full addressing scheme for one simulation archive.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleLayout {
    pre_exp: PathTemplate,
    act_energy: PathTemplate,
    slots: Vec<ReactionSlot>,
    write_base: PathTemplate,
    read_base: PathTemplate,
    input_addressing: InputAddressing,
}

impl OracleLayout {
    /// Build a layout with [`InputAddressing::Uniform`].
    ///
    /// # Errors
    /// [`OracleError::InvalidLayout`] if `slots` is empty or holds duplicates.
    pub fn new(
        pre_exp: PathTemplate, act_energy: PathTemplate, slots: Vec<ReactionSlot>,
        write_base: PathTemplate, read_base: PathTemplate,
    ) -> OracleResult<Self> {
        if slots.is_empty() {
            return Err(OracleError::InvalidLayout {
                reason: "at least one reaction slot is required".to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(slots.len());
        for slot in &slots {
            if !seen.insert(slot.key()) {
                return Err(OracleError::InvalidLayout {
                    reason: format!("duplicate reaction slot '{}'", slot.key()),
                });
            }
        }
        Ok(Self {
            pre_exp,
            act_energy,
            slots,
            write_base,
            read_base,
            input_addressing: InputAddressing::Uniform,
        })
    }

    /// Replace the input addressing mode.
    pub fn with_input_addressing(mut self, addressing: InputAddressing) -> Self {
        self.input_addressing = addressing;
        self
    }

    pub fn slots(&self) -> &[ReactionSlot] {
        &self.slots
    }

    pub fn input_addressing(&self) -> &InputAddressing {
        &self.input_addressing
    }

    /// Required parameter vector length: two entries per slot.
    pub fn n_params(&self) -> usize {
        2 * self.slots.len()
    }

    /// Write paths of `slot`: (pre-exponential, activation energy).
    pub fn slot_paths(&self, slot: &ReactionSlot) -> (String, String) {
        (self.pre_exp.resolve(slot.key()), self.act_energy.resolve(slot.key()))
    }

    /// Write path for the `position`-th input component named `component`.
    pub fn input_path(&self, position: usize, component: &str) -> String {
        match &self.input_addressing {
            InputAddressing::Legacy { leading_base, leading_count } if position < *leading_count => {
                leading_base.resolve(component)
            }
            _ => self.write_base.resolve(component),
        }
    }

    /// Read path for output component `component`.
    pub fn output_path(&self, component: &str) -> String {
        self.read_base.resolve(component)
    }
}
