//! Endpoint selection policies
//!
//! A policy only chooses; it never touches transaction state, so strategies
//! can be swapped without affecting the transaction engine.

use crate::endpoint::Endpoint;
use meridian_core::Error;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Chooses the endpoint for the next call
pub trait SelectionPolicy: Send + Sync + fmt::Debug {
    /// Pick one of `endpoints`, or `None` if the slice is empty
    fn select<'a>(&self, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint>;
}

/// Independent, uniformly random choice per call
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelection;

impl SelectionPolicy for RandomSelection {
    fn select<'a>(&self, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
        if endpoints.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..endpoints.len());
        endpoints.get(idx)
    }
}

/// Cycles through endpoints in registration order
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl RoundRobin {
    /// Start at the first endpoint
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionPolicy for RoundRobin {
    fn select<'a>(&self, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
        if endpoints.is_empty() {
            return None;
        }
        let turn = self.next.fetch_add(1, Ordering::Relaxed);
        endpoints.get(turn % endpoints.len())
    }
}

/// Named policy, as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// [`RandomSelection`]
    #[default]
    Random,
    /// [`RoundRobin`]
    RoundRobin,
}

impl Selection {
    /// Instantiate the policy
    pub fn build(self) -> Box<dyn SelectionPolicy> {
        match self {
            Selection::Random => Box::new(RandomSelection),
            Selection::RoundRobin => Box::new(RoundRobin::new()),
        }
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Selection::Random),
            "round_robin" => Ok(Selection::RoundRobin),
            other => Err(Error::Config(format!(
                "Invalid selection policy '{}'. Expected \"random\" or \"round_robin\".",
                other
            ))),
        }
    }
}
