//! Per-chart visibility state: series key -> shown/hidden.
//!
//! One map per chart instance. The transition is a pure command (`toggle`) that returns the
//! next map; hosts that keep a single owned map can use `toggle_in_place` instead.

use crate::error::{ChartError, ChartResult};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityMap {
    shown: BTreeMap<String, bool>,
}

impl VisibilityMap {
    /// Every key starts visible.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shown: keys.into_iter().map(|k| (k.into(), true)).collect(),
        }
    }

    /// Unknown keys read as hidden; they can never be drawn because they cannot be toggled on.
    pub fn is_visible(&self, key: &str) -> bool {
        self.shown.get(key).copied().unwrap_or(false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shown.contains_key(key)
    }

    /// Next state with `key` flipped and every other key unchanged.
    pub fn toggle(&self, key: &str) -> ChartResult<VisibilityMap> {
        let mut next = self.clone();
        next.toggle_in_place(key)?;
        Ok(next)
    }

    /// Flip `key` on this map; returns the new visibility of that key.
    pub fn toggle_in_place(&mut self, key: &str) -> ChartResult<bool> {
        match self.shown.get_mut(key) {
            Some(v) => {
                *v = !*v;
                Ok(*v)
            }
            None => Err(ChartError::UnknownSeries(key.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.shown.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn hidden_count(&self) -> usize {
        self.shown.values().filter(|v| !**v).count()
    }
}
