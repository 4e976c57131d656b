//! Name pool carried between meetings
//!
//! Workbook PDFs print the principal-room names of a meeting at the bottom
//! of the previous meeting's block. The pool holds those loose names in
//! document order until the next meeting consumes them.

use std::collections::VecDeque;

use serde::Serialize;

use super::names::is_name_shaped;
use crate::text::Line;

/// Ordered queue of candidate names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamePool {
    names: VecDeque<String>,
}

/// Result of draining names from the front of a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    pub consumed: Vec<String>,
    pub remaining: NamePool,
}

impl NamePool {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Pool for the first meeting: name-shaped lines before the first header
    pub fn from_preamble(lines: &[Line]) -> Self {
        Self::new(
            lines
                .iter()
                .map(Line::as_str)
                .filter(|l| is_name_shaped(l) && !l.contains("Sala B"))
                .map(str::to_string),
        )
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn peek(&self) -> Option<&str> {
        self.names.front().map(String::as_str)
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop_front()
    }

    /// Take up to `count` names from the front.
    ///
    /// Returns fewer when the pool runs out.
    pub fn drain(mut self, count: usize) -> Drained {
        let take = count.min(self.names.len());
        let consumed = self.names.drain(..take).collect();
        Drained {
            consumed,
            remaining: self,
        }
    }
}

/// Name-shaped lines of a meeting block, excluding the study line
pub fn loose_names(block: &[Line]) -> Vec<String> {
    block
        .iter()
        .map(Line::as_str)
        .filter(|l| is_name_shaped(l) && !l.contains("Estudo Bíblico de Congregação"))
        .map(str::to_string)
        .collect()
}
