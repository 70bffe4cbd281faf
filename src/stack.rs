//! EVM operand stack.

use crate::error::{Error, Result};
use crate::u256::U256;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

const LIMIT: usize = 1024;

/// Ordered sequence of `U256`. Position 0 is the top (most recently
/// pushed). Deep-cloned on `Clone` (an `ArrayVec` clone is already a full
/// copy), which satisfies the copy-on-write contract's "deep clone is
/// simplest" alternative.
///
/// JSON encoding is a plain array in internal (bottom-to-top) order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack(ArrayVec<U256, LIMIT>);

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn limit() -> usize {
        LIMIT
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn index_from_top(&self, offset: usize) -> Result<usize> {
        if offset >= self.0.len() {
            return Err(Error::StackUnderflow);
        }
        Ok(self.0.len() - 1 - offset)
    }

    /// Reads the item `offset` positions from the top (0 = top).
    pub fn get(&self, offset: usize) -> Result<&U256> {
        Ok(&self.0[self.index_from_top(offset)?])
    }

    pub fn push(&mut self, value: U256) -> Result<()> {
        if self.0.len() >= LIMIT {
            return Err(Error::StackOverflow);
        }
        self.0.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<U256> {
        self.0.pop().ok_or(Error::StackUnderflow)
    }

    /// Swaps the top item with the item `offset` positions from the top.
    pub fn swap_top(&mut self, offset: usize) -> Result<()> {
        let idx = self.index_from_top(offset)?;
        let top = self.0.len() - 1;
        self.0.swap(top, idx);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &U256> {
        self.0.iter().rev()
    }
}
