//! Realized column tracking for column virtualization.
//!
//! When only a window of columns has live elements, the realized elements sit
//! in a flat list while their logical column indices have gaps. A
//! [`RealizedColumnsBlock`] describes one contiguous run of realized columns
//! together with the number of realized columns before it, so a logical index
//! maps to its position in the flat list without rescanning earlier runs.
//!
//! Blocks are produced by the virtualization host. This module only reads
//! them and merges blocks that touch or overlap so the list stays sorted by
//! start index and pairwise disjoint.

use tracing::trace;

/// A contiguous run of realized logical columns, `[start_index, end_index]`
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizedColumnsBlock {
    pub start_index: usize,
    pub end_index: usize,
    /// Realized columns that come before this block.
    pub start_index_offset: usize,
}

impl RealizedColumnsBlock {
    pub fn new(start_index: usize, end_index: usize, start_index_offset: usize) -> Self {
        Self {
            start_index,
            end_index,
            start_index_offset,
        }
    }

    /// Number of columns in the block.
    pub fn column_count(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

/// The realized column blocks of one virtualized grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealizedColumns {
    blocks: Vec<RealizedColumnsBlock>,
}

impl RealizedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take blocks from the virtualization host, merging any that touch.
    pub fn from_blocks(blocks: Vec<RealizedColumnsBlock>) -> Self {
        Self {
            blocks: merge_blocks(blocks),
        }
    }

    /// Build blocks and offsets from an arbitrary set of realized indices.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();

        let mut blocks: Vec<RealizedColumnsBlock> = Vec::new();
        let mut realized = 0;
        for index in indices {
            match blocks.last_mut() {
                Some(last) if last.end_index + 1 == index => last.end_index = index,
                _ => blocks.push(RealizedColumnsBlock::new(index, index, realized)),
            }
            realized += 1;
        }

        Self { blocks }
    }

    pub fn blocks(&self) -> &[RealizedColumnsBlock] {
        &self.blocks
    }

    /// Replace the blocks after a bulk realization.
    pub fn set_blocks(&mut self, blocks: Vec<RealizedColumnsBlock>) {
        self.blocks = merge_blocks(blocks);
    }

    /// Total realized columns across all blocks.
    pub fn realized_count(&self) -> usize {
        self.blocks.iter().map(RealizedColumnsBlock::column_count).sum()
    }

    pub fn is_realized(&self, logical_index: usize) -> bool {
        self.translate_logical_to_realized(logical_index).is_some()
    }

    /// Position of a logical column in the realized element list, or `None`
    /// when the column is not currently realized.
    pub fn translate_logical_to_realized(&self, logical_index: usize) -> Option<usize> {
        for block in &self.blocks {
            if logical_index < block.start_index {
                break;
            }
            if logical_index <= block.end_index {
                return Some(block.start_index_offset + (logical_index - block.start_index));
            }
        }
        trace!(logical_index, "column not realized");
        None
    }

    /// Logical column index of a position in the realized element list.
    pub fn translate_realized_to_logical(&self, realized_position: usize) -> Option<usize> {
        self.blocks.iter().find_map(|block| {
            let offset = realized_position.checked_sub(block.start_index_offset)?;
            (offset < block.column_count()).then(|| block.start_index + offset)
        })
    }
}

/// Sort blocks by start index and merge every pair that overlaps or is
/// adjacent. A merged block keeps the offset of the block that started first.
pub fn merge_blocks(mut blocks: Vec<RealizedColumnsBlock>) -> Vec<RealizedColumnsBlock> {
    blocks.sort_by_key(|b| (b.start_index, b.start_index_offset));

    let mut merged: Vec<RealizedColumnsBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        // Inverted ranges from the host collapse to their start column.
        let block = RealizedColumnsBlock {
            end_index: block.end_index.max(block.start_index),
            ..block
        };

        match merged.last_mut() {
            Some(last) if block.start_index <= last.end_index.saturating_add(1) => {
                trace!(
                    first = ?last,
                    second = ?block,
                    "merging realized column blocks"
                );
                last.end_index = last.end_index.max(block.end_index);
            }
            _ => merged.push(block),
        }
    }

    merged
}
