//! Posting lists: the per-word sets of document IDs, and the linear
//! merge operations behind the boolean query engine.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;
use crate::{DocId, MAX_DOC_ID};

/// An ascending, duplicate-free list of document IDs.
///
/// AND, OR and "AND NOT" are all in-place O(n+m) merges over two sorted
/// lists; no allocation happens beyond the merged output buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    ids: Vec<DocId>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList { ids: Vec::new() }
    }

    /// Append a doc ID.
    ///
    /// The indexer hands out IDs in ascending order and processes one
    /// document at a time, so a duplicate can only ever be the most
    /// recent entry; appending the current last ID again is a no-op.
    pub fn append(&mut self, id: DocId) {
        if self.ids.last() == Some(&id) {
            return;
        }
        debug_assert!(self.ids.last().map_or(true, |&last| last < id));
        self.ids.push(id);
    }

    /// Reset to the empty set.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }

    /// Keep only IDs present in both this list and `other`.
    pub fn intersect_with(&mut self, other: &PostingList) {
        let mut merged = Vec::with_capacity(self.ids.len().min(other.ids.len()));
        let mut aa = 0;
        let mut bb = 0;
        while aa < self.ids.len() && bb < other.ids.len() {
            if self.ids[aa] == other.ids[bb] {
                merged.push(self.ids[aa]);
                aa += 1;
                bb += 1;
            } else if self.ids[aa] < other.ids[bb] {
                aa += 1;
            } else {
                bb += 1;
            }
        }
        self.ids = merged;
    }

    /// Keep only IDs absent from `other` ("and not"). The count never
    /// grows.
    pub fn intersect_with_not(&mut self, other: &PostingList) {
        let mut merged = Vec::with_capacity(self.ids.len());
        let mut bb = 0;
        for &id in &self.ids {
            // Advance bb to the next possible conflict.
            while bb < other.ids.len() && other.ids[bb] < id {
                bb += 1;
            }
            if bb < other.ids.len() && other.ids[bb] == id {
                bb += 1;
            } else {
                merged.push(id);
            }
        }
        self.ids = merged;
    }

    /// Merge in every ID from `other`, keeping the list ascending and
    /// duplicate-free.
    pub fn union_with(&mut self, other: &PostingList) {
        let mut merged = Vec::with_capacity(self.ids.len() + other.ids.len());
        let mut aa = 0;
        let mut bb = 0;
        while aa < self.ids.len() || bb < other.ids.len() {
            if aa >= self.ids.len() {
                merged.push(other.ids[bb]);
                bb += 1;
            } else if bb >= other.ids.len() {
                merged.push(self.ids[aa]);
                aa += 1;
            } else if self.ids[aa] < other.ids[bb] {
                merged.push(self.ids[aa]);
                aa += 1;
            } else if self.ids[aa] > other.ids[bb] {
                merged.push(other.ids[bb]);
                bb += 1;
            } else {
                // Both lists carry this ID; take it once.
                merged.push(self.ids[aa]);
                aa += 1;
                bb += 1;
            }
        }
        self.ids = merged;
    }

    /// Write the list in its on-disk form: one big-endian 2-byte code
    /// unit per ID, stored as `id + 1` so zero never appears, followed
    /// by a zero terminator.
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for &id in &self.ids {
            debug_assert!(id <= MAX_DOC_ID);
            out.write_u16::<BigEndian>(id as u16 + 1)?;
        }
        out.write_u16::<BigEndian>(0)?;
        Ok(())
    }

    /// Read a list from its on-disk form, consuming up to and including
    /// the zero terminator.
    pub(crate) fn read_from<R: Read>(input: &mut R) -> Result<PostingList> {
        let mut list = PostingList::new();
        loop {
            let unit = input.read_u16::<BigEndian>()?;
            if unit == 0 {
                break;
            }
            list.append(DocId::from(unit - 1));
        }
        Ok(list)
    }

    /// Number of bytes `write_to` produces for this list.
    pub(crate) fn encoded_len(&self) -> u64 {
        2 * (self.ids.len() as u64 + 1)
    }
}

impl FromIterator<DocId> for PostingList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        let mut list = PostingList::new();
        for id in iter {
            list.append(id);
        }
        list
    }
}
