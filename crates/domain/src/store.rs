use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{DomainError, ImageId, ImagePayload, ImageRecord};

/// Natural key used to normalise the collection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Ingestion,
    FileName,
}

/// Ordered collection of images for one session.
///
/// Records are kept in ascending `order_index`, and after every operation the
/// indices are exactly `0..len`. At most one record is flagged as root.
#[derive(Debug, Default)]
pub struct ImageStore {
    records: Vec<ImageRecord>,
    last_id: u64,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, payload: ImagePayload) -> ImageId {
        self.last_id += 1;
        let id = ImageId::new(self.last_id);
        self.records.push(ImageRecord {
            id,
            order_index: self.records.len(),
            payload,
            is_root: false,
        });
        id
    }

    /// Removes the image at `index`. Removing the root leaves no root behind.
    pub fn remove(&mut self, index: usize) -> Result<ImageRecord, DomainError> {
        self.check_index(index)?;
        let (records, removed) = reindex_after_removal(std::mem::take(&mut self.records), index)?;
        self.records = records;
        Ok(removed)
    }

    pub fn set_root(&mut self, id: ImageId) -> Result<(), DomainError> {
        if self.position_of(id).is_none() {
            return Err(DomainError::NotFound(id));
        }
        for record in &mut self.records {
            record.is_root = record.id == id;
        }
        Ok(())
    }

    /// Rewrites the order so that `sequence[i]` ends up at index `i`.
    ///
    /// The sequence must name every current id exactly once; otherwise nothing
    /// is changed.
    pub fn apply_order(&mut self, sequence: &[ImageId]) -> Result<(), DomainError> {
        if sequence.len() != self.records.len() {
            return Err(DomainError::InvalidPermutation(format!(
                "expected {} ids, got {}",
                self.records.len(),
                sequence.len()
            )));
        }

        let positions: HashMap<ImageId, usize> = self
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id, position))
            .collect();
        let mut seen = HashSet::with_capacity(sequence.len());
        for id in sequence {
            if !positions.contains_key(id) {
                return Err(DomainError::InvalidPermutation(format!(
                    "unknown image {id}"
                )));
            }
            if !seen.insert(*id) {
                return Err(DomainError::InvalidPermutation(format!(
                    "image {id} appears more than once"
                )));
            }
        }

        let mut slots: Vec<Option<ImageRecord>> = std::mem::take(&mut self.records)
            .into_iter()
            .map(Some)
            .collect();
        self.records = sequence
            .iter()
            .filter_map(|id| slots[positions[id]].take())
            .collect();
        self.reindex();
        Ok(())
    }

    /// Stable sort by `key`, then re-derive every index.
    pub fn sort_ascending(&mut self, key: SortKey) {
        match key {
            SortKey::Ingestion => self.records.sort_by_key(|record| record.id),
            SortKey::FileName => self
                .records
                .sort_by(|a, b| a.payload.file_name.cmp(&b.payload.file_name)),
        }
        self.reindex();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn find(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn position_of(&self, id: ImageId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn root(&self) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.is_root)
    }

    /// Current ids in ascending `order_index`.
    pub fn ids(&self) -> Vec<ImageId> {
        self.records.iter().map(|record| record.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    pub fn data_url(&self, index: usize) -> Result<String, DomainError> {
        self.check_index(index)?;
        Ok(self.records[index].payload.data_url())
    }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.records.len() {
            return Err(DomainError::OutOfRange {
                index,
                count: self.records.len(),
            });
        }
        Ok(())
    }

    fn reindex(&mut self) {
        for (position, record) in self.records.iter_mut().enumerate() {
            record.order_index = position;
        }
    }
}

/// Removes the record at `index` from a dense, ordered collection and shifts
/// every later record down by one.
pub fn reindex_after_removal(
    mut records: Vec<ImageRecord>,
    index: usize,
) -> Result<(Vec<ImageRecord>, ImageRecord), DomainError> {
    if index >= records.len() {
        return Err(DomainError::OutOfRange {
            index,
            count: records.len(),
        });
    }

    let removed = records.remove(index);
    for record in &mut records[index..] {
        record.order_index -= 1;
    }
    Ok((records, removed))
}
