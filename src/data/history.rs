// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Gallery of inpainting results, newest first.

use crate::pipeline::{DataUrl, Export, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Result as returned by the service
    pub data_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResultHistory {
    entries: Vec<HistoryEntry>,
}

impl ResultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result at the front.
    pub fn push(&mut self, data_url: String) {
        self.entries.insert(0, HistoryEntry { data_url });
    }

    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode entry `index` for download as `result-<index + 1>.<ext>`.
    pub fn download(&self, index: usize) -> Option<Result<Export, PipelineError>> {
        let entry = self.entries.get(index)?;
        Some(DataUrl::parse(&entry.data_url).map(|url| Export {
            file_name: format!("result-{}.{}", index + 1, url.extension()),
            bytes: url.bytes,
        }))
    }
}
