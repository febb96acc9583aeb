// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Status line shown next to the erase control.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessingStatus {
    #[default]
    Idle,
    /// A request is in flight; the erase control is disabled
    Processing { started: DateTime<Utc> },
    Done,
    Failed(String),
}

impl ProcessingStatus {
    pub fn start() -> Self {
        ProcessingStatus::Processing {
            started: Utc::now(),
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ProcessingStatus::Processing { .. })
    }

    /// Text to show at `now`, or `None` when there is nothing to report.
    pub fn message_at(&self, now: DateTime<Utc>) -> Option<String> {
        match self {
            ProcessingStatus::Idle => None,
            ProcessingStatus::Processing { started } => {
                let secs = (now - *started).num_seconds().max(0);
                Some(format!("Processing: {secs} s"))
            }
            ProcessingStatus::Done => Some("Done".to_string()),
            ProcessingStatus::Failed(message) => Some(message.clone()),
        }
    }

    pub fn message(&self) -> Option<String> {
        self.message_at(Utc::now())
    }
}
