// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory tracking of named conditions on the samples Config status.

use crate::types::samples_config::{ConditionStatus, SamplesConfig, SamplesConfigCondition};
use chrono::Utc;

impl SamplesConfig {
    /// Get a condition by type, or an empty `Unknown` condition if it was never set
    pub fn condition(&self, condition_type: &str) -> SamplesConfigCondition {
        self.status
            .as_ref()
            .and_then(|s| {
                s.conditions
                    .iter()
                    .find(|c| c.condition_type == condition_type)
            })
            .cloned()
            .unwrap_or_else(|| SamplesConfigCondition {
                condition_type: condition_type.to_string(),
                ..Default::default()
            })
    }

    pub fn condition_true(&self, condition_type: &str) -> bool {
        self.condition(condition_type).status == ConditionStatus::True
    }

    /// Insert or update a condition, stamping the update time. The transition time
    /// only moves when the status changes.
    pub fn set_condition(&mut self, condition_type: &str, status: ConditionStatus, message: &str) {
        let now = Utc::now();
        let conditions = &mut self.status.get_or_insert_with(Default::default).conditions;

        match conditions
            .iter_mut()
            .find(|c| c.condition_type == condition_type)
        {
            Some(existing) => {
                if existing.status != status {
                    existing.last_transition_time = Some(now);
                }
                existing.status = status;
                existing.message = message.to_string();
                existing.last_update_time = Some(now);
            }
            None => conditions.push(SamplesConfigCondition {
                condition_type: condition_type.to_string(),
                status,
                last_update_time: Some(now),
                last_transition_time: Some(now),
                message: message.to_string(),
            }),
        }
    }

    /// Set a condition on the success path; the message is cleared so a later
    /// error is always reported.
    pub fn good_condition_update(&mut self, condition_type: &str, status: ConditionStatus) {
        self.set_condition(condition_type, status, "");
    }

    /// Record an error on a condition. Duplicate reports of the same status and
    /// message leave the condition untouched.
    pub fn report_condition_error(
        &mut self,
        condition_type: &str,
        status: ConditionStatus,
        message: &str,
    ) {
        let current = self.condition(condition_type);
        if current.status != status || current.message != message {
            self.set_condition(condition_type, status, message);
        }
    }
}
