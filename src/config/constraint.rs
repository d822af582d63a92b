//! DECLARE constraint configuration structures

use serde::Deserialize;
use std::sync::Arc;

use crate::condition::{ConditionCache, ConditionNode};
use crate::error::{ConditionError, Result};

/// One DECLARE constraint with its data and time conditions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConstraintConfig {
    pub template: String,
    #[serde(default)]
    pub activities: Vec<String>,
    /// Condition on the activating event (`A.` attributes)
    #[serde(default)]
    pub activation: Option<String>,
    /// Condition relating activation and target (`T.` attributes)
    #[serde(default)]
    pub correlation: Option<String>,
    /// Time window `min,max,unit`
    #[serde(default)]
    pub time: Option<String>,
}

/// Unit of a time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "s" => Some(TimeUnit::Seconds),
            "m" => Some(TimeUnit::Minutes),
            "h" => Some(TimeUnit::Hours),
            "d" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}

/// Allowed distance between activation and target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub min: u64,
    pub max: u64,
    pub unit: TimeUnit,
}

impl TimeWindow {
    /// Parse `min,max,unit`, e.g. `0,120,s`
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        let [min, max, unit] = parts.as_slice() else {
            return Err(ConditionError::InvalidConstraint(format!(
                "time condition must be 'min,max,unit': {}",
                text
            )));
        };

        let bound = |value: &str| {
            value.parse::<u64>().map_err(|_| {
                ConditionError::InvalidConstraint(format!("invalid time bound '{}' in: {}", value, text))
            })
        };
        let min = bound(*min)?;
        let max = bound(*max)?;
        let unit = TimeUnit::from_str(unit).ok_or_else(|| {
            ConditionError::InvalidConstraint(format!("invalid time unit '{}' in: {}", unit, text))
        })?;

        if min > max {
            return Err(ConditionError::InvalidConstraint(format!(
                "time window minimum exceeds maximum: {}",
                text
            )));
        }

        if max.checked_mul(unit.seconds()).is_none() {
            return Err(ConditionError::InvalidConstraint(format!(
                "time window does not fit in seconds: {}",
                text
            )));
        }

        Ok(Self { min, max, unit })
    }

    /// Bounds converted to seconds, saturating at `u64::MAX`
    pub fn as_seconds(&self) -> (u64, u64) {
        let factor = self.unit.seconds();
        (self.min.saturating_mul(factor), self.max.saturating_mul(factor))
    }
}

/// Constraint with its conditions parsed
#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    pub template: String,
    pub activities: Vec<String>,
    pub activation: Option<Arc<ConditionNode>>,
    pub correlation: Option<Arc<ConditionNode>>,
    pub time: Option<TimeWindow>,
}

impl ConstraintConfig {
    /// Read a `.decl` constraint line: `Template[a, b] |activation |correlation |time`
    ///
    /// Missing or blank trailing segments leave the matching field empty.
    pub fn from_decl_line(line: &str) -> Result<Self> {
        let mut segments = line.split('|');
        let head = segments.next().unwrap_or_default().trim();

        let (template, activities) = head
            .strip_suffix(']')
            .and_then(|rest| rest.split_once('['))
            .ok_or_else(|| {
                ConditionError::InvalidConstraint(format!(
                    "expected 'Template[activities]': {}",
                    line
                ))
            })?;

        let template = template.trim();
        if template.is_empty() {
            return Err(ConditionError::InvalidConstraint(format!(
                "missing template name: {}",
                line
            )));
        }

        let activities = activities
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();

        let activation = segments.next().and_then(non_blank);
        let correlation = segments.next().and_then(non_blank);
        let time = segments.next().and_then(non_blank);

        if segments.next().is_some() {
            return Err(ConditionError::InvalidConstraint(format!(
                "too many '|' segments: {}",
                line
            )));
        }

        Ok(Self {
            template: template.to_string(),
            activities,
            activation,
            correlation,
            time,
        })
    }

    /// Parse the conditions and time window, failing on the first error
    pub fn compile(&self, cache: &ConditionCache) -> Result<CompiledConstraint> {
        let activation = self
            .activation
            .as_deref()
            .map(|c| cache.get_or_parse(c))
            .transpose()?;
        let correlation = self
            .correlation
            .as_deref()
            .map(|c| cache.get_or_parse(c))
            .transpose()?;
        let time = self.time.as_deref().map(TimeWindow::parse).transpose()?;

        Ok(CompiledConstraint {
            template: self.template.clone(),
            activities: self.activities.clone(),
            activation,
            correlation,
            time,
        })
    }
}

fn non_blank(segment: &str) -> Option<String> {
    let segment = segment.trim();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}
