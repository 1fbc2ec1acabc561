//! Checks that targets sharing a build environment agree on environment critical options.

use std::fmt;

use tr_cfg::OptionValue;
use tr_types::TargetIdentity;

use crate::environment::EnvironmentGroup;
use crate::Error;

/// One target's value for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub target: TargetIdentity,
    pub value: OptionValue,
}

/// A target that disagrees with the rest of its build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub option: &'static str,
    /// Value most of the group agrees on.
    pub baseline: Divergence,
    pub outlier: Divergence,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' has {}, '{}' has {}",
            self.option,
            self.baseline.target.name(),
            self.baseline.value,
            self.outlier.target.name(),
            self.outlier.value,
        )
    }
}

/// What happens when a group has violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Violations fail the group.
    Enforce,
    /// Violations are logged.
    Warn,
}

impl ValidationPolicy {
    /// A group is lenient if any member asked to override its build environment.
    pub fn for_group(group: &EnvironmentGroup) -> Self {
        if group
            .members()
            .iter()
            .any(|member| member.overrides_build_environment())
        {
            ValidationPolicy::Warn
        } else {
            ValidationPolicy::Enforce
        }
    }
}

/// Compare every environment critical option across the members of `group`.
///
/// For each option the most common value is the baseline, ties go to the value of the first
/// member. Every member with a different value produces one [`Violation`].
pub fn validate(group: &EnvironmentGroup) -> Vec<Violation> {
    let members = group.members();
    let Some(first) = members.first() else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    for (option, _) in first.environment_critical() {
        let values: Vec<Option<&OptionValue>> = members
            .iter()
            .map(|member| member.get(option).ok())
            .collect();

        // Count in member order so ties resolve to the earliest member.
        let mut counts: Vec<(&OptionValue, usize, usize)> = Vec::new();
        for (idx, value) in values.iter().enumerate() {
            let Some(value) = value else { continue };
            match counts.iter_mut().find(|(seen, _, _)| seen == value) {
                Some((_, count, _)) => *count += 1,
                None => counts.push((*value, 1, idx)),
            }
        }
        let Some((baseline_value, _, baseline_idx)) = counts
            .iter()
            .copied()
            .max_by(|(_, a_count, a_idx), (_, b_count, b_idx)| {
                a_count.cmp(b_count).then(b_idx.cmp(a_idx))
            })
        else {
            continue;
        };

        for (idx, value) in values.iter().enumerate() {
            let Some(value) = value else { continue };
            if *value != baseline_value {
                violations.push(Violation {
                    option,
                    baseline: Divergence {
                        target: members[baseline_idx].identity().clone(),
                        value: baseline_value.clone(),
                    },
                    outlier: Divergence {
                        target: members[idx].identity().clone(),
                        value: (*value).clone(),
                    },
                });
            }
        }
    }
    violations
}

/// Outcome of validating one build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group: EnvironmentGroup,
    pub policy: ValidationPolicy,
    pub violations: Vec<Violation>,
}

impl GroupReport {
    /// Validate `group` and log any violations.
    pub fn check(group: EnvironmentGroup) -> Self {
        let policy = ValidationPolicy::for_group(&group);
        let violations = validate(&group);

        for violation in &violations {
            match policy {
                ValidationPolicy::Warn => tracing::warn!(
                    group = %group.key(),
                    option = violation.option,
                    "build environment conflict allowed by override: {violation}"
                ),
                ValidationPolicy::Enforce => tracing::debug!(
                    group = %group.key(),
                    option = violation.option,
                    "build environment conflict: {violation}"
                ),
            }
        }

        GroupReport {
            group,
            policy,
            violations,
        }
    }

    /// Returns true if this group stops the plan.
    pub fn is_fatal(&self) -> bool {
        self.policy == ValidationPolicy::Enforce && !self.violations.is_empty()
    }

    /// Error for this group, if it is fatal.
    pub fn to_error(&self) -> Option<Error> {
        self.is_fatal().then(|| Error::EnvironmentViolation {
            group: self.group.key().clone(),
            violations: self.violations.clone(),
        })
    }
}
