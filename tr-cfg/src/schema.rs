use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use tr_ore::assert_none;

use crate::{DefaultValue, OptionDescriptor, OptionKind, SchemaError, TargetOption};

/// A thread-safe shareable set of [`OptionDescriptor`]s.
#[derive(Clone, Debug)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

#[derive(Debug)]
struct SchemaInner {
    /// Options in the order they were registered.
    declared: Vec<&'static OptionDescriptor>,
    by_name: BTreeMap<&'static str, usize>,
    /// Indexes into `declared`, every option comes after the options its default reads.
    order: Vec<usize>,
}

impl Schema {
    /// Returns a new [`SchemaBuilder`].
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Returns the declaration of the option named `name`.
    pub fn describe(&self, name: &str) -> Result<&'static OptionDescriptor, SchemaError> {
        self.inner
            .by_name
            .get(name)
            .map(|idx| self.inner.declared[*idx])
            .ok_or_else(|| SchemaError::UnknownOption {
                name: CompactString::new(name),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.declared.is_empty()
    }

    /// Options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static OptionDescriptor> + '_ {
        self.inner.declared.iter().copied()
    }

    /// Options in the order their values must be resolved.
    pub fn resolution_order(&self) -> impl Iterator<Item = &'static OptionDescriptor> + '_ {
        self.inner.order.iter().map(|idx| self.inner.declared[*idx])
    }

    /// Options every member of a shared build environment must agree on.
    pub fn environment_critical(&self) -> impl Iterator<Item = &'static OptionDescriptor> + '_ {
        self.iter().filter(|desc| desc.is_environment_critical())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for desc in self.iter() {
            let default = match desc.default() {
                DefaultValue::Const(val) => val.to_value().to_string(),
                DefaultValue::Derived { deps, .. } if deps.is_empty() => "derived".to_string(),
                DefaultValue::Derived { deps, .. } => format!("derived from {}", deps.join(", ")),
            };
            writeln!(
                f,
                "{} => {} (default: {})\n\t└─ '{}'",
                desc.name(),
                desc.value_type(),
                default,
                desc.desc()
            )?;
        }
        Ok(())
    }
}

/// A builder for a [`Schema`].
#[derive(Default, Debug)]
pub struct SchemaBuilder {
    declared: Vec<&'static OptionDescriptor>,
    by_name: BTreeMap<&'static str, usize>,
}

impl SchemaBuilder {
    /// Register a typed [`TargetOption`] into this [`SchemaBuilder`].
    pub fn register<V: OptionKind>(&mut self, option: &'static TargetOption<V>) -> &mut Self {
        self.register_descriptor(option.descriptor())
    }

    /// Register an untyped [`OptionDescriptor`] into this [`SchemaBuilder`].
    pub fn register_descriptor(&mut self, descriptor: &'static OptionDescriptor) -> &mut Self {
        let prev = self.by_name.insert(descriptor.name(), self.declared.len());
        assert_none!(prev, "option '{}' registered more than once", descriptor.name());
        self.declared.push(descriptor);
        self
    }

    /// Consumes this [`SchemaBuilder`] constructing a [`Schema`].
    ///
    /// # Errors
    ///
    /// * If a constant default does not match the type of its option.
    /// * If a derived default depends on an option that was never registered.
    /// * If derived defaults depend on each other in a cycle.
    ///
    pub fn build(self) -> Result<Schema, SchemaError> {
        let count = self.declared.len();
        let mut indegree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (idx, desc) in self.declared.iter().enumerate() {
            if let DefaultValue::Const(val) = desc.default() {
                let value = val.to_value();
                if !desc.value_type().accepts(&value) {
                    return Err(SchemaError::TypeMismatch {
                        option: CompactString::const_new(desc.name()),
                        expected: desc.value_type(),
                        value,
                    });
                }
            }

            for dep in desc.default().deps() {
                let dep_idx =
                    *self
                        .by_name
                        .get(dep)
                        .ok_or_else(|| SchemaError::UnknownDependency {
                            option: CompactString::const_new(desc.name()),
                            dependency: CompactString::const_new(*dep),
                        })?;
                indegree[idx] += 1;
                dependents[dep_idx].push(idx);
            }
        }

        // Kahn's algorithm, ties are broken by declaration order so the result is stable.
        let mut ready: BTreeSet<usize> = (0..count).filter(|idx| indegree[*idx] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(idx) = ready.pop_first() {
            order.push(idx);
            for dependent in &dependents[idx] {
                indegree[*dependent] -= 1;
                if indegree[*dependent] == 0 {
                    ready.insert(*dependent);
                }
            }
        }

        if order.len() != count {
            return Err(self.find_cycle(&indegree));
        }

        Ok(Schema {
            inner: Arc::new(SchemaInner {
                declared: self.declared,
                by_name: self.by_name,
                order,
            }),
        })
    }

    /// Walks unresolved options until one repeats, every unresolved option has at least one
    /// unresolved dependency so the walk always finds a cycle.
    fn find_cycle(&self, indegree: &[usize]) -> SchemaError {
        let unresolved = |name: &str| {
            self.by_name
                .get(name)
                .copied()
                .filter(|idx| indegree[*idx] > 0)
        };

        let mut path: Vec<usize> = Vec::new();
        let mut current = indegree.iter().position(|degree| *degree > 0);
        while let Some(idx) = current {
            if let Some(start) = path.iter().position(|seen| *seen == idx) {
                path.drain(..start);
                path.push(idx);
                break;
            }
            path.push(idx);
            current = self.declared[idx]
                .default()
                .deps()
                .iter()
                .find_map(|dep| unresolved(*dep));
        }

        let cycle = path
            .into_iter()
            .map(|idx| CompactString::const_new(self.declared[idx].name()))
            .collect();
        SchemaError::CircularDefault { cycle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptionValue, StaticValue, ValueType};

    fn always_true(_: &crate::DefaultContext<'_>) -> Result<OptionValue, anyhow::Error> {
        Ok(OptionValue::Bool(true))
    }

    static BASE: TargetOption<bool> = TargetOption::new(
        OptionDescriptor::new(
            "base",
            "Constant option.",
            ValueType::Bool,
            DefaultValue::Const(StaticValue::Bool(false)),
        )
        .environment_critical(),
    );
    static MIDDLE: TargetOption<bool> = TargetOption::new(OptionDescriptor::new(
        "middle",
        "Reads base.",
        ValueType::Bool,
        DefaultValue::derived(&["base"], always_true),
    ));
    static TOP: TargetOption<bool> = TargetOption::new(OptionDescriptor::new(
        "top",
        "Reads middle and base.",
        ValueType::Bool,
        DefaultValue::derived(&["middle", "base"], always_true),
    ));

    static CYCLE_A: TargetOption<bool> = TargetOption::new(OptionDescriptor::new(
        "cycle_a",
        "Reads cycle_b.",
        ValueType::Bool,
        DefaultValue::derived(&["cycle_b"], always_true),
    ));
    static CYCLE_B: TargetOption<bool> = TargetOption::new(OptionDescriptor::new(
        "cycle_b",
        "Reads cycle_a.",
        ValueType::Bool,
        DefaultValue::derived(&["cycle_a"], always_true),
    ));

    static BAD_DEFAULT: TargetOption<i64> = TargetOption::new(OptionDescriptor::new(
        "bad_default",
        "Integer with a boolean default.",
        ValueType::Integer,
        DefaultValue::Const(StaticValue::Bool(true)),
    ));

    #[test]
    fn smoketest_describe() {
        let mut builder = Schema::builder();
        builder.register(&BASE).register(&MIDDLE);
        let schema = builder.build().unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.describe("middle").unwrap().desc(), "Reads base.");
        assert_eq!(
            schema.describe("nope").unwrap_err(),
            SchemaError::UnknownOption {
                name: CompactString::const_new("nope")
            }
        );

        let critical: Vec<_> = schema.environment_critical().map(|d| d.name()).collect();
        assert_eq!(critical, ["base"]);
    }

    #[test]
    fn smoketest_resolution_order() {
        let mut builder = Schema::builder();
        // Declared out of order on purpose.
        builder.register(&TOP).register(&MIDDLE).register(&BASE);
        let schema = builder.build().unwrap();

        let declared: Vec<_> = schema.iter().map(|d| d.name()).collect();
        assert_eq!(declared, ["top", "middle", "base"]);
        let order: Vec<_> = schema.resolution_order().map(|d| d.name()).collect();
        assert_eq!(order, ["base", "middle", "top"]);
    }

    #[test]
    fn circular_defaults_are_named() {
        let mut builder = Schema::builder();
        builder.register(&BASE).register(&CYCLE_A).register(&CYCLE_B);
        let err = builder.build().unwrap_err();

        assert_eq!(
            err,
            SchemaError::CircularDefault {
                cycle: vec!["cycle_a".into(), "cycle_b".into(), "cycle_a".into()]
            }
        );
        assert_eq!(
            err.to_string(),
            "circular default between options: cycle_a -> cycle_b -> cycle_a"
        );
    }

    #[test]
    fn unknown_dependency() {
        let mut builder = Schema::builder();
        builder.register(&MIDDLE);
        assert!(matches!(
            builder.build(),
            Err(SchemaError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn mistyped_constant_default() {
        let mut builder = Schema::builder();
        builder.register(&BAD_DEFAULT);
        assert!(matches!(
            builder.build(),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "registered more than once")]
    fn duplicate_registration_panics() {
        let mut builder = Schema::builder();
        builder.register(&BASE).register(&BASE);
    }

    #[test]
    fn display_lists_every_option() {
        let mut builder = Schema::builder();
        builder.register(&BASE).register(&TOP).register(&MIDDLE);
        let schema = builder.build().unwrap();

        let text = schema.to_string();
        assert!(text.contains("base => bool (default: false)"));
        assert!(text.contains("top => bool (default: derived from middle, base)"));
    }
}
