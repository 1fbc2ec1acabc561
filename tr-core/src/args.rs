//! Pre-parsed command line arguments.

use compact_str::CompactString;
use smallvec::SmallVec;
use tr_cfg::CliFlag;

/// A single `-Flag` or `-Flag=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Argument {
    /// Flag as written, including the `=` or `:` separator when the argument has a value.
    flag: CompactString,
    value: Option<CompactString>,
}

/// Ordered table of command line flags.
///
/// Later arguments win over earlier ones, list options collect every occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<Argument>,
}

impl CommandLine {
    /// Parse raw arguments, anything that isn't a flag is skipped.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = Vec::new();
        for arg in raw {
            let arg = arg.as_ref().trim();
            if !arg.starts_with('-') {
                tracing::debug!(arg, "skipping non-flag argument");
                continue;
            }

            let argument = match arg.find(['=', ':']) {
                Some(idx) => Argument {
                    flag: CompactString::new(&arg[..=idx]),
                    value: Some(CompactString::new(&arg[idx + 1..])),
                },
                None => Argument {
                    flag: CompactString::new(arg),
                    value: None,
                },
            };
            args.push(argument);
        }
        CommandLine { args }
    }

    /// Returns a new [`CommandLine`] with the arguments of `other` after ours.
    pub fn merged(&self, other: &CommandLine) -> CommandLine {
        let mut args = self.args.clone();
        args.extend(other.args.iter().cloned());
        CommandLine { args }
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if the bare switch `flag` was passed.
    pub fn has_switch(&self, flag: &str) -> bool {
        self.args
            .iter()
            .any(|arg| arg.value.is_none() && arg.flag.eq_ignore_ascii_case(flag))
    }

    /// Values for every argument matching one of `flags`, in command line order.
    ///
    /// Values of list flags are split into their items.
    pub fn matches<'a>(&'a self, flags: &'a [CliFlag]) -> impl Iterator<Item = &'a str> + 'a {
        self.args.iter().flat_map(move |arg| {
            let mut items: SmallVec<[&'a str; 1]> = SmallVec::new();
            let matched = flags.iter().find(|flag| {
                flag.takes_value() == arg.value.is_some()
                    && arg.flag.eq_ignore_ascii_case(flag.flag())
            });
            match (matched, &arg.value) {
                (Some(CliFlag::Switch { value, .. }), None) => items.push(*value),
                (Some(CliFlag::Value { separator, .. }), Some(value)) => match separator {
                    Some(separator) => items.extend(
                        value
                            .split(*separator)
                            .map(str::trim)
                            .filter(|item| !item.is_empty()),
                    ),
                    None => items.push(value.as_str()),
                },
                _ => (),
            }
            items
        })
    }
}
