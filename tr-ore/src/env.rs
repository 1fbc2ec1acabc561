//! Toggles read from the process environment.

use std::ffi::OsStr;

/// Values that switch a toggle off, compared case-insensitively.
const FALSEY: &[&str] = &["", "0", "no", "off", "false"];

/// Returns true if `var` is set to anything other than a falsey value.
pub fn is_truthy<K: AsRef<OsStr>>(var: K) -> bool {
    std::env::var_os(var).is_some_and(|value| !is_falsey(&value.to_string_lossy()))
}

/// Returns true if colored output was turned off with `NO_COLOR`.
pub fn no_color() -> bool {
    is_truthy("NO_COLOR")
}

fn is_falsey(value: &str) -> bool {
    FALSEY.iter().any(|falsey| value.eq_ignore_ascii_case(falsey))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_falsey() {
        for value in ["", "0", "No", "OFF", "false"] {
            assert!(is_falsey(value), "{value}");
        }
        for value in ["1", "yes", "true", "anything"] {
            assert!(!is_falsey(value), "{value}");
        }
    }

    #[test]
    fn unset_is_not_truthy() {
        assert!(!is_truthy("TR_ORE_DEFINITELY_NOT_SET_0xF00D"));
    }
}
