//! Assertions for registries that must not see the same key twice.

use std::fmt;

/// Panics if the provided `Option` is `Some`, with an optional message.
#[macro_export]
macro_rules! assert_none {
    ($val:expr $(,)?) => {
        if let Some(found) = &$val {
            $crate::assert::found_some(found, format_args!("expected None"));
        }
    };
    ($val:expr, $($msg:tt)+) => {
        if let Some(found) = &$val {
            $crate::assert::found_some(found, format_args!($($msg)+));
        }
    };
}

#[doc(hidden)]
#[cold]
#[track_caller]
pub fn found_some(found: &dyn fmt::Debug, msg: fmt::Arguments<'_>) -> ! {
    panic!("assertion failed: found Some({found:?}), {msg}")
}

#[cfg(test)]
mod tests {
    #[test]
    fn none_passes() {
        let value: Option<u32> = None;
        assert_none!(value, "value {} should be empty", "x");
        assert_none!(value);
    }

    #[test]
    #[should_panic(expected = "found Some(\"link_type\"), registered twice")]
    fn some_panics_with_message() {
        let value = Some("link_type");
        assert_none!(value, "registered {}", "twice");
    }
}
