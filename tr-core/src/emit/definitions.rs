use std::fmt::Write;

use compact_str::CompactString;

use super::Emitter;
use crate::snapshot::Snapshot;

/// One compiler definition per line, grouped by target.
#[derive(Debug, Clone)]
pub struct DefinitionsEmitter {
    /// Prepended to every definition, e.g. `-D` or `/D`.
    pub prefix: &'static str,
    /// Include definitions that only apply to the project's own modules.
    pub include_project: bool,
}

impl Default for DefinitionsEmitter {
    fn default() -> Self {
        DefinitionsEmitter {
            prefix: "-D",
            include_project: true,
        }
    }
}

impl Emitter for DefinitionsEmitter {
    fn emit(&self, snapshots: &[Snapshot]) -> Result<String, anyhow::Error> {
        let mut out = String::new();
        for (idx, snapshot) in snapshots.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            // Only label the blocks when there is more than one.
            if snapshots.len() > 1 {
                writeln!(out, "# {}", snapshot.identity())?;
            }

            let project: &[CompactString] = if self.include_project {
                snapshot.project_definitions()
            } else {
                &[]
            };
            for definition in snapshot.definitions().iter().chain(project) {
                writeln!(out, "{}{definition}", self.prefix)?;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use tr_types::Configuration;

    use super::*;
    use crate::emit::testing::snapshot;

    #[test]
    fn smoketest_definitions() {
        let game = snapshot("Game", Configuration::Development);
        let text = DefinitionsEmitter::default().emit(&[game.clone()]).unwrap();
        assert_eq!(text, "-DUE_GAME=1\n-DWITH_EDITOR=0\n-DUE_NO_VALUE\n-DMY_PROJECT=1\n");

        let emitter = DefinitionsEmitter {
            prefix: "",
            include_project: false,
        };
        let text = emitter.emit(&[game]).unwrap();
        assert_eq!(text, "UE_GAME=1\nWITH_EDITOR=0\nUE_NO_VALUE\n");
    }

    #[test]
    fn multiple_targets_are_labeled() {
        let snapshots = [
            snapshot("Game", Configuration::Development),
            snapshot("Other", Configuration::Shipping),
        ];
        let text = DefinitionsEmitter::default().emit(&snapshots).unwrap();
        assert!(text.starts_with("# Game (game Linux development x86_64)\n-DUE_GAME=1\n"));
        assert!(text.contains("\n\n# Other (game Linux shipping x86_64)\n"));
    }
}
