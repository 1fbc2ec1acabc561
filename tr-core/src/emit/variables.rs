use std::fmt::Write;

use super::Emitter;
use crate::snapshot::Snapshot;

/// Makefile variables, `<TARGET>_<OPTION> = value`, one block per target.
#[derive(Debug, Clone, Default)]
pub struct VariablesEmitter;

impl Emitter for VariablesEmitter {
    fn emit(&self, snapshots: &[Snapshot]) -> Result<String, anyhow::Error> {
        let mut out = String::new();
        for (idx, snapshot) in snapshots.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            let prefix = variable_name(snapshot.name());

            writeln!(out, "# {}", snapshot.identity())?;
            writeln!(out, "{prefix}_FINGERPRINT = {}", snapshot.fingerprint())?;
            for (name, resolved) in snapshot.iter() {
                writeln!(
                    out,
                    "{prefix}_{} = {}",
                    variable_name(name),
                    resolved.value
                )?;
            }
            writeln!(
                out,
                "{prefix}_DEFINITIONS = {}",
                snapshot.definitions().join(" ")
            )?;
            writeln!(
                out,
                "{prefix}_PROJECT_DEFINITIONS = {}",
                snapshot.project_definitions().join(" ")
            )?;
        }
        Ok(out)
    }
}

/// Upper case, with anything make would trip over replaced by `_`.
fn variable_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tr_types::Configuration;

    use super::*;
    use crate::emit::testing::snapshot;

    #[test]
    fn smoketest_variables() {
        let game = snapshot("My-Game", Configuration::Development);
        let fingerprint = game.fingerprint();
        let text = VariablesEmitter.emit(&[game]).unwrap();

        let expected = format!(
            "# My-Game (game Linux development x86_64)\n\
             MY_GAME_FINGERPRINT = {fingerprint}\n\
             MY_GAME_LINK_TYPE = monolithic\n\
             MY_GAME_USE_STATIC_CRT = false\n\
             MY_GAME_DEFINITIONS = UE_GAME=1 WITH_EDITOR=0 UE_NO_VALUE\n\
             MY_GAME_PROJECT_DEFINITIONS = MY_PROJECT=1\n"
        );
        assert_eq!(text, expected);
    }
}
