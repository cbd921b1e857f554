//! Embedded reply templates
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

pub const CONFIRM_TEAM_IN_SOLO: &str = include_str!("../../prompts/confirm-team-in-solo.pmt");
pub const CONFIRM_SOLO_IN_TEAM: &str = include_str!("../../prompts/confirm-solo-in-team.pmt");
pub const CONFIRM_TOO_MANY: &str = include_str!("../../prompts/confirm-too-many.pmt");
pub const CONFIRM_GENERIC: &str = include_str!("../../prompts/confirm-generic.pmt");

/// Appended to a confirmation when intent wording and extracted buckets disagree
pub const SIGNAL_NOTE: &str = include_str!("../../prompts/signal-note.pmt");

pub const AUTO_COMMIT: &str = include_str!("../../prompts/auto-commit.pmt");
pub const NO_SINK: &str = include_str!("../../prompts/no-sink.pmt");
pub const COMMITTED: &str = include_str!("../../prompts/committed.pmt");
pub const SWITCHING: &str = include_str!("../../prompts/switching.pmt");
pub const COMMITTED_AFTER_SWITCH: &str = include_str!("../../prompts/committed-after-switch.pmt");
pub const CANCELLED: &str = include_str!("../../prompts/cancelled.pmt");
pub const HELP: &str = include_str!("../../prompts/help.pmt");
pub const WORKLOAD: &str = include_str!("../../prompts/workload.pmt");
pub const WORKLOAD_HINT: &str = include_str!("../../prompts/workload-hint.pmt");

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let template = match name {
        "confirm-team-in-solo" => CONFIRM_TEAM_IN_SOLO,
        "confirm-solo-in-team" => CONFIRM_SOLO_IN_TEAM,
        "confirm-too-many" => CONFIRM_TOO_MANY,
        "confirm-generic" => CONFIRM_GENERIC,
        "signal-note" => SIGNAL_NOTE,
        "auto-commit" => AUTO_COMMIT,
        "no-sink" => NO_SINK,
        "committed" => COMMITTED,
        "switching" => SWITCHING,
        "committed-after-switch" => COMMITTED_AFTER_SWITCH,
        "cancelled" => CANCELLED,
        "help" => HELP,
        "workload" => WORKLOAD,
        "workload-hint" => WORKLOAD_HINT,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PromptVariant;

    #[test]
    fn test_every_prompt_variant_is_embedded() {
        for variant in [
            PromptVariant::TeamInSoloMode,
            PromptVariant::SoloInTeamMode,
            PromptVariant::TooManyTasks,
            PromptVariant::Generic,
        ] {
            assert!(get_embedded(variant.template_name()).is_some(), "{:?}", variant);
        }
    }

    #[test]
    fn test_get_embedded_help() {
        let help = get_embedded("help").unwrap();
        assert!(help.contains("ready to help"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
