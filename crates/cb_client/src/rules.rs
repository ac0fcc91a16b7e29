//! The single rule evaluator used everywhere a descriptor declares
//! `rules`: library filtering, argument selection, classifier checks.

use cb_core::{
    json::version::{Rule, RuleAction},
    Platform,
};

/// Launch-time feature toggles referenced by `features` rule
/// conditions. Anything a descriptor asks about that isn't listed
/// here reads as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub is_demo_user: bool,
    pub has_custom_resolution: bool,
    pub has_quick_plays_support: bool,
    pub is_quick_play_singleplayer: bool,
    pub is_quick_play_multiplayer: bool,
    pub is_quick_play_realms: bool,
}

impl FeatureFlags {
    #[must_use]
    pub fn enabled(&self, name: &str) -> bool {
        match name {
            "is_demo_user" => self.is_demo_user,
            "has_custom_resolution" => self.has_custom_resolution,
            "has_quick_plays_support" => self.has_quick_plays_support,
            "is_quick_play_singleplayer" => self.is_quick_play_singleplayer,
            "is_quick_play_multiplayer" => self.is_quick_play_multiplayer,
            "is_quick_play_realms" => self.is_quick_play_realms,
            _ => false,
        }
    }
}

/// Evaluates a rule list against the environment.
///
/// The first rule whose declared conditions *all* hold decides the
/// outcome; a rule with no conditions always matches (and so acts as
/// a default when placed last). If nothing matches, the answer is
/// "disallow", including for an empty rule list.
#[must_use]
pub fn admits(rules: &[Rule], platform: &Platform, features: &FeatureFlags) -> bool {
    for rule in rules {
        if rule_matches(rule, platform, features) {
            return rule.action == RuleAction::Allow;
        }
    }
    false
}

/// [`admits`] for the common case where `rules` is optional:
/// a declaration without rules is unconditionally admitted.
#[must_use]
pub fn admits_opt(rules: Option<&[Rule]>, platform: &Platform, features: &FeatureFlags) -> bool {
    match rules {
        Some(rules) => admits(rules, platform, features),
        None => true,
    }
}

fn rule_matches(rule: &Rule, platform: &Platform, features: &FeatureFlags) -> bool {
    if let Some(os) = &rule.os {
        if !platform.matches_os_rule(os.name.as_deref(), os.arch.as_deref()) {
            return false;
        }
    }

    if let Some(required) = &rule.features {
        for (name, required_value) in required {
            if features.enabled(name) != *required_value {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::{Arch, OsName};

    const WINDOWS: Platform = Platform {
        os: OsName::Windows,
        arch: Arch::X86_64,
    };
    const LINUX: Platform = Platform {
        os: OsName::Linux,
        arch: Arch::X86_64,
    };

    fn parse(json: &str) -> Vec<Rule> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unconditioned_fallback_after_non_matching_disallow() {
        let rules = parse(
            r#"[ { "action": "disallow", "os": { "name": "osx" } },
                 { "action": "allow" } ]"#,
        );
        assert!(admits(&rules, &WINDOWS, &FeatureFlags::default()));
    }

    #[test]
    fn no_matching_rule_means_disallow() {
        let rules = parse(r#"[ { "action": "allow", "os": { "name": "linux" } } ]"#);
        assert!(!admits(&rules, &WINDOWS, &FeatureFlags::default()));
        assert!(admits(&rules, &LINUX, &FeatureFlags::default()));
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = parse(
            r#"[ { "action": "disallow", "os": { "name": "windows" } },
                 { "action": "allow" } ]"#,
        );
        assert!(!admits(&rules, &WINDOWS, &FeatureFlags::default()));
        assert!(admits(&rules, &LINUX, &FeatureFlags::default()));
    }

    #[test]
    fn empty_rule_list_disallows() {
        assert!(!admits(&[], &WINDOWS, &FeatureFlags::default()));
        assert!(admits_opt(None, &WINDOWS, &FeatureFlags::default()));
    }

    #[test]
    fn feature_condition_requires_exact_flag_value() {
        let rules =
            parse(r#"[ { "action": "allow", "features": { "is_demo_user": true } } ]"#);

        let mut features = FeatureFlags::default();
        assert!(!admits(&rules, &WINDOWS, &features));

        features.is_demo_user = true;
        assert!(admits(&rules, &WINDOWS, &features));
    }

    #[test]
    fn unknown_feature_reads_as_false() {
        let rules =
            parse(r#"[ { "action": "allow", "features": { "totally_new_feature": false } } ]"#);
        assert!(admits(&rules, &WINDOWS, &FeatureFlags::default()));
    }

    #[test]
    fn os_and_features_on_one_rule_must_both_hold() {
        let rules = parse(
            r#"[ { "action": "allow",
                   "os": { "name": "windows" },
                   "features": { "is_demo_user": true } } ]"#,
        );
        let demo = FeatureFlags {
            is_demo_user: true,
            ..FeatureFlags::default()
        };
        assert!(admits(&rules, &WINDOWS, &demo));
        assert!(!admits(&rules, &WINDOWS, &FeatureFlags::default()));
        assert!(!admits(&rules, &LINUX, &demo));
    }

    #[test]
    fn arch_condition_is_checked() {
        let rules = parse(
            r#"[ { "action": "allow", "os": { "name": "windows", "arch": "x86" } } ]"#,
        );
        assert!(!admits(&rules, &WINDOWS, &FeatureFlags::default()));

        let win_x86 = Platform {
            os: OsName::Windows,
            arch: Arch::X86,
        };
        assert!(admits(&rules, &win_x86, &FeatureFlags::default()));
    }
}
