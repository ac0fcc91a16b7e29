//! Target platform description, passed explicitly so that
//! rule evaluation and native selection can be tested for
//! platforms other than the one the launcher runs on.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsName {
    Windows,
    Linux,
    MacOs,
    FreeBsd,
}

impl OsName {
    /// The name this OS goes by in version descriptor rules.
    #[must_use]
    pub fn rule_name(self) -> &'static str {
        match self {
            OsName::Windows => "windows",
            OsName::Linux => "linux",
            OsName::MacOs => "osx",
            OsName::FreeBsd => "freebsd",
        }
    }

    /// File extension of shared libraries on this OS (without the dot).
    #[must_use]
    pub fn library_extension(self) -> &'static str {
        match self {
            OsName::Windows => "dll",
            OsName::MacOs => "dylib",
            OsName::Linux | OsName::FreeBsd => "so",
        }
    }
}

impl Display for OsName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rule_name())
    }
}

/// Normalizes an OS name as found in descriptor rules to the
/// canonical spelling: `win -> windows`, `mac`/`macos`/`darwin` -> `osx`.
/// Unknown names pass through lowercased.
#[must_use]
pub fn normalize_os_name(name: &str) -> String {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "win" | "windows" => "windows".to_owned(),
        "mac" | "macos" | "osx" | "darwin" => "osx".to_owned(),
        _ => lower,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X86_64,
    Arm64,
}

impl Arch {
    #[must_use]
    pub fn is_arm(self) -> bool {
        matches!(self, Arch::Arm64)
    }

    #[must_use]
    pub fn is_64_bit(self) -> bool {
        matches!(self, Arch::X86_64 | Arch::Arm64)
    }

    /// Whether an `arch` field from a descriptor rule refers to this arch.
    /// Descriptors spell these inconsistently (`x86_64`, `amd64`, `aarch64`...).
    #[must_use]
    pub fn matches_rule(self, required: &str) -> bool {
        let required = required.to_lowercase();
        match required.as_str() {
            "x86" | "i386" | "i686" => self == Arch::X86,
            "x86_64" | "x86-64" | "amd64" | "x64" => self == Arch::X86_64,
            "arm64" | "aarch64" => self == Arch::Arm64,
            _ => false,
        }
    }
}

impl Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Arch::X86 => "x86",
                Arch::X86_64 => "x86_64",
                Arch::Arm64 => "arm64",
            }
        )
    }
}

/// The environment a launch targets: OS plus CPU architecture.
///
/// Built once with [`Platform::current`] and passed by reference;
/// tests construct arbitrary platforms directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsName,
    pub arch: Arch,
}

impl Platform {
    #[must_use]
    pub fn current() -> Self {
        let os = if cfg!(target_os = "windows") {
            OsName::Windows
        } else if cfg!(target_os = "macos") {
            OsName::MacOs
        } else if cfg!(target_os = "freebsd") {
            OsName::FreeBsd
        } else {
            OsName::Linux
        };

        let arch = if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else if cfg!(target_arch = "x86") {
            Arch::X86
        } else {
            Arch::X86_64
        };

        Self { os, arch }
    }

    /// Does a rule's `os { name, arch }` condition match this platform?
    /// Absent fields match anything.
    #[must_use]
    pub fn matches_os_rule(&self, name: Option<&str>, arch: Option<&str>) -> bool {
        if let Some(name) = name {
            if normalize_os_name(name) != self.os.rule_name() {
                return false;
            }
        }
        if let Some(arch) = arch {
            if !self.arch.matches_rule(arch) {
                return false;
            }
        }
        true
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOWS_X64: Platform = Platform {
        os: OsName::Windows,
        arch: Arch::X86_64,
    };

    #[test]
    fn os_name_normalization() {
        assert_eq!(normalize_os_name("win"), "windows");
        assert_eq!(normalize_os_name("Windows"), "windows");
        assert_eq!(normalize_os_name("mac"), "osx");
        assert_eq!(normalize_os_name("MacOS"), "osx");
        assert_eq!(normalize_os_name("darwin"), "osx");
        assert_eq!(normalize_os_name("osx"), "osx");
        assert_eq!(normalize_os_name("linux"), "linux");
        assert_eq!(normalize_os_name("solaris"), "solaris");
    }

    #[test]
    fn os_rule_matching() {
        assert!(WINDOWS_X64.matches_os_rule(Some("windows"), None));
        assert!(WINDOWS_X64.matches_os_rule(Some("win"), None));
        assert!(!WINDOWS_X64.matches_os_rule(Some("osx"), None));
        assert!(WINDOWS_X64.matches_os_rule(None, None));
        assert!(WINDOWS_X64.matches_os_rule(Some("windows"), Some("amd64")));
        assert!(!WINDOWS_X64.matches_os_rule(Some("windows"), Some("x86")));
    }

    #[test]
    fn arch_rule_matching() {
        assert!(Arch::Arm64.matches_rule("aarch64"));
        assert!(Arch::Arm64.matches_rule("ARM64"));
        assert!(!Arch::Arm64.matches_rule("x86_64"));
        assert!(Arch::X86.matches_rule("x86"));
        assert!(!Arch::X86_64.matches_rule("x86"));
    }
}
