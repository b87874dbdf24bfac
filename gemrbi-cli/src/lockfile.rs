//! Reads the type checker version pinned in `Gemfile.lock`.

use gemrbi::VersionIdentifier;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Gems that carry the type checker, in order of preference.
pub const CHECKER_GEMS: [&str; 3] = ["sorbet-static", "sorbet-static-and-runtime", "sorbet"];

// Locked gems are indented four spaces: `    sorbet-static (0.5.10860-x86_64-linux)`.
// The platform suffix after `-` is not part of the version.
static SPEC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ {4}([A-Za-z0-9_.-]+) \(([0-9][0-9A-Za-z.]*)(?:-[^)]*)?\)[ \t]*$").unwrap()
});

/// Finds the type checker version pinned in a lockfile, or `None` when no
/// checker gem is locked.
pub fn runtime_version_from_lockfile(lockfile: &str) -> Option<VersionIdentifier> {
    let locked: HashMap<&str, &str> = SPEC_LINE
        .captures_iter(lockfile)
        .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .collect();

    CHECKER_GEMS.iter().find_map(|gem| {
        let raw = locked.get(gem)?;
        match raw.parse::<VersionIdentifier>() {
            Ok(version) => {
                debug!("Found {} {} in lockfile", gem, version);
                Some(version)
            }
            Err(e) => {
                debug!("Ignoring {} entry: {}", gem, e);
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCKFILE: &str = "\
GEM
  remote: https://rubygems.org/
  specs:
    rbi (0.1.9)
      sorbet-runtime (>= 0.5.9204)
    sorbet (0.5.10820)
      sorbet-static (= 0.5.10820)
    sorbet-runtime (0.5.10820)
    sorbet-static (0.5.10820-x86_64-linux)
    sorbet-static-and-runtime (0.5.10820)

PLATFORMS
  x86_64-linux
";

    #[test]
    fn test_prefers_sorbet_static() {
        let version = runtime_version_from_lockfile(LOCKFILE).unwrap();
        assert_eq!(version.as_str(), "0.5.10820");
    }

    #[test]
    fn test_dependency_lines_are_ignored() {
        let lockfile = "\
GEM
  specs:
    tapioca (0.11.0)
      sorbet-static (>= 0.5.10187)
    sorbet (0.5.10601)
";
        let version = runtime_version_from_lockfile(lockfile).unwrap();
        assert_eq!(version.as_str(), "0.5.10601");
    }

    #[test]
    fn test_missing_checker() {
        assert!(runtime_version_from_lockfile("GEM\n  specs:\n    rake (13.0.6)\n").is_none());
    }
}
