use super::analyze_each;
use crate::ports::outbound::{AnalyzedFile, Analyzer, ManifestFile};
use crate::sca_engine::domain::{DependencyIdentity, Language, RawDependencies};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Sections whose `specs:` block lists locked gems
const SPEC_SECTIONS: [&str; 3] = ["GEM", "GIT", "PATH"];

fn ruby(name: &str, version: &str) -> DependencyIdentity {
    DependencyIdentity::new("", name, version, Language::Ruby)
}

/// Splits `name (detail)` into its name and the text in parentheses.
///
/// Path and git sources mark direct dependencies with a trailing `!`.
fn split_entry(entry: &str) -> (&str, Option<&str>) {
    let entry = entry.trim();
    match entry.split_once(" (") {
        Some((name, rest)) => (
            name.trim_end_matches('!'),
            Some(rest.trim_end_matches(')').trim()),
        ),
        None => (entry.trim_end_matches('!'), None),
    }
}

#[derive(Debug, Default)]
struct LockedGem<'a> {
    name: &'a str,
    version: &'a str,
    requires: Vec<&'a str>,
}

/// GemfileLockAnalyzer for Bundler lockfiles
pub struct GemfileLockAnalyzer;

impl GemfileLockAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let mut gems: Vec<LockedGem> = Vec::new();
        let mut direct: Vec<&str> = Vec::new();
        let mut section = "";
        let mut in_specs = false;
        let mut saw_specs = false;

        for line in file.content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let indent = line.len() - line.trim_start().len();
            match indent {
                0 => {
                    section = line.trim();
                    in_specs = false;
                }
                2 if SPEC_SECTIONS.contains(&section) => {
                    in_specs = line.trim() == "specs:";
                    saw_specs |= in_specs;
                }
                2 if section == "DEPENDENCIES" => direct.push(split_entry(line).0),
                4 if in_specs => {
                    let (name, version) = split_entry(line);
                    gems.push(LockedGem {
                        name,
                        version: version.unwrap_or_default(),
                        requires: Vec::new(),
                    });
                }
                6 if in_specs => {
                    if let Some(gem) = gems.last_mut() {
                        gem.requires.push(split_entry(line).0);
                    }
                }
                _ => {}
            }
        }

        if !saw_specs {
            return Err(ScaError::parse(&file.relpath, "no specs section found"));
        }

        let mut versions: HashMap<&str, &str> = HashMap::new();
        for gem in &gems {
            versions.entry(gem.name).or_insert(gem.version);
        }

        // Direct dependencies first so they become the entry points
        let mut raw = RawDependencies::new(&file.relpath);
        for name in &direct {
            match versions.get(name) {
                Some(version) => raw.add_package(ruby(name, version)),
                None => tracing::debug!(
                    path = %file.relpath,
                    gem = name,
                    "direct dependency is not locked"
                ),
            }
        }
        for gem in &gems {
            let parent = ruby(gem.name, gem.version);
            if !direct.contains(&gem.name) {
                raw.add_package(parent.clone());
            }
            for name in &gem.requires {
                match versions.get(name) {
                    Some(version) => raw.add_edge(parent.clone(), ruby(name, version)),
                    // Platform-specific gems may be absent from the lock
                    None => tracing::debug!(
                        path = %file.relpath,
                        gem = name,
                        "skipping unlocked dependency"
                    ),
                }
            }
        }
        Ok(raw)
    }
}

#[async_trait]
impl Analyzer for GemfileLockAnalyzer {
    fn name(&self) -> &'static str {
        "Gemfile.lock"
    }

    fn language(&self) -> Language {
        Language::Ruby
    }

    fn can_handle(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        matches!(file_name, "Gemfile.lock" | "gems.locked")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = "\
GIT
  remote: https://github.com/acme/toolkit.git
  revision: 4f2c1d9
  specs:
    toolkit (0.3.0)
      rack

GEM
  remote: https://rubygems.org/
  specs:
    rack (2.2.8)
    rack-test (2.1.0)
      rack (>= 1.3)
    sinatra (3.1.0)
      mustermann (~> 3.0)
      rack (~> 2.2, >= 2.2.4)
      tilt (~> 2.0)
      wdm (>= 0.1.0)
    mustermann (3.0.0)
    tilt (2.3.0)

PLATFORMS
  ruby

DEPENDENCIES
  rack-test
  sinatra (~> 3.1)
  toolkit!

BUNDLED WITH
   2.4.22
";

    #[test]
    fn test_parse_gems_and_requirements() {
        let raw = GemfileLockAnalyzer::parse(&ManifestFile::new("Gemfile.lock", LOCK)).unwrap();

        assert!(raw.root.is_none());
        assert_eq!(
            &raw.packages[..3],
            &[
                ruby("rack-test", "2.1.0"),
                ruby("sinatra", "3.1.0"),
                ruby("toolkit", "0.3.0")
            ]
        );
        assert_eq!(raw.packages.len(), 6);
        assert!(raw
            .edges
            .contains(&(ruby("toolkit", "0.3.0"), ruby("rack", "2.2.8"))));
        assert!(raw
            .edges
            .contains(&(ruby("sinatra", "3.1.0"), ruby("mustermann", "3.0.0"))));
        // wdm is windows-only and not locked
        assert!(!raw.edges.iter().any(|(_, child)| child.name == "wdm"));
        assert_eq!(raw.edges.len(), 5);
    }

    #[test]
    fn test_split_entry() {
        assert_eq!(split_entry("    rack (2.2.8)"), ("rack", Some("2.2.8")));
        assert_eq!(split_entry("  toolkit!"), ("toolkit", None));
        assert_eq!(
            split_entry("      rack (~> 2.2, >= 2.2.4)"),
            ("rack", Some("~> 2.2, >= 2.2.4"))
        );
    }

    #[test]
    fn test_file_without_specs_is_parse_error() {
        let lock = ManifestFile::new("Gemfile.lock", "source 'x'\n");
        let err = GemfileLockAnalyzer::parse(&lock).unwrap_err();
        assert!(matches!(err, ScaError::Parse { .. }));
    }

    #[test]
    fn test_can_handle() {
        assert!(GemfileLockAnalyzer.can_handle("Gemfile.lock"));
        assert!(GemfileLockAnalyzer.can_handle("apps/web/Gemfile.lock"));
        assert!(GemfileLockAnalyzer.can_handle("gems.locked"));
        assert!(!GemfileLockAnalyzer.can_handle("Gemfile"));
        assert!(!GemfileLockAnalyzer.can_handle("MyGemfile.lock"));
    }
}
