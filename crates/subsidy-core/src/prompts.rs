//! Prompt library for the subsidy search
//!
//! A prompt file is YAML frontmatter followed by `# System` and `# User`
//! sections. The user section may reference profile values as `{{name}}` and
//! wrap optional lines in `{{#if name}}...{{/if}}`.
//!
//! Lookup order:
//! 1. `~/.local/share/subsidy/prompts/overrides/<id>.md`
//! 2. The copy compiled into the binary

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

const FIND_SUBSIDIES: &str = include_str!("../../../prompts/find_subsidies.md");

const SYSTEM_HEADER: &str = "# System";
const USER_HEADER: &str = "# User";

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Grounded search for subsidies matching a company profile
    FindSubsidies,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindSubsidies => "find_subsidies",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::FindSubsidies]
    }

    fn embedded(&self) -> &'static str {
        match self {
            Self::FindSubsidies => FIND_SUBSIDIES,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.md", self.as_str())
    }
}

/// Prompt frontmatter
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    pub version: u32,
    /// Kind of provider call the prompt is written for
    pub task_type: String,
    /// Profile values the template expects to be supplied
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Where a prompt was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Embedded,
    Override(PathBuf),
}

impl PromptSource {
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Embedded => None,
            Self::Override(path) => Some(path),
        }
    }
}

/// A parsed prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// Body after the frontmatter
    pub content: String,
    pub source: PromptSource,
}

impl Prompt {
    fn parse(raw: &str, source: PromptSource) -> Result<Self> {
        let (metadata, content) = split_frontmatter(raw)?;
        Ok(Self {
            metadata,
            content,
            source,
        })
    }

    pub fn system_section(&self) -> Option<&str> {
        section(&self.content, SYSTEM_HEADER)
    }

    pub fn user_section(&self) -> Option<&str> {
        section(&self.content, USER_HEADER)
    }

    /// Render the user section, or the whole body if it has no sections
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render_template(self.user_section().unwrap_or(&self.content), vars)
    }

    /// Declared variables that `vars` does not supply
    pub fn missing_variables<'a>(&'a self, vars: &HashMap<&str, &str>) -> Vec<&'a str> {
        self.metadata
            .variables
            .iter()
            .map(String::as_str)
            .filter(|name| !vars.contains_key(name))
            .collect()
    }
}

/// Loads prompts and caches them for the life of the library
#[derive(Debug)]
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Library that honours overrides in the default data directory
    pub fn new() -> Self {
        Self::from_dir(default_prompts_dir())
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self::from_dir(Some(path))
    }

    /// Library that only ever serves the compiled-in prompts
    pub fn embedded_only() -> Self {
        Self::from_dir(None)
    }

    fn from_dir(override_dir: Option<PathBuf>) -> Self {
        Self {
            override_dir,
            cache: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::Prompt(format!("{} missing from cache", id.as_str())))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        match self.existing_override(id) {
            Some(path) => {
                let raw = fs::read_to_string(&path).map_err(|e| {
                    Error::Prompt(format!("Failed to read {}: {}", path.display(), e))
                })?;
                tracing::debug!(path = %path.display(), "Using prompt override");
                Prompt::parse(&raw, PromptSource::Override(path))
            }
            None => Prompt::parse(id.embedded(), PromptSource::Embedded),
        }
    }

    fn existing_override(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(id.file_name()))
            .filter(|path| path.exists())
    }

    /// Every known prompt with its version and source
    ///
    /// A prompt that fails to load is listed with version 0.
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| match self.get(id) {
                Ok(prompt) => PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.metadata.version,
                    task_type: prompt.metadata.task_type.clone(),
                    source: prompt.source.clone(),
                },
                Err(e) => {
                    tracing::warn!(prompt = id.as_str(), error = %e, "Prompt failed to load");
                    PromptInfo {
                        id: id.as_str().to_string(),
                        version: 0,
                        task_type: String::new(),
                        source: self
                            .existing_override(id)
                            .map_or(PromptSource::Embedded, PromptSource::Override),
                    }
                }
            })
            .collect()
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.existing_override(id).is_some()
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing entry for a prompt
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub task_type: String,
    pub source: PromptSource,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subsidy").join("prompts").join("overrides"))
}

fn split_frontmatter(raw: &str) -> Result<(PromptMetadata, String)> {
    let rest = raw
        .trim()
        .strip_prefix("---")
        .ok_or_else(|| Error::Prompt("Prompt must start with YAML frontmatter (---)".into()))?;
    let (yaml, body) = rest
        .split_once("---")
        .ok_or_else(|| Error::Prompt("Prompt frontmatter is not closed with ---".into()))?;

    let metadata = serde_yaml::from_str(yaml.trim())
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;
    Ok((metadata, body.trim().to_string()))
}

/// Text under `header` up to the next top-level header
fn section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)? + header.len();
    let tail = &content[start..];
    let end = tail.find("\n# ").unwrap_or(tail.len());
    Some(tail[..end].trim())
}

/// Expand `{{name}}` and `{{#if name}}...{{/if}}` in one pass
///
/// A conditional block is kept when its variable is present and non-empty.
/// Placeholders with no value are left as written.
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = after[..close].trim();
        let tail = &after[close + 2..];

        if let Some(name) = tag.strip_prefix("#if ") {
            let Some(end) = tail.find("{{/if}}") else {
                out.push_str(&rest[open..]);
                return out;
            };
            if vars.get(name.trim()).is_some_and(|v| !v.is_empty()) {
                out.push_str(&render_template(&tail[..end], vars));
            }
            rest = &tail[end + "{{/if}}".len()..];
        } else {
            match vars.get(tag) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = tail;
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_frontmatter_split() {
        let raw = "---\nid: demo\nversion: 2\ntask_type: grounded_search\nvariables: [industry]\n---\n\n# System\nsys\n\n# User\nuser {{industry}}\n";
        let prompt = Prompt::parse(raw, PromptSource::Embedded).unwrap();

        assert_eq!(prompt.metadata.id, "demo");
        assert_eq!(prompt.metadata.version, 2);
        assert_eq!(prompt.metadata.variables, vec!["industry"]);
        assert_eq!(prompt.system_section(), Some("sys"));
        assert_eq!(prompt.user_section(), Some("user {{industry}}"));
    }

    #[test]
    fn test_frontmatter_required() {
        assert!(matches!(split_frontmatter("# User\nhi"), Err(Error::Prompt(_))));
        assert!(matches!(
            split_frontmatter("---\nid: x\n# User"),
            Err(Error::Prompt(_))
        ));
    }

    #[test]
    fn test_missing_section() {
        assert_eq!(section("# User\nonly user", SYSTEM_HEADER), None);
    }

    #[test]
    fn test_render_conditional_block() {
        let template = "措施{{#if implementation_time}}\n時程：{{implementation_time}}{{/if}}\n結束";

        let kept = render_template(template, &vars(&[("implementation_time", "6 個月內")]));
        assert_eq!(kept, "措施\n時程：6 個月內\n結束");

        let dropped = render_template(template, &vars(&[("implementation_time", "")]));
        assert_eq!(dropped, "措施\n結束");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render_template("a {{known}} b {{unknown}} c {{", &vars(&[("known", "1")]));
        assert_eq!(out, "a 1 b {{unknown}} c {{");
    }

    #[test]
    fn test_embedded_prompt_declares_profile_variables() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::FindSubsidies).unwrap();

        assert_eq!(prompt.source, PromptSource::Embedded);
        assert_eq!(prompt.metadata.id, "find_subsidies");
        assert!(prompt.system_section().unwrap().contains("節能補助顧問"));
        for name in &prompt.metadata.variables {
            assert!(
                prompt.content.contains(&format!("{{{{{}}}}}", name)),
                "{} declared but unused",
                name
            );
        }
        assert!(prompt
            .missing_variables(&vars(&[("industry", "製造業")]))
            .contains(&"estimated_budget"));
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("find_subsidies.md"),
            "---\nid: find_subsidies\nversion: 9\ntask_type: grounded_search\n---\n\n# User\nCustom {{industry}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.has_override(PromptId::FindSubsidies));

        let prompt = lib.get(PromptId::FindSubsidies).unwrap();
        assert!(prompt.source.is_override());
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(
            prompt.render_user(&vars(&[("industry", "製造業")])),
            "Custom 製造業"
        );

        let listed = lib.list();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].source.path().is_some());
    }

    #[test]
    fn test_broken_override_listed_as_unloadable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("find_subsidies.md"), "no frontmatter").unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.get(PromptId::FindSubsidies).is_err());

        let listed = lib.list();
        assert_eq!(listed[0].version, 0);
        assert!(listed[0].source.is_override());
    }
}
