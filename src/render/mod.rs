//! @acp:module "Template Renderer"
//! @acp:summary "Substitute placeholder tokens across a template tree"
//! @acp:domain cli
//! @acp:layer service
//!
//! Walks a protocol template directory and writes a mirrored tree in which
//! every configured token is replaced. The template directory is only read.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::{Config, Placeholder, PlaceholderSource};
use crate::error::Result;
use crate::table::ParameterTable;

/// Counts from one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Files written to the output tree
    pub files: usize,
    /// Files where at least one token was replaced
    pub substituted: usize,
}

/// Resolved token/replacement pairs for one (template, data file) pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    /// Resolve every placeholder against the table. Fails on the first
    /// column the table does not have.
    pub fn resolve(
        placeholders: &[Placeholder],
        separator: &str,
        version_suffix: &str,
        table: &ParameterTable,
    ) -> Result<Self> {
        let pairs = placeholders
            .iter()
            .map(|p| -> Result<(String, String)> {
                let replacement = match &p.source {
                    PlaceholderSource::VersionSuffix => version_suffix.to_string(),
                    PlaceholderSource::Column(column) => table.joined(column, separator)?,
                };
                Ok((p.token.clone(), replacement))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { pairs })
    }

    /// Apply all replacements in declaration order. Returns `None` when no
    /// token occurs in `content`.
    pub fn apply(&self, content: &str) -> Option<String> {
        let mut output: Option<String> = None;
        for (token, replacement) in &self.pairs {
            if token.is_empty() {
                continue;
            }
            let current = output.as_deref().unwrap_or(content);
            if current.contains(token.as_str()) {
                output = Some(current.replace(token.as_str(), replacement));
            }
        }
        output
    }
}

/// @acp:summary "Renders template trees with the configured placeholders"
#[derive(Debug, Clone)]
pub struct Renderer {
    placeholders: Vec<Placeholder>,
    separator: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self {
            placeholders: config.placeholders.clone(),
            separator: config.value_separator.clone(),
        }
    }

    /// @acp:summary "Render `template_dir` into `output_dir`"
    /// @acp:ai-careful "Output files are overwritten; the template tree is never modified"
    pub fn render(
        &self,
        template_dir: &Path,
        output_dir: &Path,
        version_suffix: &str,
        table: &ParameterTable,
    ) -> Result<RenderSummary> {
        let substitutions =
            Substitutions::resolve(&self.placeholders, &self.separator, version_suffix, table)?;

        let mut summary = RenderSummary::default();

        for entry in WalkDir::new(template_dir).sort_by_file_name() {
            let entry = entry?;
            // Symlinked files render like regular files; symlinked dirs are not followed
            let file_type = entry.file_type();
            if !(file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())) {
                continue;
            }

            let input_path = entry.path();
            let relative = input_path
                .strip_prefix(template_dir)
                .unwrap_or(input_path);
            let output_path = output_dir.join(relative);

            let content = fs::read_to_string(input_path)?;
            let rendered = substitutions.apply(&content);
            if rendered.is_some() {
                summary.substituted += 1;
            }

            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, rendered.as_deref().unwrap_or(&content))?;
            summary.files += 1;

            tracing::trace!(file = %relative.display(), "Rendered template file");
        }

        tracing::debug!(
            template = %template_dir.display(),
            files = summary.files,
            substituted = summary.substituted,
            "Rendered template tree"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table(content: &str) -> ParameterTable {
        ParameterTable::from_reader("v2.csv", content.as_bytes()).unwrap()
    }

    fn full_table() -> ParameterTable {
        table("pa1,pa2,pa3,total_output_power\n1,4,7,10\n2,5,8,11\n3,6,9,12\n")
    }

    fn substitutions(t: &ParameterTable) -> Substitutions {
        let config = Config::default();
        Substitutions::resolve(&config.placeholders, &config.value_separator, "v2", t).unwrap()
    }

    #[test]
    fn test_column_token_joined() {
        let subs = substitutions(&full_table());
        assert_eq!(subs.apply("//PROTOCOL_DATA_PA1").unwrap(), "1,\n2,\n3");
        assert_eq!(
            subs.apply("x = [\n//PROTOCOL_DATA_TOTAL_OUTPUT_POWER\n];").unwrap(),
            "x = [\n10,\n11,\n12\n];"
        );
    }

    #[test]
    fn test_version_suffix_every_occurrence() {
        let subs = substitutions(&full_table());
        assert_eq!(
            subs.apply("name_{PROTOCOL_VERSION_SUFFIX} {PROTOCOL_VERSION_SUFFIX}").unwrap(),
            "name_v2 v2"
        );
    }

    #[test]
    fn test_no_tokens_passes_through() {
        let subs = substitutions(&full_table());
        assert_eq!(subs.apply("<Protocol>\r\n  plain\r\n</Protocol>"), None);
    }

    #[test]
    fn test_missing_column_fails_resolution() {
        let config = Config::default();
        let t = table("pa1,pa2\n1,2\n");
        let err =
            Substitutions::resolve(&config.placeholders, &config.value_separator, "v2", &t)
                .unwrap_err();
        assert!(err.to_string().contains("missing column 'pa3'"));
    }

    #[test]
    fn test_render_mirrors_tree() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("Skyline/QActions")).unwrap();
        fs::write(
            src.path().join("protocol.xml"),
            "<Version>1.0.0.1-{PROTOCOL_VERSION_SUFFIX}</Version>",
        )
        .unwrap();
        fs::write(
            src.path().join("Skyline/QActions/QAction_1.cs"),
            "double[] pa2 = {\n//PROTOCOL_DATA_PA2\n};",
        )
        .unwrap();
        fs::write(src.path().join("Skyline/readme.txt"), "static").unwrap();

        let summary = Renderer::default()
            .render(src.path(), out.path(), "v2", &full_table())
            .unwrap();

        assert_eq!(summary, RenderSummary { files: 3, substituted: 2 });
        assert_eq!(
            fs::read_to_string(out.path().join("protocol.xml")).unwrap(),
            "<Version>1.0.0.1-v2</Version>"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("Skyline/QActions/QAction_1.cs")).unwrap(),
            "double[] pa2 = {\n4,\n5,\n6\n};"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("Skyline/readme.txt")).unwrap(),
            "static"
        );
        // Template untouched
        assert_eq!(
            fs::read_to_string(src.path().join("protocol.xml")).unwrap(),
            "<Version>1.0.0.1-{PROTOCOL_VERSION_SUFFIX}</Version>"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_rendered() {
        use std::os::unix::fs::symlink;

        let root = TempDir::new().unwrap();
        let src = root.path().join("DAB");
        let shared = root.path().join("shared");
        let out = TempDir::new().unwrap();
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(shared.join("inner")).unwrap();
        fs::write(src.join("protocol.xml"), "<Protocol/>").unwrap();
        fs::write(shared.join("shared.xml"), "v={PROTOCOL_VERSION_SUFFIX}").unwrap();
        fs::write(shared.join("inner/deep.xml"), "deep").unwrap();
        symlink(shared.join("shared.xml"), src.join("linked.xml")).unwrap();
        symlink(shared.join("inner"), src.join("linked_dir")).unwrap();

        let summary = Renderer::default()
            .render(&src, out.path(), "v2", &full_table())
            .unwrap();

        assert_eq!(summary, RenderSummary { files: 2, substituted: 1 });
        assert_eq!(fs::read_to_string(out.path().join("linked.xml")).unwrap(), "v=v2");
        assert!(!out.path().join("linked_dir").exists());
        assert!(!fs::symlink_metadata(out.path().join("linked.xml"))
            .unwrap()
            .file_type()
            .is_symlink());
    }

    #[test]
    fn test_custom_placeholders() {
        let config = Config {
            placeholders: vec![Placeholder::column("@@GAIN@@", "gain")],
            value_separator: ";".to_string(),
            ..Default::default()
        };
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), "@@GAIN@@").unwrap();

        Renderer::new(&config)
            .render(src.path(), out.path(), "v1", &table("gain\n0.5\n1.5\n"))
            .unwrap();

        assert_eq!(fs::read_to_string(out.path().join("a.txt")).unwrap(), "0.5;1.5");
    }
}
