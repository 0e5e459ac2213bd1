//! User template rendering.
//!
//! Templates are handlebars strings evaluated against the run context, e.g.
//! `"{{project_name}} {{tag}}"`. Unknown variables are errors.

use crate::context::Context;
use crate::error::{ReleaseError, Result};
use handlebars::Handlebars;
use serde_json::{Map, Value};

/// Renders templates against a [`Context`]
pub struct Template {
    registry: Handlebars<'static>,
    data: Map<String, Value>,
}

impl Template {
    /// Template data drawn from the context
    pub fn new(ctx: &Context) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        let mut data = Map::new();
        data.insert("project_name".into(), ctx.config.project_name.clone().into());
        data.insert("tag".into(), ctx.git.current_tag.clone().into());
        data.insert(
            "previous_tag".into(),
            ctx.git.previous_tag.clone().unwrap_or_default().into(),
        );
        data.insert("commit".into(), ctx.git.commit.clone().into());
        data.insert(
            "short_commit".into(),
            ctx.git.commit.chars().take(7).collect::<String>().into(),
        );
        data.insert(
            "version".into(),
            ctx.git.current_tag.trim_start_matches('v').to_string().into(),
        );
        if let Some(version) = &ctx.version {
            data.insert("major".into(), version.major.into());
            data.insert("minor".into(), version.minor.into());
            data.insert("patch".into(), version.patch.into());
            data.insert("prerelease_suffix".into(), version.pre.to_string().into());
        }
        data.insert("prerelease".into(), ctx.prerelease.into());
        data.insert("date".into(), ctx.date.to_rfc3339().into());
        data.insert("timestamp".into(), ctx.date.timestamp().into());
        data.insert(
            "release_url".into(),
            ctx.release_url.clone().unwrap_or_default().into(),
        );

        Self { registry, data }
    }

    /// Add or override a template variable
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Render a template
    pub fn apply(&self, template: &str) -> Result<String> {
        self.registry
            .render_template(template, &self.data)
            .map_err(|e| ReleaseError::Template {
                template: template.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::GitInfo;

    fn ctx() -> Context {
        let mut config = Config::default();
        config.project_name = "tool".to_string();
        Context::new(
            config,
            GitInfo {
                current_tag: "v1.4.2".to_string(),
                previous_tag: Some("v1.4.1".to_string()),
                commit: "0123456789abcdef".to_string(),
            },
        )
    }

    #[test]
    fn test_renders_context_fields() {
        let rendered = Template::new(&ctx())
            .apply("{{project_name}} {{tag}} ({{version}}, {{major}}.{{minor}}) {{short_commit}}")
            .expect("render");
        assert_eq!(rendered, "tool v1.4.2 (1.4.2, 1.4) 0123456");
    }

    #[test]
    fn test_does_not_html_escape() {
        let rendered = Template::new(&ctx())
            .with_field("title", "a & <b>")
            .apply("{{title}}")
            .expect("render");
        assert_eq!(rendered, "a & <b>");
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let err = Template::new(&ctx()).apply("{{nope}}").unwrap_err();
        assert!(matches!(err, ReleaseError::Template { .. }));
    }
}
