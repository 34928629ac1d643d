// src/config/render.rs

//! Rendering of the named configuration file from a template.
//!
//! The template language is deliberately tiny:
//!
//! - `{{ key }}` substitutes a `[vars]` entry, or one of the built-ins
//!   `port` and `user`.
//! - `{{#zones}} ... {{/zones}}` repeats its body once per zone. Inside the
//!   body, `{{ name }}`, `{{ file }}`, `{{ kind }}` refer to the current zone,
//!   and the list fields `{{ masters }}`, `{{ allow_transfer }}` and
//!   `{{ also_notify }}` expand to `a; b; ` so they drop straight into a BIND
//!   address list (`masters { {{ masters }}};`).
//!
//! Any unknown key, or a stray section tag, is a [`ZonewatchError::TemplateError`].

use std::path::Path;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::config::model::{ZoneConfig, ZoneEntry};
use crate::errors::{Result, ZonewatchError};
use crate::fs::FileSystem;

const SECTION_PATTERN: &str = r"(?s)\{\{#zones\}\}(.*?)\{\{/zones\}\}";
const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";
const STRAY_TAG_PATTERN: &str = r"\{\{\s*[#/][^}]*\}\}";

/// Values available to the template besides the zone description itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a ZoneConfig,
    pub port: u16,
    pub user: &'a str,
}

#[derive(Debug)]
pub struct TemplateRenderer {
    section: Regex,
    placeholder: Regex,
    stray_tag: Regex,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            section: compile(SECTION_PATTERN)?,
            placeholder: compile(PLACEHOLDER_PATTERN)?,
            stray_tag: compile(STRAY_TAG_PATTERN)?,
        })
    }

    /// Render `template` against `ctx`.
    pub fn render(&self, template: &str, ctx: &RenderContext<'_>) -> Result<String> {
        // Expand zone sections first so their bodies see zone-scoped keys.
        let mut expanded = String::with_capacity(template.len());
        let mut last = 0;
        for caps in self.section.captures_iter(template) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
            let body = caps.get(1).map_or("", |m| m.as_str());
            expanded.push_str(&template[last..whole.start]);
            for zone in ctx.config.zones.iter() {
                let rendered = self.substitute(body, |key| {
                    zone_value(zone, key).or_else(|| global_value(ctx, key))
                })?;
                expanded.push_str(&rendered);
            }
            last = whole.end;
        }
        expanded.push_str(&template[last..]);

        if let Some(stray) = self.stray_tag.find(&expanded) {
            return Err(ZonewatchError::TemplateError(format!(
                "unbalanced or unknown section tag '{}'",
                stray.as_str()
            )));
        }

        self.substitute(&expanded, |key| global_value(ctx, key))
    }

    fn substitute<F>(&self, text: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.placeholder.captures_iter(text) {
            let (range, key) = placeholder_parts(&caps);
            let value = lookup(key).ok_or_else(|| {
                ZonewatchError::TemplateError(format!("unknown template key '{}'", key))
            })?;
            out.push_str(&text[last..range.start]);
            out.push_str(&value);
            last = range.end;
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Read `template_path`, render it and write the result to `dest`.
///
/// Any failure here is a fatal startup error for the caller.
pub fn render_to_file(
    fs: &dyn FileSystem,
    template_path: &Path,
    dest: &Path,
    ctx: &RenderContext<'_>,
) -> Result<String> {
    let template = fs.read_to_string(template_path).map_err(|e| {
        ZonewatchError::TemplateError(format!(
            "cannot read template file {:?}: {e:#}",
            template_path
        ))
    })?;

    let rendered = TemplateRenderer::new()?.render(&template, ctx)?;
    debug!(bytes = rendered.len(), "rendered named configuration");

    fs.write(dest, rendered.as_bytes())?;
    info!(dest = ?dest, zones = ctx.config.zones.len(), "wrote named configuration");

    Ok(rendered)
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ZonewatchError::TemplateError(format!("invalid pattern {pattern}: {e}")))
}

fn placeholder_parts<'t>(caps: &Captures<'t>) -> (std::ops::Range<usize>, &'t str) {
    let range = caps.get(0).map(|m| m.range()).unwrap_or_default();
    let key = caps.get(1).map_or("", |m| m.as_str());
    (range, key)
}

fn global_value(ctx: &RenderContext<'_>, key: &str) -> Option<String> {
    match key {
        "port" => Some(ctx.port.to_string()),
        "user" => Some(ctx.user.to_string()),
        other => ctx.config.vars.get(other).cloned(),
    }
}

fn zone_value(zone: &ZoneEntry, key: &str) -> Option<String> {
    match key {
        "name" => Some(zone.name.clone()),
        "file" => Some(zone.file.clone().unwrap_or_default()),
        "kind" => Some(zone.kind.as_str().to_string()),
        "masters" => Some(address_list(&zone.masters)),
        "allow_transfer" => Some(address_list(&zone.allow_transfer)),
        "also_notify" => Some(address_list(&zone.also_notify)),
        _ => None,
    }
}

fn address_list(items: &[String]) -> String {
    items.iter().map(|item| format!("{item}; ")).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::model::ZoneKind;

    fn zone(name: &str, kind: ZoneKind) -> ZoneEntry {
        ZoneEntry {
            name: name.to_string(),
            file: Some(format!("masterzones/{name}.zone")),
            kind,
            masters: vec![],
            allow_transfer: vec![],
            also_notify: vec![],
        }
    }

    fn config() -> ZoneConfig {
        let mut vars = BTreeMap::new();
        vars.insert("directory".to_string(), "/var/cache/bind".to_string());
        let mut slave = zone("example.net", ZoneKind::Slave);
        slave.file = None;
        slave.masters = vec!["192.0.2.1".to_string(), "192.0.2.3".to_string()];
        ZoneConfig::new_unchecked(vars, vec![zone("example.com", ZoneKind::Master), slave])
    }

    #[test]
    fn renders_vars_builtins_and_zone_sections() {
        let cfg = config();
        let ctx = RenderContext {
            config: &cfg,
            port: 5353,
            user: "named",
        };
        let template = "options { directory \"{{ directory }}\"; listen-on port {{port}}; };\n\
{{#zones}}zone \"{{ name }}\" { type {{ kind }}; masters { {{ masters }}}; };\n{{/zones}}";

        let out = TemplateRenderer::new().unwrap().render(template, &ctx).unwrap();

        assert_eq!(
            out,
            "options { directory \"/var/cache/bind\"; listen-on port 5353; };\n\
zone \"example.com\" { type master; masters { }; };\n\
zone \"example.net\" { type slave; masters { 192.0.2.1; 192.0.2.3; }; };\n"
        );
    }

    #[test]
    fn zone_keys_are_unknown_outside_sections() {
        let cfg = config();
        let ctx = RenderContext {
            config: &cfg,
            port: 53,
            user: "bind",
        };
        let err = TemplateRenderer::new()
            .unwrap()
            .render("zone {{ name }}", &ctx)
            .unwrap_err();
        assert!(matches!(err, ZonewatchError::TemplateError(msg) if msg.contains("'name'")));
    }

    #[test]
    fn unclosed_section_is_an_error() {
        let cfg = config();
        let ctx = RenderContext {
            config: &cfg,
            port: 53,
            user: "bind",
        };
        let err = TemplateRenderer::new()
            .unwrap()
            .render("{{#zones}} {{ name }}", &ctx)
            .unwrap_err();
        assert!(matches!(err, ZonewatchError::TemplateError(msg) if msg.contains("section tag")));
    }

    #[test]
    fn render_to_file_writes_destination() {
        use crate::fs::mock::MockFileSystem;

        let fs = MockFileSystem::new();
        fs.add_file("/etc/bind/named.conf.tmpl", "user={{ user }}\n");
        let cfg = config();
        let ctx = RenderContext {
            config: &cfg,
            port: 53,
            user: "bind",
        };

        render_to_file(
            &fs,
            Path::new("/etc/bind/named.conf.tmpl"),
            Path::new("/etc/bind/named.conf"),
            &ctx,
        )
        .unwrap();

        assert_eq!(
            fs.contents("/etc/bind/named.conf").as_deref(),
            Some(&b"user=bind\n"[..])
        );
    }
}
