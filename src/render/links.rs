//! Cross-reference rewriting.
//!
//! Wiki links are written with double angle brackets and expanded into
//! markdown links by an ordered table of passes:
//!
//! | # | Pass          | Input                    | Output                         |
//! |---|---------------|--------------------------|--------------------------------|
//! | 1 | named child   | `` `L <<name>>`_ ``      | `` `L <</page/name>>`_ ``      |
//! | 2 | bare child    | `<<name>>`               | `` `name <</page/name>>`_ ``   |
//! | 3 | named sibling | `` `L <<./name>>`_ ``    | `` `L <</parent/name>>`_ ``    |
//! | 4 | bare sibling  | `<<./name>>`             | `` `name <</parent/name>>`_ `` |
//! | 5 | bare absolute | `<</a/b>>`               | `` `a/b <</a/b>>`_ ``          |
//! | 6 | route         | `` `L <</a/b>>`_ ``      | `[L](/wiki/show/a/b/)`         |
//! | 7 | graphics      | `\includegraphics{x.png}`| `\includegraphics{media/x.png}`|
//!
//! Named forms claim their matches before the bare forms. Tokens that match
//! no pass are left untouched.

use regex::{Captures, Regex};

use crate::address::PageAddress;
use crate::config::WikiConfig;

/// Per-page inputs of the rewrite passes.
#[derive(Debug, Clone)]
pub struct LinkContext<'a> {
    /// Absolute form of the page address (`/` for the root).
    pub current: String,
    /// Absolute form of the parent, `None` for the root.
    pub parent: Option<String>,
    pub config: &'a WikiConfig,
}

impl<'a> LinkContext<'a> {
    pub fn new(address: &PageAddress, config: &'a WikiConfig) -> Self {
        Self {
            current: address.absolute(),
            parent: address.parent().map(|p| p.absolute()),
            config,
        }
    }
}

type Rewrite = fn(&Captures<'_>, &LinkContext<'_>) -> String;

/// One rewrite pass.
struct Pass {
    name: &'static str,
    pattern: Regex,
    /// Sibling passes are skipped on the root page.
    needs_parent: bool,
    rewrite: Rewrite,
}

/// The ordered rewrite table.
pub struct LinkRewriter {
    passes: Vec<Pass>,
}

impl LinkRewriter {
    pub fn new() -> Self {
        let table: [(&'static str, &str, bool, Rewrite); 7] = [
            ("named-child", r"`([^`\n]*?) <<([-\w]+)>>`_", false, named_child),
            ("bare-child", r"<<([-\w]+)>>", false, bare_child),
            ("named-sibling", r"`([^`\n]*?) <<\./([-\w]+)>>`_", true, named_sibling),
            ("bare-sibling", r"<<\./([-\w]+)>>", true, bare_sibling),
            ("bare-absolute", r"<</([-\w/]+)>>(`?)", false, bare_absolute),
            ("route", r"`([^`\n]*?) <</([-\w/]*)>>`_", false, route),
            ("graphics", r"\\includegraphics(\[[^\]\n]*\])?\{([^}/\n]+)\}", false, graphics),
        ];
        let passes = table
            .into_iter()
            .map(|(name, pattern, needs_parent, rewrite)| Pass {
                name,
                pattern: Regex::new(pattern).expect("valid regex"),
                needs_parent,
                rewrite,
            })
            .collect();
        Self { passes }
    }

    /// Names of the passes in execution order.
    #[cfg(test)]
    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|pass| pass.name)
    }

    /// Run every pass in order.
    pub fn rewrite(&self, content: &str, ctx: &LinkContext<'_>) -> String {
        self.passes.iter().fold(content.to_string(), |text, pass| {
            apply(pass, &text, ctx)
        })
    }

    /// Run a single pass by name.
    #[cfg(test)]
    pub fn rewrite_pass(&self, name: &str, content: &str, ctx: &LinkContext<'_>) -> Option<String> {
        let pass = self.passes.iter().find(|pass| pass.name == name)?;
        Some(apply(pass, content, ctx))
    }
}

impl Default for LinkRewriter {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(pass: &Pass, content: &str, ctx: &LinkContext<'_>) -> String {
    if pass.needs_parent && ctx.parent.is_none() {
        return content.to_string();
    }
    pass.pattern
        .replace_all(content, |caps: &Captures<'_>| (pass.rewrite)(caps, ctx))
        .into_owned()
}

/// `/base` + `name`, treating `/` as the root.
fn join(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{name}")
    } else {
        format!("{base}/{name}")
    }
}

fn named_child(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    format!("`{} <<{}>>`_", &caps[1], join(&ctx.current, &caps[2]))
}

fn bare_child(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    format!("`{} <<{}>>`_", &caps[1], join(&ctx.current, &caps[1]))
}

fn named_sibling(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    let parent = ctx.parent.as_deref().unwrap_or("/");
    format!("`{} <<{}>>`_", &caps[1], join(parent, &caps[2]))
}

fn bare_sibling(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    let parent = ctx.parent.as_deref().unwrap_or("/");
    format!("`{} <<{}>>`_", &caps[1], join(parent, &caps[1]))
}

/// A trailing backtick marks a token already inside a labeled link.
fn bare_absolute(caps: &Captures<'_>, _ctx: &LinkContext<'_>) -> String {
    if !caps[2].is_empty() {
        return caps[0].to_string();
    }
    let path = &caps[1];
    format!("`{path} <</{path}>>`_")
}

fn route(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    format!("[{}]({})", &caps[1], ctx.config.routes.show_url_for_path(&caps[2]))
}

fn graphics(caps: &Captures<'_>, ctx: &LinkContext<'_>) -> String {
    let options = caps.get(1).map_or("", |m| m.as_str());
    let image_dir = ctx.config.media.image_dir();
    format!(
        "\\includegraphics{options}{{{}/{}}}",
        image_dir.display(),
        &caps[2]
    )
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config() -> WikiConfig {
        WikiConfig::rooted(Path::new("/srv/wiki"))
    }

    fn ctx<'a>(address: &str, config: &'a WikiConfig) -> LinkContext<'a> {
        LinkContext::new(&PageAddress::parse(address).unwrap(), config)
    }

    #[test]
    fn test_pass_order() {
        let names: Vec<_> = LinkRewriter::new().pass_names().collect();
        assert_eq!(
            names,
            [
                "named-child",
                "bare-child",
                "named-sibling",
                "bare-sibling",
                "bare-absolute",
                "route",
                "graphics"
            ]
        );
    }

    #[test]
    fn test_named_child_pass() {
        let config = config();
        let ctx = ctx("a/b", &config);
        let out = LinkRewriter::new().rewrite_pass("named-child", "`Click <<sub>>`_", &ctx);
        assert_eq!(out.as_deref(), Some("`Click <</a/b/sub>>`_"));
    }

    #[test]
    fn test_bare_child_pass() {
        let config = config();
        let ctx = ctx("a/b", &config);
        let out = LinkRewriter::new().rewrite_pass("bare-child", "see <<sub>>.", &ctx);
        assert_eq!(out.as_deref(), Some("see `sub <</a/b/sub>>`_."));
    }

    #[test]
    fn test_sibling_passes() {
        let config = config();
        let ctx = ctx("a/b", &config);
        let rewriter = LinkRewriter::new();
        let named = rewriter.rewrite_pass("named-sibling", "`Next <<./c>>`_", &ctx);
        assert_eq!(named.as_deref(), Some("`Next <</a/c>>`_"));
        let bare = rewriter.rewrite_pass("bare-sibling", "<<./sib>>", &ctx);
        assert_eq!(bare.as_deref(), Some("`sib <</a/sib>>`_"));
    }

    #[test]
    fn test_root_page_has_no_siblings() {
        let config = config();
        let ctx = ctx("", &config);
        let out = LinkRewriter::new().rewrite("<<./x>> and <<child>>", &ctx);
        assert_eq!(out, "<<./x>> and [child](/wiki/show/child/)");
    }

    #[test]
    fn test_bare_absolute_skips_named() {
        let config = config();
        let ctx = ctx("a", &config);
        let rewriter = LinkRewriter::new();
        let out = rewriter.rewrite_pass("bare-absolute", "go <</x/y>> now", &ctx);
        assert_eq!(out.as_deref(), Some("go `x/y <</x/y>>`_ now"));
        let named = rewriter.rewrite_pass("bare-absolute", "`L <</x/y>>`_", &ctx);
        assert_eq!(named.as_deref(), Some("`L <</x/y>>`_"));
        let end = rewriter.rewrite_pass("bare-absolute", "<</z>>", &ctx);
        assert_eq!(end.as_deref(), Some("`z <</z>>`_"));
    }

    #[test]
    fn test_adjacent_absolute_links() {
        let config = config();
        let ctx = ctx("a", &config);
        assert_eq!(
            LinkRewriter::new().rewrite("<</x>><</y>>", &ctx),
            "[x](/wiki/show/x/)[y](/wiki/show/y/)"
        );
    }

    #[test]
    fn test_route_pass() {
        let config = config();
        let ctx = ctx("a", &config);
        let out = LinkRewriter::new().rewrite_pass("route", "`Guide <</guide/setup>>`_", &ctx);
        assert_eq!(out.as_deref(), Some("[Guide](/wiki/show/guide/setup/)"));
    }

    #[test]
    fn test_graphics_pass() {
        let config = config();
        let ctx = ctx("a", &config);
        let rewriter = LinkRewriter::new();
        let out = rewriter.rewrite_pass("graphics", r"\includegraphics[width=3cm]{cat.png}", &ctx);
        assert_eq!(
            out.as_deref(),
            Some(r"\includegraphics[width=3cm]{/srv/wiki/media/wiki/cat.png}")
        );
        let nested = rewriter.rewrite_pass("graphics", r"\includegraphics{dir/cat.png}", &ctx);
        assert_eq!(nested.as_deref(), Some(r"\includegraphics{dir/cat.png}"));
    }

    #[test]
    fn test_full_rewrite_determinism() {
        let config = config();
        let ctx = ctx("a/b", &config);
        let rewriter = LinkRewriter::new();
        assert_eq!(
            rewriter.rewrite("`Click <<sub>>`_", &ctx),
            "[Click](/wiki/show/a/b/sub/)"
        );
        assert_eq!(rewriter.rewrite("<<./sib>>", &ctx), "[sib](/wiki/show/a/sib/)");
        assert_eq!(
            rewriter.rewrite("<</x>> and `L <</y>>`_", &ctx),
            "[x](/wiki/show/x/) and [L](/wiki/show/y/)"
        );
    }

    #[test]
    fn test_malformed_left_alone() {
        let config = config();
        let ctx = ctx("a", &config);
        let rewriter = LinkRewriter::new();
        for input in ["<<>>", "<<a b>>", "<<unclosed", "`L <<>>`_"] {
            assert_eq!(rewriter.rewrite(input, &ctx), input);
        }
    }
}
