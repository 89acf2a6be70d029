//! Template types for typed variable injection.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::path::Path;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
///
/// Embedded templates are `'static`; overrides loaded from disk are owned.
#[derive(Debug)]
pub struct Template<V> {
    content: Cow<'static, str>,
    _marker: PhantomData<V>,
}

impl<V> Clone for Template<V> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            _marker: PhantomData,
        }
    }
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content: Cow::Borrowed(content),
            _marker: PhantomData,
        }
    }

    /// Use `path` when it exists, otherwise fall back to `self`.
    pub fn or_override(&self, path: &Path) -> std::io::Result<Self> {
        if !path.is_file() {
            return Ok(self.clone());
        }
        Ok(Self {
            content: Cow::Owned(std::fs::read_to_string(path)?),
            _marker: PhantomData,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct NameVars<'a>(&'a str);

    impl TemplateVars for NameVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__NAME__", self.0)
        }
    }

    const HELLO: Template<NameVars<'static>> = Template::new("hello __NAME__");

    #[test]
    fn test_render() {
        assert_eq!(HELLO.render(&NameVars("wiki")), "hello wiki");
    }

    #[test]
    fn test_override() {
        let dir = TempDir::new().unwrap();
        let missing = HELLO.or_override(&dir.path().join("none.txt")).unwrap();
        assert_eq!(missing.content(), "hello __NAME__");

        let path = dir.path().join("custom.txt");
        std::fs::write(&path, "bye __NAME__").unwrap();
        let custom = HELLO.or_override(&path).unwrap();
        assert_eq!(custom.render(&NameVars("wiki")), "bye wiki");
    }
}
