//! Hierarchical addressing of emitted procedures.
//!
//! A [`Path`] names a namespace, a module inside it, a frame inside the
//! module and a block inside the frame. The same value serves as a readable
//! label in diagnostics and as the procedure identifier / file location in
//! the generated datapack.

use std::{fmt::Write, path::PathBuf, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    namespace: Option<String>,
    module: Option<String>,
    frame: Option<String>,
    block: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("`{component}` component given without the components above it")]
    MissingParent { component: &'static str },
    #[error("empty `{component}` component")]
    EmptyComponent { component: &'static str },
    #[error("`{0}` is not a procedure identifier of the form `namespace:module[/frame[/block]]`")]
    Malformed(String),
}

impl Path {
    /// Builds a path, checking that no component is present without all of
    /// the shallower ones.
    pub fn new(
        namespace: Option<&str>,
        module: Option<&str>,
        frame: Option<&str>,
        block: Option<&str>,
    ) -> Result<Self, PathError> {
        let components = [
            ("namespace", namespace),
            ("module", module),
            ("frame", frame),
            ("block", block),
        ];

        for (depth, (component, value)) in components.iter().enumerate() {
            if value.is_some_and(str::is_empty) {
                return Err(PathError::EmptyComponent {
                    component: *component,
                });
            }

            if value.is_some() && components[..depth].iter().any(|(_, v)| v.is_none()) {
                return Err(PathError::MissingParent {
                    component: *component,
                });
            }
        }

        Ok(Self {
            namespace: namespace.map(str::to_owned),
            module: module.map(str::to_owned),
            frame: frame.map(str::to_owned),
            block: block.map(str::to_owned),
        })
    }

    pub fn namespace(name: &str) -> Self {
        Self {
            namespace: Some(name.to_owned()),
            module: None,
            frame: None,
            block: None,
        }
    }

    /// Derives the path of a module inside this path's namespace.
    pub fn with_module(&self, name: &str) -> Self {
        assert!(self.namespace.is_some(), "module path without a namespace");

        Self {
            namespace: self.namespace.clone(),
            module: Some(name.to_owned()),
            frame: None,
            block: None,
        }
    }

    /// Derives the path of a frame inside this path's module.
    pub fn with_frame(&self, name: &str) -> Self {
        assert!(self.module.is_some(), "frame path without a module");

        Self {
            frame: Some(name.to_owned()),
            block: None,
            ..self.clone()
        }
    }

    /// Derives the path of a block inside this path's frame, or the frame
    /// itself for `None`.
    pub fn with_block(&self, name: Option<&str>) -> Self {
        assert!(self.frame.is_some(), "block path without a frame");

        Self {
            block: name.map(str::to_owned),
            ..self.clone()
        }
    }

    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn frame_name(&self) -> Option<&str> {
        self.frame.as_deref()
    }

    pub fn block_name(&self) -> Option<&str> {
        self.block.as_deref()
    }

    fn trailing(&self) -> impl Iterator<Item = &str> {
        [&self.module, &self.frame, &self.block]
            .into_iter()
            .map_while(|component| component.as_deref())
    }

    /// Identifier used to invoke the procedure: `ns:module/frame/block`
    pub fn procedure_id(&self) -> String {
        let mut id = self.namespace.as_deref().map(escape).unwrap_or_default();

        for (i, component) in self.trailing().enumerate() {
            id.push(if i == 0 { ':' } else { '/' });
            id.push_str(&escape(component));
        }

        id
    }

    /// Location of the procedure file relative to the datapack root
    pub fn file(&self) -> PathBuf {
        let mut file = PathBuf::from("data");

        if let Some(namespace) = &self.namespace {
            file.push(escape(namespace));
        }

        file.push("functions");

        let components = self.trailing().map(escape).collect::<Vec<_>>();

        if let Some((last, parents)) = components.split_last() {
            file.extend(parents);
            file.push(format!("{last}.mcfunction"));
        }

        file
    }
}

/// Procedure identifiers only admit `[a-z0-9_.-]`, so upper-case letters are
/// written as `-` followed by their lower-case form.
fn escape(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());

    for c in component.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('-');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }

    escaped
}

impl core::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(namespace) = &self.namespace {
            f.write_str(namespace)?;
        }

        if let Some(module) = &self.module {
            write!(f, ":{module}")?;
        }

        if let Some(frame) = &self.frame {
            write!(f, ".{frame}")?;
        }

        if let Some(block) = &self.block {
            f.write_char('[')?;
            f.write_str(block)?;
            f.write_char(']')?;
        }

        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Parses a procedure identifier such as `lib:print` or `lib:math/abs`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PathError::Malformed(s.to_owned());

        let (namespace, rest) = s.split_once(':').ok_or_else(malformed)?;
        let mut segments = rest.split('/');

        let module = segments.next();
        let frame = segments.next();
        let block = segments.next();

        if segments.next().is_some() {
            return Err(malformed());
        }

        Path::new(Some(namespace), module, frame, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_path() -> Path {
        Path::namespace("demo")
            .with_module("main")
            .with_frame("__module__.tick")
            .with_block(Some("4.true1"))
    }

    #[test]
    fn display_and_identifiers() {
        let path = block_path();

        assert_eq!(path.to_string(), "demo:main.__module__.tick[4.true1]");
        assert_eq!(path.procedure_id(), "demo:main/__module__.tick/4.true1");
        assert_eq!(
            path.file(),
            PathBuf::from("data/demo/functions/main/__module__.tick/4.true1.mcfunction")
        );
    }

    #[test]
    fn frame_root_has_no_block_component() {
        let root = block_path().with_block(None);

        assert_eq!(root.procedure_id(), "demo:main/__module__.tick");
        assert_eq!(root.block_name(), None);
        assert_eq!(root.frame_name(), Some("__module__.tick"));
    }

    #[test]
    fn upper_case_is_escaped() {
        let path = Path::namespace("demo")
            .with_module("main")
            .with_frame("__module__.getScore");

        assert_eq!(path.procedure_id(), "demo:main/__module__.get-score");
    }

    #[test]
    fn deeper_components_require_shallower_ones() {
        assert_eq!(
            Path::new(Some("ns"), None, Some("frame"), None),
            Err(PathError::MissingParent { component: "frame" })
        );
        assert_eq!(
            Path::new(None, None, None, Some("block")),
            Err(PathError::MissingParent { component: "block" })
        );
        assert!(Path::new(Some("ns"), Some("m"), None, None).is_ok());
    }

    #[test]
    fn parses_procedure_identifiers() {
        let path: Path = "lib:math/abs".parse().expect("valid identifier");

        assert_eq!(path.namespace_name(), Some("lib"));
        assert_eq!(path.module_name(), Some("math"));
        assert_eq!(path.frame_name(), Some("abs"));
        assert_eq!(path.procedure_id(), "lib:math/abs");

        assert!("no_namespace".parse::<Path>().is_err());
        assert!("lib:".parse::<Path>().is_err());
    }
}
