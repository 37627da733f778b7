use hashbrown::HashMap;
use thiserror::Error;

use crate::middle::{cfg::FrameId, path::Path, storage::NameIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A variable stored in the acting entity's name slots
    Variable(NameIndex),
    Function(FunctionSymbol),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Root procedure of the callee
    pub path: Path,
    pub parameters: Vec<String>,
    pub origin: FunctionOrigin,
}

impl FunctionSymbol {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionOrigin {
    /// Compiled from a `def` in this module
    Frame(FrameId),
    /// Pre-written library procedure, only known by path and arity
    External,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("`{name}` is already declared in scope `{layer}`")]
    AlreadyDeclared { name: String, layer: String },
    #[error("`{0}` is not declared")]
    NotFound(String),
}

/// A symbol found by [`SymbolTable::resolve`]
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub symbol: &'a Symbol,
    /// Number of layers between the innermost one and the one holding the
    /// symbol (0 for the innermost layer)
    pub distance: usize,
}

#[derive(Debug)]
struct Layer {
    name: String,
    symbols: HashMap<String, Symbol>,
}

/// Stack of lexical scope layers, searched innermost-first
#[derive(Debug, Default)]
pub struct SymbolTable {
    layers: Vec<Layer>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a scope for a module or frame
    pub fn push_layer(&mut self, name: impl Into<String>) {
        self.layers.push(Layer {
            name: name.into(),
            symbols: HashMap::new(),
        });
    }

    /// Closes the innermost scope
    pub fn pop_layer(&mut self) {
        assert!(
            !self.layers.is_empty(),
            "Attempted to pop a layer from an empty symbol table"
        );

        self.layers.pop();
    }

    pub fn current_layer_name(&self) -> Option<&str> {
        self.layers.last().map(|layer| layer.name.as_str())
    }

    /// Declares a symbol in the innermost layer. Shadowing a symbol of an
    /// enclosing layer is fine; declaring one twice in the same layer is not.
    pub fn add_symbol(&mut self, name: impl Into<String>, symbol: Symbol) -> Result<(), SymbolError> {
        let name = name.into();

        let Some(layer) = self.layers.last_mut() else {
            panic!("Tried to add a symbol with no layer pushed");
        };

        if layer.symbols.contains_key(&name) {
            return Err(SymbolError::AlreadyDeclared {
                name,
                layer: layer.name.clone(),
            });
        }

        layer.symbols.insert(name, symbol);

        Ok(())
    }

    /// Looks for a symbol only within the innermost layer
    pub fn get_local(&self, name: &str) -> Option<&Symbol> {
        self.layers.last()?.symbols.get(name)
    }

    pub fn resolve(&self, name: &str) -> Option<Resolved<'_>> {
        self.layers
            .iter()
            .rev()
            .enumerate()
            .find_map(|(distance, layer)| {
                layer
                    .symbols
                    .get(name)
                    .map(|symbol| Resolved { symbol, distance })
            })
    }

    pub fn get_symbol(&self, name: &str) -> Result<&Symbol, SymbolError> {
        self.resolve(name)
            .map(|resolved| resolved.symbol)
            .ok_or_else(|| SymbolError::NotFound(name.to_owned()))
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> Symbol {
        Symbol::Variable(NameIndex(name.to_owned()))
    }

    #[test]
    fn redeclaration_in_the_same_layer_fails() {
        let mut table = SymbolTable::new();
        table.push_layer("__module__");

        table.add_symbol("x", variable("x")).expect("first declaration");

        assert_eq!(
            table.add_symbol("x", variable("x")),
            Err(SymbolError::AlreadyDeclared {
                name: "x".to_owned(),
                layer: "__module__".to_owned()
            })
        );
    }

    #[test]
    fn shadowing_resolves_innermost_first() {
        let mut table = SymbolTable::new();
        table.push_layer("__module__");
        table.add_symbol("x", variable("outer")).expect("outer x");

        table.push_layer("__module__.f");
        table.add_symbol("x", variable("inner")).expect("shadowing x");

        assert_eq!(table.get_symbol("x"), Ok(&variable("inner")));
        assert_eq!(table.resolve("x").map(|r| r.distance), Some(0));

        table.pop_layer();

        assert_eq!(table.get_symbol("x"), Ok(&variable("outer")));
    }

    #[test]
    fn lookups_walk_outwards() {
        let mut table = SymbolTable::new();
        table.push_layer("builtins");
        table.add_symbol("y", variable("y")).expect("y");
        table.push_layer("__module__");

        assert!(table.has_symbol("y"));
        assert!(table.get_local("y").is_none());
        assert_eq!(table.resolve("y").map(|r| r.distance), Some(1));
        assert!(!table.has_symbol("z"));
        assert_eq!(
            table.get_symbol("z"),
            Err(SymbolError::NotFound("z".to_owned()))
        );
    }
}
