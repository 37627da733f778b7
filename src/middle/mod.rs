//! The middle of the compiler takes the parsed module to a control flow
//! graph: named blocks of canonical stack-machine ops, grouped into frames.

pub mod cfg;
pub mod lowering;
pub mod op;
pub mod path;
pub mod storage;
pub mod symbol_table;
