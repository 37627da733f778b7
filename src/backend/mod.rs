//! The backend turns a module's control flow graph into procedures.
//!
//! 1. The assembler resolves names and expands calls and links into target
//!    instructions.
//! 2. The verifier assigns every block its entry stack depth and sizes each
//!    frame's stack.
//! 3. Emission renders the instructions to commands with the stack cursor
//!    baked in, and writes them out.

pub mod assembler;
pub mod emit;
pub mod instruction;
pub mod verify;
