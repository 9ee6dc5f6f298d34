/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: the per-file `Module`
/// - expressions: expression nodes and the operator catalogue
/// - statements: statement and declaration nodes
/// - types: type references written in declarations and signatures
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
