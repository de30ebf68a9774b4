/// Query AST types.
pub mod ast;
/// JSON serialization helpers for the AST.
pub mod dump;
/// Query lexer: splits a line into borrowed argument tokens.
pub mod lexer;
/// Recursive-descent parser: resolves commands, checks arity and argument
/// types, and builds the AST.
pub mod parser;
