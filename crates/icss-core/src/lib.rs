pub mod ast;
pub mod checker;
pub mod emitter;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod scope;

pub use checker::Checker;
pub use error::{CompileError, Diagnostic};
pub use evaluator::Evaluator;
pub use prelude::Prelude;

use ast::Ast;

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub prelude: Prelude,
}

/// Compile ICSS source to CSS with default options.
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, &Options::default())
}

/// Parse, check, evaluate and emit. Evaluation only runs on a tree with no
/// checker errors.
pub fn compile_with(source: &str, options: &Options) -> Result<String, CompileError> {
    let mut ast = check_with(source, options)?;

    Evaluator::with_globals(options.prelude.iter()).apply(&mut ast)?;

    let css = emitter::emit_css(&ast.root);
    tracing::debug!(bytes = css.len(), "emitted css");
    Ok(css)
}

/// Parse and check only, returning the annotated tree when it is clean.
pub fn check_with(source: &str, options: &Options) -> Result<Ast, CompileError> {
    let mut ast = parser::parse(source)?;

    Checker::with_globals(options.prelude.iter()).check(&mut ast);

    let diagnostics = ast.diagnostics();
    if !diagnostics.is_empty() {
        tracing::debug!(count = diagnostics.len(), "check failed");
        return Err(CompileError::Check(diagnostics));
    }
    Ok(ast)
}
