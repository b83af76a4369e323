use icss_core::{compile, CompileError};

pub fn compile_ok(src: &str) -> String {
    match compile(src) {
        Ok(css) => css,
        Err(err) => panic!("expected {:?} to compile, got {}", src, err),
    }
}

/// Messages of every checker diagnostic, in document order.
pub fn check_messages(src: &str) -> Vec<String> {
    match compile(src) {
        Err(CompileError::Check(diagnostics)) => diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.message)
            .collect(),
        Ok(css) => panic!("expected check errors, compiled to {:?}", css),
        Err(other) => panic!("expected check errors, got {}", other),
    }
}
