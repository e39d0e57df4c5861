//! WASM module validation: guest ABI checks.
//!
//! Validates that a compiled guest module can be driven by the bridge
//! before any of its code runs. Checks:
//!
//! 1. `memory` export present
//! 2. `init` and `render` exports with a supported shape
//! 3. `getGlobalInput` when `render` takes the input pointer
//! 4. Optional allocator and scratch exports, when present, have the right shape
//! 5. Every import is a function from `env` or `wasi_snapshot_preview1`
//!    that the linker provides (unless unknown imports are linked as traps)

use wasmtime::{ExternType, FuncType, Module, ValType};

use crate::error::SandboxError;
use crate::linker::{is_provided, ENV_MODULE, WASI_MODULE};

/// Shape of the guest's `render` export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAbi {
    /// `render()`: the guest reads input some other way.
    NoArgs,
    /// `render(input_ptr)`: the host writes the input record first.
    WithInput,
}

/// Export shape: (name, param count, result count). All values are i32.
const OPTIONAL_EXPORTS: &[(&str, usize, usize)] = &[
    ("my_malloc", 1, 1),
    ("my_free", 1, 0),
    ("getGlobalAddress", 0, 1),
];

/// Validate a guest module and report the shape of its `render` export.
pub fn validate_module(module: &Module, trap_unknown_imports: bool) -> Result<RenderAbi, SandboxError> {
    let abi = validate_exports(module)?;
    validate_imports(module, trap_unknown_imports)?;
    Ok(abi)
}

fn func_export(module: &Module, name: &str) -> Result<Option<FuncType>, SandboxError> {
    match module.exports().find(|e| e.name() == name).map(|e| e.ty()) {
        None => Ok(None),
        Some(ExternType::Func(ft)) => Ok(Some(ft)),
        Some(_) => Err(SandboxError::ValidationError(format!(
            "export '{}' must be a function",
            name
        ))),
    }
}

fn has_shape(ft: &FuncType, params: usize, results: usize) -> bool {
    let p: Vec<ValType> = ft.params().collect();
    let r: Vec<ValType> = ft.results().collect();
    p.len() == params
        && r.len() == results
        && p.iter().chain(r.iter()).all(|vt| matches!(vt, ValType::I32))
}

fn require_shape(module: &Module, name: &str, params: usize, results: usize) -> Result<(), SandboxError> {
    let ft = func_export(module, name)?
        .ok_or_else(|| SandboxError::ValidationError(format!("missing required export: {}", name)))?;
    if !has_shape(&ft, params, results) {
        return Err(SandboxError::ValidationError(format!(
            "export '{}' has wrong signature: expected {} i32 params and {} i32 results",
            name, params, results
        )));
    }
    Ok(())
}

fn validate_exports(module: &Module) -> Result<RenderAbi, SandboxError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(SandboxError::ValidationError(
            "module must export 'memory'".into(),
        ));
    }

    require_shape(module, "init", 0, 0)?;

    let render = func_export(module, "render")?
        .ok_or_else(|| SandboxError::ValidationError("missing required export: render".into()))?;
    let abi = if has_shape(&render, 0, 0) {
        RenderAbi::NoArgs
    } else if has_shape(&render, 1, 0) {
        require_shape(module, "getGlobalInput", 0, 1)?;
        RenderAbi::WithInput
    } else {
        return Err(SandboxError::ValidationError(
            "export 'render' must be () -> () or (i32) -> ()".into(),
        ));
    };

    for &(name, params, results) in OPTIONAL_EXPORTS {
        if func_export(module, name)?.is_some() {
            require_shape(module, name, params, results)?;
        }
    }

    Ok(abi)
}

fn validate_imports(module: &Module, trap_unknown_imports: bool) -> Result<(), SandboxError> {
    for import in module.imports() {
        let module_name = import.module();

        if module_name != ENV_MODULE && module_name != WASI_MODULE {
            return Err(SandboxError::ValidationError(format!(
                "import from unknown module '{}': {}",
                module_name,
                import.name()
            )));
        }

        if !matches!(import.ty(), ExternType::Func(_)) {
            return Err(SandboxError::ValidationError(format!(
                "non-function import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }

        if !is_provided(module_name, import.name()) {
            if !trap_unknown_imports {
                return Err(SandboxError::ValidationError(format!(
                    "unknown import: {}::{}",
                    module_name,
                    import.name()
                )));
            }
            log::warn!(
                "unknown import {}::{} linked as a trap",
                module_name,
                import.name()
            );
        }
    }

    Ok(())
}
