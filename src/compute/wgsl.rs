// WGSL front end shared by every backend: parse, validate and reflect the
// vertex/fragment pair of a kernel before anything is executed.
use std::collections::BTreeMap;
use std::error::Error;

use naga::valid::{ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, ShaderStage, Type, TypeInner};

use crate::compute::kernels::KernelKind;
use crate::error::FluidError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// What a backend needs to know about a compiled kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelLayout {
    pub kind: KernelKind,
    /// `(group, binding)` of every named resource the fragment stage declares.
    pub slots: BTreeMap<String, (u32, u32)>,
    /// Size in bytes of the `params` uniform block.
    pub uniform_size: usize,
}

impl KernelLayout {
    pub fn slot(&self, name: &str) -> Option<(u32, u32)> {
        self.slots.get(name).copied()
    }
}

fn describe(err: &dyn Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        log.push_str(": ");
        log.push_str(&inner.to_string());
        source = inner.source();
    }
    log
}

fn stage_label(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertex",
        ShaderStage::Fragment => "fragment",
        _ => "compute",
    }
}

/// Parse and validate one stage; `entry` must exist with the given stage.
fn compile_stage(
    kind: KernelKind,
    stage: ShaderStage,
    entry: &str,
    source: &str,
) -> Result<Module, FluidError> {
    let compile_err = |log: String| FluidError::Compile {
        kernel: kind.name(),
        log: format!("{} stage: {log}", stage_label(stage)),
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_err(e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), naga::valid::Capabilities::all())
        .validate(&module)
        .map_err(|e| compile_err(describe(e.as_inner())))?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == stage)
    {
        return Err(compile_err(format!(
            "missing entry point `@{} fn {entry}`",
            stage_label(stage)
        )));
    }
    Ok(module)
}

/// User-defined varyings (`@location(n)`) carried by a value of type `ty`.
fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut BTreeMap<u32, TypeInner>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn entry<'m>(module: &'m Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

/// Both stages must agree on every varying the fragment stage reads.
/// Validation has already required `@builtin(position)` from the vertex stage.
fn link(kind: KernelKind, vertex: &Module, fragment: &Module) -> Result<(), FluidError> {
    let link_err = |log: String| FluidError::Link {
        kernel: kind.name(),
        log,
    };

    let mut outputs = BTreeMap::new();
    if let Some(result) = entry(vertex, VERTEX_ENTRY).and_then(|ep| ep.function.result.as_ref()) {
        collect_locations(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = BTreeMap::new();
    if let Some(ep) = entry(fragment, FRAGMENT_ENTRY) {
        for arg in &ep.function.arguments {
            collect_locations(fragment, arg.ty, arg.binding.as_ref(), &mut inputs);
        }
    }

    for (location, ty) in &inputs {
        match outputs.get(location) {
            None => {
                return Err(link_err(format!(
                    "fragment input @location({location}) is not written by the vertex stage"
                )));
            }
            Some(written) if written != ty => {
                return Err(link_err(format!(
                    "@location({location}) is {written:?} in the vertex stage but {ty:?} in the fragment stage"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Compile, link and reflect a kernel from its two WGSL stages.
///
/// Every binding the kernel's parameter schema names has to be declared by
/// the fragment stage, and the `params` uniform block must have the same size
/// as the host-side block it is filled from.
pub fn compile_kernel(
    kind: KernelKind,
    vertex: &str,
    fragment: &str,
) -> Result<KernelLayout, FluidError> {
    let vertex_module = compile_stage(kind, ShaderStage::Vertex, VERTEX_ENTRY, vertex)?;
    let fragment_module = compile_stage(kind, ShaderStage::Fragment, FRAGMENT_ENTRY, fragment)?;
    let compile_err = |log: String| FluidError::Compile {
        kernel: kind.name(),
        log: format!("fragment stage: {log}"),
    };

    let mut slots = BTreeMap::new();
    let mut params_ty = None;
    for (_, global) in fragment_module.global_variables.iter() {
        let (Some(name), Some(binding)) = (&global.name, &global.binding) else {
            continue;
        };
        if name == "params" && global.space == AddressSpace::Uniform {
            params_ty = Some(global.ty);
        }
        slots.insert(name.clone(), (binding.group, binding.binding));
    }

    let missing: Vec<&str> = kind
        .bindings()
        .iter()
        .copied()
        .filter(|name| !slots.contains_key(*name) || (*name == "params" && params_ty.is_none()))
        .collect();
    if !missing.is_empty() {
        return Err(compile_err(format!(
            "undeclared binding(s) {}",
            missing.join(", ")
        )));
    }

    let mut layouter = naga::proc::Layouter::default();
    layouter
        .update(fragment_module.to_ctx())
        .map_err(|e| compile_err(describe(&e)))?;
    let uniform_size = params_ty.map_or(0, |ty| layouter[ty].size as usize);
    if uniform_size != kind.uniform_size() {
        return Err(compile_err(format!(
            "uniform block `params` is {uniform_size} bytes, the host block is {}",
            kind.uniform_size()
        )));
    }

    link(kind, &vertex_module, &fragment_module)?;

    Ok(KernelLayout {
        kind,
        slots,
        uniform_size,
    })
}
