//! Sandbox runtime: Wasmtime engine, module loading, and the frame driver.
//!
//! `Sandbox` compiles and validates a guest module once. `instantiate`
//! builds a `Bridge`, which owns one Store and one instance for the life of
//! the rendering session: handle tables, the scratch slot and the log
//! history persist across frames.

use std::path::Path;

use wasmtime::{Config, Engine, Linker, Memory, Module, Store, StoreLimitsBuilder, Trap, TypedFunc};

use glbridge_hostapi::{GraphicsApi, GuestInput, HostError};

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::host_impl::HostState;
use crate::input::write_guest_input;
use crate::linker::register_host_functions;
use crate::memory;
use crate::validation::{validate_module, RenderAbi};

/// A validated guest module, ready to be instantiated against a graphics
/// backend.
pub struct Sandbox {
    engine: Engine,
    module: Module,
    config: SandboxConfig,
    render_abi: RenderAbi,
}

impl Sandbox {
    /// Create a new sandbox from WASM bytecode (or WAT text).
    ///
    /// Validates the module's exports and imports before accepting.
    pub fn new(wasm_bytes: &[u8], config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::new(&engine, wasm_bytes)?;
        Self::validated(engine, module, config)
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(path: &Path, config: SandboxConfig) -> Result<Self, SandboxError> {
        let engine = create_engine(&config)?;
        let module = Module::from_file(&engine, path)?;
        Self::validated(engine, module, config)
    }

    fn validated(engine: Engine, module: Module, config: SandboxConfig) -> Result<Self, SandboxError> {
        let render_abi = validate_module(&module, config.trap_unknown_imports)?;
        Ok(Self {
            engine,
            module,
            config,
            render_abi,
        })
    }

    pub fn render_abi(&self) -> RenderAbi {
        self.render_abi
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Instantiate the guest against `gl`.
    ///
    /// Runs the module's start function (if any) but not `init`; call
    /// [`Bridge::init`] before the first frame.
    pub fn instantiate<G: GraphicsApi>(&self, gl: G) -> Result<Bridge<G>, SandboxError> {
        let limits = StoreLimitsBuilder::new()
            .memory_size(self.config.max_memory_bytes())
            .build();
        let host_state = HostState::with_limits(gl, self.config.host.clone(), limits);

        let mut store = Store::new(&self.engine, host_state);
        store.limiter(|state| &mut state.limits);
        if let Some(fuel) = self.config.fuel_limit {
            store.set_fuel(fuel)?;
        }

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;
        if self.config.trap_unknown_imports {
            linker.define_unknown_imports_as_traps(&self.module)?;
        }

        let instance = handle_trap(linker.instantiate(&mut store, &self.module))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| SandboxError::MemoryError("no memory export".into()))?;
        let init = instance.get_typed_func::<(), ()>(&mut store, "init")?;
        let render = match self.render_abi {
            RenderAbi::NoArgs => RenderEntry::NoArgs(instance.get_typed_func::<(), ()>(&mut store, "render")?),
            RenderAbi::WithInput => RenderEntry::WithInput {
                render: instance.get_typed_func::<i32, ()>(&mut store, "render")?,
                input: instance.get_typed_func::<(), i32>(&mut store, "getGlobalInput")?,
            },
        };

        log::debug!(
            "instantiated guest: {} pages of memory, render {:?}",
            memory.size(&store),
            self.render_abi
        );

        Ok(Bridge {
            store,
            memory,
            init,
            render,
            fuel_limit: self.config.fuel_limit,
            frames: 0,
        })
    }
}

enum RenderEntry {
    NoArgs(TypedFunc<(), ()>),
    WithInput {
        render: TypedFunc<i32, ()>,
        input: TypedFunc<(), i32>,
    },
}

/// A live guest instance bound to a graphics backend.
pub struct Bridge<G: GraphicsApi> {
    store: Store<HostState<G>>,
    memory: Memory,
    init: TypedFunc<(), ()>,
    render: RenderEntry,
    fuel_limit: Option<u64>,
    frames: u64,
}

impl<G: GraphicsApi> Bridge<G> {
    /// Call the guest's `init` export.
    pub fn init(&mut self) -> Result<(), SandboxError> {
        self.refuel()?;
        handle_trap(self.init.call(&mut self.store, ()))
    }

    /// Drive one frame: publish `input` to the guest, then call `render`.
    ///
    /// The input address is asked from the guest every frame since the
    /// guest may move its input record.
    pub fn render_frame(&mut self, input: &GuestInput) -> Result<(), SandboxError> {
        self.refuel()?;
        match &self.render {
            RenderEntry::NoArgs(render) => {
                handle_trap(render.call(&mut self.store, ()))?;
            }
            RenderEntry::WithInput {
                render,
                input: get_input,
            } => {
                let raw = handle_trap(get_input.call(&mut self.store, ()))?;
                write_guest_input(self.memory.data_mut(&mut self.store), memory::ptr(raw), input)
                    .map_err(|e| SandboxError::MemoryError(format!("input record: {}", e)))?;
                handle_trap(render.call(&mut self.store, raw))?;
            }
        }
        self.frames += 1;
        Ok(())
    }

    fn refuel(&mut self) -> Result<(), SandboxError> {
        if let Some(fuel) = self.fuel_limit {
            self.store.set_fuel(fuel)?;
        }
        Ok(())
    }

    /// Frames rendered successfully so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn host_state(&self) -> &HostState<G> {
        self.store.data()
    }

    pub fn host_state_mut(&mut self) -> &mut HostState<G> {
        self.store.data_mut()
    }

    pub fn graphics(&self) -> &G {
        &self.store.data().gl
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.store.data_mut().gl
    }

    /// Current contents of guest linear memory.
    pub fn guest_memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }
}

/// Handle a guest call result, converting traps to `SandboxError`.
///
/// `proc_exit` → `SandboxError::GuestExited`
/// Fatal host condition → `SandboxError::HostError`
/// Fuel exhaustion → `SandboxError::FuelExhausted`
/// Other traps → `SandboxError::GuestTrapped`
fn handle_trap<R>(result: wasmtime::Result<R>) -> Result<R, SandboxError> {
    result.map_err(|err| {
        if let Some(host) = err.downcast_ref::<HostError>() {
            return match host {
                HostError::Exit(code) => SandboxError::GuestExited(*code),
                other => SandboxError::HostError(other.clone()),
            };
        }
        if let Some(Trap::OutOfFuel) = err.downcast_ref::<Trap>() {
            return SandboxError::FuelExhausted;
        }
        SandboxError::GuestTrapped(format!("{:#}", err))
    })
}

/// Create a Wasmtime engine for guest modules.
fn create_engine(config: &SandboxConfig) -> Result<Engine, SandboxError> {
    let mut wasm_config = Config::new();

    // Fuel metering only when an instruction budget is configured
    wasm_config.consume_fuel(config.fuel_limit.is_some());

    // Guests are single-threaded
    wasm_config.wasm_threads(false);

    Ok(Engine::new(&wasm_config)?)
}
