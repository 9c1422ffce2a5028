//! Registered host functions.
//!
//! This is the boundary a spreadsheet add-in (or the HTTP host) calls: a
//! function name plus raw cell blocks in, one [`CellOutput`] out. Hard
//! failures are logged and reported as `#VALUE!`; they never escape as
//! errors.

use crate::cells::{self, CellBlock, CellError, CellOutput, CellValue};
use crate::config::{self, KeyValueStore, ReadAllMode};
use crate::context::ContextOptions;
use crate::engine::{DefaultEngine, GeodesyEngine};
use crate::error::{CrsError, CrsResult};
use crate::query::{CrsProperty, Facade};

/// Every function the registry answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Property(CrsProperty),
    GeoDistance,
    GeoDistanceZ,
    IsEquivalentTo,
    IsEquivalentToRelaxed,
    AddOrUpdateKey,
    ClearAllKeys,
    GetKeyValue,
    ReadAllKeys,
    ReadKey,
    RemoveKey,
}

const OPERATORS: [Function; 10] = [
    Function::GeoDistance,
    Function::GeoDistanceZ,
    Function::IsEquivalentTo,
    Function::IsEquivalentToRelaxed,
    Function::AddOrUpdateKey,
    Function::ClearAllKeys,
    Function::GetKeyValue,
    Function::ReadAllKeys,
    Function::ReadKey,
    Function::RemoveKey,
];

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Property(p) => p.function_name(),
            Function::GeoDistance => "TL.crs.GeoDistance",
            Function::GeoDistanceZ => "TL.crs.GeoDistanceZ",
            Function::IsEquivalentTo => "TL.crs.IsEquivalentTo",
            Function::IsEquivalentToRelaxed => "TL.crs.IsEquivalentToRelaxed",
            Function::AddOrUpdateKey => "TL.cfg.AddOrUpdateKey",
            Function::ClearAllKeys => "TL.cfg.ClearAllKeys",
            Function::GetKeyValue => "TL.cfg.GetKeyValue",
            Function::ReadAllKeys => "TL.cfg.ReadAllKeys",
            Function::ReadKey => "TL.cfg.ReadKey",
            Function::RemoveKey => "TL.cfg.RemoveKey",
        }
    }

    /// All registered functions, properties first.
    pub fn all() -> impl Iterator<Item = Function> {
        CrsProperty::ALL
            .iter()
            .copied()
            .map(Function::Property)
            .chain(OPERATORS)
    }

    /// Look up a function by name, ignoring surrounding whitespace and
    /// ASCII case.
    pub fn lookup(name: &str) -> Option<Function> {
        if let Some(property) = CrsProperty::from_function_name(name) {
            return Some(Function::Property(property));
        }
        let name = name.trim();
        OPERATORS
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// Positional arguments; anything past the end reads as omitted.
struct Args<'a> {
    blocks: &'a [CellBlock],
    missing: CellBlock,
}

impl<'a> Args<'a> {
    fn new(blocks: &'a [CellBlock]) -> Self {
        Self {
            blocks,
            missing: CellBlock::missing(),
        }
    }

    fn get(&self, i: usize) -> &CellBlock {
        self.blocks.get(i).unwrap_or(&self.missing)
    }

    /// A single text cell. Numbers are accepted in their shortest form.
    fn text(&self, i: usize, what: &str) -> CrsResult<String> {
        match self.get(i).get(0, 0) {
            Some(CellValue::Text(s)) => Ok(s.clone()),
            Some(CellValue::Number(n)) => Ok(n.to_string()),
            other => Err(CrsError::InvalidArgument(format!(
                "{} must be text, got {:?}",
                what, other
            ))),
        }
    }

    fn optional_text(&self, i: usize) -> Option<String> {
        match self.get(i).get(0, 0) {
            Some(CellValue::Text(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Function registry over one engine and one key/value store.
pub struct Functions<E: GeodesyEngine = DefaultEngine> {
    facade: Facade<E>,
    store: KeyValueStore,
}

impl<E: GeodesyEngine> Functions<E> {
    pub fn new(engine: E, options: ContextOptions, store: KeyValueStore) -> Self {
        Self {
            facade: Facade::new(engine, options),
            store,
        }
    }

    pub fn facade(&self) -> &Facade<E> {
        &self.facade
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Registered function names.
    pub fn names(&self) -> Vec<&'static str> {
        Function::all().map(Function::name).collect()
    }

    /// Call `name` with `args`. `None` means no such function.
    pub fn call(&self, name: &str, args: &[CellBlock]) -> Option<CellOutput> {
        let function = Function::lookup(name)?;
        Some(self.invoke(function, args))
    }

    /// Call a known function, converting failures into `#VALUE!`.
    pub fn invoke(&self, function: Function, args: &[CellBlock]) -> CellOutput {
        match self.dispatch(function, &Args::new(args)) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    function = function.name(),
                    kind = ?err.kind(),
                    error = %err,
                    "function failed"
                );
                CellOutput::Error(CellError::Value)
            }
        }
    }

    fn dispatch(&self, function: Function, args: &Args<'_>) -> CrsResult<CellOutput> {
        match function {
            Function::Property(property) => {
                let index = if property.takes_index() {
                    cells::optional_index(args.get(1))?
                } else {
                    0
                };
                self.facade.read(property, args.get(0), index)
            }
            Function::GeoDistance => {
                self.facade
                    .geo_distance(args.get(0), args.get(1), args.get(2), false)
            }
            Function::GeoDistanceZ => {
                self.facade
                    .geo_distance(args.get(0), args.get(1), args.get(2), true)
            }
            Function::IsEquivalentTo => self.facade.is_equivalent(args.get(0), args.get(1), false),
            Function::IsEquivalentToRelaxed => {
                self.facade.is_equivalent(args.get(0), args.get(1), true)
            }
            Function::AddOrUpdateKey => {
                let key = args.text(0, "key")?;
                let value = args.text(1, "value")?;
                self.store.add_or_update(&key, &value).map(CellOutput::Text)
            }
            Function::ClearAllKeys => self.store.clear_all().map(CellOutput::Text),
            Function::GetKeyValue => {
                let key = args.text(0, "key")?;
                let default = args.optional_text(1);
                self.store
                    .get_key_value(&key, default.as_deref())
                    .map(CellOutput::Text)
            }
            Function::ReadAllKeys => {
                let mode = cells::optional_number(args.get(0), 3.0)?;
                self.store.read_all(ReadAllMode::from_mode(mode.trunc() as i64)?)
            }
            Function::ReadKey => {
                let key = args.text(0, "key")?;
                self.store.read_key(&key).map(CellOutput::Text)
            }
            Function::RemoveKey => {
                let key = args.text(0, "key")?;
                self.store.remove_key(&key).map(CellOutput::Text)
            }
        }
    }
}

impl Functions<DefaultEngine> {
    /// Registry over the default engine, configured from the settings file
    /// and environment.
    pub fn from_environment() -> CrsResult<Self> {
        let settings = config::init_from_environment()?;
        let store = KeyValueStore::open_default()?;
        Ok(Self::new(
            default_engine()?,
            settings.context_options(),
            store,
        ))
    }
}

#[cfg(feature = "proj-engine")]
fn default_engine() -> CrsResult<DefaultEngine> {
    Ok(DefaultEngine::new()?)
}

#[cfg(all(feature = "catalog-engine", not(feature = "proj-engine")))]
fn default_engine() -> CrsResult<DefaultEngine> {
    use std::sync::OnceLock;

    // The catalogue is parsed once per process; engines share its entries.
    static CATALOG: OnceLock<DefaultEngine> = OnceLock::new();
    if let Some(engine) = CATALOG.get() {
        return Ok(engine.clone());
    }
    let engine = DefaultEngine::new()?;
    Ok(CATALOG.get_or_init(|| engine).clone())
}
