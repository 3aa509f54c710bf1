use alloc::string::{String, ToString};
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

use arc_swap::{ArcSwap, ArcSwapOption};
use mc_utils::TypeIdMap;

use crate::config::RecordConfig;
use crate::engine::compile::{RoutinePair, compile};
use crate::engine::strategy::Linker;
use crate::error::{PackError, RegistrationError, RegistrationErrorKind, UnpackError};
use crate::flags::Flags;
use crate::schema::{DynBox, RecordInfo, Type, TypeInfo, Typed};
use crate::value::Map;

/// Receives the rendered routines of records registered with `debug`.
pub type DebugSink = Arc<dyn Fn(&Type, &str) + Send + Sync>;

// -----------------------------------------------------------------------------
// Slot

/// The stable home of one record type's routines.
///
/// Nested record strategies hold a [`Weak`] reference and load the current
/// pair on every call, so re-registering a record is seen by every record
/// that contains it.
pub(crate) struct Slot {
    ty: Type,
    routines: ArcSwapOption<RoutinePair>,
}

impl Slot {
    #[inline]
    fn new(ty: Type) -> Self {
        Self {
            ty,
            routines: ArcSwapOption::empty(),
        }
    }

    #[inline]
    fn load(&self) -> Option<Arc<RoutinePair>> {
        self.routines.load_full()
    }

    /// Loads the routines behind `slot`, or returns `type_name` when the slot
    /// is gone or was never filled.
    #[inline]
    pub(crate) fn upgrade(
        slot: &Weak<Slot>,
        type_name: &'static str,
    ) -> Result<Arc<RoutinePair>, &'static str> {
        slot.upgrade().and_then(|slot| slot.load()).ok_or(type_name)
    }
}

#[derive(Clone, Default)]
struct SlotTable {
    slots: TypeIdMap<Arc<Slot>>,
}

// -----------------------------------------------------------------------------
// Transaction

/// One registration: the records it compiles and the slots it creates.
///
/// Nothing becomes visible until the registry publishes it, so a failed
/// transaction leaves the registry untouched.
struct Transaction<'a> {
    table: &'a SlotTable,
    fresh: TypeIdMap<Arc<Slot>>,
    queue: Vec<&'static RecordInfo>,
}

impl<'a> Transaction<'a> {
    fn new(table: &'a SlotTable) -> Self {
        Self {
            table,
            fresh: TypeIdMap::new(),
            queue: Vec::new(),
        }
    }

    fn slot(&self, id: &TypeId) -> Option<&Arc<Slot>> {
        self.table.slots.get(id).or_else(|| self.fresh.get(id))
    }
}

impl Linker for Transaction<'_> {
    fn link(&mut self, record: &'static RecordInfo) -> Weak<Slot> {
        let id = record.ty().id();
        if let Some(slot) = self.slot(&id) {
            return Arc::downgrade(slot);
        }

        log::trace!("registering nested record `{}`", record.ty().path());
        let slot = Arc::new(Slot::new(*record.ty()));
        let weak = Arc::downgrade(&slot);
        self.fresh.insert(id, slot);
        self.queue.push(record);
        weak
    }
}

// -----------------------------------------------------------------------------
// PackRegistry

/// The per-type cache of compiled routine pairs.
///
/// Reads (`pack`, `unpack`, lookups) go through a lock-free snapshot and may
/// run from any number of threads. Registrations serialize on a writer lock,
/// compile outside of any reader's way and publish atomically: a reader sees
/// either the old routines or the new ones, never a partial set.
///
/// # Examples
///
/// ```
/// use mc_pack::derive::Record;
/// use mc_pack::{Flags, PackRegistry, Value};
///
/// #[derive(Record, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let registry = PackRegistry::new();
/// registry.register::<Point>().unwrap();
///
/// let map = registry.pack(&Point { x: 1, y: 2 }, Flags::empty()).unwrap();
/// assert_eq!(map.get("x"), Some(&Value::Int(1)));
///
/// let back: Point = registry.unpack(map, Flags::empty()).unwrap();
/// assert_eq!(back, Point { x: 1, y: 2 });
/// ```
pub struct PackRegistry {
    table: ArcSwap<SlotTable>,
    writer: Mutex<()>,
    sink: RwLock<Option<DebugSink>>,
}

impl Default for PackRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.load();
        f.debug_set()
            .entries(table.slots.values().map(|slot| slot.ty.path()))
            .finish()
    }
}

impl PackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(SlotTable::default()),
            writer: Mutex::new(()),
            sink: RwLock::new(None),
        }
    }

    /// The process-wide registry used by [`PackExt`](crate::PackExt).
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<PackRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Replaces the receiver of `debug` listings.
    ///
    /// Without a sink the listing goes to `log::debug!` with target
    /// `mc_pack::codegen`.
    pub fn set_debug_sink(&self, sink: impl Fn(&Type, &str) + Send + Sync + 'static) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(sink));
    }

    /// Restores the default `log` sink.
    pub fn clear_debug_sink(&self) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers `T` with its declared configuration.
    ///
    /// Does nothing if `T` is already registered. Nested records that are not
    /// registered yet are compiled in the same call.
    #[inline]
    pub fn register<T: Typed>(&self) -> Result<(), RegistrationError> {
        self.register_info(T::type_info(), None)
    }

    /// Registers `T` with `config`, replacing any routines `T` already has.
    #[inline]
    pub fn register_with<T: Typed>(&self, config: RecordConfig) -> Result<(), RegistrationError> {
        self.register_info(T::type_info(), Some(config))
    }

    /// Registers the record described by `info`.
    ///
    /// With `config == None` the declared configuration is used and an
    /// existing registration is kept. With `Some`, the record is recompiled and
    /// its routines replaced atomically.
    pub fn register_info(
        &self,
        info: &'static TypeInfo,
        config: Option<RecordConfig>,
    ) -> Result<(), RegistrationError> {
        let Some(record) = info.as_record() else {
            return Err(RegistrationError::new(
                info.type_name(),
                RegistrationErrorKind::NotARecord,
            ));
        };
        let id = record.ty().id();

        let writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.table.load_full();
        if config.is_none() && current.slots.contains(&id) {
            return Ok(());
        }

        let mut tx = Transaction::new(&current);
        let root = match current.slots.get(&id) {
            Some(slot) => slot.clone(),
            None => {
                let slot = Arc::new(Slot::new(*record.ty()));
                tx.fresh.insert(id, slot.clone());
                slot
            }
        };

        let mut compiled = Vec::new();
        let pair = compile(record, config.unwrap_or(*record.config()), &mut tx)?;
        compiled.push((root, pair));

        let mut next = 0;
        while let Some(&nested) = tx.queue.get(next) {
            next += 1;
            let pair = compile(nested, *nested.config(), &mut tx)?;
            let slot = tx.fresh.get(&nested.ty().id()).cloned();
            // Every queued record got a fresh slot in `link`.
            if let Some(slot) = slot {
                compiled.push((slot, pair));
            }
        }

        let fresh = core::mem::take(&mut tx.fresh);
        drop(tx);
        let listings = self.publish(&current, compiled, fresh);
        drop(writer);

        // The sink may register other types.
        for (ty, source) in &listings {
            self.emit(ty, source);
        }
        Ok(())
    }

    fn publish(
        &self,
        current: &SlotTable,
        compiled: Vec<(Arc<Slot>, RoutinePair)>,
        fresh: TypeIdMap<Arc<Slot>>,
    ) -> Vec<(Type, String)> {
        let mut listings = Vec::new();
        // Nested records first, so the root never links to an empty slot.
        for (slot, pair) in compiled.into_iter().rev() {
            if let Some(source) = pair.source() {
                listings.push((*pair.ty(), source.to_string()));
            }
            let config = *pair.config();
            match slot.routines.swap(Some(Arc::new(pair))) {
                Some(_) => log::warn!(
                    "replaced the routines of `{}` ({config:?})",
                    slot.ty.path()
                ),
                None => log::debug!("compiled the routines of `{}`", slot.ty.path()),
            }
        }

        if !fresh.is_empty() {
            let mut table = current.clone();
            for (id, slot) in fresh.iter() {
                table.slots.insert(*id, slot.clone());
            }
            self.table.store(Arc::new(table));
        }
        listings
    }

    fn emit(&self, ty: &Type, source: &str) {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match sink {
            Some(sink) => sink(ty, source),
            None => log::debug!(target: "mc_pack::codegen", "{}\n{source}", ty.path()),
        }
    }

    /// Registers every type declared with `#[pack(auto_register)]`.
    ///
    /// Returns how many registrations ran; stops at the first failure.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&self) -> Result<usize, RegistrationError> {
        let mut count = 0;
        for entry in inventory::iter::<crate::__macro_exports::AutoRegistration> {
            self.register_info((entry.type_info)(), None)?;
            count += 1;
        }
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Lookup

    fn routines(&self, id: &TypeId) -> Option<Arc<RoutinePair>> {
        self.table.load().slots.get(id).and_then(|slot| slot.load())
    }

    #[inline]
    pub fn is_registered<T: Any>(&self) -> bool {
        self.table.load().slots.contains_type::<T>()
    }

    /// The configuration `T` is currently compiled with.
    #[inline]
    pub fn config_of<T: Any>(&self) -> Option<RecordConfig> {
        self.routines_of::<T>().map(|pair| *pair.config())
    }

    /// The current routine pair of `T`.
    #[inline]
    pub fn routines_of<T: Any>(&self) -> Option<Arc<RoutinePair>> {
        self.routines(&TypeId::of::<T>())
    }

    // -------------------------------------------------------------------------
    // Pack / Unpack

    /// Packs a registered record into a mapping.
    pub fn pack<T: Any>(&self, value: &T, flags: Flags) -> Result<Map, PackError> {
        self.pack_value(&Type::of::<T>(), value, flags)
    }

    /// Unpacks a mapping into a registered record.
    pub fn unpack<T: Any>(&self, map: Map, flags: Flags) -> Result<T, UnpackError> {
        let ty = Type::of::<T>();
        let boxed = self.unpack_value(&ty, map, flags)?;
        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(UnpackError::Construct {
                type_name: ty.name(),
            }),
        }
    }

    /// Packs a type-erased value of the record type `ty`.
    pub fn pack_value(&self, ty: &Type, value: &dyn Any, flags: Flags) -> Result<Map, PackError> {
        let routines = self.routines(&ty.id()).ok_or(PackError::NotRegistered {
            type_name: ty.name(),
        })?;
        routines.pack(value, flags)
    }

    /// Unpacks a mapping into a boxed value of the record type `ty`.
    pub fn unpack_value(&self, ty: &Type, map: Map, flags: Flags) -> Result<DynBox, UnpackError> {
        let routines = self.routines(&ty.id()).ok_or(UnpackError::NotRegistered {
            type_name: ty.name(),
        })?;
        routines.unpack(map, flags)
    }
}
