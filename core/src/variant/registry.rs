//! Process-wide table of encodings, one per storable type.
//!
//! An encoding is selected from the type's [`Shape`] the first time the type
//! is stored or read, and stays published for the life of the process. Ids
//! are assigned densely in publication order so that a cell can name its
//! encoding with a plain integer.

use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::mem::size_of;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;
use lazy_static::lazy_static;
use tracing::{debug, trace};

use super::encoding::{Encoding, ReferenceEncoding, TypedEncoding};
use super::raw::RawBits;
use crate::types::TypeInfo;
use crate::values::{Shape, Value};

/// Dense id of a published encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodingId(u32);

impl EncodingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn to_bits(self) -> u64 {
        self.0 as u64
    }

    pub(crate) fn from_bits(bits: u64) -> Option<Self> {
        u32::try_from(bits).ok().map(EncodingId)
    }
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Published {
    id: EncodingId,
    /// Holds a `&'static dyn TypedEncoding<T>` for the keyed `T`.
    typed: Box<dyn Any + Send + Sync>,
}

struct IdEntry {
    type_info: TypeInfo,
    storage: Option<&'static dyn Encoding>,
}

#[derive(Default)]
struct Registry {
    by_type: RwLock<HashMap<TypeId, Published>>,
    by_id: RwLock<Vec<IdEntry>>,
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::default();
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn typed_of<T: Value>(
    published: &Published,
) -> Option<(EncodingId, &'static dyn TypedEncoding<T>)> {
    let typed = published
        .typed
        .downcast_ref::<&'static dyn TypedEncoding<T>>()
        .copied()?;
    Some((published.id, typed))
}

/// Picks the encoding for `T` from its requested shape.
fn select<T: Value>() -> Box<dyn TypedEncoding<T>> {
    match T::shape() {
        Shape::Nullable(encoding) => encoding,
        Shape::Wrapper(encoding) if size_of::<T>() == size_of::<usize>() => encoding,
        Shape::Bits(encoding) if RawBits::fits::<T>() => encoding,
        Shape::Decimal(encoding) | Shape::Variant(encoding) | Shape::Union(encoding) => encoding,
        Shape::Wrapper(_) | Shape::Bits(_) | Shape::Reference => {
            Box::new(ReferenceEncoding::<T>::new())
        }
    }
}

/// The encoding for `T`, selecting and publishing it on first use.
pub fn encoding<T: Value>() -> &'static dyn TypedEncoding<T> {
    publish::<T>().1
}

/// The id of `T`'s encoding, publishing it if needed.
pub fn id_of<T: Value>() -> EncodingId {
    publish::<T>().0
}

/// Selection runs outside the lock. When two threads race, the first to
/// publish wins and the other's candidate is dropped, so every caller sees
/// the same instance.
fn publish<T: Value>() -> (EncodingId, &'static dyn TypedEncoding<T>) {
    let key = TypeId::of::<T>();
    if let Some(found) = read(&REGISTRY.by_type).get(&key).and_then(typed_of::<T>) {
        return found;
    }

    let candidate = select::<T>();

    let mut by_type = write(&REGISTRY.by_type);
    if let Some(found) = by_type.get(&key).and_then(typed_of::<T>) {
        trace!(ty = type_name::<T>(), "discarding duplicate encoding");
        return found;
    }

    let typed: &'static dyn TypedEncoding<T> = Box::leak(candidate);
    let storage = typed.storage();
    let id = {
        let mut by_id = write(&REGISTRY.by_id);
        let id = EncodingId(by_id.len() as u32);
        by_id.push(IdEntry {
            type_info: TypeInfo::of::<T>(),
            storage,
        });
        id
    };
    if let Some(storage) = storage {
        storage.on_registered(id);
    }
    by_type.insert(
        key,
        Published {
            id,
            typed: Box::new(typed),
        },
    );
    drop(by_type);

    debug!(
        ty = type_name::<T>(),
        id = id.0,
        strategy = typed.strategy(),
        "encoding published"
    );
    (id, typed)
}

/// The storage encoding published under `id`, if that type stores values as
/// themselves.
pub fn by_id(id: EncodingId) -> Option<&'static dyn Encoding> {
    read(&REGISTRY.by_id)
        .get(id.index())
        .and_then(|entry| entry.storage)
}

/// The type published under `id`.
pub fn type_of(id: EncodingId) -> Option<TypeInfo> {
    read(&REGISTRY.by_id)
        .get(id.index())
        .map(|entry| entry.type_info)
}

/// Number of published encodings.
pub fn len() -> usize {
    read(&REGISTRY.by_id).len()
}
