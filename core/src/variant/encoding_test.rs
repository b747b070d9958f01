use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;

use crate::test_utils;
use crate::types::{TypeInfo, ValueKind};
use crate::values::{Shape, Value, Wrapper};
use crate::variant::{Storage, Variant, registry};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Value for Point {
    fn shape() -> Shape<Self> {
        Shape::bits()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Big([u64; 3]);

impl Value for Big {
    fn shape() -> Shape<Self> {
        Shape::bits()
    }
}

/// A second wrapper around `Arc<String>`, distinct from `Arc<String>` itself.
#[derive(Debug, Clone, PartialEq)]
struct Name(Arc<String>);

impl Wrapper for Name {
    type Inner = String;

    fn into_inner(self) -> Arc<String> {
        self.0
    }

    fn from_inner(inner: Arc<String>) -> Self {
        Name(inner)
    }
}

impl Value for Name {
    fn shape() -> Shape<Self> {
        Shape::wrapper()
    }
}

/// Too wide to be stored as a bare pointer.
#[derive(Debug, Clone, PartialEq)]
struct Tagged(Arc<String>, u64);

impl Wrapper for Tagged {
    type Inner = String;

    fn into_inner(self) -> Arc<String> {
        self.0
    }

    fn from_inner(inner: Arc<String>) -> Self {
        Tagged(inner, 0)
    }
}

impl Value for Tagged {
    fn shape() -> Shape<Self> {
        Shape::wrapper()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Racer(u8);

impl Value for Racer {}

#[test]
fn test_small_plain_struct_is_inline() {
    let cell = Variant::new(Point { x: 1, y: -2 });
    assert_eq!(cell.storage(), Storage::Inline);
    assert_eq!(cell.kind(), ValueKind::Object);
    assert_eq!(cell.try_get::<Point>(), Some(Point { x: 1, y: -2 }));
}

#[test]
fn test_oversized_bits_fall_back_to_reference() {
    let cell = Variant::new(Big([1, 2, 3]));
    assert_eq!(cell.storage(), Storage::Boxed);
    assert_eq!(cell.try_get::<Big>(), Some(Big([1, 2, 3])));
    assert_eq!(registry::encoding::<Big>().strategy(), "reference");
}

#[test]
fn test_oversized_wrapper_falls_back_to_reference() {
    let cell = Variant::new(Tagged(Arc::new(String::from("t")), 7));
    assert_eq!(cell.storage(), Storage::Boxed);
    assert_eq!(
        cell.try_get::<Tagged>(),
        Some(Tagged(Arc::new(String::from("t")), 7))
    );
}

#[test]
fn test_wrappers_sharing_an_inner_type_stay_distinct() {
    let inner = Arc::new(String::from("ada"));
    let cell = Variant::new(Name(Arc::clone(&inner)));
    assert_eq!(cell.storage(), Storage::Wrapped);
    assert_eq!(cell.type_info(), TypeInfo::of::<Name>());

    let back = cell.try_get::<Name>().unwrap();
    assert!(Arc::ptr_eq(&back.0, &inner));
    assert_eq!(cell.try_get::<Arc<String>>(), None);

    assert_ne!(cell, Variant::new(inner));
}

#[test]
fn test_registry_publishes_once() {
    test_utils::init_test_logging();

    let first = registry::id_of::<Point>();
    let second = registry::id_of::<Point>();
    assert_eq!(first, second);
    assert_ne!(registry::id_of::<Point>(), registry::id_of::<Big>());
    assert_eq!(registry::type_of(first), Some(TypeInfo::of::<Point>()));
    assert!(registry::len() > first.index());
}

#[test]
fn test_registry_race_agrees_on_one_encoding() {
    let ids: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(registry::id_of::<Racer>))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));

    let cell = Variant::new(Racer(4));
    assert_eq!(cell.try_get::<Racer>(), Some(Racer(4)));
}

#[test]
fn test_storage_encodings_by_id() {
    let id = registry::id_of::<u32>();
    let storage = registry::by_id(id).unwrap();
    assert_eq!(storage.type_info(), TypeInfo::of::<u32>());
    assert_eq!(storage.strategy(), "bits");

    // Nullable types are stored as their content and own no storage.
    assert!(registry::by_id(registry::id_of::<Option<u32>>()).is_none());
}

#[test]
fn test_encoding_queries_on_a_cell() {
    let cell = Variant::new(21_u32);
    let encoding = cell.encoding().unwrap();
    assert_eq!(encoding.kind(), ValueKind::UInt32);
    assert_eq!(encoding.runtime_type(&cell), TypeInfo::of::<u32>());
    assert!(!encoding.is_null(&cell));
    assert!(encoding.eq_value(&cell, &21_u32));
    assert!(!encoding.eq_value(&cell, &21_i32));
    assert!(encoding.eq_cells(&cell, &Variant::new(21_u32)));

    let decoded = encoding.decode(&cell).unwrap();
    assert_eq!(decoded.downcast_ref::<u32>(), Some(&21));

    // Another type's encoding does not recognise the payload.
    let other = Variant::new(1_i16).encoding().unwrap();
    assert!(other.is_null(&cell));
    assert!(other.decode(&cell).is_none());
}
