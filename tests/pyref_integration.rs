//! Reference-count bookkeeping of objects attached to records.
//!
//! Records holding an attachment are always dropped outside the execution
//! lock, the way the host drops them.

mod common;

use std::thread;

use pyo3::prelude::*;
use serial_test::serial;
use streampy::host::{ByteBuffer, ByteOrder, Payload, RString, Record};
use streampy::pyref::{self, PyRefPayload};
use streampy::{ExecutionLock, SlotState, attach, lookup, slot_state};

fn attached(object: &Py<PyAny>) -> Record {
    let mut record = Record::new().with_attribute("id", RString::from("1"));
    ExecutionLock::with(|py| {
        attach(py, &mut record, object.clone_ref(py));
        Ok(())
    })
    .unwrap();
    record
}

fn transport(record: &Record, order: ByteOrder) -> Record {
    let mut buf = ByteBuffer::new(order);
    record.serialize(&mut buf);
    let mut reader = ByteBuffer::from_bytes(order, buf.into_bytes());
    Record::deserialize(&mut reader, &pyref::payload_registry()).unwrap()
}

#[test]
fn fresh_record_has_no_attachment() {
    common::init();
    let record = Record::new();
    assert_eq!(slot_state(&record), SlotState::Absent);
    assert!(ExecutionLock::with(|py| Ok(lookup(py, &record).is_none())).unwrap());
}

#[test]
fn attach_consumes_the_callers_reference() {
    let object = common::new_object();
    let base = common::refcount(&object);

    let record = attached(&object);
    assert_eq!(common::refcount(&object), base + 1);
    assert_eq!(slot_state(&record), SlotState::Attached);
    assert!(record.payload_container().unwrap().find(pyref::PYREF_KEY).is_some());

    drop(record);
    assert_eq!(common::refcount(&object), base);
}

#[test]
fn lookup_returns_a_new_reference_to_the_same_object() {
    let object = common::new_object();
    let base = common::refcount(&object);
    let record = attached(&object);

    let found = ExecutionLock::with(|py| Ok(lookup(py, &record))).unwrap().unwrap();
    assert!(found.is(&object));
    assert_eq!(common::refcount(&object), base + 2);

    ExecutionLock::with(move |_py| {
        drop(found);
        Ok(())
    })
    .unwrap();
    assert_eq!(common::refcount(&object), base + 1);

    drop(record);
    assert_eq!(common::refcount(&object), base);
}

#[test]
fn each_clone_owns_one_reference() {
    let object = common::new_object();
    let base = common::refcount(&object);
    let record = attached(&object);

    let clones: Vec<Record> = (0..5).map(|_| record.clone()).collect();
    assert_eq!(common::refcount(&object), base + 6);

    for (dropped, clone) in clones.into_iter().enumerate() {
        let still_there = ExecutionLock::with(|py| Ok(lookup(py, &clone).map(|f| f.is(&object)))).unwrap();
        assert_eq!(still_there, Some(true));
        drop(clone);
        assert_eq!(common::refcount(&object), base + 5 - dropped as isize);
    }

    drop(record);
    assert_eq!(common::refcount(&object), base);
}

#[test]
fn reattaching_releases_the_previous_object() {
    let first = common::new_object();
    let second = common::new_object();
    let first_base = common::refcount(&first);
    let second_base = common::refcount(&second);

    let mut record = attached(&first);
    ExecutionLock::with(|py| {
        attach(py, &mut record, second.clone_ref(py));
        Ok(())
    })
    .unwrap();

    assert_eq!(common::refcount(&first), first_base);
    assert_eq!(common::refcount(&second), second_base + 1);
    assert_eq!(record.payload_container().unwrap().len(), 1);

    drop(record);
    assert_eq!(common::refcount(&second), second_base);
}

#[test]
fn transport_empties_the_slot() {
    let object = common::new_object();
    let base = common::refcount(&object);
    let record = attached(&object);

    for order in [ByteOrder::Native, ByteOrder::Network] {
        let back = transport(&record, order);
        assert_eq!(slot_state(&back), SlotState::Empty);
        assert!(ExecutionLock::with(|py| Ok(lookup(py, &back).is_none())).unwrap());
        assert_eq!(back.attribute("id"), record.attribute("id"));
        // No count was created for the rehydrated record.
        assert_eq!(common::refcount(&object), base + 1);
        drop(back);
        assert_eq!(common::refcount(&object), base + 1);
    }

    // The source record is unaffected by having been serialized.
    assert_eq!(slot_state(&record), SlotState::Attached);
    drop(record);
    assert_eq!(common::refcount(&object), base);
}

#[test]
fn deserializing_into_a_live_entry_releases_it() {
    let object = common::new_object();
    let base = common::refcount(&object);

    let mut payload = ExecutionLock::with(|py| Ok(PyRefPayload::new(object.clone_ref(py)))).unwrap();
    assert_eq!(common::refcount(&object), base + 1);

    let mut stale = ByteBuffer::from_bytes(ByteOrder::Native, vec![0xde, 0xad, 0xbe, 0xef]);
    payload.deserialize(&mut stale).unwrap();
    assert!(payload.is_empty());
    assert_eq!(common::refcount(&object), base);

    let copy = payload.clone_payload();
    assert!(copy.as_any().downcast_ref::<PyRefPayload>().unwrap().is_empty());
    assert_eq!(common::refcount(&object), base);
}

#[test]
#[serial]
fn concurrent_lifecycle_keeps_counts_balanced() {
    let object = common::new_object();
    let base = common::refcount(&object);
    let seed = attached(&object);

    thread::scope(|scope| {
        for worker in 0..8usize {
            let seed = &seed;
            let object = &object;
            scope.spawn(move || {
                for round in 0..250usize {
                    let mut copy = seed.clone();
                    let seen = ExecutionLock::with(|py| Ok(lookup(py, &copy).map(|f| f.is(object))))
                        .unwrap();
                    assert_eq!(seen, Some(true));

                    if (worker + round) % 3 == 0 {
                        ExecutionLock::with(|py| {
                            attach(py, &mut copy, object.clone_ref(py));
                            Ok(())
                        })
                        .unwrap();
                    }
                    if round % 5 == 0 {
                        let back = transport(&copy, ByteOrder::Network);
                        assert_eq!(slot_state(&back), SlotState::Empty);
                    }

                    let second = copy.clone();
                    drop(copy);
                    let seen = ExecutionLock::with(|py| Ok(lookup(py, &second).map(|f| f.is(object))))
                        .unwrap();
                    assert_eq!(seen, Some(true));
                }
            });
        }
    });

    assert_eq!(common::refcount(&object), base + 1);
    drop(seed);
    assert_eq!(common::refcount(&object), base);
}
