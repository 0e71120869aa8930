//! Property-based tests for mapped slice correctness
//!
//! Uses proptest to check the slice against a Vec model across random
//! operation sequences, including close and reopen.

use mapped_slice::{MappedSlice, MappedSliceError};
use proptest::prelude::*;
use tempfile::TempDir;

#[derive(Debug, Clone)]
enum Op {
    Append(i32),
    Set(usize, i32),
    InsertAt(usize, i32),
    RemoveAt(usize),
    Reopen,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Append),
        2 => (0usize..80, any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
        2 => (0usize..80, any::<i32>()).prop_map(|(i, v)| Op::InsertAt(i, v)),
        2 => (0usize..80).prop_map(Op::RemoveAt),
        1 => Just(Op::Reopen),
    ]
}

proptest! {
    #[test]
    fn prop_matches_vec_model(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.bin");

        let mut slice = MappedSlice::<i32>::open(&path).unwrap();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Append(v) => {
                    slice.append(v).unwrap();
                    model.push(v);
                }
                Op::Set(i, v) => {
                    let result = slice.set(i, v);
                    if i < model.len() {
                        prop_assert!(result.is_ok());
                        model[i] = v;
                    } else {
                        let is_bounds_error = matches!(result, Err(MappedSliceError::IndexOutOfBounds { .. }));
                        prop_assert!(is_bounds_error);
                    }
                }
                Op::InsertAt(i, v) => {
                    let result = slice.insert_at(i, v);
                    if i <= model.len() {
                        prop_assert!(result.is_ok());
                        model.insert(i, v);
                    } else {
                        let is_bounds_error = matches!(result, Err(MappedSliceError::IndexOutOfBounds { .. }));
                        prop_assert!(is_bounds_error);
                    }
                }
                Op::RemoveAt(i) => {
                    let result = slice.remove_at(i);
                    if i < model.len() {
                        prop_assert!(result.is_ok());
                        model.remove(i);
                    } else {
                        let is_bounds_error = matches!(result, Err(MappedSliceError::IndexOutOfBounds { .. }));
                        prop_assert!(is_bounds_error);
                    }
                }
                Op::Reopen => {
                    slice.close().unwrap();
                    slice = MappedSlice::<i32>::open(&path).unwrap();
                }
            }

            prop_assert_eq!(slice.len(), model.len());
            prop_assert!(slice.len() <= slice.capacity());
        }

        prop_assert_eq!(slice.to_vec().unwrap(), model.clone());
        for (i, expected) in model.iter().enumerate() {
            prop_assert_eq!(slice.get(i).unwrap(), Some(*expected));
        }
        prop_assert_eq!(slice.get(model.len()).unwrap(), None);
    }

    #[test]
    fn prop_capacity_is_power_of_two_multiple_of_floor(count in 0usize..600) {
        let temp_dir = TempDir::new().unwrap();
        let mut slice = MappedSlice::<u64>::open(temp_dir.path().join("cap.bin")).unwrap();

        for i in 0..count {
            slice.append(i as u64).unwrap();
        }

        let capacity = slice.capacity();
        prop_assert!(capacity >= 32);
        prop_assert!(capacity >= count);
        prop_assert!((capacity / 32).is_power_of_two());
        // Never more than one doubling ahead of what is needed
        prop_assert!(capacity == 32 || capacity < count * 2);
    }
}
