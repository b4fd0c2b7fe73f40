use deepatlas::{
    DynLabelVolume, LabelRemapper, LabelType, RemapError, RemapOptions, UnknownLabelPolicy,
};
use ndarray::{arr1, arr2, Array, Array2, IxDyn, ShapeBuilder};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

mod util;

use util::{annotation_3d, volume_0, volume_1};

#[test]
fn invalid_input() {
    let none: [Array2<u32>; 0] = [];
    match LabelRemapper::new(&none) {
        Err(e @ RemapError::NoVolume) => assert_eq!(e.to_string(), "No volume provided"),
        other => panic!("unexpected result {:?}", other),
    }
    match LabelRemapper::from_dyn(&[]) {
        Err(RemapError::NoVolume) => {}
        other => panic!("unexpected result {:?}", other),
    }

    // raw parts which do not make up an array
    match DynLabelVolume::from_shape_vec(&[2, 2], vec![3423u32]) {
        Err(RemapError::NotAVolume(4, 1)) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let array_1: DynLabelVolume = arr1(&[2i32, 5]).into_dyn().into();
    let array_2: DynLabelVolume = arr1(&[2u32, 3]).into_dyn().into();
    match LabelRemapper::from_dyn(&[array_1, array_2]) {
        Err(e @ RemapError::UnsupportedDataType(LabelType::Int32)) => {
            assert!(e.to_string().contains("needs to be Uint32"))
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn statically_typed_guard() {
    match LabelRemapper::new(&[arr1(&[2i32, 5])]) {
        Err(RemapError::UnsupportedDataType(LabelType::Int32)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    match LabelRemapper::new(&[arr1(&[2u64, 5])]) {
        Err(RemapError::UnsupportedDataType(LabelType::Uint64)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    match LabelRemapper::new(&[arr1(&[2f32, 5.])]) {
        Err(RemapError::UnsupportedDataType(LabelType::Float32)) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn overall() {
    let remapper = LabelRemapper::new(&[volume_0(), volume_1()]).unwrap();
    assert_eq!(remapper.len(), 2);
    assert!(!remapper.is_empty());
    assert_eq!(remapper.label_count(), 6);

    let expected: BTreeMap<u32, u32> = vec![(5, 0), (10, 1), (30, 2), (35, 3), (52, 4), (79, 5)]
        .into_iter()
        .collect();
    assert_eq!(remapper.old_to_new(), &expected);
    assert_eq!(remapper.new_to_old(), &[5, 10, 30, 35, 52, 79]);

    match remapper.remap_old_to_new(2) {
        Err(RemapError::OutOfBounds(2, 2)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    // what a negative index wraps to
    match remapper.remap_old_to_new(usize::MAX) {
        Err(RemapError::OutOfBounds(_, 2)) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let new_volume_0 = remapper.remap_old_to_new(0).unwrap();
    assert_eq!(new_volume_0, arr2(&[[1, 2], [0, 5], [1, 0]]).into_dyn());
    let new_volume_1 = remapper.remap_old_to_new(1).unwrap();
    assert_eq!(new_volume_1, arr2(&[[3, 2], [4, 1], [1, 0]]).into_dyn());

    let result = remapper.remap_new_to_old(&arr1(&[5, 1, 3])).unwrap();
    assert_eq!(result, arr1(&[79, 10, 35]));
}

#[test]
fn dynamic_volumes_remap_like_typed_ones() {
    let typed = LabelRemapper::new(&[volume_0(), volume_1()]).unwrap();
    let dynamic = LabelRemapper::from_dyn(&[
        volume_0().into_dyn().into(),
        volume_1().into_dyn().into(),
    ])
    .unwrap();
    assert_eq!(typed, dynamic);
}

#[test]
fn inventory() {
    let remapper = LabelRemapper::new(&[volume_0(), volume_1()]).unwrap();
    let inventory = remapper.inventory(0).unwrap();
    assert_eq!(inventory.unique_labels(), &[5, 10, 30, 79]);
    assert_eq!(inventory.inverse_index(), &[1, 2, 0, 3, 1, 0]);
    assert_eq!(inventory.shape(), &[3, 2]);
    assert!(remapper.inventory(2).is_none());
}

#[test]
fn round_trip() {
    let volumes = vec![annotation_3d().into_dyn(), volume_0().into_dyn(), volume_1().into_dyn()];
    let remapper = LabelRemapper::new(&volumes).unwrap();
    for (i, volume) in volumes.iter().enumerate() {
        let dense = remapper.remap_old_to_new(i).unwrap();
        assert_eq!(dense.shape(), volume.shape());
        let restored = remapper.remap_new_to_old(&dense).unwrap();
        assert_eq!(&restored, volume, "round trip of volume #{} failed", i);
    }
}

#[test]
fn column_major_volume_keeps_logical_order() {
    let fortran = Array::from_shape_vec(IxDyn(&[3, 2]).f(), vec![10u32, 5, 10, 30, 79, 5]).unwrap();
    assert_eq!(fortran, volume_0().into_dyn());

    let remapper = LabelRemapper::new(&[fortran.view()]).unwrap();
    let dense = remapper.remap_old_to_new(0).unwrap();
    assert_eq!(dense, arr2(&[[1, 2], [0, 3], [1, 0]]).into_dyn());
}

#[test]
fn label_space_invariants() {
    let volumes = vec![annotation_3d().into_dyn(), volume_0().into_dyn(), volume_1().into_dyn()];
    let remapper = LabelRemapper::new(&volumes).unwrap();

    let mut union: Vec<u32> = volumes.iter().flat_map(|v| v.iter().cloned()).collect();
    union.sort_unstable();
    union.dedup();
    let k = union.len();
    assert_eq!(remapper.label_count(), k);

    // no label dropped or invented
    let keys: Vec<u32> = remapper.old_to_new().keys().cloned().collect();
    assert_eq!(keys, union);

    // dense and contiguous
    let mut values: Vec<u32> = remapper.old_to_new().values().cloned().collect();
    values.sort_unstable();
    assert_eq!(values, (0..k as u32).collect::<Vec<_>>());

    // mutual inverses
    for (&old, &new) in remapper.old_to_new() {
        assert_eq!(remapper.to_old(new), Some(old));
        assert_eq!(remapper.to_new(old), Some(new));
    }
    for (new, &old) in remapper.new_to_old().iter().enumerate() {
        assert_eq!(remapper.old_to_new()[&old], new as u32);
    }

    // order preserving
    for w in union.windows(2) {
        assert!(remapper.to_new(w[0]).unwrap() < remapper.to_new(w[1]).unwrap());
    }

    assert_eq!(remapper.to_new(11), None);
    assert_eq!(remapper.to_old(k as u32), None);
}

#[test]
fn mapping_does_not_depend_on_input_order() {
    let a = LabelRemapper::new(&[volume_0(), volume_1()]).unwrap();
    let b = LabelRemapper::new(&[volume_1(), volume_0()]).unwrap();
    assert_eq!(a.old_to_new(), b.old_to_new());
    assert_eq!(a.remap_old_to_new(0).unwrap(), b.remap_old_to_new(1).unwrap());
}

#[test]
fn shape_is_preserved() {
    let annotation = annotation_3d();
    let remapper = LabelRemapper::new(&[annotation.view()]).unwrap();
    let dense = remapper.remap_old_to_new(0).unwrap();
    assert_eq!(dense.shape(), &[4, 3, 2]);

    // the dimension type of the argument is kept
    let dense = dense.into_dimensionality::<ndarray::Ix3>().unwrap();
    let restored: ndarray::Array3<u32> = remapper.remap_new_to_old(&dense).unwrap();
    assert_eq!(restored, annotation);

    let flat = remapper.remap_new_to_old(&arr1(&[0u32, 4, 2])).unwrap();
    assert_eq!(flat.shape(), &[3]);
}

#[test]
fn inverse_remap_of_values_outside_the_label_space() {
    let volumes = [volume_0(), volume_1()];
    let warped = arr2(&[[0u32, 5], [6, 100]]);

    let remapper = LabelRemapper::new(&volumes).unwrap();
    assert_eq!(remapper.policy(), UnknownLabelPolicy::Reject);
    match remapper.remap_new_to_old(&warped) {
        Err(RemapError::UnknownLabel(6, 6)) => {}
        other => panic!("unexpected result {:?}", other),
    }

    let remapper = RemapOptions::new()
        .unknown_labels(UnknownLabelPolicy::Clamp)
        .build(&volumes)
        .unwrap();
    assert_eq!(remapper.remap_new_to_old(&warped).unwrap(), arr2(&[[5, 79], [79, 79]]));

    let remapper = RemapOptions::new()
        .unknown_labels(UnknownLabelPolicy::Fill(0))
        .build(&volumes)
        .unwrap();
    assert_eq!(remapper.remap_new_to_old(&warped).unwrap(), arr2(&[[5, 79], [0, 0]]));
}

#[test]
fn remapper_is_shared_across_threads() {
    let remapper = Arc::new(LabelRemapper::new(&[volume_0(), volume_1()]).unwrap());
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let remapper = Arc::clone(&remapper);
            thread::spawn(move || {
                let dense = remapper.remap_old_to_new(i).unwrap();
                remapper.remap_new_to_old(&dense).unwrap()
            })
        })
        .collect();
    let restored: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(restored[0], volume_0().into_dyn());
    assert_eq!(restored[1], volume_1().into_dyn());
}
