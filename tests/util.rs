use ndarray::{arr2, arr3, Array2, Array3};
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// First annotation of the reference scenario.
#[allow(dead_code)]
pub fn volume_0() -> Array2<u32> {
    arr2(&[[10, 30], [5, 79], [10, 5]])
}

/// Second annotation of the reference scenario.
#[allow(dead_code)]
pub fn volume_1() -> Array2<u32> {
    arr2(&[[35, 30], [52, 10], [10, 5]])
}

/// A small 3D annotation with sparse region identifiers, as found in
/// brain atlases.
#[allow(dead_code)]
pub fn annotation_3d() -> Array3<u32> {
    arr3(&[
        [[0, 0], [997, 8], [8, 0]],
        [[0, 1050], [484_682_470, 8], [997, 997]],
        [[0, 0], [0, 1050], [8, 484_682_470]],
        [[0, 0], [0, 0], [0, 0]],
    ])
}

/// Create a path to a file named `name` in a fresh temporary directory.
/// The directory is removed when the returned guard is dropped.
#[allow(dead_code)]
pub fn get_temporary_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}
