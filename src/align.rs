//! Alignment of annotation volumes through an external registration
//! engine.
//!
//! Registration engines work on intensities, not on label codes: sparse
//! label values such as brain region identifiers spanning millions would
//! be meaningless to them. Annotations are therefore remapped into a
//! shared dense label space before registration, warped with a label
//! preserving interpolation, and remapped back afterwards.

use crate::error::{RemapError, Result};
use crate::remap::{LabelRemapper, RemapOptions};
use log::{debug, info};
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};

/// Largest label count for which every dense label has an exact single
/// precision representation.
pub const MAX_FLOAT_LABELS: usize = 1 << 24;

/// Interpolation mode used when applying a transform to a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Linear interpolation, for intensity volumes.
    Linear,
    /// Nearest neighbor interpolation.
    NearestNeighbor,
    /// Label preserving interpolation, which never produces a value absent
    /// from the neighborhood.
    GenericLabel,
}

/// Interface to an external registration engine.
pub trait RegistrationEngine {
    /// The transform computed by the engine.
    type Transform;

    /// Compute the transform aligning `moving` onto `fixed`.
    fn register(
        &self,
        fixed: ArrayViewD<'_, f32>,
        moving: ArrayViewD<'_, f32>,
    ) -> Result<Self::Transform>;

    /// Resample `image` according to a previously computed transform.
    fn apply(
        &self,
        image: ArrayViewD<'_, f32>,
        transform: &Self::Transform,
        interpolation: Interpolation,
    ) -> Result<ArrayD<f32>>;
}

/// An annotation volume aligned onto a reference, along with the transform
/// which aligned it.
#[derive(Debug, Clone)]
pub struct AlignedAnnotation<T> {
    /// The warped annotation, in the original label codes.
    pub labels: ArrayD<u32>,
    /// The transform computed by the engine, to be applied to the volumes
    /// which accompany the annotation (e.g. a Nissl volume).
    pub transform: T,
}

/// Register the `moving` annotation onto the `reference` annotation and
/// warp it accordingly.
///
/// Both annotations are remapped into their shared dense label space,
/// registered, and the dense moving volume is warped with
/// `Interpolation::GenericLabel`. The warped volume is mapped back to the
/// original labels under the policy set in `options`.
///
/// # Errors
///
/// - `RemapError::TooManyLabels` if the annotations hold more than
///   `MAX_FLOAT_LABELS` distinct labels.
/// - Any error from the engine, or from remapping the warped volume.
pub fn align_annotations<E, S1, S2, D1, D2>(
    engine: &E,
    options: &RemapOptions,
    reference: &ArrayBase<S1, D1>,
    moving: &ArrayBase<S2, D2>,
) -> Result<AlignedAnnotation<E::Transform>>
where
    E: RegistrationEngine,
    S1: Data<Elem = u32>,
    S2: Data<Elem = u32>,
    D1: Dimension,
    D2: Dimension,
{
    info!("Remap labels of the atlases...");
    let remapper = options.build(&[reference.view().into_dyn(), moving.view().into_dyn()])?;
    if remapper.label_count() > MAX_FLOAT_LABELS {
        return Err(RemapError::TooManyLabels(remapper.label_count()));
    }
    let reference = dense_as_float(&remapper, 0)?;
    let moving = dense_as_float(&remapper, 1)?;

    info!("Compute the registration...");
    let transform = engine.register(reference.view(), moving.view())?;

    info!("Apply transformation to moving volume...");
    let warped = engine.apply(moving.view(), &transform, Interpolation::GenericLabel)?;
    debug!("warped volume of shape {:?}", warped.shape());

    info!("Remap the warped volume to original labels...");
    let labels = remapper.remap_dense_float(&warped)?;

    Ok(AlignedAnnotation { labels, transform })
}

fn dense_as_float(remapper: &LabelRemapper, index: usize) -> Result<ArrayD<f32>> {
    Ok(remapper.remap_old_to_new(index)?.mapv(|v| v as f32))
}

#[cfg(test)]
mod tests {
    use super::{align_annotations, Interpolation, RegistrationEngine};
    use crate::error::Result;
    use crate::remap::RemapOptions;
    use ndarray::{arr2, ArrayD, ArrayViewD};
    use std::cell::RefCell;

    /// Engine that records what it is given and leaves volumes unchanged.
    #[derive(Default)]
    struct Recorder {
        modes: RefCell<Vec<Interpolation>>,
        inputs: RefCell<Vec<ArrayD<f32>>>,
    }

    impl RegistrationEngine for Recorder {
        type Transform = ();

        fn register(&self, fixed: ArrayViewD<'_, f32>, moving: ArrayViewD<'_, f32>) -> Result<()> {
            self.inputs.borrow_mut().push(fixed.to_owned());
            self.inputs.borrow_mut().push(moving.to_owned());
            Ok(())
        }

        fn apply(
            &self,
            image: ArrayViewD<'_, f32>,
            _: &(),
            interpolation: Interpolation,
        ) -> Result<ArrayD<f32>> {
            self.modes.borrow_mut().push(interpolation);
            Ok(image.to_owned())
        }
    }

    #[test]
    fn engine_sees_dense_labels() {
        let engine = Recorder::default();
        let reference = arr2(&[[1000u32, 20], [20, 7]]);
        let moving = arr2(&[[7u32, 7], [1000, 20]]);
        let aligned = align_annotations(&engine, &RemapOptions::new(), &reference, &moving).unwrap();

        assert_eq!(aligned.labels, moving.into_dyn());
        let inputs = engine.inputs.borrow();
        assert_eq!(inputs[0], arr2(&[[2f32, 1.], [1., 0.]]).into_dyn());
        assert_eq!(inputs[1], arr2(&[[0f32, 0.], [2., 1.]]).into_dyn());
        assert_eq!(*engine.modes.borrow(), vec![Interpolation::GenericLabel]);
    }
}
