//! This module contains the label remapper, which maps the labels of one
//! or more label volumes into a shared space of dense consecutive labels
//! and back.
//!
//! Labels are assigned a dense index in ascending order of their original
//! value, so that the same set of labels always yields the same mapping.
//!
//! # Example
//!
//! ```
//! use deepatlas::LabelRemapper;
//! use ndarray::arr2;
//!
//! let reference = arr2(&[[10u32, 30], [5, 79]]);
//! let moving = arr2(&[[35u32, 30], [52, 10]]);
//! let remapper = LabelRemapper::new(&[reference, moving])?;
//! assert_eq!(remapper.label_count(), 6);
//!
//! let dense = remapper.remap_old_to_new(0)?;
//! assert_eq!(dense, arr2(&[[1, 2], [0, 5]]).into_dyn());
//! assert_eq!(remapper.remap_new_to_old(&dense)?, arr2(&[[10, 30], [5, 79]]).into_dyn());
//! # Ok::<(), deepatlas::RemapError>(())
//! ```
use crate::error::{RemapError, Result};
use crate::typedef::LabelType;
use crate::volume::util::{gather, unique_with_inverse};
use crate::volume::{DynLabelVolume, LabelElement};
use log::{debug, warn};
use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension, IxDyn};
use num_traits::AsPrimitive;
use std::collections::{BTreeMap, BTreeSet};

/// What to do with a value that is not part of the dense label space
/// when remapping back to the original labels. Such values appear when
/// a continuous transformation is applied to dense labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownLabelPolicy {
    /// Fail with `RemapError::UnknownLabel` (or
    /// `RemapError::InvalidDenseValue` for floating point volumes).
    Reject,
    /// Replace with the nearest dense label, i.e. clamp into `0..K`.
    Clamp,
    /// Replace with the given original label, such as the background.
    Fill(u32),
}

impl Default for UnknownLabelPolicy {
    fn default() -> Self {
        UnknownLabelPolicy::Reject
    }
}

/// Options and flags which can be used to configure how a label remapper
/// is built and behaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemapOptions {
    unknown_labels: UnknownLabelPolicy,
}

impl RemapOptions {
    /// Create a new set of options with the default policy, which
    /// rejects unknown dense labels.
    pub fn new() -> Self {
        RemapOptions::default()
    }

    /// Set the policy for values outside the dense label space.
    pub fn unknown_labels(&mut self, policy: UnknownLabelPolicy) -> &mut Self {
        self.unknown_labels = policy;
        self
    }

    /// Build a remapper over the given label volumes.
    ///
    /// # Errors
    ///
    /// - `RemapError::NoVolume` if `volumes` is empty.
    /// - `RemapError::UnsupportedDataType` if the elements are not `u32`.
    pub fn build<T, S, D>(&self, volumes: &[ArrayBase<S, D>]) -> Result<LabelRemapper>
    where
        T: LabelElement,
        S: Data<Elem = T>,
        D: Dimension,
    {
        if volumes.is_empty() {
            return Err(RemapError::NoVolume);
        }
        if T::DATA_TYPE != LabelType::Uint32 {
            return Err(RemapError::UnsupportedDataType(T::DATA_TYPE));
        }
        let inventories = volumes
            .iter()
            .map(|v| {
                LabelInventory::from_labels(v.iter().map(|&x| AsPrimitive::<u32>::as_(x)), v.shape())
            })
            .collect();
        Ok(LabelRemapper::from_inventories(inventories, self.unknown_labels))
    }

    /// Build a remapper over the given dynamically typed label volumes.
    ///
    /// # Errors
    ///
    /// - `RemapError::NoVolume` if `volumes` is empty.
    /// - `RemapError::UnsupportedDataType` if any volume's elements are
    ///   not `u32`.
    pub fn build_dyn(&self, volumes: &[DynLabelVolume]) -> Result<LabelRemapper> {
        if volumes.is_empty() {
            return Err(RemapError::NoVolume);
        }
        let views = volumes
            .iter()
            .map(DynLabelVolume::as_labels)
            .collect::<Result<Vec<_>>>()?;
        let inventories = views.iter().map(LabelInventory::from_array).collect();
        Ok(LabelRemapper::from_inventories(inventories, self.unknown_labels))
    }
}

/// The distinct labels of a single volume, along with what is needed to
/// rebuild the volume from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInventory {
    unique: Vec<u32>,
    inverse: Vec<u32>,
    shape: Vec<usize>,
}

impl LabelInventory {
    /// Take the inventory of a label array.
    pub fn from_array<S, D>(volume: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = u32>,
        D: Dimension,
    {
        LabelInventory::from_labels(volume.iter().cloned(), volume.shape())
    }

    fn from_labels<I>(labels: I, shape: &[usize]) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let (unique, inverse) = unique_with_inverse(labels);
        LabelInventory {
            unique,
            inverse,
            shape: shape.to_vec(),
        }
    }

    /// The distinct labels of the volume, in ascending order.
    pub fn unique_labels(&self) -> &[u32] {
        &self.unique
    }

    /// For each element in logical order, its index in `unique_labels`.
    pub fn inverse_index(&self) -> &[u32] {
        &self.inverse
    }

    /// The shape of the volume.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// Maps the labels of a fixed collection of volumes into a shared space
/// of dense labels `0..K` and back. Immutable once built.
///
/// Built with [`LabelRemapper::new`], [`LabelRemapper::from_dyn`] or,
/// for a non-default policy, [`RemapOptions`].
///
/// [`LabelRemapper::new`]: #method.new
/// [`LabelRemapper::from_dyn`]: #method.from_dyn
/// [`RemapOptions`]: ./struct.RemapOptions.html
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRemapper {
    inventories: Vec<LabelInventory>,
    old_to_new: BTreeMap<u32, u32>,
    /// sorted, indexed by dense label
    new_to_old: Vec<u32>,
    policy: UnknownLabelPolicy,
}

impl LabelRemapper {
    /// Build a remapper over the given label volumes, with default
    /// options.
    ///
    /// # Errors
    ///
    /// - `RemapError::NoVolume` if `volumes` is empty.
    /// - `RemapError::UnsupportedDataType` if the elements are not `u32`.
    pub fn new<T, S, D>(volumes: &[ArrayBase<S, D>]) -> Result<Self>
    where
        T: LabelElement,
        S: Data<Elem = T>,
        D: Dimension,
    {
        RemapOptions::new().build(volumes)
    }

    /// Build a remapper over the given dynamically typed label volumes,
    /// with default options.
    ///
    /// # Errors
    ///
    /// - `RemapError::NoVolume` if `volumes` is empty.
    /// - `RemapError::UnsupportedDataType` if any volume's elements are
    ///   not `u32`.
    pub fn from_dyn(volumes: &[DynLabelVolume]) -> Result<Self> {
        RemapOptions::new().build_dyn(volumes)
    }

    fn from_inventories(inventories: Vec<LabelInventory>, policy: UnknownLabelPolicy) -> Self {
        let labels: BTreeSet<u32> = inventories
            .iter()
            .flat_map(|inv| inv.unique.iter().cloned())
            .collect();
        let new_to_old: Vec<u32> = labels.into_iter().collect();
        let old_to_new = new_to_old
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u32))
            .collect();
        debug!(
            "remapping {} volume(s) onto {} dense label(s)",
            inventories.len(),
            new_to_old.len()
        );

        LabelRemapper {
            inventories,
            old_to_new,
            new_to_old,
            policy,
        }
    }

    /// The number of volumes the remapper was built with.
    pub fn len(&self) -> usize {
        self.inventories.len()
    }

    /// Whether the remapper holds no volumes. Never the case for a
    /// remapper that was successfully built.
    pub fn is_empty(&self) -> bool {
        self.inventories.is_empty()
    }

    /// The number of distinct labels across all volumes, `K`.
    pub fn label_count(&self) -> usize {
        self.new_to_old.len()
    }

    /// The mapping from original labels to dense labels.
    pub fn old_to_new(&self) -> &BTreeMap<u32, u32> {
        &self.old_to_new
    }

    /// The mapping from dense labels to original labels, indexed by the
    /// dense label.
    pub fn new_to_old(&self) -> &[u32] {
        &self.new_to_old
    }

    /// Look up the dense label of an original label.
    pub fn to_new(&self, label: u32) -> Option<u32> {
        self.old_to_new.get(&label).cloned()
    }

    /// Look up the original label of a dense label.
    pub fn to_old(&self, dense: u32) -> Option<u32> {
        self.new_to_old.get(dense as usize).cloned()
    }

    /// Retrieve the inventory of the volume at the given position.
    pub fn inventory(&self, index: usize) -> Option<&LabelInventory> {
        self.inventories.get(index)
    }

    /// The policy applied to values outside the dense label space.
    pub fn policy(&self) -> UnknownLabelPolicy {
        self.policy
    }

    /// Obtain the volume at the given position with its labels replaced
    /// by dense labels. The result has the shape of the original volume.
    ///
    /// # Errors
    ///
    /// - `RemapError::OutOfBounds` if `index` is not lower than `len()`.
    pub fn remap_old_to_new(&self, index: usize) -> Result<ArrayD<u32>> {
        let inventory = self
            .inventories
            .get(index)
            .ok_or_else(|| RemapError::OutOfBounds(index, self.len()))?;

        let table: Vec<u32> = inventory
            .unique
            .iter()
            .map(|label| self.old_to_new[label])
            .collect();
        let data = gather(&table, &inventory.inverse);
        Ok(Array::from_shape_vec(IxDyn(&inventory.shape), data)?)
    }

    /// Replace the dense labels of the given volume with their original
    /// labels. The volume does not need to be one of those the remapper
    /// was built with, it is usually the result of transforming one.
    ///
    /// # Errors
    ///
    /// - `RemapError::UnknownLabel` if a value is outside the dense label
    ///   space and the policy is `Reject`.
    pub fn remap_new_to_old<S, D>(&self, volume: &ArrayBase<S, D>) -> Result<Array<u32, D>>
    where
        S: Data<Elem = u32>,
        D: Dimension,
    {
        let (unique, inverse) = unique_with_inverse(volume.iter().cloned());
        let mut replaced = 0;
        let mut table = Vec::with_capacity(unique.len());
        for dense in unique {
            let (label, fallback) = self.resolve(dense)?;
            if fallback {
                replaced += 1;
            }
            table.push(label);
        }
        self.report(replaced);

        let data = gather(&table, &inverse);
        Ok(Array::from_shape_vec(volume.raw_dim(), data)?)
    }

    /// Replace the dense labels of a floating point volume, as produced by
    /// a transformation engine, with their original labels. Finite,
    /// non-negative integral values are dense labels; any other value is
    /// subject to the policy (`Clamp` rounds, and still rejects NaN).
    ///
    /// # Errors
    ///
    /// - `RemapError::InvalidDenseValue` if a value is not integral and the
    ///   policy is `Reject`, or is NaN and the policy is `Clamp`.
    /// - `RemapError::UnknownLabel` if an integral value is outside the
    ///   dense label space and the policy is `Reject`.
    pub fn remap_dense_float<S, D>(&self, volume: &ArrayBase<S, D>) -> Result<Array<u32, D>>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        let mut replaced = 0;
        let mut data = Vec::with_capacity(volume.len());
        for &value in volume.iter() {
            let (label, fallback) = self.resolve_float(value)?;
            if fallback {
                replaced += 1;
            }
            data.push(label);
        }
        self.report(replaced);

        Ok(Array::from_shape_vec(volume.raw_dim(), data)?)
    }

    /// Map a dense label to its original label. The flag tells whether the
    /// policy had to be applied.
    fn resolve(&self, dense: u32) -> Result<(u32, bool)> {
        if let Some(label) = self.to_old(dense) {
            return Ok((label, false));
        }
        match self.policy {
            UnknownLabelPolicy::Reject => Err(RemapError::UnknownLabel(dense, self.label_count())),
            UnknownLabelPolicy::Clamp => self
                .new_to_old
                .last()
                .map(|&label| (label, true))
                .ok_or(RemapError::UnknownLabel(dense, 0)),
            UnknownLabelPolicy::Fill(label) => Ok((label, true)),
        }
    }

    fn resolve_float(&self, value: f32) -> Result<(u32, bool)> {
        if value.is_finite() && value >= 0. && value.fract() == 0. && value <= u32::MAX as f32 {
            return self.resolve(value as u32);
        }
        match self.policy {
            UnknownLabelPolicy::Reject => Err(RemapError::InvalidDenseValue(value)),
            UnknownLabelPolicy::Clamp if !value.is_nan() => {
                let last = self
                    .label_count()
                    .checked_sub(1)
                    .ok_or(RemapError::InvalidDenseValue(value))?;
                let dense = (value.round().max(0.) as usize).min(last);
                Ok((self.new_to_old[dense], true))
            }
            UnknownLabelPolicy::Clamp => Err(RemapError::InvalidDenseValue(value)),
            UnknownLabelPolicy::Fill(label) => Ok((label, true)),
        }
    }

    fn report(&self, replaced: usize) {
        if replaced > 0 {
            warn!(
                "{} value(s) outside of the {} dense label(s) replaced ({:?})",
                replaced,
                self.label_count(),
                self.policy
            );
        }
    }
}
