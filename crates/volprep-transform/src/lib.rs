//! Channel-wise transforms for volprep.
//!
//! Simple label and intensity helpers ([`binarize`], [`standardize`],
//! [`mirror_border`], ...), a [`crop`] for tensors, and the dispatcher that
//! runs any of them, or the affinity and rebalancing operations, over every
//! channel of a tensor:
//!
//! ```
//! use ndarray::Array4;
//! use volprep_transform::{registry, OpKind, TransformSpec};
//!
//! let tensor = Array4::<f32>::from_elem((2, 4, 4, 4), 3.0);
//! let spec = TransformSpec::defaults(OpKind::Binarize);
//! let out = registry().apply(&spec, tensor.view()).unwrap();
//! assert_eq!(out.shape(), &[2, 4, 4, 4]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod crop;
pub mod ops;
pub mod registry;
pub mod sample;

pub use crop::crop;
pub use ops::{
    binarize, binary_class, divide_by, mirror_border, multiclass_expansion, rescale,
    standardize, NormMode, DEFAULT_DIVISOR,
};
pub use registry::{registry, OpKind, Registry, TransformSpec, VolumeOp};
pub use sample::{augment_sample, transform_sample, Sample};
