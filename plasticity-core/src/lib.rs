//! Plasticity Core - elastic-to-plastic stress correction
//!
//! Estimates the stress and plastic strain a locally yielding material carries,
//! given pseudo-elastic stresses from a linear transient analysis and a
//! temperature-dependent hardening model:
//! - Temperature-blended multilinear hardening database
//! - Neuber and Glinka corrections on equivalent stress
//! - Incremental Buczynski-Glinka (IBG) correction on tensor histories
//! - Parallel batch dispatch using Rayon
//!
//! # Architecture
//!
//! Data flows one way:
//!
//! - [`MaterialDatabase`]: validated, immutable hardening tables
//! - [`CurveRow`] / [`TemperatureBlend`]: interpolation, inversion and plastic
//!   work on one curve, blended across temperature
//! - [`scalar`] / [`ibg`]: per-point and per-node kernels
//! - [`batch`]: shape checks and parallel dispatch
//!
//! # Example
//!
//! ```
//! use plasticity_core::{apply_glinka_correction, default_material_database, CorrectionParameters};
//!
//! let material = default_material_database();
//! let params = CorrectionParameters::default();
//! let result = apply_glinka_correction(&[300.0, 500.0], &[22.0, 22.0], &material, &params).unwrap();
//!
//! assert_eq!(result.plastic_strain[0], 0.0);
//! assert!(result.corrected_stress[1] < 500.0);
//! ```

pub mod types;
pub mod curve;
pub mod material;
pub mod blend;
pub mod params;
pub mod newton;
pub mod scalar;
pub mod ibg;
pub mod batch;
pub mod profile;
pub mod error;

pub use types::{shear_modulus, StressTensor};
pub use curve::{CurveRow, ExtrapolationPolicy};
pub use material::{build_material_database, default_material_database, MaterialDatabase};
pub use blend::{TemperatureBlend, TemperatureBracket};
pub use params::{CorrectionMethod, CorrectionParameters};
pub use scalar::ScalarCorrectionResult;
pub use ibg::TensorCorrectionResult;
pub use batch::{
    apply_glinka_correction, apply_ibg_correction, apply_ibg_correction_nodes,
    apply_neuber_correction, apply_scalar_correction,
};
pub use profile::{HardeningCurve, MaterialProfile, TemperatureField};
pub use error::{Error, Result};
