//! # System Integration Utilities
//!
//! Runtime detection of the CPU capabilities the table relies on: vector
//! registers for key comparison and the hardware CRC instruction for hashing.

pub mod cpu_features;

pub use cpu_features::{get_cpu_features, has_cpu_feature, CpuFeature, CpuFeatureSet, RuntimeCpuFeatures};
