//! # CPU Feature Detection
//!
//! Runtime CPU feature detection, performed once per process and cached.

use std::sync::OnceLock;

/// CPU feature flags relevant to key comparison and hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuFeature {
    /// x86_64 128-bit integer vectors
    SSE2,
    /// x86_64 SSE4.2 (provides the `crc32` instruction)
    SSE4_2,
    /// x86_64 256-bit integer vectors
    AVX2,
    /// AArch64 Advanced SIMD
    NEON,
    /// AArch64 CRC32 extension
    CRC32,
}

/// Detected CPU capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuFeatureSet {
    /// SSE2 is available
    pub has_sse2: bool,
    /// SSE4.2 is available
    pub has_sse42: bool,
    /// AVX2 is available
    pub has_avx2: bool,
    /// NEON is available
    pub has_neon: bool,
    /// ARM CRC32 extension is available
    pub has_crc32: bool,
}

impl CpuFeatureSet {
    /// A feature set with nothing enabled, forcing scalar code paths
    pub const fn scalar() -> Self {
        Self {
            has_sse2: false,
            has_sse42: false,
            has_avx2: false,
            has_neon: false,
            has_crc32: false,
        }
    }

    /// Check if a specific feature is available
    pub fn has_feature(&self, feature: CpuFeature) -> bool {
        match feature {
            CpuFeature::SSE2 => self.has_sse2,
            CpuFeature::SSE4_2 => self.has_sse42,
            CpuFeature::AVX2 => self.has_avx2,
            CpuFeature::NEON => self.has_neon,
            CpuFeature::CRC32 => self.has_crc32,
        }
    }

    /// Whether a 128-bit vector compare is available
    pub fn has_vector_compare(&self) -> bool {
        self.has_sse2 || self.has_neon
    }

    /// Whether a hardware CRC32 instruction is available
    pub fn has_hardware_crc(&self) -> bool {
        self.has_sse42 || self.has_crc32
    }
}

/// Runtime CPU feature detection interface
pub struct RuntimeCpuFeatures;

impl RuntimeCpuFeatures {
    /// Create a new runtime feature detector
    pub fn new() -> Self {
        Self
    }

    /// Detect all available CPU features
    pub fn detect_features(&self) -> CpuFeatureSet {
        #[allow(unused_mut)]
        let mut features = CpuFeatureSet::scalar();

        #[cfg(target_arch = "x86_64")]
        {
            features.has_sse2 = std::is_x86_feature_detected!("sse2");
            features.has_sse42 = std::is_x86_feature_detected!("sse4.2");
            features.has_avx2 = std::is_x86_feature_detected!("avx2");
        }

        #[cfg(target_arch = "aarch64")]
        {
            features.has_neon = std::arch::is_aarch64_feature_detected!("neon");
            features.has_crc32 = std::arch::is_aarch64_feature_detected!("crc");
        }

        log::debug!("Detected CPU features: {:?}", features);
        features
    }
}

impl Default for RuntimeCpuFeatures {
    fn default() -> Self {
        Self::new()
    }
}

static CPU_FEATURES: OnceLock<CpuFeatureSet> = OnceLock::new();

/// Get the global CPU feature set (detected once on first call)
pub fn get_cpu_features() -> &'static CpuFeatureSet {
    CPU_FEATURES.get_or_init(|| RuntimeCpuFeatures::new().detect_features())
}

/// Check if a specific CPU feature is available
pub fn has_cpu_feature(feature: CpuFeature) -> bool {
    get_cpu_features().has_feature(feature)
}
