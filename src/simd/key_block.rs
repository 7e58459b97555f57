//! Inline key buffer sized to a whole number of vector registers

use std::fmt;

/// Default byte width of the inline key buffer (one 128-bit vector register).
///
/// Keys strictly shorter than the width are stored inline; keys of this length
/// or longer go to the table's overflow array.
pub const SMALL_KEY_LEN: usize = 16;

/// Inline widths a [`KeyBlock`] can be instantiated with: one SSE2/NEON
/// register, one AVX2 register, or four 128-bit registers.
pub const SUPPORTED_KEY_WIDTHS: [usize; 3] = [16, 32, 64];

/// Zero-padded, 16-aligned copy of a short key, `N` bytes wide.
///
/// The alignment lets the 128-bit compare use aligned loads on both the stored
/// entry and the probe. `N` must be one of [`SUPPORTED_KEY_WIDTHS`]; other
/// widths fail to compile when the block is first built.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub struct KeyBlock<const N: usize = SMALL_KEY_LEN>([u8; N]);

impl<const N: usize> KeyBlock<N> {
    const WIDTH_CHECK: () = assert!(
        N == 16 || N == 32 || N == 64,
        "inline key width must be 16, 32 or 64 bytes"
    );

    /// Bit pattern of an equality mask where all `N` bytes matched
    pub const ALL_EQUAL_MASK: u64 = u64::MAX >> (64 - N);

    /// Inline width in bytes; keys must be strictly shorter
    pub const WIDTH: usize = N;

    /// Copies `key` into a fresh block, zero-filling the tail.
    ///
    /// # Panics
    ///
    /// Panics if `key` does not fit, i.e. `key.len() >= N`.
    #[inline]
    pub fn from_short(key: &[u8]) -> Self {
        let () = Self::WIDTH_CHECK;
        assert!(
            key.len() < N,
            "key of {} bytes does not fit an inline block of {}",
            key.len(),
            N
        );
        let mut bytes = [0u8; N];
        bytes[..key.len()].copy_from_slice(key);
        Self(bytes)
    }

    /// Full padded contents
    #[inline]
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// The first `len` bytes, i.e. the key itself
    #[inline]
    pub fn key(&self, len: usize) -> &[u8] {
        &self.0[..len]
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.0.as_ptr()
    }

    /// The block as native-endian 64-bit words
    #[inline]
    pub(crate) fn words(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.chunks_exact(8).map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_ne_bytes(word)
        })
    }
}

impl<const N: usize> Default for KeyBlock<N> {
    fn default() -> Self {
        let () = Self::WIDTH_CHECK;
        Self([0; N])
    }
}

impl<const N: usize> fmt::Debug for KeyBlock<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyBlock<{}>(\"{}\")", N, self.0.escape_ascii())
    }
}
