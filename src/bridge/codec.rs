//! The capability-checked codec handle.

use crate::capability::Capabilities;
use crate::config::CodecConfig;
use crate::error::PforError;
use crate::pipeline::stream;
use crate::traits::Element;

/// A validated codec variant, ready to encode and decode.
///
/// Construction is the only point where the configuration and the CPU are
/// checked; a `Codec` that exists can run on this machine. The handle is `Copy`
/// and holds no buffers, so one instance can serve any number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Builds a codec for `config` on the current CPU.
    pub fn new(config: CodecConfig) -> Result<Self, PforError> {
        Self::with_capabilities(config, Capabilities::detect())
    }

    /// Builds a codec for `config` restricted to `caps`.
    ///
    /// Fails with `CapabilityMismatch` if the variant needs an extension `caps`
    /// does not grant.
    pub fn with_capabilities(config: CodecConfig, caps: Capabilities) -> Result<Self, PforError> {
        config.validate()?;
        caps.require(config.block_width)?;
        log::info!(
            "codec ready: {} blocks of {}, {:?}, delta base {:?}, exception budget {}",
            config.block_width,
            config.block_size(),
            config.direction,
            config.delta_base,
            config.effective_exception_budget()
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Worst-case number of bytes `encode` may need for `n` elements of `E`.
    pub fn max_compressed_len<E: Element>(&self, n: usize) -> usize {
        stream::max_compressed_len::<E>(&self.config, n)
    }

    /// Compresses `input` into `out`, returning the number of bytes written.
    ///
    /// `out` must hold at least `max_compressed_len::<E>(input.len())` bytes.
    pub fn encode<E: Element>(&self, input: &[E], out: &mut [u8]) -> Result<usize, PforError> {
        stream::encode(&self.config, input, out)
    }

    /// Reconstructs `n` elements from `input` into `out[..n]`, returning the
    /// number of bytes consumed. `out[n..]` is left untouched.
    pub fn decode<E: Element>(
        &self,
        input: &[u8],
        n: usize,
        out: &mut [E],
    ) -> Result<usize, PforError> {
        stream::decode(&self.config, input, n, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockWidth;

    #[test]
    fn test_codec_is_send_sync_copy() {
        fn assert_traits<T: Send + Sync + Copy>() {}
        assert_traits::<Codec>();
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CodecConfig::p4nd1(BlockWidth::W128).with_exception_budget(1000);
        assert!(matches!(Codec::new(config), Err(PforError::InvalidConfig(_))));
    }

    #[test]
    fn test_narrow_only_refuses_wide_variant() {
        let config = CodecConfig::p4nd1(BlockWidth::W256);
        let result = Codec::with_capabilities(config, Capabilities::narrow_only());
        assert!(matches!(
            result,
            Err(PforError::CapabilityMismatch { variant: BlockWidth::W256 })
        ));
    }
}
