//! Convert (§4.5 "Convert"): sample-rate, bit-depth, and/or container.

use signet_core::edit_tracked_file::AudioLoader;
use signet_core::file_collection::FileCollection;
use signet_core::ContainerFormat;
use signet_dsp::{CubicResampler, ResampleExt, Resampler};

use crate::error::{Error, Result};
use crate::processor::Processor;

pub struct Convert {
    sample_rate: Option<u32>,
    bits_per_sample: Option<u16>,
    container: Option<ContainerFormat>,
    resampler: Box<dyn Resampler>,
}

impl Convert {
    pub fn new(sample_rate: Option<u32>, bits_per_sample: Option<u16>, container: Option<ContainerFormat>) -> Result<Self> {
        if let (Some(container), Some(bits)) = (container, bits_per_sample)
            && !container.accepts_bit_depth(bits)
        {
            return Err(Error::InvalidConvertTarget { container, bits });
        }
        Ok(Self {
            sample_rate,
            bits_per_sample,
            container,
            resampler: Box::new(CubicResampler),
        })
    }
}

impl Processor for Convert {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn process_files(&mut self, collection: &mut FileCollection, loader: &dyn AudioLoader) -> Result<()> {
        // Pre-validate every file against the requested triple before
        // mutating any of them (§4.5).
        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            let container = self.container.unwrap_or(audio.container);
            let bits = self.bits_per_sample.unwrap_or(audio.bits_per_sample);
            if !container.accepts_bit_depth(bits) {
                return Err(Error::InvalidConvertTarget { container, bits });
            }
        }

        for file in collection.iter_mut() {
            let audio = file.audio_mut(loader);
            if let Some(rate) = self.sample_rate {
                audio.resample(rate, self.resampler.as_ref());
            }
            if let Some(bits) = self.bits_per_sample {
                audio.bits_per_sample = bits;
            }
            if let Some(container) = self.container {
                audio.container = container;
            }
        }
        Ok(())
    }
}
