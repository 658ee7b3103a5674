//! Planar multi-channel audio storage and non-owning views.
//!
//! [`ChannelBuffer`] owns `channels × capacity` samples laid out channel after
//! channel. [`AudioBlock`] is a mutable window over some prefix of each
//! channel; it never owns memory and only lives for one processing call.
//! Sub-blocks and prefix views are created without allocating, which is what
//! lets the oversampler and crossover work on pre-sized scratch storage.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Host-side processing configuration handed to every `prepare` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Host sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will ever pass to `process`.
    pub max_block_size: usize,
    /// Number of audio channels.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Convenience constructor.
    pub fn new(sample_rate: f32, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }
}

/// Mutable view over `num_channels × num_samples` planar samples.
///
/// Channel `c` starts at `c * stride` in the underlying slice.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    data: &'a mut [f32],
    num_channels: usize,
    num_samples: usize,
    stride: usize,
}

impl<'a> AudioBlock<'a> {
    /// View over densely packed planar data (`stride == num_samples`).
    pub fn new(data: &'a mut [f32], num_channels: usize, num_samples: usize) -> Self {
        Self::with_stride(data, num_channels, num_samples, num_samples)
    }

    /// View over planar data whose channels are `stride` samples apart.
    pub fn with_stride(
        data: &'a mut [f32],
        num_channels: usize,
        num_samples: usize,
        stride: usize,
    ) -> Self {
        debug_assert!(num_samples <= stride || num_channels <= 1);
        debug_assert!(num_channels == 0 || data.len() >= (num_channels - 1) * stride + num_samples);
        Self {
            data,
            num_channels,
            num_samples,
            stride,
        }
    }

    /// Number of channels in the view.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of samples per channel.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// True when the view holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0 || self.num_channels == 0
    }

    /// Samples of one channel.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.stride;
        &self.data[start..start + self.num_samples]
    }

    /// Mutable samples of one channel.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.stride;
        &mut self.data[start..start + self.num_samples]
    }

    /// Shorter-lived view over the same samples.
    pub fn reborrow(&mut self) -> AudioBlock<'_> {
        AudioBlock {
            data: &mut *self.data,
            num_channels: self.num_channels,
            num_samples: self.num_samples,
            stride: self.stride,
        }
    }

    /// View over `len` samples starting at `start` in every channel.
    pub fn sub_block(&mut self, start: usize, len: usize) -> AudioBlock<'_> {
        debug_assert!(start + len <= self.num_samples);
        AudioBlock {
            data: &mut self.data[start..],
            num_channels: self.num_channels,
            num_samples: len,
            stride: self.stride,
        }
    }

    /// Copy `other` into this view (common channels and samples only).
    pub fn copy_from(&mut self, other: &AudioBlock<'_>) {
        let len = self.num_samples.min(other.num_samples);
        for ch in 0..self.num_channels.min(other.num_channels) {
            self.channel_mut(ch)[..len].copy_from_slice(&other.channel(ch)[..len]);
        }
    }

    /// Add `other` sample-wise into this view.
    pub fn add_from(&mut self, other: &AudioBlock<'_>) {
        let len = self.num_samples.min(other.num_samples);
        for ch in 0..self.num_channels.min(other.num_channels) {
            for (dst, src) in self.channel_mut(ch)[..len].iter_mut().zip(other.channel(ch)) {
                *dst += src;
            }
        }
    }

    /// Multiply every sample by a constant.
    pub fn scale(&mut self, gain: f32) {
        for ch in 0..self.num_channels {
            for sample in self.channel_mut(ch) {
                *sample *= gain;
            }
        }
    }

    /// Zero every sample.
    pub fn clear(&mut self) {
        for ch in 0..self.num_channels {
            self.channel_mut(ch).fill(0.0);
        }
    }

    /// Apply `f` to every sample in place.
    #[inline]
    pub fn map_in_place(&mut self, mut f: impl FnMut(f32) -> f32) {
        for ch in 0..self.num_channels {
            for sample in self.channel_mut(ch) {
                *sample = f(*sample);
            }
        }
    }
}

/// Owned planar storage for `num_channels × capacity` samples.
#[derive(Debug, Clone, Default)]
pub struct ChannelBuffer {
    data: Vec<f32>,
    num_channels: usize,
    capacity: usize,
}

impl ChannelBuffer {
    /// Allocate a zeroed buffer.
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            data: vec![0.0; num_channels * capacity],
            num_channels,
            capacity,
        }
    }

    /// Build a buffer from interleaved frames.
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> Self {
        if num_channels == 0 {
            return Self::default();
        }
        let frames = samples.len() / num_channels;
        let mut buffer = Self::new(num_channels, frames);
        for (frame, chunk) in samples.chunks_exact(num_channels).enumerate() {
            for (ch, &s) in chunk.iter().enumerate() {
                buffer.data[ch * frames + frame] = s;
            }
        }
        buffer
    }

    /// Interleave the first `len` frames into a new vector.
    pub fn to_interleaved(&self, len: usize) -> Vec<f32> {
        let len = len.min(self.capacity);
        let mut out = Vec::with_capacity(len * self.num_channels);
        for frame in 0..len {
            for ch in 0..self.num_channels {
                out.push(self.data[ch * self.capacity + frame]);
            }
        }
        out
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Full-capacity samples of one channel.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.capacity;
        &self.data[start..start + self.capacity]
    }

    /// Full-capacity mutable samples of one channel.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.capacity;
        &mut self.data[start..start + self.capacity]
    }

    /// View over the first `num_samples` samples of every channel.
    #[inline]
    pub fn block(&mut self, num_samples: usize) -> AudioBlock<'_> {
        debug_assert!(num_samples <= self.capacity);
        AudioBlock::with_stride(&mut self.data, self.num_channels, num_samples, self.capacity)
    }

    /// View over `len` samples starting at `start` in every channel.
    pub fn block_range(&mut self, start: usize, len: usize) -> AudioBlock<'_> {
        debug_assert!(start + len <= self.capacity);
        AudioBlock::with_stride(&mut self.data[start..], self.num_channels, len, self.capacity)
    }

    /// Zero all samples.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}
