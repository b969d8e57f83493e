//! WAN outpaint frame planning.
//!
//! The WAN video VAE compresses time by 4: a clip of `n` frames encodes to
//! `((n - 1) / 4) + 1` latent frames, so only counts of the form `1 + 4k`
//! survive an encode/decode round trip. The model generates at most
//! [`MAX_GENERATION_FRAMES`] frames per sampler, so longer clips are split
//! into stages that overlap the previous stage by a few context frames.

pub mod frames;
pub mod plan;

pub use frames::{
    is_valid_frame_count, latent_frame_count, min_valid_context, next_valid_frame_count,
    DEFAULT_MIN_CONTEXT, MAX_GENERATION_FRAMES, MAX_VALID_FRAME_COUNT,
};
pub use plan::{parse_extra_context, plan, ExtraContext, Plan, Stage};
