//! Greedy stage planner for multi-sampler outpainting.
//!
//! Stage 0 always generates a full window with no context. Each later stage
//! re-uses the tail of what is already generated as context and extends the
//! timeline by `generation_length - context_length` frames. The last stage
//! is shrunk to the smallest valid window that still reaches `total_frames`.

use crate::core::error::{PlanError, PlanResult};
use crate::planner::frames::{
    min_valid_context, next_valid_frame_count, DEFAULT_MIN_CONTEXT, MAX_GENERATION_FRAMES,
};
use serde::{Deserialize, Serialize};

/// One sampler pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Frames generated by this pass; always a valid `1 + 4k` count.
    pub generation_length: i64,
    /// Leading frames of the window that overlap already generated frames.
    pub context_length: i64,
    /// Position in the source video where the window starts contributing new frames.
    pub start_position: i64,
}

impl Stage {
    /// Frames this stage adds to the timeline.
    pub fn new_frames(&self) -> i64 {
        self.generation_length - self.context_length
    }
}

/// An ordered list of stages covering `[0, total_frames)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    total_frames: i64,
    stages: Vec<Stage>,
}

impl Plan {
    /// Requested frame count.
    pub fn total_frames(&self) -> i64 {
        self.total_frames
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn generation_lengths(&self) -> Vec<i64> {
        self.stages.iter().map(|s| s.generation_length).collect()
    }

    pub fn context_lengths(&self) -> Vec<i64> {
        self.stages.iter().map(|s| s.context_length).collect()
    }

    pub fn start_positions(&self) -> Vec<i64> {
        self.stages.iter().map(|s| s.start_position).collect()
    }

    /// Frames on the timeline once every stage has run.
    pub fn frames_covered(&self) -> i64 {
        self.stages.iter().map(Stage::new_frames).sum()
    }

    /// Padding frames generated past `total_frames`.
    ///
    /// Only a single-stage plan can overshoot, by rounding a short clip up
    /// to the next valid count.
    pub fn overshoot(&self) -> i64 {
        self.frames_covered() - self.total_frames
    }
}

/// Per-stage extra context requested by the caller.
///
/// The caller supplies a comma-separated string such as `"0,0,4"`. A string
/// that fails to parse is kept as [`ExtraContext::Malformed`] and behaves
/// exactly like an empty list: no stage gets extra context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraContext {
    Parsed(Vec<i64>),
    Malformed { input: String },
}

impl ExtraContext {
    pub fn parse(text: &str) -> Self {
        let parsed: Result<Vec<i64>, _> = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse::<i64>)
            .collect();

        match parsed {
            Ok(values) => ExtraContext::Parsed(values),
            Err(err) => {
                log::debug!("ignoring malformed extra context {:?}: {}", text, err);
                ExtraContext::Malformed {
                    input: text.to_string(),
                }
            }
        }
    }

    /// Values to apply; empty for malformed input.
    pub fn values(&self) -> &[i64] {
        match self {
            ExtraContext::Parsed(values) => values,
            ExtraContext::Malformed { .. } => &[],
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ExtraContext::Malformed { .. })
    }
}

/// Parse a comma-separated extra context list, falling back to empty.
pub fn parse_extra_context(text: &str) -> Vec<i64> {
    ExtraContext::parse(text).values().to_vec()
}

/// Split `total_frames` into overlapping generation stages.
///
/// `extra_context_per_stage[i]` adds context frames to stage `i`; stage 0
/// never has context, so its entry is ignored. Negative entries count as 0.
pub fn plan(total_frames: i64, extra_context_per_stage: &[i64]) -> PlanResult<Plan> {
    if total_frames < 1 {
        return Err(PlanError::InvalidTotalFrames(total_frames));
    }

    if total_frames <= MAX_GENERATION_FRAMES {
        return Ok(Plan {
            total_frames,
            stages: vec![Stage {
                generation_length: next_valid_frame_count(total_frames),
                context_length: 0,
                start_position: 0,
            }],
        });
    }

    let mut stages = vec![Stage {
        generation_length: MAX_GENERATION_FRAMES,
        context_length: 0,
        start_position: 0,
    }];
    let mut frames_covered = MAX_GENERATION_FRAMES;

    while frames_covered < total_frames {
        let stage_index = stages.len();
        let extra = extra_context_per_stage
            .get(stage_index)
            .copied()
            .unwrap_or(0)
            .max(0);
        let min_context =
            next_valid_frame_count(min_valid_context(DEFAULT_MIN_CONTEXT).saturating_add(extra));

        if min_context >= MAX_GENERATION_FRAMES {
            return Err(PlanError::ContextFillsWindow {
                stage: stage_index,
                context: min_context,
                window: MAX_GENERATION_FRAMES,
            });
        }

        let remaining = total_frames - frames_covered;
        let (generation_length, context_length) =
            if remaining <= MAX_GENERATION_FRAMES - min_context {
                // Final stage: smallest valid window that reaches the end.
                let generation_length = next_valid_frame_count(remaining + min_context);
                (generation_length, generation_length - remaining)
            } else {
                (MAX_GENERATION_FRAMES, min_context)
            };

        stages.push(Stage {
            generation_length,
            context_length,
            start_position: frames_covered,
        });
        frames_covered += generation_length - context_length;
    }

    log::debug!(
        "planned {} stages for {} frames",
        stages.len(),
        total_frames
    );

    Ok(Plan {
        total_frames,
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::frames::{is_valid_frame_count, MAX_VALID_FRAME_COUNT};
    use proptest::prelude::*;

    #[test]
    fn test_full_window_is_single_stage() {
        let plan = plan(81, &[]).unwrap();
        assert_eq!(plan.num_stages(), 1);
        assert_eq!(plan.generation_lengths(), vec![81]);
        assert_eq!(plan.context_lengths(), vec![0]);
        assert_eq!(plan.start_positions(), vec![0]);
        assert_eq!(plan.overshoot(), 0);
    }

    #[test]
    fn test_short_clip_rounds_up() {
        let plan = plan(30, &[]).unwrap();
        assert_eq!(plan.generation_lengths(), vec![33]);
        assert_eq!(plan.overshoot(), 3);
    }

    #[test]
    fn test_three_stage_plan() {
        // 81 + 72 = 153 covered, 39 left: final window is next_valid(39 + 9) = 49.
        let plan = plan(192, &[]).unwrap();
        assert_eq!(plan.num_stages(), 3);
        assert_eq!(plan.generation_lengths(), vec![81, 81, 49]);
        assert_eq!(plan.context_lengths(), vec![0, 9, 10]);
        assert_eq!(plan.start_positions(), vec![0, 81, 153]);
        assert_eq!(plan.frames_covered(), 192);
    }

    #[test]
    fn test_just_over_one_window() {
        let plan = plan(82, &[]).unwrap();
        assert_eq!(plan.generation_lengths(), vec![81, 13]);
        assert_eq!(plan.context_lengths(), vec![0, 12]);
        assert_eq!(plan.start_positions(), vec![0, 81]);
    }

    #[test]
    fn test_extra_context_applies_per_stage() {
        // Stage 1 asks for 4 extra frames: 9 + 4 = 13 context.
        let widened = plan(192, &[0, 4]).unwrap();
        assert_eq!(widened.context_lengths()[1], 13);
        assert_eq!(widened.start_positions()[2], 81 + 68);

        // Uneven extras round the context up to the next valid count.
        let rounded = plan(192, &[0, 2]).unwrap();
        assert_eq!(rounded.context_lengths()[1], 13);
    }

    #[test]
    fn test_negative_extra_context_is_ignored() {
        assert_eq!(plan(192, &[0, -20, -3]).unwrap(), plan(192, &[]).unwrap());
    }

    #[test]
    fn test_stage_zero_extra_is_ignored() {
        assert_eq!(plan(192, &[40]).unwrap(), plan(192, &[]).unwrap());
    }

    #[test]
    fn test_invalid_total_frames() {
        assert_eq!(plan(0, &[]), Err(PlanError::InvalidTotalFrames(0)));
        assert_eq!(plan(-4, &[]), Err(PlanError::InvalidTotalFrames(-4)));
    }

    #[test]
    fn test_context_that_fills_window_is_rejected() {
        let err = plan(500, &[0, 72]).unwrap_err();
        assert_eq!(
            err,
            PlanError::ContextFillsWindow {
                stage: 1,
                context: 81,
                window: 81
            }
        );
    }

    #[test]
    fn test_huge_extra_context_is_rejected() {
        let extra = parse_extra_context("0,9223372036854775807");
        assert_eq!(extra, vec![0, i64::MAX]);
        assert_eq!(
            plan(192, &extra),
            Err(PlanError::ContextFillsWindow {
                stage: 1,
                context: MAX_VALID_FRAME_COUNT,
                window: MAX_GENERATION_FRAMES
            })
        );
    }

    #[test]
    fn test_extra_context_parsing() {
        assert_eq!(parse_extra_context("0,0,4"), vec![0, 0, 4]);
        assert_eq!(parse_extra_context(" 1 , , 2 "), vec![1, 2]);
        assert_eq!(parse_extra_context(""), Vec::<i64>::new());
        assert_eq!(parse_extra_context("0,x,4"), Vec::<i64>::new());

        let malformed = ExtraContext::parse("4;4");
        assert!(malformed.is_malformed());
        assert!(malformed.values().is_empty());
    }

    proptest! {
        #[test]
        fn plans_cover_the_timeline(
            total in 1i64..5_000,
            extras in proptest::collection::vec(-10i64..40, 0..12),
        ) {
            let plan = plan(total, &extras).unwrap();
            let stages = plan.stages();

            prop_assert!(plan.frames_covered() >= total);
            prop_assert!(plan.overshoot() < 4);

            let mut expected_start = 0;
            for (i, stage) in stages.iter().enumerate() {
                prop_assert!(is_valid_frame_count(stage.generation_length));
                prop_assert!(stage.generation_length <= MAX_GENERATION_FRAMES);
                prop_assert!(stage.new_frames() > 0);
                if i == 0 {
                    prop_assert_eq!(stage.context_length, 0);
                    prop_assert_eq!(stage.start_position, 0);
                } else {
                    prop_assert!(stage.context_length >= DEFAULT_MIN_CONTEXT);
                    prop_assert_eq!(stage.start_position, expected_start);
                }
                expected_start += stage.new_frames();
            }

            if stages.len() > 1 {
                prop_assert_eq!(plan.frames_covered(), total);
            }
        }
    }
}
