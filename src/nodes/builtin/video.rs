//! WAN video helper nodes.

use super::{integer_arg, string_arg};
use crate::core::context::ExecutionContext;
use crate::core::error::ExecutionError;
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::port::{ParameterDefinition, PortDefinition, UiHint};
use crate::core::types::{PortType, Value};
use crate::nodes::registry::NodeRegistry;
use crate::planner::{self, ExtraContext};

const DEFAULT_TOTAL_FRAMES: i64 = 192;
const MAX_TOTAL_FRAMES: f64 = 10_000.0;
const DEFAULT_EXTRA_CONTEXT: &str = "0,0,0";

/// Register video nodes.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(|| Box::new(WanOutpaintFrameCalculator));
}

fn integer_list() -> PortType {
    PortType::Array(Box::new(PortType::Integer))
}

/// Splits a clip into WAN sampler stages.
#[derive(Debug, Clone)]
pub struct WanOutpaintFrameCalculator;

impl PluginNode for WanOutpaintFrameCalculator {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder(
            "BadmanWanOutpaintFrameCalculator",
            "Wan Outpaint Frame Calculator",
        )
        .description(
            "Calculates sampler count, generation lengths, context frames and start \
             positions for multi-stage WAN outpainting. Every generation length is \
             a valid 1 + 4k frame count.",
        )
        .category(Category::Video)
        .tags(["wan", "outpaint", "frames"])
        .output(
            PortDefinition::output("num_samplers", PortType::Integer)
                .with_description("Number of sampler stages"),
        )
        .output(
            PortDefinition::output("generation_lengths", integer_list())
                .with_description("Frames generated by each sampler"),
        )
        .output(
            PortDefinition::output("context_frames", integer_list())
                .with_description("Overlap with already generated frames, per sampler"),
        )
        .output(
            PortDefinition::output("start_positions", integer_list())
                .with_description("Source frame where each sampler starts"),
        )
        .parameter(
            ParameterDefinition::new(
                "total_frames",
                PortType::Integer,
                Value::Integer(DEFAULT_TOTAL_FRAMES),
            )
            .with_description("Total frame count of the input video")
            .with_range(1.0, MAX_TOTAL_FRAMES)
            .with_ui_hint(UiHint::SpinBox),
        )
        .parameter(
            ParameterDefinition::new(
                "additional_context_per_sampler",
                PortType::String,
                Value::String(DEFAULT_EXTRA_CONTEXT.to_string()),
            )
            .with_description(
                "Comma-separated extra context frames per sampler (e.g. '0,0,4' adds 4 \
                 to the third sampler). Missing entries count as 0.",
            ),
        )
        .build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let total_frames = integer_arg(ctx, "total_frames")?;
        let extra = match ctx.get_value("additional_context_per_sampler") {
            Ok(_) => ExtraContext::parse(string_arg(ctx, "additional_context_per_sampler")?),
            Err(_) => ExtraContext::parse(DEFAULT_EXTRA_CONTEXT),
        };
        if extra.is_malformed() {
            log::warn!("Ignoring malformed additional context; using no extra context");
        }

        let plan = planner::plan(total_frames, extra.values()).map_err(|source| {
            ExecutionError::Plan {
                node_id: ctx.node_id,
                source,
            }
        })?;

        for (i, stage) in plan.stages().iter().enumerate() {
            log::debug!(
                "sampler {}: generate {} frames, {} context, start {}",
                i + 1,
                stage.generation_length,
                stage.context_length,
                stage.start_position
            );
        }

        ctx.set_output("num_samplers", Value::Integer(plan.num_stages() as i64))?;
        ctx.set_output("generation_lengths", Value::integers(plan.generation_lengths()))?;
        ctx.set_output("context_frames", Value::integers(plan.context_lengths()))?;
        ctx.set_output("start_positions", Value::integers(plan.start_positions()))
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ValidationContext;
    use crate::core::error::{NodeId, PlanError};

    fn run(total: i64, extra: Option<&str>) -> Result<ExecutionContext, ExecutionError> {
        let mut ctx = ExecutionContext::new(NodeId::new());
        ctx.add_parameter("total_frames", Value::Integer(total));
        if let Some(extra) = extra {
            ctx.add_parameter("additional_context_per_sampler", Value::String(extra.to_string()));
        }
        WanOutpaintFrameCalculator.execute(&mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_default_plan_outputs() {
        let ctx = run(192, None).unwrap();
        let outputs = ctx.outputs();
        assert_eq!(outputs["num_samplers"], Value::Integer(3));
        assert_eq!(outputs["generation_lengths"], Value::integers([81, 81, 49]));
        assert_eq!(outputs["context_frames"], Value::integers([0, 9, 10]));
        assert_eq!(outputs["start_positions"], Value::integers([0, 81, 153]));
    }

    #[test]
    fn test_extra_context_string() {
        let ctx = run(192, Some("0,4")).unwrap();
        assert_eq!(
            ctx.outputs()["context_frames"].as_array().unwrap()[1],
            Value::Integer(13)
        );
    }

    #[test]
    fn test_malformed_extra_context_falls_back() {
        let ctx = run(192, Some("zero,4")).unwrap();
        assert_eq!(ctx.outputs()["context_frames"], Value::integers([0, 9, 10]));
    }

    #[test]
    fn test_invalid_total_is_plan_error() {
        let err = run(0, None).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Plan {
                source: PlanError::InvalidTotalFrames(0),
                ..
            }
        ));
    }

    #[test]
    fn test_validation_range() {
        let mut ctx = ValidationContext::new(NodeId::new());
        ctx.add_parameter("total_frames", Value::Integer(20_000));
        assert!(WanOutpaintFrameCalculator.validate(&ctx).is_err());

        ctx.add_parameter("total_frames", Value::Integer(500));
        assert!(WanOutpaintFrameCalculator.validate(&ctx).is_ok());
    }
}
