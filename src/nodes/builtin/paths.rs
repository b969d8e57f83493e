//! Shot folder layout node.

use super::string_arg;
use crate::core::context::ExecutionContext;
use crate::core::error::ExecutionError;
use crate::core::node::{Category, NodeMetadata, PluginNode};
use crate::core::port::{ParameterDefinition, PortDefinition};
use crate::core::types::{PortType, Value};
use crate::nodes::registry::NodeRegistry;
use std::path::{Path, PathBuf};

/// Register path nodes.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(|| Box::new(IoConfigurator));
}

/// Input and output folders of one shot.
///
/// Outputs live under `base/shot/`; extracted inputs live under
/// `base/<kind>/shot/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotPaths {
    pub image_output: PathBuf,
    pub video_output: PathBuf,
    pub image_upres_output: PathBuf,
    pub video_upres_output: PathBuf,
    pub image_input: PathBuf,
    pub depth_input: PathBuf,
    pub pose_input: PathBuf,
    pub body_mask_input: PathBuf,
    pub face_mask_input: PathBuf,
}

impl ShotPaths {
    pub fn new(base: impl AsRef<Path>, shot: &str) -> Self {
        let base = base.as_ref();
        let shot_out = base.join(shot);
        let frames = base.join("ExtractedFrames").join(shot);
        let masks = base.join("Masks").join(shot);

        Self {
            image_output: shot_out.join("Images").join("image"),
            video_output: shot_out.join("Video"),
            image_upres_output: shot_out.join("ImagesUpres").join("image"),
            video_upres_output: shot_out.join("VideoUpres"),
            depth_input: frames.clone(),
            image_input: frames,
            pose_input: base.join("ExtractedPose").join(shot),
            body_mask_input: masks.join("Body"),
            face_mask_input: masks.join("Face"),
        }
    }

    /// Output port name and path, in port order.
    pub fn entries(&self) -> [(&'static str, &Path); 9] {
        [
            ("image_output_path", self.image_output.as_path()),
            ("video_output_path", self.video_output.as_path()),
            ("image_upres_output_path", self.image_upres_output.as_path()),
            ("video_upres_output_path", self.video_upres_output.as_path()),
            ("image_input_path", self.image_input.as_path()),
            ("depth_input_path", self.depth_input.as_path()),
            ("pose_input_path", self.pose_input.as_path()),
            ("body_mask_input_path", self.body_mask_input.as_path()),
            ("face_mask_input_path", self.face_mask_input.as_path()),
        ]
    }
}

/// Builds the conventional folder paths for a shot.
#[derive(Debug, Clone)]
pub struct IoConfigurator;

impl PluginNode for IoConfigurator {
    fn metadata(&self) -> NodeMetadata {
        let mut builder = NodeMetadata::builder("BadmanIO", "IO Config (Badman)")
            .description("Builds the input and output folder paths for a shot")
            .category(Category::Input)
            .parameter(
                ParameterDefinition::new(
                    "base_path",
                    PortType::String,
                    Value::String("output".to_string()),
                )
                .with_description("Project root folder"),
            )
            .parameter(
                ParameterDefinition::new("shot_name", PortType::String, Value::String(String::new()))
                    .with_description("Shot folder name"),
            );

        for (port, _) in ShotPaths::new("", "").entries() {
            builder = builder.output(PortDefinition::output(port, PortType::String));
        }
        builder.build()
    }

    fn execute(&self, ctx: &mut ExecutionContext) -> Result<(), ExecutionError> {
        let paths = ShotPaths::new(string_arg(ctx, "base_path")?, string_arg(ctx, "shot_name")?);

        for (port, path) in paths.entries() {
            ctx.set_output(port, Value::String(path.to_string_lossy().into_owned()))?;
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn PluginNode> {
        Box::new(self.clone())
    }
}
