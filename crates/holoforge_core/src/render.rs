//! # Render Sink
//!
//! The seam between the registry and the rendering collaborator. The
//! engine never draws anything; it tells the sink when a color group
//! appears, when its buffer changed, and when it goes away.

use std::collections::HashMap;

use crate::instancing::{GroupMaterial, InstanceGroup};
use crate::palette::Color;

/// Opaque handle to a renderable owned by the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Rendering collaborator interface.
pub trait RenderSink {
    /// Creates a renderable for a new color group.
    fn register_group(&mut self, color: Color, capacity: usize) -> RenderHandle;

    /// Re-uploads a group whose transform buffer changed this frame.
    fn upload_group(&mut self, group: &InstanceGroup);

    /// Destroys a renderable.
    fn release_group(&mut self, handle: RenderHandle);
}

/// What a renderer would hold for a group after its last upload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UploadedGroup {
    /// Palette color of the group.
    pub color: Color,
    /// Fill, opacity and cube extent.
    pub material: GroupMaterial,
    /// Instances to draw.
    pub instances: usize,
}

/// Sink with no GPU behind it. Tracks live handles and upload traffic.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    next_handle: u64,
    live: Vec<RenderHandle>,
    uploaded: HashMap<RenderHandle, UploadedGroup>,
    uploads: u64,
    bytes_uploaded: u64,
}

impl HeadlessSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles registered and not yet released.
    #[must_use]
    pub fn live_handles(&self) -> &[RenderHandle] {
        &self.live
    }

    /// State of a live group as of its last upload.
    #[must_use]
    pub fn uploaded(&self, handle: RenderHandle) -> Option<&UploadedGroup> {
        self.uploaded.get(&handle)
    }

    /// Total group uploads since creation.
    #[must_use]
    pub const fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Total bytes handed over in uploads.
    #[must_use]
    pub const fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }
}

impl RenderSink for HeadlessSink {
    fn register_group(&mut self, _color: Color, _capacity: usize) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.live.push(handle);
        handle
    }

    fn upload_group(&mut self, group: &InstanceGroup) {
        self.uploads += 1;
        self.bytes_uploaded += group.as_bytes().len() as u64;
        self.uploaded.insert(
            group.handle(),
            UploadedGroup {
                color: group.color(),
                material: *group.material(),
                instances: group.count(),
            },
        );
    }

    fn release_group(&mut self, handle: RenderHandle) {
        self.live.retain(|h| *h != handle);
        self.uploaded.remove(&handle);
    }
}
