//! Export of a laid-out timeline to PNG or SVG.
//!
//! Raster exports re-flow the layout to the requested width and paint it on a
//! private off-screen target, so the artifact always covers the full width no
//! matter how the screen is scrolled. Vector exports serialize the live scene
//! unchanged.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FIXED_COLUMN_WIDTH_PX;
use crate::error::{Result, TlviewError};
use crate::layout::{GridLayout, LayoutDescriptor};
use crate::render::{RasterCanvas, RenderBackend, Scene, SvgWriter, RASTER_SCALE};

/// Artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG bitmap, supersampled.
    Raster,
    /// SVG markup.
    Vector,
}

impl ExportFormat {
    pub fn filename(self) -> &'static str {
        match self {
            Self::Raster => "timeline.png",
            Self::Vector => "timeline.svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Raster => "image/png",
            Self::Vector => "image/svg+xml",
        }
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub format: ExportFormat,
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    /// Width in logical pixels; device width is this times `scale`.
    pub logical_width: f32,
    pub logical_height: f32,
    pub scale: f32,
}

/// Everything a background export needs, captured at invocation time.
#[derive(Debug, Clone)]
pub enum ExportRequest {
    /// Re-flow the layout to `width` logical px and rasterize it.
    Raster { descriptor: LayoutDescriptor, width: u32 },
    /// Serialize the layout at the live on-screen width, kept exact.
    Vector { descriptor: LayoutDescriptor, width: f32 },
}

impl ExportRequest {
    /// Request for `format` at an integral width.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(format: ExportFormat, descriptor: LayoutDescriptor, width: u32) -> Self {
        match format {
            ExportFormat::Raster => Self::Raster { descriptor, width },
            ExportFormat::Vector => Self::Vector {
                descriptor,
                width: width as f32,
            },
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Raster { .. } => ExportFormat::Raster,
            Self::Vector { .. } => ExportFormat::Vector,
        }
    }

    fn descriptor(&self) -> &LayoutDescriptor {
        match self {
            Self::Raster { descriptor, .. } | Self::Vector { descriptor, .. } => descriptor,
        }
    }
}

/// Produces export artifacts and keeps count of the off-screen targets it has
/// alive.
#[derive(Debug, Clone, Default)]
pub struct ExportRenderer {
    live_targets: Arc<AtomicUsize>,
}

impl ExportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Off-screen targets currently allocated. Zero whenever no export is in
    /// flight.
    pub fn live_targets(&self) -> usize {
        self.live_targets.load(Ordering::SeqCst)
    }

    /// Export a layout.
    ///
    /// For [`ExportFormat::Raster`], `width` is the target logical width; for
    /// [`ExportFormat::Vector`] it is the live on-screen width, which the SVG
    /// preserves exactly. Use [`ExportRenderer::export_scene`] when the live
    /// width is fractional.
    pub fn export(
        &self,
        format: ExportFormat,
        descriptor: &LayoutDescriptor,
        width: u32,
    ) -> Result<Artifact> {
        self.run(&ExportRequest::new(format, descriptor.clone(), width), &|| false)
    }

    /// Serialize an already realized scene to SVG.
    pub fn export_scene(&self, scene: &Scene) -> Result<Artifact> {
        let bytes = write_svg(scene, &|| false)?;
        info!(
            width = scene.width,
            height = scene.height,
            bytes = bytes.len(),
            "Vector export finished"
        );
        Ok(Artifact {
            format: ExportFormat::Vector,
            filename: ExportFormat::Vector.filename(),
            mime_type: ExportFormat::Vector.mime_type(),
            bytes,
            logical_width: scene.width,
            logical_height: scene.height,
            scale: 1.0,
        })
    }

    /// Run an export on a background thread.
    pub fn spawn_export(&self, request: ExportRequest) -> ExportHandle {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let renderer = self.clone();
        let flag = Arc::clone(&cancelled);

        let worker = thread::Builder::new()
            .name("tlview-export".to_string())
            .spawn(move || {
                let result = renderer.run(&request, &|| flag.load(Ordering::SeqCst));
                // The handle may already be gone; nobody is left to tell.
                let _ = tx.send(result);
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Failed to start export thread");
                None
            }
        };
        ExportHandle {
            receiver: rx,
            cancelled,
            worker,
        }
    }

    /// Produce the artifact for `request`. `cancelled` is polled before the
    /// scene is painted and between its nodes.
    fn run(&self, request: &ExportRequest, cancelled: &dyn Fn() -> bool) -> Result<Artifact> {
        let Some(grid) = request.descriptor().as_grid() else {
            return Err(TlviewError::ExportBackendFailure(
                "nothing to export: layout is empty".to_string(),
            ));
        };
        match *request {
            ExportRequest::Raster { width, .. } => self.export_raster(grid, width, cancelled),
            ExportRequest::Vector { width, .. } => {
                let scene = Scene::build(grid, width);
                check_cancelled(cancelled)?;
                let bytes = write_svg(&scene, cancelled)?;
                info!(width = scene.width, bytes = bytes.len(), "Vector export finished");
                Ok(Artifact {
                    format: ExportFormat::Vector,
                    filename: ExportFormat::Vector.filename(),
                    mime_type: ExportFormat::Vector.mime_type(),
                    bytes,
                    logical_width: scene.width,
                    logical_height: scene.height,
                    scale: 1.0,
                })
            }
        }
    }

    fn export_raster(
        &self,
        grid: &GridLayout,
        width: u32,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Artifact> {
        let target = OffscreenTarget::acquire(self, grid, width)?;
        check_cancelled(cancelled)?;

        let mut canvas = RasterCanvas::new(
            target.scene.width,
            target.scene.height,
            RASTER_SCALE,
            target.scene.background,
        )?;
        paint(&target.scene, &mut canvas, cancelled)?;
        let (device_w, device_h) = (canvas.width(), canvas.height());
        let bytes = canvas.encode_png()?;
        info!(
            width,
            device_width = device_w,
            device_height = device_h,
            bytes = bytes.len(),
            "Raster export finished"
        );
        Ok(Artifact {
            format: ExportFormat::Raster,
            filename: ExportFormat::Raster.filename(),
            mime_type: ExportFormat::Raster.mime_type(),
            bytes,
            logical_width: target.scene.width,
            logical_height: target.scene.height,
            scale: RASTER_SCALE,
        })
    }
}

fn check_cancelled(cancelled: &dyn Fn() -> bool) -> Result<()> {
    if cancelled() {
        return Err(TlviewError::ExportCancelled);
    }
    Ok(())
}

fn paint(
    scene: &Scene,
    backend: &mut dyn RenderBackend,
    cancelled: &dyn Fn() -> bool,
) -> Result<()> {
    if scene.paint(backend, || !cancelled()) {
        Ok(())
    } else {
        Err(TlviewError::ExportCancelled)
    }
}

fn write_svg(scene: &Scene, cancelled: &dyn Fn() -> bool) -> Result<Vec<u8>> {
    let mut writer = SvgWriter::new(scene.width, scene.height, scene.background);
    paint(scene, &mut writer, cancelled)?;
    Ok(writer.into_markup().into_bytes())
}

/// A detached, unclipped scene sized to the export width. Released when
/// dropped, on every exit path.
struct OffscreenTarget {
    scene: Scene,
    live: Arc<AtomicUsize>,
}

impl OffscreenTarget {
    fn acquire(renderer: &ExportRenderer, grid: &GridLayout, width: u32) -> Result<Self> {
        if width < FIXED_COLUMN_WIDTH_PX {
            return Err(TlviewError::ExportBackendFailure(format!(
                "export width {width} px is narrower than the {FIXED_COLUMN_WIDTH_PX} px label column"
            )));
        }
        let grid = grid.with_width(width)?;
        #[allow(clippy::cast_precision_loss)]
        let scene = Scene::build(&grid, width as f32);
        let live = Arc::clone(&renderer.live_targets);
        let count = live.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(width, height = scene.height, live = count, "Acquired offscreen target");
        Ok(Self { scene, live })
    }
}

impl Drop for OffscreenTarget {
    fn drop(&mut self) {
        let remaining = self.live.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(live = remaining, "Released offscreen target");
    }
}

/// Handle to an export running in the background.
pub struct ExportHandle {
    receiver: mpsc::Receiver<Result<Artifact>>,
    cancelled: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ExportHandle {
    /// Ask the export to stop. An export that already finished is unaffected.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// The result, if the export has finished.
    pub fn try_result(&self) -> Option<Result<Artifact>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Block until the export finishes.
    pub fn wait(mut self) -> Result<Artifact> {
        let result = self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()));
        if let Some(worker) = self.worker.take() {
            // The worker has sent (or dropped) its result and is exiting.
            let _ = worker.join();
        }
        result
    }
}

fn worker_lost() -> TlviewError {
    TlviewError::ExportBackendFailure("export worker exited without a result".to_string())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::color::FeatureColorMap;
    use crate::config::LayoutConfig;
    use crate::layout::layout;
    use crate::types::{CellValue, Matrix};

    fn descriptor(steps: usize) -> LayoutDescriptor {
        let mut row: Vec<CellValue> = vec!["Duration".into()];
        row.extend((0..steps).map(|i| CellValue::Number(i as f64 * 10.0)));
        let m = Matrix::from_rows(vec![row, vec!["Temperature".into()]]);
        let config = LayoutConfig::default().with_export_width(800).unwrap();
        layout(&m, &config, &FeatureColorMap::default())
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Raster.filename(), "timeline.png");
        assert_eq!(ExportFormat::Raster.mime_type(), "image/png");
        assert_eq!(ExportFormat::Vector.filename(), "timeline.svg");
        assert_eq!(ExportFormat::Vector.mime_type(), "image/svg+xml");
    }

    #[test]
    fn test_raster_uses_target_width() {
        let renderer = ExportRenderer::new();
        let artifact = renderer
            .export(ExportFormat::Raster, &descriptor(4), 1000)
            .unwrap();
        assert_eq!(artifact.logical_width, 1000.0);
        assert_eq!(artifact.logical_height, 128.0);
        let img = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (2000, 256));
        assert_eq!(renderer.live_targets(), 0);
    }

    #[test]
    fn test_empty_layout_fails() {
        let renderer = ExportRenderer::new();
        let empty = layout(&Matrix::default(), &LayoutConfig::default(), &FeatureColorMap::default());
        let err = renderer.export(ExportFormat::Raster, &empty, 1000).unwrap_err();
        assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
    }

    #[test]
    fn test_oversized_raster_releases_target() {
        let renderer = ExportRenderer::new();
        let err = renderer
            .export(ExportFormat::Raster, &descriptor(4), 20_000)
            .unwrap_err();
        assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
        assert_eq!(renderer.live_targets(), 0);
    }

    #[test]
    fn test_raster_narrower_than_label_column() {
        let renderer = ExportRenderer::new();
        let err = renderer
            .export(ExportFormat::Raster, &descriptor(4), 100)
            .unwrap_err();
        assert!(matches!(err, TlviewError::ExportBackendFailure(_)));
        assert_eq!(renderer.live_targets(), 0);

        let artifact = renderer
            .export(ExportFormat::Raster, &descriptor(4), 160)
            .unwrap();
        assert_eq!(artifact.logical_width, 160.0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let renderer = ExportRenderer::new();
        let request = ExportRequest::new(ExportFormat::Raster, descriptor(4), 1000);
        let err = renderer.run(&request, &|| true).unwrap_err();
        assert!(matches!(err, TlviewError::ExportCancelled));
        assert_eq!(renderer.live_targets(), 0);
    }

    #[test]
    fn test_raster_cancelled_while_painting() {
        let renderer = ExportRenderer::new();
        let request = ExportRequest::new(ExportFormat::Raster, descriptor(4), 1000);
        let polls = Cell::new(0);
        let cancel_on_third = || {
            assert_eq!(renderer.live_targets(), 1);
            polls.set(polls.get() + 1);
            polls.get() >= 3
        };
        let err = renderer.run(&request, &cancel_on_third).unwrap_err();
        assert!(matches!(err, TlviewError::ExportCancelled));
        assert_eq!(polls.get(), 3);
        assert_eq!(renderer.live_targets(), 0);
    }

    #[test]
    fn test_vector_cancelled_while_painting() {
        let renderer = ExportRenderer::new();
        let request = ExportRequest::new(ExportFormat::Vector, descriptor(4), 1000);
        let polls = Cell::new(0);
        let cancel_on_second = || {
            polls.set(polls.get() + 1);
            polls.get() >= 2
        };
        let err = renderer.run(&request, &cancel_on_second).unwrap_err();
        assert!(matches!(err, TlviewError::ExportCancelled));
        assert_eq!(polls.get(), 2);
    }

    #[test]
    fn test_spawned_export() {
        let renderer = ExportRenderer::new();
        let request = ExportRequest::new(ExportFormat::Vector, descriptor(2), 900);
        assert_eq!(request.format(), ExportFormat::Vector);
        let artifact = renderer.spawn_export(request).wait().unwrap();
        assert_eq!(artifact.logical_width, 900.0);
        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.contains(r#"width="900""#));
    }

    #[test]
    fn test_spawned_vector_keeps_fractional_width() {
        let renderer = ExportRenderer::new();
        let handle = renderer.spawn_export(ExportRequest::Vector {
            descriptor: descriptor(2),
            width: 1000.5,
        });
        let artifact = handle.wait().unwrap();
        assert_eq!(artifact.logical_width, 1000.5);
        let svg = String::from_utf8(artifact.bytes).unwrap();
        assert!(svg.contains(r#"width="1000.5""#));
    }
}
