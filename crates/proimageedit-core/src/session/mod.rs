//! The editing session: one live buffer, its history, and the pending tool
//! parameters.
//!
//! # Control Flow
//!
//! ```text
//! apply_*  ──▶ compute new buffer ──▶ snapshot ──▶ commit ──▶ notify ──▶ persist
//! undo/redo ─▶ decode target entry ─────────────▶ move index ─▶ notify ──▶ persist
//! ```
//!
//! Every operation computes the new buffer and its snapshot before changing
//! any state, so a failure leaves the session exactly as it was.
//!
//! # Example
//!
//! ```ignore
//! use proimageedit_core::{EditSession, EditorConfig, MemorySnapshotStore};
//!
//! let mut session = EditSession::new(EditorConfig::default())
//!     .with_store(MemorySnapshotStore::new());
//! session.load_image(&bytes)?;
//! session.apply_color_op("grayscale")?;
//! session.undo()?;
//! ```

mod error;
mod events;

use web_time::Instant;

use crate::codec::{ImageCodec, StandardCodec};
use crate::config::EditorConfig;
use crate::decode::RasterBuffer;
use crate::encode::{
    export_buffer, ExportOutcome, ExportedFile, ImageFormat, RemoteUploader, UploadRequest,
};
use crate::history::{EditHistory, HistoryPosition, Snapshot};
use crate::params::{ActiveTool, CompressionParameters, ResizeParameters, ResizePreset};
use crate::pixel::ColorOp;
use crate::preview::{PreviewImage, PreviewRequest, PreviewScheduler};
use crate::selection::{
    AspectPreset, CropBounds, CropDrag, CropField, CropRectangle, DisplayMapping, DragHandle,
};
use crate::store::{persist, SnapshotStore, StoreError};
use crate::transform::{crop, scale_to, CropRect, TransformKind};

pub use error::{EditError, EditResult};
pub use events::{SessionEvent, SessionObserver};

/// One open document.
pub struct EditSession {
    config: EditorConfig,
    codec: Box<dyn ImageCodec>,
    store: Option<Box<dyn SnapshotStore>>,
    observers: Vec<Box<dyn SessionObserver>>,

    buffer: Option<RasterBuffer>,
    history: EditHistory<Snapshot>,

    crop: CropRectangle,
    crop_drag: CropDrag,
    resize: ResizeParameters,
    compression: CompressionParameters,
    active_tool: Option<ActiveTool>,

    preview: PreviewScheduler,
    preview_image: Option<PreviewImage>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("dimensions", &self.dimensions())
            .field("history", &self.history.position())
            .field("crop", &self.crop)
            .field("resize", &self.resize)
            .field("compression", &self.compression)
            .field("active_tool", &self.active_tool)
            .field("has_store", &self.store.is_some())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditSession {
    /// A session with the standard codec and no snapshot store.
    pub fn new(config: EditorConfig) -> Self {
        let preview = PreviewScheduler::new(config.preview_delay());
        let compression = CompressionParameters::from_config(&config);
        Self {
            config,
            codec: Box::new(StandardCodec),
            store: None,
            observers: Vec::new(),
            buffer: None,
            history: EditHistory::new(),
            crop: CropRectangle::default(),
            crop_drag: CropDrag::Idle,
            resize: ResizeParameters::default(),
            compression,
            active_tool: None,
            preview,
            preview_image: None,
        }
    }

    pub fn with_codec(mut self, codec: impl ImageCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_image(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&RasterBuffer> {
        self.buffer.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(RasterBuffer::dimensions)
    }

    pub fn history(&self) -> &EditHistory<Snapshot> {
        &self.history
    }

    pub fn history_position(&self) -> HistoryPosition {
        self.history.position()
    }

    pub fn crop(&self) -> &CropRectangle {
        &self.crop
    }

    pub fn crop_drag(&self) -> &CropDrag {
        &self.crop_drag
    }

    pub fn resize_params(&self) -> &ResizeParameters {
        &self.resize
    }

    pub fn compression_params(&self) -> &CompressionParameters {
        &self.compression
    }

    pub fn active_tool(&self) -> Option<ActiveTool> {
        self.active_tool
    }

    /// The latest comparison preview, if one is showing.
    pub fn preview(&self) -> Option<&PreviewImage> {
        self.preview_image.as_ref()
    }

    pub fn preview_scheduler(&self) -> &PreviewScheduler {
        &self.preview
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Decode `bytes` and start a fresh history with it.
    ///
    /// Resets the crop rectangle to the centered default and the resize
    /// parameters to the new dimensions with the aspect lock on.
    ///
    /// # Errors
    ///
    /// [`EditError::Decode`] for malformed input; any previous image stays
    /// loaded.
    pub fn load_image(&mut self, bytes: &[u8]) -> EditResult<(u32, u32)> {
        let buffer = self.codec.decode(bytes)?;
        let snapshot = self.codec.snapshot(&buffer)?;
        let (width, height) = buffer.dimensions();

        self.history.reset(snapshot);
        self.install_image(buffer);
        tracing::debug!(width, height, "image loaded");

        self.publish_buffer();
        self.persist();
        Ok((width, height))
    }

    /// Reload the session saved in the snapshot store.
    ///
    /// Returns `Ok(false)` when there is no store or nothing stored. A stored
    /// history that fails validation is discarded and the stored image
    /// starts a fresh one.
    pub fn restore(&mut self) -> EditResult<bool> {
        let Some(store) = self.store.as_ref() else {
            return Ok(false);
        };
        let stored = match store.load() {
            Ok(stored) => stored,
            Err(StoreError::NotFound) => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        let buffer = self.codec.restore_snapshot(&stored.image)?;
        let mut history = EditHistory::new();
        match stored.history {
            Some(log) => {
                if let Err(err) = history.restore(log.entries, log.index) {
                    tracing::warn!(?err, "stored history is invalid; starting a new one");
                    history.reset(stored.image);
                }
            }
            None => history.reset(stored.image),
        }

        self.history = history;
        self.install_image(buffer);
        tracing::debug!(position = ?self.history.position(), "session restored");

        self.publish_buffer();
        Ok(true)
    }

    /// Discard the image, history, pending parameters and stored session.
    pub fn clear(&mut self) {
        self.buffer = None;
        self.history.clear();
        self.crop = CropRectangle::default();
        self.crop_drag = CropDrag::Idle;
        self.resize = ResizeParameters::default();
        self.compression = CompressionParameters::from_config(&self.config);
        self.active_tool = None;
        self.preview.cancel();
        self.preview_image = None;

        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.clear() {
                tracing::warn!(?err, "failed to clear stored session");
            }
        }
        tracing::debug!("session cleared");
        self.notify(&SessionEvent::Cleared);
    }

    fn install_image(&mut self, buffer: RasterBuffer) {
        let (width, height) = buffer.dimensions();
        self.crop = CropRectangle::for_image(
            width,
            height,
            self.config.crop_default_fraction,
            self.config.min_crop_size,
        );
        self.crop_drag = CropDrag::Idle;
        self.resize = ResizeParameters::for_image(width, height);
        self.buffer = Some(buffer);
        self.refresh_preview(Instant::now());
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    /// Apply a color filter by name (`"grayscale"`, `"sepia"`, ...).
    ///
    /// # Errors
    ///
    /// [`EditError::UnknownOperation`] for an unrecognized name,
    /// [`EditError::NoImage`] without an image.
    pub fn apply_color_op(&mut self, name: &str) -> EditResult<()> {
        let op: ColorOp = name.parse()?;
        self.apply_color(op)
    }

    pub fn apply_color(&mut self, op: ColorOp) -> EditResult<()> {
        let mut next = self.require_buffer()?.clone();
        op.apply(&mut next, &self.config);
        self.commit(next)?;
        tracing::debug!(%op, "color filter applied");
        Ok(())
    }

    /// Apply a rotate/flip by name (`"rotate-clock"`, `"flip-h"`, `"flip-v"`).
    pub fn apply_transform(&mut self, name: &str) -> EditResult<()> {
        let kind: TransformKind = name.parse()?;
        self.apply_transform_kind(kind)
    }

    pub fn apply_transform_kind(&mut self, kind: TransformKind) -> EditResult<()> {
        let next = kind.apply(self.require_buffer()?);
        self.commit(next)?;
        tracing::debug!(%kind, "transform applied");
        Ok(())
    }

    /// Crop to the pending crop rectangle and close the tool.
    ///
    /// # Errors
    ///
    /// [`EditError::Transform`] when the rectangle no longer fits the buffer.
    pub fn apply_crop(&mut self) -> EditResult<()> {
        let rect = self.crop.rect;
        let next = crop(self.require_buffer()?, &rect)?;
        self.commit(next)?;
        self.close_tool();
        tracing::debug!(?rect, "crop applied");
        Ok(())
    }

    /// Resample to the pending resize dimensions and close the tool.
    ///
    /// # Errors
    ///
    /// [`EditError::Transform`] when a target dimension is zero or the target
    /// exceeds [`EditorConfig::max_pixels`].
    pub fn apply_resize(&mut self) -> EditResult<()> {
        let ResizeParameters { width, height, .. } = self.resize;
        let next = scale_to(
            self.require_buffer()?,
            width,
            height,
            self.config.resize_filter,
            self.config.max_pixels,
        )?;
        self.commit(next)?;
        self.close_tool();
        tracing::debug!(width, height, "resize applied");
        Ok(())
    }

    /// Bake the pending compression settings into the buffer and close the
    /// tool.
    pub fn apply_compression(&mut self) -> EditResult<()> {
        let format = self.compression.format;
        let quality = self.compression.quality();
        let next = self.round_trip(format, quality)?.0;
        self.commit(next)?;
        self.close_tool();
        tracing::debug!(%format, quality, "compression applied");
        Ok(())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Step back one edit. Returns `false` at the first entry.
    pub fn undo(&mut self) -> EditResult<bool> {
        let Some(target) = self.history.peek_undo() else {
            return Ok(false);
        };
        let buffer = self.codec.restore_snapshot(target)?;
        self.history.undo();
        self.replace_buffer(buffer);
        Ok(true)
    }

    /// Step forward one edit. Returns `false` at the last entry.
    pub fn redo(&mut self) -> EditResult<bool> {
        let Some(target) = self.history.peek_redo() else {
            return Ok(false);
        };
        let buffer = self.codec.restore_snapshot(target)?;
        self.history.redo();
        self.replace_buffer(buffer);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Encode the current buffer for download.
    ///
    /// Uses the compression settings while the compress tool is open and
    /// lossless PNG otherwise.
    pub fn export(&self) -> EditResult<ExportedFile> {
        let buffer = self.require_buffer()?;
        let (format, quality) = self.export_settings();
        let file = export_buffer(buffer, format, quality)?;
        tracing::debug!(filename = %file.filename, bytes = file.bytes.len(), "exported");
        Ok(file)
    }

    /// Export, then hand the file to `uploader`.
    ///
    /// An upload failure is logged and returned in the outcome; it never
    /// affects the export or the session.
    pub fn export_and_upload(
        &self,
        uploader: &mut dyn RemoteUploader,
        timestamp_ms: u64,
    ) -> EditResult<ExportOutcome> {
        let file = self.export()?;
        let request = UploadRequest::from_export(&file, timestamp_ms);
        let upload = uploader.upload(&request);
        match &upload {
            Ok(url) => tracing::debug!(%url, "export uploaded"),
            Err(err) => tracing::warn!(?err, filename = %request.filename, "upload failed"),
        }
        Ok(ExportOutcome { file, upload })
    }

    /// `(format, quality)` the next export will use.
    pub fn export_settings(&self) -> (ImageFormat, u8) {
        if self.active_tool == Some(ActiveTool::Compress) {
            (self.compression.format, self.compression.quality())
        } else {
            (ImageFormat::Png, 100)
        }
    }

    // ------------------------------------------------------------------
    // Crop parameters
    // ------------------------------------------------------------------

    fn crop_bounds(&self) -> EditResult<CropBounds> {
        let (width, height) = self.dimensions().ok_or(EditError::NoImage)?;
        Ok(CropBounds::new(width, height, self.config.min_crop_size))
    }

    /// Numeric crop input. The result is clamped to the buffer.
    pub fn set_crop_field(&mut self, field: CropField, value: u32) -> EditResult<CropRect> {
        let bounds = self.crop_bounds()?;
        self.crop.set_field(field, value, &bounds);
        Ok(self.crop.rect)
    }

    pub fn apply_crop_preset(&mut self, preset: AspectPreset) -> EditResult<CropRect> {
        let bounds = self.crop_bounds()?;
        self.crop
            .apply_preset(preset, &bounds, self.config.crop_default_fraction);
        Ok(self.crop.rect)
    }

    /// Pointer down on the crop overlay, in display coordinates.
    pub fn begin_crop_drag(
        &mut self,
        mapping: &DisplayMapping,
        display_x: f64,
        display_y: f64,
    ) -> EditResult<Option<DragHandle>> {
        let bounds = self.crop_bounds()?;
        let point = mapping.to_buffer(display_x, display_y);
        let tolerance = mapping.tolerance(self.config.handle_tolerance);
        Ok(self
            .crop_drag
            .begin(point, &self.crop.rect, &bounds, tolerance))
    }

    /// Pointer move while dragging. Returns the updated rectangle, or `None`
    /// when no drag is active.
    pub fn update_crop_drag(
        &mut self,
        mapping: &DisplayMapping,
        display_x: f64,
        display_y: f64,
    ) -> EditResult<Option<CropRect>> {
        let bounds = self.crop_bounds()?;
        let point = mapping.to_buffer(display_x, display_y);
        let rect = self.crop_drag.update(point, &bounds);
        if let Some(rect) = rect {
            self.crop.rect = rect;
        }
        Ok(rect)
    }

    pub fn end_crop_drag(&mut self) -> Option<DragHandle> {
        self.crop_drag.end()
    }

    // ------------------------------------------------------------------
    // Resize parameters
    // ------------------------------------------------------------------

    pub fn set_resize_width(&mut self, width: u32) -> ResizeParameters {
        self.resize.set_width(width);
        self.resize
    }

    pub fn set_resize_height(&mut self, height: u32) -> ResizeParameters {
        self.resize.set_height(height);
        self.resize
    }

    pub fn toggle_resize_lock(&mut self) -> ResizeParameters {
        self.resize.toggle_lock();
        self.resize
    }

    /// Set the resize target to `percent`% of the current buffer.
    pub fn scale_resize_by_percent(&mut self, percent: u32) -> EditResult<ResizeParameters> {
        let (width, height) = self.dimensions().ok_or(EditError::NoImage)?;
        self.resize.scale_by_percent(percent, width, height);
        Ok(self.resize)
    }

    pub fn apply_resize_preset(&mut self, preset: ResizePreset) -> ResizeParameters {
        self.resize.apply_preset(preset);
        self.resize
    }

    // ------------------------------------------------------------------
    // Compression parameters and preview
    // ------------------------------------------------------------------

    pub fn set_compression_quality(&mut self, quality: u32, now: Instant) {
        self.compression.set_quality(quality);
        self.refresh_preview(now);
    }

    pub fn set_compression_format(&mut self, format: ImageFormat, now: Instant) {
        self.compression.format = format;
        self.refresh_preview(now);
    }

    pub fn set_show_comparison(&mut self, show: bool, now: Instant) {
        self.compression.show_comparison = show;
        self.refresh_preview(now);
    }

    pub fn set_active_tool(&mut self, tool: Option<ActiveTool>, now: Instant) {
        self.active_tool = tool;
        self.refresh_preview(now);
    }

    /// Whether a comparison preview should currently be shown.
    pub fn preview_active(&self) -> bool {
        self.active_tool == Some(ActiveTool::Compress)
            && self.compression.show_comparison
            && self.buffer.is_some()
    }

    /// Render the pending preview if its debounce delay has elapsed.
    ///
    /// Returns the new preview when one was rendered this call.
    pub fn poll_preview(&mut self, now: Instant) -> EditResult<Option<&PreviewImage>> {
        let Some(ticket) = self.preview.poll(now) else {
            return Ok(None);
        };
        if !self.preview_active() {
            return Ok(None);
        }

        let PreviewRequest { quality, format } = ticket.request;
        let (buffer, encoded_size) = self.round_trip(format, quality)?;
        if !self.preview.is_current(ticket.generation) {
            tracing::debug!(generation = ticket.generation, "discarding stale preview");
            return Ok(None);
        }

        self.preview_image = Some(PreviewImage {
            generation: ticket.generation,
            request: ticket.request,
            buffer,
            encoded_size,
        });
        self.notify(&SessionEvent::PreviewReady {
            generation: ticket.generation,
            encoded_size,
        });
        Ok(self.preview_image.as_ref())
    }

    /// Reschedule or drop the preview after a parameter change.
    fn refresh_preview(&mut self, now: Instant) {
        if self.preview_active() {
            self.preview.schedule(
                now,
                PreviewRequest {
                    quality: self.compression.quality(),
                    format: self.compression.format,
                },
            );
        } else {
            self.preview.cancel();
            if self.preview_image.take().is_some() {
                self.notify(&SessionEvent::PreviewCleared);
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_buffer(&self) -> EditResult<&RasterBuffer> {
        self.buffer.as_ref().ok_or(EditError::NoImage)
    }

    /// Encode through `format` and decode back, returning the result and the
    /// encoded size.
    fn round_trip(&self, format: ImageFormat, quality: u8) -> EditResult<(RasterBuffer, usize)> {
        let bytes = self
            .codec
            .encode(self.require_buffer()?, format, quality)?;
        let buffer = self.codec.decode(&bytes)?;
        Ok((buffer, bytes.len()))
    }

    /// Snapshot `next`, then make it the live buffer and commit.
    fn commit(&mut self, next: RasterBuffer) -> EditResult<()> {
        let snapshot = self.codec.snapshot(&next)?;
        self.history.commit(snapshot);
        self.replace_buffer(next);
        Ok(())
    }

    fn replace_buffer(&mut self, buffer: RasterBuffer) {
        self.buffer = Some(buffer);
        self.refresh_preview(Instant::now());
        self.publish_buffer();
        self.persist();
    }

    fn close_tool(&mut self) {
        self.active_tool = None;
        self.refresh_preview(Instant::now());
    }

    fn publish_buffer(&mut self) {
        if let Some((width, height)) = self.dimensions() {
            let event = SessionEvent::BufferChanged {
                width,
                height,
                history: self.history.position(),
            };
            self.notify(&event);
        }
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let (Some(image), Some(index)) = (self.history.current(), self.history.index()) else {
            return;
        };
        let outcome = persist(store.as_mut(), image, self.history.entries(), index);
        if let Some(event) = SessionEvent::from_persist(&outcome) {
            self.notify(&event);
        }
    }

    fn notify(&mut self, event: &SessionEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}
