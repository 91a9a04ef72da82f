//! PNG and PDF export of the rendered graph.
//!
//! The scene is redrawn at twice the pixel density into an offscreen canvas,
//! serialized to a PNG data URL and either downloaded directly or placed on an
//! A4 page through jsPDF (`window.jspdf`, loaded by the host page). A failed
//! PDF export falls back to PNG.

use std::fmt;

use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

use crate::components::graph::render;
use crate::components::graph::scale::ScaleConfig;
use crate::components::graph::state::GraphState;
use crate::error::{AppError, Result};

/// Pixel density of exported rasters relative to the live canvas.
pub const EXPORT_SCALE: f64 = 2.0;

/// A4 portrait width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 portrait height in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;
/// Margin around the page in millimetres.
pub const PDF_MARGIN_MM: f64 = 3.0;
/// Space reserved for the header in millimetres.
pub const PDF_HEADER_MM: f64 = 12.0;

/// Output format chosen in the export dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
	/// Raster image.
	Png,
	/// A4 portrait document with a header.
	Pdf,
}

impl ExportFormat {
	/// File extension without the dot.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Png => "png",
			Self::Pdf => "pdf",
		}
	}
}

impl fmt::Display for ExportFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Png => "PNG",
			Self::Pdf => "PDF",
		})
	}
}

/// Outcome of a completed export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
	/// Format of the file actually written.
	pub format: ExportFormat,
	/// Name the download was saved under.
	pub filename: String,
	/// A PDF was requested but failed, so a PNG was written instead.
	pub fell_back: bool,
}

/// Download name for an export started at `iso` (an ISO-8601 timestamp).
///
/// Keeps the timestamp up to whole seconds and swaps `:` for `-`.
pub fn export_filename(iso: &str, format: ExportFormat) -> String {
	let stamp: String = iso.chars().take(19).collect();
	format!("rekno-graph-{}.{}", stamp.replace(':', "-"), format.extension())
}

/// Placement of the graph image on a PDF page, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PdfLayout {
	/// Left edge of the image in millimetres.
	pub x: f64,
	/// Top edge of the image in millimetres.
	pub y: f64,
	/// Image width in millimetres.
	pub width: f64,
	/// Image height in millimetres.
	pub height: f64,
}

impl PdfLayout {
	/// Fit an `img_w` × `img_h` image below the header band.
	///
	/// Width is favoured: the image takes the larger of the width fit and 90%
	/// of the height fit unless that overflows vertically, is enlarged three
	/// times, then shrunk proportionally until it fits the printable area.
	pub fn compute(page_w: f64, page_h: f64, img_w: f64, img_h: f64) -> Self {
		let available_w = page_w - 2.0 * PDF_MARGIN_MM;
		let available_h = page_h - 2.0 * PDF_MARGIN_MM - PDF_HEADER_MM;
		let (img_w, img_h) = (img_w.max(1.0), img_h.max(1.0));

		let width_fit = available_w / img_w;
		let height_fit = available_h / img_h;
		let mut scale = width_fit.max(height_fit * 0.9);
		if img_h * scale > available_h {
			scale = height_fit;
		}
		scale *= 3.0;

		let (mut width, mut height) = (img_w * scale, img_h * scale);
		if width > available_w {
			height *= available_w / width;
			width = available_w;
		}
		if height > available_h {
			width *= available_h / height;
			height = available_h;
		}

		Self {
			x: (page_w - width) / 2.0,
			y: PDF_MARGIN_MM + PDF_HEADER_MM + (available_h - height) / 2.0,
			width,
			height,
		}
	}
}

/// Guards against overlapping exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
	/// Ready for a new export.
	#[default]
	Idle,
	/// An export is running.
	Exporting,
}

impl ExportState {
	/// Enter `Exporting`; `false` when an export is already running.
	pub fn begin(&mut self) -> bool {
		match self {
			Self::Idle => {
				*self = Self::Exporting;
				true
			}
			Self::Exporting => false,
		}
	}

	/// Return to idle.
	pub fn finish(&mut self) {
		*self = Self::Idle;
	}

	/// Whether an export is running.
	pub fn is_exporting(self) -> bool {
		self == Self::Exporting
	}
}

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(js_namespace = jspdf, js_name = jsPDF)]
	type JsPdf;

	#[wasm_bindgen(constructor, catch, js_namespace = jspdf, js_class = "jsPDF")]
	fn new(options: &JsValue) -> std::result::Result<JsPdf, JsValue>;

	#[wasm_bindgen(method, catch, js_name = setFontSize)]
	fn set_font_size(this: &JsPdf, size: f64) -> std::result::Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, js_name = setTextColor)]
	fn set_text_color(this: &JsPdf, r: u8, g: u8, b: u8) -> std::result::Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch)]
	fn text(this: &JsPdf, text: &str, x: f64, y: f64) -> std::result::Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, js_name = addImage)]
	fn add_image(
		this: &JsPdf,
		data: &str,
		format: &str,
		x: f64,
		y: f64,
		w: f64,
		h: f64,
	) -> std::result::Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch)]
	fn save(this: &JsPdf, filename: &str) -> std::result::Result<JsValue, JsValue>;
}

/// Export the live scene, falling back to PNG when the PDF path fails.
pub fn export_scene(state: &GraphState, scale: &ScaleConfig, format: ExportFormat) -> Result<ExportReport> {
	let data_url = rasterize(state, scale)?;
	let iso = String::from(js_sys::Date::new_0().to_iso_string());

	if format == ExportFormat::Pdf {
		let filename = export_filename(&iso, ExportFormat::Pdf);
		match write_pdf(&data_url, state.width, state.height, &filename) {
			Ok(()) => {
				info!("rekno: exported {filename}");
				return Ok(ExportReport {
					format,
					filename,
					fell_back: false,
				});
			}
			Err(e) => error!("rekno: PDF export failed: {e}"),
		}
	}

	let filename = export_filename(&iso, ExportFormat::Png);
	download(&data_url, &filename)?;
	info!("rekno: exported {filename}");
	Ok(ExportReport {
		format: ExportFormat::Png,
		filename,
		fell_back: format == ExportFormat::Pdf,
	})
}

/// Redraw the scene at [`EXPORT_SCALE`] and return it as a PNG data URL.
fn rasterize(state: &GraphState, scale: &ScaleConfig) -> Result<String> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(AppError::MissingElement("document"))?;
	let canvas: HtmlCanvasElement = document
		.create_element("canvas")
		.map_err(AppError::export)?
		.dyn_into()
		.map_err(|_| AppError::MissingElement("canvas"))?;
	canvas.set_width((state.width * EXPORT_SCALE) as u32);
	canvas.set_height((state.height * EXPORT_SCALE) as u32);

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(AppError::export)?
		.ok_or(AppError::MissingElement("2d context"))?
		.dyn_into()
		.map_err(|_| AppError::MissingElement("2d context"))?;
	ctx.scale(EXPORT_SCALE, EXPORT_SCALE)
		.map_err(AppError::export)?;
	render::render_scene(state, &ctx, scale, &render::Emphasis::none());

	canvas
		.to_data_url_with_type("image/png")
		.map_err(AppError::export)
}

fn download(data_url: &str, filename: &str) -> Result<()> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(AppError::MissingElement("document"))?;
	let link: HtmlAnchorElement = document
		.create_element("a")
		.map_err(AppError::export)?
		.dyn_into()
		.map_err(|_| AppError::MissingElement("a"))?;
	link.set_href(data_url);
	link.set_download(filename);
	link.click();
	Ok(())
}

fn write_pdf(data_url: &str, img_w: f64, img_h: f64, filename: &str) -> Result<()> {
	let options = js_sys::Object::new();
	for (key, value) in [("orientation", "portrait"), ("unit", "mm"), ("format", "a4")] {
		js_sys::Reflect::set(&options, &key.into(), &value.into()).map_err(AppError::export)?;
	}
	let pdf = JsPdf::new(&options).map_err(AppError::export)?;
	let layout = PdfLayout::compute(A4_WIDTH_MM, A4_HEIGHT_MM, img_w, img_h);
	let header_y = PDF_MARGIN_MM + 7.0;

	pdf.set_font_size(9.0).map_err(AppError::export)?;
	pdf.set_text_color(60, 60, 60).map_err(AppError::export)?;
	pdf.text("Rekno Graph", PDF_MARGIN_MM, header_y)
		.map_err(AppError::export)?;
	pdf.set_font_size(7.0).map_err(AppError::export)?;
	pdf.set_text_color(120, 120, 120).map_err(AppError::export)?;
	pdf.text(&local_date(), A4_WIDTH_MM - PDF_MARGIN_MM - 25.0, header_y)
		.map_err(AppError::export)?;

	pdf.add_image(data_url, "PNG", layout.x, layout.y, layout.width, layout.height)
		.map_err(AppError::export)?;
	pdf.save(filename).map_err(AppError::export)?;
	Ok(())
}

/// Today's date as `M/D/YYYY` in local time.
fn local_date() -> String {
	let now = js_sys::Date::new_0();
	format!("{}/{}/{}", now.get_month() + 1, now.get_date(), now.get_full_year())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filenames_have_no_colons() {
		let name = export_filename("2025-03-04T05:06:07.891Z", ExportFormat::Png);
		assert_eq!(name, "rekno-graph-2025-03-04T05-06-07.png");
		assert!(!name.contains(':'));
		assert_eq!(
			export_filename("2025-03-04T05:06:07.891Z", ExportFormat::Pdf),
			"rekno-graph-2025-03-04T05-06-07.pdf"
		);
	}

	fn assert_inside(layout: PdfLayout) {
		let eps = 1e-9;
		assert!(layout.x >= PDF_MARGIN_MM - eps, "{layout:?}");
		assert!(layout.x + layout.width <= A4_WIDTH_MM - PDF_MARGIN_MM + eps, "{layout:?}");
		assert!(layout.y >= PDF_MARGIN_MM + PDF_HEADER_MM - eps, "{layout:?}");
		assert!(layout.y + layout.height <= A4_HEIGHT_MM - PDF_MARGIN_MM + eps, "{layout:?}");
		let left = layout.x;
		let right = A4_WIDTH_MM - layout.x - layout.width;
		assert!((left - right).abs() < 1e-9, "not centered: {layout:?}");
	}

	#[test]
	fn pdf_layout_fits_wide_and_tall_images() {
		for (w, h) in [(1600.0, 900.0), (800.0, 2400.0), (100.0, 100.0), (3000.0, 200.0)] {
			assert_inside(PdfLayout::compute(A4_WIDTH_MM, A4_HEIGHT_MM, w, h));
		}
	}

	#[test]
	fn pdf_layout_keeps_aspect_ratio() {
		let layout = PdfLayout::compute(A4_WIDTH_MM, A4_HEIGHT_MM, 1600.0, 900.0);
		assert!((layout.width / layout.height - 1600.0 / 900.0).abs() < 1e-9);
		// A landscape image spans the full printable width.
		assert!((layout.width - (A4_WIDTH_MM - 2.0 * PDF_MARGIN_MM)).abs() < 1e-9);
	}

	#[test]
	fn overlapping_exports_are_refused() {
		let mut state = ExportState::default();
		assert!(state.begin());
		assert!(state.is_exporting());
		assert!(!state.begin());
		state.finish();
		assert!(state.begin());
	}
}
