use std::sync::Arc;
use std::time::Duration;

use font8x8::UnicodeFonts;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use product_inspect_adapters::{classification_color, SharedOverlay};
use product_inspect_application::{
    ApplicationService, DashboardQuery, ExportReportCommand, InspectionMetricsQuery,
    InspectionStatusQuery, ListProductsQuery, PollInspectionCommand, RecentDetectionsQuery,
    ReportPreviewQuery, StartInspectionCommand, StopInspectionCommand,
};
use product_inspect_domain::{
    DashboardSummary, Detection, Frame, ReportFormat, ReportTable, TickMetrics,
};

use crate::config::AppConfig;

const WINDOW_WIDTH: usize = 1120;
const WINDOW_HEIGHT: usize = 700;
const SIDEBAR_WIDTH: usize = 210;
const HEADER_HEIGHT: usize = 56;
const CONTENT_MARGIN: usize = 24;
const LINE_HEIGHT: usize = 14;
const GLYPH_WIDTH: usize = 8;
const LOG_LINES: usize = 12;

const BACKGROUND: u32 = 0xF3F5F8;
const SIDEBAR: u32 = 0x1B2430;
const SIDEBAR_ACTIVE: u32 = 0x2F6FDE;
const PANEL: u32 = 0xFFFFFF;
const PANEL_BORDER: u32 = 0xD3D9E2;
const TEXT: u32 = 0x1B1F26;
const MUTED_TEXT: u32 = 0x6B7684;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Dashboard,
    Live,
    Products,
    Reports,
    Settings,
}

impl View {
    const ALL: [View; 5] = [
        View::Dashboard,
        View::Live,
        View::Products,
        View::Reports,
        View::Settings,
    ];

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Key1 => Some(Self::Dashboard),
            Key::Key2 => Some(Self::Live),
            Key::Key3 => Some(Self::Products),
            Key::Key4 => Some(Self::Reports),
            Key::Key5 => Some(Self::Settings),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Live => "Live Inspection",
            Self::Products => "Products Setup",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
        }
    }
}

struct ViewState {
    view: View,
    notice: Option<String>,
    report_preview: Option<ReportTable>,
}

impl ViewState {
    fn switch_to(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.report_preview = None;
        }
    }
}

pub fn launch_window(
    service: &mut ApplicationService,
    overlay: Arc<SharedOverlay>,
    config: &AppConfig,
) -> Result<(), String> {
    let width = WINDOW_WIDTH;
    let height = WINDOW_HEIGHT;
    let mut window = Window::new("product-inspect", width, height, WindowOptions::default())
        .map_err(|error| format!("failed to start UI window: {error}"))?;
    window.limit_update_rate(Some(Duration::from_micros(16_000)));

    let mut buffer = vec![BACKGROUND; width * height];
    let mut state = ViewState {
        view: View::Dashboard,
        notice: None,
        report_preview: None,
    };

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for key in window.get_keys_pressed(KeyRepeat::No) {
            if let Some(view) = View::from_key(key) {
                state.switch_to(view);
            }
        }
        overlay.set_attached(state.view == View::Live);

        if state.view == View::Live && window.is_key_pressed(Key::Space, KeyRepeat::No) {
            state.notice = Some(toggle_inspection(service, config));
        }
        if state.view == View::Reports {
            if window.is_key_pressed(Key::X, KeyRepeat::No) {
                state.notice = Some(export(service, config, ReportFormat::Spreadsheet));
            }
            if window.is_key_pressed(Key::P, KeyRepeat::No) {
                state.notice = Some(export(service, config, ReportFormat::Pdf));
            }
            if state.report_preview.is_none() {
                state.report_preview = Some(service.report_preview(ReportPreviewQuery));
            }
        }

        if let Err(error) = service.poll_inspection(PollInspectionCommand) {
            state.notice = Some(format!("saving detections failed: {error}"));
        }
        let active = service.inspection_status(InspectionStatusQuery).active;
        let summary = service.dashboard(DashboardQuery);

        buffer.fill(BACKGROUND);
        draw_sidebar(&mut buffer, width, height, state.view);
        draw_header(&mut buffer, width, state.view, active);
        match state.view {
            View::Dashboard => draw_dashboard(&mut buffer, width, &summary),
            View::Live => {
                let recent = service.recent_detections(RecentDetectionsQuery { limit: LOG_LINES });
                draw_live(&mut buffer, width, overlay.latest().as_ref(), &recent, &summary, active);
            }
            View::Products => draw_products(&mut buffer, width, service),
            View::Reports => {
                if let Some(table) = &state.report_preview {
                    draw_reports(&mut buffer, width, table);
                }
            }
            View::Settings => draw_settings(&mut buffer, width, config),
        }
        if let Some(notice) = &state.notice {
            draw_text(
                &mut buffer,
                width,
                SIDEBAR_WIDTH + CONTENT_MARGIN,
                height - CONTENT_MARGIN,
                &fit_text(notice, width - SIDEBAR_WIDTH - CONTENT_MARGIN * 2),
                MUTED_TEXT,
            );
        }

        let metrics = service
            .inspection_metrics(InspectionMetricsQuery)
            .unwrap_or_default();
        window.set_title(&build_window_title(state.view, active, &summary, &metrics));
        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|error| format!("failed to update UI window: {error}"))?;
    }

    overlay.set_attached(false);
    if service.inspection_status(InspectionStatusQuery).active {
        service
            .stop_inspection(StopInspectionCommand)
            .map_err(|error| format!("stopping inspection failed: {error}"))?;
    }
    Ok(())
}

fn toggle_inspection(service: &mut ApplicationService, config: &AppConfig) -> String {
    if service.inspection_status(InspectionStatusQuery).active {
        return match service.stop_inspection(StopInspectionCommand) {
            Ok(_) => "Inspection stopped".to_string(),
            Err(error) => format!("stopping inspection failed: {error}"),
        };
    }
    match service.start_inspection(StartInspectionCommand {
        request: config.capture,
    }) {
        Ok(_) => format!("Inspecting {}", config.frame_source.describe()),
        Err(error) => error.to_string(),
    }
}

fn export(service: &ApplicationService, config: &AppConfig, format: ReportFormat) -> String {
    match service.export_report(ExportReportCommand {
        format,
        out_dir: config.report_dir.clone(),
    }) {
        Ok(path) => format!("Report saved to {}", path.display()),
        Err(error) => error.to_string(),
    }
}

fn draw_sidebar(buffer: &mut [u32], width: usize, height: usize, current: View) {
    fill_rect(buffer, width, 0, 0, SIDEBAR_WIDTH, height, SIDEBAR);
    draw_text(buffer, width, 20, 24, "ProductInspect AI", 0xFFFFFF);
    for (index, view) in View::ALL.iter().enumerate() {
        let top = HEADER_HEIGHT + 20 + index * 36;
        if *view == current {
            fill_rect(buffer, width, 8, top, SIDEBAR_WIDTH - 16, 28, SIDEBAR_ACTIVE);
        }
        let label = format!("{}  {}", index + 1, view.label());
        draw_text(buffer, width, 20, top + 10, &label, 0xFFFFFF);
    }
    draw_text(buffer, width, 20, height - 28, "Esc quits", lighten_color(SIDEBAR, 90));
}

fn draw_header(buffer: &mut [u32], width: usize, view: View, active: bool) {
    let left = SIDEBAR_WIDTH;
    fill_rect(buffer, width, left, 0, width - left, HEADER_HEIGHT, PANEL);
    fill_rect(buffer, width, left, HEADER_HEIGHT - 1, width - left, 1, PANEL_BORDER);
    draw_text_scaled(buffer, width, left + CONTENT_MARGIN, 20, view.label(), TEXT, 2);

    let (badge, color) = if active {
        ("INSPECTING", 0x00C853)
    } else {
        ("IDLE", 0x9AA5B1)
    };
    let badge_width = badge.len() * GLYPH_WIDTH + 20;
    let badge_left = width - CONTENT_MARGIN - badge_width;
    fill_rect(buffer, width, badge_left, 16, badge_width, 24, color);
    draw_text(buffer, width, badge_left + 10, 24, badge, 0xFFFFFF);
}

/// Label and value of each dashboard stat card.
fn stat_cards(summary: &DashboardSummary) -> [(&'static str, String, u32); 4] {
    [
        ("Total Inspected", summary.total.to_string(), 0x2F6FDE),
        ("Pass Rate", format!("{}%", summary.pass_rate_percent), 0x00A152),
        ("Defect Rate", format!("{}%", summary.defect_rate_percent), 0xD50000),
        ("Speed", format!("{}ms", summary.speed_ms), 0xF7AE3D),
    ]
}

fn draw_dashboard(buffer: &mut [u32], width: usize, summary: &DashboardSummary) {
    let left = SIDEBAR_WIDTH + CONTENT_MARGIN;
    let top = HEADER_HEIGHT + CONTENT_MARGIN;
    let card_width = (width - left - CONTENT_MARGIN - 3 * 16) / 4;
    for (index, (label, value, accent)) in stat_cards(summary).iter().enumerate() {
        let card_left = left + index * (card_width + 16);
        draw_panel(buffer, width, card_left, top, card_width, 110);
        fill_rect(buffer, width, card_left, top, 4, 110, *accent);
        draw_text(buffer, width, card_left + 18, top + 20, label, MUTED_TEXT);
        draw_text_scaled(buffer, width, card_left + 18, top + 48, value, TEXT, 3);
    }

    let lines = [
        format!("Good products: {}", summary.good),
        format!("Defective products: {}", summary.bad),
        format!(
            "Recent detections: {} ({} good, {} defective)",
            summary.recent_detections, summary.recent_good, summary.recent_bad
        ),
    ];
    let panel_top = top + 140;
    draw_panel(buffer, width, left, panel_top, width - left - CONTENT_MARGIN, 110);
    for (index, line) in lines.iter().enumerate() {
        draw_text(buffer, width, left + 18, panel_top + 22 + index * 24, line, TEXT);
    }
}

fn draw_live(
    buffer: &mut [u32],
    width: usize,
    frame: Option<&Frame>,
    recent: &[Detection],
    summary: &DashboardSummary,
    active: bool,
) {
    let left = SIDEBAR_WIDTH + CONTENT_MARGIN;
    let top = HEADER_HEIGHT + CONTENT_MARGIN;
    let feed_width = 640;
    let feed_height = 480;
    draw_panel(buffer, width, left, top, feed_width + 2, feed_height + 2);
    match frame {
        Some(frame) => blit_frame(buffer, width, frame, left + 1, top + 1, feed_width, feed_height),
        None => {
            let hint = if active {
                "Waiting for camera..."
            } else {
                "Press Space to start inspection"
            };
            let hint_left = left + (feed_width - hint.len() * GLYPH_WIDTH) / 2;
            draw_text(buffer, width, hint_left, top + feed_height / 2, hint, MUTED_TEXT);
        }
    }

    let log_left = left + feed_width + CONTENT_MARGIN;
    let log_width = width - log_left - CONTENT_MARGIN;
    draw_panel(buffer, width, log_left, top, log_width, feed_height + 2);
    draw_text(buffer, width, log_left + 12, top + 14, "Detection Log", TEXT);
    if recent.is_empty() {
        draw_text(buffer, width, log_left + 12, top + 40, "No products detected yet", MUTED_TEXT);
    }
    for (index, detection) in recent.iter().enumerate() {
        let row_top = top + 40 + index * (LINE_HEIGHT + 8);
        let color = classification_color(detection.classification);
        fill_rect(buffer, width, log_left + 12, row_top, 8, 8, color);
        let line = format!(
            "#{} {} {:.0}%",
            detection.id,
            detection.classification.as_str(),
            detection.confidence * 100.0
        );
        draw_text(buffer, width, log_left + 28, row_top, &fit_text(&line, log_width - 40), TEXT);
    }

    let summary_top = top + feed_height + 20;
    let line = format!(
        "Detection summary: {} recent, {} good, {} defective | Space {} inspection",
        summary.recent_detections,
        summary.recent_good,
        summary.recent_bad,
        if active { "stops" } else { "starts" }
    );
    draw_text(buffer, width, left, summary_top, &line, TEXT);
}

fn draw_products(buffer: &mut [u32], width: usize, service: &ApplicationService) {
    let left = SIDEBAR_WIDTH + CONTENT_MARGIN;
    let top = HEADER_HEIGHT + CONTENT_MARGIN;
    let panel_width = width - left - CONTENT_MARGIN;
    let products = service.list_products(ListProductsQuery);
    let company = service.company();

    draw_panel(buffer, width, left, top, panel_width, 360);
    draw_text(buffer, width, left + 18, top + 18, &company.name, TEXT);
    draw_text(buffer, width, left + 18, top + 44, "ID  Name                Type          Criteria", MUTED_TEXT);
    if products.is_empty() {
        draw_text(buffer, width, left + 18, top + 68, "No products configured", MUTED_TEXT);
    }
    for (index, product) in products.iter().enumerate() {
        let line = format!(
            "{:<3} {:<19} {:<13} {}",
            product.id.get(),
            product.name,
            product.product_type,
            product.criteria
        );
        draw_text(
            buffer,
            width,
            left + 18,
            top + 68 + index * (LINE_HEIGHT + 6),
            &fit_text(&line, panel_width - 36),
            TEXT,
        );
    }

    let samples_top = top + 384;
    draw_panel(buffer, width, left, samples_top, panel_width, 90);
    draw_text(buffer, width, left + 18, samples_top + 18, "Training samples", TEXT);
    let samples = format!(
        "good: {}   defective: {}   (upload with `product-inspect samples upload`)",
        company.training_samples.good, company.training_samples.defective
    );
    draw_text(buffer, width, left + 18, samples_top + 48, &fit_text(&samples, panel_width - 36), MUTED_TEXT);
}

fn draw_reports(buffer: &mut [u32], width: usize, table: &ReportTable) {
    let left = SIDEBAR_WIDTH + CONTENT_MARGIN;
    let top = HEADER_HEIGHT + CONTENT_MARGIN;
    let panel_width = width - left - CONTENT_MARGIN;

    draw_panel(buffer, width, left, top, panel_width, 90);
    for (index, field) in table.summary.iter().enumerate() {
        let card_left = left + 18 + index * 240;
        draw_text(buffer, width, card_left, top + 20, &field.label, MUTED_TEXT);
        draw_text_scaled(buffer, width, card_left, top + 44, &field.value, TEXT, 2);
    }

    let log_top = top + 110;
    draw_panel(buffer, width, left, log_top, panel_width, 380);
    draw_text(buffer, width, left + 18, log_top + 16, &table.title, TEXT);
    let column_width = (panel_width - 36) / table.columns.len().max(1);
    let header_top = log_top + 40;
    for (column, name) in table.columns.iter().enumerate() {
        let cell_left = left + 18 + column * column_width;
        draw_text(buffer, width, cell_left, header_top, &fit_text(name, column_width - 8), MUTED_TEXT);
    }
    for (row_index, row) in table.rows.iter().enumerate() {
        let row_top = header_top + 24 + row_index * (LINE_HEIGHT + 14);
        for (column, value) in row.iter().enumerate() {
            let cell_left = left + 18 + column * column_width;
            let color = match value.as_str() {
                "Passed" => 0x00A152,
                "Failed" => 0xD50000,
                _ => TEXT,
            };
            draw_text(buffer, width, cell_left, row_top, &fit_text(value, column_width - 8), color);
        }
    }
    draw_text(
        buffer,
        width,
        left,
        log_top + 400,
        "X exports Excel (.xlsx)   P exports PDF",
        MUTED_TEXT,
    );
}

fn draw_settings(buffer: &mut [u32], width: usize, config: &AppConfig) {
    let left = SIDEBAR_WIDTH + CONTENT_MARGIN;
    let top = HEADER_HEIGHT + CONTENT_MARGIN;
    let lines = [
        format!("Snapshot store: {}", config.snapshot_path.display()),
        format!("Report directory: {}", config.report_dir.display()),
        format!("Frame source: {}", config.frame_source.describe()),
        format!(
            "Capture: {}x{} facing {}",
            config.capture.preferred_width,
            config.capture.preferred_height,
            config.capture.facing.as_str()
        ),
        format!("Detection interval: {}ms", config.tick_interval_ms),
    ];
    draw_panel(buffer, width, left, top, width - left - CONTENT_MARGIN, 60 + lines.len() * 26);
    draw_text(buffer, width, left + 18, top + 18, "Read-only configuration", MUTED_TEXT);
    for (index, line) in lines.iter().enumerate() {
        draw_text(buffer, width, left + 18, top + 48 + index * 26, line, TEXT);
    }
}

fn build_window_title(
    view: View,
    active: bool,
    summary: &DashboardSummary,
    metrics: &TickMetrics,
) -> String {
    let last_text = metrics
        .last_tick_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string());
    let p95_text = metrics
        .p95_tick_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "product-inspect | {} | {} | total={} pass={}% | ticks run/idle/skipped={}/{}/{} last={}ms p95={}ms | 1-5 views, esc quit",
        view.label(),
        if active { "inspecting" } else { "idle" },
        summary.total,
        summary.pass_rate_percent,
        metrics.ticks_run,
        metrics.ticks_idle,
        metrics.ticks_skipped,
        last_text,
        p95_text
    )
}

/// Nearest-neighbour copy of `frame` into a `w` x `h` box of the window buffer.
fn blit_frame(
    buffer: &mut [u32],
    width: usize,
    frame: &Frame,
    left: usize,
    top: usize,
    w: usize,
    h: usize,
) {
    let source_width = frame.width() as usize;
    let source_height = frame.height() as usize;
    if source_width == 0 || source_height == 0 {
        return;
    }
    for y in 0..h {
        let source_y = y * source_height / h;
        for x in 0..w {
            let source_x = x * source_width / w;
            let color = frame.pixels()[source_y * source_width + source_x];
            set_pixel(buffer, width, left + x, top + y, color);
        }
    }
}

/// Truncates `text` so it fits in `max_width` pixels of 8px glyphs.
fn fit_text(text: &str, max_width: usize) -> String {
    let max_chars = max_width / GLYPH_WIDTH;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut fitted: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    fitted.push_str("...");
    fitted
}

fn draw_panel(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize) {
    fill_rect(buffer, width, left + 2, top + 2, w, h, darken_color(BACKGROUND, 14));
    fill_rect(buffer, width, left, top, w, h, PANEL);
    draw_rect(buffer, width, left, top, w, h, PANEL_BORDER);
}

fn fill_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    for y in top..top.saturating_add(h) {
        for x in left..left.saturating_add(w) {
            set_pixel(buffer, width, x, y, color);
        }
    }
}

fn draw_rect(buffer: &mut [u32], width: usize, left: usize, top: usize, w: usize, h: usize, color: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let right = left + w - 1;
    let bottom = top + h - 1;
    for x in left..=right {
        set_pixel(buffer, width, x, top, color);
        set_pixel(buffer, width, x, bottom, color);
    }
    for y in top..=bottom {
        set_pixel(buffer, width, left, y, color);
        set_pixel(buffer, width, right, y, color);
    }
}

fn darken_color(color: u32, amount: u8) -> u32 {
    let r = ((color >> 16) & 0xFF).saturating_sub(amount as u32);
    let g = ((color >> 8) & 0xFF).saturating_sub(amount as u32);
    let b = (color & 0xFF).saturating_sub(amount as u32);
    (r << 16) | (g << 8) | b
}

fn lighten_color(color: u32, amount: u8) -> u32 {
    let r = ((color >> 16) & 0xFF).saturating_add(amount as u32).min(255);
    let g = ((color >> 8) & 0xFF).saturating_add(amount as u32).min(255);
    let b = (color & 0xFF).saturating_add(amount as u32).min(255);
    (r << 16) | (g << 8) | b
}

fn set_pixel(buffer: &mut [u32], width: usize, x: usize, y: usize, color: u32) {
    let height = buffer.len() / width;
    if x < width && y < height {
        buffer[y * width + x] = color;
    }
}

fn draw_text(buffer: &mut [u32], width: usize, x: usize, y: usize, text: &str, color: u32) {
    draw_text_scaled(buffer, width, x, y, text, color, 1);
}

fn draw_text_scaled(
    buffer: &mut [u32],
    width: usize,
    x: usize,
    y: usize,
    text: &str,
    color: u32,
    scale: usize,
) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        draw_char(buffer, width, cursor_x, y, ch, color, scale);
        cursor_x = cursor_x.saturating_add(GLYPH_WIDTH * scale);
    }
}

fn draw_char(buffer: &mut [u32], width: usize, x: usize, y: usize, ch: char, color: u32, scale: usize) {
    let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 1 {
                fill_rect(buffer, width, x + col * scale, y + row * scale, scale, scale, color);
            }
        }
    }
}
