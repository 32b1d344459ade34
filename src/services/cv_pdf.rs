use ar_reshaper::ArabicReshaper;
use once_cell::sync::Lazy;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfPageIndex,
};
use std::cmp::Reverse;
use std::io::Cursor;
use unicode_bidi::BidiInfo;

use crate::core::config::CvFontConfig;
use crate::core::AppError;
use crate::models::users::{member_type_label_ar, UserProfile};
use crate::models::works::WorkRecord;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const BOTTOM_LIMIT: f32 = 25.0;
const WRAP_COLUMNS: usize = 70;

const UNSPECIFIED: &str = "غير محدد";

const FONT_DOWNLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

static RESHAPER: Lazy<ArabicReshaper> = Lazy::new(ArabicReshaper::default);

/// Loads the Arabic font from disk, downloading it first if it is not
/// there yet. `None` means the CV degrades to the built-in font.
pub async fn ensure_font(config: &CvFontConfig) -> Option<Vec<u8>> {
    if let Ok(bytes) = std::fs::read(&config.path) {
        return Some(bytes);
    }

    tracing::info!("CV font missing at {}, downloading", config.path);
    let client = match reqwest::Client::builder()
        .timeout(FONT_DOWNLOAD_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Could not build font download client: {}", e);
            return None;
        }
    };
    let response = match client.get(&config.download_url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::warn!("Font download returned status {}", response.status());
            return None;
        }
        Err(e) => {
            tracing::warn!("Font download failed: {}", e);
            return None;
        }
    };

    match response.bytes().await {
        Ok(bytes) => {
            let bytes = bytes.to_vec();
            if let Err(e) = std::fs::write(&config.path, &bytes) {
                // keep serving from memory; next request will re-download
                tracing::warn!("Could not persist font to {}: {}", config.path, e);
            }
            Some(bytes)
        }
        Err(e) => {
            tracing::warn!("Font download failed: {}", e);
            None
        }
    }
}

/// Contextual letter-joining plus the bidirectional reordering pass.
/// Text with no Arabic in it comes back unchanged.
pub fn shape_text(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    let reshaped = RESHAPER.reshape(text);
    let bidi = BidiInfo::new(&reshaped, None);
    let mut out = String::with_capacity(reshaped.len());
    for paragraph in &bidi.paragraphs {
        out.push_str(&bidi.reorder_line(paragraph, paragraph.range.clone()));
    }
    out
}

/// CV ordering: by activity type, then year descending inside each type,
/// so one pass can print each group header exactly once.
pub fn ordered_for_cv(rows: &[WorkRecord]) -> Vec<WorkRecord> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| (r.activity(), Reverse(r.year)));
    sorted
}

struct CvWriter {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    y: f32,
}

impl CvWriter {
    fn new(title: &str) -> CvWriter {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        CvWriter {
            doc,
            pages: vec![(page, layer)],
            y: PAGE_HEIGHT - 20.0,
        }
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        self.pages.push((page, layer));
        self.y = PAGE_HEIGHT - 20.0;
    }

    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_LIMIT {
            self.break_page();
        }
    }

    fn line(&mut self, text: &str, size: f32, step: f32, font: &IndirectFontRef) {
        self.ensure_room(step);
        let (page, layer) = *self.pages.last().expect("writer always holds a page");
        self.doc
            .get_page(page)
            .get_layer(layer)
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= step;
    }

    fn wrapped(&mut self, text: &str, size: f32, step: f32, font: &IndirectFontRef) {
        for piece in wrap(text, WRAP_COLUMNS) {
            self.line(&piece, size, step, font);
        }
    }

    /// Page counter in the footer of every page, stamped last so the
    /// total page count is known.
    fn stamp_footers(&mut self, font: &IndirectFontRef) {
        for (number, (page, layer)) in self.pages.iter().enumerate() {
            self.doc.get_page(*page).get_layer(*layer).use_text(
                format!("Page {}", number + 1),
                8.0,
                Mm(PAGE_WIDTH / 2.0 - 5.0),
                Mm(10.0),
                font,
            );
        }
    }

    fn finish(self) -> Result<Vec<u8>, AppError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::internal_error(format!("Failed to render CV: {}", e)))
    }
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// One researcher's full Work history as a paginated, grouped document.
/// Without the Arabic font the output degrades to a built-in-font notice
/// instead of failing the request.
pub fn render_cv(
    profile: &UserProfile,
    rows: &[WorkRecord],
    font_bytes: Option<&[u8]>,
) -> Result<Vec<u8>, AppError> {
    let font_bytes = match font_bytes {
        Some(bytes) => bytes,
        None => return render_fallback(profile),
    };

    let mut writer = CvWriter::new("Academic CV");
    let font = writer
        .doc
        .add_external_font(Cursor::new(font_bytes.to_vec()))
        .map_err(|e| AppError::internal_error(format!("Failed to embed CV font: {}", e)))?;

    let heading = shape_text(&format!("السيرة الذاتية الأكاديمية: {}", profile.full_name));
    writer.line(&heading, 18.0, 12.0, &font);

    let member = member_type_label_ar(&profile.member_type);
    let attachment = profile
        .team
        .as_deref()
        .or(profile.department.as_deref())
        .unwrap_or(UNSPECIFIED);
    writer.line(&shape_text(&format!("الصفة: {}", member)), 11.0, 7.0, &font);
    writer.line(
        &shape_text(&format!("الهيكل: {}", attachment)),
        11.0,
        10.0,
        &font,
    );

    writer.line(
        &shape_text("قائمة الأنشطة والنتاجات العلمية"),
        14.0,
        10.0,
        &font,
    );

    if rows.is_empty() {
        writer.line(
            &shape_text("لا توجد أعمال مسجلة حتى الآن."),
            12.0,
            8.0,
            &font,
        );
    } else {
        let mut current_type: Option<String> = None;
        for row in ordered_for_cv(rows) {
            if current_type.as_deref() != Some(row.activity_type.as_str()) {
                current_type = Some(row.activity_type.clone());
                writer.ensure_room(16.0);
                let header = shape_text(&format!("• {}", row.activity().label_ar()));
                writer.line(&header, 13.0, 9.0, &font);
            }
            let entry = format!("- {} ({})", row.title, row.publication_date.format("%Y-%m-%d"));
            writer.wrapped(&shape_text(&entry), 11.0, 7.0, &font);
        }
    }

    writer.stamp_footers(&font);
    writer.finish()
}

fn render_fallback(profile: &UserProfile) -> Result<Vec<u8>, AppError> {
    let mut writer = CvWriter::new("Academic CV");
    let font = writer
        .doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::internal_error(format!("Failed to load fallback font: {}", e)))?;

    writer.line(
        &format!("Academic CV: {}", profile.username),
        14.0,
        10.0,
        &font,
    );
    writer.line(
        "Arabic font not loaded; full CV rendering is unavailable.",
        11.0,
        7.0,
        &font,
    );
    writer.stamp_footers(&font);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            username: "rbenali".to_string(),
            full_name: "رشيد بن علي".to_string(),
            role: "researcher".to_string(),
            member_type: "permanent".to_string(),
            team_id: Some(1),
            department_id: None,
            team: Some("فرقة الأنظمة الذكية".to_string()),
            department: None,
        }
    }

    fn record(id: i32, activity_type: &str, year: i32) -> WorkRecord {
        WorkRecord {
            id,
            user_id: 1,
            title: format!("عمل {}", id),
            activity_type: activity_type.to_string(),
            classification: None,
            publication_date: NaiveDate::from_ymd_opt(year, 5, 10).unwrap(),
            year,
            points: 10,
            details: None,
            researcher: "رشيد بن علي".to_string(),
            team_id: Some(1),
            department_id: Some(1),
            team: None,
            department: None,
        }
    }

    #[test]
    fn cv_ordering_groups_types_with_years_descending_inside() {
        let rows = vec![
            record(1, "patent", 2020),
            record(2, "book_chapter", 2021),
            record(3, "book_chapter", 2023),
            record(4, "patent", 2022),
        ];
        let ordered = ordered_for_cv(&rows);
        let seen: Vec<(String, i32)> = ordered
            .iter()
            .map(|r| (r.activity_type.clone(), r.year))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("book_chapter".to_string(), 2023),
                ("book_chapter".to_string(), 2021),
                ("patent".to_string(), 2022),
                ("patent".to_string(), 2020),
            ]
        );
    }

    #[test]
    fn shaping_leaves_plain_latin_text_alone() {
        assert_eq!(shape_text("Page 12"), "Page 12");
        assert_eq!(shape_text(""), "");
    }

    #[test]
    fn shaping_rewrites_arabic_into_presentation_forms() {
        let shaped = shape_text("السيرة الذاتية");
        assert_ne!(shaped, "السيرة الذاتية");
        assert!(!shaped.is_empty());
    }

    #[test]
    fn wrap_splits_on_word_boundaries() {
        let lines = wrap("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn missing_font_degrades_to_a_valid_document() {
        let bytes = render_cv(&profile(), &[], None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_history_still_renders_when_a_font_is_missing() {
        let rows: Vec<WorkRecord> = Vec::new();
        let bytes = render_cv(&profile(), &rows, None).unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn unreachable_font_source_degrades_to_none() {
        let config = CvFontConfig {
            path: "/nonexistent/fonts/Amiri-Regular.ttf".to_string(),
            // nothing listens on the discard port, so the request fails fast
            download_url: "http://127.0.0.1:9/Amiri-Regular.ttf".to_string(),
        };
        assert!(ensure_font(&config).await.is_none());
    }
}
