use crate::core::AppError;
use crate::models::works::{DetailsPayload, WorkRecord};

const UNSPECIFIED: &str = "غير محدد";

/// Column headers of the downloadable report, in output order.
pub const EXPORT_HEADERS: [&str; 7] = [
    "العنوان",
    "النوع",
    "التاريخ",
    "النقاط",
    "الباحث",
    "الفرقة",
    "تفاصيل",
];

/// Spreadsheet tools sniff encoding from the BOM; without it the Arabic
/// headers open as mojibake.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Renders an already-scoped (and interactively filtered) row set as a
/// CSV report. An empty set still yields the header row.
pub fn works_to_csv(rows: &[WorkRecord]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new().from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(AppError::internal_error)?;

    for row in rows {
        let details = DetailsPayload::parse(row.details.as_deref()).flatten();
        let activity = row.activity();
        let date = row.publication_date.format("%Y-%m-%d").to_string();
        let points = row.points.to_string();
        writer
            .write_record([
                row.title.as_str(),
                activity.label_ar(),
                date.as_str(),
                points.as_str(),
                row.researcher.as_str(),
                row.team.as_deref().unwrap_or(UNSPECIFIED),
                details.as_str(),
            ])
            .map_err(AppError::internal_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::internal_error(format!("Failed to finish CSV report: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::works::WorkDetails;
    use chrono::NaiveDate;

    fn record(title: &str, team: Option<&str>) -> WorkRecord {
        let details = WorkDetails::ConferenceTalk {
            event: "المؤتمر الدولي للذكاء الاصطناعي".to_string(),
            organizer: None,
            scope: Some("international".to_string()),
            location: Some("تونس".to_string()),
        };
        WorkRecord {
            id: 1,
            user_id: 1,
            title: title.to_string(),
            activity_type: "conference_talk".to_string(),
            classification: Some("international".to_string()),
            publication_date: NaiveDate::from_ymd_opt(2023, 9, 12).unwrap(),
            year: 2023,
            points: 50,
            details: Some(serde_json::to_string(&details).unwrap()),
            researcher: "أحمد بن علي".to_string(),
            team_id: Some(1),
            department_id: Some(1),
            team: team.map(|t| t.to_string()),
            department: Some("قسم الإعلام الآلي".to_string()),
        }
    }

    fn parse_csv(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let body = bytes.strip_prefix(UTF8_BOM).expect("report must carry a BOM");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(body);
        reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn report_starts_with_a_utf8_bom() {
        let bytes = works_to_csv(&[]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn empty_set_still_produces_the_header_row() {
        let bytes = works_to_csv(&[]).unwrap();
        let lines = parse_csv(bytes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], EXPORT_HEADERS.to_vec());
    }

    #[test]
    fn rows_carry_arabic_labels_and_flattened_details() {
        let bytes = works_to_csv(&[record("مداخلة حول التعلم العميق", Some("فرقة الأنظمة الذكية"))])
            .unwrap();
        let lines = parse_csv(bytes);
        assert_eq!(lines.len(), 2);
        let row = &lines[1];
        assert_eq!(row[0], "مداخلة حول التعلم العميق");
        assert_eq!(row[1], "مداخلة في مؤتمر");
        assert_eq!(row[2], "2023-09-12");
        assert_eq!(row[3], "50");
        assert_eq!(row[5], "فرقة الأنظمة الذكية");
        assert!(row[6].contains("المؤتمر:"));
        assert!(row[6].contains(" | "));
    }

    #[test]
    fn missing_team_renders_as_unspecified() {
        let bytes = works_to_csv(&[record("عنوان", None)]).unwrap();
        let lines = parse_csv(bytes);
        assert_eq!(lines[1][5], UNSPECIFIED);
    }
}
