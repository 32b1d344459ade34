use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::models::works::WorkRecord;

/// The four summary tiles. Recomputed in full on every view; row volumes
/// are institutional, not web scale.
#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub total_works: usize,
    pub distinct_researchers: usize,
    pub total_points: i64,
    pub top_year: Option<i32>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct YearCount {
    pub year: i32,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TypeCount {
    pub activity_type: String,
    pub label_ar: String,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: i32,
    pub researcher: String,
    pub total_points: i64,
}

pub fn summarize(rows: &[WorkRecord]) -> DashboardSummary {
    let researchers: HashSet<i32> = rows.iter().map(|r| r.user_id).collect();
    let total_points: i64 = rows.iter().map(|r| r.points as i64).sum();

    // modal year; ties go to the most recent one
    let mut per_year: BTreeMap<i32, i64> = BTreeMap::new();
    for row in rows {
        *per_year.entry(row.year).or_insert(0) += 1;
    }
    let top_year = per_year
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
        .map(|(year, _)| *year);

    DashboardSummary {
        total_works: rows.len(),
        distinct_researchers: researchers.len(),
        total_points,
        top_year,
    }
}

pub fn count_by_year(rows: &[WorkRecord]) -> Vec<YearCount> {
    let mut per_year: BTreeMap<i32, i64> = BTreeMap::new();
    for row in rows {
        *per_year.entry(row.year).or_insert(0) += 1;
    }
    per_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

pub fn count_by_type(rows: &[WorkRecord]) -> Vec<TypeCount> {
    let mut per_type: BTreeMap<String, i64> = BTreeMap::new();
    for row in rows {
        *per_type.entry(row.activity_type.clone()).or_insert(0) += 1;
    }
    let mut counts: Vec<TypeCount> = per_type
        .into_iter()
        .map(|(activity_type, count)| TypeCount {
            label_ar: crate::models::works::ActivityType::parse(&activity_type)
                .label_ar()
                .to_string(),
            activity_type,
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.activity_type.cmp(&b.activity_type)));
    counts
}

/// Top researchers by summed points; ties broken by ascending user id so
/// the board is stable across requests.
pub fn leaderboard(rows: &[WorkRecord], limit: usize) -> Vec<LeaderboardEntry> {
    let mut per_user: BTreeMap<i32, (String, i64)> = BTreeMap::new();
    for row in rows {
        let entry = per_user
            .entry(row.user_id)
            .or_insert_with(|| (row.researcher.clone(), 0));
        entry.1 += row.points as i64;
    }
    let mut board: Vec<LeaderboardEntry> = per_user
        .into_iter()
        .map(|(user_id, (researcher, total_points))| LeaderboardEntry {
            user_id,
            researcher,
            total_points,
        })
        .collect();
    board.sort_by(|a, b| b.total_points.cmp(&a.total_points).then(a.user_id.cmp(&b.user_id)));
    board.truncate(limit);
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(user_id: i32, year: i32, points: i32, activity_type: &str) -> WorkRecord {
        WorkRecord {
            id: 0,
            user_id,
            title: "work".to_string(),
            activity_type: activity_type.to_string(),
            classification: None,
            publication_date: NaiveDate::from_ymd_opt(year, 1, 15).unwrap(),
            year,
            points,
            details: None,
            researcher: format!("researcher {}", user_id),
            team_id: Some(1),
            department_id: Some(1),
            team: Some("team".to_string()),
            department: Some("dept".to_string()),
        }
    }

    #[test]
    fn summary_counts_rows_researchers_and_points() {
        let rows = vec![
            record(1, 2022, 100, "journal_article"),
            record(1, 2023, 50, "conference_talk"),
            record(2, 2023, 80, "authored_book"),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.total_works, 3);
        assert_eq!(summary.distinct_researchers, 2);
        assert_eq!(summary.total_points, 230);
        assert_eq!(summary.top_year, Some(2023));
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_works, 0);
        assert_eq!(summary.distinct_researchers, 0);
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.top_year, None);
    }

    #[test]
    fn modal_year_tie_goes_to_the_most_recent() {
        let rows = vec![
            record(1, 2021, 10, "patent"),
            record(1, 2023, 10, "patent"),
        ];
        assert_eq!(summarize(&rows).top_year, Some(2023));
    }

    #[test]
    fn year_series_is_sorted_ascending() {
        let rows = vec![
            record(1, 2023, 10, "patent"),
            record(1, 2021, 10, "patent"),
            record(2, 2023, 10, "patent"),
        ];
        assert_eq!(
            count_by_year(&rows),
            vec![
                YearCount { year: 2021, count: 1 },
                YearCount { year: 2023, count: 2 },
            ]
        );
    }

    #[test]
    fn type_breakdown_sorts_by_count_then_name() {
        let rows = vec![
            record(1, 2023, 10, "patent"),
            record(1, 2023, 10, "journal_article"),
            record(2, 2023, 10, "journal_article"),
        ];
        let counts = count_by_type(&rows);
        assert_eq!(counts[0].activity_type, "journal_article");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].activity_type, "patent");
    }

    #[test]
    fn leaderboard_ranks_by_points_with_id_tie_break() {
        let rows = vec![
            record(3, 2023, 60, "research_project"),
            record(1, 2023, 40, "book_chapter"),
            record(1, 2023, 20, "thesis_supervision"),
            record(2, 2023, 60, "research_project"),
        ];
        // everyone totals 60, so the board falls back to ascending id
        let board = leaderboard(&rows, 10);
        assert_eq!(board[0].user_id, 1);
        assert_eq!(board[0].total_points, 60);
        assert_eq!(board[1].user_id, 2);
        assert_eq!(board[2].user_id, 3);
    }

    #[test]
    fn leaderboard_respects_the_limit() {
        let rows = vec![
            record(1, 2023, 10, "patent"),
            record(2, 2023, 20, "patent"),
            record(3, 2023, 30, "patent"),
        ];
        let board = leaderboard(&rows, 2);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, 3);
    }
}
