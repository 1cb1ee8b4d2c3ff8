//! CSV bulk imports for judges and projects.
//!
//! Readers are flexible about record length: trailing optional columns may be
//! omitted, and missing positions read as empty strings.

use csv::StringRecord;

use crate::error::AppError;
use crate::store::{NewJudge, NewProject};

/// Devpost export column positions.
mod devpost {
    pub const TITLE: usize = 0;
    pub const URL: usize = 1;
    pub const STATUS: usize = 2;
    pub const DESCRIPTION: usize = 6;
    pub const TRY_LINK: usize = 7;
    pub const VIDEO_LINK: usize = 8;
    pub const OPT_IN_PRIZES: usize = 9;
}

fn records(data: &[u8], has_header: bool) -> Result<Vec<StringRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut out = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| AppError::Validation(format!("CSV row {}: {e}", line_num + 1)))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        out.push(record);
    }
    Ok(out)
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}

fn required(record: &StringRecord, idx: usize, what: &str, row: usize) -> Result<String, AppError> {
    let value = field(record, idx);
    if value.is_empty() {
        return Err(AppError::Validation(format!("CSV row {row}: {what} is required")));
    }
    Ok(value)
}

/// Split a comma-separated challenge list, dropping empty entries.
pub fn split_challenges(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `name,email,notes`
pub fn parse_judges(data: &[u8], has_header: bool) -> Result<Vec<NewJudge>, AppError> {
    records(data, has_header)?
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(NewJudge {
                name: required(r, 0, "name", i + 1)?,
                email: field(r, 1),
                notes: field(r, 2),
                ..Default::default()
            })
        })
        .collect()
}

/// `name,description,url,try_link?,video_link?,challenge_list?`
pub fn parse_projects(data: &[u8], has_header: bool) -> Result<Vec<NewProject>, AppError> {
    records(data, has_header)?
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(NewProject {
                name: required(r, 0, "name", i + 1)?,
                description: field(r, 1),
                url: field(r, 2),
                try_link: field(r, 3),
                video_link: field(r, 4),
                challenge_list: split_challenges(&field(r, 5)),
            })
        })
        .collect()
}

/// Devpost submission export. The first row is always a header; drafts are skipped.
pub fn parse_devpost(data: &[u8]) -> Result<Vec<NewProject>, AppError> {
    let mut out = Vec::new();
    for (i, r) in records(data, true)?.iter().enumerate() {
        if field(r, devpost::STATUS).eq_ignore_ascii_case("draft") {
            continue;
        }
        out.push(NewProject {
            name: required(r, devpost::TITLE, "title", i + 1)?,
            description: field(r, devpost::DESCRIPTION),
            url: field(r, devpost::URL),
            try_link: field(r, devpost::TRY_LINK),
            video_link: field(r, devpost::VIDEO_LINK),
            challenge_list: split_challenges(&field(r, devpost::OPT_IN_PRIZES)),
        });
    }
    Ok(out)
}
