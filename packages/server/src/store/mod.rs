//! Persistence for projects, judges, flags, options and log chunks.
//!
//! `Store` is generic over the connection so the same calls run against the
//! pool or inside a transaction opened by the caller with `db.begin()`. Reads
//! that precede a write of the same row use the `_for_update` variants, which
//! take a row lock held until the transaction ends.

mod convert;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jury_core::{Flag, Judge, JudgeId, Options, Project, ProjectId, SkipReason};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::LockType,
};
use serde::Serialize;
use thiserror::Error;

use crate::entity::{flag, judge, log, options, project};

/// Primary key of the single options row.
pub const OPTIONS_ID: i32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("stored {entity} {id} is corrupt: {detail}")]
    Corrupt {
        entity: &'static str,
        id: i32,
        detail: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields supplied when creating a project. Table placement is decided by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub url: String,
    pub try_link: String,
    pub video_link: String,
    pub challenge_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewJudge {
    pub name: String,
    pub email: String,
    pub notes: String,
    pub track: String,
    pub group: i32,
}

/// Event-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Stats {
    pub projects: u64,
    pub active_projects: u64,
    /// Mean `seen` over active projects.
    pub avg_project_seen: f64,
    pub judges: u64,
    pub active_judges: u64,
    /// Mean number of completed projects over active judges.
    pub avg_judge_seen: f64,
    /// Completed judging events across all judges.
    pub votes: u64,
}

fn mean(total: i64, n: u64) -> f64 {
    if n == 0 { 0.0 } else { total as f64 / n as f64 }
}

pub struct Store<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> Store<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn projects(models: Vec<project::Model>) -> StoreResult<Vec<Project>> {
        models.into_iter().map(Project::try_from).collect()
    }

    fn judges(models: Vec<judge::Model>) -> StoreResult<Vec<Judge>> {
        models.into_iter().map(Judge::try_from).collect()
    }

    // ---- projects -------------------------------------------------------

    pub async fn insert_project(
        &self,
        draft: NewProject,
        group: i32,
        location: i32,
    ) -> StoreResult<Project> {
        let now = Utc::now();
        let model = project::ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            location: Set(location),
            group: Set(group),
            description: Set(draft.description),
            url: Set(draft.url),
            try_link: Set(draft.try_link),
            video_link: Set(draft.video_link),
            challenge_list: Set(serde_json::json!(draft.challenge_list)),
            active: Set(true),
            prioritized: Set(false),
            seen: Set(0),
            track_seen: Set(serde_json::json!({})),
            track_stars: Set(serde_json::json!({})),
            last_activity: Set(now),
            created_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        Project::try_from(model)
    }

    pub async fn find_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        project::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    pub async fn find_project_for_update(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        project::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    pub async fn find_projects(&self) -> StoreResult<Vec<Project>> {
        let models = project::Entity::find()
            .order_by_asc(project::Column::Id)
            .all(self.conn)
            .await?;
        Self::projects(models)
    }

    pub async fn find_active_projects(&self) -> StoreResult<Vec<Project>> {
        let models = project::Entity::find()
            .filter(project::Column::Active.eq(true))
            .order_by_asc(project::Column::Id)
            .all(self.conn)
            .await?;
        Self::projects(models)
    }

    pub async fn count_projects(&self) -> StoreResult<u64> {
        Ok(project::Entity::find().count(self.conn).await?)
    }

    pub async fn update_project(&self, p: &Project) -> StoreResult<()> {
        convert::project_update(p).update(self.conn).await?;
        Ok(())
    }

    /// Returns false if no such project existed.
    pub async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        let result = project::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Add `delta` to the project's seen count as viewed by `track`, floored at zero.
    ///
    /// Returns `None` if the project no longer exists.
    pub async fn adjust_seen(
        &self,
        id: ProjectId,
        track: &str,
        delta: i32,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Project>> {
        let Some(mut p) = self.find_project_for_update(id).await? else {
            return Ok(None);
        };
        if track.is_empty() {
            p.seen = (p.seen + delta).max(0);
        } else {
            let n = p.track_seen.entry(track.to_string()).or_default();
            *n = (*n + delta).max(0);
        }
        p.last_activity = at;
        self.update_project(&p).await?;
        Ok(Some(p))
    }

    // ---- judges ---------------------------------------------------------

    pub async fn insert_judge(&self, draft: NewJudge, code: String) -> StoreResult<Judge> {
        let now = Utc::now();
        let model = judge::ActiveModel {
            id: NotSet,
            name: Set(draft.name),
            email: Set(draft.email),
            notes: Set(draft.notes),
            code: Set(code),
            token: Set(String::new()),
            active: Set(true),
            read_welcome: Set(false),
            track: Set(draft.track),
            group: Set(draft.group),
            current: Set(None),
            seen_projects: Set(serde_json::json!([])),
            rankings: Set(serde_json::json!([])),
            rankings_agg: Set(serde_json::json!({})),
            last_activity: Set(now),
            created_at: Set(now),
        }
        .insert(self.conn)
        .await?;
        Judge::try_from(model)
    }

    pub async fn find_judge(&self, id: JudgeId) -> StoreResult<Option<Judge>> {
        judge::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(Judge::try_from)
            .transpose()
    }

    pub async fn find_judge_for_update(&self, id: JudgeId) -> StoreResult<Option<Judge>> {
        judge::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .map(Judge::try_from)
            .transpose()
    }

    pub async fn find_judge_by_code(&self, code: &str) -> StoreResult<Option<Judge>> {
        judge::Entity::find()
            .filter(judge::Column::Code.eq(code))
            .one(self.conn)
            .await?
            .map(Judge::try_from)
            .transpose()
    }

    pub async fn code_in_use(&self, code: &str) -> StoreResult<bool> {
        let n = judge::Entity::find()
            .filter(judge::Column::Code.eq(code))
            .count(self.conn)
            .await?;
        Ok(n > 0)
    }

    pub async fn find_judges(&self) -> StoreResult<Vec<Judge>> {
        let models = judge::Entity::find()
            .order_by_asc(judge::Column::Id)
            .all(self.conn)
            .await?;
        Self::judges(models)
    }

    /// Judges whose `current` is `project_id`, locked for update.
    pub async fn find_judges_holding_for_update(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<Judge>> {
        let models = judge::Entity::find()
            .filter(judge::Column::Current.eq(project_id))
            .order_by_asc(judge::Column::Id)
            .lock(LockType::Update)
            .all(self.conn)
            .await?;
        Self::judges(models)
    }

    pub async fn update_judge(&self, j: &Judge) -> StoreResult<()> {
        convert::judge_update(j).update(self.conn).await?;
        Ok(())
    }

    /// Returns false if no such judge existed.
    pub async fn delete_judge(&self, id: JudgeId) -> StoreResult<bool> {
        let result = judge::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Projects that are some judge's `current`, other than `except`'s.
    pub async fn find_busy_projects(&self, except: JudgeId) -> StoreResult<HashSet<ProjectId>> {
        let ids: Vec<Option<i32>> = judge::Entity::find()
            .select_only()
            .column(judge::Column::Current)
            .filter(judge::Column::Current.is_not_null())
            .filter(judge::Column::Id.ne(except))
            .into_tuple()
            .all(self.conn)
            .await?;
        Ok(ids.into_iter().flatten().collect())
    }

    // ---- flags ----------------------------------------------------------

    pub async fn insert_flag(
        &self,
        judge_id: JudgeId,
        project_id: ProjectId,
        reason: SkipReason,
        time: DateTime<Utc>,
    ) -> StoreResult<Flag> {
        let model = flag::ActiveModel {
            id: NotSet,
            judge_id: Set(judge_id),
            project_id: Set(project_id),
            reason: Set(reason.to_string()),
            time: Set(time),
        }
        .insert(self.conn)
        .await?;
        Flag::try_from(model)
    }

    pub async fn find_flags(&self) -> StoreResult<Vec<Flag>> {
        flag::Entity::find()
            .order_by_asc(flag::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Flag::try_from)
            .collect()
    }

    pub async fn find_flags_by_judge(&self, judge_id: JudgeId) -> StoreResult<Vec<Flag>> {
        flag::Entity::find()
            .filter(flag::Column::JudgeId.eq(judge_id))
            .order_by_asc(flag::Column::Id)
            .all(self.conn)
            .await?
            .into_iter()
            .map(Flag::try_from)
            .collect()
    }

    // ---- options --------------------------------------------------------

    pub async fn find_options(&self) -> StoreResult<Option<Options>> {
        options::Entity::find_by_id(OPTIONS_ID)
            .one(self.conn)
            .await?
            .map(Options::try_from)
            .transpose()
    }

    /// Load the options row, creating it with defaults if it is missing.
    pub async fn ensure_options(&self) -> StoreResult<Options> {
        if let Some(o) = self.find_options().await? {
            return Ok(o);
        }
        let defaults = Options::default();
        convert::options_row(OPTIONS_ID, &defaults)
            .insert(self.conn)
            .await?;
        Ok(defaults)
    }

    /// Lock the options row for the rest of the transaction, creating it if missing.
    pub async fn options_for_update(&self) -> StoreResult<Options> {
        let row = options::Entity::find_by_id(OPTIONS_ID)
            .lock(LockType::Update)
            .one(self.conn)
            .await?;
        match row {
            Some(m) => Options::try_from(m),
            None => self.ensure_options().await,
        }
    }

    pub async fn save_options(&self, o: &Options) -> StoreResult<()> {
        convert::options_row(OPTIONS_ID, o).update(self.conn).await?;
        Ok(())
    }

    // ---- log chunks -----------------------------------------------------

    pub async fn find_log_chunks(&self) -> StoreResult<Vec<log::Model>> {
        Ok(log::Entity::find()
            .order_by_asc(log::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn insert_log_chunk(&self, entries: &[String]) -> StoreResult<i32> {
        let model = log::ActiveModel {
            id: NotSet,
            entries: Set(serde_json::json!(entries)),
            count: Set(entries.len() as i32),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;
        Ok(model.id)
    }

    pub async fn update_log_chunk(&self, id: i32, entries: &[String]) -> StoreResult<()> {
        log::ActiveModel {
            id: sea_orm::ActiveValue::Unchanged(id),
            entries: Set(serde_json::json!(entries)),
            count: Set(entries.len() as i32),
            created_at: NotSet,
        }
        .update(self.conn)
        .await?;
        Ok(())
    }

    // ---- aggregate ------------------------------------------------------

    pub async fn aggregate_stats(&self) -> StoreResult<Stats> {
        let projects = self.find_projects().await?;
        let judges = self.find_judges().await?;

        let active_projects: Vec<&Project> = projects.iter().filter(|p| p.active).collect();
        let active_judges: Vec<&Judge> = judges.iter().filter(|j| j.active).collect();
        let project_seen: i64 = active_projects.iter().map(|p| i64::from(p.seen)).sum();
        let judge_seen: i64 = active_judges
            .iter()
            .map(|j| j.seen_projects.len() as i64)
            .sum();
        let votes: usize = judges.iter().map(|j| j.seen_projects.len()).sum();

        Ok(Stats {
            projects: projects.len() as u64,
            active_projects: active_projects.len() as u64,
            avg_project_seen: mean(project_seen, active_projects.len() as u64),
            judges: judges.len() as u64,
            active_judges: active_judges.len() as u64,
            avg_judge_seen: mean(judge_seen, active_judges.len() as u64),
            votes: votes as u64,
        })
    }

    /// Delete every project, judge, flag and log chunk and restore default options.
    pub async fn reset_all(&self) -> StoreResult<()> {
        flag::Entity::delete_many().exec(self.conn).await?;
        judge::Entity::delete_many().exec(self.conn).await?;
        project::Entity::delete_many().exec(self.conn).await?;
        log::Entity::delete_many().exec(self.conn).await?;
        self.options_for_update().await?;
        self.save_options(&Options::default()).await
    }
}
