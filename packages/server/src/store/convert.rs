//! Conversions between database rows and domain values.
//!
//! Nested collections live in JSON columns; a column that no longer decodes is
//! reported as [`StoreError::Corrupt`] rather than silently defaulted.

use jury_core::{ClockState, Flag, Judge, MainGroupOptions, Options, Project, SkipReason};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use serde::de::DeserializeOwned;

use super::StoreError;
use crate::entity::{flag, judge, options, project};

fn decode<T: DeserializeOwned>(
    entity: &'static str,
    id: i32,
    field: &'static str,
    value: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
        entity,
        id,
        detail: format!("{field}: {e}"),
    })
}

fn encode<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

impl TryFrom<project::Model> for Project {
    type Error = StoreError;

    fn try_from(m: project::Model) -> Result<Self, Self::Error> {
        Ok(Project {
            challenge_list: decode("project", m.id, "challenge_list", m.challenge_list)?,
            track_seen: decode("project", m.id, "track_seen", m.track_seen)?,
            track_stars: decode("project", m.id, "track_stars", m.track_stars)?,
            id: m.id,
            name: m.name,
            location: m.location,
            group: m.group,
            description: m.description,
            url: m.url,
            try_link: m.try_link,
            video_link: m.video_link,
            active: m.active,
            prioritized: m.prioritized,
            seen: m.seen,
            last_activity: m.last_activity,
        })
    }
}

/// Full-row update for an existing project. `created_at` is left untouched.
pub(super) fn project_update(p: &Project) -> project::ActiveModel {
    project::ActiveModel {
        id: Unchanged(p.id),
        name: Set(p.name.clone()),
        location: Set(p.location),
        group: Set(p.group),
        description: Set(p.description.clone()),
        url: Set(p.url.clone()),
        try_link: Set(p.try_link.clone()),
        video_link: Set(p.video_link.clone()),
        challenge_list: Set(encode(&p.challenge_list)),
        active: Set(p.active),
        prioritized: Set(p.prioritized),
        seen: Set(p.seen),
        track_seen: Set(encode(&p.track_seen)),
        track_stars: Set(encode(&p.track_stars)),
        last_activity: Set(p.last_activity),
        created_at: NotSet,
    }
}

impl TryFrom<judge::Model> for Judge {
    type Error = StoreError;

    fn try_from(m: judge::Model) -> Result<Self, Self::Error> {
        Ok(Judge {
            seen_projects: decode("judge", m.id, "seen_projects", m.seen_projects)?,
            rankings: decode("judge", m.id, "rankings", m.rankings)?,
            rankings_agg: decode("judge", m.id, "rankings_agg", m.rankings_agg)?,
            id: m.id,
            name: m.name,
            email: m.email,
            notes: m.notes,
            code: m.code,
            token: m.token,
            active: m.active,
            read_welcome: m.read_welcome,
            track: m.track,
            group: m.group,
            current: m.current,
            last_activity: m.last_activity,
        })
    }
}

/// Full-row update for an existing judge. `created_at` is left untouched.
pub(super) fn judge_update(j: &Judge) -> judge::ActiveModel {
    judge::ActiveModel {
        id: Unchanged(j.id),
        name: Set(j.name.clone()),
        email: Set(j.email.clone()),
        notes: Set(j.notes.clone()),
        code: Set(j.code.clone()),
        token: Set(j.token.clone()),
        active: Set(j.active),
        read_welcome: Set(j.read_welcome),
        track: Set(j.track.clone()),
        group: Set(j.group),
        current: Set(j.current),
        seen_projects: Set(encode(&j.seen_projects)),
        rankings: Set(encode(&j.rankings)),
        rankings_agg: Set(encode(&j.rankings_agg)),
        last_activity: Set(j.last_activity),
        created_at: NotSet,
    }
}

impl TryFrom<flag::Model> for Flag {
    type Error = StoreError;

    fn try_from(m: flag::Model) -> Result<Self, Self::Error> {
        let reason: SkipReason = m.reason.parse().map_err(|e| StoreError::Corrupt {
            entity: "flag",
            id: m.id,
            detail: format!("reason: {e}"),
        })?;
        Ok(Flag {
            id: m.id,
            project_id: m.project_id,
            judge_id: m.judge_id,
            reason,
            time: m.time,
        })
    }
}

impl TryFrom<options::Model> for Options {
    type Error = StoreError;

    fn try_from(m: options::Model) -> Result<Self, Self::Error> {
        let clock: ClockState = decode("options", m.id, "clock", m.clock)?;
        let main_group: MainGroupOptions = decode("options", m.id, "main_group", m.main_group)?;
        Ok(Options {
            curr_table_num: m.curr_table_num,
            group_table_nums: decode("options", m.id, "group_table_nums", m.group_table_nums)?,
            clock,
            clock_sync: m.clock_sync,
            min_views: m.min_views,
            categories: decode("options", m.id, "categories", m.categories)?,
            tracks: decode("options", m.id, "tracks", m.tracks)?,
            judge_tracks: m.judge_tracks,
            multi_group: m.multi_group,
            num_groups: m.num_groups,
            group_sizes: decode("options", m.id, "group_sizes", m.group_sizes)?,
            main_group,
        })
    }
}

/// Every column of the options row, keyed by the fixed singleton id.
pub(super) fn options_row(id: i32, o: &Options) -> options::ActiveModel {
    options::ActiveModel {
        id: Set(id),
        curr_table_num: Set(o.curr_table_num),
        group_table_nums: Set(encode(&o.group_table_nums)),
        clock: Set(encode(&o.clock)),
        clock_sync: Set(o.clock_sync),
        min_views: Set(o.min_views),
        categories: Set(encode(&o.categories)),
        tracks: Set(encode(&o.tracks)),
        judge_tracks: Set(o.judge_tracks),
        multi_group: Set(o.multi_group),
        num_groups: Set(o.num_groups),
        group_sizes: Set(encode(&o.group_sizes)),
        main_group: Set(encode(&o.main_group)),
    }
}
