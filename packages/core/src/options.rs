use serde::{Deserialize, Serialize};

use crate::clock::ClockState;
use crate::error::CoreError;

/// How judges move between groups when the event runs parallel rooms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwitchingMode {
    /// Judges rotate to the next group after a fixed number of completions.
    #[default]
    Auto,
    /// Judges stay in their group until an admin moves them.
    Manual,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MainGroupOptions {
    pub switching_mode: SwitchingMode,
    /// Completions after which an auto-switching judge moves on. Zero disables rotation.
    pub auto_switch_count: i32,
    pub group_names: Vec<String>,
}

impl Default for MainGroupOptions {
    fn default() -> Self {
        Self {
            switching_mode: SwitchingMode::Auto,
            auto_switch_count: 3,
            group_names: Vec::new(),
        }
    }
}

/// Event-wide settings. Exactly one record exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Options {
    /// Last table number handed out when `multi_group` is off.
    pub curr_table_num: i32,
    /// Last table number handed out in each group when `multi_group` is on.
    pub group_table_nums: Vec<i32>,
    pub clock: ClockState,
    pub clock_sync: bool,
    /// Views every project should reach before overlap minimisation kicks in.
    pub min_views: i32,
    pub categories: Vec<String>,
    pub tracks: Vec<String>,
    pub judge_tracks: bool,
    pub multi_group: bool,
    pub num_groups: i32,
    pub group_sizes: Vec<i32>,
    pub main_group: MainGroupOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            curr_table_num: 0,
            group_table_nums: vec![0],
            clock: ClockState::default(),
            clock_sync: false,
            min_views: 3,
            categories: vec![
                "Creativity/Innovation".into(),
                "Technical Complexity".into(),
                "Design/User Experience".into(),
                "Presentation".into(),
            ],
            tracks: Vec::new(),
            judge_tracks: false,
            multi_group: false,
            num_groups: 1,
            group_sizes: vec![30],
            main_group: MainGroupOptions::default(),
        }
    }
}

impl Options {
    /// Reserve the next table, returning `(group, location)`.
    ///
    /// With a single group, tables are numbered sequentially. With multiple groups,
    /// the project lands in the first group that still has free tables; the last
    /// group absorbs any overflow.
    pub fn assign_table(&mut self) -> (i32, i32) {
        if !self.multi_group || self.num_groups <= 1 {
            self.curr_table_num += 1;
            return (0, self.curr_table_num);
        }

        self.normalize_groups();
        let last = self.group_table_nums.len() - 1;
        let group = (0..last)
            .find(|&g| self.group_table_nums[g] < self.group_sizes[g])
            .unwrap_or(last);
        self.group_table_nums[group] += 1;
        (group as i32, self.group_table_nums[group])
    }

    /// Resize the per-group arrays to `num_groups`, keeping existing counters.
    pub fn normalize_groups(&mut self) {
        let n = self.num_groups.max(1) as usize;
        self.num_groups = n as i32;
        let default_size = self.group_sizes.last().copied().unwrap_or(30);
        self.group_sizes.resize(n, default_size);
        self.group_table_nums.resize(n, 0);
    }

    pub fn validate_group(&self, group: i32) -> Result<(), CoreError> {
        if group < 0 || group >= self.num_groups.max(1) {
            return Err(CoreError::InvalidGroup {
                group,
                num_groups: self.num_groups,
            });
        }
        Ok(())
    }

    /// Group a judge should be in after completing their `completed`-th project.
    pub fn group_after_completion(&self, group: i32, completed: usize) -> i32 {
        let every = self.main_group.auto_switch_count;
        if !self.multi_group
            || self.num_groups <= 1
            || self.main_group.switching_mode != SwitchingMode::Auto
            || every <= 0
            || completed == 0
            || completed % every as usize != 0
        {
            return group;
        }
        (group + 1).rem_euclid(self.num_groups)
    }

    /// Zero every table counter.
    pub fn reset_tables(&mut self) {
        self.curr_table_num = 0;
        self.group_table_nums = vec![0; self.num_groups.max(1) as usize];
    }
}
