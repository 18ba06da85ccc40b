//! Mood analytics rollup: pure aggregation over the Task collection for
//! the admin dashboard and the AI analysis prompt.

use std::collections::BTreeMap;

use crate::models::{Mood, Role, Task, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodCounts {
    pub happy: usize,
    pub motivated: usize,
    pub neutral: usize,
    pub thinking: usize,
    pub frustrated: usize,
}

impl MoodCounts {
    pub fn record(&mut self, mood: Mood) {
        match mood {
            Mood::Happy => self.happy += 1,
            Mood::Motivated => self.motivated += 1,
            Mood::Neutral => self.neutral += 1,
            Mood::Thinking => self.thinking += 1,
            Mood::Frustrated => self.frustrated += 1,
        }
    }

    pub fn get(&self, mood: Mood) -> usize {
        match mood {
            Mood::Happy => self.happy,
            Mood::Motivated => self.motivated,
            Mood::Neutral => self.neutral,
            Mood::Thinking => self.thinking,
            Mood::Frustrated => self.frustrated,
        }
    }

    pub fn total(&self) -> usize {
        self.happy + self.motivated + self.neutral + self.thinking + self.frustrated
    }

    /// Weighted 0–10 morale score, one decimal. 5.0 when there is no data.
    pub fn morale_score(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 5.0;
        }
        let weighted = self.happy * 10
            + self.motivated * 9
            + self.thinking * 6
            + self.neutral * 5
            + self.frustrated * 2;
        let score = weighted as f64 / total as f64;
        (score * 10.0).round() / 10.0
    }
}

/// Mood distribution across the whole team and per staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodBreakdown {
    pub overall: MoodCounts,
    /// Keyed by username. Every staff member appears, moody tasks or not.
    pub by_staff: BTreeMap<String, MoodCounts>,
}

impl MoodBreakdown {
    /// Roll up mood entries. Tasks whose `assigned_to` dangles (deleted
    /// user) still count in `overall`; they just have no staff row.
    pub fn from_tasks(tasks: &[Task], users: &[User]) -> Self {
        let mut breakdown = MoodBreakdown::default();

        for user in users.iter().filter(|u| u.role == Role::Staff) {
            breakdown.by_staff.entry(user.username.clone()).or_default();
        }

        for task in tasks {
            let Some(mood) = task.mood else { continue };
            breakdown.overall.record(mood);

            let staff = task
                .assigned_to
                .and_then(|id| users.iter().find(|u| u.id == id));
            if let Some(user) = staff {
                breakdown
                    .by_staff
                    .entry(user.username.clone())
                    .or_default()
                    .record(mood);
            }
        }

        breakdown
    }

    pub fn total(&self) -> usize {
        self.overall.total()
    }
}
