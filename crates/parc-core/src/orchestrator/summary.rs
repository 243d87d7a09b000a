//! End-of-run counters.

/// Counters for one creator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSummary {
    pub user: String,
    pub posts: u64,
    pub posts_no_access: u64,
    pub downloaded: u64,
    pub skipped: u64,
    /// Listed by the platform but deleted from its CDN.
    pub unavailable: u64,
    pub failed: u64,
    pub bytes: u64,
    pub links_total: u64,
    pub links_new: u64,
    /// Set when the creator could not be fully processed.
    pub error: Option<String>,
}

impl UserSummary {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub users: Vec<UserSummary>,
}

impl RunSummary {
    /// Sum of every per-user counter (user name and error left empty).
    pub fn totals(&self) -> UserSummary {
        let mut t = UserSummary::new("total");
        for u in &self.users {
            t.posts += u.posts;
            t.posts_no_access += u.posts_no_access;
            t.downloaded += u.downloaded;
            t.skipped += u.skipped;
            t.unavailable += u.unavailable;
            t.failed += u.failed;
            t.bytes += u.bytes;
            t.links_total += u.links_total;
            t.links_new += u.links_new;
        }
        t
    }

    pub fn is_clean(&self) -> bool {
        self.users.iter().all(UserSummary::is_clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_add_up() {
        let mut a = UserSummary::new("a");
        a.downloaded = 2;
        a.bytes = 10;
        let mut b = UserSummary::new("b");
        b.skipped = 3;
        b.failed = 1;
        let run = RunSummary { users: vec![a, b] };
        let t = run.totals();
        assert_eq!((t.downloaded, t.skipped, t.failed, t.bytes), (2, 3, 1, 10));
        assert!(!run.is_clean());
    }
}
