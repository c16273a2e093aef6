//! Listing parameters for the user directory.
//!
//! The same filter and ordering semantics back both the SQL adapter and the
//! in-memory repository, so the comparison helpers live here rather than in
//! either adapter.

use std::cmp::Ordering;

use pagination::PageRequest;

use crate::domain::profile::{Profile, Role};

/// Columns a directory listing may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    /// Profile creation time.
    #[default]
    CreatedAt,
    /// Last modification time.
    UpdatedAt,
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Campus role.
    Role,
}

/// Raised for sort columns outside the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported sort column: {0}")]
pub struct ParseSortColumnError(pub String);

impl std::str::FromStr for SortColumn {
    type Err = ParseSortColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "first_name" => Ok(Self::FirstName),
            "last_name" => Ok(Self::LastName),
            "role" => Ok(Self::Role),
            other => Err(ParseSortColumnError(other.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Raised for order values other than `asc` and `desc`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("order must be asc or desc: {0}")]
pub struct ParseSortDirectionError(pub String);

impl std::str::FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseSortDirectionError(other.to_owned())),
        }
    }
}

/// A sort specification: column plus direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileSort {
    /// Column to sort by.
    pub column: SortColumn,
    /// Direction to sort in.
    pub direction: SortDirection,
}

/// Parameters of a directory listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileListing {
    /// Page to serve.
    pub page: PageRequest,
    /// Restrict results to one role.
    pub role: Option<Role>,
    /// Case-insensitive substring matched against first or last name.
    pub search: Option<String>,
    /// Ordering of the result set.
    pub sort: ProfileSort,
}

/// One served page of the directory plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    /// Profiles on this page, already ordered.
    pub items: Vec<Profile>,
    /// Total matching profiles across all pages.
    pub total_items: u64,
}

impl ProfileListing {
    /// True when `profile` satisfies the role filter and search term.
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        if self.role.is_some_and(|role| profile.role != role) {
            return false;
        }
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                profile.first_name.to_lowercase().contains(&term)
                    || profile.last_name.to_lowercase().contains(&term)
            }
        }
    }

    /// Ordering of two profiles under this listing's sort specification.
    #[must_use]
    pub fn compare(&self, a: &Profile, b: &Profile) -> Ordering {
        let ordering = match self.sort.column {
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            SortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortColumn::FirstName => a.first_name.cmp(&b.first_name),
            SortColumn::LastName => a.last_name.cmp(&b.last_name),
            SortColumn::Role => a.role.as_str().cmp(b.role.as_str()),
        };
        match self.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Filter, order, and slice `profiles` into the requested page.
    #[must_use]
    pub fn select_page(&self, profiles: &[Profile]) -> ProfilePage {
        let mut matched: Vec<Profile> = profiles
            .iter()
            .filter(|profile| self.matches(profile))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));
        let total_items = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(self.page.offset()).unwrap_or(usize::MAX))
            .take(self.page.limit() as usize)
            .collect();
        ProfilePage { items, total_items }
    }
}
