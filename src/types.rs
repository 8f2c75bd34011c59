//! Shared domain types
//!
//! Small types used across modules: the blood-group enumeration and the
//! pagination envelope every list endpoint returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Blood Groups
// ============================================================================

/// The eight blood groups accepted anywhere a blood group is submitted.
///
/// Serialized in the medical notation ("A+", "O-", ...) both over the wire
/// and in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::AbPos,
        BloodGroup::AbNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or(())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Raw page/limit query parameters as they arrive on the wire.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized pagination: page >= 1, limit >= 1 (default 1 / 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl From<PageQuery> for PageParams {
    fn from(q: PageQuery) -> Self {
        PageParams::new(q.page, q.limit)
    }
}

/// Paginated response envelope: `{items, page, limit, total, total_pages}`.
///
/// `total_pages` is never below 1, so an empty listing still renders as
/// "page 1 of 1" for clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let total_pages = (total + params.limit - 1) / params.limit;
        Self {
            items,
            page: params.page,
            limit: params.limit,
            total,
            total_pages: total_pages.max(1),
        }
    }

    /// Map the item type while keeping the envelope intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_roundtrip() {
        for g in BloodGroup::ALL {
            assert_eq!(g.as_str().parse::<BloodGroup>(), Ok(g));
        }
    }

    #[test]
    fn test_blood_group_rejects_unknown() {
        assert!("C+".parse::<BloodGroup>().is_err());
        assert!("a+".parse::<BloodGroup>().is_err());
        assert!("".parse::<BloodGroup>().is_err());
        assert!("AB".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_blood_group_serde_uses_medical_notation() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
        let back: BloodGroup = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(back, BloodGroup::OPos);
    }

    #[test]
    fn test_page_params_clamping() {
        let p = PageParams::new(None, None);
        assert_eq!(p, PageParams { page: 1, limit: 10 });

        let p = PageParams::new(Some(0), Some(0));
        assert_eq!(p, PageParams { page: 1, limit: 1 });

        let p = PageParams::new(Some(-5), Some(-1));
        assert_eq!(p, PageParams { page: 1, limit: 1 });

        let p = PageParams::new(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_paginated_total_pages() {
        let params = PageParams::new(Some(1), Some(10));
        assert_eq!(Paginated::<i32>::new(vec![], params, 0).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], params, 10).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], params, 11).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], params, 95).total_pages, 10);
    }
}
