//! Sort keys and list windows shared by the paginated models.
//!
//! Caller-supplied ordering never reaches SQL as text. It is parsed into a
//! closed enum first, and anything outside the allow-list falls back to the
//! default. Only the `&'static str` column names of the enum are interpolated.

use serde::{Deserialize, Serialize};

/// Maps an allow-listed sort key onto a column.
pub trait SortKey: Copy + Default {
    /// Parse a caller-supplied key, falling back to the default.
    fn from_param(value: Option<&str>) -> Self;

    /// Column name used in `ORDER BY`.
    fn column(self) -> &'static str;
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction, case-insensitively; anything else is `Desc`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One page of a listing: window plus ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<S> {
    pub limit: i64,
    pub offset: i64,
    pub order_by: S,
    pub direction: SortDirection,
}

impl<S: SortKey> ListQuery<S> {
    /// `ORDER BY` clause body. The primary key breaks ties so pages stay stable.
    pub fn order_clause(&self) -> String {
        let dir = self.direction.as_sql();
        format!("{} {dir}, id {dir}", self.order_by.column())
    }
}
