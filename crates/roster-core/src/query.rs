//! List-query parameters and the fixed-size result page.

use serde::{Deserialize, Serialize};

/// Every list endpoint returns at most this many rows per page.
pub const PAGE_SIZE: usize = 10;

/// Parameters accepted by every list operation.
///
/// - `q`: free-text filter; matches when ANY of the entity's configured
///   searchable fields contains it, case-insensitively.
/// - `meta_key` / `meta_val`: each restricts to entities having at least one
///   linked metadata record whose key (resp. value) contains the text. The
///   two are independent; both present means both must hold.
/// - `page`: 1-based page number, defaulting to 1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
  pub q:        Option<String>,
  pub meta_key: Option<String>,
  pub meta_val: Option<String>,
  pub page:     Option<usize>,
}

impl ListQuery {
  /// Free-text query with surrounding whitespace stripped; `None` when the
  /// parameter is absent or blank.
  pub fn text(&self) -> Option<&str> {
    self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn meta_key(&self) -> Option<&str> {
    self.meta_key.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  pub fn meta_val(&self) -> Option<&str> {
    self.meta_val.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  /// 1-based page number; page 0 and absent both mean page 1.
  pub fn page(&self) -> usize { self.page.unwrap_or(1).max(1) }

  /// Row offset of the requested page; saturates rather than overflowing on
  /// absurd page numbers.
  pub fn offset(&self) -> usize {
    self.page().saturating_sub(1).saturating_mul(PAGE_SIZE)
  }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// The 1-based page number these items belong to.
  pub page:  usize,
  /// Total number of matching rows across all pages.
  pub total: usize,
  /// Total number of pages; at least 1 even when `total` is 0.
  pub pages: usize,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, page: usize, total: usize) -> Self {
    let pages = total.div_ceil(PAGE_SIZE).max(1);
    Self { items, page, total, pages }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_query_text_is_none() {
    let q = ListQuery { q: Some("   ".into()), ..Default::default() };
    assert_eq!(q.text(), None);
  }

  #[test]
  fn page_defaults_and_offsets() {
    let q = ListQuery::default();
    assert_eq!(q.page(), 1);
    assert_eq!(q.offset(), 0);

    let q = ListQuery { page: Some(3), ..Default::default() };
    assert_eq!(q.offset(), 20);

    let q = ListQuery { page: Some(0), ..Default::default() };
    assert_eq!(q.page(), 1);
  }

  #[test]
  fn huge_page_number_saturates_instead_of_overflowing() {
    let q = ListQuery { page: Some(usize::MAX), ..Default::default() };
    assert_eq!(q.offset(), usize::MAX);
  }

  #[test]
  fn page_count_rounds_up_and_never_hits_zero() {
    assert_eq!(Page::<()>::new(vec![], 1, 0).pages, 1);
    assert_eq!(Page::<()>::new(vec![], 1, 10).pages, 1);
    assert_eq!(Page::<()>::new(vec![], 1, 11).pages, 2);
  }
}
