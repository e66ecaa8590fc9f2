//! Generic search/filter/paginate SQL builder shared by every list read.
//!
//! Each entity describes itself with a [`ListSpec`]: where its rows come
//! from (including any relation-traversal JOINs), which column expressions
//! the free-text query `q` is matched against, and which link table connects
//! it to metadata. [`build_list_sql`] turns a spec plus a
//! [`ListQuery`](roster_core::query::ListQuery) into the page and count
//! statements:
//!
//! - `q` becomes an OR of `LIKE '%q%'` conditions over the searchable
//!   columns (SQLite `LIKE` is case-insensitive for ASCII);
//! - `meta_key` / `meta_val` each become an independent `EXISTS` subquery
//!   against the metadata link table, so the two may match different linked
//!   records;
//! - `SELECT DISTINCT` / `COUNT(DISTINCT id)` collapse the row fan-out
//!   introduced by multi-valued JOINs;
//! - results are windowed at [`PAGE_SIZE`] rows.

use roster_core::query::{ListQuery, PAGE_SIZE};

/// How to list one entity. `search_columns` entries are SQL expressions
/// (qualified columns or casts) compared against the `q` pattern.
pub struct ListSpec {
  /// FROM clause body, e.g. `"students s"`, possibly with JOINs.
  pub from:           &'static str,
  /// Identity column used for count deduplication.
  pub id_column:      &'static str,
  /// Select list; must include every `order_by` expression, which SQLite
  /// requires for `SELECT DISTINCT`.
  pub select:         &'static str,
  pub search_columns: &'static [&'static str],
  /// Link table and owning foreign-key column for metadata filters, or
  /// `None` for entities without metadata (the metadata list itself).
  pub meta_link:      Option<MetaLink>,
  pub order_by:       &'static str,
}

/// The table joining an entity to `metadata`, and its owner column.
pub struct MetaLink {
  pub table: &'static str,
  pub fk:    &'static str,
}

/// The statements and LIKE parameters produced from one spec + query.
/// `params` bind to both statements in order.
pub struct ListSql {
  pub page_sql:  String,
  pub count_sql: String,
  pub params:    Vec<String>,
}

pub fn build_list_sql(spec: &ListSpec, query: &ListQuery) -> ListSql {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<String> = Vec::new();

  if let Some(text) = query.text()
    && !spec.search_columns.is_empty()
  {
    params.push(like_pattern(text));
    let n = params.len();
    let ors: Vec<String> = spec
      .search_columns
      .iter()
      .map(|col| format!("{col} LIKE ?{n} ESCAPE '\\'"))
      .collect();
    conds.push(format!("({})", ors.join(" OR ")));
  }

  if let Some(meta) = &spec.meta_link {
    if let Some(key) = query.meta_key() {
      params.push(like_pattern(key));
      conds.push(meta_exists(spec, meta, "key", params.len()));
    }
    if let Some(val) = query.meta_val() {
      params.push(like_pattern(val));
      conds.push(meta_exists(spec, meta, "value", params.len()));
    }
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  let page_sql = format!(
    "SELECT DISTINCT {select} FROM {from}{where_clause} ORDER BY {order} \
     LIMIT {limit} OFFSET {offset}",
    select = spec.select,
    from   = spec.from,
    order  = spec.order_by,
    limit  = PAGE_SIZE,
    offset = query.offset(),
  );

  let count_sql = format!(
    "SELECT COUNT(DISTINCT {id}) FROM {from}{where_clause}",
    id   = spec.id_column,
    from = spec.from,
  );

  ListSql { page_sql, count_sql, params }
}

/// `EXISTS` subquery checking for at least one linked metadata record whose
/// `column` contains the pattern bound at `?n`.
fn meta_exists(
  spec: &ListSpec,
  meta: &MetaLink,
  column: &str,
  n: usize,
) -> String {
  format!(
    "EXISTS (SELECT 1 FROM {table} lnk \
     JOIN metadata mf ON mf.metadata_id = lnk.metadata_id \
     WHERE lnk.{fk} = {id} AND mf.{column} LIKE ?{n} ESCAPE '\\')",
    table = meta.table,
    fk    = meta.fk,
    id    = spec.id_column,
  )
}

/// Wrap user text in `%...%`, escaping LIKE wildcards so they match
/// literally.
fn like_pattern(text: &str) -> String {
  let escaped = text
    .replace('\\', "\\\\")
    .replace('%', "\\%")
    .replace('_', "\\_");
  format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
  use super::*;

  const SPEC: ListSpec = ListSpec {
    from:           "students s",
    id_column:      "s.student_id",
    select:         "s.student_id, s.first_name",
    search_columns: &["s.first_name", "s.last_name"],
    meta_link:      Some(MetaLink { table: "student_metadata", fk: "student_id" }),
    order_by:       "s.last_name, s.first_name",
  };

  #[test]
  fn empty_query_has_no_where_clause() {
    let sql = build_list_sql(&SPEC, &ListQuery::default());
    assert!(!sql.page_sql.contains("WHERE"));
    assert!(!sql.count_sql.contains("WHERE"));
    assert!(sql.params.is_empty());
    assert!(sql.page_sql.contains("LIMIT 10 OFFSET 0"));
  }

  #[test]
  fn text_query_ors_over_all_columns_with_one_param() {
    let query = ListQuery { q: Some("rita".into()), ..Default::default() };
    let sql = build_list_sql(&SPEC, &query);
    assert!(sql.page_sql.contains(
      "(s.first_name LIKE ?1 ESCAPE '\\' OR s.last_name LIKE ?1 ESCAPE '\\')"
    ));
    assert_eq!(sql.params, vec!["%rita%"]);
  }

  #[test]
  fn meta_filters_are_independent_exists_subqueries() {
    let query = ListQuery {
      meta_key: Some("hobby".into()),
      meta_val: Some("chess".into()),
      ..Default::default()
    };
    let sql = build_list_sql(&SPEC, &query);
    assert_eq!(sql.page_sql.matches("EXISTS (SELECT 1 FROM").count(), 2);
    assert!(sql.page_sql.contains("mf.key LIKE ?1"));
    assert!(sql.page_sql.contains("mf.value LIKE ?2"));
    assert!(sql.page_sql.contains(") AND EXISTS"));
    assert_eq!(sql.params, vec!["%hobby%", "%chess%"]);
  }

  #[test]
  fn like_wildcards_in_user_text_are_escaped() {
    assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
  }

  #[test]
  fn page_number_moves_the_offset() {
    let query = ListQuery { page: Some(3), ..Default::default() };
    let sql = build_list_sql(&SPEC, &query);
    assert!(sql.page_sql.contains("LIMIT 10 OFFSET 20"));
  }

  #[test]
  fn meta_filters_ignored_without_a_link_table() {
    let spec = ListSpec { meta_link: None, ..SPEC };
    let query = ListQuery { meta_key: Some("x".into()), ..Default::default() };
    let sql = build_list_sql(&spec, &query);
    assert!(!sql.page_sql.contains("EXISTS"));
    assert!(sql.params.is_empty());
  }
}
