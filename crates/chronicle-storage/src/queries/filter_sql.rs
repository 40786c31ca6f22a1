//! Compile a `NativeQuery` into SQL clauses and bound parameters.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ToSql;

use chronicle_core::models::{NativeFilter, NativeQuery, SortDirection, SortField};

use crate::pool::pragmas::FOLD_FUNCTION;

/// SQL fragments for one query against a per-type table.
pub struct CompiledSql {
    pub where_clause: String,
    pub order_clause: String,
    pub limit_clause: String,
    pub params: Vec<Box<dyn ToSql>>,
}

impl CompiledSql {
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
/// lexical order equals chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::SubjectId => "subject_id",
        SortField::ChangeKind => "change_kind",
        SortField::OccurredAt => "occurred_at",
    }
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compile every filter, the effective ordering, and limit/offset.
pub fn compile(query: &NativeQuery) -> CompiledSql {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    for filter in &query.filters {
        let next = params.len() + 1;
        match filter {
            NativeFilter::Id(id) => {
                clauses.push(format!("id = ?{next}"));
                params.push(Box::new(*id));
            }
            NativeFilter::SubjectIds(ids) if ids.is_empty() => clauses.push("0".to_string()),
            NativeFilter::SubjectIds(ids) if ids.len() == 1 => {
                clauses.push(format!("subject_id = ?{next}"));
                params.push(Box::new(ids[0].clone()));
            }
            NativeFilter::SubjectIds(ids) => {
                clauses.push(format!("subject_id IN ({})", placeholders(next, ids.len())));
                params.extend(ids.iter().map(|id| Box::new(id.clone()) as Box<dyn ToSql>));
            }
            NativeFilter::ChangeKinds(kinds) if kinds.is_empty() => clauses.push("0".to_string()),
            NativeFilter::ChangeKinds(kinds) => {
                clauses.push(format!("change_kind IN ({})", placeholders(next, kinds.len())));
                params.extend(
                    kinds
                        .iter()
                        .map(|k| Box::new(k.as_str().to_string()) as Box<dyn ToSql>),
                );
            }
            NativeFilter::OccurredBetween { from, to } => {
                clauses.push(format!("occurred_at >= ?{next} AND occurred_at <= ?{}", next + 1));
                params.push(Box::new(format_timestamp(from)));
                params.push(Box::new(format_timestamp(to)));
            }
            NativeFilter::CorrelationHash(hash) => {
                clauses.push(format!("correlation_hash = ?{next}"));
                params.push(Box::new(hash.clone()));
            }
            NativeFilter::ActorLabel(label) => {
                clauses.push(format!("actor_label = ?{next}"));
                params.push(Box::new(label.clone()));
            }
            NativeFilter::ActorLabelIgnoreCase(label) => {
                clauses.push(format!("{FOLD_FUNCTION}(actor_label) = {FOLD_FUNCTION}(?{next})"));
                params.push(Box::new(label.clone()));
            }
            NativeFilter::ActorLabelContains(term) => {
                // instr() keeps `%` and `_` in the term literal.
                clauses.push(format!(
                    "instr({FOLD_FUNCTION}(actor_label), {FOLD_FUNCTION}(?{next})) > 0"
                ));
                params.push(Box::new(term.clone()));
            }
            NativeFilter::Actorless => {
                clauses.push("(actor_label IS NULL OR actor_label = '')".to_string());
            }
            NativeFilter::RequestId(request_id) => {
                clauses.push(format!(
                    "COALESCE(json_extract(change_set, '$.\"@context\".requestId'), \
                     json_extract(change_set, '$.\"@context\".request_id')) = ?{next}"
                ));
                params.push(Box::new(request_id.clone()));
            }
        }
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let order_clause = format!(
        " ORDER BY {}",
        query
            .effective_order()
            .iter()
            .map(|(field, dir)| {
                let dir = match dir {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                format!("{} {dir}", column(*field))
            })
            .collect::<Vec<_>>()
            .join(", ")
    );

    let limit_clause = match (query.limit, query.offset) {
        (Some(limit), offset) => format!(" LIMIT {limit} OFFSET {offset}"),
        (None, 0) => String::new(),
        (None, offset) => format!(" LIMIT -1 OFFSET {offset}"),
    };

    CompiledSql {
        where_clause,
        order_clause,
        limit_clause,
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::models::ChangeKind;

    #[test]
    fn empty_query_uses_default_order() {
        let sql = compile(&NativeQuery::new());
        assert_eq!(sql.where_clause, "");
        assert_eq!(sql.order_clause, " ORDER BY occurred_at DESC, id DESC");
        assert_eq!(sql.limit_clause, "");
    }

    #[test]
    fn placeholders_are_numbered_across_filters() {
        let query = NativeQuery::new()
            .filter(NativeFilter::SubjectIds(vec!["1".into(), "2".into()]))
            .filter(NativeFilter::ChangeKinds(vec![ChangeKind::Updated]))
            .filter(NativeFilter::CorrelationHash("abc".into()))
            .paginate(10, 20);
        let sql = compile(&query);
        assert_eq!(
            sql.where_clause,
            " WHERE subject_id IN (?1, ?2) AND change_kind IN (?3) AND correlation_hash = ?4"
        );
        assert_eq!(sql.params.len(), 4);
        assert_eq!(sql.limit_clause, " LIMIT 10 OFFSET 20");
    }

    #[test]
    fn actor_label_matching_uses_unicode_fold() {
        let query = NativeQuery::new()
            .filter(NativeFilter::ActorLabelIgnoreCase("Élodie".into()))
            .filter(NativeFilter::ActorLabelContains("lod".into()));
        let sql = compile(&query);
        assert_eq!(
            sql.where_clause,
            " WHERE chronicle_fold(actor_label) = chronicle_fold(?1) \
             AND instr(chronicle_fold(actor_label), chronicle_fold(?2)) > 0"
        );
    }
}
