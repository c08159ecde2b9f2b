//! Query evaluation against a document source.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::ast::{FieldSpec, QueryAst, QueryKind, SortDirection};
use super::compare::sort_cmp;
use super::error::QueryError;
use super::expr::{Expr, parse_expr};
use super::fields;
use super::result::{QueryResult, Row};
use super::source::FromClause;
use crate::cache::{CacheError, StructureEntry, StructureSnapshot};
use crate::frontmatter::FieldValue;
use crate::vault::Document;

/// Column headers of TASK results.
pub const TASK_COLUMNS: [&str; 3] = ["task", "completed", "line"];

/// Where the evaluator reads vault state from.
///
/// Implementations only read; evaluation never invalidates or rescans.
pub trait DocumentSource {
    fn structure(&self) -> Result<Arc<StructureSnapshot>, CacheError>;
    fn document(&self, entry: &StructureEntry) -> Result<Arc<Document>, CacheError>;
}

pub struct Evaluator<'a, S: DocumentSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: DocumentSource + ?Sized> Evaluator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Evaluate a parsed query under `base` (vault-relative, may be empty).
    ///
    /// Never fails: collection-wide errors come back in [`QueryResult::error`].
    pub fn evaluate(&self, ast: &QueryAst, base: &str) -> QueryResult {
        let start = Instant::now();
        match self.run(ast, base) {
            Ok(result) => {
                tracing::debug!(
                    "{} query: {} rows, {} skipped in {}ms",
                    ast.kind.as_str(),
                    result.rows.len(),
                    result.skipped,
                    start.elapsed().as_millis()
                );
                result
            }
            Err(e) => {
                tracing::warn!("{} query failed: {}", ast.kind.as_str(), e);
                QueryResult::failed(ast.kind, &e)
            }
        }
    }

    fn run(&self, ast: &QueryAst, base: &str) -> Result<QueryResult, QueryError> {
        if ast.is_empty() {
            return Ok(QueryResult::empty(QueryKind::Empty));
        }

        let from = FromClause::parse(&ast.from)?;
        let filter = ast.where_clause.as_deref().map(parse_expr).transpose()?;
        let specs: Vec<FieldSpec> = ast.fields.iter().map(|f| FieldSpec::from_raw(f)).collect();

        let snapshot = self.source.structure().map_err(QueryError::StructureScan)?;

        let mut result = QueryResult::empty(ast.kind);
        result.columns = match ast.kind {
            QueryKind::Task => TASK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            _ => specs.iter().map(|s| s.header.clone()).collect(),
        };

        let mut matched = Vec::new();
        for entry in snapshot.entries() {
            if !from.may_match_path(&entry.path, base) {
                continue;
            }
            let doc = match self.source.document(entry) {
                Ok(doc) => doc,
                Err(e) => {
                    let e = QueryError::from(e);
                    tracing::warn!("Skipping {} ({}): {}", entry.path, e.kind().as_str(), e);
                    result.skipped += 1;
                    continue;
                }
            };
            if from.matches(&doc, base) && passes(filter.as_ref(), &doc) {
                matched.push(doc);
            }
        }

        if let Some(sort) = &ast.sort {
            sort_documents(&mut matched, &sort.field, sort.direction);
        }

        for doc in &matched {
            if ast.limit.is_some_and(|limit| result.rows.len() >= limit) {
                break;
            }
            match ast.kind {
                QueryKind::Task => result.rows.extend(task_rows(doc)),
                _ => result.rows.push(Row {
                    path: doc.path.clone(),
                    values: specs
                        .iter()
                        .map(|spec| fields::resolve(doc, &spec.path).into_owned())
                        .collect(),
                }),
            }
        }
        if let Some(limit) = ast.limit {
            result.rows.truncate(limit);
        }

        Ok(result)
    }
}

/// Apply the WHERE filter. Evaluation errors exclude only this document.
fn passes(filter: Option<&Expr>, doc: &Document) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    match filter.eval(doc) {
        Ok(keep) => keep,
        Err(source) => {
            let e = QueryError::Evaluation { path: doc.path.clone(), source };
            tracing::debug!("Excluding document: {}", e);
            false
        }
    }
}

/// Stable sort; documents without the field go last in either direction.
fn sort_documents(docs: &mut Vec<Arc<Document>>, field: &str, direction: SortDirection) {
    let mut keyed: Vec<(FieldValue, Arc<Document>)> = docs
        .drain(..)
        .map(|doc| (fields::resolve(&doc, field).into_owned(), doc))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Asc => sort_cmp(a, b),
            SortDirection::Desc => sort_cmp(b, a),
        },
    });

    docs.extend(keyed.into_iter().map(|(_, doc)| doc));
}

fn task_rows(doc: &Document) -> impl Iterator<Item = Row> + '_ {
    doc.tasks.iter().map(|task| Row {
        path: doc.path.clone(),
        values: vec![
            FieldValue::String(task.text.clone()),
            FieldValue::Boolean(task.completed),
            FieldValue::Number(task.line as f64),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ErrorKind;
    use crate::query::parse;
    use std::collections::HashMap;
    use std::time::SystemTime;

    /// In-memory source; paths listed in `unreadable` fail to load.
    struct MemorySource {
        snapshot: Arc<StructureSnapshot>,
        docs: HashMap<String, Arc<Document>>,
        unreadable: Vec<String>,
    }

    impl MemorySource {
        fn new(notes: &[(&str, &str)]) -> Self {
            let entries: Vec<StructureEntry> = notes
                .iter()
                .map(|(path, _)| StructureEntry {
                    path: path.to_string(),
                    size: 0,
                    modified: SystemTime::UNIX_EPOCH,
                })
                .collect();
            let docs = notes
                .iter()
                .map(|(path, raw)| {
                    let doc = Document::from_source(path, 0, SystemTime::UNIX_EPOCH, raw);
                    (path.to_string(), Arc::new(doc))
                })
                .collect();
            Self {
                snapshot: Arc::new(StructureSnapshot::from_entries(entries, 0)),
                docs,
                unreadable: Vec::new(),
            }
        }
    }

    impl DocumentSource for MemorySource {
        fn structure(&self) -> Result<Arc<StructureSnapshot>, CacheError> {
            Ok(self.snapshot.clone())
        }

        fn document(&self, entry: &StructureEntry) -> Result<Arc<Document>, CacheError> {
            if self.unreadable.contains(&entry.path) {
                return Err(CacheError::Read {
                    path: entry.path.clone(),
                    source: std::io::Error::other("permission denied"),
                });
            }
            self.docs
                .get(&entry.path)
                .cloned()
                .ok_or_else(|| CacheError::NotFound(entry.path.clone()))
        }
    }

    struct BrokenSource;

    impl DocumentSource for BrokenSource {
        fn structure(&self) -> Result<Arc<StructureSnapshot>, CacheError> {
            Err(CacheError::NotFound("vault root".into()))
        }

        fn document(&self, entry: &StructureEntry) -> Result<Arc<Document>, CacheError> {
            Err(CacheError::NotFound(entry.path.clone()))
        }
    }

    fn vault() -> MemorySource {
        MemorySource::new(&[
            ("inbox.md", "---\npriority: 1\n---\nloose note\n"),
            ("projects/alpha.md", "---\npriority: 5\nstatus: open\n---\n- [ ] ship #a\n"),
            ("projects/beta.md", "---\nstatus: done\n---\n- [x] wrap up\n- [ ] retro\n"),
            ("projects/gamma.md", "---\npriority: 4\nstatus: open\ntags: [a, b]\n---\n"),
            ("areas/delta.md", "---\npriority: \"7\"\nowners: [ada]\n---\n"),
        ])
    }

    fn run(source: &impl DocumentSource, query: &str, base: &str) -> QueryResult {
        Evaluator::new(source).evaluate(&parse(query).unwrap(), base)
    }

    #[test]
    fn no_from_selects_every_document() {
        let result = run(&vault(), "LIST", "");
        assert_eq!(result.len(), 5);
        assert!(result.is_ok());
    }

    #[test]
    fn missing_fields_are_excluded_from_comparisons() {
        let result = run(&vault(), "LIST WHERE priority > 3", "");
        let paths: Vec<&str> = result.paths().collect();
        assert_eq!(paths, vec!["areas/delta.md", "projects/alpha.md", "projects/gamma.md"]);
    }

    #[test]
    fn from_folder_and_tag_union() {
        let result = run(&vault(), "LIST FROM \"areas\" OR #b", "");
        let paths: Vec<&str> = result.paths().collect();
        assert_eq!(paths, vec!["areas/delta.md", "projects/gamma.md"]);
    }

    #[test]
    fn base_path_scopes_folder_sources() {
        let result = run(&vault(), "LIST FROM \"\"", "projects");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn sorts_with_missing_values_last() {
        let asc = run(&vault(), "TABLE priority SORT priority ASC", "");
        let desc = run(&vault(), "TABLE priority SORT priority DESC", "");

        let asc: Vec<&str> = asc.paths().collect();
        let desc: Vec<&str> = desc.paths().collect();
        assert_eq!(
            asc,
            vec![
                "inbox.md",
                "projects/gamma.md",
                "projects/alpha.md",
                "areas/delta.md",
                "projects/beta.md"
            ]
        );
        assert_eq!(
            desc,
            vec![
                "areas/delta.md",
                "projects/alpha.md",
                "projects/gamma.md",
                "inbox.md",
                "projects/beta.md"
            ]
        );
    }

    #[test]
    fn limit_applies_after_sort() {
        let result = run(&vault(), "TABLE priority SORT priority DESC LIMIT 2", "");
        let paths: Vec<&str> = result.paths().collect();
        assert_eq!(paths, vec!["areas/delta.md", "projects/alpha.md"]);
    }

    #[test]
    fn table_rows_keep_uniform_shape() {
        let result = run(&vault(), "TABLE status, priority AS P FROM \"projects\"", "");
        assert_eq!(result.columns, vec!["status", "P"]);
        assert!(result.rows.iter().all(|r| r.values.len() == 2));
        assert_eq!(result.cell(1, "P"), Some(&FieldValue::Missing));
    }

    #[test]
    fn task_query_yields_one_row_per_item() {
        let result = run(&vault(), "TASK FROM \"projects\"", "");
        assert_eq!(result.columns, TASK_COLUMNS);
        assert_eq!(result.len(), 3);
        assert_eq!(result.cell(1, "task"), Some(&FieldValue::String("wrap up".into())));
        assert_eq!(result.cell(1, "completed"), Some(&FieldValue::Boolean(true)));
    }

    #[test]
    fn type_mismatch_excludes_only_that_document() {
        let result = run(&vault(), "LIST WHERE owners > 1 OR priority > 4", "");
        let paths: Vec<&str> = result.paths().collect();
        assert_eq!(paths, vec!["projects/alpha.md"]);
        assert!(result.is_ok());
    }

    #[test]
    fn unreadable_documents_are_skipped() {
        let mut source = vault();
        source.unreadable.push("projects/alpha.md".into());
        let result = run(&source, "LIST FROM \"projects\"", "");
        assert_eq!(result.len(), 2);
        assert_eq!(result.skipped, 1);
        assert!(result.is_ok());
    }

    #[test]
    fn structure_failure_fails_the_query() {
        let result = run(&BrokenSource, "LIST", "");
        assert!(result.is_empty());
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::StructureScan);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn empty_query_has_no_rows() {
        let result = run(&vault(), "", "");
        assert_eq!(result.kind, QueryKind::Empty);
        assert!(result.is_empty() && result.is_ok());
    }
}
