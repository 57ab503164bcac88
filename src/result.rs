//! Result assembly: column descriptors, rows, and command-tag parsing (§4.4).
use crate::message::backend::{Cell, FieldDescription};
use crate::types;

/// One column's metadata, installed once from a `RowDescription` and
/// immutable for the `Result`'s lifetime.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub field_name: String,
    pub table_oid: u32,
    pub column_id: u16,
    pub datatype_oid: u32,
    pub datatype_size: i16,
    pub type_modifier: i32,
    /// Always `0` (text) in this core.
    pub format_code: i16,
}

impl From<FieldDescription> for ColumnDescriptor {
    fn from(f: FieldDescription) -> Self {
        Self {
            field_name: f.field_name,
            table_oid: f.table_oid,
            column_id: f.column_id,
            datatype_oid: f.data_type,
            datatype_size: f.data_type_size,
            type_modifier: f.type_modifier,
            format_code: f.format_code,
        }
    }
}

impl ColumnDescriptor {
    /// A human-readable type name for this column, e.g. `varchar(32)`.
    pub fn type_name(&self) -> String {
        types::column_type_name(self.datatype_oid, self.datatype_size)
    }
}

/// One row: `cells.len()` always equals the owning `Result`'s header count
/// once headers are installed. Each cell aliases the decoded `DataRow`
/// body via [`Bytes`]'s refcounted slicing, satisfying the "no copy until
/// the caller wants one" rule without a hand-rolled arena (§9).
pub type DataRow = Vec<Cell>;

/// SQL command family selected from a `CommandComplete` tag's leading verb.
/// `Move`/`Fetch`/`Copy` exist so callers can classify those tags if they
/// choose to parse further, but the tag parser below only extracts
/// affected-row counts for the four verbs the original parser recognized
/// — `MOVE`/`FETCH`/`COPY` tags fall through as [`CommandType::Unknown`],
/// matching `px_result_parse_command_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Select,
    Insert,
    Update,
    Delete,
    Move,
    Fetch,
    Copy,
    Unknown,
}

/// One command's worth of headers, rows, and completion metadata. A
/// simple-query batch of N statements yields N of these; the extended
/// pipeline always yields exactly one.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub headers: Vec<ColumnDescriptor>,
    pub rows: Vec<DataRow>,
    pub command_tag: Option<String>,
    pub command_type: CommandType,
    pub affected_rows: u64,
    pub row_oid: u32,
}

impl Default for CommandType {
    fn default() -> Self {
        CommandType::Unknown
    }
}

impl QueryResult {
    pub(crate) fn install_headers(&mut self, fields: Vec<FieldDescription>) {
        self.headers = fields.into_iter().map(ColumnDescriptor::from).collect();
    }

    pub(crate) fn push_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub(crate) fn finish(&mut self, tag: String) {
        parse_command_tag(self, &tag);
        self.command_tag = Some(tag);
    }

    /// Render a cell's value the way a terminal client would.
    pub fn render_cell(&self, row: usize, column: usize) -> String {
        let oid = self.headers[column].datatype_oid;
        let value = self.rows[row][column].as_deref();
        types::render_cell(oid, value)
    }
}

/// An ordered sequence of [`QueryResult`]s, appended in command order.
pub type ResultList = Vec<QueryResult>;

/// Parse a `CommandComplete` tag's leading verb and row count, matching
/// `px_result_parse_command_tag` exactly: only `SELECT`/`INSERT`/`UPDATE`/
/// `DELETE` are recognized, everything else (including `MOVE`/`FETCH`/
/// `COPY`) leaves `command_type = Unknown` and `affected_rows = 0`.
fn parse_command_tag(result: &mut QueryResult, tag: &str) {
    let mut parts = tag.split_whitespace();
    let Some(verb) = parts.next() else { return };

    match verb {
        "SELECT" => {
            result.command_type = CommandType::Select;
            result.affected_rows = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        }
        "INSERT" => {
            result.command_type = CommandType::Insert;
            result.row_oid = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
            result.affected_rows = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        }
        "UPDATE" => {
            result.command_type = CommandType::Update;
            result.affected_rows = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        }
        "DELETE" => {
            result.command_type = CommandType::Delete;
            result.affected_rows = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_tag_sets_affected_rows() {
        let mut r = QueryResult::default();
        r.finish("SELECT 2".into());
        assert_eq!(r.command_type, CommandType::Select);
        assert_eq!(r.affected_rows, 2);
    }

    #[test]
    fn insert_tag_sets_row_oid_and_affected_rows() {
        let mut r = QueryResult::default();
        r.finish("INSERT 0 1".into());
        assert_eq!(r.command_type, CommandType::Insert);
        assert_eq!(r.row_oid, 0);
        assert_eq!(r.affected_rows, 1);
    }

    #[test]
    fn move_tag_is_unknown_matching_original_parser() {
        let mut r = QueryResult::default();
        r.finish("MOVE 3".into());
        assert_eq!(r.command_type, CommandType::Unknown);
        assert_eq!(r.affected_rows, 0);
    }

    #[test]
    fn empty_tag_is_unknown() {
        let mut r = QueryResult::default();
        r.finish(String::new());
        assert_eq!(r.command_type, CommandType::Unknown);
    }
}
