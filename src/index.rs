use crate::{TagImpl, TokenArena, TokenKey};
use std::cell::Cell;

/// The minimal interface the parser drives while building a result tree.
///
/// [at_row](ITokenIndex::at_row) fires whenever a new row begins,
/// [at_stale](ITokenIndex::at_stale) when parsing (re-)enters in the middle of a row,
/// and [build](ITokenIndex::build) once at the end of input, with the completed arena.
/// The implementation is chosen on the [Root](crate::Root) by type parameter.
pub trait ITokenIndex<TTag: TagImpl> {
    /// Register the currently active node as the anchor of a fresh row.
    fn at_row(&mut self, arena: &TokenArena<TTag>, node: TokenKey);

    /// Register an anchor for a row entered mid-way.
    fn at_stale(&mut self, arena: &TokenArena<TTag>, node: TokenKey, row_no: usize);

    /// Finalize the index over the completed arena.
    fn build(&mut self, arena: &TokenArena<TTag>);

    /// Drop cached offsets from `from_row` on after a content replacement.
    fn invalidate_rows(&self, from_row: usize) {
        let _ = from_row;
    }

    /// Starting point of the token relative to the whole data.
    ///
    /// The default walks the content lengths of all preceding tokens; indexing
    /// implementations override it with cached row offsets.
    fn data_start_of(&self, arena: &TokenArena<TTag>, token: TokenKey) -> usize {
        let mut sum = 0;
        let mut cursor = arena.prev_linear(token);
        while let Some(key) = cursor {
            sum += arena.content(key).len();
            cursor = arena.prev_linear(key);
        }
        sum
    }

    /// The token at a row/column coordinate, when the implementation records rows.
    fn token_at_coord(
        &self,
        arena: &TokenArena<TTag>,
        row_no: usize,
        col_no: usize,
    ) -> Option<TokenKey> {
        let _ = (arena, row_no, col_no);
        None
    }

    /// The token at an absolute data offset, when the implementation records rows.
    fn token_at_cursor(&self, arena: &TokenArena<TTag>, cursor: usize) -> Option<TokenKey> {
        let _ = (arena, cursor);
        None
    }
}

/// Can be used to save operations when no index is needed.
#[derive(Debug, Default)]
pub struct NoneTokenIndex;

impl<TTag: TagImpl> ITokenIndex<TTag> for NoneTokenIndex {
    fn at_row(&mut self, _: &TokenArena<TTag>, _: TokenKey) {}
    fn at_stale(&mut self, _: &TokenArena<TTag>, _: TokenKey, _: usize) {}
    fn build(&mut self, _: &TokenArena<TTag>) {}
}

/// Per-row record of the [ExtensiveTokenIndex].
#[derive(Debug)]
pub struct RowRecord {
    first_token: TokenKey,
    data_start: Cell<Option<usize>>,
    len_row: Cell<Option<usize>>,
}

impl RowRecord {
    fn new(first_token: TokenKey) -> Self {
        Self {
            first_token,
            data_start: Cell::new(None),
            len_row: Cell::new(None),
        }
    }

    /// First token of the row.
    pub fn first_token(&self) -> TokenKey {
        self.first_token
    }
}

/// A comprehensive index implementation with per-row records and cached data offsets.
///
/// While parsing, an anchor is recorded per row; [build](ITokenIndex::build) resolves
/// each anchor to the true first token of its row. The records answer row/column and
/// absolute-offset lookups ([token_at_coord](ITokenIndex::token_at_coord),
/// [token_at_cursor](ITokenIndex::token_at_cursor)); data offsets are cached per row and
/// dropped from a row on when content is replaced
/// ([SyntaxTree::replace_content](crate::SyntaxTree::replace_content)).
#[derive(Debug, Default)]
pub struct ExtensiveTokenIndex {
    temp: Vec<TokenKey>,
    records: Vec<RowRecord>,
}

impl ExtensiveTokenIndex {
    /// Number of recorded rows.
    pub fn len_rows(&self) -> usize {
        self.records.len()
    }

    /// The record of a row.
    pub fn record(&self, row_no: usize) -> Option<&RowRecord> {
        self.records.get(row_no)
    }

    /// Length of the row content in bytes.
    pub fn len_row<TTag: TagImpl>(&self, arena: &TokenArena<TTag>, row_no: usize) -> usize {
        let record = &self.records[row_no];
        if let Some(len) = record.len_row.get() {
            return len;
        }
        let mut last = record.first_token;
        let mut cursor = arena.next_linear(last);
        while let Some(key) = cursor {
            if arena.row_no(key) != row_no {
                break;
            }
            last = key;
            cursor = arena.next_linear(key);
        }
        let len = arena.column_end(last);
        record.len_row.set(Some(len));
        len
    }

    /// Starting point of the row relative to the whole data.
    pub fn data_start_of_row<TTag: TagImpl>(
        &self,
        arena: &TokenArena<TTag>,
        row_no: usize,
    ) -> usize {
        // resolve bottom-up so every cache cell below is filled once
        let mut start = match self.records.first() {
            Some(record) => arena.column_start(record.first_token),
            None => return 0,
        };
        for row in 0..=row_no {
            let record = &self.records[row];
            match record.data_start.get() {
                Some(cached) => start = cached,
                None => record.data_start.set(Some(start)),
            }
            if row < row_no {
                start += self.len_row(arena, row);
            }
        }
        start
    }

    /// Ending point of the row relative to the whole data.
    pub fn data_end_of_row<TTag: TagImpl>(
        &self,
        arena: &TokenArena<TTag>,
        row_no: usize,
    ) -> usize {
        self.data_start_of_row(arena, row_no) + self.len_row(arena, row_no)
    }

    /// The token at the given column of a recorded row.
    fn token_at<TTag: TagImpl>(
        &self,
        arena: &TokenArena<TTag>,
        row_no: usize,
        col_no: usize,
    ) -> Option<TokenKey> {
        let record = self.records.get(row_no)?;
        let mut cursor = Some(record.first_token);
        while let Some(key) = cursor {
            if arena.row_no(key) != row_no {
                break;
            }
            if arena.column_end(key) > col_no {
                return Some(key);
            }
            cursor = arena.next_linear(key);
        }
        None
    }
}

impl<TTag: TagImpl> ITokenIndex<TTag> for ExtensiveTokenIndex {
    fn at_row(&mut self, _: &TokenArena<TTag>, node: TokenKey) {
        self.temp.push(node);
    }

    fn at_stale(&mut self, arena: &TokenArena<TTag>, node: TokenKey, row_no: usize) {
        let mut token = node;
        if arena.viewpoint(node) != 0 {
            // parsing is stalled mid-row, find the first token of the row
            let mut cursor = arena.prev_linear(node);
            while let Some(key) = cursor {
                if arena.row_no(key) != row_no {
                    break;
                }
                token = key;
                cursor = arena.prev_linear(key);
            }
        }
        self.temp.push(token);
    }

    fn build(&mut self, arena: &TokenArena<TTag>) {
        self.records = Vec::with_capacity(self.temp.len());
        for (row_no, anchor) in self.temp.iter().enumerate() {
            let mut token = *anchor;
            if arena.row_no(token) != row_no {
                // the anchor belongs to an earlier row, find the first token of this one
                let mut cursor = arena.next_linear(token);
                while let Some(key) = cursor {
                    if arena.row_no(key) == row_no {
                        token = key;
                        break;
                    }
                    cursor = arena.next_linear(key);
                }
            }
            self.records.push(RowRecord::new(token));
        }
        self.temp = Vec::with_capacity(0);
    }

    fn invalidate_rows(&self, from_row: usize) {
        for record in self.records.iter().skip(from_row) {
            record.data_start.set(None);
            record.len_row.set(None);
        }
    }

    fn data_start_of(&self, arena: &TokenArena<TTag>, token: TokenKey) -> usize {
        let row_no = arena.row_no(token);
        self.data_start_of_row(arena, row_no) + arena.column_start(token)
    }

    fn token_at_coord(
        &self,
        arena: &TokenArena<TTag>,
        row_no: usize,
        col_no: usize,
    ) -> Option<TokenKey> {
        self.token_at(arena, row_no, col_no)
    }

    fn token_at_cursor(&self, arena: &TokenArena<TTag>, cursor: usize) -> Option<TokenKey> {
        for row_no in 0..self.records.len() {
            if self.data_end_of_row(arena, row_no) > cursor {
                let col = cursor - self.data_start_of_row(arena, row_no);
                return self.token_at(arena, row_no, col);
            }
        }
        None
    }
}
