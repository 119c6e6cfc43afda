use crate::{
    End, ErrorKind, ITokenIndex, ParseError, PhraseRef, StageOp, Start, StartShape, StreamView,
    TagImpl, TokenArena, TokenKey, TokenKind, TokenizeContext, TokenizeStream,
};
use std::collections::VecDeque;
use std::convert::Infallible;

/// Backstop for chained forward queries; a forward committing a candidate whose
/// pipeline forwards again recurses.
const FORWARD_DEPTH_LIMIT: usize = 128;

pub(crate) enum Interrupt {
    Eof,
    Fatal(ParseError),
}

type Step<T> = Result<T, Interrupt>;

enum Outcome {
    Committed { requires_advance: bool },
    RowRolled,
}

struct PendingStart<TTag: TagImpl> {
    start: Start<TTag>,
    phrase: PhraseRef<TTag>,
}

/// The token that appeared first has the highest priority. If several tokens are in the
/// same position and one of them designates no content, this null token is prioritized;
/// otherwise the longest designated range wins.
fn beats(a_at: usize, a_designated: usize, b_at: usize, b_designated: usize) -> bool {
    if a_at != b_at {
        a_at < b_at
    } else {
        a_designated == 0 || a_designated > b_designated
    }
}

pub(crate) struct Parser<'a, TTag: TagImpl, TIdx: ITokenIndex<TTag>> {
    arena: &'a mut TokenArena<TTag>,
    index: &'a mut TIdx,
    buffer: VecDeque<String>,
    row: String,
    row_no: usize,
    viewpoint: usize,
    /// Reflects `viewpoint`, except while masking, where it stays at the mask entry
    /// column so the masked span can be replayed in the right phrase context.
    position: usize,
    node: TokenKey,
    pending_suffixes: Option<Vec<PhraseRef<TTag>>>,
    forward_depth: usize,
}

impl<'a, TTag: TagImpl, TIdx: ITokenIndex<TTag>> Parser<'a, TTag, TIdx> {
    pub(crate) fn new(
        arena: &'a mut TokenArena<TTag>,
        index: &'a mut TIdx,
        buffer: VecDeque<String>,
        entry: TokenKey,
    ) -> Self {
        Self {
            arena,
            index,
            buffer,
            row: String::new(),
            row_no: 0,
            viewpoint: 0,
            position: 0,
            node: entry,
            pending_suffixes: None,
            forward_depth: 0,
        }
    }

    pub(crate) fn run(mut self) -> Result<(), ParseError> {
        match self.run_inner() {
            Err(Interrupt::Eof) => {
                self.finalize();
                Ok(())
            }
            Err(Interrupt::Fatal(error)) => Err(error),
            Ok(never) => match never {},
        }
    }

    fn run_inner(&mut self) -> Step<Infallible> {
        if self.row.is_empty() {
            match self.buffer.pop_front() {
                Some(row) => {
                    self.row = row;
                    self.index.at_row(self.arena, self.node);
                }
                None => return Err(Interrupt::Eof),
            }
        } else {
            self.index.at_stale(self.arena, self.node, self.row_no);
        }
        loop {
            let (row_no, viewpoint) = (self.row_no, self.viewpoint);
            let outcome = self.iteration()?;
            if let Outcome::Committed {
                requires_advance: true,
            } = outcome
            {
                // node and stand-alone tokens must advance the stream
                if self.row_no == row_no && self.viewpoint == viewpoint {
                    return Err(Interrupt::Fatal(self.error(
                        ErrorKind::AdvanceStuckRow,
                        self.position,
                        format!(
                            "iteration committed a token of {:?} without advancing",
                            self.arena.phrase(self.node).id()
                        ),
                    )));
                }
            }
        }
    }

    fn finalize(&mut self) {
        let mut node = self.node;
        loop {
            let end_key = self.arena.end_key(node);
            if self.arena.kind(end_key) == TokenKind::OpenEnd {
                self.arena.seal_eof(end_key);
            }
            let parent = self.arena.node_of(node);
            if parent == node {
                break;
            }
            node = parent;
        }
        self.index.build(self.arena);
    }

    fn error(&self, kind: ErrorKind, cursor: usize, message: String) -> ParseError {
        ParseError::new(
            kind,
            self.arena.phrase(self.node).id(),
            self.row_no,
            &self.row,
            cursor,
            message,
        )
    }

    fn view(&self) -> StreamView<'_> {
        StreamView {
            row: &self.row,
            row_no: self.row_no,
            viewpoint: self.viewpoint,
            extras: self.arena.extras(self.node),
        }
    }

    fn current_phrase(&self) -> PhraseRef<TTag> {
        self.arena.phrase(self.node).clone()
    }

    /// Advance viewpoint and position by `n`.
    fn carry(&mut self, n: usize) {
        self.viewpoint += n;
        self.position = self.viewpoint;
    }

    fn next_row(&mut self) -> Step<()> {
        match self.buffer.pop_front() {
            Some(row) => {
                self.row = row;
                self.row_no += 1;
                self.viewpoint = 0;
                self.position = 0;
                self.index.at_row(self.arena, self.node);
                Ok(())
            }
            None => Err(Interrupt::Eof),
        }
    }

    /// Sub-tokenize `row[position..limit]` (the row remainder without a limit) through
    /// `phrase` into the current node. Emitted tokens bind their columns to the
    /// designated region's row origin.
    fn run_tokenize(
        &mut self,
        phrase: &PhraseRef<TTag>,
        limit: Option<usize>,
        context: TokenizeContext,
    ) -> Step<()> {
        let origin = self.position;
        let end = limit
            .unwrap_or(self.row.len())
            .min(self.row.len())
            .max(origin);
        let designated = self.row[origin..end].to_string();
        if !phrase.has_tokenize() {
            if !designated.is_empty() {
                let len = designated.len();
                self.arena.push_plain(
                    phrase.default_tag(),
                    0,
                    len,
                    origin,
                    self.row_no,
                    designated,
                    self.node,
                );
            }
            return Ok(());
        }
        let mut stream = TokenizeStream::new(&designated, context);
        while stream.cursor < designated.len() {
            let at = stream.cursor;
            let tag = phrase.run_tokenize(&mut stream);
            if stream.cursor == at {
                let error = ParseError::new(
                    ErrorKind::AdvanceStuckTokenize,
                    phrase.id(),
                    self.row_no,
                    &self.row,
                    origin + at,
                    format!(
                        "tokenize of {:?} returned without consuming (context '{}')",
                        phrase.id(),
                        context.symbol()
                    ),
                )
                .with_designated(&designated);
                return Err(Interrupt::Fatal(error));
            }
            let content = designated[at..stream.cursor].to_string();
            self.arena
                .push_plain(tag, at, stream.cursor, origin, self.row_no, content, self.node);
            stream.i += 1;
        }
        Ok(())
    }

    fn search_phrase(&self, phrases: &[PhraseRef<TTag>]) -> Option<PendingStart<TTag>> {
        let view = self.view();
        let mut best: Option<PendingStart<TTag>> = None;
        for phrase in phrases {
            if let Some(start) = phrase.query_starts(&view) {
                let pending = PendingStart {
                    start,
                    phrase: phrase.clone(),
                };
                if pending.start.instant {
                    return Some(pending);
                }
                best = match best {
                    None => Some(pending),
                    Some(current) => {
                        if beats(
                            pending.start.at,
                            pending.start.designated(),
                            current.start.at,
                            current.start.designated(),
                        ) {
                            Some(pending)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }
        best
    }

    fn search_sub(&self) -> Option<PendingStart<TTag>> {
        let phrase = self.current_phrase();
        let subs = phrase.subs_ref();
        self.search_phrase(&subs)
    }

    /// Suffix phrases are offered exactly once and must start contiguously.
    fn search_suffix(&mut self) -> Option<PendingStart<TTag>> {
        let phrases = self.pending_suffixes.take()?;
        let item = self.search_phrase(&phrases)?;
        if item.start.at == 0 {
            Some(item)
        } else {
            None
        }
    }

    fn query_ends(&self) -> Option<End<TTag>> {
        let phrase = self.current_phrase();
        let view = self.view();
        phrase.query_ends(&view)
    }

    fn iteration(&mut self) -> Step<Outcome> {
        let end = self.query_ends();

        if end.as_ref().map_or(false, |e| e.instant) {
            self.end_item(end.expect("checked above"))?;
            return Ok(Outcome::Committed {
                requires_advance: false,
            });
        }
        if let Some(suffix) = self.search_suffix() {
            self.sub_item(suffix)?;
            return Ok(Outcome::Committed {
                requires_advance: true,
            });
        }
        match self.search_sub() {
            Some(sub) => {
                if !sub.start.instant {
                    let end_wins = end.as_ref().map_or(false, |e| {
                        beats(e.at, e.designated(), sub.start.at, sub.start.designated())
                    });
                    if end_wins {
                        self.end_item(end.expect("checked above"))?;
                        return Ok(Outcome::Committed {
                            requires_advance: false,
                        });
                    }
                }
                self.sub_item(sub)?;
                Ok(Outcome::Committed {
                    requires_advance: true,
                })
            }
            None => match end {
                Some(e) => {
                    self.end_item(e)?;
                    Ok(Outcome::Committed {
                        requires_advance: false,
                    })
                }
                None => {
                    let phrase = self.current_phrase();
                    self.run_tokenize(&phrase, None, TokenizeContext::Inner)?;
                    self.next_row()?;
                    Ok(Outcome::RowRolled)
                }
            },
        }
    }

    /// Start a node or handle a stand-alone token.
    fn sub_item(&mut self, item: PendingStart<TTag>) -> Step<()> {
        if item.start.is_mask() {
            return self.masking(item);
        }
        if item.start.at > 0 {
            // remain content before the candidate
            let phrase = self.current_phrase();
            let limit = self.viewpoint + item.start.at;
            let context = if item.start.is_node() {
                TokenizeContext::NodeGap
            } else {
                TokenizeContext::Inner
            };
            self.run_tokenize(&phrase, Some(limit), context)?;
        }
        self.featurize_start(item)
    }

    /// End the current node.
    fn end_item(&mut self, end: End<TTag>) -> Step<()> {
        if end.at > 0 {
            // remain content before the terminator
            let phrase = self.current_phrase();
            let limit = self.viewpoint + end.at;
            self.run_tokenize(&phrase, Some(limit), TokenizeContext::EndGap)?;
        }
        self.featurize_end(end)
    }

    fn featurize_start(&mut self, item: PendingStart<TTag>) -> Step<()> {
        let PendingStart { start, phrase } = item;
        let Start {
            shape,
            instant: _,
            mut at,
            to,
            tag,
            features,
            extras,
        } = start;
        let is_node = matches!(shape, StartShape::Node);
        let parent = self.node;
        let bind_viewpoint = self.viewpoint;
        let bind_row = self.row_no;

        if !is_node && features.has_switch_parent() {
            return Err(Interrupt::Fatal(self.error(
                ErrorKind::Misuse,
                self.position,
                "SwitchPh is only valid on node start candidates".to_string(),
            )));
        }

        let mut staged = if is_node {
            phrase
        } else {
            self.arena.phrase(parent).clone()
        };

        self.carry(at);
        for op in &features.left {
            match op {
                StageOp::Strip(n) => {
                    at += n;
                    self.run_tokenize(&staged, Some(bind_viewpoint + at), TokenizeContext::LStrip)?;
                    self.carry(*n);
                }
                StageOp::Switch(ph) => {
                    staged = ph.clone();
                    if !is_node {
                        self.arena.set_phrase(parent, staged.clone());
                    }
                }
                StageOp::SwitchParent(ph) => self.arena.set_phrase(parent, ph.clone()),
            }
        }

        let to = match to.checked_sub(features.right_width) {
            Some(to) => to,
            None => {
                return Err(Interrupt::Fatal(self.error(
                    ErrorKind::Feature,
                    self.position,
                    format!("right-tokenize width {} exceeds the designated range", features.right_width),
                )))
            }
        };
        if at > to || bind_viewpoint + to > self.row.len() {
            return Err(Interrupt::Fatal(self.error(
                ErrorKind::Feature,
                self.position,
                format!("faulted featuring of token ({} > {})", at, to),
            )));
        }

        let content = self.row[bind_viewpoint + at..bind_viewpoint + to].to_string();
        let key = if is_node {
            let key = self.arena.push_node(
                tag,
                at,
                to,
                bind_viewpoint,
                bind_row,
                content,
                parent,
                staged.clone(),
                extras,
            );
            self.node = key;
            key
        } else {
            self.arena
                .push_plain(tag, at, to, bind_viewpoint, bind_row, content, parent)
        };
        self.carry(to - at);

        if is_node {
            let callback_phrase = self.arena.phrase(key).clone();
            let mut extras_taken = self.arena.take_extras(key);
            {
                let view = self.view();
                callback_phrase.at_start(&view, &mut extras_taken);
            }
            self.arena.put_extras(key, extras_taken);
        }

        for op in &features.right {
            match op {
                StageOp::Strip(n) => {
                    self.run_tokenize(&staged, Some(self.viewpoint + n), TokenizeContext::RTokenize)?;
                    self.carry(*n);
                }
                StageOp::Switch(ph) => {
                    staged = ph.clone();
                    let target = if is_node { key } else { parent };
                    self.arena.set_phrase(target, staged.clone());
                }
                StageOp::SwitchParent(ph) => self.arena.set_phrase(parent, ph.clone()),
            }
        }

        if let Some(forward) = &features.forward {
            self.run_forward(forward.clone())?;
        }
        Ok(())
    }

    fn featurize_end(&mut self, end: End<TTag>) -> Step<()> {
        let End {
            instant: _,
            mut at,
            to,
            tag,
            features,
        } = end;
        let owner = self.node;
        let bind_viewpoint = self.viewpoint;
        let bind_row = self.row_no;

        if features.has_switch_parent() {
            return Err(Interrupt::Fatal(self.error(
                ErrorKind::Misuse,
                self.position,
                "SwitchPh is only valid on node start candidates".to_string(),
            )));
        }

        let mut staged = self.arena.phrase(owner).clone();

        self.carry(at);
        for op in &features.left {
            match op {
                StageOp::Strip(n) => {
                    at += n;
                    self.run_tokenize(&staged, Some(bind_viewpoint + at), TokenizeContext::LStrip)?;
                    self.carry(*n);
                }
                StageOp::Switch(ph) => {
                    staged = ph.clone();
                    self.arena.set_phrase(owner, staged.clone());
                }
                StageOp::SwitchParent(_) => unreachable!("guarded above"),
            }
        }

        let to = match to.checked_sub(features.right_width) {
            Some(to) => to,
            None => {
                return Err(Interrupt::Fatal(self.error(
                    ErrorKind::Feature,
                    self.position,
                    format!("right-tokenize width {} exceeds the designated range", features.right_width),
                )))
            }
        };
        if at > to || bind_viewpoint + to > self.row.len() {
            return Err(Interrupt::Fatal(self.error(
                ErrorKind::Feature,
                self.position,
                format!("faulted featuring of token ({} > {})", at, to),
            )));
        }

        let content = self.row[bind_viewpoint + at..bind_viewpoint + to].to_string();
        let end_key = self.arena.end_key(owner);
        self.arena
            .close_node(end_key, tag, at, to, bind_viewpoint, bind_row, content);
        self.carry(to - at);

        self.pending_suffixes = Some(self.arena.phrase(owner).suffix_snapshot());
        // return to the parent node
        self.node = self.arena.node_of(owner);

        {
            let callback_phrase = self.arena.phrase(owner).clone();
            let mut extras_taken = self.arena.take_extras(owner);
            {
                let view = self.view();
                callback_phrase.at_end(&view, &mut extras_taken);
            }
            self.arena.put_extras(owner, extras_taken);
        }

        for op in &features.right {
            match op {
                StageOp::Strip(n) => {
                    self.run_tokenize(&staged, Some(self.viewpoint + n), TokenizeContext::RTokenize)?;
                    self.carry(*n);
                }
                StageOp::Switch(ph) => {
                    staged = ph.clone();
                    self.arena.set_phrase(owner, staged.clone());
                }
                StageOp::SwitchParent(_) => unreachable!("guarded above"),
            }
        }

        if let Some(forward) = &features.forward {
            self.run_forward(forward.clone())?;
        }
        Ok(())
    }

    fn run_forward(&mut self, phrase: PhraseRef<TTag>) -> Step<()> {
        if self.forward_depth >= FORWARD_DEPTH_LIMIT {
            return Err(Interrupt::Fatal(self.error(
                ErrorKind::Misuse,
                self.position,
                format!("forward chain exceeded {} levels", FORWARD_DEPTH_LIMIT),
            )));
        }
        self.forward_depth += 1;
        let item = {
            let view = self.view();
            phrase.query_starts(&view).map(|start| PendingStart {
                start,
                phrase: phrase.clone(),
            })
        };
        let result = match item {
            Some(item) => self.sub_item(item),
            None => Ok(()),
        };
        self.forward_depth -= 1;
        result
    }

    /// Masking: attribute a span to the current node without opening a branch.
    ///
    /// Advances past the mask (for mask nodes: until the masking phrase's end matches,
    /// possibly across rows), hunts for the next non-mask winner, replays everything
    /// between the mask entry and the winner's start as inner content of the current
    /// node, and repositions both cursors at the winner so normal arbitration
    /// rediscovers it. Sub- and suffix-phrases of the masking phrase are never queried.
    fn masking(&mut self, first: PendingStart<TTag>) -> Step<()> {
        let mut pending = Some((
            first.phrase,
            first.start.to,
            matches!(first.start.shape, StartShape::MaskNode),
        ));
        let winner_at = loop {
            if let Some((mask_phrase, to, is_mask_node)) = pending.take() {
                if to == 0 {
                    return Err(Interrupt::Fatal(self.error(
                        ErrorKind::NullToken,
                        self.position,
                        format!("illegal null mask token of {:?}", mask_phrase.id()),
                    )));
                }
                self.viewpoint += to;
                if self.viewpoint >= self.row.len() {
                    let phrase = self.current_phrase();
                    self.run_tokenize(&phrase, None, TokenizeContext::Inner)?;
                    self.next_row()?;
                }
                if is_mask_node {
                    loop {
                        let end = {
                            let view = self.view();
                            mask_phrase.query_ends(&view)
                        };
                        match end {
                            Some(end) => {
                                self.viewpoint += end.to;
                                break;
                            }
                            None => {
                                let phrase = self.current_phrase();
                                self.run_tokenize(&phrase, None, TokenizeContext::Inner)?;
                                self.next_row()?;
                            }
                        }
                    }
                }
            }
            // search for a mask continuation, otherwise stop at the next real token
            let stop = self.query_ends();
            if let Some(item) = self.search_sub() {
                let stop_wins = stop.as_ref().map_or(false, |s| {
                    s.instant
                        || beats(s.at, s.designated(), item.start.at, item.start.designated())
                });
                if stop_wins {
                    break stop.expect("checked above").at;
                }
                if item.start.is_mask() {
                    pending = Some((
                        item.phrase,
                        item.start.to,
                        matches!(item.start.shape, StartShape::MaskNode),
                    ));
                    continue;
                }
                break item.start.at;
            } else if let Some(stop) = stop {
                break stop.at;
            } else {
                let phrase = self.current_phrase();
                self.run_tokenize(&phrase, None, TokenizeContext::Inner)?;
                self.next_row()?;
            }
        };
        // replay the masked span as inner content of the current node
        let phrase = self.current_phrase();
        self.run_tokenize(&phrase, Some(self.viewpoint + winner_at), TokenizeContext::Inner)?;
        self.carry(winner_at);
        Ok(())
    }
}
